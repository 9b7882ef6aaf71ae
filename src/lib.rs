//! PDF Font Scan Library
//!
//! Reports the fonts a PDF uses and whether each one is embedded in the file
//! or expected to be installed on the reader's system. This library provides
//! functionality to:
//! - Walk the page tree and decode each page's content stream
//! - Find every font selection (`Tf`) and resolve it against the page's
//!   resources, falling back to resources shared through the page tree
//! - Classify each font as embedded or not from its glyph program streams
//! - Produce one record per font name, embedded fonts first
//!
//! Broken pages and unresolvable fonts never fail an analysis; only a buffer
//! that is not a readable PDF does.
//!
//! # Example
//!
//! ```no_run
//! use pdf_fontscan::{analyze, is_pdf};
//!
//! let bytes = std::fs::read("report.pdf").expect("Failed to read file");
//! assert!(is_pdf(&bytes));
//!
//! for font in analyze(&bytes).expect("Failed to analyze PDF") {
//!     println!("{} ({}) embedded: {}", font.name, font.font_type, font.embedded);
//! }
//! ```

pub mod analyze;
pub mod error;
pub mod fonts;
pub mod options;
pub mod pdf;

// Re-export commonly used items
pub use analyze::{analyze, analyze_file, analyze_with, Analyzer};
pub use error::{Error, Result};
pub use fonts::{FontRecord, FontReport, PageWarning};
pub use options::{AnalysisOptions, CancelHandle};
pub use pdf::{is_pdf, DocumentInfo, PdfDocument};
