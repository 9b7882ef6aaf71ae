//! Error types for the font scanner

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the font scanner
///
/// Only document-level failures end up here. Problems with a single page or a
/// single font resource are recovered inside the analysis and never surface
/// as an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// The byte buffer could not be opened as a PDF
    #[error("file is not a valid PDF: {0}")]
    InvalidPdf(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Document metadata could not be read
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// The analysis was cancelled between pages
    #[error("analysis cancelled after {pages_scanned} pages")]
    Cancelled {
        /// Pages fully processed before cancellation was observed
        pages_scanned: u32,
    },
}
