//! Font discovery: references, resolution, classification and reporting

pub mod descriptor;
pub mod extract;
pub mod report;
pub mod resolve;

// Re-export commonly used items
pub use descriptor::{is_embedded, FontDescriptor, FontKind, GlyphProgram, GlyphSlot};
pub use extract::{font_references, FontReference};
pub use report::{collapse, compare_names, FontRecord, FontReport, PageWarning};
pub use resolve::FontResolver;
