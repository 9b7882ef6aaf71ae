//! Analysis options and cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Options controlling a font analysis
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Upper bound on a single font resource lookup. A lookup that takes
    /// longer is treated as "not found".
    pub lookup_timeout: Duration,
    /// Expand Form XObjects invoked with `Do` and scan their content too
    pub follow_form_xobjects: bool,
    /// Maximum nesting depth when expanding Form XObjects
    pub max_form_depth: usize,
    /// Scan the appearance streams of visible annotations (form fields,
    /// free text) as part of their page
    pub include_annotations: bool,
    /// Read the document information dictionary into the report
    pub read_metadata: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(1),
            follow_form_xobjects: true,
            max_form_depth: 8,
            include_annotations: true,
            read_metadata: true,
        }
    }
}

/// Handle used to cancel a running analysis.
///
/// Cancellation is coarse: it is observed before each page starts, never in
/// the middle of a page.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone of this handle observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
