//! Opening PDF byte buffers with lopdf

use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::AnalysisOptions;
use crate::pdf::pages::PageWalker;

/// How far into the buffer the `%PDF-` marker may appear. Some producers
/// write junk before the header and readers are expected to tolerate it.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Quick check for the `%PDF-` header near the start of a buffer.
///
/// This only sniffs the file type; a buffer that passes may still fail to
/// open.
pub fn is_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// An opened PDF document with its pages in document order
pub struct PdfDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open a complete PDF file held in memory
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(bytes).map_err(|e| Error::InvalidPdf(e.to_string()))?;
        let document = Self::from(inner);
        debug!(pages = document.page_count(), "opened document");
        Ok(document)
    }

    /// Number of pages reachable from the page tree
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object ids of the pages, in document order
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// Access the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Walk the pages in document order.
    ///
    /// Each call starts a fresh walk over the page tree.
    pub fn pages<'a>(&'a self, options: &AnalysisOptions) -> PageWalker<'a> {
        PageWalker::new(&self.inner, &self.page_ids, options)
    }
}

impl From<Document> for PdfDocument {
    fn from(inner: Document) -> Self {
        // get_pages is keyed by 1-based page number, so values come out in order
        let page_ids = inner.get_pages().into_values().collect();
        Self { inner, page_ids }
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("version", &self.inner.version)
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}
