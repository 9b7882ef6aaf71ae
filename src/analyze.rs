//! Font analysis entry points

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::fonts::{collapse, font_references, FontRecord, FontReport, FontResolver, PageWarning};
use crate::options::{AnalysisOptions, CancelHandle};
use crate::pdf::{read_document_info, Page, PageDecodeError, PdfDocument};

/// Runs font analyses with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    options: AnalysisOptions,
    cancel: Option<CancelHandle>,
}

impl Analyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Observe `handle` between pages
    pub fn with_cancel(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyse a complete PDF file held in memory.
    ///
    /// Only a buffer that cannot be opened as a PDF (or a cancellation) fails
    /// the analysis. Unreadable pages are reported as warnings and fonts that
    /// cannot be resolved appear as `Unknown` placeholders.
    pub async fn run(&self, bytes: &[u8]) -> Result<FontReport> {
        let document = PdfDocument::open(bytes)?;
        self.run_document(&document).await
    }

    /// Analyse an already opened document
    pub async fn run_document(&self, document: &PdfDocument) -> Result<FontReport> {
        self.scan(document, document.pages(&self.options)).await
    }

    async fn scan<'d>(
        &self,
        document: &'d PdfDocument,
        pages: impl Iterator<Item = (u32, std::result::Result<Page<'d>, PageDecodeError>)>,
    ) -> Result<FontReport> {
        let resolver = FontResolver::new(self.options.lookup_timeout);
        let mut occurrences = Vec::new();
        let mut warnings = Vec::new();
        let mut pages_scanned = 0;

        for (number, page) in pages {
            if self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
                info!(pages_scanned, "analysis cancelled");
                return Err(Error::Cancelled { pages_scanned });
            }

            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    warn!(page = number, error = %e, "skipping unreadable page");
                    warnings.push(PageWarning {
                        page: number,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            // A name repeated within one segment resolves the same way every
            // time, and only its first occurrence can survive collapsing.
            let mut resolved = HashSet::new();
            for (segment_index, segment) in page.segments.iter().enumerate() {
                for reference in font_references(&segment.operations) {
                    if !resolved.insert((segment_index, reference.name.clone())) {
                        continue;
                    }
                    let descriptor = resolver
                        .resolve(&reference.name, &segment.local, &page.shared)
                        .await;
                    debug!(
                        page = number,
                        resource = %reference.name,
                        font = %descriptor.name,
                        "font selected"
                    );
                    occurrences.push(FontRecord::from(&descriptor));
                }
            }
            pages_scanned += 1;
        }

        let metadata = if self.options.read_metadata {
            read_document_info(document.inner())
                .map_err(|e| debug!(error = %e, "ignoring unreadable metadata"))
                .ok()
        } else {
            None
        };

        let fonts = collapse(occurrences);
        info!(
            fonts = fonts.len(),
            pages_scanned,
            skipped_pages = warnings.len(),
            "font analysis complete"
        );

        Ok(FontReport {
            fonts,
            pages_scanned,
            warnings,
            metadata,
        })
    }
}

/// Fonts used by a PDF, embedded fonts first.
///
/// Blocking convenience over [`Analyzer::run`] with default options. Do not
/// call it from inside an async runtime; await [`Analyzer::run`] there.
pub fn analyze(bytes: &[u8]) -> Result<Vec<FontRecord>> {
    Ok(analyze_with(bytes, &AnalysisOptions::default())?.fonts)
}

/// Full report for a PDF held in memory (blocking)
pub fn analyze_with(bytes: &[u8], options: &AnalysisOptions) -> Result<FontReport> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(Analyzer::new(options.clone()).run(bytes))
}

/// Full report for a PDF file on disk (blocking)
pub fn analyze_file(path: &Path, options: &AnalysisOptions) -> Result<FontReport> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    analyze_with(&bytes, options)
}
