//! Page walking
//!
//! Pages are visited in document order. For each one we decode the content
//! stream into operators and work out the two font scopes that apply to it:
//! the fonts declared on the page itself and the fonts inherited from the
//! page tree. Form XObjects and annotation appearances are read as part of
//! the page that shows them.

use std::collections::HashSet;
use std::ptr;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;
use tracing::{debug, warn};

use crate::options::AnalysisOptions;
use crate::pdf::resources::FontDictScope;
use crate::pdf::{dict_entry, name_entry, resolve, resolve_dict};

/// Bound on /Parent links followed when looking for inherited resources
const MAX_TREE_DEPTH: usize = 64;

/// Why a page's content could not be read
#[derive(Error, Debug)]
pub enum PageDecodeError {
    #[error("page object could not be read: {0}")]
    Object(#[from] lopdf::Error),

    #[error("/Contents must be a stream or an array of streams")]
    InvalidContents,

    #[error("content stream could not be decompressed: {0}")]
    Decompress(lopdf::Error),

    #[error("content stream could not be parsed: {0}")]
    Parse(lopdf::Error),
}

/// A run of operators that share one page-local font scope.
///
/// The page content is one segment; every expanded Form XObject or
/// annotation appearance adds its own.
#[derive(Debug)]
pub struct ContentSegment<'a> {
    pub operations: Vec<Operation>,
    pub local: FontDictScope<'a>,
}

/// A decoded page
#[derive(Debug)]
pub struct Page<'a> {
    /// 1-based page number
    pub number: u32,
    /// Content in stream order, with form content spliced in where invoked
    /// and annotation appearances appended after the page content
    pub segments: Vec<ContentSegment<'a>>,
    /// Fonts inherited through the page tree
    pub shared: FontDictScope<'a>,
}

impl Page<'_> {
    /// All operators of the page, forms included, in stream order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.segments.iter().flat_map(|s| s.operations.iter())
    }
}

/// Forms already expanded on the current page, keyed by the form stream and
/// the resources its content is read with
type Expanded = HashSet<(*const Stream, *const Dictionary)>;

/// A form's decoded content and the scope it is read in
struct FormContent<'a> {
    operations: Vec<Operation>,
    resources: Option<&'a Dictionary>,
    local: FontDictScope<'a>,
}

/// Lazy walk over a document's pages.
///
/// Yields `(page_number, page)` pairs; a page whose content cannot be read
/// comes back as an error and does not stop the walk.
pub struct PageWalker<'a> {
    doc: &'a Document,
    page_ids: std::iter::Enumerate<std::slice::Iter<'a, ObjectId>>,
    follow_forms: bool,
    max_form_depth: usize,
    include_annotations: bool,
}

impl<'a> PageWalker<'a> {
    pub(crate) fn new(doc: &'a Document, page_ids: &'a [ObjectId], options: &AnalysisOptions) -> Self {
        Self {
            doc,
            page_ids: page_ids.iter().enumerate(),
            follow_forms: options.follow_form_xobjects,
            max_form_depth: options.max_form_depth,
            include_annotations: options.include_annotations,
        }
    }

    fn read_page(&self, number: u32, id: ObjectId) -> Result<Page<'a>, PageDecodeError> {
        let page = self.doc.get_object(id)?.as_dict()?;

        let resources = page
            .get(b"Resources")
            .ok()
            .and_then(|res| resolve_dict(self.doc, res));
        let local = FontDictScope::from_resources(self.doc, resources);
        let shared = FontDictScope::from_resources(self.doc, inherited_resources(self.doc, page));

        let operations = decode_operations(&page_content(self.doc, page)?)?;
        debug!(page = number, operators = operations.len(), "decoded page content");

        let mut segments = Vec::new();
        let mut expanded = Expanded::new();
        self.split_segments(operations, resources, local, 0, &mut expanded, &mut segments);

        if self.include_annotations {
            for appearance in appearance_streams(self.doc, page) {
                if let Some(form) = self.open_form(appearance, resources, local, &mut expanded) {
                    self.split_segments(form.operations, form.resources, form.local, 1, &mut expanded, &mut segments);
                }
            }
        }

        Ok(Page {
            number,
            segments,
            shared,
        })
    }

    /// Append `operations` to `segments`, expanding Form XObjects inline.
    fn split_segments(
        &self,
        operations: Vec<Operation>,
        resources: Option<&'a Dictionary>,
        local: FontDictScope<'a>,
        depth: usize,
        expanded: &mut Expanded,
        segments: &mut Vec<ContentSegment<'a>>,
    ) {
        let mut current = Vec::new();

        for op in operations {
            let form = if self.follow_forms && depth < self.max_form_depth {
                form_xobject(self.doc, resources, &op)
            } else {
                None
            };
            current.push(op);

            let Some(form) = form.and_then(|form| self.open_form(form, resources, local, expanded)) else {
                continue;
            };

            segments.push(ContentSegment {
                operations: std::mem::take(&mut current),
                local,
            });
            self.split_segments(form.operations, form.resources, form.local, depth + 1, expanded, segments);
        }

        if !current.is_empty() {
            segments.push(ContentSegment {
                operations: current,
                local,
            });
        }
    }

    /// Decode a form for expansion.
    ///
    /// Returns `None` for a form already expanded on this page with the same
    /// resources. A repeat cannot select a font the first expansion did not,
    /// and skipping it also stops a form from invoking itself.
    fn open_form(
        &self,
        form: &'a Stream,
        resources: Option<&'a Dictionary>,
        local: FontDictScope<'a>,
        expanded: &mut Expanded,
    ) -> Option<FormContent<'a>> {
        // A form without its own resources uses the ones it was invoked with
        let (resources, local) = match dict_entry(self.doc, &form.dict, b"Resources") {
            Some(own) => (Some(own), FontDictScope::from_resources(self.doc, Some(own))),
            None => (resources, local),
        };

        let key = (
            form as *const Stream,
            resources.map_or(ptr::null(), |res| res as *const Dictionary),
        );
        if !expanded.insert(key) {
            debug!("form already expanded on this page, not following again");
            return None;
        }

        match stream_content(form).and_then(|bytes| decode_operations(&bytes)) {
            Ok(operations) => Some(FormContent {
                operations,
                resources,
                local,
            }),
            Err(e) => {
                warn!(error = %e, "skipping unreadable form");
                None
            }
        }
    }
}

impl<'a> Iterator for PageWalker<'a> {
    type Item = (u32, Result<Page<'a>, PageDecodeError>);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, &id) = self.page_ids.next()?;
        let number = index as u32 + 1;
        Some((number, self.read_page(number, id)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.page_ids.size_hint()
    }
}

/// Resources of the nearest page tree ancestor that declares any
fn inherited_resources<'a>(doc: &'a Document, page: &'a Dictionary) -> Option<&'a Dictionary> {
    let mut node = dict_entry(doc, page, b"Parent")?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(resources) = dict_entry(doc, node, b"Resources") {
            return Some(resources);
        }
        node = dict_entry(doc, node, b"Parent")?;
    }
    None
}

/// Raw bytes of a page's content, concatenating content arrays
fn page_content(doc: &Document, page: &Dictionary) -> Result<Vec<u8>, PageDecodeError> {
    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match resolve(doc, contents)? {
        Object::Stream(stream) => stream_content(stream),
        Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                match resolve(doc, part)? {
                    Object::Stream(stream) => content.extend(stream_content(stream)?),
                    _ => return Err(PageDecodeError::InvalidContents),
                }
                // Operators may not span stream boundaries
                content.push(b'\n');
            }
            Ok(content)
        }
        _ => Err(PageDecodeError::InvalidContents),
    }
}

fn stream_content(stream: &Stream) -> Result<Vec<u8>, PageDecodeError> {
    if stream.dict.has(b"Filter") {
        stream.decompressed_content().map_err(PageDecodeError::Decompress)
    } else {
        Ok(stream.content.clone())
    }
}

fn decode_operations(bytes: &[u8]) -> Result<Vec<Operation>, PageDecodeError> {
    Content::decode(bytes)
        .map(|content| content.operations)
        .map_err(PageDecodeError::Parse)
}

/// The Form XObject invoked by a `Do` operator, if that is what `op` is
fn form_xobject<'a>(doc: &'a Document, resources: Option<&'a Dictionary>, op: &Operation) -> Option<&'a Stream> {
    if op.operator != "Do" {
        return None;
    }
    let name = op.operands.first()?.as_name().ok()?;
    let xobjects = dict_entry(doc, resources?, b"XObject")?;
    let stream = resolve(doc, xobjects.get(name).ok()?).ok()?.as_stream().ok()?;

    (name_entry(&stream.dict, b"Subtype").as_deref() == Some("Form")).then_some(stream)
}

/// Annotation flags that keep an annotation off the screen (Hidden, NoView)
const HIDDEN_ANNOTATION: i64 = 1 << 1 | 1 << 5;

/// Normal appearance streams of the page's visible annotations.
///
/// An appearance with several states (checkboxes, radio buttons) uses the
/// state named by the annotation's `/AS`.
fn appearance_streams<'a>(doc: &'a Document, page: &'a Dictionary) -> Vec<&'a Stream> {
    let annotations = match page.get(b"Annots").and_then(|annots| resolve(doc, annots)) {
        Ok(Object::Array(annotations)) => annotations,
        _ => return Vec::new(),
    };

    annotations
        .iter()
        .filter_map(|annot| resolve_dict(doc, annot))
        .filter(|annot| {
            let flags = annot.get(b"F").and_then(Object::as_i64).unwrap_or(0);
            flags & HIDDEN_ANNOTATION == 0
        })
        .filter_map(|annot| {
            let normal = dict_entry(doc, annot, b"AP")?.get(b"N").ok()?;
            match resolve(doc, normal).ok()? {
                Object::Stream(stream) => Some(stream),
                Object::Dictionary(states) => {
                    let state = annot.get(b"AS").and_then(Object::as_name).ok()?;
                    resolve(doc, states.get(state).ok()?).ok()?.as_stream().ok()
                }
                _ => None,
            }
        })
        .collect()
}
