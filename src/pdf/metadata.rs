//! Document metadata extraction
//!
//! Metadata is informational only. Nothing here affects the font report, and
//! callers treat any error as "no metadata".

use lopdf::{Dictionary, Document, Object};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::pdf::resolve_dict;

/// Count pages by reading the Count field from the Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog_ref = doc
        .trailer
        .get(b"Root")
        .map_err(|_| Error::Metadata("No Root in trailer".to_string()))?;

    let catalog = resolve_dict(doc, catalog_ref)
        .ok_or_else(|| Error::Metadata("Catalog is not a dictionary".to_string()))?;

    let pages_ref = catalog
        .get(b"Pages")
        .map_err(|_| Error::Metadata("No Pages in catalog".to_string()))?;

    let pages = resolve_dict(doc, pages_ref)
        .ok_or_else(|| Error::Metadata("Pages is not a dictionary".to_string()))?;

    match pages.get(b"Count") {
        Ok(Object::Integer(n)) if *n >= 0 => Ok(*n as usize),
        Ok(_) => Err(Error::Metadata("Count is not a non-negative integer".to_string())),
        Err(_) => Err(Error::Metadata("No Count in Pages".to_string())),
    }
}

/// Document information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    /// PDF version from the file header
    pub version: String,
    /// Page count declared by the page tree root
    pub page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
}

/// Read the catalog page count and the `/Info` dictionary
pub fn read_document_info(doc: &Document) -> Result<DocumentInfo> {
    let page_count = count_pages_from_catalog(doc)?;

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| resolve_dict(doc, info));

    Ok(DocumentInfo {
        version: doc.version.clone(),
        page_count,
        title: info.and_then(|dict| text_entry(dict, b"Title")),
        author: info.and_then(|dict| text_entry(dict, b"Author")),
        creator: info.and_then(|dict| text_entry(dict, b"Creator")),
        producer: info.and_then(|dict| text_entry(dict, b"Producer")),
    })
}

/// Decode a PDF text string: UTF-16BE with a byte order mark, otherwise
/// treated as (mostly) ASCII
fn text_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = dict.get(key).ok()?.as_str().ok()?;

    let text = match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}
