//! PDF document access: loading, page walking, resource scopes and metadata

pub mod loader;
pub mod metadata;
pub mod pages;
pub mod resources;

// Re-export commonly used items
pub use loader::{is_pdf, PdfDocument};
pub use metadata::{read_document_info, DocumentInfo};
pub use pages::{ContentSegment, Page, PageDecodeError, PageWalker};
pub use resources::{FontDictScope, FontScope, LookupError};

use lopdf::{Dictionary, Document, Object};

/// Follow one level of indirect reference
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> lopdf::Result<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// Resolve an object that is expected to be a dictionary
pub(crate) fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, object).ok()?.as_dict().ok()
}

/// Look up `key` in a dictionary and resolve the value as a dictionary
pub(crate) fn dict_entry<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    resolve_dict(doc, dict.get(key).ok()?)
}

/// Read a name value as text, see [`name_text`]
pub(crate) fn name_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).and_then(Object::as_name).ok().map(name_text)
}

/// Text form of a PDF name.
///
/// UTF-8 is kept as is. Other bytes, and `#` itself, are written as `#XX`
/// escapes the way they appear in a file, so two distinct names never share
/// a text form.
pub(crate) fn name_text(name: &[u8]) -> String {
    let mut text = String::with_capacity(name.len());
    for chunk in name.utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '#' => text.push_str("#23"),
                c => text.push(c),
            }
        }
        for byte in chunk.invalid() {
            text.push_str(&format!("#{:02X}", byte));
        }
    }
    text
}

/// Raw bytes of a name given in its [`name_text`] form
pub(crate) fn name_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut rest = text.as_bytes();

    while let Some((&first, tail)) = rest.split_first() {
        let escaped = (first == b'#')
            .then(|| tail.get(..2))
            .flatten()
            .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());

        match escaped {
            Some(byte) => {
                bytes.push(byte);
                rest = &tail[2..];
            }
            None => {
                bytes.push(first);
                rest = tail;
            }
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_name_text_unchanged() {
        assert_eq!(name_text(b"Helvetica-Bold"), "Helvetica-Bold");
        assert_eq!(name_text("Ärial".as_bytes()), "Ärial");
    }

    #[test]
    fn test_non_utf8_names_stay_distinct() {
        // Two Shift-JIS names that decode lossily to the same text
        let gothic = name_text(b"\x82\x6c\x82\x72Gothic");
        let mincho = name_text(b"\x82\x6c\x82\x71Gothic");

        assert_ne!(gothic, mincho);
        assert_eq!(gothic, "#82l#82rGothic");
    }

    #[test]
    fn test_hash_is_escaped() {
        assert_eq!(name_text(b"A#B"), "A#23B");
        assert_ne!(name_text(b"#E9"), name_text(b"\xe9"));
    }

    #[test]
    fn test_name_bytes_reverses_name_text() {
        for name in [&b"F1"[..], b"A#B", b"\x82\x6c\x82\x72", b"\xff#41"] {
            assert_eq!(name_bytes(&name_text(name)), name);
        }
    }
}
