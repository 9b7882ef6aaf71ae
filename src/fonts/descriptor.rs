//! Font descriptors and embedding classification
//!
//! Where a font keeps its glyph program depends on its subtype: Type1 fonts
//! use `/FontFile`, TrueType fonts `/FontFile2`, compact and OpenType programs
//! `/FontFile3`, composite fonts keep theirs on the descendant CIDFont and
//! Type3 fonts define glyphs as content streams under `/CharProcs`.
//! [`FontKind`] records which of those applies so that classification never
//! has to guess.

use lopdf::{Dictionary, Document, Object};

use crate::pdf::{dict_entry, name_entry, resolve, resolve_dict};

/// Type reported for fonts that could not be resolved
pub const UNKNOWN_FONT_TYPE: &str = "Unknown";

/// Font descriptor entry holding a glyph program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSlot {
    FontFile,
    FontFile2,
    FontFile3,
    CharProcs,
}

impl GlyphSlot {
    fn key(self) -> &'static [u8] {
        match self {
            GlyphSlot::FontFile => b"FontFile",
            GlyphSlot::FontFile2 => b"FontFile2",
            GlyphSlot::FontFile3 => b"FontFile3",
            GlyphSlot::CharProcs => b"CharProcs",
        }
    }
}

/// Descriptor entries checked for every font kind except Type3. Producers do
/// not always store the program under the entry matching `/Subtype`.
const FONT_FILE_SLOTS: &[GlyphSlot] = &[
    GlyphSlot::FontFile,
    GlyphSlot::FontFile2,
    GlyphSlot::FontFile3,
];

/// A glyph program found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphProgram {
    pub slot: GlyphSlot,
    /// Stored length in bytes (summed over all procedures for Type3 fonts)
    pub length: usize,
    /// `/Subtype` of a `FontFile3` stream, e.g. `Type1C` or `OpenType`
    pub format: Option<String>,
}

/// Font subtypes we know how to look for glyph programs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontKind {
    Type1 { program: Option<GlyphProgram> },
    MmType1 { program: Option<GlyphProgram> },
    TrueType { program: Option<GlyphProgram> },
    Type3 { program: Option<GlyphProgram> },
    /// Composite font; the program lives on the descendant CIDFont
    Type0 {
        descendant: Option<String>,
        program: Option<GlyphProgram>,
    },
    Other {
        subtype: String,
        program: Option<GlyphProgram>,
    },
    /// Synthesized for a font that could not be resolved
    Unresolved,
}

impl FontKind {
    pub fn glyph_program(&self) -> Option<&GlyphProgram> {
        match self {
            FontKind::Type1 { program }
            | FontKind::MmType1 { program }
            | FontKind::TrueType { program }
            | FontKind::Type3 { program }
            | FontKind::Type0 { program, .. }
            | FontKind::Other { program, .. } => program.as_ref(),
            FontKind::Unresolved => None,
        }
    }
}

/// A font resource resolved against the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDescriptor {
    pub name: String,
    pub font_type: String,
    pub subtype: Option<String>,
    pub kind: FontKind,
}

impl FontDescriptor {
    /// Minimal descriptor for a font resource that could not be resolved
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            font_type: UNKNOWN_FONT_TYPE.to_string(),
            subtype: None,
            kind: FontKind::Unresolved,
        }
    }

    /// Build a descriptor from a font dictionary.
    ///
    /// `resource_name` is used as the font name when the dictionary carries
    /// neither `/BaseFont` nor `/Name`.
    pub fn from_font_dict(doc: &Document, resource_name: &str, font: &Dictionary) -> Self {
        let name = name_entry(font, b"BaseFont")
            .or_else(|| name_entry(font, b"Name"))
            .unwrap_or_else(|| resource_name.to_string());
        let declared = name_entry(font, b"Subtype");

        let kind = match declared.as_deref() {
            Some("Type1") => FontKind::Type1 {
                program: descriptor_program(doc, font),
            },
            Some("MMType1") => FontKind::MmType1 {
                program: descriptor_program(doc, font),
            },
            Some("TrueType") => FontKind::TrueType {
                program: descriptor_program(doc, font),
            },
            Some("Type3") => FontKind::Type3 {
                program: char_procs_program(doc, font),
            },
            Some("Type0") => {
                let cid_font = descendant_font(doc, font);
                FontKind::Type0 {
                    descendant: cid_font.and_then(|cid| name_entry(cid, b"Subtype")),
                    program: cid_font.and_then(|cid| descriptor_program(doc, cid)),
                }
            }
            Some(other) => FontKind::Other {
                subtype: other.to_string(),
                program: descriptor_program(doc, font),
            },
            None => FontKind::Other {
                subtype: String::new(),
                program: descriptor_program(doc, font),
            },
        };

        let subtype = match &kind {
            FontKind::Type0 { descendant, program } => program
                .as_ref()
                .and_then(|p| p.format.clone())
                .or_else(|| descendant.clone()),
            other => other.glyph_program().and_then(|p| p.format.clone()),
        };

        Self {
            name,
            font_type: declared.unwrap_or_else(|| UNKNOWN_FONT_TYPE.to_string()),
            subtype,
            kind,
        }
    }
}

/// Whether the font's glyph program is embedded in the document
pub fn is_embedded(descriptor: &FontDescriptor) -> bool {
    descriptor
        .kind
        .glyph_program()
        .is_some_and(|program| program.length > 0)
}

/// First DescendantFonts entry of a composite font
fn descendant_font<'a>(doc: &'a Document, font: &'a Dictionary) -> Option<&'a Dictionary> {
    let descendants = resolve(doc, font.get(b"DescendantFonts").ok()?).ok()?;
    let first = descendants.as_array().ok()?.first()?;
    resolve_dict(doc, first)
}

/// Look through the font's `/FontDescriptor` for a glyph program stream.
///
/// A non-empty stream wins over an empty one in an earlier slot.
fn descriptor_program(doc: &Document, font: &Dictionary) -> Option<GlyphProgram> {
    let descriptor = dict_entry(doc, font, b"FontDescriptor")?;

    let found: Vec<GlyphProgram> = FONT_FILE_SLOTS
        .iter()
        .filter_map(|&slot| {
            let stream = resolve(doc, descriptor.get(slot.key()).ok()?).ok()?.as_stream().ok()?;
            Some(GlyphProgram {
                slot,
                length: stream.content.len(),
                format: name_entry(&stream.dict, b"Subtype"),
            })
        })
        .collect();

    let index = found.iter().position(|p| p.length > 0).unwrap_or(0);
    found.into_iter().nth(index)
}

/// Type3 glyphs are content streams in `/CharProcs`
fn char_procs_program(doc: &Document, font: &Dictionary) -> Option<GlyphProgram> {
    let procs = dict_entry(doc, font, GlyphSlot::CharProcs.key())?;
    let length = procs
        .iter()
        .filter_map(|(_, proc_ref)| resolve(doc, proc_ref).ok())
        .filter_map(|proc_obj| match proc_obj {
            Object::Stream(stream) => Some(stream.content.len()),
            _ => None,
        })
        .sum();

    Some(GlyphProgram {
        slot: GlyphSlot::CharProcs,
        length,
        format: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn font_file(doc: &mut Document, extra: Dictionary, bytes: &[u8]) -> lopdf::ObjectId {
        doc.add_object(Stream::new(extra, bytes.to_vec()))
    }

    #[test]
    fn test_placeholder() {
        let descriptor = FontDescriptor::placeholder("F7");
        assert_eq!(descriptor.name, "F7");
        assert_eq!(descriptor.font_type, "Unknown");
        assert_eq!(descriptor.subtype, None);
        assert!(!is_embedded(&descriptor));
    }

    #[test]
    fn test_standard_type1_not_embedded() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };

        let descriptor = FontDescriptor::from_font_dict(&doc, "F1", &font);
        assert_eq!(descriptor.name, "Helvetica");
        assert_eq!(descriptor.font_type, "Type1");
        assert_eq!(descriptor.kind, FontKind::Type1 { program: None });
        assert!(!is_embedded(&descriptor));
    }

    #[test]
    fn test_truetype_with_font_file2() {
        let mut doc = Document::with_version("1.5");
        let file_id = font_file(&mut doc, Dictionary::new(), b"\x00\x01\x00\x00ttf");
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "LiberationSerif",
            "FontFile2" => file_id,
        });
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "LiberationSerif",
            "FontDescriptor" => descriptor_id,
        };

        let descriptor = FontDescriptor::from_font_dict(&doc, "TT0", &font);
        assert!(is_embedded(&descriptor));
        assert_eq!(descriptor.kind.glyph_program().unwrap().slot, GlyphSlot::FontFile2);
        assert_eq!(descriptor.subtype, None);
    }

    #[test]
    fn test_type1_with_truetype_program() {
        let mut doc = Document::with_version("1.5");
        let file_id = font_file(&mut doc, Dictionary::new(), b"0123456789");
        let descriptor_id = doc.add_object(dictionary! { "FontFile2" => file_id });
        let font = dictionary! {
            "Subtype" => "Type1",
            "BaseFont" => "Mislabelled",
            "FontDescriptor" => descriptor_id,
        };

        let descriptor = FontDescriptor::from_font_dict(&doc, "F1", &font);
        assert_eq!(descriptor.font_type, "Type1");
        assert!(is_embedded(&descriptor));
        assert_eq!(descriptor.kind.glyph_program().unwrap().slot, GlyphSlot::FontFile2);
    }

    #[test]
    fn test_truetype_with_type1_program() {
        let mut doc = Document::with_version("1.5");
        let file_id = font_file(&mut doc, Dictionary::new(), b"%!PS-AdobeFont-1.0");
        let descriptor_id = doc.add_object(dictionary! { "FontFile" => file_id });
        let font = dictionary! {
            "Subtype" => "TrueType",
            "BaseFont" => "Mislabelled",
            "FontDescriptor" => descriptor_id,
        };

        let descriptor = FontDescriptor::from_font_dict(&doc, "F1", &font);
        assert!(is_embedded(&descriptor));
        assert_eq!(descriptor.kind.glyph_program().unwrap().slot, GlyphSlot::FontFile);
    }

    #[test]
    fn test_empty_font_file_is_not_embedded() {
        let mut doc = Document::with_version("1.5");
        let file_id = font_file(&mut doc, Dictionary::new(), b"");
        let descriptor_id = doc.add_object(dictionary! { "FontFile" => file_id });
        let font = dictionary! {
            "Subtype" => "Type1",
            "BaseFont" => "Garamond",
            "FontDescriptor" => descriptor_id,
        };

        let descriptor = FontDescriptor::from_font_dict(&doc, "F1", &font);
        assert!(descriptor.kind.glyph_program().is_some());
        assert!(!is_embedded(&descriptor));
    }

    #[test]
    fn test_type1c_reports_format() {
        let mut doc = Document::with_version("1.5");
        let file_id = font_file(&mut doc, dictionary! { "Subtype" => "Type1C" }, b"cff data");
        let descriptor_id = doc.add_object(dictionary! { "FontFile3" => file_id });
        let font = dictionary! {
            "Subtype" => "Type1",
            "BaseFont" => "ABCDEF+Minion",
            "FontDescriptor" => descriptor_id,
        };

        let descriptor = FontDescriptor::from_font_dict(&doc, "F1", &font);
        assert!(is_embedded(&descriptor));
        assert_eq!(descriptor.subtype.as_deref(), Some("Type1C"));
    }

    #[test]
    fn test_type0_uses_descendant_program() {
        let mut doc = Document::with_version("1.5");
        let file_id = font_file(&mut doc, Dictionary::new(), b"glyf");
        let descriptor_id = doc.add_object(dictionary! { "FontFile2" => file_id });
        let cid_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "NotoSans",
            "FontDescriptor" => descriptor_id,
        });
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "NotoSans",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_id)],
        };

        let descriptor = FontDescriptor::from_font_dict(&doc, "C0", &font);
        assert_eq!(descriptor.font_type, "Type0");
        assert_eq!(descriptor.subtype.as_deref(), Some("CIDFontType2"));
        assert!(is_embedded(&descriptor));
    }

    #[test]
    fn test_type0_without_descendants() {
        let doc = Document::with_version("1.5");
        let font = dictionary! { "Subtype" => "Type0", "BaseFont" => "Broken" };

        let descriptor = FontDescriptor::from_font_dict(&doc, "C0", &font);
        assert!(!is_embedded(&descriptor));
        assert_eq!(descriptor.subtype, None);
    }

    #[test]
    fn test_type3_char_procs() {
        let mut doc = Document::with_version("1.5");
        let glyph_id = doc.add_object(Stream::new(Dictionary::new(), b"0 0 m 10 10 l S".to_vec()));
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type3",
            "CharProcs" => dictionary! { "a" => glyph_id },
        };

        let descriptor = FontDescriptor::from_font_dict(&doc, "T3", &font);
        assert_eq!(descriptor.name, "T3");
        assert!(is_embedded(&descriptor));
        assert_eq!(descriptor.kind.glyph_program().unwrap().slot, GlyphSlot::CharProcs);
    }

    #[test]
    fn test_missing_subtype_is_unknown_type() {
        let doc = Document::with_version("1.5");
        let font = dictionary! { "Type" => "Font" };

        let descriptor = FontDescriptor::from_font_dict(&doc, "F2", &font);
        assert_eq!(descriptor.name, "F2");
        assert_eq!(descriptor.font_type, "Unknown");
        assert!(!is_embedded(&descriptor));
    }
}
