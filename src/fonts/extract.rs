//! Font selections in content streams

use lopdf::content::Operation;

use crate::pdf::name_text;

/// The text state operator that selects a font: `/F1 12 Tf`
pub const SET_FONT: &str = "Tf";

/// One font selection in a content stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontReference {
    /// Resource name without the leading slash. Bytes that are not UTF-8
    /// appear as `#XX` escapes.
    pub name: String,
}

/// Font selections in stream order, duplicates included.
///
/// Malformed `Tf` operators (no operands, or a first operand that is not a
/// name) are skipped. The font size operand is not used.
pub fn font_references(operations: &[Operation]) -> impl Iterator<Item = FontReference> + '_ {
    operations
        .iter()
        .filter(|op| op.operator == SET_FONT)
        .filter_map(|op| {
            let name = op.operands.first()?.as_name().ok()?;
            Some(FontReference { name: name_text(name) })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Content;
    use lopdf::Object;

    fn names(operations: &[Operation]) -> Vec<String> {
        font_references(operations).map(|r| r.name).collect()
    }

    #[test]
    fn test_references_in_stream_order() {
        let content = Content::decode(
            b"BT /F2 12 Tf (a) Tj /F1 10 Tf (b) Tj /F2 12 Tf (c) Tj ET",
        )
        .unwrap();

        assert_eq!(names(&content.operations), vec!["F2", "F1", "F2"]);
    }

    #[test]
    fn test_non_utf8_names_not_merged() {
        let operations = vec![
            Operation::new("Tf", vec![Object::Name(b"\x82\x72".to_vec()), Object::Integer(9)]),
            Operation::new("Tf", vec![Object::Name(b"\x82\x71".to_vec()), Object::Integer(9)]),
        ];

        assert_eq!(names(&operations), vec!["#82r", "#82q"]);
    }

    #[test]
    fn test_other_operators_ignored() {
        let content = Content::decode(b"0 0 m 100 100 l S /GS0 gs /Im0 Do").unwrap();
        assert!(names(&content.operations).is_empty());
    }

    #[test]
    fn test_malformed_operands_skipped() {
        let operations = vec![
            Operation::new("Tf", vec![]),
            Operation::new("Tf", vec![Object::Integer(12), Object::Name(b"F1".to_vec())]),
            Operation::new("Tf", vec![Object::string_literal("F2"), Object::Integer(12)]),
            Operation::new("Tf", vec![Object::Name(b"F3".to_vec()), Object::Integer(12)]),
        ];

        assert_eq!(names(&operations), vec!["F3"]);
    }

    #[test]
    fn test_name_without_size_is_accepted() {
        let operations = vec![Operation::new("Tf", vec![Object::Name(b"F1".to_vec())])];
        assert_eq!(names(&operations), vec!["F1"]);
    }
}
