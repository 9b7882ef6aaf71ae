//! Font records and the final report

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::fonts::{is_embedded, FontDescriptor};
use crate::pdf::DocumentInfo;

/// One font used by the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub font_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub embedded: bool,
}

impl From<&FontDescriptor> for FontRecord {
    fn from(descriptor: &FontDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            font_type: descriptor.font_type.clone(),
            subtype: descriptor.subtype.clone(),
            embedded: is_embedded(descriptor),
        }
    }
}

/// A page whose content could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWarning {
    /// 1-based page number
    pub page: u32,
    pub message: String,
}

/// Result of analysing one document
#[derive(Debug, Clone, Serialize)]
pub struct FontReport {
    /// One record per font name, embedded fonts first
    pub fonts: Vec<FontRecord>,
    /// Pages whose content was read successfully
    pub pages_scanned: u32,
    pub warnings: Vec<PageWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentInfo>,
}

impl FontReport {
    pub fn embedded(&self) -> impl Iterator<Item = &FontRecord> {
        self.fonts.iter().filter(|f| f.embedded)
    }

    pub fn not_embedded(&self) -> impl Iterator<Item = &FontRecord> {
        self.fonts.iter().filter(|f| !f.embedded)
    }
}

/// Collapse per-occurrence records into the final ordering.
///
/// The first record seen for a name is kept and later ones are dropped, even
/// if a later occurrence resolved to a richer descriptor. The survivors are
/// ordered embedded first, then by [`compare_names`].
pub fn collapse(occurrences: Vec<FontRecord>) -> Vec<FontRecord> {
    let mut seen = HashSet::new();
    let mut fonts: Vec<FontRecord> = occurrences
        .into_iter()
        .filter(|record| seen.insert(record.name.clone()))
        .collect();

    fonts.sort_by(|a, b| {
        b.embedded
            .cmp(&a.embedded)
            .then_with(|| compare_names(&a.name, &b.name))
    });
    fonts
}

/// Dictionary-style name ordering.
///
/// Letters compare case-insensitively first. Names that differ only in case
/// put the lowercase form first; anything still equal falls back to code
/// point order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);

    folded_a.cmp(folded_b).then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            })
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    })
}
