//! Font resource scopes
//!
//! A scope maps the font resource names used inside content streams (`/F1`,
//! `/TT0`, ...) to font dictionaries. Each page has two of them: the fonts
//! declared on the page itself and the fonts shared through the page tree.

use async_trait::async_trait;
use lopdf::{Dictionary, Document};
use thiserror::Error;

use crate::fonts::FontDescriptor;
use crate::pdf::{name_bytes, resolve_dict};

/// Why a scope could not produce a descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("font resource /{0} not declared in this scope")]
    NotFound(String),

    #[error("font resource /{0} does not resolve to a dictionary")]
    NotADictionary(String),
}

/// A named lookup table from font resource names to descriptors.
///
/// Lookups are asynchronous so that a scope may defer resolution; callers
/// bound every lookup with a timeout.
#[async_trait]
pub trait FontScope: Send + Sync {
    /// Whether the scope declares `name` at all
    fn contains(&self, name: &str) -> bool;

    /// Resolve `name` to a font descriptor
    async fn lookup(&self, name: &str) -> Result<FontDescriptor, LookupError>;
}

/// A scope backed by a `/Font` resource dictionary
#[derive(Debug, Clone, Copy)]
pub struct FontDictScope<'a> {
    doc: &'a Document,
    fonts: Option<&'a Dictionary>,
}

impl<'a> FontDictScope<'a> {
    pub fn new(doc: &'a Document, fonts: Option<&'a Dictionary>) -> Self {
        Self { doc, fonts }
    }

    /// Scope over the `/Font` entry of a `/Resources` dictionary
    pub fn from_resources(doc: &'a Document, resources: Option<&'a Dictionary>) -> Self {
        let fonts = resources
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|font| resolve_dict(doc, font));
        Self::new(doc, fonts)
    }
}

#[async_trait]
impl<'a> FontScope for FontDictScope<'a> {
    fn contains(&self, name: &str) -> bool {
        self.fonts.is_some_and(|fonts| fonts.has(&name_bytes(name)))
    }

    async fn lookup(&self, name: &str) -> Result<FontDescriptor, LookupError> {
        let entry = self
            .fonts
            .and_then(|fonts| fonts.get(&name_bytes(name)).ok())
            .ok_or_else(|| LookupError::NotFound(name.to_string()))?;

        let font = resolve_dict(self.doc, entry)
            .ok_or_else(|| LookupError::NotADictionary(name.to_string()))?;

        Ok(FontDescriptor::from_font_dict(self.doc, name, font))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object};

    fn document_with_font() -> (Document, Dictionary) {
        let mut doc = Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
                "Bad" => 42,
            },
        };
        (doc, resources)
    }

    #[tokio::test]
    async fn test_lookup_declared_font() {
        let (doc, resources) = document_with_font();
        let scope = FontDictScope::from_resources(&doc, Some(&resources));

        assert!(scope.contains("F1"));
        let descriptor = scope.lookup("F1").await.unwrap();
        assert_eq!(descriptor.name, "Helvetica");
        assert_eq!(descriptor.font_type, "Type1");
    }

    #[tokio::test]
    async fn test_lookup_missing_font() {
        let (doc, resources) = document_with_font();
        let scope = FontDictScope::from_resources(&doc, Some(&resources));

        assert!(!scope.contains("F9"));
        assert_eq!(
            scope.lookup("F9").await.unwrap_err(),
            LookupError::NotFound("F9".to_string())
        );
    }

    #[tokio::test]
    async fn test_lookup_non_dictionary_entry() {
        let (doc, resources) = document_with_font();
        let scope = FontDictScope::from_resources(&doc, Some(&resources));

        assert!(scope.contains("Bad"));
        assert_eq!(
            scope.lookup("Bad").await.unwrap_err(),
            LookupError::NotADictionary("Bad".to_string())
        );
    }

    #[tokio::test]
    async fn test_font_dictionary_behind_reference() {
        let (mut doc, resources) = document_with_font();
        let fonts = resources.get(b"Font").unwrap().clone();
        let fonts_id = doc.add_object(fonts);
        let resources = dictionary! { "Font" => Object::Reference(fonts_id) };

        let scope = FontDictScope::from_resources(&doc, Some(&resources));
        assert!(scope.contains("F1"));
        assert!(scope.contains("Bad"));
    }

    #[test]
    fn test_scope_without_font_dictionary() {
        let doc = Document::with_version("1.5");
        let scope = FontDictScope::from_resources(&doc, None);
        assert!(!scope.contains("F1"));
    }

    #[tokio::test]
    async fn test_lookup_non_utf8_resource_name() {
        let mut doc = Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! { "Subtype" => "Type1" });
        let mut fonts = Dictionary::new();
        fonts.set(b"F\x8e".to_vec(), font_id);
        let resources = dictionary! { "Font" => fonts };
        let scope = FontDictScope::from_resources(&doc, Some(&resources));

        assert!(scope.contains("F#8E"));
        let descriptor = scope.lookup("F#8E").await.unwrap();
        assert_eq!(descriptor.name, "F#8E");
    }
}
