use std::collections::HashMap;

/// Book-level metadata extracted from the package document.
///
/// Fields that the package document omits keep their defaults; absence is
/// never an error. `cover_url` is filled in by cover resolution and stays
/// `None` when no cover could be extracted.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct BookMetadata {
    pub title: String,
    pub creator: String,
    pub language: String,
    pub identifier: String,
    pub cover_url: Option<String>,
}

impl Default for BookMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Title".to_string(),
            creator: "Unknown Author".to_string(),
            language: "en".to_string(),
            identifier: String::new(),
            cover_url: None,
        }
    }
}

/// One resource declared in the package manifest.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub id: String,
    /// Path relative to the package document's directory.
    pub href: String,
    pub media_type: String,
}

impl ManifestEntry {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    pub fn is_document(&self) -> bool {
        self.media_type == "application/xhtml+xml" || self.media_type == "text/html"
    }
}

/// Manifest id → resource descriptor, built once from the package document.
pub type Manifest = HashMap<String, ManifestEntry>;

/// One renderable chapter, materialized from a spine reference.
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: String,
    /// Full archive path of the chapter document.
    pub path: String,
    pub raw_content: String,
    pub title: String,
    /// Directory of the package document, for resolving relative resources.
    pub base_path: String,
}

/// Current reading position.
///
/// The two sentinel pages are always valid; the chapter index is kept in
/// bounds by the navigation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Cover,
    Toc,
    Chapter(usize),
}

impl Position {
    /// Short human-readable label, e.g. for a header line.
    pub fn label(&self) -> String {
        match self {
            Position::Cover => "Cover".to_string(),
            Position::Toc => "Table of Contents".to_string(),
            Position::Chapter(i) => format!("Chapter {}", i + 1),
        }
    }
}
