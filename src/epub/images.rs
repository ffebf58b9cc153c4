//! Extraction of manifest images into an embeddable lookup table.
//!
//! Chapter markup references the same image half a dozen different ways
//! (`pic.png`, `../images/pic.png`, `images/pic.png`, ...). The store keeps
//! one entry per canonical key and resolves references by generating
//! candidate paths in a fixed priority order at lookup time.

use std::collections::HashMap;

use log::{debug, warn};

use crate::epub::archive::EpubArchive;
use crate::epub::package::PackageDocument;
use crate::util;

/// Lookup table from archive path variants to image data URLs.
#[derive(Default)]
pub struct ImageStore {
    urls: HashMap<String, String>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one extracted image under its canonical keys: the manifest
    /// href, the resolved archive path, and the bare filename.
    pub fn insert(&mut self, href: &str, full_path: &str, url: String) {
        let filename = href.rsplit('/').next().unwrap_or(href);
        self.urls.insert(filename.to_string(), url.clone());
        self.urls.insert(full_path.to_string(), url.clone());
        self.urls.insert(href.to_string(), url);
    }

    /// Resolve a chapter-relative image reference to its data URL.
    pub fn resolve(&self, src: &str, base_path: &str) -> Option<&str> {
        for candidate in lookup_candidates(src, base_path) {
            if let Some(url) = self.urls.get(&candidate) {
                return Some(url.as_str());
            }
        }
        None
    }

    /// Number of registered keys (not distinct images).
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Candidate keys for a reference, in resolution priority order: exact,
/// stripped `../`, stripped `./`, bare filename, conventional images
/// folder, and the chapter's base-joined path.
fn lookup_candidates(src: &str, base_path: &str) -> Vec<String> {
    let mut candidates = vec![src.to_string()];

    if let Some(stripped) = src.strip_prefix("../") {
        candidates.push(stripped.to_string());
    }
    if let Some(stripped) = src.strip_prefix("./") {
        candidates.push(stripped.to_string());
    }

    let filename = src.rsplit('/').next().unwrap_or(src);
    candidates.push(filename.to_string());
    candidates.push(format!("images/{}", filename));

    if !base_path.is_empty() {
        candidates.push(format!("{}/{}", base_path, src));
    }

    candidates
}

/// Extract every manifest image into the store. Unreadable entries are
/// skipped; a book with a few missing images is still readable.
pub fn harvest_images(archive: &mut EpubArchive, pkg: &PackageDocument) -> ImageStore {
    let mut store = ImageStore::new();

    for entry in pkg.images() {
        let full_path = pkg.resolve_href(&entry.href);
        match archive.read_bytes(&full_path) {
            Ok(data) => {
                store.insert(&entry.href, &full_path, util::data_url(&entry.media_type, &data));
            }
            Err(err) => {
                warn!("could not extract image {full_path}: {err}");
            }
        }
    }

    debug!("harvested {} image lookup keys", store.len());
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(href: &str, full_path: &str) -> ImageStore {
        let mut store = ImageStore::new();
        store.insert(href, full_path, "data:image/png;base64,AA".to_string());
        store
    }

    #[test]
    fn test_resolve_exact_href() {
        let store = store_with("images/pic.png", "OEBPS/images/pic.png");
        assert!(store.resolve("images/pic.png", "OEBPS").is_some());
    }

    #[test]
    fn test_resolve_full_path() {
        let store = store_with("images/pic.png", "OEBPS/images/pic.png");
        assert!(store.resolve("OEBPS/images/pic.png", "OEBPS").is_some());
    }

    #[test]
    fn test_resolve_bare_filename() {
        let store = store_with("images/pic.png", "OEBPS/images/pic.png");
        assert!(store.resolve("pic.png", "OEBPS").is_some());
    }

    #[test]
    fn test_resolve_parent_relative() {
        let store = store_with("images/pic.png", "OEBPS/images/pic.png");
        assert!(store.resolve("../images/pic.png", "OEBPS").is_some());
    }

    #[test]
    fn test_resolve_dot_relative() {
        let store = store_with("images/pic.png", "OEBPS/images/pic.png");
        assert!(store.resolve("./images/pic.png", "OEBPS").is_some());
    }

    #[test]
    fn test_resolve_prefers_exact_over_filename_alias() {
        let mut store = ImageStore::new();
        store.insert("art/pic.png", "OEBPS/art/pic.png", "data:first".to_string());
        store.insert("extra/pic.png", "OEBPS/extra/pic.png", "data:second".to_string());

        // The shared filename alias was overwritten by the second insert,
        // but exact references still find the right image.
        assert_eq!(store.resolve("art/pic.png", "OEBPS"), Some("data:first"));
        assert_eq!(store.resolve("extra/pic.png", "OEBPS"), Some("data:second"));
        assert_eq!(store.resolve("pic.png", "OEBPS"), Some("data:second"));
    }

    #[test]
    fn test_resolve_foreign_dir_falls_back_to_filename() {
        let store = store_with("images/pic.png", "images/pic.png");
        assert!(store.resolve("illustrations/pic.png", "").is_some());
    }

    #[test]
    fn test_resolve_miss() {
        let store = store_with("images/pic.png", "OEBPS/images/pic.png");
        assert!(store.resolve("other.png", "OEBPS").is_none());
        assert!(ImageStore::new().resolve("pic.png", "").is_none());
    }

    #[test]
    fn test_lookup_candidate_order() {
        let candidates = lookup_candidates("../art/pic.png", "OEBPS");
        assert_eq!(
            candidates,
            vec![
                "../art/pic.png",
                "art/pic.png",
                "pic.png",
                "images/pic.png",
                "OEBPS/../art/pic.png",
            ]
        );
    }
}
