//! Cover image resolution.
//!
//! Books declare covers in at least four incompatible ways; each strategy
//! below is tried in order and the first hit wins. A book with no
//! resolvable cover still loads.

use log::{debug, warn};

use crate::content;
use crate::epub::archive::EpubArchive;
use crate::epub::package::PackageDocument;
use crate::util;

/// Case-insensitive name fragments that mark an image as a likely cover.
const COVER_NAMES: [&str; 3] = ["cover-image", "coverimage", "cover"];

/// Resolve the cover image to an embeddable data URL.
pub fn resolve_cover(archive: &mut EpubArchive, pkg: &PackageDocument) -> Option<String> {
    let href = declared_cover(pkg)
        .or_else(|| guide_cover(archive, pkg))
        .or_else(|| named_cover(pkg))
        .or_else(|| first_image(pkg));

    let Some(href) = href else {
        debug!("no cover image found");
        return None;
    };

    let full_path = pkg.resolve_href(&href);
    match archive.read_bytes(&full_path) {
        Ok(data) => Some(util::data_url(util::image_mime_type(&href), &data)),
        Err(err) => {
            warn!("could not extract cover image {full_path}: {err}");
            None
        }
    }
}

/// Strategy 1: a cover declared in the package document, either via
/// `meta[name="cover"]` (EPUB2) or an item's `cover-image` property (EPUB3).
/// The meta declaration takes precedence.
fn declared_cover(pkg: &PackageDocument) -> Option<String> {
    if let Some(id) = &pkg.cover_id
        && let Some(entry) = pkg.manifest.get(id)
    {
        return Some(entry.href.clone());
    }
    pkg.cover_property_href.clone()
}

/// Strategy 2: a guide `reference[type="cover"]` pointing at an HTML cover
/// page; the page's first `img` is the cover. Failures here are swallowed
/// so later strategies still run.
fn guide_cover(archive: &mut EpubArchive, pkg: &PackageDocument) -> Option<String> {
    let href = pkg.guide_cover_href.as_ref()?;
    let page_path = pkg.resolve_href(href);

    match archive.read_text(&page_path) {
        Ok(page) => content::first_img_src(&page),
        Err(err) => {
            warn!("could not read guide cover page {page_path}: {err}");
            None
        }
    }
}

/// Strategy 3: a manifest image whose id or href looks like a cover name.
fn named_cover(pkg: &PackageDocument) -> Option<String> {
    for entry in pkg.images() {
        let id = entry.id.to_lowercase();
        let href = entry.href.to_lowercase();
        if COVER_NAMES
            .iter()
            .any(|name| id.contains(name) || href.contains(name))
        {
            return Some(entry.href.clone());
        }
    }
    None
}

/// Strategy 4: the first manifest image, regardless of name.
fn first_image(pkg: &PackageDocument) -> Option<String> {
    pkg.images().next().map(|entry| entry.href.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Manifest, ManifestEntry};

    fn package(entries: &[(&str, &str, &str)]) -> PackageDocument {
        let mut manifest = Manifest::new();
        let mut manifest_order = Vec::new();
        for (id, href, media_type) in entries {
            manifest_order.push(id.to_string());
            manifest.insert(
                id.to_string(),
                ManifestEntry {
                    id: id.to_string(),
                    href: href.to_string(),
                    media_type: media_type.to_string(),
                },
            );
        }
        PackageDocument {
            metadata: Default::default(),
            manifest,
            manifest_order,
            spine: Vec::new(),
            base_path: String::new(),
            cover_id: None,
            cover_property_href: None,
            guide_cover_href: None,
        }
    }

    #[test]
    fn test_declared_cover_meta_beats_property() {
        let mut pkg = package(&[("the-cover", "art/front.jpg", "image/jpeg")]);
        pkg.cover_id = Some("the-cover".to_string());
        pkg.cover_property_href = Some("other.png".to_string());

        assert_eq!(declared_cover(&pkg).as_deref(), Some("art/front.jpg"));
    }

    #[test]
    fn test_declared_cover_property_fallback() {
        let mut pkg = package(&[]);
        pkg.cover_property_href = Some("front.png".to_string());

        assert_eq!(declared_cover(&pkg).as_deref(), Some("front.png"));
    }

    #[test]
    fn test_declared_cover_dangling_id() {
        let mut pkg = package(&[]);
        pkg.cover_id = Some("nope".to_string());

        assert_eq!(declared_cover(&pkg), None);
    }

    #[test]
    fn test_named_cover() {
        let pkg = package(&[
            ("ch1", "ch1.xhtml", "application/xhtml+xml"),
            ("pic", "illustrations/map.png", "image/png"),
            ("img9", "images/Cover-Art.jpg", "image/jpeg"),
        ]);

        assert_eq!(named_cover(&pkg).as_deref(), Some("images/Cover-Art.jpg"));
    }

    #[test]
    fn test_named_cover_matches_id() {
        let pkg = package(&[("coverimage", "front.jpg", "image/jpeg")]);
        assert_eq!(named_cover(&pkg).as_deref(), Some("front.jpg"));
    }

    #[test]
    fn test_first_image_fallback() {
        let pkg = package(&[
            ("css", "style.css", "text/css"),
            ("pic", "art/plate1.png", "image/png"),
            ("pic2", "art/plate2.png", "image/png"),
        ]);

        assert_eq!(first_image(&pkg).as_deref(), Some("art/plate1.png"));
    }

    #[test]
    fn test_no_images_at_all() {
        let pkg = package(&[("ch1", "ch1.xhtml", "application/xhtml+xml")]);
        assert_eq!(named_cover(&pkg), None);
        assert_eq!(first_image(&pkg), None);
    }
}
