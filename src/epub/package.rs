//! Package document location and parsing (container.xml, OPF).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::book::{BookMetadata, Manifest, ManifestEntry};
use crate::content::{attr_value, local_name, resolve_entity};
use crate::epub::archive::EpubArchive;
use crate::error::{Error, Result};

/// Fixed location of the container descriptor.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Everything extracted from the package document in one parse.
pub struct PackageDocument {
    pub metadata: BookMetadata,
    /// Manifest id → resource descriptor.
    pub manifest: Manifest,
    /// Manifest ids in document order, for deterministic scans.
    pub manifest_order: Vec<String>,
    /// Ordered manifest ids defining the reading order.
    pub spine: Vec<String>,
    /// Directory of the package document ("" when at archive root).
    pub base_path: String,
    /// `meta[name="cover"]` content attribute (a manifest id).
    pub cover_id: Option<String>,
    /// Href of a manifest item carrying the `cover-image` property.
    pub cover_property_href: Option<String>,
    /// Href of a guide `reference[type="cover"]` page.
    pub guide_cover_href: Option<String>,
}

impl PackageDocument {
    /// Resolve a manifest-relative href to a full archive path.
    pub fn resolve_href(&self, href: &str) -> String {
        if self.base_path.is_empty() {
            href.to_string()
        } else {
            format!("{}/{}", self.base_path, href)
        }
    }

    /// Manifest image entries in document order.
    pub fn images(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.manifest_order
            .iter()
            .filter_map(|id| self.manifest.get(id))
            .filter(|entry| entry.is_image())
    }
}

/// Find the package document path via the container descriptor.
pub fn locate_package(archive: &mut EpubArchive) -> Result<String> {
    if !archive.has_entry(CONTAINER_PATH) {
        return Err(Error::MissingContainer);
    }
    let content = archive.read_text(CONTAINER_PATH)?;
    parse_container(&content)
}

/// Read and parse the package document.
pub fn read_package(archive: &mut EpubArchive, package_path: &str) -> Result<PackageDocument> {
    if !archive.has_entry(package_path) {
        return Err(Error::MissingPackageFile(package_path.to_string()));
    }
    let content = archive.read_text(package_path)?;
    parse_package_document(&content, package_path)
}

/// Parse container.xml, selecting the first `rootfile` that declares the
/// package media type.
fn parse_container(content: &str) -> Result<String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                let media_type = attr_value(&e, b"media-type");
                if media_type.as_deref() == Some(PACKAGE_MEDIA_TYPE)
                    && let Some(path) = attr_value(&e, b"full-path")
                    && !path.is_empty()
                {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::malformed_xml(CONTAINER_PATH, e)),
            _ => {}
        }
    }

    Err(Error::MissingPackagePath)
}

fn parse_package_document(content: &str, package_path: &str) -> Result<PackageDocument> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let base_path = package_path
        .rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default();

    let mut builder = PackageBuilder::default();
    let mut in_metadata = false;
    let mut in_guide = false;
    let mut current_field: Option<Field> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match local {
                    b"metadata" => in_metadata = true,
                    b"guide" => in_guide = true,
                    b"title" | b"creator" | b"language" | b"identifier" if in_metadata => {
                        current_field = Field::from_local(local);
                        buf_text.clear();
                    }
                    _ => builder.element(local, &e, in_guide),
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                builder.element(local, &e, in_guide);
            }
            Ok(Event::Text(e)) => {
                if current_field.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current_field.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match local {
                    b"metadata" => in_metadata = false,
                    b"guide" => in_guide = false,
                    _ => {}
                }

                if let Some(field) = current_field.take() {
                    builder.fields.set_from_tag(field, buf_text.trim());
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::malformed_xml(package_path, e)),
            _ => {}
        }
    }

    Ok(builder.finish(base_path))
}

/// Accumulates manifest, spine, and cover hints while walking the package
/// document.
#[derive(Default)]
struct PackageBuilder {
    manifest: Manifest,
    manifest_order: Vec<String>,
    spine: Vec<String>,
    cover_id: Option<String>,
    cover_property_href: Option<String>,
    guide_cover_href: Option<String>,
    fields: MetadataFields,
}

impl PackageBuilder {
    /// Handle one structural element (anything except the metadata text
    /// fields, which need cross-event text accumulation).
    fn element(&mut self, local: &[u8], e: &BytesStart, in_guide: bool) {
        match local {
            b"item" => self.add_item(e),
            b"itemref" => {
                if let Some(idref) = attr_value(e, b"idref")
                    && !idref.is_empty()
                {
                    self.spine.push(idref);
                }
            }
            b"meta" => self.add_meta(e),
            b"reference" if in_guide => {
                if self.guide_cover_href.is_none()
                    && attr_value(e, b"type").as_deref() == Some("cover")
                    && let Some(href) = attr_value(e, b"href")
                    && !href.is_empty()
                {
                    self.guide_cover_href = Some(href);
                }
            }
            _ => {}
        }
    }

    fn add_item(&mut self, e: &BytesStart) {
        let Some(id) = attr_value(e, b"id") else {
            return;
        };
        if id.is_empty() {
            return;
        }
        let href = attr_value(e, b"href").unwrap_or_default();
        let media_type = attr_value(e, b"media-type").unwrap_or_default();

        // EPUB3 declares the cover via an item property
        if self.cover_property_href.is_none()
            && let Some(properties) = attr_value(e, b"properties")
            && properties
                .split_ascii_whitespace()
                .any(|p| p == "cover-image")
        {
            self.cover_property_href = Some(href.clone());
        }

        if !self.manifest.contains_key(&id) {
            self.manifest_order.push(id.clone());
        }
        self.manifest.insert(
            id.clone(),
            ManifestEntry {
                id,
                href,
                media_type,
            },
        );
    }

    fn add_meta(&mut self, e: &BytesStart) {
        let name = attr_value(e, b"name");
        let content = attr_value(e, b"content");
        if let (Some(name), Some(content)) = (name, content) {
            match name.as_str() {
                "cover" if !content.is_empty() => {
                    if self.cover_id.is_none() {
                        self.cover_id = Some(content);
                    }
                }
                // Attribute-based metadata scheme used by some books
                "title" | "creator" | "language" | "identifier" => {
                    if let Some(field) = Field::from_local(name.as_bytes()) {
                        self.fields.set_from_meta(field, content.trim());
                    }
                }
                _ => {}
            }
        }
    }

    fn finish(self, base_path: String) -> PackageDocument {
        PackageDocument {
            metadata: self.fields.into_metadata(),
            manifest: self.manifest,
            manifest_order: self.manifest_order,
            spine: self.spine,
            base_path,
            cover_id: self.cover_id,
            cover_property_href: self.cover_property_href,
            guide_cover_href: self.guide_cover_href,
        }
    }
}

// ----------------------------------------------------------------------------
// Metadata fields
// ----------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Field {
    Title,
    Creator,
    Language,
    Identifier,
}

impl Field {
    fn from_local(local: &[u8]) -> Option<Self> {
        match local {
            b"title" => Some(Field::Title),
            b"creator" => Some(Field::Creator),
            b"language" => Some(Field::Language),
            b"identifier" => Some(Field::Identifier),
            _ => None,
        }
    }
}

/// Metadata candidates from both schemes; element text beats the
/// attribute-based fallback, first occurrence wins within each.
#[derive(Default)]
struct MetadataFields {
    tag: [Option<String>; 4],
    meta: [Option<String>; 4],
}

impl MetadataFields {
    fn set_from_tag(&mut self, field: Field, value: &str) {
        Self::set(&mut self.tag, field, value);
    }

    fn set_from_meta(&mut self, field: Field, value: &str) {
        Self::set(&mut self.meta, field, value);
    }

    fn set(slots: &mut [Option<String>; 4], field: Field, value: &str) {
        let slot = &mut slots[field as usize];
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.to_string());
        }
    }

    fn take(&mut self, field: Field) -> Option<String> {
        self.tag[field as usize]
            .take()
            .or_else(|| self.meta[field as usize].take())
    }

    fn into_metadata(mut self) -> BookMetadata {
        let mut metadata = BookMetadata::default();
        if let Some(title) = self.take(Field::Title) {
            metadata.title = title;
        }
        if let Some(creator) = self.take(Field::Creator) {
            metadata.creator = creator;
        }
        if let Some(language) = self.take(Field::Language) {
            metadata.language = language;
        }
        if let Some(identifier) = self.take(Field::Identifier) {
            metadata.identifier = identifier;
        }
        metadata
    }
}
