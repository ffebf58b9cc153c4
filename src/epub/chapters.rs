//! Spine materialization: reading-order documents become chapter records.

use log::{debug, warn};

use crate::book::ChapterRecord;
use crate::content;
use crate::epub::archive::EpubArchive;
use crate::epub::package::PackageDocument;

/// Maximum display-title length before truncation.
const TITLE_MAX_CHARS: usize = 50;

/// Walk the spine in order and load every (X)HTML document it references.
///
/// Spine ids missing from the manifest, non-document media types, and
/// unreadable entries are skipped without aborting the book.
pub fn materialize_spine(archive: &mut EpubArchive, pkg: &PackageDocument) -> Vec<ChapterRecord> {
    let mut chapters = Vec::new();

    for idref in &pkg.spine {
        let Some(entry) = pkg.manifest.get(idref) else {
            debug!("spine id {idref} not in manifest, skipping");
            continue;
        };
        if !entry.is_document() {
            continue;
        }

        let full_path = pkg.resolve_href(&entry.href);
        let raw_content = match archive.read_text(&full_path) {
            Ok(content) => content,
            Err(err) => {
                warn!("could not load chapter {full_path}: {err}");
                continue;
            }
        };

        let title = derive_title(&raw_content, chapters.len() + 1);
        chapters.push(ChapterRecord {
            id: idref.clone(),
            path: full_path,
            raw_content,
            title,
            base_path: pkg.base_path.clone(),
        });
    }

    debug!("materialized {} spine documents", chapters.len());
    chapters
}

/// Derive a display title for a chapter.
///
/// Tries the first h1/h2/h3 heading, then the `<title>` element, then
/// elements with common chapter-heading class names, and finally falls
/// back to `"Chapter N"`. A redundant `"Chapter N:"` prefix is stripped
/// and long titles are truncated.
pub fn derive_title(markup: &str, number: usize) -> String {
    let fallback = || format!("Chapter {number}");

    match content::title_candidates(markup).best() {
        Some(raw) => {
            let cleaned = clean_title(&raw);
            if cleaned.is_empty() { fallback() } else { cleaned }
        }
        None => fallback(),
    }
}

fn clean_title(raw: &str) -> String {
    let stripped = strip_chapter_prefix(raw.trim()).trim();

    if stripped.chars().count() > TITLE_MAX_CHARS {
        let mut truncated: String = stripped.chars().take(TITLE_MAX_CHARS).collect();
        truncated.push('\u{2026}');
        truncated
    } else {
        stripped.to_string()
    }
}

/// Strip a leading `"chapter <digits> [:]"` prefix, case-insensitively.
fn strip_chapter_prefix(title: &str) -> &str {
    const PREFIX: &str = "chapter";

    // Byte-wise comparison; a non-ASCII first character can't match anyway
    if title.len() < PREFIX.len()
        || !title.as_bytes()[..PREFIX.len()].eq_ignore_ascii_case(PREFIX.as_bytes())
    {
        return title;
    }

    let rest = &title[PREFIX.len()..];
    // Whitespace between the word and the number is required
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        return title;
    }

    let digits = after_ws
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_ws.len());
    if digits == 0 {
        return title;
    }

    let mut tail = after_ws[digits..].trim_start();
    if let Some(stripped) = tail.strip_prefix(':') {
        tail = stripped.trim_start();
    }
    tail
}
