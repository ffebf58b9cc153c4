//! Lenient scanning of chapter markup (XHTML or tag-soup HTML).
//!
//! Chapter documents in the wild are frequently not well-formed, so every
//! scanner here runs the parser with end-name checking disabled and treats
//! a parse error as "stop and use what we have" rather than a failure.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

pub mod rewrite;

/// Tags whose text content never counts as prose.
const NON_PROSE_TAGS: [&[u8]; 3] = [b"script", b"style", b"title"];

/// Class names commonly used for chapter headings.
const TITLE_CLASSES: [&str; 4] = ["chapter-title", "chapter-heading", "title", "heading"];

/// Result of a full-content scan: collapsed plain text and image count.
#[derive(Debug)]
pub struct ContentScan {
    /// Whitespace-collapsed text content, excluding script/style/title.
    pub text: String,
    pub image_count: usize,
    /// True when a parse error cut the scan short.
    pub truncated: bool,
}

/// Title sources found in one pass, in descending priority.
#[derive(Debug, Default)]
pub struct TitleCandidates {
    /// Text of the first h1/h2/h3 heading.
    pub heading: Option<String>,
    /// Text of the `<title>` element.
    pub doc_title: Option<String>,
    /// Text of the first element with a chapter-heading class.
    pub class_titled: Option<String>,
}

impl TitleCandidates {
    /// Best candidate by priority: heading, then document title, then
    /// class-based heading.
    pub fn best(self) -> Option<String> {
        self.heading.or(self.doc_title).or(self.class_titled)
    }
}

/// Extract plain text and image count from chapter markup.
pub fn scan(markup: &str) -> ContentScan {
    let mut reader = lenient_reader(markup);
    let mut text = String::new();
    let mut image_count = 0usize;
    let mut skip_depth = 0usize;
    let mut truncated = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if NON_PROSE_TAGS.contains(&local) {
                    skip_depth += 1;
                } else if local == b"img" {
                    image_count += 1;
                }
            }
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"img" {
                    image_count += 1;
                }
            }
            Ok(Event::End(e)) => {
                if NON_PROSE_TAGS.contains(&local_name(e.name().as_ref())) {
                    skip_depth = skip_depth.saturating_sub(1);
                }
            }
            Ok(Event::Text(e)) => {
                if skip_depth == 0 {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    text.push(' ');
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if skip_depth == 0 {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => {
                truncated = true;
                break;
            }
            _ => {}
        }
    }

    ContentScan {
        text: collapse_whitespace(&text),
        image_count,
        truncated,
    }
}

/// Collect title candidates from chapter markup in a single pass.
///
/// Scanning stops as soon as a heading is found, since nothing can
/// outrank it.
pub fn title_candidates(markup: &str) -> TitleCandidates {
    let mut reader = lenient_reader(markup);
    let mut candidates = TitleCandidates::default();

    // The element currently being captured: (tag, target slot, text so far)
    let mut active: Option<(Vec<u8>, Slot, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if active.is_none()
                    && let Some(slot) = capture_slot(&e, &candidates)
                {
                    active = Some((local_name(e.name().as_ref()).to_vec(), slot, String::new()));
                }
            }
            Ok(Event::Text(e)) => {
                if let Some((_, _, buf)) = &mut active {
                    buf.push_str(&String::from_utf8_lossy(e.as_ref()));
                    buf.push(' ');
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some((_, _, buf)) = &mut active {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        buf.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let closes_active = matches!(
                    &active,
                    Some((tag, _, _)) if local_name(e.name().as_ref()) == tag.as_slice()
                );
                if closes_active && let Some((_, slot, buf)) = active.take() {
                    commit(&mut candidates, slot, &buf);
                }
            }
            Ok(Event::Eof) => {
                // Malformed markup may never close the captured element
                if let Some((_, slot, buf)) = active.take() {
                    commit(&mut candidates, slot, &buf);
                }
                break;
            }
            Err(_) => break,
            _ => {}
        }

        if candidates.heading.is_some() {
            break;
        }
    }

    candidates
}

/// Find the `src` of the first `img` element, if any.
pub fn first_img_src(markup: &str) -> Option<String> {
    let mut reader = lenient_reader(markup);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"img"
                    && let Some(src) = attr_value(&e, b"src")
                    && !src.is_empty()
                {
                    return Some(src);
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Slot {
    Heading,
    DocTitle,
    ClassTitled,
}

fn capture_slot(e: &BytesStart, candidates: &TitleCandidates) -> Option<Slot> {
    let name = e.name();
    match local_name(name.as_ref()) {
        b"h1" | b"h2" | b"h3" if candidates.heading.is_none() => Some(Slot::Heading),
        b"title" if candidates.doc_title.is_none() => Some(Slot::DocTitle),
        _ if candidates.class_titled.is_none() && has_title_class(e) => Some(Slot::ClassTitled),
        _ => None,
    }
}

fn commit(candidates: &mut TitleCandidates, slot: Slot, buf: &str) {
    let text = collapse_whitespace(buf);
    if text.is_empty() {
        return;
    }
    let target = match slot {
        Slot::Heading => &mut candidates.heading,
        Slot::DocTitle => &mut candidates.doc_title,
        Slot::ClassTitled => &mut candidates.class_titled,
    };
    if target.is_none() {
        *target = Some(text);
    }
}

fn has_title_class(e: &BytesStart) -> bool {
    match attr_value(e, b"class") {
        Some(classes) => classes
            .split_whitespace()
            .any(|token| TITLE_CLASSES.contains(&token)),
        None => false,
    }
}

/// Build a parser tolerant of tag-soup HTML.
fn lenient_reader(markup: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Collapse all runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read an attribute value by local name, as raw text.
pub(crate) fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == name {
            return Some(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    None
}

/// Extract local name from potentially namespaced XML name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve XML entity references.
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "nbsp" => return Some(" ".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
