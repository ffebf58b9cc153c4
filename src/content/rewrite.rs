//! Rewrites `img` references inside chapter markup to embedded data URLs.

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};

use super::{attr_value, lenient_reader, local_name};
use crate::epub::images::ImageStore;

/// Visible stand-in styling for images that could not be resolved, so the
/// gap is evident to the reader rather than silently broken.
const PLACEHOLDER_STYLE: &str = "border: 2px dashed #ccc; padding: 1rem; background-color: #f9f9f9;";

/// Rewrite every resolvable `img` `src` in a chapter to a data URL.
///
/// Unresolvable references get a descriptive `alt` and a placeholder
/// style. On any parse failure the original markup is returned unchanged;
/// rewriting must never block rendering.
pub fn rewrite_images(markup: &str, base_path: &str, images: &ImageStore) -> String {
    match try_rewrite(markup, base_path, images) {
        Some(rewritten) => rewritten,
        None => markup.to_string(),
    }
}

fn try_rewrite(markup: &str, base_path: &str, images: &ImageStore) -> Option<String> {
    let mut reader = lenient_reader(markup);
    let mut out = String::with_capacity(markup.len() + 256);
    let mut copied = 0usize;
    let mut replaced = 0usize;

    loop {
        let event = reader.read_event();
        let event_end = reader.buffer_position() as usize;

        let (element, self_closing) = match event {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => continue,
        };

        if local_name(element.name().as_ref()) != b"img" {
            continue;
        }

        let Some(tag) = rebuild_img(&element, self_closing, base_path, images, &mut replaced)
        else {
            continue;
        };

        // The element's raw source runs from its opening '<' to the
        // parser's current position; everything before it is untouched.
        let Some(relative_start) = markup[copied..event_end].rfind('<') else {
            continue;
        };
        out.push_str(&markup[copied..copied + relative_start]);
        out.push_str(&tag);
        copied = event_end;
    }

    out.push_str(&markup[copied..]);
    if replaced > 0 {
        debug!("rewrote {replaced} image references");
    }
    Some(out)
}

/// Re-render one `img` tag with its `src` resolved, or `None` to leave the
/// original bytes in place.
fn rebuild_img(
    element: &BytesStart,
    self_closing: bool,
    base_path: &str,
    images: &ImageStore,
    replaced: &mut usize,
) -> Option<String> {
    let src = attr_value(element, b"src")?;
    if src.is_empty() {
        return None;
    }

    let mut attrs: Vec<(String, String)> = element
        .attributes()
        .flatten()
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect();

    match images.resolve(&src, base_path) {
        Some(url) => {
            let url = url.to_string();
            set_attr(&mut attrs, "src", url);
            // An inline onerror from the source document would fire against
            // the rewritten URL.
            attrs.retain(|(key, _)| !key.eq_ignore_ascii_case("onerror"));
            *replaced += 1;
        }
        None => {
            warn!("no extracted image for reference: {src}");
            set_attr(&mut attrs, "alt", format!("Image not found: {src}"));
            let style = match attrs.iter().find(|(key, _)| key == "style") {
                Some((_, existing)) => {
                    format!("{}; {}", existing.trim_end().trim_end_matches(';'), PLACEHOLDER_STYLE)
                }
                None => PLACEHOLDER_STYLE.to_string(),
            };
            set_attr(&mut attrs, "style", style);
        }
    }

    let name = element.name();
    let name = String::from_utf8_lossy(name.as_ref());
    let mut tag = format!("<{name}");
    for (key, value) in attrs {
        tag.push(' ');
        tag.push_str(&key);
        tag.push_str("=\"");
        tag.push_str(&value.replace('"', "&quot;"));
        tag.push('"');
    }
    tag.push_str(if self_closing { "/>" } else { ">" });
    Some(tag)
}

fn set_attr(attrs: &mut Vec<(String, String)>, name: &str, value: String) {
    match attrs.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some((_, existing)) => *existing = value,
        None => attrs.push((name.to_string(), value)),
    }
}
