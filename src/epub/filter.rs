//! Readability filtering: drops front-matter and image-only pages.

use log::debug;
use std::fmt;

use crate::book::ChapterRecord;
use crate::content;
use crate::epub::chapters::derive_title;
use crate::error::{Error, Result};

/// Minimum characters of cleaned text for a chapter to count as prose.
const MIN_TEXT_LEN: usize = 100;

/// Image-heavy pages need this much text to survive.
const IMAGE_HEAVY_TEXT_LEN: usize = 500;
const IMAGE_HEAVY_COUNT: usize = 3;

/// Short pages containing one of these phrases are boilerplate.
const BOILERPLATE_TEXT_LEN: usize = 300;
const BOILERPLATE_PHRASES: [&str; 6] = [
    "copyright",
    "all rights reserved",
    "project gutenberg",
    "title page",
    "frontispiece",
    "this ebook is for the use of anyone anywhere",
];

/// Outcome of the readability check for one chapter.
///
/// Ambiguity favors inclusion: any scan that can't complete yields `Keep`,
/// never a silent drop.
#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    Keep,
    Reject(RejectReason),
}

#[derive(Debug, PartialEq, Eq)]
enum RejectReason {
    TooShort,
    ImageHeavy,
    Boilerplate,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooShort => write!(f, "minimal text content"),
            RejectReason::ImageHeavy => write!(f, "primarily images"),
            RejectReason::Boilerplate => write!(f, "boilerplate page"),
        }
    }
}

/// Keep only readable chapters, renumbering the survivors.
///
/// Titles are re-derived against the post-filter position so `"Chapter N"`
/// fallbacks reflect what the reader actually sees. An empty result is a
/// load failure: the archive was valid but contains no substantive prose.
pub fn filter_readable(raw: Vec<ChapterRecord>) -> Result<Vec<ChapterRecord>> {
    let total = raw.len();
    let mut kept: Vec<ChapterRecord> = Vec::with_capacity(total);

    for mut chapter in raw {
        match assess(&chapter) {
            Verdict::Keep => {
                chapter.title = derive_title(&chapter.raw_content, kept.len() + 1);
                kept.push(chapter);
            }
            Verdict::Reject(reason) => {
                debug!("filtered out chapter \"{}\" ({reason})", chapter.title);
            }
        }
    }

    debug!("{} of {total} chapters readable", kept.len());

    if kept.is_empty() {
        return Err(Error::NoReadableContent);
    }
    Ok(kept)
}

fn assess(chapter: &ChapterRecord) -> Verdict {
    let scan = content::scan(&chapter.raw_content);
    if scan.truncated {
        // Couldn't scan it all; when in doubt, include
        return Verdict::Keep;
    }

    let text_len = scan.text.chars().count();

    if text_len < MIN_TEXT_LEN {
        return Verdict::Reject(RejectReason::TooShort);
    }

    if scan.image_count > IMAGE_HEAVY_COUNT && text_len < IMAGE_HEAVY_TEXT_LEN {
        return Verdict::Reject(RejectReason::ImageHeavy);
    }

    if text_len < BOILERPLATE_TEXT_LEN {
        let lower = scan.text.to_lowercase();
        if BOILERPLATE_PHRASES
            .iter()
            .any(|phrase| lower.contains(phrase))
        {
            return Verdict::Reject(RejectReason::Boilerplate);
        }
    }

    Verdict::Keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(markup: &str) -> ChapterRecord {
        ChapterRecord {
            id: "ch".to_string(),
            path: "ch.xhtml".to_string(),
            raw_content: markup.to_string(),
            title: "Chapter 1".to_string(),
            base_path: String::new(),
        }
    }

    fn prose(words: usize) -> String {
        let body = vec!["lorem"; words].join(" ");
        format!("<html><body><p>{body}</p></body></html>")
    }

    #[test]
    fn test_keeps_ordinary_prose() {
        assert_eq!(assess(&chapter(&prose(100))), Verdict::Keep);
    }

    #[test]
    fn test_rejects_minimal_text() {
        let markup = "<body><p>Too short.</p></body>";
        assert_eq!(
            assess(&chapter(markup)),
            Verdict::Reject(RejectReason::TooShort)
        );
    }

    #[test]
    fn test_rejects_image_heavy_page() {
        let text = vec!["word"; 30].join(" ");
        let markup = format!(
            "<body><img src=\"a.png\"/><img src=\"b.png\"/><img src=\"c.png\"/><img src=\"d.png\"/>\
             <p>{text}</p></body>"
        );
        assert_eq!(
            assess(&chapter(&markup)),
            Verdict::Reject(RejectReason::ImageHeavy)
        );
    }

    #[test]
    fn test_keeps_image_heavy_page_with_enough_text() {
        let text = vec!["word"; 150].join(" ");
        let markup = format!(
            "<body><img src=\"a.png\"/><img src=\"b.png\"/><img src=\"c.png\"/><img src=\"d.png\"/>\
             <p>{text}</p></body>"
        );
        assert_eq!(assess(&chapter(&markup)), Verdict::Keep);
    }

    #[test]
    fn test_rejects_short_boilerplate() {
        let filler = vec!["word"; 28].join(" ");
        let markup =
            format!("<body><p>Copyright 2020 All Rights Reserved. {filler}</p></body>");
        assert_eq!(
            assess(&chapter(&markup)),
            Verdict::Reject(RejectReason::Boilerplate)
        );
    }

    #[test]
    fn test_keeps_long_text_mentioning_copyright() {
        let filler = vec!["word"; 100].join(" ");
        let markup = format!("<body><p>The copyright notice read: {filler}</p></body>");
        assert_eq!(assess(&chapter(&markup)), Verdict::Keep);
    }

    #[test]
    fn test_filter_renumbers_survivors() {
        let raw = vec![
            chapter("<body><p>tiny</p></body>"),
            chapter(&prose(100)),
            chapter(&prose(100)),
        ];
        let kept = filter_readable(raw).unwrap();

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].title, "Chapter 1");
        assert_eq!(kept[1].title, "Chapter 2");
    }

    #[test]
    fn test_filter_empty_result_is_error() {
        let raw = vec![chapter("<body><p>x</p></body>")];
        assert!(matches!(
            filter_readable(raw),
            Err(Error::NoReadableContent)
        ));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let raw = vec![
            chapter(&prose(120)),
            chapter("<body><p>drop me</p></body>"),
            chapter(&prose(80)),
        ];
        let once = filter_readable(raw).unwrap();
        let titles: Vec<_> = once.iter().map(|c| c.title.clone()).collect();

        let twice = filter_readable(once).unwrap();
        assert_eq!(twice.len(), 2);
        assert_eq!(
            twice.iter().map(|c| c.title.clone()).collect::<Vec<_>>(),
            titles
        );
    }
}
