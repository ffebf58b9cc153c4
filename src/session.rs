//! An opened book and the reading position within it.

use crate::book::{BookMetadata, ChapterRecord, Position};
use crate::content::rewrite::rewrite_images;
use crate::epub::images::ImageStore;

/// One loaded book: metadata, readable chapters, extracted images, and the
/// current reading position.
///
/// Sessions are plain owned values produced by [`crate::load_book`]; the
/// pipeline never mutates shared state, so loading a second book while one
/// is open simply yields a second, independent session.
pub struct BookSession {
    metadata: BookMetadata,
    chapters: Vec<ChapterRecord>,
    images: ImageStore,
    position: Position,
}

impl BookSession {
    /// Invariant: `chapters` is non-empty (the filter stage rejects empty
    /// books before a session is constructed).
    pub(crate) fn new(
        metadata: BookMetadata,
        chapters: Vec<ChapterRecord>,
        images: ImageStore,
    ) -> Self {
        Self {
            metadata,
            chapters,
            images,
            position: Position::Cover,
        }
    }

    pub fn metadata(&self) -> &BookMetadata {
        &self.metadata
    }

    pub fn chapters(&self) -> &[ChapterRecord] {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Advance one page: cover → TOC → first chapter → ... → last chapter.
    /// A no-op on the last chapter.
    pub fn next(&mut self) -> Position {
        self.position = match self.position {
            Position::Cover => Position::Toc,
            Position::Toc => Position::Chapter(0),
            Position::Chapter(i) if i + 1 < self.chapters.len() => Position::Chapter(i + 1),
            unchanged => unchanged,
        };
        self.position
    }

    /// Go back one page. A no-op on the cover.
    pub fn previous(&mut self) -> Position {
        self.position = match self.position {
            Position::Toc => Position::Cover,
            Position::Chapter(0) => Position::Toc,
            Position::Chapter(i) => Position::Chapter(i - 1),
            Position::Cover => Position::Cover,
        };
        self.position
    }

    /// Jump directly to a chapter. Out-of-range indexes are ignored.
    pub fn jump_to(&mut self, index: usize) -> Position {
        if index < self.chapters.len() {
            self.position = Position::Chapter(index);
        }
        self.position
    }

    pub fn return_to_toc(&mut self) -> Position {
        self.position = Position::Toc;
        self.position
    }

    // ------------------------------------------------------------------
    // Page markup
    // ------------------------------------------------------------------

    /// Markup for the current page: the cover, the synthesized table of
    /// contents, or the current chapter with image references rewritten.
    pub fn page_html(&self) -> String {
        match self.position {
            Position::Cover => self.cover_html(),
            Position::Toc => self.toc_html(),
            Position::Chapter(i) => self.chapter_html(i).unwrap_or_default(),
        }
    }

    /// One chapter's markup with image references resolved to data URLs.
    pub fn chapter_html(&self, index: usize) -> Option<String> {
        self.chapters
            .get(index)
            .map(|chapter| rewrite_images(&chapter.raw_content, &chapter.base_path, &self.images))
    }

    fn cover_html(&self) -> String {
        let title = escape_html(&self.metadata.title);
        let creator = escape_html(&self.metadata.creator);

        let artwork = match &self.metadata.cover_url {
            Some(url) => format!(
                r#"<img src="{url}" alt="Book Cover" style="max-width: 100%; max-height: 70vh; border-radius: 8px;"/>"#
            ),
            None => r#"<div style="font-size: 4rem;">&#128214;</div>"#.to_string(),
        };

        format!(
            r#"<div style="display: flex; justify-content: center; align-items: center; min-height: 60vh; text-align: center;">
  <div>
    {artwork}
    <h2 style="margin-top: 1rem; color: var(--text-color, #333);">{title}</h2>
    <p style="margin-top: 0.5rem; color: var(--text-secondary, #666);">by {creator}</p>
  </div>
</div>"#
        )
    }

    fn toc_html(&self) -> String {
        let mut entries = String::new();
        for (index, chapter) in self.chapters.iter().enumerate() {
            let title = escape_html(&chapter.title);
            entries.push_str(&format!(
                r#"    <div class="toc-item" data-chapter-index="{index}" style="margin-bottom: 1rem; padding: 0.8rem; cursor: pointer; border-left: 3px solid var(--accent-color, #007bff);">
      <h3 style="margin: 0 0 0.3rem 0; color: var(--text-color);">{title}</h3>
      <p style="margin: 0; color: var(--text-secondary, #666);">Chapter {number}</p>
    </div>
"#,
                number = index + 1,
            ));
        }

        format!(
            r#"<div style="max-width: 600px; margin: 0 auto; padding: 2rem;">
  <h1 style="text-align: center; margin-bottom: 2rem; color: var(--text-color);">Table of Contents</h1>
  <div style="border-top: 2px solid var(--border-color, #e0e0e0); padding-top: 1.5rem;">
{entries}  </div>
</div>"#
        )
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(chapter_count: usize) -> BookSession {
        let chapters = (0..chapter_count)
            .map(|i| ChapterRecord {
                id: format!("ch{}", i + 1),
                path: format!("ch{}.xhtml", i + 1),
                raw_content: format!("<body><p>Chapter {} body text.</p></body>", i + 1),
                title: format!("Chapter {}", i + 1),
                base_path: String::new(),
            })
            .collect();
        BookSession::new(BookMetadata::default(), chapters, ImageStore::new())
    }

    #[test]
    fn test_initial_position_is_cover() {
        assert_eq!(session(3).position(), Position::Cover);
    }

    #[test]
    fn test_forward_walk() {
        let mut s = session(2);
        assert_eq!(s.next(), Position::Toc);
        assert_eq!(s.next(), Position::Chapter(0));
        assert_eq!(s.next(), Position::Chapter(1));
        // Last chapter: no-op
        assert_eq!(s.next(), Position::Chapter(1));
    }

    #[test]
    fn test_backward_walk() {
        let mut s = session(2);
        s.jump_to(1);
        assert_eq!(s.previous(), Position::Chapter(0));
        assert_eq!(s.previous(), Position::Toc);
        assert_eq!(s.previous(), Position::Cover);
        // Cover: no-op
        assert_eq!(s.previous(), Position::Cover);
    }

    #[test]
    fn test_jump_bounds() {
        let mut s = session(3);
        assert_eq!(s.jump_to(2), Position::Chapter(2));
        // Out of range: position unchanged
        assert_eq!(s.jump_to(3), Position::Chapter(2));
    }

    #[test]
    fn test_return_to_toc() {
        let mut s = session(3);
        s.jump_to(2);
        assert_eq!(s.return_to_toc(), Position::Toc);
    }

    #[test]
    fn test_cover_page_without_cover_url() {
        let s = session(1);
        let html = s.page_html();
        assert!(html.contains("Unknown Title"));
        assert!(html.contains("by Unknown Author"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_cover_page_with_cover_url() {
        let mut s = session(1);
        s.metadata.cover_url = Some("data:image/png;base64,AA".to_string());
        let html = s.page_html();
        assert!(html.contains(r#"src="data:image/png;base64,AA""#));
    }

    #[test]
    fn test_toc_page_lists_chapters() {
        let mut s = session(3);
        s.next();
        let html = s.page_html();
        assert!(html.contains("Table of Contents"));
        assert!(html.contains(r#"data-chapter-index="0""#));
        assert!(html.contains(r#"data-chapter-index="2""#));
        assert!(html.contains("Chapter 3"));
    }

    #[test]
    fn test_chapter_page_shows_content() {
        let mut s = session(2);
        s.jump_to(1);
        assert!(s.page_html().contains("Chapter 2 body text."));
    }

    #[test]
    fn test_metadata_escaped_in_cover() {
        let mut s = session(1);
        s.metadata.title = "Tom & Jerry <remastered>".to_string();
        let html = s.page_html();
        assert!(html.contains("Tom &amp; Jerry &lt;remastered&gt;"));
    }
}
