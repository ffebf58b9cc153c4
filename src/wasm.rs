//! WASM bindings for browser-based reading.
//!
//! This module exposes the load pipeline and reader session to JavaScript
//! via wasm-bindgen. The host UI owns rendering; it gets back metadata
//! strings and ready-to-insert page markup.

use wasm_bindgen::prelude::*;

use crate::epub::load_book;
use crate::session::BookSession;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// A loaded book held for the browser UI.
#[wasm_bindgen]
pub struct WebReader {
    session: BookSession,
}

#[wasm_bindgen]
impl WebReader {
    /// Parse raw EPUB bytes into a reader positioned at the cover.
    #[wasm_bindgen(constructor)]
    pub fn new(data: &[u8]) -> Result<WebReader, JsValue> {
        let session = load_book(data).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WebReader { session })
    }

    #[wasm_bindgen(getter)]
    pub fn title(&self) -> String {
        self.session.metadata().title.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn creator(&self) -> String {
        self.session.metadata().creator.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn language(&self) -> String {
        self.session.metadata().language.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn identifier(&self) -> String {
        self.session.metadata().identifier.clone()
    }

    /// Cover image as a data URL, if one was extracted.
    #[wasm_bindgen(getter, js_name = coverUrl)]
    pub fn cover_url(&self) -> Option<String> {
        self.session.metadata().cover_url.clone()
    }

    #[wasm_bindgen(getter, js_name = chapterCount)]
    pub fn chapter_count(&self) -> usize {
        self.session.chapter_count()
    }

    #[wasm_bindgen(js_name = chapterTitle)]
    pub fn chapter_title(&self, index: usize) -> Option<String> {
        self.session
            .chapters()
            .get(index)
            .map(|chapter| chapter.title.clone())
    }

    /// Markup for the current page (cover, TOC, or rewritten chapter).
    #[wasm_bindgen(js_name = pageHtml)]
    pub fn page_html(&self) -> String {
        self.session.page_html()
    }

    /// Short label for the current position, e.g. for a header line.
    #[wasm_bindgen(js_name = positionLabel)]
    pub fn position_label(&self) -> String {
        self.session.position().label()
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) -> String {
        self.session.next().label()
    }

    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&mut self) -> String {
        self.session.previous().label()
    }

    #[wasm_bindgen(js_name = jumpToChapter)]
    pub fn jump_to_chapter(&mut self, index: usize) -> String {
        self.session.jump_to(index).label()
    }

    #[wasm_bindgen(js_name = returnToToc)]
    pub fn return_to_toc(&mut self) -> String {
        self.session.return_to_toc().label()
    }
}
