//! # folio
//!
//! The core of an in-browser EPUB reader: package resolution, content
//! filtering, and navigation.
//!
//! Given raw EPUB bytes, `folio` locates and parses the package document,
//! extracts metadata and the cover image, materializes the reading order
//! into chapters, filters out front-matter and image-only pages, and
//! hands back a [`BookSession`] that serves ready-to-render page markup
//! with image references rewritten to embedded data URLs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{Position, load_book};
//!
//! let bytes = std::fs::read("book.epub")?;
//! let mut session = load_book(&bytes)?;
//!
//! println!("{} by {}", session.metadata().title, session.metadata().creator);
//!
//! // Cover → table of contents → chapters
//! session.next();
//! session.next();
//! assert_eq!(session.position(), Position::Chapter(0));
//! let html = session.page_html();
//! # let _ = html;
//! # Ok::<(), folio::Error>(())
//! ```
//!
//! ## Degraded input
//!
//! Real-world EPUBs are messy. Structural problems (no container
//! descriptor, unparseable package document) fail the load with a single
//! [`Error`]; per-resource problems (a missing image, one unreadable
//! chapter, no cover) are logged and the book still opens.

pub mod book;
pub mod content;
pub mod epub;
pub mod error;
pub mod prefs;
pub mod session;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use book::{BookMetadata, ChapterRecord, ManifestEntry, Position};
pub use epub::{ImageStore, load_book};
pub use error::{Error, Result};
pub use prefs::{KeyValueStore, MemoryStore, Preferences};
pub use session::BookSession;
