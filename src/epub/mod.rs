//! The EPUB load pipeline: archive bytes in, reader session out.

pub mod archive;
pub mod chapters;
pub mod cover;
pub mod filter;
pub mod images;
pub mod package;

use log::debug;

use crate::error::Result;
use crate::session::BookSession;

pub use archive::EpubArchive;
pub use images::ImageStore;
pub use package::PackageDocument;

/// Load a book from raw archive bytes.
///
/// Runs the full pipeline: locate the package document, parse manifest,
/// spine and metadata, resolve the cover, extract images, materialize the
/// spine into chapters, and filter out non-prose pages. Structural
/// failures abort with an error; per-resource failures degrade the result
/// and are logged.
///
/// # Example
///
/// ```no_run
/// let bytes = std::fs::read("book.epub")?;
/// let session = folio::load_book(&bytes)?;
/// println!("{} ({} chapters)", session.metadata().title, session.chapter_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load_book(bytes: &[u8]) -> Result<BookSession> {
    let mut archive = EpubArchive::open(bytes)?;

    // 1. Locate and parse the package document
    let package_path = package::locate_package(&mut archive)?;
    debug!("package document at {package_path}");
    let pkg = package::read_package(&mut archive, &package_path)?;

    // 2. Resolve the cover (non-fatal)
    let mut metadata = pkg.metadata.clone();
    metadata.cover_url = cover::resolve_cover(&mut archive, &pkg);

    // 3. Extract manifest images for later reference rewriting
    let images = images::harvest_images(&mut archive, &pkg);

    // 4. Materialize the reading order and drop non-prose pages
    let raw_chapters = chapters::materialize_spine(&mut archive, &pkg);
    let readable = filter::filter_readable(raw_chapters)?;

    Ok(BookSession::new(metadata, readable, images))
}
