//! Error types for folio operations.

use thiserror::Error;

/// Errors that can occur while loading or reading a book.
///
/// Structural failures (missing container, unparseable package document)
/// abort the load; resource-level problems (a single image, one chapter,
/// the cover) are logged at their own stage and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("not a readable EPUB archive: {0}")]
    ArchiveFormat(String),

    #[error("META-INF/container.xml not found in archive")]
    MissingContainer,

    #[error("malformed XML in {path}: {message}")]
    MalformedXml { path: String, message: String },

    #[error("no package document declared in container.xml")]
    MissingPackagePath,

    #[error("package document not found in archive: {0}")]
    MissingPackageFile(String),

    #[error("no readable content in book")]
    NoReadableContent,

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    pub(crate) fn malformed_xml(path: &str, err: impl std::fmt::Display) -> Self {
        Error::MalformedXml {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
