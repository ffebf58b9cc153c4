//! Read-only access to the EPUB container (a ZIP archive in memory).

use std::io::{Cursor, Read};

use log::warn;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::util::{decode_text, strip_bom};

/// An opened EPUB archive.
///
/// Wraps random access to the ZIP entries and handles the text-decoding
/// quirks of real-world books: UTF-8 BOMs, legacy Windows-1252 chapter
/// files, and percent-encoded entry paths.
pub struct EpubArchive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
}

impl EpubArchive {
    /// Open an archive from raw bytes.
    ///
    /// A wrong or missing `mimetype` entry is logged, never fatal; plenty
    /// of otherwise readable books get it wrong.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let zip = ZipArchive::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| Error::ArchiveFormat(e.to_string()))?;

        let mut archive = Self { zip };
        archive.check_mimetype();
        Ok(archive)
    }

    fn check_mimetype(&mut self) {
        if let Ok(mimetype) = self.read_text("mimetype")
            && mimetype.trim() != "application/epub+zip"
        {
            warn!("unexpected EPUB mimetype: {}", mimetype.trim());
        }
    }

    /// Whether the archive contains an entry at `path`.
    pub fn has_entry(&self, path: &str) -> bool {
        self.zip.index_for_name(path).is_some()
    }

    /// All entry paths in the archive.
    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(|name| name.to_string()).collect()
    }

    /// Read an entry and decode it to text (BOM stripped, legacy encodings
    /// tolerated).
    pub fn read_text(&mut self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        Ok(decode_text(strip_bom(&bytes)).into_owned())
    }

    /// Read an entry as raw bytes.
    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        // Try direct lookup first
        match self.zip.by_name(path) {
            Ok(mut file) => {
                let mut contents = Vec::new();
                file.read_to_end(&mut contents)?;
                return Ok(contents);
            }
            Err(zip::result::ZipError::FileNotFound) => {}
            Err(e) => return Err(e.into()),
        }

        // Fallback: percent-decoded path (handles malformed EPUBs)
        let decoded = percent_encoding::percent_decode_str(path)
            .decode_utf8()
            .map_err(|_| Error::ArchiveFormat(format!("invalid UTF-8 in path: {}", path)))?;

        let mut file = self.zip.by_name(&decoded)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }
}
