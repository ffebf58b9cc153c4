//! Shared text-decoding and data-URL helpers.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Strip UTF-8 BOM if present.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

/// Decode bytes to a string, handling legacy encodings.
///
/// Tries UTF-8 first (BOM handled by encoding_rs), then falls back to
/// Windows-1252, which is common in old ebooks and a superset of
/// ISO-8859-1. Uses `Cow<str>` to avoid allocation for valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Infer an image MIME type from a file extension.
///
/// Unknown extensions default to `image/jpeg`, the most common cover
/// format in the wild.
pub fn image_mime_type(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
}

/// Base64-encode raw bytes into an embeddable `data:` URL.
pub fn data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bom() {
        let with_bom = &[0xEF, 0xBB, 0xBF, b'h', b'i'];
        assert_eq!(strip_bom(with_bom), b"hi");

        let without_bom = b"hello";
        assert_eq!(strip_bom(without_bom), b"hello");

        assert_eq!(strip_bom(&[]), &[]);

        // Partial BOM (not stripped)
        let partial = &[0xEF, 0xBB, b'x'];
        assert_eq!(strip_bom(partial), partial);
    }

    #[test]
    fn test_decode_text_utf8() {
        assert_eq!(decode_text("Hello, World!".as_bytes()), "Hello, World!");
        assert_eq!(decode_text("caf\u{e9}".as_bytes()), "caf\u{e9}");
    }

    #[test]
    fn test_decode_text_windows_1252_fallback() {
        // 0xE9 is "é" in Windows-1252 but invalid standalone UTF-8
        let legacy = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text(&legacy), "caf\u{e9}");
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type("cover.jpg"), "image/jpeg");
        assert_eq!(image_mime_type("cover.JPEG"), "image/jpeg");
        assert_eq!(image_mime_type("images/pic.png"), "image/png");
        assert_eq!(image_mime_type("anim.gif"), "image/gif");
        assert_eq!(image_mime_type("photo.webp"), "image/webp");
        assert_eq!(image_mime_type("drawing.svg"), "image/svg+xml");
        // Unknown extension defaults to JPEG
        assert_eq!(image_mime_type("mystery.bin"), "image/jpeg");
        assert_eq!(image_mime_type("no-extension"), "image/jpeg");
    }

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }
}
