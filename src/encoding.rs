//! Character encoding detection and transcoding.
//!
//! The site predates UTF-8-by-default; pages declare their charset in meta
//! tags. Fetched bytes are decoded to UTF-8 before parsing, with invalid
//! sequences replaced rather than treated as errors.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Match `<meta charset="...">`.
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>]+)"#).expect("CHARSET_META regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">`.
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#,
    )
    .expect("CONTENT_TYPE_CHARSET regex")
});

/// Detect the declared encoding from the first kilobyte of a document.
///
/// Falls back to UTF-8 when no declaration is found or the label is unknown.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    let head = &html[..html.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    for re in [&*CHARSET_META_RE, &*CONTENT_TYPE_CHARSET_RE] {
        if let Some(label) = re.captures(&head_str).and_then(|c| c.get(1)) {
            if let Some(encoding) = Encoding::for_label(label.as_str().as_bytes()) {
                return encoding;
            }
        }
    }
    UTF_8
}

/// Transcode page bytes to a UTF-8 string, lossily.
#[must_use]
pub fn transcode_to_utf8(html: &[u8]) -> String {
    let encoding = detect_encoding(html);
    if encoding == UTF_8 {
        return String::from_utf8_lossy(html).into_owned();
    }
    let (decoded, _, _) = encoding.decode(html);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_meta_charset() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head><body></body></html>"#;
        // encoding_rs maps ISO-8859-1 to windows-1252 per the WHATWG spec.
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn detects_content_type_charset() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#;
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn defaults_to_utf8() {
        assert_eq!(detect_encoding(b"<html><body>plain</body></html>"), UTF_8);
    }

    #[test]
    fn transcodes_latin1_accents() {
        let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Universit\xE9</body></html>";
        assert!(transcode_to_utf8(html).contains("Universit\u{e9}"));
    }

    #[test]
    fn invalid_bytes_do_not_panic() {
        let html = b"<html><body>ok \xFF\xFE still ok</body></html>";
        let out = transcode_to_utf8(html);
        assert!(out.contains("ok"));
        assert!(out.contains("still ok"));
    }
}
