//! Byte decoding and URL-encoding helpers.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left alone when a tag or path segment is embedded in a URL.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode one URL component.
pub fn encode_component(s: &str) -> Cow<'_, str> {
    utf8_percent_encode(s, COMPONENT).into()
}

/// Decode document bytes to a string.
///
/// 1. UTF-8 (BOM handled by encoding_rs)
/// 2. the declared encoding, if the bytes are not valid UTF-8
/// 3. Windows-1252, which is what unlabeled legacy exports almost always are
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find a declared encoding in the first kilobyte.
///
/// Recognizes `<?xml … encoding="…"?>` and `<meta charset="…">`.
pub fn extract_encoding_hint(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    for needle in [&b"encoding="[..], &b"charset="[..]] {
        let Some(pos) = prefix
            .windows(needle.len())
            .position(|w| w.eq_ignore_ascii_case(needle))
        else {
            continue;
        };
        let after = &prefix[pos + needle.len()..];
        let (quote, rest) = match after.first() {
            Some(&q @ (b'"' | b'\'')) => (Some(q), &after[1..]),
            Some(_) => (None, after),
            None => continue,
        };
        let end = rest
            .iter()
            .position(|&b| match quote {
                Some(q) => b == q,
                None => b == b'"' || b == b'\'' || b == b'>' || b == b';' || b.is_ascii_whitespace(),
            })
            .unwrap_or(rest.len());
        if let Ok(name) = std::str::from_utf8(&rest[..end])
            && !name.is_empty()
        {
            return Some(name);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("★ notes".as_bytes(), None), "★ notes");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // 0x93/0x94 are curly quotes in Windows-1252 and invalid UTF-8
        let bytes = [0x93, b'h', b'i', 0x94];
        assert_eq!(decode_text(&bytes, None), "\u{201c}hi\u{201d}");
    }

    #[test]
    fn test_decode_uses_hint() {
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text(&bytes, Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_extract_encoding_hint() {
        assert_eq!(
            extract_encoding_hint(br#"<?xml version="1.0" encoding="ISO-8859-1"?><html>"#),
            Some("ISO-8859-1")
        );
        assert_eq!(
            extract_encoding_hint(br#"<html><head><meta charset=utf-8>"#),
            Some("utf-8")
        );
        assert_eq!(extract_encoding_hint(b"<html><body>"), None);
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("rust lang"), "rust%20lang");
        assert_eq!(encode_component("a&b"), "a%26b");
        assert_eq!(encode_component("plain-tag_1"), "plain-tag_1");
    }
}
