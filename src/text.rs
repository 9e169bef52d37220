//! Decoding of extracted entries into text.

use encoding_rs::Encoding;
use std::borrow::Cow;

use crate::error::{Result, ZipError};

/// Label used when the caller does not name an encoding.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Decode `bytes` using the WHATWG encoding named by `label`.
///
/// A byte order mark for the requested encoding is dropped. Malformed input
/// is an error rather than being replaced with U+FFFD.
pub fn decode_text(bytes: &[u8], label: &str, name: &str) -> Result<String> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ZipError::UnknownEncoding(label.to_string()))?;

    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| ZipError::MalformedText {
            name: name.to_string(),
            encoding: encoding.name(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_and_strips_bom() {
        assert_eq!(decode_text("héllo".as_bytes(), "utf-8", "a").unwrap(), "héllo");
        assert_eq!(decode_text(b"\xef\xbb\xbfhi", "UTF8", "a").unwrap(), "hi");
    }

    #[test]
    fn decodes_legacy_and_utf16() {
        assert_eq!(decode_text(b"caf\xe9", "latin1", "a").unwrap(), "café");
        assert_eq!(decode_text(b"\xff\xfeh\x00i\x00", "utf-16le", "a").unwrap(), "hi");
    }

    #[test]
    fn rejects_unknown_labels_and_malformed_input() {
        assert!(matches!(
            decode_text(b"x", "klingon", "a"),
            Err(ZipError::UnknownEncoding(_))
        ));
        assert!(matches!(
            decode_text(b"caf\xe9", "utf-8", "menu.txt"),
            Err(ZipError::MalformedText { encoding: "UTF-8", .. })
        ));
    }
}
