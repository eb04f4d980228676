//! Byte-to-text decoding with a fallback chain.
//!
//! The chain is total: strict UTF-8 first, then whatever a BOM announces
//! (UTF-16LE/BE, UTF-8), then Windows-1252, which maps every byte and so
//! can never fail. Detection therefore always sees text, never an error.

use encoding_rs::{Encoding, WINDOWS_1252};

/// Decode raw bytes into a `String`. Never fails.
pub(crate) fn decode_bytes(raw: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(raw) {
        return s.to_string();
    }
    if let Some((encoding, bom_len)) = Encoding::for_bom(raw) {
        let (text, _, _) = encoding.decode(&raw[bom_len..]);
        return text.into_owned();
    }
    let (text, _, _) = WINDOWS_1252.decode(raw);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8_passes_through() {
        assert_eq!(decode_bytes("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn utf16le_with_bom_decodes() {
        let mut raw = vec![0xFF, 0xFE];
        for unit in "GET /api".encode_utf16() {
            raw.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_bytes(&raw), "GET /api");
    }

    #[test]
    fn latin1_bytes_decode_via_cp1252() {
        // 0xE9 is é in Windows-1252 but invalid standalone UTF-8.
        let raw = b"caf\xe9";
        assert_eq!(decode_bytes(raw), "café");
    }

    #[test]
    fn arbitrary_garbage_still_decodes() {
        let raw: Vec<u8> = (0u8..=255).collect();
        let text = decode_bytes(&raw);
        assert!(!text.is_empty());
    }
}
