//! Decoding of plain-text sources whose encoding is not declared.
//!
//! Lecture exports arrive as UTF-8, UTF-16LE (Word "Unicode text") or
//! Windows-1251. The guess order is: byte order mark, strict UTF-8, UTF-16LE
//! when the byte pattern looks like it, and Windows-1251 as the fallback
//! that always succeeds.

use encoding_rs::{Encoding, UTF_16LE, UTF_8, WINDOWS_1251};

/// Share of odd (high) bytes that must be 0x00, 0x04 or 0x20 for a BOM-less
/// buffer to be treated as UTF-16LE. Cyrillic code points have 0x04 there,
/// ASCII has 0x00.
const UTF16_HIGH_BYTE_RATIO: f64 = 0.6;

/// Decoded text together with the encoding it was read as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
}

impl DecodedText {
    /// Name of the detected encoding, e.g. "UTF-8".
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }
}

/// Decode a byte buffer of unknown encoding.
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return finish(text.into_owned(), encoding);
    }

    // BOM-less UTF-16 of ASCII and Cyrillic is also valid UTF-8, full of NULs.
    if let Ok(text) = std::str::from_utf8(bytes) {
        if !text.contains('\0') {
            return finish(text.to_string(), UTF_8);
        }
    }

    if looks_like_utf16le(bytes) {
        let (text, had_errors) = UTF_16LE.decode_without_bom_handling(bytes);
        if !had_errors {
            return finish(text.into_owned(), UTF_16LE);
        }
        log::debug!("UTF-16LE decode had errors, falling back to Windows-1251");
    }

    let (text, _) = WINDOWS_1251.decode_without_bom_handling(bytes);
    finish(text.into_owned(), WINDOWS_1251)
}

fn finish(text: String, encoding: &'static Encoding) -> DecodedText {
    log::debug!("Decoded {} chars as {}", text.chars().count(), encoding.name());
    DecodedText { text, encoding }
}

fn looks_like_utf16le(bytes: &[u8]) -> bool {
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return false;
    }

    let high_bytes = bytes.len() / 2;
    let typical = bytes
        .iter()
        .skip(1)
        .step_by(2)
        .filter(|&&b| matches!(b, 0x00 | 0x04 | 0x20))
        .count();

    typical as f64 / high_bytes as f64 >= UTF16_HIGH_BYTE_RATIO
}
