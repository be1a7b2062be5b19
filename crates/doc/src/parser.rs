//! DOC file parser implementation.
//!
//! The text of a Word 97-2003 document lives in the `WordDocument` stream,
//! scattered over pieces described by the piece table (Clx) in the table
//! stream. Each piece is either UTF-16LE or "compressed" 8-bit cp1252 text.
//!
//! ## Compatibility
//!
//! Word 97 and later binary files. Word 6/95 files use a different FIB and
//! are rejected, as are encrypted documents.

use cfb::CompoundFile;
use encoding_rs::{UTF_16LE, WINDOWS_1252};
use lecdeck_core::{Error, Result};
use std::io::{Read, Seek};

/// Offsets and flags of the File Information Block fields we need.
mod fib {
    pub const W_IDENT: usize = 0x00;
    pub const FLAGS: usize = 0x0A;
    pub const CCP_TEXT: usize = 0x4C;
    pub const FC_CLX: usize = 0x01A2;
    pub const LCB_CLX: usize = 0x01A6;

    /// Smallest FIB that contains every field above.
    pub const MIN_LEN: usize = 0x01AA;

    pub const MAGIC: u16 = 0xA5EC;
    pub const F_ENCRYPTED: u16 = 0x0100;
    pub const F_WHICH_TBL_STM: u16 = 0x0200;
}

/// Clx entry tags.
const CLXT_PRC: u8 = 0x01;
const CLXT_PCDT: u8 = 0x02;

/// Size of one piece descriptor (PCD).
const PCD_SIZE: usize = 8;

/// Bit in a PCD's fc marking 8-bit text.
const FC_COMPRESSED: u32 = 0x4000_0000;

/// Word control characters.
mod control {
    pub const CELL_MARK: char = '\u{07}';
    pub const LINE_BREAK: char = '\u{0B}';
    pub const PAGE_BREAK: char = '\u{0C}';
    pub const FIELD_BEGIN: char = '\u{13}';
    pub const FIELD_SEPARATOR: char = '\u{14}';
    pub const FIELD_END: char = '\u{15}';
    pub const NON_BREAKING_HYPHEN: char = '\u{1E}';
}

/// The FIB fields used for text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fib {
    encrypted: bool,
    table_stream: &'static str,
    ccp_text: u32,
    fc_clx: u32,
    lcb_clx: u32,
}

impl Fib {
    fn parse(word: &[u8]) -> Result<Self> {
        if word.len() < fib::MIN_LEN {
            return Err(Error::DocParseError(format!(
                "WordDocument stream too small ({} bytes)",
                word.len()
            )));
        }

        let ident = read_u16_le(word, fib::W_IDENT);
        if ident != fib::MAGIC {
            return Err(Error::UnsupportedFormat(format!(
                "Not a Word 97-2003 document (wIdent 0x{:04X})",
                ident
            )));
        }

        let flags = read_u16_le(word, fib::FLAGS);
        Ok(Self {
            encrypted: flags & fib::F_ENCRYPTED != 0,
            table_stream: if flags & fib::F_WHICH_TBL_STM != 0 {
                "1Table"
            } else {
                "0Table"
            },
            ccp_text: read_u32_le(word, fib::CCP_TEXT),
            fc_clx: read_u32_le(word, fib::FC_CLX),
            lcb_clx: read_u32_le(word, fib::LCB_CLX),
        })
    }
}

/// One entry of the piece table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    cp_start: u32,
    cp_end: u32,
    /// Byte offset of the text in the WordDocument stream.
    offset: usize,
    compressed: bool,
}

/// Parser for legacy Word (OLE/CFB) files.
pub struct DocParser;

impl DocParser {
    /// Create a new DOC parser.
    pub fn new() -> Self {
        Self
    }

    /// Extract the main document text of a DOC file.
    pub fn extract_text<R: Read + Seek>(&self, reader: R) -> Result<String> {
        let mut cfb = CompoundFile::open(reader)
            .map_err(|e| Error::CfbError(format!("Failed to open CFB container: {}", e)))?;

        self.validate_cfb_structure(&cfb)?;

        let word = self.read_stream(&mut cfb, "/WordDocument")?;
        let parsed = Fib::parse(&word)?;
        if parsed.encrypted {
            return Err(Error::EncryptedDocument);
        }

        let table = self.read_stream(&mut cfb, &format!("/{}", parsed.table_stream))?;
        self.extract_text_from_streams(&word, &table)
    }

    /// Extract text given the raw `WordDocument` and table streams.
    pub fn extract_text_from_streams(&self, word: &[u8], table: &[u8]) -> Result<String> {
        let parsed = Fib::parse(word)?;
        if parsed.encrypted {
            return Err(Error::EncryptedDocument);
        }

        let clx_start = parsed.fc_clx as usize;
        let clx_end = clx_start
            .checked_add(parsed.lcb_clx as usize)
            .filter(|&end| parsed.lcb_clx != 0 && end <= table.len())
            .ok_or_else(|| {
                Error::DocParseError(format!(
                    "Piece table out of range (fcClx={}, lcbClx={}, {} byte table stream)",
                    parsed.fc_clx,
                    parsed.lcb_clx,
                    table.len()
                ))
            })?;

        let pieces = parse_clx(&table[clx_start..clx_end])?;
        log::debug!(
            "DOC piece table: {} pieces, ccpText={}",
            pieces.len(),
            parsed.ccp_text
        );

        let mut raw = String::new();
        for piece in &pieces {
            if piece.cp_start >= parsed.ccp_text {
                break;
            }
            let chars = (piece.cp_end.min(parsed.ccp_text) - piece.cp_start) as usize;
            match decode_piece(word, piece, chars) {
                Some(text) => raw.push_str(&text),
                None => log::warn!(
                    "Piece at cp {} points outside the WordDocument stream (skipped)",
                    piece.cp_start
                ),
            }
        }

        Ok(map_control_chars(&raw))
    }

    /// Validate the CFB container has the main document stream.
    fn validate_cfb_structure<R: Read + Seek>(&self, cfb: &CompoundFile<R>) -> Result<()> {
        let has_word_document = cfb
            .walk()
            .any(|entry| entry.path().to_string_lossy() == "/WordDocument");

        if !has_word_document {
            return Err(Error::UnsupportedFormat(
                "Missing 'WordDocument' stream. This may not be a Word document \
                 or may be a different Office format."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Read a whole stream from the CFB container.
    fn read_stream<R: Read + Seek>(&self, cfb: &mut CompoundFile<R>, path: &str) -> Result<Vec<u8>> {
        let mut stream = cfb
            .open_stream(path)
            .map_err(|e| Error::CfbError(format!("Failed to open stream '{}': {}", path, e)))?;

        let mut data = Vec::new();
        stream
            .read_to_end(&mut data)
            .map_err(|e| Error::CfbError(format!("Failed to read stream '{}': {}", path, e)))?;

        Ok(data)
    }
}

impl Default for DocParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk the Clx: skip property entries, then parse the piece table.
fn parse_clx(clx: &[u8]) -> Result<Vec<Piece>> {
    let mut pos = 0;

    while pos < clx.len() {
        match clx[pos] {
            CLXT_PRC => {
                if pos + 3 > clx.len() {
                    break;
                }
                let cb = read_u16_le(clx, pos + 1) as i16;
                if cb < 0 {
                    return Err(Error::DocParseError(format!("Negative Prc size {}", cb)));
                }
                pos += 3 + cb as usize;
            }
            CLXT_PCDT => {
                if pos + 5 > clx.len() {
                    break;
                }
                let lcb = read_u32_le(clx, pos + 1) as usize;
                let start = pos + 5;
                let end = start
                    .checked_add(lcb)
                    .filter(|&end| end <= clx.len())
                    .ok_or_else(|| {
                        Error::DocParseError(format!("Piece table length {} exceeds Clx", lcb))
                    })?;
                return parse_plc_pcd(&clx[start..end]);
            }
            other => {
                return Err(Error::DocParseError(format!(
                    "Unexpected Clx entry 0x{:02X} at {}",
                    other, pos
                )));
            }
        }
    }

    Err(Error::DocParseError("Clx has no piece table".to_string()))
}

/// Parse a PlcPcd: n+1 character positions followed by n descriptors.
fn parse_plc_pcd(plc: &[u8]) -> Result<Vec<Piece>> {
    if plc.len() < 4 || (plc.len() - 4) % (4 + PCD_SIZE) != 0 {
        return Err(Error::DocParseError(format!(
            "Malformed piece table ({} bytes)",
            plc.len()
        )));
    }

    let count = (plc.len() - 4) / (4 + PCD_SIZE);
    let descriptors = 4 * (count + 1);

    let pieces = (0..count)
        .map(|i| {
            let cp_start = read_u32_le(plc, 4 * i);
            let cp_end = read_u32_le(plc, 4 * (i + 1));
            let fc = read_u32_le(plc, descriptors + i * PCD_SIZE + 2);
            let compressed = fc & FC_COMPRESSED != 0;
            let fc = fc & !FC_COMPRESSED;

            Piece {
                cp_start,
                cp_end: cp_end.max(cp_start),
                offset: if compressed { (fc / 2) as usize } else { fc as usize },
                compressed,
            }
        })
        .collect();

    Ok(pieces)
}

/// Decode `chars` characters of a piece.
fn decode_piece(word: &[u8], piece: &Piece, chars: usize) -> Option<String> {
    let len = if piece.compressed {
        chars
    } else {
        chars.checked_mul(2)?
    };
    let end = piece.offset.checked_add(len)?;
    let bytes = word.get(piece.offset..end)?;

    let encoding = if piece.compressed { WINDOWS_1252 } else { UTF_16LE };
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    Some(text.into_owned())
}

/// Turn Word's in-text control characters into plain text.
///
/// Paragraph marks, cell marks and breaks become newlines. Field codes
/// (between field begin and separator) are removed and field results kept.
fn map_control_chars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    // One entry per open field: true while still inside its code part.
    let mut fields: Vec<bool> = Vec::new();

    for c in raw.chars() {
        match c {
            control::FIELD_BEGIN => {
                fields.push(true);
                continue;
            }
            control::FIELD_SEPARATOR => {
                if let Some(in_code) = fields.last_mut() {
                    *in_code = false;
                }
                continue;
            }
            control::FIELD_END => {
                fields.pop();
                continue;
            }
            _ => {}
        }

        if fields.iter().any(|&in_code| in_code) {
            continue;
        }

        match c {
            '\r' | control::CELL_MARK | control::LINE_BREAK | control::PAGE_BREAK => out.push('\n'),
            control::NON_BREAKING_HYPHEN => out.push('-'),
            '\t' | '\n' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

/// Read a little-endian u16 from a byte slice.
fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Read a little-endian u32 from a byte slice.
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
