// Buffer representation adapters.
//
// The codec only ever sees a plain byte slice.  Callers holding bytes in
// another representation convert them here first, and errors for
// unrecognized or malformed representations are raised before any
// compression or decompression runs.
//
// Supported representations:
//   raw     : the bytes themselves
//   hex     : two ASCII hex digits per byte, either case
//   utf16le : one byte per 16-bit little-endian code unit (a "binary
//             string"), every unit must be <= 0xFF

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A buffer that is not a recognized byte-sequence representation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("unknown buffer format `{0}` (expected raw, hex or utf16le)")]
    UnknownFormat(String),
    #[error("hex input has odd length {len}")]
    OddHexLength { len: usize },
    #[error("invalid hex digit 0x{byte:02x} at byte {pos}")]
    InvalidHexDigit { pos: usize, byte: u8 },
    #[error("utf16le input has odd length {len}")]
    OddUtf16Length { len: usize },
    #[error("utf16le code unit 0x{unit:04x} at unit {pos} does not hold a byte")]
    WideCodeUnit { pos: usize, unit: u16 },
}

// ---------------------------------------------------------------------------
// BufferFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BufferFormat {
    #[default]
    Raw,
    Hex,
    Utf16Le,
}

impl BufferFormat {
    pub const ALL: [BufferFormat; 3] = [Self::Raw, Self::Hex, Self::Utf16Le];

    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Hex => "hex",
            Self::Utf16Le => "utf16le",
        }
    }
}

impl fmt::Display for BufferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BufferFormat {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "bin" | "binary" => Ok(Self::Raw),
            "hex" => Ok(Self::Hex),
            "utf16le" | "utf-16le" | "utf16" => Ok(Self::Utf16Le),
            _ => Err(ArgumentError::UnknownFormat(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Convert `data` in representation `format` to canonical bytes.
pub fn to_canonical(format: BufferFormat, data: &[u8]) -> Result<Vec<u8>, ArgumentError> {
    match format {
        BufferFormat::Raw => Ok(data.to_vec()),
        BufferFormat::Hex => decode_hex(data),
        BufferFormat::Utf16Le => decode_utf16le(data),
    }
}

/// Render canonical bytes in representation `format`.
pub fn from_canonical(format: BufferFormat, bytes: &[u8]) -> Vec<u8> {
    match format {
        BufferFormat::Raw => bytes.to_vec(),
        BufferFormat::Hex => encode_hex(bytes),
        BufferFormat::Utf16Le => bytes.iter().flat_map(|&b| [b, 0]).collect(),
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

fn encode_hex(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX_DIGITS[(b >> 4) as usize]);
        out.push(HEX_DIGITS[(b & 0x0F) as usize]);
    }
    out
}

#[inline]
fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Leading and trailing ASCII whitespace is ignored (text files usually end
/// in a newline); anything else that is not a hex digit is an error.
fn decode_hex(data: &[u8]) -> Result<Vec<u8>, ArgumentError> {
    let start = data.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let text = data[start..].trim_ascii_end();
    if text.len() % 2 != 0 {
        return Err(ArgumentError::OddHexLength { len: text.len() });
    }

    let digit = |i: usize| {
        hex_value(text[i]).ok_or(ArgumentError::InvalidHexDigit {
            pos: start + i,
            byte: text[i],
        })
    };
    (0..text.len())
        .step_by(2)
        .map(|i| -> Result<u8, ArgumentError> { Ok(digit(i)? << 4 | digit(i + 1)?) })
        .collect()
}

fn decode_utf16le(data: &[u8]) -> Result<Vec<u8>, ArgumentError> {
    if data.len() % 2 != 0 {
        return Err(ArgumentError::OddUtf16Length { len: data.len() });
    }
    data.chunks_exact(2)
        .enumerate()
        .map(|(pos, pair)| {
            let unit = u16::from_le_bytes([pair[0], pair[1]]);
            u8::try_from(unit).map_err(|_| ArgumentError::WideCodeUnit { pos, unit })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
