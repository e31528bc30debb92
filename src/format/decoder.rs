// Snappy tag-stream interpreter.
//
// Follows the stream's state progression: read the length header, then
// repeatedly read one tag and either copy a literal run out of the stream
// or replay a back-reference from the output produced so far.  Any
// structural violation stops decoding immediately; nothing is recovered.

use super::tag::{TAG_COPY_1, TAG_COPY_2, TAG_COPY_4, TAG_LITERAL, Token};
use super::varint::{self, VarIntError};

// ---------------------------------------------------------------------------
// Decoder error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The length header is missing, truncated, or wider than 32 bits.
    #[error("invalid length header: {0}")]
    Header(#[from] VarIntError),
    /// A tag's length bytes, offset bytes, or literal payload run past the
    /// end of the stream.
    #[error("stream truncated at byte {pos}: element needs {needed} more bytes")]
    Truncated { pos: usize, needed: usize },
    /// A copy with offset 0, or one reaching before the start of the output.
    #[error("invalid copy offset {offset} with {produced} bytes produced")]
    BadOffset { offset: usize, produced: usize },
    /// An element would write past the declared uncompressed length.
    #[error("output overflow: element of {len} bytes at {produced} exceeds declared length {declared}")]
    OutputOverflow {
        len: usize,
        produced: usize,
        declared: usize,
    },
    /// The tag stream ended before producing the declared length.
    #[error("length mismatch: header declares {declared} bytes, stream produced {produced}")]
    LengthMismatch { declared: usize, produced: usize },
    /// The caller's output buffer is shorter than the declared length.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    /// The declared length could not be produced by a stream this short.
    #[error("declared length {declared} is implausible for a {stream_len}-byte stream")]
    ImplausibleLength { declared: usize, stream_len: usize },
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Parsed length header of a compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Declared uncompressed length.
    pub uncompressed_len: usize,
    /// Number of bytes the varint occupies.
    pub header_len: usize,
}

impl Header {
    /// Parse the header at the start of `stream`.
    pub fn parse(stream: &[u8]) -> Result<Self, DecodeError> {
        let (len, header_len) = varint::read_u32(stream)?;
        Ok(Self {
            uncompressed_len: len as usize,
            header_len,
        })
    }
}

// ---------------------------------------------------------------------------
// Token reader
// ---------------------------------------------------------------------------

/// Width masks for 1..=4 little-endian length/offset bytes.
const WORD_MASK: [u32; 5] = [0, 0xFF, 0xFFFF, 0x00FF_FFFF, 0xFFFF_FFFF];

/// Borrow `n` bytes of `body` starting at `pos`.
#[inline]
fn take(body: &[u8], pos: usize, n: usize) -> Result<&[u8], DecodeError> {
    pos.checked_add(n)
        .and_then(|end| body.get(pos..end))
        .ok_or_else(|| DecodeError::Truncated {
            pos,
            needed: pos.saturating_add(n).saturating_sub(body.len()),
        })
}

/// Read `n` (1..=4) little-endian bytes at `pos`.
#[inline]
fn read_le(body: &[u8], pos: usize, n: usize) -> Result<u32, DecodeError> {
    let bytes = take(body, pos, n)?;
    let mut word = [0u8; 4];
    word[..n].copy_from_slice(bytes);
    Ok(u32::from_le_bytes(word) & WORD_MASK[n])
}

/// Parse the element whose tag sits at `body[pos]`.
/// Returns the token and the position just past it.
///
/// A `pos` at or past the end of `body` is reported as truncation.
/// Offsets are not validated here; that needs the output position.
#[inline]
pub fn read_token(body: &[u8], mut pos: usize) -> Result<(Token<'_>, usize), DecodeError> {
    let tag = take(body, pos, 1)?[0];
    pos += 1;
    match tag & 0x03 {
        TAG_LITERAL => {
            let mut len = (tag >> 2) as usize + 1;
            if len > 60 {
                let extra = len - 60;
                len = (read_le(body, pos, extra)? as usize)
                    .checked_add(1)
                    .ok_or(DecodeError::Truncated {
                        pos: pos + extra,
                        needed: usize::MAX,
                    })?;
                pos += extra;
            }
            let bytes = take(body, pos, len)?;
            Ok((Token::Literal(bytes), pos + len))
        }
        TAG_COPY_1 => {
            let len = ((tag >> 2) & 0x07) as usize + 4;
            let low = read_le(body, pos, 1)? as usize;
            let offset = ((tag >> 5) as usize) << 8 | low;
            Ok((Token::Copy { offset, len }, pos + 1))
        }
        TAG_COPY_2 => {
            let len = (tag >> 2) as usize + 1;
            let offset = read_le(body, pos, 2)? as usize;
            Ok((Token::Copy { offset, len }, pos + 2))
        }
        TAG_COPY_4 => {
            let len = (tag >> 2) as usize + 1;
            let offset = read_le(body, pos, 4)? as usize;
            Ok((Token::Copy { offset, len }, pos + 4))
        }
        _ => unreachable!("two-bit tag kind"),
    }
}

// ---------------------------------------------------------------------------
// Block decoding
// ---------------------------------------------------------------------------

/// Decoder state.  `Failed` is terminal and never leaves the function;
/// it is represented by the returned error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadTag,
    Done,
}

/// Replay `len` bytes from `offset` back, writing at `out[op..]`.
///
/// When the source overlaps the destination (`offset < len`), bytes must be
/// written forward one at a time so every byte written is visible to the
/// reads that follow it within the same copy.
#[inline]
fn copy_back(out: &mut [u8], op: usize, offset: usize, len: usize) {
    let src = op - offset;
    if offset >= len {
        out.copy_within(src..src + len, op);
    } else {
        for i in 0..len {
            out[op + i] = out[src + i];
        }
    }
}

/// Decode the token stream `body` into `out`, which must be exactly the
/// declared uncompressed length.  Returns the number of bytes produced.
pub fn decode_body(body: &[u8], out: &mut [u8]) -> Result<usize, DecodeError> {
    let declared = out.len();
    let mut pos = 0usize;
    let mut op = 0usize;
    let mut state = State::ReadTag;

    while state == State::ReadTag {
        if pos == body.len() {
            state = State::Done;
            continue;
        }
        let (token, next) = read_token(body, pos)?;
        let len = token.output_len();
        if len > declared - op {
            return Err(DecodeError::OutputOverflow {
                len,
                produced: op,
                declared,
            });
        }
        match token {
            Token::Literal(bytes) => {
                out[op..op + len].copy_from_slice(bytes);
            }
            Token::Copy { offset, len } => {
                if offset == 0 || offset > op {
                    return Err(DecodeError::BadOffset {
                        offset,
                        produced: op,
                    });
                }
                copy_back(out, op, offset, len);
            }
        }
        op += len;
        pos = next;
    }

    if op != declared {
        return Err(DecodeError::LengthMismatch {
            declared,
            produced: op,
        });
    }
    Ok(op)
}

/// Decode a complete stream (header + tokens) into `out`.
///
/// `out` may be longer than the declared length; only the declared prefix
/// is written.  Returns the decoded length.
pub fn decode_into(stream: &[u8], out: &mut [u8]) -> Result<usize, DecodeError> {
    let header = Header::parse(stream)?;
    if out.len() < header.uncompressed_len {
        return Err(DecodeError::BufferTooSmall {
            needed: header.uncompressed_len,
            available: out.len(),
        });
    }
    decode_body(
        &stream[header.header_len..],
        &mut out[..header.uncompressed_len],
    )
}

// ---------------------------------------------------------------------------
// Token iterator (for inspection/printing)
// ---------------------------------------------------------------------------

/// Iterates over the tokens of a compressed stream body without producing
/// output.
///
/// Copy offsets are checked against the running output length, so the
/// iterator reports the same errors as decoding would, except for the
/// final length check.  Stops after the first error.
pub struct TokenIterator<'a> {
    body: &'a [u8],
    pos: usize,
    produced: usize,
    failed: bool,
}

impl<'a> TokenIterator<'a> {
    /// Create an iterator over a stream body (the bytes after the header).
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            pos: 0,
            produced: 0,
            failed: false,
        }
    }

    /// Bytes of output the tokens seen so far would produce.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Position of the next tag within the body.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for TokenIterator<'a> {
    type Item = Result<Token<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.body.len() {
            return None;
        }
        let result = read_token(self.body, self.pos).and_then(|(token, next)| {
            if let Token::Copy { offset, .. } = token
                && (offset == 0 || offset > self.produced)
            {
                return Err(DecodeError::BadOffset {
                    offset,
                    produced: self.produced,
                });
            }
            Ok((token, next))
        });
        match result {
            Ok((token, next)) => {
                self.pos = next;
                self.produced += token.output_len();
                Some(Ok(token))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
