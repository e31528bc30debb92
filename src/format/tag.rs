// Snappy element tags.
//
// The low two bits of every tag byte select the element kind:
//
//   00  literal      length-1 in the upper 6 bits; 60..63 mean 1..4 extra
//                    little-endian length bytes follow
//   01  short copy   length 4..11, 11-bit offset (3 high bits in the tag)
//   10  medium copy  length 1..64, 2-byte little-endian offset
//   11  long copy    length 1..64, 4-byte little-endian offset
//
// The compressor works on fragments of at most 64 KiB, so it never needs
// the long copy form or literal headers wider than two bytes.

pub const TAG_LITERAL: u8 = 0x00;
pub const TAG_COPY_1: u8 = 0x01;
pub const TAG_COPY_2: u8 = 0x02;
pub const TAG_COPY_4: u8 = 0x03;

/// Longest literal expressible without extra length bytes.
pub const MAX_INLINE_LITERAL: usize = 60;

/// Longest copy a single tag can describe.
pub const MAX_COPY_LEN: usize = 64;

/// Longest offset a short copy can carry.
pub const MAX_COPY_1_OFFSET: usize = 1 << 11;

/// One element of a compressed stream, as seen by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw bytes copied verbatim into the output.
    Literal(&'a [u8]),
    /// `len` bytes copied from `offset` bytes back in the output.
    Copy { offset: usize, len: usize },
}

impl Token<'_> {
    /// Number of output bytes this token produces.
    #[inline]
    pub fn output_len(&self) -> usize {
        match *self {
            Token::Literal(bytes) => bytes.len(),
            Token::Copy { len, .. } => len,
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Size of the tag plus length bytes for a literal of `len` bytes.
#[inline]
pub fn literal_header_len(len: usize) -> usize {
    if len <= MAX_INLINE_LITERAL {
        1
    } else if len < 1 << 8 {
        2
    } else {
        3
    }
}

/// Write a literal element (header + bytes) at `out[op..]`.
/// Returns the new output position.
///
/// `lit` must be non-empty and at most 64 KiB.
#[inline]
pub fn emit_literal(out: &mut [u8], mut op: usize, lit: &[u8]) -> usize {
    let n = lit.len() - 1;
    if lit.len() <= MAX_INLINE_LITERAL {
        out[op] = (n as u8) << 2 | TAG_LITERAL;
        op += 1;
    } else if lit.len() < 1 << 8 {
        out[op] = 60 << 2 | TAG_LITERAL;
        out[op + 1] = n as u8;
        op += 2;
    } else {
        debug_assert!(n < 1 << 16);
        out[op] = 61 << 2 | TAG_LITERAL;
        out[op + 1] = n as u8;
        out[op + 2] = (n >> 8) as u8;
        op += 3;
    }
    out[op..op + lit.len()].copy_from_slice(lit);
    op + lit.len()
}

/// Write a single copy element of 1..=64 bytes at `out[op..]`.
#[inline]
fn emit_copy_at_most_64(out: &mut [u8], op: usize, offset: usize, len: usize) -> usize {
    debug_assert!((1..=MAX_COPY_LEN).contains(&len));
    debug_assert!(offset > 0 && offset < 1 << 16);
    if (4..12).contains(&len) && offset < MAX_COPY_1_OFFSET {
        out[op] = ((offset >> 8) as u8) << 5 | ((len - 4) as u8) << 2 | TAG_COPY_1;
        out[op + 1] = offset as u8;
        op + 2
    } else {
        out[op] = ((len - 1) as u8) << 2 | TAG_COPY_2;
        out[op + 1] = offset as u8;
        out[op + 2] = (offset >> 8) as u8;
        op + 3
    }
}

/// Write a back-reference of any length (>= 4) at `out[op..]`, splitting it
/// into elements of at most 64 bytes. The split keeps the last element at
/// 5 bytes or more so it stays eligible for the short form.
pub fn emit_copy(out: &mut [u8], mut op: usize, offset: usize, mut len: usize) -> usize {
    while len >= 68 {
        op = emit_copy_at_most_64(out, op, offset, 64);
        len -= 64;
    }
    if len > 64 {
        op = emit_copy_at_most_64(out, op, offset, 60);
        len -= 60;
    }
    emit_copy_at_most_64(out, op, offset, len)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
