// Snappy length-header varint.
//
// Base-128, little-endian: least-significant group first.
// Each byte has bit 7 set except the final byte.
// The header describes a 32-bit length, so at most 5 bytes are valid.

use std::io::{self, Write};

/// Maximum encoded length for a 32-bit value (ceil(32/7) = 5).
pub const MAX_VARINT_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u32` into `buf`, least-significant group first.
/// Returns the number of bytes written (1..=5).
#[inline]
pub fn encode_u32(mut num: u32, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let group = (num & 0x7F) as u8;
        num >>= 7;
        if num == 0 {
            buf[i] = group;
            return i + 1;
        }
        buf[i] = group | 0x80;
        i += 1;
    }
}

/// Encode a `u32` directly into the front of `out`.
///
/// `out` must have room for `sizeof_u32(num)` bytes.
#[inline]
pub fn put_u32(num: u32, out: &mut [u8]) -> usize {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u32(num, &mut buf);
    out[..len].copy_from_slice(&buf[..len]);
    len
}

/// Encode a `u32` and write to a `Write` sink.
pub fn write_u32<W: Write>(w: &mut W, num: u32) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u32(num, &mut buf);
    w.write_all(&buf[..len])
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a `u32` from the front of `data`.
/// Returns `(value, bytes_consumed)` or an error.
///
/// Fails rather than truncating: a group whose bits would be shifted out of
/// the 32-bit accumulator is an overflow, as is a sixth continuation byte.
pub fn read_u32(data: &[u8]) -> Result<(u32, usize), VarIntError> {
    let mut val: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(VarIntError::Overflow);
        }
        let group = u32::from(byte & 0x7F);
        let shift = 7 * i as u32;
        if (group << shift) >> shift != group {
            return Err(VarIntError::Overflow);
        }
        val |= group << shift;
        if byte & 0x80 == 0 {
            return Ok((val, i + 1));
        }
    }
    Err(VarIntError::Truncated)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the encoded byte-length of a `u32` value.
#[inline]
pub fn sizeof_u32(num: u32) -> usize {
    let bits = 32 - num.leading_zeros();
    bits.max(1).div_ceil(7) as usize
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VarIntError {
    /// Input ended before the final group.
    #[error("varint truncated")]
    Truncated,
    /// More than 5 groups, or bits beyond the 32-bit range.
    #[error("varint overflows 32 bits")]
    Overflow,
}

impl From<VarIntError> for io::Error {
    fn from(e: VarIntError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_u32() {
        let cases: &[u32] = &[0, 1, 127, 128, 255, 256, 16383, 16384, 65536, u32::MAX];
        let mut buf = [0u8; MAX_VARINT_LEN];
        for &val in cases {
            let len = encode_u32(val, &mut buf);
            let (decoded, consumed) = read_u32(&buf[..len]).unwrap();
            assert_eq!(decoded, val, "roundtrip failed for {val}");
            assert_eq!(consumed, len, "length mismatch for {val}");
            assert_eq!(sizeof_u32(val), len, "sizeof mismatch for {val}");
        }
    }

    #[test]
    fn encoding_is_little_endian() {
        // 300 = 0b10_0101100 -> low group first: 0xAC 0x02
        let mut buf = [0u8; MAX_VARINT_LEN];
        let len = encode_u32(300, &mut buf);
        assert_eq!(&buf[..len], &[0xAC, 0x02]);

        let len = encode_u32(64 * 1024, &mut buf);
        assert_eq!(&buf[..len], &[0x80, 0x80, 0x04]);
    }

    #[test]
    fn single_byte_values() {
        let mut buf = [0u8; MAX_VARINT_LEN];
        for val in 0..=127u32 {
            assert_eq!(encode_u32(val, &mut buf), 1);
            assert_eq!(buf[0], val as u8);
        }
    }

    #[test]
    fn max_value_uses_five_bytes() {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let len = encode_u32(u32::MAX, &mut buf);
        assert_eq!(&buf[..len], &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        let (val, len) = read_u32(&[0x05, 0xAA, 0xBB]).unwrap();
        assert_eq!(val, 5);
        assert_eq!(len, 1);
    }

    #[test]
    fn truncated_detection() {
        assert_eq!(read_u32(&[]), Err(VarIntError::Truncated));
        assert_eq!(read_u32(&[0x80, 0x80, 0x80]), Err(VarIntError::Truncated));
    }

    #[test]
    fn six_byte_chain_is_overflow() {
        let data = [0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        assert_eq!(read_u32(&data), Err(VarIntError::Overflow));
    }

    #[test]
    fn fifth_group_high_bits_are_overflow() {
        // 0x10 in the fifth group would be bit 32.
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x10];
        assert_eq!(read_u32(&data), Err(VarIntError::Overflow));
    }

    #[test]
    fn put_and_write_agree() {
        let mut out = Vec::new();
        write_u32(&mut out, 999_999).unwrap();
        let mut fixed = [0u8; 8];
        let len = put_u32(999_999, &mut fixed);
        assert_eq!(&fixed[..len], out.as_slice());
        assert_eq!(read_u32(&out).unwrap(), (999_999, out.len()));
    }
}
