// Block decompressor.
//
// Decompressor wraps the tag-stream interpreter with:
//   - A plausibility check on the declared length before allocating
//   - Whole-or-nothing output (no partial buffer is ever returned)
//   - Running totals across calls

use log::debug;

use crate::format::decoder::{DecodeError, Header, decode_body, decode_into};

/// Largest output one stream byte can account for.  A 3-byte copy yields
/// at most 64 bytes, so no element expands by more than 64/3.
const MAX_EXPANSION: usize = 22;

/// Declared uncompressed length of `stream`, reading only the header.
pub fn decompressed_len(stream: &[u8]) -> Result<usize, DecodeError> {
    Ok(Header::parse(stream)?.uncompressed_len)
}

/// Reject a header whose length the remaining body could never produce.
fn check_plausible(stream: &[u8], header: &Header) -> Result<(), DecodeError> {
    let body_len = stream.len() - header.header_len;
    if header.uncompressed_len > body_len.saturating_mul(MAX_EXPANSION) {
        return Err(DecodeError::ImplausibleLength {
            declared: header.uncompressed_len,
            stream_len: stream.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Decompressor
// ---------------------------------------------------------------------------

/// Reusable Snappy decompressor with running totals.
#[derive(Debug, Default)]
pub struct Decompressor {
    bytes_in: u64,
    bytes_out: u64,
}

impl Decompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompress `stream` into `output`, returning the decoded length.
    ///
    /// `output` must hold at least `decompressed_len(stream)` bytes.  On
    /// error the contents of `output` are unspecified.
    pub fn decompress_into(&mut self, stream: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
        let n = decode_into(stream, output)?;
        self.record(stream.len(), n);
        Ok(n)
    }

    /// Decompress `stream` into a new `Vec` of exactly the declared length.
    pub fn decompress_vec(&mut self, stream: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let header = Header::parse(stream)?;
        check_plausible(stream, &header)?;

        let mut output = vec![0u8; header.uncompressed_len];
        decode_body(&stream[header.header_len..], &mut output)?;
        self.record(stream.len(), output.len());
        Ok(output)
    }

    /// Total compressed bytes consumed by successful calls.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Total uncompressed bytes produced by successful calls.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    fn record(&mut self, consumed: usize, produced: usize) {
        debug!("decompressed {consumed} -> {produced} bytes");
        self.bytes_in += consumed as u64;
        self.bytes_out += produced as u64;
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Decompress `stream` into a new `Vec`.
pub fn decompress(stream: &[u8]) -> Result<Vec<u8>, DecodeError> {
    Decompressor::new().decompress_vec(stream)
}

/// Decompress `stream` into `output`, returning the decoded length.
pub fn decompress_into(stream: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
    Decompressor::new().decompress_into(stream, output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::encoder::compress;
    use crate::format::varint::VarIntError;

    #[test]
    fn empty_stream_decodes_to_nothing() {
        assert_eq!(decompress(&[0x00]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn literal_only_stream() {
        let stream = [0x05, 0x10, b'h', b'e', b'l', b'l', b'o'];
        assert_eq!(decompress(&stream).unwrap(), b"hello");
    }

    #[test]
    fn overlapping_copy_extends_run() {
        // literal "ab", then copy offset 2 len 8 -> "ababababab"
        let stream = [0x0A, 0x04, b'a', b'b', 0x11, 0x02];
        assert_eq!(decompress(&stream).unwrap(), b"ababababab");
    }

    #[test]
    fn decompressed_len_reads_header_only() {
        assert_eq!(decompressed_len(&[0xE8, 0x07]).unwrap(), 1000);
        assert_eq!(
            decompressed_len(&[]),
            Err(DecodeError::Header(VarIntError::Truncated))
        );
    }

    #[test]
    fn roundtrip_through_compressor() {
        let input: Vec<u8> = b"snappy snappy snappy, compress me please "
            .iter()
            .copied()
            .cycle()
            .take(10_000)
            .collect();
        let stream = compress(&input);
        assert_eq!(decompress(&stream).unwrap(), input);

        let mut out = vec![0u8; input.len() + 16];
        let n = decompress_into(&stream, &mut out).unwrap();
        assert_eq!(&out[..n], input.as_slice());
    }

    #[test]
    fn forged_length_is_rejected_before_allocating() {
        // Declares u32::MAX bytes with a two-byte body.
        let stream = [0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x00, b'x'];
        assert_eq!(
            decompress(&stream),
            Err(DecodeError::ImplausibleLength {
                declared: u32::MAX as usize,
                stream_len: 7,
            })
        );
    }

    #[test]
    fn short_stream_is_length_mismatch() {
        // Declares 4 bytes, produces 1.
        let stream = [0x04, 0x00, b'x'];
        assert_eq!(
            decompress(&stream),
            Err(DecodeError::LengthMismatch {
                declared: 4,
                produced: 1
            })
        );
    }

    #[test]
    fn undersized_output_buffer() {
        let stream = compress(b"0123456789");
        let mut out = [0u8; 4];
        assert_eq!(
            decompress_into(&stream, &mut out),
            Err(DecodeError::BufferTooSmall {
                needed: 10,
                available: 4
            })
        );
    }

    #[test]
    fn counters_only_count_successes() {
        let mut d = Decompressor::new();
        let stream = compress(&[9u8; 200]);
        d.decompress_vec(&stream).unwrap();
        assert!(d.decompress_vec(&[0x04, 0x00, b'x']).is_err());
        assert_eq!(d.bytes_in(), stream.len() as u64);
        assert_eq!(d.bytes_out(), 200);
    }
}
