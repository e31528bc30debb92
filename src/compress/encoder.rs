// Block compressor.
//
// Compressor owns the scratch hash tables and drives the match finder:
//   - Write the varint length header
//   - Split the input into fragments of at most 64 KiB
//   - Compress each fragment with a zeroed table sized to it
//   - All fragments share one flat element stream

use log::{debug, trace};

use crate::format::varint;
use crate::hash::config::{BLOCK_SIZE, table_bits_for};
use crate::hash::matching::compress_fragment;
use crate::hash::table::TablePool;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Largest input the length header can describe.
pub const MAX_INPUT_LEN: usize = u32::MAX as usize;

/// Upper bound on the compressed size of `src_len` input bytes.
///
/// Holds for every input; a buffer of this size never overflows.
#[inline]
pub fn max_compressed_len(src_len: usize) -> usize {
    32 + src_len + src_len / 6
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Misuse of the buffer-based API.  Compression itself cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("input of {len} bytes exceeds the 32-bit length header")]
    InputTooLarge { len: usize },
}

// ---------------------------------------------------------------------------
// Compressor
// ---------------------------------------------------------------------------

/// Reusable Snappy compressor.
///
/// Keeps one scratch hash table per table width so repeated calls avoid
/// re-allocating.  Tables are zeroed before every fragment, so output
/// depends only on the input.
///
/// # Example
/// ```
/// use oxisnap::Compressor;
/// let mut c = Compressor::new();
/// let a = c.compress_vec(b"hello hello hello hello").unwrap();
/// let b = c.compress_vec(b"hello hello hello hello").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Default)]
pub struct Compressor {
    pool: TablePool,
    bytes_in: u64,
    bytes_out: u64,
}

impl Compressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress `input` into `output`, returning the compressed length.
    ///
    /// `output` must be at least `max_compressed_len(input.len())` bytes.
    pub fn compress_into(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, EncodeError> {
        if input.len() > MAX_INPUT_LEN {
            return Err(EncodeError::InputTooLarge { len: input.len() });
        }
        let needed = max_compressed_len(input.len());
        if output.len() < needed {
            return Err(EncodeError::BufferTooSmall {
                needed,
                available: output.len(),
            });
        }
        Ok(self.compress_unchecked(input, output))
    }

    /// Compress `input` into a new, exactly sized `Vec`.
    pub fn compress_vec(&mut self, input: &[u8]) -> Result<Vec<u8>, EncodeError> {
        if input.len() > MAX_INPUT_LEN {
            return Err(EncodeError::InputTooLarge { len: input.len() });
        }
        let mut output = vec![0u8; max_compressed_len(input.len())];
        let n = self.compress_unchecked(input, &mut output);
        output.truncate(n);
        Ok(output)
    }

    /// Total uncompressed bytes consumed by this compressor.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Total compressed bytes produced by this compressor.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Length and buffer size are already validated.
    fn compress_unchecked(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        let mut op = varint::put_u32(input.len() as u32, output);

        for (i, fragment) in input.chunks(BLOCK_SIZE).enumerate() {
            let table = self.pool.table(table_bits_for(fragment.len()));
            let start = op;
            op = compress_fragment(fragment, output, op, table);
            trace!(
                "fragment {i}: {} -> {} bytes ({}-bit table)",
                fragment.len(),
                op - start,
                table.bits()
            );
        }

        debug!("compressed {} -> {} bytes", input.len(), op);
        self.bytes_in += input.len() as u64;
        self.bytes_out += op as u64;
        op
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Compress `input` into a new `Vec`.
///
/// # Panics
///
/// Panics if `input` is longer than `u32::MAX` bytes, which the length
/// header cannot describe.  Use [`Compressor::compress_vec`] to get an
/// error instead.
pub fn compress(input: &[u8]) -> Vec<u8> {
    assert!(
        input.len() <= MAX_INPUT_LEN,
        "snappy input of {} bytes exceeds the 32-bit length header",
        input.len()
    );
    let mut output = vec![0u8; max_compressed_len(input.len())];
    let n = Compressor::new().compress_unchecked(input, &mut output);
    output.truncate(n);
    output
}

/// Compress many independent inputs in parallel, one compressor per worker.
///
/// Each input is compressed on a single thread; results are returned in
/// input order and are identical to calling `compress` on each.
#[cfg(feature = "parallel")]
pub fn compress_batch<T: AsRef<[u8]> + Sync>(inputs: &[T]) -> Result<Vec<Vec<u8>>, EncodeError> {
    inputs
        .par_iter()
        .map_init(Compressor::new, |c, input| c.compress_vec(input.as_ref()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
