// Match-finder tuning constants.
//
// Snappy has no compression levels; these values fix the single profile
// every conformant compressor in this family uses.

/// log2 of the fragment size.
pub const BLOCK_LOG: u32 = 16;

/// Largest fragment the match finder processes at once (64 KiB).
pub const BLOCK_SIZE: usize = 1 << BLOCK_LOG;

/// Smallest hash table (256 entries).
pub const MIN_TABLE_BITS: u32 = 8;

/// Largest hash table (16384 entries).
pub const MAX_TABLE_BITS: u32 = 14;

/// Multiplier for the 4-byte window hash.
pub const HASH_MULT: u32 = 0x1e35_a7bd;

/// Minimum match length; also the hashed window width.
pub const MIN_MATCH: usize = 4;

/// Fragments shorter than this are emitted as one literal, and the scan
/// stops this many bytes before the fragment end.
pub const INPUT_MARGIN: usize = 15;

/// Initial value of the skip counter.
pub const SKIP_START: u32 = 32;

/// `skip >> SKIP_SHIFT` is the step after a failed probe.
pub const SKIP_SHIFT: u32 = 5;

/// Bit width of the hash table for a fragment of `len` bytes: the smallest
/// power of two covering the fragment, clamped to
/// `MIN_TABLE_BITS..=MAX_TABLE_BITS`.
#[inline]
pub fn table_bits_for(len: usize) -> u32 {
    let bits = len.max(1).next_power_of_two().trailing_zeros();
    bits.clamp(MIN_TABLE_BITS, MAX_TABLE_BITS)
}
