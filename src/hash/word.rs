// 4-byte window loads and the multiplicative window hash.

use super::config::HASH_MULT;

/// Read 4 bytes at `pos` as a little-endian `u32`.
#[inline(always)]
pub fn load_u32_le(data: &[u8], pos: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[pos..pos + 4]);
    u32::from_le_bytes(word)
}

/// Hash a 4-byte window into a table of `1 << bits` entries.
///
/// `bits` must be in `1..=32`.
#[inline(always)]
pub fn hash_word(word: u32, bits: u32) -> usize {
    (word.wrapping_mul(HASH_MULT) >> (32 - bits)) as usize
}

/// Whether the 4-byte windows at `a` and `b` are identical.
#[inline(always)]
pub fn words_equal(data: &[u8], a: usize, b: usize) -> bool {
    load_u32_le(data, a) == load_u32_le(data, b)
}
