// Hashing and match finding for the compressor.
//
// This module provides:
// - Tuning constants and table sizing (`config`)
// - 4-byte window loads and the multiplicative hash (`word`)
// - The per-fragment hash table and its scratch pool (`table`)
// - The fragment match finder that writes elements (`matching`)

pub mod config;
pub mod matching;
pub mod table;
pub mod word;
