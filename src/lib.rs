//! Oxisnap: the Snappy raw block format in pure Rust.
//!
//! The crate provides:
//! - The wire format: varints, element tags and the tag-stream decoder (`format`)
//! - The fragment match finder and its hash tables (`hash`)
//! - Whole-buffer compression and decompression (`compress`)
//! - Conversions from hex and UTF-16 buffer encodings (`adapter`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! Only the raw block format is implemented; there is no framing, no
//! checksums and no streaming across calls.
//!
//! # Quick Start
//!
//! ```
//! let input = b"hello hello hello hello hello";
//! let compressed = oxisnap::compress(input);
//! assert!(compressed.len() <= oxisnap::max_compressed_len(input.len()));
//! assert_eq!(oxisnap::decompressed_len(&compressed).unwrap(), input.len());
//!
//! let decoded = oxisnap::decompress(&compressed).unwrap();
//! assert_eq!(decoded, input);
//! ```

pub mod adapter;
pub mod compress;
pub mod format;
pub mod hash;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use compress::{
    Compressor, Decompressor, EncodeError, compress, decompress, decompress_into,
    decompressed_len, max_compressed_len,
};
pub use format::DecodeError;

#[cfg(feature = "parallel")]
pub use compress::compress_batch;
