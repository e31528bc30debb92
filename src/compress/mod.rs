// Block-level compression API.
//
// - `encoder` : Compressor, the length header plus per-fragment matching
// - `decoder` : Decompressor, plausibility checks and whole-buffer output

pub mod decoder;
pub mod encoder;

pub use decoder::{Decompressor, decompress, decompress_into, decompressed_len};
pub use encoder::{Compressor, EncodeError, MAX_INPUT_LEN, compress, max_compressed_len};

#[cfg(feature = "parallel")]
pub use encoder::compress_batch;
