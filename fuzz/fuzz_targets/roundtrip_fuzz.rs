#![no_main]
use libfuzzer_sys::fuzz_target;
use oxisnap::{Compressor, compress, decompress, max_compressed_len};

fuzz_target!(|data: &[u8]| {
    let compressed = compress(data);
    assert!(compressed.len() <= max_compressed_len(data.len()));

    let decoded = decompress(&compressed).expect("own output must decode");
    assert_eq!(decoded, data);

    // A conformant decoder must accept it too.
    let theirs = snap::raw::Decoder::new()
        .decompress_vec(&compressed)
        .expect("snap must decode our output");
    assert_eq!(theirs, data);

    // Reusing a compressor never changes its output.
    let mut c = Compressor::new();
    let _ = c.compress_vec(&compressed);
    assert_eq!(c.compress_vec(data).unwrap(), compressed);
});
