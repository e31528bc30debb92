// Integration tests for the compress module.
//
// Tests the full pipeline: Compressor -> Snappy stream -> Decompressor,
// across empty, tiny, repetitive, random and mixed inputs, fragment
// boundaries, determinism and the worst-case size bound.

use oxisnap::format::{Header, Token, TokenIterator};
use oxisnap::{Compressor, Decompressor, compress, decompress, decompressed_len, max_compressed_len};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn roundtrip(input: &[u8]) -> Vec<u8> {
    let compressed = compress(input);
    assert!(
        compressed.len() <= max_compressed_len(input.len()),
        "size bound violated: {} > {}",
        compressed.len(),
        max_compressed_len(input.len())
    );
    assert_eq!(decompressed_len(&compressed).unwrap(), input.len());
    let decoded = decompress(&compressed).unwrap();
    assert_eq!(
        decoded,
        input,
        "roundtrip mismatch (input={}, compressed={})",
        input.len(),
        compressed.len()
    );
    compressed
}

fn generate_data(size: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        data.push((state >> 33) as u8);
    }
    data
}

fn repetitive_data(pattern: &[u8], total: usize) -> Vec<u8> {
    pattern.iter().copied().cycle().take(total).collect()
}

/// Text-like data: random words from a small vocabulary.
fn text_data(size: usize, seed: u64) -> Vec<u8> {
    const WORDS: [&[u8]; 8] = [
        b"snappy ", b"block ", b"literal ", b"copy ", b"offset ", b"hash ", b"table ", b"fragment ",
    ];
    let noise = generate_data(size, seed);
    let mut out = Vec::with_capacity(size + 16);
    let mut i = 0;
    while out.len() < size {
        out.extend_from_slice(WORDS[(noise[i % noise.len()] & 7) as usize]);
        i += 1;
    }
    out.truncate(size);
    out
}

fn body(stream: &[u8]) -> &[u8] {
    &stream[Header::parse(stream).unwrap().header_len..]
}

// ---------------------------------------------------------------------------
// Spot scenarios
// ---------------------------------------------------------------------------

#[test]
fn empty_input() {
    assert_eq!(roundtrip(b""), vec![0x00]);
}

#[test]
fn single_byte_values() {
    for b in [0u8, 1, 0x7F, 0x80, 0xFF] {
        assert_eq!(roundtrip(&[b]), vec![0x01, 0x00, b]);
    }
}

#[test]
fn three_hundred_a_compresses() {
    let compressed = roundtrip(&[b'a'; 300]);
    assert!(compressed.len() < 300, "got {}", compressed.len());
}

#[test]
fn hundred_random_bytes_within_bound() {
    let input = generate_data(100, 7);
    let compressed = roundtrip(&input);
    assert!(compressed.len() <= 148);
}

#[test]
fn elements_followed_by_more_elements_decode() {
    // A copy that is not the last element of the stream.
    let stream = [8, 3 << 2, b'w', b'x', b'y', b'z', (3 << 2) | 0x02, 4, 0];
    assert_eq!(decompress(&stream).unwrap(), b"wxyzwxyz");

    let mut with_tail = vec![9];
    with_tail.extend_from_slice(&stream[1..]);
    with_tail.extend_from_slice(&[0x00, b'!']);
    assert_eq!(decompress(&with_tail).unwrap(), b"wxyzwxyz!");

    roundtrip(b"hello world, hello world, hello world, hello world");
}

#[test]
fn all_zero_and_all_ff() {
    for fill in [0x00u8, 0xFF] {
        for size in [15, 16, 17, 1000, 65_536, 65_537] {
            let compressed = roundtrip(&vec![fill; size]);
            assert!(compressed.len() < size.max(32), "size {size} fill {fill:#x}");
        }
    }
}

#[test]
fn short_inputs_are_one_literal() {
    // Below the input margin no matching is attempted.
    for len in 1..15 {
        let input = repetitive_data(b"ab", len);
        let compressed = roundtrip(&input);
        let tokens: Vec<_> = TokenIterator::new(body(&compressed))
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens, vec![Token::Literal(&input[..])]);
    }
}

// ---------------------------------------------------------------------------
// Sizes around the interesting boundaries
// ---------------------------------------------------------------------------

#[test]
fn boundary_sizes_roundtrip() {
    let sizes = [
        0, 1, 2, 3, 4, 5, 14, 15, 16, 17, 59, 60, 61, 62, 63, 64, 65, 255, 256, 257, 2047, 2048,
        2049, 4095, 4096, 16_383, 16_384, 16_385, 65_535, 65_536, 65_537, 131_072, 131_073,
    ];
    for size in sizes {
        roundtrip(&generate_data(size, size as u64));
        roundtrip(&text_data(size, size as u64 + 1));
    }
}

#[test]
fn long_literals_use_extra_length_bytes() {
    // Incompressible input larger than 60 bytes forces 1..=3 extra length bytes.
    for size in [61, 256, 257, 65_536] {
        let input = generate_data(size, 99);
        let compressed = roundtrip(&input);
        let literal_bytes: usize = TokenIterator::new(body(&compressed))
            .map(Result::unwrap)
            .map(|t| match t {
                Token::Literal(b) => b.len(),
                Token::Copy { .. } => 0,
            })
            .sum();
        assert!(literal_bytes > size / 2);
    }
}

// ---------------------------------------------------------------------------
// Data shapes
// ---------------------------------------------------------------------------

#[test]
fn random_data_1mb() {
    let input = generate_data(1024 * 1024, 100);
    roundtrip(&input);
}

#[test]
fn text_data_compresses_well() {
    let input = text_data(256 * 1024, 3);
    let compressed = roundtrip(&input);
    assert!(
        compressed.len() < input.len() * 3 / 4,
        "text compressed to {} of {}",
        compressed.len(),
        input.len()
    );
}

#[test]
fn mixed_random_and_repetitive() {
    let mut input = Vec::new();
    for i in 0..20u64 {
        if i % 2 == 0 {
            input.extend(generate_data(3000, i));
        } else {
            input.extend(repetitive_data(b"0123456789abcdef", 5000));
        }
    }
    let compressed = roundtrip(&input);
    assert!(compressed.len() < input.len());
}

#[test]
fn short_period_patterns() {
    for period in 1..=12 {
        let pattern: Vec<u8> = (0..period as u8).collect();
        let input = repetitive_data(&pattern, 10_000);
        let compressed = roundtrip(&input);
        assert!(compressed.len() < 1000, "period {period}: {}", compressed.len());
    }
}

#[test]
fn repeat_across_far_offsets() {
    // Same 4 KiB block repeated at distances that need 2-byte offsets.
    let block = generate_data(4096, 5);
    let mut input = block.clone();
    input.extend(generate_data(3_000, 6));
    input.extend_from_slice(&block);
    let compressed = roundtrip(&input);

    let far_copy = TokenIterator::new(body(&compressed))
        .map(Result::unwrap)
        .any(|t| matches!(t, Token::Copy { offset, .. } if offset >= 2048));
    assert!(far_copy, "expected a copy with a 2-byte offset");
}

// ---------------------------------------------------------------------------
// Fragment independence
// ---------------------------------------------------------------------------

#[test]
fn copies_never_cross_fragment_boundaries() {
    let block = generate_data(65_536, 11);
    let mut input = block.clone();
    input.extend_from_slice(&block);
    let compressed = roundtrip(&input);

    // The second fragment cannot reference the first, so it stays literal.
    let mut tokens = TokenIterator::new(body(&compressed));
    let mut offsets_ok = true;
    let mut fragment_start = 0usize;
    while let Some(token) = tokens.next() {
        let produced_before = tokens.produced() - token.as_ref().unwrap().output_len();
        if produced_before >= 65_536 {
            fragment_start = 65_536;
        }
        if let Token::Copy { offset, .. } = token.unwrap() {
            offsets_ok &= produced_before - offset >= fragment_start;
        }
    }
    assert!(offsets_ok);
    assert!(compressed.len() > 65_536);
}

// ---------------------------------------------------------------------------
// Determinism and reuse
// ---------------------------------------------------------------------------

#[test]
fn compress_is_deterministic() {
    let input = text_data(200_000, 42);
    let a = compress(&input);
    let b = compress(&input);
    assert_eq!(a, b);
}

#[test]
fn reused_compressor_matches_fresh() {
    let mut c = Compressor::new();
    let inputs = [
        generate_data(70_000, 1),
        text_data(5_000, 2),
        vec![0u8; 300],
        text_data(65_536, 3),
        Vec::new(),
    ];
    for input in &inputs {
        assert_eq!(c.compress_vec(input).unwrap(), compress(input));
    }
}

#[test]
fn reused_decompressor() {
    let mut d = Decompressor::new();
    for seed in 0..5 {
        let input = text_data(10_000 * (seed as usize + 1), seed);
        assert_eq!(d.decompress_vec(&compress(&input)).unwrap(), input);
    }
    assert!(d.bytes_out() > d.bytes_in());
}

#[test]
fn decompress_into_larger_buffer() {
    let input = text_data(5000, 8);
    let compressed = compress(&input);
    let mut out = vec![0xAAu8; 6000];
    let n = oxisnap::decompress_into(&compressed, &mut out).unwrap();
    assert_eq!(n, input.len());
    assert_eq!(&out[..n], input.as_slice());
    assert!(out[n..].iter().all(|&b| b == 0xAA));
}
