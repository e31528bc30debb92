// Cross-compatibility with the `snap` crate's raw block format.
//
// Streams we produce must decode with snap, and streams snap produces must
// decode with us, byte for byte.

use oxisnap::{compress, decompress, decompressed_len};

fn generate_data(size: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..size)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}

fn corpus() -> Vec<Vec<u8>> {
    let mut out = vec![
        Vec::new(),
        vec![0x42],
        vec![0u8; 100_000],
        vec![0xFFu8; 70_000],
        b"abcabcabcabcabcabcabcabcabcabcabcabc".to_vec(),
        generate_data(100, 1),
        generate_data(65_536, 2),
        generate_data(300_000, 3),
    ];
    let text: Vec<u8> = b"It was the best of times, it was the worst of times, "
        .iter()
        .copied()
        .cycle()
        .take(200_000)
        .collect();
    out.push(text);

    let mut mixed = generate_data(10_000, 4);
    mixed.extend_from_slice(&mixed.clone()[2_000..8_000]);
    mixed.extend(std::iter::repeat_n(7u8, 5_000));
    out.push(mixed);
    out
}

#[test]
fn snap_decodes_our_streams() {
    let mut decoder = snap::raw::Decoder::new();
    for input in corpus() {
        let ours = compress(&input);
        assert_eq!(snap::raw::decompress_len(&ours).unwrap(), input.len());
        let decoded = decoder.decompress_vec(&ours).unwrap();
        assert_eq!(decoded, input, "snap failed on {} bytes", input.len());
    }
}

#[test]
fn we_decode_snap_streams() {
    let mut encoder = snap::raw::Encoder::new();
    for input in corpus() {
        let theirs = encoder.compress_vec(&input).unwrap();
        assert_eq!(decompressed_len(&theirs).unwrap(), input.len());
        let decoded = decompress(&theirs).unwrap();
        assert_eq!(decoded, input, "decode failed on {} bytes", input.len());
    }
}

#[test]
fn bounds_agree() {
    for len in [0usize, 1, 100, 65_536, 1 << 20] {
        assert_eq!(oxisnap::max_compressed_len(len), snap::raw::max_compress_len(len));
    }
}

#[test]
fn random_sizes_both_directions() {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut encoder = snap::raw::Encoder::new();
    let mut decoder = snap::raw::Decoder::new();
    for _ in 0..50 {
        let len = rng.random_range(0..50_000);
        let period = rng.random_range(1..200);
        let input: Vec<u8> = (0..len)
            .map(|i| if i % period == 0 { rng.random() } else { (i % period) as u8 })
            .collect();

        let ours = compress(&input);
        assert_eq!(decoder.decompress_vec(&ours).unwrap(), input);

        let theirs = encoder.compress_vec(&input).unwrap();
        assert_eq!(decompress(&theirs).unwrap(), input);
    }
}
