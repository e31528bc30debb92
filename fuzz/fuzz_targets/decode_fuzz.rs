#![no_main]
use libfuzzer_sys::fuzz_target;
use oxisnap::format::{Header, TokenIterator};

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    let ours = oxisnap::decompress(data);

    // Whatever we accept, a conformant decoder accepts with the same output.
    if let Ok(out) = &ours {
        let theirs = snap::raw::Decoder::new().decompress_vec(data).unwrap();
        assert_eq!(out, &theirs);
    }

    // Walking the tokens agrees with decoding about validity.
    if let Ok(header) = Header::parse(data) {
        let mut tokens = TokenIterator::new(&data[header.header_len..]);
        let clean = tokens.by_ref().all(|t| t.is_ok());
        if ours.is_ok() {
            assert!(clean);
            assert_eq!(tokens.produced(), header.uncompressed_len);
        }
    }
});
