// Snappy raw block format.
//
// A compressed stream is a varint length header followed by a flat
// sequence of literal and copy elements.  There are no block boundaries,
// checksums or trailers.
//
// # Modules
//
// - `varint` : Length header (base-128, little-endian, at most 5 bytes)
// - `tag`    : Element tag layout and the literal/copy emitters
// - `decoder`: Tag-stream interpreter and token iterator

pub mod decoder;
pub mod tag;
pub mod varint;

pub use decoder::{DecodeError, Header, TokenIterator};
pub use tag::Token;
pub use varint::VarIntError;
