// File-level I/O helpers for compression/decompression.
//
// Snappy blocks are whole-buffer transforms, so each helper reads its input
// completely, converts it from the chosen buffer representation, runs the
// codec and writes the result through a `BufWriter`.  Optionally computes
// a SHA-256 of the uncompressed data (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::adapter::{self, ArgumentError, BufferFormat};
use crate::compress::{Compressor, Decompressor, EncodeError};
use crate::format::DecodeError;
use crate::hash::config::BLOCK_SIZE;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()` and `compress_stream()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Uncompressed size in bytes (after input-format conversion).
    pub input_size: u64,
    /// Compressed size in bytes (before output-format conversion).
    pub output_size: u64,
    /// Number of 64 KiB fragments the input was split into.
    pub fragments: u64,
    /// SHA-256 of the uncompressed data (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decompress_file()` and `decompress_stream()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Compressed size in bytes (after input-format conversion).
    pub input_size: u64,
    /// Decompressed size in bytes (before output-format conversion).
    pub output_size: u64,
    /// SHA-256 of the decompressed data (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("argument error: {0}")]
    Argument(#[from] ArgumentError),
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

/// Buffer representations on either side of the codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Formats {
    pub input: BufferFormat,
    pub output: BufferFormat,
}

/// Number of fragments the compressor splits `len` bytes into.
pub fn fragment_count(len: usize) -> u64 {
    len.div_ceil(BLOCK_SIZE) as u64
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    use sha2::Digest;
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Read all of `reader`, compress it and write the result to `writer`.
///
/// When `check_only` is set, nothing is written.
pub fn compress_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    formats: Formats,
    check_only: bool,
) -> Result<CompressStats, IoError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    let input = adapter::to_canonical(formats.input, &raw)?;

    let compressed = Compressor::new().compress_vec(&input)?;
    if !check_only {
        writer.write_all(&adapter::from_canonical(formats.output, &compressed))?;
        writer.flush()?;
    }

    let stats = CompressStats {
        input_size: input.len() as u64,
        output_size: compressed.len() as u64,
        fragments: fragment_count(input.len()),
        input_sha256: sha256(&input),
    };
    debug!("compress stats: {stats:?}");
    Ok(stats)
}

/// Read all of `reader`, decompress it and write the result to `writer`.
///
/// Nothing is written unless the whole stream decodes.  When `check_only`
/// is set, nothing is written at all.
pub fn decompress_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    formats: Formats,
    check_only: bool,
) -> Result<DecompressStats, IoError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    let stream = adapter::to_canonical(formats.input, &raw)?;

    let output = Decompressor::new().decompress_vec(&stream)?;
    if !check_only {
        writer.write_all(&adapter::from_canonical(formats.output, &output))?;
        writer.flush()?;
    }

    let stats = DecompressStats {
        input_size: stream.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    };
    debug!("decompress stats: {stats:?}");
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Compress the raw file at `input_path`, writing to `output_path`.
pub fn compress_file(input_path: &Path, output_path: &Path) -> Result<CompressStats, IoError> {
    compress_file_with(input_path, output_path, Formats::default())
}

/// Compress with explicit buffer representations on either side.
pub fn compress_file_with(
    input_path: &Path,
    output_path: &Path,
    formats: Formats,
) -> Result<CompressStats, IoError> {
    // Compress before creating the output, so a failure leaves no file.
    let raw = std::fs::read(input_path)?;
    let mut compressed = Vec::new();
    let stats = compress_stream(&mut raw.as_slice(), &mut compressed, formats, false)?;

    write_whole(output_path, &compressed)?;
    Ok(stats)
}

/// Decompress the raw file at `input_path`, writing to `output_path`.
pub fn decompress_file(input_path: &Path, output_path: &Path) -> Result<DecompressStats, IoError> {
    decompress_file_with(input_path, output_path, Formats::default())
}

/// Decompress with explicit buffer representations on either side.
pub fn decompress_file_with(
    input_path: &Path,
    output_path: &Path,
    formats: Formats,
) -> Result<DecompressStats, IoError> {
    let raw = std::fs::read(input_path)?;
    let mut output = Vec::new();
    let stats = decompress_stream(&mut raw.as_slice(), &mut output, formats, false)?;

    write_whole(output_path, &output)?;
    Ok(stats)
}

fn write_whole(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
    writer.write_all(data)?;
    writer.flush()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
