// Idiomatic Rust CLI for Oxisnap.
//
// Explicit subcommands with long-form options.  Every command reads its
// whole input, runs the block codec and only then touches the output, so
// a failed decode never leaves a partial file behind.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use log::warn;

use crate::adapter::{self, BufferFormat};
use crate::compress::{MAX_INPUT_LEN, max_compressed_len};
use crate::format::{Header, Token, TokenIterator};
use crate::hash::config::{
    BLOCK_SIZE, HASH_MULT, INPUT_MARGIN, MAX_TABLE_BITS, MIN_TABLE_BITS, SKIP_START,
};
use crate::io::{CompressStats, DecompressStats, Formats, compress_stream, decompress_stream};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Snappy raw block compressor/decompressor.
#[derive(Parser, Debug)]
#[command(
    name = "oxisnap",
    version,
    about = "Snappy raw block compressor/decompressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress an input stream.
    Compress(CodecArgs),
    /// Decompress an input stream.
    Decompress(CodecArgs),
    /// Print the length header of a compressed stream.
    Header(PrintArgs),
    /// Print every element of a compressed stream.
    Tokens(PrintArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct CodecArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Representation of the input bytes (raw, hex, utf16le).
    #[arg(long = "input-format", default_value = "raw")]
    input_format: BufferFormat,

    /// Representation of the output bytes (raw, hex, utf16le).
    #[arg(long = "output-format", default_value = "raw")]
    output_format: BufferFormat,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// Compressed input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Representation of the input bytes (raw, hex, utf16le).
    #[arg(long = "input-format", default_value = "raw")]
    input_format: BufferFormat,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    PrintHeader,
    PrintTokens,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    no_output: bool,
    formats: Formats,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let base = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        no_output: false,
        formats: Formats::default(),
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Compress(args) => codec_options(Command::Compress, args, base),
        Cmd::Decompress(args) => codec_options(Command::Decompress, args, base),
        Cmd::Header(args) => Options {
            command: Command::PrintHeader,
            formats: Formats {
                input: args.input_format,
                output: BufferFormat::Raw,
            },
            input_file: args.input,
            ..base
        },
        Cmd::Tokens(args) => Options {
            command: Command::PrintTokens,
            formats: Formats {
                input: args.input_format,
                output: BufferFormat::Raw,
            },
            input_file: args.input,
            ..base
        },
        Cmd::Config => base,
    }
}

fn codec_options(command: Command, args: CodecArgs, base: Options) -> Options {
    Options {
        command,
        use_stdout: args.stdout,
        no_output: args.no_output,
        formats: Formats {
            input: args.input_format,
            output: args.output_format,
        },
        input_file: args.input.or(args.input_pos),
        output_file: args.output.or(args.output_pos),
        ..base
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxisnap".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Input / output helpers
// ---------------------------------------------------------------------------

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, i32> {
    match path {
        Some(path) => match File::open(path) {
            Ok(f) => Ok(Box::new(BufReader::with_capacity(BUF_SIZE, f))),
            Err(e) => {
                eprintln!("oxisnap: input file: {}: {e}", path.display());
                Err(1)
            }
        },
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, i32> {
    let mut reader = open_input(path)?;
    let mut data = Vec::new();
    if let Err(e) = reader.read_to_end(&mut data) {
        eprintln!("oxisnap: read error: {e}");
        return Err(1);
    }
    Ok(data)
}

/// Write `data` to the output file, or stdout when none is given.
fn write_output(opts: &Options, data: &[u8]) -> i32 {
    let result = match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => {
            let mut out = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
            out.write_all(data).and_then(|()| out.flush())
        }
        (false, Some(path)) => File::create(path).and_then(|f| {
            let mut out = BufWriter::with_capacity(BUF_SIZE, f);
            out.write_all(data)?;
            out.flush()
        }),
    };
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("oxisnap: write error: {e}");
            1
        }
    }
}

/// Refuse to clobber an existing output file without `--force`.
fn check_output_target(opts: &Options) -> Result<(), i32> {
    if opts.no_output || opts.use_stdout {
        return Ok(());
    }
    if let Some(path) = &opts.output_file
        && path.exists()
        && !opts.force
    {
        eprintln!(
            "oxisnap: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return Err(1);
    }
    Ok(())
}

fn hex_digest(digest: Option<[u8; 32]>) -> Option<String> {
    digest.map(|d| String::from_utf8_lossy(&adapter::from_canonical(BufferFormat::Hex, &d)).into_owned())
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxisnap version {version} (Rust), Copyright (C) oxisnap contributors");
    eprintln!("Licensed under the MIT License");

    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("BLOCK_SIZE={BLOCK_SIZE}");
    eprintln!("MIN_TABLE_BITS={MIN_TABLE_BITS}");
    eprintln!("MAX_TABLE_BITS={MAX_TABLE_BITS}");
    eprintln!("HASH_MULT=0x{HASH_MULT:08x}");
    eprintln!("INPUT_MARGIN={INPUT_MARGIN}");
    eprintln!("SKIP_START={SKIP_START}");
    eprintln!("MAX_INPUT_LEN={MAX_INPUT_LEN}");
    eprintln!("MAX_COMPRESSED_BLOCK={}", max_compressed_len(BLOCK_SIZE));
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options) -> i32 {
    if let Err(code) = check_output_target(opts) {
        return code;
    }
    let mut reader = match open_input(opts.input_file.as_deref()) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let mut compressed = Vec::new();
    let stats = match compress_stream(&mut reader, &mut compressed, opts.formats, opts.no_output) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxisnap: compress error: {e}");
            return 1;
        }
    };

    if !opts.no_output {
        let code = write_output(opts, &compressed);
        if code != 0 {
            return code;
        }
    }
    report_compress(opts, &stats);
    0
}

fn report_compress(opts: &Options, stats: &CompressStats) {
    if opts.no_output && !opts.quiet {
        eprintln!(
            "oxisnap: input size: {}, compressed size: {}",
            stats.input_size, stats.output_size
        );
    } else if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxisnap: compressor: input size: {}, output size: {}, fragments: {}",
            stats.input_size, stats.output_size, stats.fragments
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "compress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "fragments": stats.fragments,
            "input_sha256": hex_digest(stats.input_sha256),
        });
        eprintln!("{json:#}");
    }
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(opts: &Options) -> i32 {
    if let Err(code) = check_output_target(opts) {
        return code;
    }
    let mut reader = match open_input(opts.input_file.as_deref()) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let mut output = Vec::new();
    let stats = match decompress_stream(&mut reader, &mut output, opts.formats, opts.no_output) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxisnap: decompress error: {e}");
            return 1;
        }
    };

    if !opts.no_output {
        let code = write_output(opts, &output);
        if code != 0 {
            return code;
        }
    }
    report_decompress(opts, &stats);
    0
}

fn report_decompress(opts: &Options, stats: &DecompressStats) {
    if opts.no_output && !opts.quiet {
        eprintln!("oxisnap: stream ok, output size: {}", stats.output_size);
    } else if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxisnap: decompressor: input size: {}, output size: {}",
            stats.input_size, stats.output_size
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decompress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "output_sha256": hex_digest(stats.output_sha256),
        });
        eprintln!("{json:#}");
    }
}

// ---------------------------------------------------------------------------
// Print commands (header, tokens)
// ---------------------------------------------------------------------------

fn read_stream(opts: &Options) -> Result<Vec<u8>, i32> {
    let raw = read_input(opts.input_file.as_deref())?;
    adapter::to_canonical(opts.formats.input, &raw).map_err(|e| {
        eprintln!("oxisnap: {e}");
        1
    })
}

fn cmd_header(opts: &Options) -> i32 {
    let stream = match read_stream(opts) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let header = match Header::parse(&stream) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("oxisnap: invalid snappy header: {e}");
            return 1;
        }
    };

    let body_size = stream.len() - header.header_len;
    if opts.json_output {
        let json = serde_json::json!({
            "uncompressed_len": header.uncompressed_len,
            "header_len": header.header_len,
            "stream_len": stream.len(),
            "body_len": body_size,
        });
        println!("{json:#}");
        return 0;
    }

    println!("Snappy uncompressed length:   {}", header.uncompressed_len);
    println!("Snappy header size:           {}", header.header_len);
    println!("Snappy stream size:           {}", stream.len());
    println!("Snappy body size:             {body_size}");
    if header.uncompressed_len > 0 && !stream.is_empty() {
        let ratio = stream.len() as f64 / header.uncompressed_len as f64;
        println!("Snappy ratio:                 {ratio:.3}");
    }
    0
}

fn cmd_tokens(opts: &Options) -> i32 {
    let stream = match read_stream(opts) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let header = match Header::parse(&stream) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("oxisnap: invalid snappy header: {e}");
            return 1;
        }
    };

    println!("Snappy uncompressed length:   {}", header.uncompressed_len);
    println!("  Offset  Output  Element");

    let mut tokens = TokenIterator::new(&stream[header.header_len..]);
    let (mut literals, mut copies) = (0u64, 0u64);
    loop {
        let pos = header.header_len + tokens.position();
        let produced = tokens.produced();
        match tokens.next() {
            None => break,
            Some(Ok(Token::Literal(bytes))) => {
                literals += 1;
                println!("{pos:>8} {produced:>7}  LITERAL len={}", bytes.len());
            }
            Some(Ok(Token::Copy { offset, len })) => {
                copies += 1;
                println!("{pos:>8} {produced:>7}  COPY    len={len} offset={offset}");
            }
            Some(Err(e)) => {
                eprintln!("oxisnap: element at byte {pos}: {e}");
                return 1;
            }
        }
    }

    let produced = tokens.produced();
    println!("Literals: {literals}, copies: {copies}, output: {produced}");
    if produced != header.uncompressed_len {
        eprintln!(
            "oxisnap: stream produces {produced} bytes but header declares {}",
            header.uncompressed_len
        );
        return 1;
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn default_log_filter(opts: &Options) -> &'static str {
    match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        _ => "trace",
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && let Some(path) = opts.output_file.take()
        && !opts.quiet
    {
        warn!("-c option overrides output filename: {}", path.display());
    }

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::PrintHeader => cmd_header(&opts),
        Command::PrintTokens => cmd_tokens(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
