fn main() {
    #[cfg(feature = "cli")]
    oxisnap::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxisnap: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
