use log::LevelFilter;

/// Initialize logging using env_logger.
/// `level` is the default; the RUST_LOG environment variable wins when set,
/// e.g. `RUST_LOG=sshdrive_core=debug sshdrive shell`.
/// Calling this more than once is harmless.
pub fn init_logging(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
