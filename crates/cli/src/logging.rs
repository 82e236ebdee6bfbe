use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `--quiet` limits output to errors,
/// each `-v` raises the level one step, and with neither the configured
/// `log_level` applies.
pub(crate) fn init(log_level: &str, verbose: u8, quiet: bool) {
    let directive = default_directive(log_level, verbose, quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_directive(log_level: &str, verbose: u8, quiet: bool) -> &str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => log_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
