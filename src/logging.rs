use tracing_subscriber::EnvFilter;

/// The filter directive for a `-v` count: warnings by default, then info,
/// debug and trace.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "arbor=warn",
        1 => "arbor=info",
        2 => "arbor=debug",
        _ => "arbor=trace",
    }
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` takes precedence over the
/// verbosity flag. Calling this twice is harmless.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
