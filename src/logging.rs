//! `tracing` subscriber setup for the `xtui` binary.
//!
//! The library only emits events; installing a subscriber is left to the
//! application. Filter with `XTUI_LOG=xtui=debug` to see every transition.

use tracing_subscriber::EnvFilter;

/// Target prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "xtui";

/// Builds the filter for `directive`, falling back to `info` when it does not
/// parse. `verbose` forces debug output for this crate.
pub fn build_filter(directive: &str, verbose: bool) -> EnvFilter {
    let mut filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    if verbose {
        if let Ok(d) = format!("{TARGET_PREFIX}=debug").parse() {
            filter = filter.add_directive(d);
        }
    }
    filter
}

/// Installs a global fmt subscriber writing to stderr.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(directive: &str, verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(directive, verbose))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
