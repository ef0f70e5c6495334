//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Filter directives for `level`, raising the client library to `debug`
/// when protocol debugging is on
pub fn filter_directives(level: &str, debug: bool) -> String {
    let level = level.to_lowercase();
    if debug {
        format!("{},peerlink=debug", level)
    } else {
        level
    }
}

/// Initialize tracing. `RUST_LOG` wins over the configured level.
pub fn init_tracing_with_level(level: &str, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level, debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .init();
}
