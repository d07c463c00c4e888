//! Diagnostic logging setup.
//!
//! Diagnostics go to standard error through `tracing`. User-facing progress and
//! results are printed separately by [`crate::output::OutputFormatter`].

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Maps the number of `-v` flags to a maximum level.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `verbosity`.
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "file_sorter={}",
            level_for_verbosity(verbosity).as_str().to_lowercase()
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
