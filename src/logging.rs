//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directive.
pub const LOG_VAR: &str = "CASEBOOK_LOG";

/// Install a fmt subscriber writing through libtest's captured output.
///
/// The filter comes from `CASEBOOK_LOG` and defaults to `warn`. Calling this again,
/// or after another subscriber was installed, has no effect.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}
