//! Diagnostic logging for the CLI.

use tracing_subscriber::{EnvFilter, fmt};

/// Env var holding the log filter directives (e.g. `debug`, `globalize_core=trace`).
pub const LOG_ENV: &str = "GLOBALIZE_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs a stderr subscriber. Stdout is left to command output.
///
/// A second call keeps the subscriber already installed and prints a warning.
pub fn init() {
    if let Err(e) = fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("Warning: logging init failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        init();
        init();
        assert!(tracing::dispatcher::has_been_set());
    }
}
