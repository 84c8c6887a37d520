//! Log output for test runs.
//!
//! Filtering follows `RUST_LOG` and falls back to `info`. Output goes to
//! stderr so the CLI's report on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber at `info`
///
/// Returns `false` if a subscriber was already installed, which is the normal
/// case when several tests in one binary call this.
pub fn init(format: LogFormat) -> bool {
    init_with_level(format, "info")
}

/// Install the global subscriber with a fallback level used when `RUST_LOG`
/// is unset
pub fn init_with_level(format: LogFormat, default_level: &str) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Plain => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let _ = init(LogFormat::Plain);
        assert!(!init(LogFormat::Json));
    }

    #[test]
    fn test_default_format() {
        assert_eq!(LogFormat::default(), LogFormat::Plain);
    }
}
