//! Subscriber setup. Logs go to stderr so card output stays clean.

use tracing_subscriber::EnvFilter;
use wayfinder::LogFormat;
use wayfinder::config::LoggingSection;

/// Filter from `RUST_LOG`, falling back to the configured level.
fn filter(logging: &LoggingSection) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(logging: &LoggingSection) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(logging))
        .with_writer(std::io::stderr);
    let installed = match logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_ok() {
        tracing::debug!(
            target: "wayfinder.demo",
            level = %logging.level,
            format = ?logging.format,
            "logging initialized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back_to_info() {
        let logging = LoggingSection {
            level: "wayfinder=verbose".into(),
            format: LogFormat::Text,
        };
        // RUST_LOG may be set in CI; only the fallback path is asserted.
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(
                filter(&logging).max_level_hint(),
                Some(tracing_subscriber::filter::LevelFilter::INFO)
            );
        }
    }

    #[test]
    fn init_twice_does_not_panic() {
        let logging = LoggingSection::default();
        init(&logging);
        init(&logging);
    }
}
