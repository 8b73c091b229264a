use crate::config::LoggingConfig;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging based on configuration
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let file = match &config.file_path {
        Some(path) => Some(std::sync::Arc::new(
            std::fs::OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => None,
    };

    match (config.format.as_str(), file) {
        ("json", Some(file)) => registry
            .with(fmt::layer().json().with_target(true).with_writer(file))
            .try_init()?,
        ("json", None) => registry
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
        (_, Some(file)) => registry
            .with(fmt::layer().with_target(false).with_ansi(false).with_writer(file))
            .try_init()?,
        (_, None) => registry
            .with(fmt::layer().with_target(false).compact())
            .try_init()?,
    }

    Ok(())
}

/// Filter for a configured level. Accepts filter directives such as
/// `info,raspilive_ffmpeg=debug`; plain level names are the fallback.
pub fn level_filter(level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_new(level) {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::new(parse_log_level(level)?.to_string())),
    }
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(anyhow::anyhow!("Invalid log level: {level}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
        assert!(parse_log_level("error").is_ok());
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_level_filter_accepts_directives() {
        assert!(level_filter("info").is_ok());
        assert!(level_filter("WARN").is_ok());
        assert!(level_filter("raspilive_ffmpeg=debug").is_ok());
        assert!(level_filter("info,raspilive_stream=trace").is_ok());
        assert!(level_filter("raspilive_ffmpeg=loud").is_err());
    }
}
