use std::path::PathBuf;

use pocketbase_client::REST_LOG_TARGET;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for stderr output
    pub console_level: Level,
    /// Log level for file output
    pub file_level: Level,
    /// Directory where log files should be written
    pub log_dir: Option<PathBuf>,
    /// Whether to enable JSON formatted logs for structured output
    pub json_format: bool,
    /// Show REST request/response events regardless of the levels above
    pub rest_debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: Level::WARN,
            file_level: Level::DEBUG,
            log_dir: None,
            json_format: false,
            rest_debug: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("PBQ_LOG_LEVEL") {
            if let Ok(parsed_level) = level.parse::<Level>() {
                config.console_level = parsed_level;
                config.file_level = parsed_level;
            }
        }

        if let Ok(log_dir) = std::env::var("PBQ_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(log_dir));
        }

        if std::env::var("PBQ_NO_FILE_LOGS").is_ok() {
            config.log_dir = None;
        }

        if std::env::var("PBQ_JSON_LOGS").is_ok() {
            config.json_format = true;
        }

        config
    }

    /// Apply a level from the config file unless the environment already set one
    pub fn with_level_fallback(mut self, level: Option<&str>) -> Self {
        if std::env::var("PBQ_LOG_LEVEL").is_err() {
            if let Some(parsed) = level.and_then(|l| l.parse::<Level>().ok()) {
                self.console_level = parsed;
                self.file_level = parsed;
            }
        }
        self
    }

    pub fn with_rest_debug(mut self, enabled: bool) -> Self {
        self.rest_debug = enabled;
        self
    }

    fn filter(&self, level: Level) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();

        if self.rest_debug {
            Ok(filter.add_directive(format!("{REST_LOG_TARGET}=debug").parse()?))
        } else {
            Ok(filter)
        }
    }
}

/// Initialize the logging system with the given configuration.
///
/// Console output goes to stderr; stdout is reserved for command results.
pub fn init_logging(
    config: LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let mut layers = vec![];
    let mut guard = None;

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "pbq.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(config.filter(config.file_level)?)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(config.filter(config.file_level)?)
                .boxed()
        };

        layers.push(file_layer);
    }

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_filter(config.filter(config.console_level)?)
        .boxed();
    layers.push(console_layer);

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_log_warnings_to_console_only() {
        let config = LoggingConfig::default();
        assert_eq!(config.console_level, Level::WARN);
        assert!(config.log_dir.is_none());
        assert!(!config.json_format);
    }

    #[test]
    fn test_rest_debug_adds_target_directive() {
        let config = LoggingConfig::default();
        let quiet = config.filter(Level::WARN).unwrap().to_string().to_lowercase();
        assert!(!quiet.contains("pocketbase_client::rest=debug"));

        let config = config.with_rest_debug(true);
        let verbose = config.filter(Level::WARN).unwrap().to_string().to_lowercase();
        assert!(verbose.contains("pocketbase_client::rest=debug"));
    }

    #[test]
    fn test_level_fallback_parses_names() {
        let config = LoggingConfig::default().with_level_fallback(Some("not-a-level"));
        assert_eq!(config.console_level, Level::WARN);
    }
}
