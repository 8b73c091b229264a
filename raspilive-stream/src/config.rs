use crate::camera::RaspividOptions;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use raspilive_ffmpeg::{MuxOptions, StreamFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output format, "hls" (default) or "dash"
    pub format: StreamFormat,
    pub server: ServerConfig,
    pub camera: RaspividOptions,
    pub muxer: MuxOptions,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory ffmpeg writes into and the file server serves from
    pub directory: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            directory: "camera".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if !Path::new(path).exists() {
                return Err(ConfigError::NotFound(path.to_string()));
            }
            builder = builder.add_source(File::with_name(path));
        }

        // RASPILIVE__SERVER__PORT=9000, RASPILIVE__MUXER__SEGMENT_TIME=2, ...
        builder = builder.add_source(
            Environment::with_prefix("RASPILIVE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Socket address the file server binds
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
