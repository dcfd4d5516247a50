//! Application configuration
//!
//! Layers, lowest precedence first: built-in defaults, the YAML file (if
//! present), then `POSTURE__SECTION__KEY` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use alerting::NotificationConfig;
use camera_capture::CameraConfig;
use posture::{DetectorConfig, PostureError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "POSTURE_CONFIG";

/// Prefix of override variables, e.g. `POSTURE__NOTIFICATION__INTERVAL=10`
pub const ENV_PREFIX: &str = "POSTURE";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error(transparent)]
    Detector(#[from] PostureError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Acquisition loop timing and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Failed reads in a row before the device is reopened
    pub max_consecutive_failures: u32,
    /// Pause after a failed read (ms)
    pub failure_backoff_ms: u64,
    /// Pause between closing and reopening the device (ms)
    pub reconnect_cooldown_ms: u64,
    /// Processed frames between diagnostic log lines
    pub diagnostics_every: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 5,
            failure_backoff_ms: 500,
            reconnect_cooldown_ms: 2000,
            diagnostics_every: 30,
        }
    }
}

impl AcquisitionConfig {
    pub fn failure_backoff(&self) -> Duration {
        Duration::from_millis(self.failure_backoff_ms)
    }

    pub fn reconnect_cooldown(&self) -> Duration {
        Duration::from_millis(self.reconnect_cooldown_ms)
    }
}

/// Debug window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub enable: bool,
    pub window_title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enable: false,
            window_title: "Posture Monitor".to_string(),
        }
    }
}

/// Root configuration, built once at startup and handed to each component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub camera: CameraConfig,
    pub notification: NotificationConfig,
    pub logging: LoggingConfig,
    pub acquisition: AcquisitionConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Load configuration from `path` layered over the defaults and under
    /// the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&AppConfig::default())?)
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Config file path: first CLI argument, then `POSTURE_CONFIG`, then the
    /// default location.
    pub fn resolve_path(cli_arg: Option<String>) -> PathBuf {
        cli_arg
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;

        if self.camera.fps == 0 {
            return Err(ConfigError::Invalid("camera.fps must be positive".into()));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Invalid(
                "camera.width and camera.height must be positive".into(),
            ));
        }
        if self.acquisition.max_consecutive_failures == 0 {
            return Err(ConfigError::Invalid(
                "acquisition.max_consecutive_failures must be positive".into(),
            ));
        }
        if self.acquisition.diagnostics_every == 0 {
            return Err(ConfigError::Invalid(
                "acquisition.diagnostics_every must be positive".into(),
            ));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown logging.level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "posture-monitor-{}-{}.yaml",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let config = AppConfig::load("does/not/exist.yaml").unwrap();
        assert_eq!(config.notification.interval_secs, 5);
        assert!(config.notification.enable);
        assert_eq!(config.camera.fps, 30);
        assert_eq!(config.acquisition.max_consecutive_failures, 5);
        assert_eq!(config.acquisition.diagnostics_every, 30);
        assert_eq!(config.detector.min_sit_distance, 0.05);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_temp(
            "override",
            "detector:\n  enable_side_view: true\n  hunchback_angle_threshold: 60.0\n\
             camera:\n  device_index: 2\n  brightness: 0.4\n\
             notification:\n  enable: false\n  interval: 30\n",
        );

        let config = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(config.detector.enable_side_view);
        assert_eq!(config.detector.hunchback_angle_threshold, 60.0);
        assert_eq!(config.camera.device_index, 2);
        assert_eq!(config.camera.brightness, Some(0.4));
        assert!(!config.notification.enable);
        assert_eq!(config.notification.interval_secs, 30);
        // Untouched keys keep their defaults
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.detector.min_neighbors, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let path = write_temp("invalid", "camera:\n  fps: 0\n");
        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_detector_errors_keep_their_type() {
        let path = write_temp("detector", "detector:\n  scale_factor: 0.9\n");
        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(ConfigError::Detector(PostureError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_resolve_path_prefers_cli() {
        assert_eq!(
            AppConfig::resolve_path(Some("custom.yaml".into())),
            PathBuf::from("custom.yaml")
        );
    }
}
