//! Configuration for the drowsiness monitor agent.

use crate::core::gate::FireMode;
use crate::core::monitor::{
    MonitorConfig, DEFAULT_EAR_THRESHOLD, DEFAULT_EYE_CLOSED_SECS, DEFAULT_MAR_THRESHOLD,
    DEFAULT_YAWN_SECS,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the monitor agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// EAR below this counts as eyes closed
    pub ear_threshold: f64,

    /// Sustained eye closure before a drowsiness alert
    #[serde(with = "duration_serde")]
    pub eye_closed_duration: Duration,

    /// MAR above this counts as mouth wide open
    pub mar_threshold: f64,

    /// Sustained mouth opening before a yawn alert
    #[serde(with = "duration_serde")]
    pub yawn_duration: Duration,

    /// Repeat alerts every frame while sustained, or once per episode
    pub fire_mode: FireMode,

    /// Path of the append-only alert log
    pub log_path: PathBuf,

    /// Path for storing state and session stats
    pub data_path: PathBuf,

    /// Whether monitoring is currently paused
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("drowsiness-monitor-agent");

        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            eye_closed_duration: Duration::from_secs(DEFAULT_EYE_CLOSED_SECS as u64),
            mar_threshold: DEFAULT_MAR_THRESHOLD,
            yawn_duration: Duration::from_secs(DEFAULT_YAWN_SECS as u64),
            fire_mode: FireMode::Repeating,
            log_path: data_dir.join(crate::alert::DEFAULT_LOG_FILENAME),
            data_path: data_dir,
            paused: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("drowsiness-monitor-agent")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }
        Ok(())
    }

    /// Derive the monitor's runtime configuration.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            ear_threshold: self.ear_threshold,
            eye_closed_duration: chrono::Duration::from_std(self.eye_closed_duration)
                .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_EYE_CLOSED_SECS)),
            mar_threshold: self.mar_threshold,
            yawn_duration: chrono::Duration::from_std(self.yawn_duration)
                .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_YAWN_SECS)),
            fire_mode: self.fire_mode,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!((config.ear_threshold - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.eye_closed_duration, Duration::from_secs(2));
        assert!((config.mar_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.yawn_duration, Duration::from_secs(2));
        assert_eq!(config.fire_mode, FireMode::Repeating);
        assert!(!config.paused);
    }

    #[test]
    fn test_config_json_round_trip() {
        let mut config = Config::default();
        config.ear_threshold = 0.22;
        config.fire_mode = FireMode::OneShot;
        config.paused = true;

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"one_shot\""));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert!((parsed.ear_threshold - 0.22).abs() < f64::EPSILON);
        assert_eq!(parsed.fire_mode, FireMode::OneShot);
        assert!(parsed.paused);
        assert_eq!(parsed.eye_closed_duration, Duration::from_secs(2));
    }

    #[test]
    fn test_monitor_config_conversion() {
        let config = Config::default();
        let monitor = config.monitor_config();
        assert_eq!(monitor.eye_closed_duration, chrono::Duration::seconds(2));
        assert_eq!(monitor.yawn_duration, chrono::Duration::seconds(2));
    }
}
