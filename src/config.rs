//! Engine configuration.
//!
//! All sections are optional in the TOML file; anything left out keeps its
//! default.
//!
//! ```toml
//! preferences_path = "prefs.toml"
//!
//! [pool]
//! capacity = 2000
//!
//! [mode]
//! auto_spawn_interval = 1.0
//!
//! [audio]
//! volume = 0.5
//! ```

use crate::audio::AudioConfig;
use crate::camera::Camera;
use crate::catalog;
use crate::countdown::CountdownConfig;
use crate::error::ConfigError;
use crate::mode::ModeConfig;
use crate::pool::PoolConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything needed to build a [`FireworkMode`](crate::mode::FireworkMode).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pool: PoolConfig,
    pub countdown: CountdownConfig,
    pub audio: AudioConfig,
    pub mode: ModeConfig,
    pub camera: Camera,
    /// Where flags are persisted. In-memory only when unset.
    pub preferences_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let largest = catalog::largest_burst() as usize;
        if self.pool.capacity < largest {
            return Err(ConfigError::Invalid {
                field: "pool.capacity",
                reason: format!("{} cannot hold a {}-particle burst", self.pool.capacity, largest),
            });
        }
        if self.pool.max_bursts == 0 {
            return Err(invalid("pool.max_bursts", "must be at least 1"));
        }

        if self.countdown.start_value < 1 {
            return Err(ConfigError::Invalid {
                field: "countdown.start_value",
                reason: format!(
                    "must be at least 1 for the count to reach its finale, got {}",
                    self.countdown.start_value
                ),
            });
        }
        positive("countdown.tick_seconds", self.countdown.tick_seconds)?;
        positive("countdown.hue_speed", self.countdown.hue_speed)?;
        non_negative("countdown.finale_wait_seconds", self.countdown.finale_wait_seconds)?;

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(invalid("audio.volume", "must be within [0, 1]"));
        }
        if self.audio.max_voices == 0 {
            return Err(invalid("audio.max_voices", "must be at least 1"));
        }
        if self.audio.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", "must be positive"));
        }

        positive("mode.auto_spawn_interval", self.mode.auto_spawn_interval)?;
        positive("mode.fist_hold_threshold", self.mode.fist_hold_threshold)?;
        non_negative("mode.gesture_burst_stagger", self.mode.gesture_burst_stagger)?;
        non_negative("mode.finale_stagger", self.mode.finale_stagger)?;
        positive("mode.click_spawn_distance", self.mode.click_spawn_distance)?;

        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(invalid("camera.fov_degrees", "must be within (0, 180)"));
        }
        positive("camera.near", self.camera.near)?;
        if self.camera.far <= self.camera.near {
            return Err(invalid("camera.far", "must be beyond camera.near"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must not be negative, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pool.capacity, 2000);
        assert_eq!(config.pool.max_bursts, 20);
        assert_eq!(config.countdown.start_value, 10);
        assert_eq!(config.audio.max_voices, 10);
        assert_eq!(config.mode.auto_spawn_interval, 1.5);
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert!(config.preferences_path.is_none());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").expect("valid");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let text = r#"
            preferences_path = "prefs.toml"

            [pool]
            capacity = 500

            [mode]
            auto_spawn_interval = 0.75
        "#;
        let config = EngineConfig::from_toml_str(text).expect("valid");
        assert_eq!(config.pool.capacity, 500);
        assert_eq!(config.pool.max_bursts, 20);
        assert_eq!(config.mode.auto_spawn_interval, 0.75);
        assert_eq!(config.mode.gesture_burst_count, 8);
        assert_eq!(config.preferences_path, Some(PathBuf::from("prefs.toml")));
    }

    #[test]
    fn test_rejects_small_pool() {
        let err = EngineConfig::from_toml_str("[pool]\ncapacity = 100\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pool.capacity", .. }));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = EngineConfig::from_toml_str("[mode]\nauto_spawn_interval = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "mode.auto_spawn_interval",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_bursts() {
        let err = EngineConfig::from_toml_str("[pool]\nmax_bursts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pool.max_bursts", .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("[pool\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_non_positive_start_value() {
        for text in ["[countdown]\nstart_value = 0\n", "[countdown]\nstart_value = -3\n"] {
            let err = EngineConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { field: "countdown.start_value", .. }
            ));
        }
        let one = EngineConfig::from_toml_str("[countdown]\nstart_value = 1\n").expect("valid");
        assert_eq!(one.countdown.start_value, 1);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pyro.toml");
        std::fs::write(&path, "[countdown]\nstart_value = 5\n").expect("write");
        let config = EngineConfig::load(&path).expect("valid");
        assert_eq!(config.countdown.start_value, 5);

        let missing = EngineConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
