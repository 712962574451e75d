//! Error types for pyro.
//!
//! None of these are fatal to the frame loop. The audio gateway and the mode
//! orchestrator log them and fall back to defaults; they surface as `Result`s
//! only on the construction/loading APIs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the audio output layer.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio subsystem or output device is available.
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    /// The device refused the stream configuration.
    #[error("failed to build audio stream: {0}")]
    StreamBuild(String),
    /// The stream was built but could not be started or resumed.
    #[error("failed to start audio stream: {0}")]
    StreamPlay(String),
    /// The device only offers a sample format the mixer cannot write.
    #[error("unsupported output sample format: {0}")]
    UnsupportedFormat(String),
}

/// A firework preset that breaks a catalog invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("damping {0} outside (0, 1]")]
    Damping(f32),
    #[error("size range ({min}, {max}) is inverted")]
    InvertedSizeRange { min: f32, max: f32 },
    #[error("age range ({min}, {max}) is inverted")]
    InvertedAgeRange { min: f32, max: f32 },
    #[error("shortest lifetime {0} must be positive")]
    NonPositiveAge(f32),
    #[error("palette is empty")]
    EmptyPalette,
    #[error("particle count is zero")]
    NoParticles,
}

/// Errors from the preference store.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Reading or writing the backing file failed.
    #[error("preference file {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The backing file exists but is not a valid preference table.
    #[error("corrupt preference file: {0}")]
    Decode(#[from] toml::de::Error),
    /// The in-memory table could not be serialized.
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Errors from loading or validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but violates an engine invariant.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
