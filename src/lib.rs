//! # Pyro - firework particle engine
//!
//! CPU-side simulation for a firework display: a fixed-capacity particle pool,
//! five burst presets, synthesized effect sounds, a looping neon countdown,
//! and a mode coordinator that ties them to pointer and hand-gesture input.
//!
//! Rendering is left to the host. Everything the engine wants drawn goes
//! through the [`Scene`] trait, and the live particles are handed over each
//! frame as contiguous column slices.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pyro::prelude::*;
//!
//! let config = EngineConfig::default();
//! let prefs = MemoryPreferences::new();
//! let audio = EffectGateway::new(
//!     config.audio,
//!     Box::new(OfflineOutput::new(config.audio.sample_rate, config.audio.max_voices)),
//!     Box::new(prefs.clone()),
//! );
//! let mut mode = FireworkMode::new(&config, HeadlessScene::new(), audio, Box::new(prefs));
//!
//! mode.activate();
//! for _ in 0..600 {
//!     mode.update(1.0 / 60.0);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particle types
//!
//! [`FireworkType`] is a closed set of presets. Each has a [`TypeConfig`]
//! (gravity, damping, burst size, speed, size/age ranges, palette) and its
//! own velocity pattern:
//!
//! | Type | Pattern |
//! |------|---------|
//! | Bloom | even Fibonacci sphere |
//! | Spark | random sphere |
//! | Drift | mostly horizontal |
//! | Scatter | independent random axes |
//! | Sparkler | upward fountain |
//!
//! ### The pool
//!
//! [`ParticlePool`] stores particles column-wise with a fixed capacity.
//! `spawn` writes a whole burst or nothing; `update` integrates then removes
//! expired particles with swap-and-pop, so after every frame the first
//! `active_count` slots are exactly the live particles.
//!
//! ### The mode
//!
//! [`FireworkMode`] hides the tree scene, runs the countdown, auto-launches
//! bursts, and reacts to input. A closed fist pulls every particle toward the
//! hand; holding it fires a concentrated finale.
//!
//! ## Custom particle types
//!
//! The [`ParticleKind`] derive turns any unit enum into an indexable type id:
//!
//! ```ignore
//! #[derive(ParticleKind, Clone, Copy, PartialEq, Eq, Debug)]
//! enum Shell { Peony, Willow, Crossette }
//!
//! assert_eq!(Shell::count(), 3);
//! assert_eq!(u32::from(Shell::Willow), 1);
//! ```

pub mod audio;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod countdown;
pub mod error;
pub mod gesture;
pub mod input;
pub mod mode;
pub mod pool;
pub mod prefs;
pub mod scene;
pub mod schedule;
pub mod spawn;
pub mod time;

pub use bytemuck;
pub use glam::{Vec2, Vec3, Vec4};
pub use pyro_derive::ParticleKind;

pub use audio::{AudioConfig, AudioOutput, EffectGateway, OfflineOutput, UnavailableOutput};
pub use camera::Camera;
pub use catalog::{FireworkType, TypeConfig};
pub use config::EngineConfig;
pub use countdown::{CountdownConfig, CountdownEvent, CountdownPhase, CountdownTimer};
pub use error::{AudioError, CatalogError, ConfigError, PrefsError};
pub use gesture::{FingerStabilizer, GestureFrame};
pub use mode::{FireworkMode, ModeConfig, ModeState, ModeStats};
pub use pool::{Burst, ParticlePool, ParticleUniforms, ParticleView, PoolConfig, TensionField};
pub use prefs::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use scene::{BloomSettings, HeadlessScene, Scene, SceneGroup};
pub use schedule::DeferredQueue;
pub use spawn::SpawnRng;
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use pyro::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audio::{AudioConfig, AudioOutput, EffectGateway, OfflineOutput, UnavailableOutput};
    #[cfg(feature = "audio")]
    pub use crate::audio::CpalOutput;
    pub use crate::camera::Camera;
    pub use crate::catalog::{FireworkType, TypeConfig};
    pub use crate::config::EngineConfig;
    pub use crate::countdown::{CountdownEvent, CountdownTimer};
    pub use crate::gesture::{FingerStabilizer, GestureFrame};
    pub use crate::input::{Input, KeyCode};
    pub use crate::mode::FireworkMode;
    pub use crate::pool::{ParticlePool, ParticleUniforms, ParticleView, PoolConfig};
    pub use crate::prefs::{FilePreferences, MemoryPreferences, PreferenceStore};
    pub use crate::scene::{BloomSettings, HeadlessScene, Scene, SceneGroup};
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3, Vec4};
    pub use pyro_derive::ParticleKind;
}
