//! Sound effects for firework bursts.
//!
//! [`EffectGateway`] is the only entry point the rest of the engine uses. It
//! owns an [`AudioOutput`], renders a clip per burst, and enforces the voice
//! cap and the persisted mute flag. Every failure degrades to silence.
//!
//! ```ignore
//! let mut audio = EffectGateway::new(
//!     AudioConfig::default(),
//!     Box::new(OfflineOutput::new(44_100, 10)),
//!     Box::new(MemoryPreferences::new()),
//! );
//! audio.init();                    // from a click or key handler
//! audio.play(FireworkType::Bloom);
//! ```

pub mod mixer;
pub mod output;
pub mod synth;

#[cfg(feature = "audio")]
pub mod cpal_output;

#[cfg(feature = "audio")]
pub use cpal_output::CpalOutput;
pub use mixer::VoiceMixer;
pub use output::{AudioOutput, OfflineOutput, UnavailableOutput};
pub use synth::Clip;

use crate::catalog::FireworkType;
use crate::prefs::{self, PreferenceStore};
use crate::spawn::SpawnRng;
use serde::{Deserialize, Serialize};

/// Preference key of the mute flag.
pub const MUTE_KEY: &str = "fireworkAudioMuted";

/// Effect output settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume when not muted.
    pub volume: f32,
    /// Voices allowed to sound at once.
    pub max_voices: usize,
    /// Rate used by outputs that do not dictate their own.
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.3,
            max_voices: 10,
            sample_rate: 44_100,
        }
    }
}

/// Rate- and mute-aware effect trigger.
pub struct EffectGateway {
    output: Box<dyn AudioOutput>,
    prefs: Box<dyn PreferenceStore>,
    config: AudioConfig,
    volume: f32,
    muted: bool,
    initialized: bool,
    sample_rate: u32,
    rng: SpawnRng,
}

impl EffectGateway {
    /// Build the gateway and read the saved mute flag. No device is opened yet.
    pub fn new(
        config: AudioConfig,
        output: Box<dyn AudioOutput>,
        prefs: Box<dyn PreferenceStore>,
    ) -> Self {
        let muted = prefs::load_or_default(prefs.as_ref(), MUTE_KEY);
        Self {
            output,
            prefs,
            volume: config.volume.clamp(0.0, 1.0),
            sample_rate: config.sample_rate,
            config,
            muted,
            initialized: false,
            rng: SpawnRng::new(),
        }
    }

    /// A gateway that never makes a sound, for hosts without audio.
    pub fn silent(prefs: Box<dyn PreferenceStore>) -> Self {
        Self::new(
            AudioConfig::default(),
            Box::new(UnavailableOutput::new("audio disabled")),
            prefs,
        )
    }

    /// Open the output. Call from a user interaction.
    ///
    /// Safe to call repeatedly; returns whether audio is usable.
    pub fn init(&mut self) -> bool {
        if self.initialized {
            return true;
        }
        match self.output.open() {
            Ok(rate) => {
                self.sample_rate = rate;
                self.initialized = true;
                self.apply_gain();
                log::info!("firework audio ready at {} Hz", rate);
                true
            }
            Err(err) => {
                log::warn!("firework audio disabled: {err}");
                false
            }
        }
    }

    /// Restart a suspended stream.
    pub fn resume(&mut self) {
        if !self.initialized {
            return;
        }
        if let Err(err) = self.output.resume() {
            log::warn!("audio resume failed: {err}");
        }
    }

    /// Play the effect for `kind`. Returns whether a voice was started.
    ///
    /// The cap is checked once per effect. Scatter then takes one voice per
    /// pop, as far as the output has room.
    pub fn play(&mut self, kind: FireworkType) -> bool {
        if !self.initialized || self.muted {
            return false;
        }
        if self.output.active_voices() >= self.config.max_voices {
            log::trace!("voice cap reached, dropping {} effect", kind.name());
            return false;
        }
        let mut started = false;
        for clip in synth::render_voices(kind, self.sample_rate, &mut self.rng) {
            started |= self.output.play(&clip);
        }
        started
    }

    /// Let `dt` seconds of audio time pass.
    pub fn update(&mut self, dt: f32) {
        if self.initialized {
            self.output.advance(dt);
        }
    }

    /// Silence output and persist the flag. Returns the new muted state.
    pub fn mute(&mut self) -> bool {
        self.set_muted(true)
    }

    /// Restore the volume and persist the flag. Returns the new muted state.
    pub fn unmute(&mut self) -> bool {
        self.set_muted(false)
    }

    /// Flip the mute flag and return the new state.
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted)
    }

    fn set_muted(&mut self, muted: bool) -> bool {
        self.muted = muted;
        self.apply_gain();
        prefs::store_or_warn(self.prefs.as_mut(), MUTE_KEY, muted);
        self.muted
    }

    #[inline]
    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Set the unmuted volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_gain();
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn active_voices(&self) -> usize {
        self.output.active_voices()
    }

    fn apply_gain(&mut self) {
        if self.initialized {
            let gain = if self.muted { 0.0 } else { self.volume };
            self.output.set_gain(gain);
        }
    }
}

impl std::fmt::Debug for EffectGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectGateway")
            .field("initialized", &self.initialized)
            .field("muted", &self.muted)
            .field("volume", &self.volume)
            .field("sample_rate", &self.sample_rate)
            .field("active_voices", &self.output.active_voices())
            .finish()
    }
}
