//! Audio sinks.

use super::mixer::VoiceMixer;
use super::synth::Clip;
use crate::error::AudioError;

/// Where rendered effects go.
pub trait AudioOutput {
    /// Acquire the device. Returns the sample rate clips must be rendered at.
    fn open(&mut self) -> Result<u32, AudioError>;

    /// Restart a suspended stream.
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Start a clip. Returns `false` when no voice slot is free.
    fn play(&mut self, clip: &Clip) -> bool;

    /// Master gain in `[0, 1]`.
    fn set_gain(&mut self, gain: f32);

    /// Voices still sounding.
    fn active_voices(&self) -> usize;

    /// Let `dt` seconds of audio time pass. Device-clocked outputs ignore this.
    fn advance(&mut self, dt: f32);
}

/// In-process output clocked by the frame loop.
///
/// Mixes into a scratch buffer and keeps the peak of the last block so
/// callers can tell whether anything was audible.
#[derive(Debug)]
pub struct OfflineOutput {
    mixer: VoiceMixer,
    sample_rate: u32,
    scratch: Vec<f32>,
    last_peak: f32,
    opened: bool,
}

impl OfflineOutput {
    pub fn new(sample_rate: u32, max_voices: usize) -> Self {
        Self {
            mixer: VoiceMixer::new(max_voices, 0.0),
            sample_rate: sample_rate.max(1),
            scratch: Vec::new(),
            last_peak: 0.0,
            opened: false,
        }
    }

    /// Peak of the most recently mixed block.
    #[inline]
    pub fn last_peak(&self) -> f32 {
        self.last_peak
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn gain(&self) -> f32 {
        self.mixer.gain()
    }
}

impl AudioOutput for OfflineOutput {
    fn open(&mut self) -> Result<u32, AudioError> {
        self.opened = true;
        Ok(self.sample_rate)
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self, clip: &Clip) -> bool {
        self.mixer.add(clip)
    }

    fn set_gain(&mut self, gain: f32) {
        self.mixer.set_gain(gain);
    }

    fn active_voices(&self) -> usize {
        self.mixer.active()
    }

    fn advance(&mut self, dt: f32) {
        if dt <= 0.0 || self.mixer.active() == 0 {
            self.last_peak = 0.0;
            return;
        }
        let frames = (dt * self.sample_rate as f32).round() as usize;
        self.scratch.resize(frames, 0.0);
        self.mixer.render(&mut self.scratch);
        self.last_peak = self
            .scratch
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
    }
}

/// Output for hosts without sound. Never opens.
#[derive(Debug, Clone, Default)]
pub struct UnavailableOutput {
    reason: String,
}

impl UnavailableOutput {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioOutput for UnavailableOutput {
    fn open(&mut self) -> Result<u32, AudioError> {
        Err(AudioError::Unavailable(if self.reason.is_empty() {
            "no audio subsystem".to_owned()
        } else {
            self.reason.clone()
        }))
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Unavailable(self.reason.clone()))
    }

    fn play(&mut self, _clip: &Clip) -> bool {
        false
    }

    fn set_gain(&mut self, _gain: f32) {}

    fn active_voices(&self) -> usize {
        0
    }

    fn advance(&mut self, _dt: f32) {}
}
