//! Voice mixing under a master gain with a concurrency cap.

use super::synth::Clip;
use std::sync::Arc;

#[derive(Debug)]
struct Voice {
    samples: Arc<[f32]>,
    cursor: usize,
}

impl Voice {
    fn remaining(&self) -> usize {
        self.samples.len().saturating_sub(self.cursor)
    }
}

/// Sums playing clips into mono output.
///
/// A voice holds a concurrency slot from [`add`](Self::add) until its last
/// sample has been rendered or skipped.
#[derive(Debug)]
pub struct VoiceMixer {
    voices: Vec<Voice>,
    max_voices: usize,
    gain: f32,
}

impl VoiceMixer {
    pub fn new(max_voices: usize, gain: f32) -> Self {
        Self {
            voices: Vec::with_capacity(max_voices),
            max_voices,
            gain,
        }
    }

    /// Start a clip. Returns `false` when every slot is taken.
    pub fn add(&mut self, clip: &Clip) -> bool {
        if self.voices.len() >= self.max_voices {
            return false;
        }
        self.voices.push(Voice {
            samples: clip.shared(),
            cursor: 0,
        });
        true
    }

    /// Overwrite `out` with the next `out.len()` mixed samples.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            let n = voice.remaining().min(out.len());
            let src = &voice.samples[voice.cursor..voice.cursor + n];
            for (dst, s) in out.iter_mut().zip(src) {
                *dst += s;
            }
            voice.cursor += n;
        }
        let gain = self.gain;
        for sample in out.iter_mut() {
            *sample = (*sample * gain).clamp(-1.0, 1.0);
        }
        self.release_finished();
    }

    /// Move every voice forward without producing output.
    pub fn skip(&mut self, frames: usize) {
        for voice in &mut self.voices {
            voice.cursor = (voice.cursor + frames).min(voice.samples.len());
        }
        self.release_finished();
    }

    fn release_finished(&mut self) {
        self.voices.retain(|voice| voice.remaining() > 0);
    }

    #[inline]
    pub fn active(&self) -> usize {
        self.voices.len()
    }

    #[inline]
    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    /// Drop every voice.
    pub fn stop_all(&mut self) {
        self.voices.clear();
    }
}
