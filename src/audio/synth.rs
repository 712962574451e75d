//! Offline synthesis of the five firework effects.
//!
//! Every effect is short, so it is rendered to a mono buffer up front and
//! handed to the mixer as a finished [`Clip`].

use crate::catalog::FireworkType;
use crate::spawn::SpawnRng;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Floor for exponential ramps, which cannot reach zero.
const SILENT: f32 = 0.001;

/// A rendered mono effect.
#[derive(Debug, Clone)]
pub struct Clip {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl Clip {
    fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds.
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Largest absolute sample.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    pub(crate) fn shared(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }
}

/// Render the effect for `kind`.
pub fn render(kind: FireworkType, sample_rate: u32, rng: &mut SpawnRng) -> Clip {
    let sr = sample_rate.max(1) as f32;
    let samples = match kind {
        FireworkType::Bloom => shimmer(sr),
        FireworkType::Spark => pop(sr, rng),
        FireworkType::Drift => whistle(sr),
        FireworkType::Scatter => crackle(sr, rng),
        FireworkType::Sparkler => fizzle(sr, rng),
    };
    Clip::new(samples, sample_rate.max(1))
}

/// Render `kind` as the voices it occupies: one clip per effect, except
/// Scatter, whose pops each take a voice of their own.
pub fn render_voices(kind: FireworkType, sample_rate: u32, rng: &mut SpawnRng) -> Vec<Clip> {
    let rate = sample_rate.max(1);
    match kind {
        FireworkType::Scatter => crackle_pops(rate as f32, rng)
            .into_iter()
            .map(|samples| Clip::new(samples, rate))
            .collect(),
        _ => vec![render(kind, sample_rate, rng)],
    }
}

fn sample_count(sr: f32, seconds: f32) -> usize {
    (sr * seconds).floor() as usize
}

/// Exponential glide from `from` to `to` over `[start, end]`, held outside it.
fn exp_ramp(t: f32, start: f32, end: f32, from: f32, to: f32) -> f32 {
    if t <= start {
        from
    } else if t >= end {
        to
    } else {
        from * (to / from).powf((t - start) / (end - start))
    }
}

fn lin_ramp(t: f32, start: f32, end: f32, from: f32, to: f32) -> f32 {
    if t <= start {
        from
    } else if t >= end {
        to
    } else {
        from + (to - from) * (t - start) / (end - start)
    }
}

fn noise(rng: &mut SpawnRng) -> f32 {
    rng.random() * 2.0 - 1.0
}

// Bloom: sine sweep 3 kHz -> 5 kHz with a 10 ms attack.
fn shimmer(sr: f32) -> Vec<f32> {
    let n = sample_count(sr, 0.35);
    let mut out = Vec::with_capacity(n);
    let mut phase = 0.0f32;
    for i in 0..n {
        let t = i as f32 / sr;
        let freq = exp_ramp(t, 0.0, 0.3, 3000.0, 5000.0);
        let gain = if t < 0.01 {
            lin_ramp(t, 0.0, 0.01, 0.0, 0.2)
        } else {
            exp_ramp(t, 0.01, 0.3, 0.2, SILENT)
        };
        out.push(phase.sin() * gain);
        phase = (phase + TAU * freq / sr).rem_euclid(TAU);
    }
    out
}

// Spark: decaying white-noise impulse.
fn pop(sr: f32, rng: &mut SpawnRng) -> Vec<f32> {
    let n = sample_count(sr, 0.1);
    let decay = sr * 0.02;
    (0..n)
        .map(|i| {
            let t = i as f32 / sr;
            let gain = exp_ramp(t, 0.0, 0.1, 0.4, SILENT);
            noise(rng) * (-(i as f32) / decay).exp() * gain
        })
        .collect()
}

// Drift: rising then falling whistle with a 6 Hz vibrato.
fn whistle(sr: f32) -> Vec<f32> {
    const VIBRATO_HZ: f32 = 6.0;
    const VIBRATO_DEPTH: f32 = 200.0;

    let n = sample_count(sr, 0.55);
    let mut out = Vec::with_capacity(n);
    let mut phase = 0.0f32;
    for i in 0..n {
        let t = i as f32 / sr;
        let base = if t < 0.2 {
            exp_ramp(t, 0.0, 0.2, 800.0, 1200.0)
        } else {
            exp_ramp(t, 0.2, 0.5, 1200.0, 600.0)
        };
        let freq = base + VIBRATO_DEPTH * (TAU * VIBRATO_HZ * t).sin();
        let gain = if t < 0.05 {
            lin_ramp(t, 0.0, 0.05, 0.0, 0.15)
        } else if t < 0.3 {
            0.15
        } else {
            exp_ramp(t, 0.3, 0.5, 0.15, SILENT)
        };
        out.push(phase.sin() * gain);
        phase = (phase + TAU * freq / sr).rem_euclid(TAU);
    }
    out
}

// Scatter: five square-wave pops at random onsets in the first 100 ms.
fn crackle(sr: f32, rng: &mut SpawnRng) -> Vec<f32> {
    let mut out = vec![0.0; sample_count(sr, 0.1 + POP_LENGTH)];
    for pop in crackle_pops(sr, rng) {
        for (slot, s) in out.iter_mut().zip(pop) {
            *slot += s;
        }
    }
    out
}

const POPS: usize = 5;
const POP_DECAY: f32 = 0.03;
const POP_LENGTH: f32 = 0.04;

/// The scatter pops as separate buffers, each led by silence up to its onset.
fn crackle_pops(sr: f32, rng: &mut SpawnRng) -> Vec<Vec<f32>> {
    (0..POPS)
        .map(|i| {
            let onset = rng.random() * 0.1;
            let freq = 200.0 + rng.random() * 400.0;
            let volume = (0.15 - i as f32 * 0.02).max(0.01);

            let mut pop = vec![0.0; sample_count(sr, onset)];
            pop.extend((0..sample_count(sr, POP_LENGTH)).map(|j| {
                let t = j as f32 / sr;
                let square = if (t * freq).fract() < 0.5 { 1.0 } else { -1.0 };
                square * exp_ramp(t, 0.0, POP_DECAY, volume, SILENT)
            }));
            pop
        })
        .collect()
}

// Sparkler: crackling noise through a 3 kHz band-pass.
fn fizzle(sr: f32, rng: &mut SpawnRng) -> Vec<f32> {
    const DURATION: f32 = 0.4;

    let n = sample_count(sr, DURATION);
    let mut filter = BandPass::new(3000.0, 1.0, sr);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let mut sample = noise(rng) * 0.3;
        if rng.random() < 0.005 {
            sample += (rng.random() - 0.5) * 1.5;
        }
        let fade = 1.0 - (i as f32 / n as f32) * 0.5;

        let t = i as f32 / sr;
        let gain = exp_ramp(t, 0.0, DURATION, 0.2, SILENT);
        out.push(filter.process(sample * fade) * gain);
    }
    out
}

/// RBJ band-pass biquad, 0 dB peak gain.
struct BandPass {
    b0: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BandPass {
    fn new(center_hz: f32, q: f32, sample_rate: f32) -> Self {
        let w0 = TAU * center_hz / sample_rate;
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;
        Self {
            b0: alpha / a0,
            b2: -alpha / a0,
            a1: -2.0 * w0.cos() / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44_100;

    #[test]
    fn test_clip_durations() {
        let mut rng = SpawnRng::with_seed(1);
        let expected = [
            (FireworkType::Bloom, 0.35),
            (FireworkType::Spark, 0.1),
            (FireworkType::Drift, 0.55),
            (FireworkType::Scatter, 0.14),
            (FireworkType::Sparkler, 0.4),
        ];
        for (kind, seconds) in expected {
            let clip = render(kind, SR, &mut rng);
            assert!(
                (clip.duration() - seconds).abs() < 0.001,
                "{} lasted {}",
                kind.name(),
                clip.duration()
            );
        }
    }

    #[test]
    fn test_clips_are_audible_and_bounded() {
        let mut rng = SpawnRng::with_seed(2);
        for kind in FireworkType::ALL {
            let clip = render(kind, SR, &mut rng);
            let peak = clip.peak();
            assert!(peak > 0.001, "{} is silent", kind.name());
            assert!(peak <= 1.0, "{} clips at {}", kind.name(), peak);
            assert!(clip.samples().iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_voices_per_effect() {
        let mut rng = SpawnRng::with_seed(5);
        for kind in FireworkType::ALL {
            let voices = render_voices(kind, SR, &mut rng);
            let expected = if kind == FireworkType::Scatter { POPS } else { 1 };
            assert_eq!(voices.len(), expected, "{}", kind.name());
        }

        for pop in render_voices(FireworkType::Scatter, SR, &mut rng) {
            assert!(pop.duration() >= POP_LENGTH - 0.001);
            assert!(pop.duration() <= 0.1 + POP_LENGTH + 0.001);
            assert!(pop.peak() > 0.001 && pop.peak() <= 0.15 + 1e-6);
        }
    }

    #[test]
    fn test_bloom_envelope() {
        let clip = render(FireworkType::Bloom, SR, &mut SpawnRng::with_seed(3));
        let samples = clip.samples();
        assert_eq!(samples[0], 0.0);
        // Tail after the sweep is near silent
        let tail = &samples[sample_count(SR as f32, 0.31)..];
        assert!(tail.iter().all(|s| s.abs() <= SILENT + 1e-6));
        assert!(clip.peak() <= 0.2 + 1e-6);
    }

    #[test]
    fn test_spark_decays() {
        let clip = render(FireworkType::Spark, SR, &mut SpawnRng::with_seed(4));
        let samples = clip.samples();
        let head = samples[..400].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = samples[samples.len() - 400..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(head > tail * 10.0);
    }

    #[test]
    fn test_ramps() {
        assert_eq!(exp_ramp(-1.0, 0.0, 1.0, 2.0, 8.0), 2.0);
        assert!((exp_ramp(0.5, 0.0, 1.0, 2.0, 8.0) - 4.0).abs() < 1e-5);
        assert_eq!(exp_ramp(2.0, 0.0, 1.0, 2.0, 8.0), 8.0);
        assert!((lin_ramp(0.25, 0.0, 1.0, 0.0, 4.0) - 1.0).abs() < 1e-6);
    }
}
