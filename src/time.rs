//! Frame timing for the host loop.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! loop {
//!     let dt = clock.update();
//!     mode.update(dt);
//!     println!("{:.0} fps", clock.fps());
//! }
//! ```

use std::time::{Duration, Instant};

/// Longest delta handed to the simulation. A stalled frame (window drag,
/// debugger pause) resumes smoothly instead of catching up in one step.
pub const MAX_FRAME_DELTA: f32 = 0.1;

const FPS_SAMPLE_INTERVAL: f32 = 0.5;

/// Per-frame delta, elapsed time and FPS.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frames: u64,
    fps_window: f32,
    paused: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_window: 0.0,
            paused: false,
        }
    }

    /// Sample the wall clock. Call once per frame; returns the clamped delta.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(raw)
    }

    /// Advance by an explicit wall-clock step. Returns the clamped delta.
    pub fn advance(&mut self, raw: Duration) -> f32 {
        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let raw_secs = raw.as_secs_f32();
        self.delta_secs = raw_secs.min(MAX_FRAME_DELTA);
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        // FPS uses real time so it reflects stalls
        self.fps_frames += 1;
        self.fps_window += raw_secs;
        if self.fps_window >= FPS_SAMPLE_INTERVAL {
            self.fps = self.fps_frames as f32 / self.fps_window;
            self.fps_frames = 0;
            self.fps_window = 0.0;
        }

        self.delta_secs
    }

    /// Simulated seconds since start, excluding pauses.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Delta of the last frame.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last sampling window.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, every frame reports a zero delta.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_frame = Instant::now();
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_clock_update() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let dt = clock.update();
        assert!(dt > 0.0);
        assert!(dt <= MAX_FRAME_DELTA);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_delta_clamped() {
        let mut clock = FrameClock::new();
        let dt = clock.advance(Duration::from_secs(3));
        assert_eq!(dt, MAX_FRAME_DELTA);
        assert!((clock.elapsed() - MAX_FRAME_DELTA).abs() < 1e-6);
    }

    #[test]
    fn test_pause() {
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(16));
        let elapsed = clock.elapsed();

        clock.pause();
        assert_eq!(clock.advance(Duration::from_millis(16)), 0.0);
        assert_eq!(clock.elapsed(), elapsed);

        clock.toggle_pause();
        assert!(clock.advance(Duration::from_millis(16)) > 0.0);
    }

    #[test]
    fn test_fps_sampling() {
        let mut clock = FrameClock::new();
        for _ in 0..30 {
            clock.advance(Duration::from_micros(16_667));
        }
        assert!((clock.fps() - 60.0).abs() < 1.0);
    }
}
