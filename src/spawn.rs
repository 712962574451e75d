//! Random sampling helpers for particle spawning.
//!
//! Wraps a fast non-cryptographic RNG with the handful of distributions the
//! velocity strategies and spawn-position policies need.

use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// Golden angle in radians, `π(3 − √5)`.
///
/// Successive multiples of this angle never line up, which is what spreads a
/// Fibonacci sphere evenly.
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Random source used when spawning particles.
///
/// ```ignore
/// let mut rng = SpawnRng::with_seed(7);
/// let dir = rng.random_on_sphere(1.0);
/// let speed = rng.random_range(0.8, 1.2);
/// ```
#[derive(Debug, Clone)]
pub struct SpawnRng {
    rng: SmallRng,
}

impl SpawnRng {
    /// Create a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Create a reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Random f32 in `[-half, half)`.
    #[inline]
    pub fn random_signed(&mut self, half: f32) -> f32 {
        (self.random() - 0.5) * 2.0 * half
    }

    /// Random index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    // ========== Direction helpers ==========

    /// Point on a sphere of the given radius from independent azimuth and
    /// polar angles.
    ///
    /// Not area-uniform (it bunches toward the poles), which is the look the
    /// spark burst wants.
    pub fn random_on_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let phi = self.rng.gen_range(0.0..PI);

        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        )
    }

    /// Random point inside an axis-aligned box given as `center ± half_extents`.
    pub fn random_in_box(&mut self, center: Vec3, half_extents: Vec3) -> Vec3 {
        Vec3::new(
            center.x + self.random_signed(half_extents.x),
            center.y + self.random_signed(half_extents.y),
            center.z + self.random_signed(half_extents.z),
        )
    }
}

impl Default for SpawnRng {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit direction for point `index` of a `total`-point Fibonacci sphere.
///
/// Walks `y` from 1 to -1 and rotates each ring by the golden angle. A
/// single-point sphere yields a horizontal direction instead of dividing by
/// zero.
pub fn fibonacci_direction(index: u32, total: u32) -> Vec3 {
    let y = if total > 1 {
        1.0 - (index as f32 / (total - 1) as f32) * 2.0
    } else {
        0.0
    };
    let radius_at_y = (1.0 - y * y).max(0.0).sqrt();
    let theta = GOLDEN_ANGLE * index as f32;

    Vec3::new(theta.cos() * radius_at_y, y, theta.sin() * radius_at_y)
}

/// Convert HSV to RGB.
///
/// * `h` - 0.0 to 1.0 (wraps: red → yellow → green → cyan → blue → magenta → red)
/// * `s` - 0.0 (gray) to 1.0 (vivid)
/// * `v` - 0.0 (black) to 1.0 (bright)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}
