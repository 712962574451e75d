//! Firework type catalog.
//!
//! Static physics/visual presets for each [`FireworkType`] plus the per-type
//! velocity strategies used when a burst is spawned.
//!
//! | Type | Particles | Velocity shape |
//! |------|-----------|----------------|
//! | [`FireworkType::Bloom`] | 150 | Fibonacci sphere, even coverage |
//! | [`FireworkType::Spark`] | 200 | Random sphere, fast |
//! | [`FireworkType::Drift`] | 100 | Horizontal ring, slight lift |
//! | [`FireworkType::Scatter`] | 180 | Independent per-axis chaos |
//! | [`FireworkType::Sparkler`] | 80 | Upward fizz, narrow spread |
//!
//! Physics values are per-frame: gravity is added to `velocity.y` once per
//! update and damping multiplies every axis once per update.

use crate::error::CatalogError;
use crate::spawn::{fibonacci_direction, SpawnRng};
use crate::Vec3;
use pyro_derive::ParticleKind;
use std::f32::consts::TAU;

/// Firework particle class.
#[derive(ParticleKind, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireworkType {
    /// Gold peony with an even spherical shell.
    Bloom,
    /// Fast white crackle.
    Spark,
    /// Slow cyan float that spreads sideways.
    Drift,
    /// Chaotic magenta/violet spray.
    Scatter,
    /// Short-lived warm fizz that rises.
    Sparkler,
}

/// Physics and visual preset for one firework type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeConfig {
    /// Added to `velocity.y` every update (negative pulls down).
    pub gravity: f32,
    /// Per-axis velocity multiplier every update, in `(0, 1]`.
    pub damping: f32,
    /// Particles written by one burst.
    pub particle_count: u32,
    /// Base launch speed.
    pub speed: f32,
    /// Point size range `(min, max)`.
    pub size_range: (f32, f32),
    /// Lifetime range in seconds `(min, max)`.
    pub age_range: (f32, f32),
    /// Colors a particle may be drawn with.
    pub palette: &'static [Vec3],
}

impl TypeConfig {
    /// Check the preset invariants, returning the first violation.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(CatalogError::Damping(self.damping));
        }
        let (min, max) = self.size_range;
        if min > max {
            return Err(CatalogError::InvertedSizeRange { min, max });
        }
        let (min, max) = self.age_range;
        if min > max {
            return Err(CatalogError::InvertedAgeRange { min, max });
        }
        if min <= 0.0 {
            return Err(CatalogError::NonPositiveAge(min));
        }
        if self.palette.is_empty() {
            return Err(CatalogError::EmptyPalette);
        }
        if self.particle_count == 0 {
            return Err(CatalogError::NoParticles);
        }
        Ok(())
    }
}

const BLOOM_PALETTE: [Vec3; 3] = [
    Vec3::new(1.0, 0.84, 0.0), // Gold
    Vec3::new(1.0, 0.9, 0.4),  // Light gold
    Vec3::new(1.0, 0.7, 0.0),  // Orange gold
];

const SPARK_PALETTE: [Vec3; 3] = [
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.9, 0.95, 1.0),
    Vec3::new(1.0, 0.98, 0.9),
];

const DRIFT_PALETTE: [Vec3; 3] = [
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(0.4, 0.9, 1.0),
    Vec3::new(0.0, 0.8, 0.9),
];

const SCATTER_PALETTE: [Vec3; 4] = [
    Vec3::new(1.0, 0.0, 0.5), // Magenta
    Vec3::new(0.8, 0.0, 1.0), // Purple
    Vec3::new(1.0, 0.2, 0.6), // Pink
    Vec3::new(0.6, 0.0, 0.8), // Violet
];

const SPARKLER_PALETTE: [Vec3; 3] = [
    Vec3::new(1.0, 0.9, 0.6),
    Vec3::new(1.0, 0.95, 0.8),
    Vec3::new(1.0, 0.85, 0.5),
];

/// Preset table indexed by [`FireworkType::index`].
static TYPE_CONFIGS: [TypeConfig; 5] = [
    TypeConfig {
        gravity: -0.004,
        damping: 0.98,
        particle_count: 150,
        speed: 0.08,
        size_range: (4.0, 8.0),
        age_range: (1.5, 2.5),
        palette: &BLOOM_PALETTE,
    },
    TypeConfig {
        gravity: -0.002,
        damping: 0.95,
        particle_count: 200,
        speed: 0.15,
        size_range: (2.0, 5.0),
        age_range: (0.8, 1.5),
        palette: &SPARK_PALETTE,
    },
    TypeConfig {
        gravity: -0.001,
        damping: 0.99,
        particle_count: 100,
        speed: 0.05,
        size_range: (3.0, 6.0),
        age_range: (2.0, 3.5),
        palette: &DRIFT_PALETTE,
    },
    TypeConfig {
        gravity: -0.003,
        damping: 0.96,
        particle_count: 180,
        speed: 0.12,
        size_range: (2.0, 6.0),
        age_range: (1.0, 2.0),
        palette: &SCATTER_PALETTE,
    },
    TypeConfig {
        gravity: -0.0005,
        damping: 0.995,
        particle_count: 80,
        speed: 0.02,
        size_range: (2.0, 4.0),
        age_range: (0.3, 0.8),
        palette: &SPARKLER_PALETTE,
    },
];

/// Preset for a firework type.
#[inline]
pub fn config_for(kind: FireworkType) -> &'static TypeConfig {
    &TYPE_CONFIGS[kind.index()]
}

/// Preset for a raw type id as stored in the pool's type column.
#[inline]
pub(crate) fn config_for_id(id: u32) -> &'static TypeConfig {
    TYPE_CONFIGS
        .get(id as usize)
        .unwrap_or(&TYPE_CONFIGS[0])
}

/// Largest `particle_count` across all presets.
pub fn largest_burst() -> u32 {
    TYPE_CONFIGS
        .iter()
        .map(|c| c.particle_count)
        .max()
        .unwrap_or(0)
}

/// Uniformly random firework type.
pub fn random_type(rng: &mut SpawnRng) -> FireworkType {
    FireworkType::ALL[rng.random_index(FireworkType::ALL.len())]
}

/// Launch velocity for particle `index` of a `total`-particle burst.
pub fn velocity_for(
    kind: FireworkType,
    index: u32,
    total: u32,
    speed: f32,
    rng: &mut SpawnRng,
) -> Vec3 {
    match kind {
        FireworkType::Bloom => bloom_velocity(index, total, speed, rng),
        FireworkType::Spark => spark_velocity(speed, rng),
        FireworkType::Drift => drift_velocity(speed, rng),
        FireworkType::Scatter => scatter_velocity(speed, rng),
        FireworkType::Sparkler => sparkler_velocity(speed, rng),
    }
}

/// Random color from the type's palette.
pub fn color_for(kind: FireworkType, rng: &mut SpawnRng) -> Vec3 {
    let palette = config_for(kind).palette;
    palette[rng.random_index(palette.len())]
}

/// Random point size within the type's range.
pub fn size_for(kind: FireworkType, rng: &mut SpawnRng) -> f32 {
    let (min, max) = config_for(kind).size_range;
    rng.random_range(min, max)
}

/// Random lifetime within the type's range.
pub fn max_age_for(kind: FireworkType, rng: &mut SpawnRng) -> f32 {
    let (min, max) = config_for(kind).age_range;
    rng.random_range(min, max)
}

// Full width of the per-axis jitter added to Bloom directions.
const BLOOM_JITTER: f32 = 0.1;

fn bloom_velocity(index: u32, total: u32, speed: f32, rng: &mut SpawnRng) -> Vec3 {
    let dir = fibonacci_direction(index, total);
    let speed = speed * rng.random_range(0.8, 1.2);

    Vec3::new(
        dir.x + (rng.random() - 0.5) * BLOOM_JITTER,
        dir.y + (rng.random() - 0.5) * BLOOM_JITTER,
        dir.z + (rng.random() - 0.5) * BLOOM_JITTER,
    ) * speed
}

fn spark_velocity(speed: f32, rng: &mut SpawnRng) -> Vec3 {
    let speed = speed * rng.random_range(0.7, 1.3);
    rng.random_on_sphere(speed)
}

fn drift_velocity(speed: f32, rng: &mut SpawnRng) -> Vec3 {
    let angle = rng.random_range(0.0, TAU);
    let horizontal = speed * rng.random_range(0.8, 1.2);
    let vertical = speed * rng.random_range(0.2, 0.5);

    Vec3::new(
        angle.cos() * horizontal,
        // [-0.3, 0.7) skews upward
        (rng.random() - 0.3) * vertical,
        angle.sin() * horizontal,
    )
}

fn scatter_velocity(speed: f32, rng: &mut SpawnRng) -> Vec3 {
    let speed = speed * rng.random_range(0.5, 1.5);

    Vec3::new(
        rng.random_signed(1.0) * speed,
        rng.random_signed(1.0) * speed,
        rng.random_signed(1.0) * speed,
    )
}

fn sparkler_velocity(speed: f32, rng: &mut SpawnRng) -> Vec3 {
    let angle = rng.random_range(0.0, TAU);
    let spread = rng.random() * speed;

    Vec3::new(
        angle.cos() * spread,
        speed * rng.random_range(0.5, 1.0),
        angle.sin() * spread,
    )
}
