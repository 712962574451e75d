//! Fixed-capacity firework particle pool.
//!
//! Particles are stored column-wise (one array per attribute) so the renderer
//! can upload each attribute as a contiguous slice. Only the first
//! `active_count` slots are alive; dead particles are removed by swapping the
//! last live slot into their place, so removal is O(1) and never allocates.
//!
//! # Frame order
//!
//! [`ParticlePool::update`] integrates every live particle first and culls
//! expired ones afterwards. When it returns, `[0, active_count)` holds only
//! particles with `age < max_age`.
//!
//! ```ignore
//! let mut pool = ParticlePool::new(PoolConfig::default());
//! pool.spawn(Vec3::new(0.0, 10.0, 0.0), Some(FireworkType::Bloom));
//! pool.update(1.0 / 60.0);
//! renderer.upload(pool.view().positions_flat());
//! ```

use crate::catalog::{self, config_for_id, FireworkType};
use crate::spawn::SpawnRng;
use crate::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default particle capacity.
pub const MAX_PARTICLES: usize = 2000;
/// Default number of burst records kept.
pub const MAX_BURSTS: usize = 20;
/// Room [`ParticlePool::can_spawn_default`] asks for.
pub const DEFAULT_SPAWN_ROOM: usize = 150;

/// Fraction of the remaining displacement a fully compressed field pulls per update.
const TENSION_PULL: f32 = 0.15;
/// Extra velocity damping at full compression.
const TENSION_DAMPING: f32 = 0.1;

/// Pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Total particle slots, allocated once.
    pub capacity: usize,
    /// Burst records kept before the oldest is evicted.
    pub max_bursts: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_PARTICLES,
            max_bursts: MAX_BURSTS,
        }
    }
}

/// Bookkeeping for one successful [`ParticlePool::spawn`].
///
/// Indices go stale as soon as culling reorders the pool; records are for
/// diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    /// First slot written.
    pub start_index: usize,
    /// Particles written.
    pub count: usize,
    /// Type spawned.
    pub kind: FireworkType,
    /// Pool clock at spawn, in seconds.
    pub spawn_time: f32,
}

/// Uniform attractor applied to every live particle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TensionField {
    /// Point particles are pulled toward. `None` disables the field.
    pub center: Option<Vec3>,
    /// Pull strength in `[0, 1]`.
    pub compression: f32,
}

impl TensionField {
    /// Whether the field affects integration at all.
    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.center.is_some() && self.compression > 0.0
    }
}

/// Per-frame values the particle shader needs besides the columns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticleUniforms {
    /// Pool clock in seconds.
    pub time: f32,
    /// Current compression, used as a glow boost.
    pub tension_intensity: f32,
}

/// Read-only view of the live particle columns.
///
/// Every slice has exactly `len()` entries.
#[derive(Debug, Clone, Copy)]
pub struct ParticleView<'a> {
    /// Positions.
    pub positions: &'a [Vec3],
    /// Velocities.
    pub velocities: &'a [Vec3],
    /// RGB colors.
    pub colors: &'a [Vec3],
    /// Point sizes.
    pub sizes: &'a [f32],
    /// Seconds since spawn.
    pub ages: &'a [f32],
    /// Lifetimes.
    pub max_ages: &'a [f32],
    /// [`FireworkType`] ids.
    pub kinds: &'a [u32],
}

impl<'a> ParticleView<'a> {
    /// Live particle count.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no particle is alive.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions as `x, y, z, x, y, z, ...`.
    pub fn positions_flat(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.positions)
    }

    /// Velocities as `x, y, z, ...`.
    pub fn velocities_flat(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.velocities)
    }

    /// Colors as `r, g, b, ...`.
    pub fn colors_flat(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.colors)
    }

    /// Raw bytes of the position column, ready for a vertex buffer.
    pub fn position_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }
}

/// Fixed-capacity struct-of-arrays particle store.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
    ages: Vec<f32>,
    max_ages: Vec<f32>,
    kinds: Vec<u32>,

    active_count: usize,
    capacity: usize,

    bursts: VecDeque<Burst>,
    max_bursts: usize,
    total_bursts: u64,

    tension: TensionField,
    clock: f32,
    rng: SpawnRng,
}

impl ParticlePool {
    /// Allocate every column at full capacity.
    pub fn new(config: PoolConfig) -> Self {
        Self::with_rng(config, SpawnRng::new())
    }

    /// Allocate with a reproducible random source.
    pub fn with_seed(config: PoolConfig, seed: u64) -> Self {
        Self::with_rng(config, SpawnRng::with_seed(seed))
    }

    fn with_rng(config: PoolConfig, rng: SpawnRng) -> Self {
        let capacity = config.capacity;
        let max_bursts = config.max_bursts.max(1);
        Self {
            positions: vec![Vec3::ZERO; capacity],
            velocities: vec![Vec3::ZERO; capacity],
            colors: vec![Vec3::ZERO; capacity],
            sizes: vec![0.0; capacity],
            ages: vec![0.0; capacity],
            max_ages: vec![0.0; capacity],
            kinds: vec![0; capacity],
            active_count: 0,
            capacity,
            bursts: VecDeque::with_capacity(max_bursts + 1),
            max_bursts,
            total_bursts: 0,
            tension: TensionField::default(),
            clock: 0.0,
            rng,
        }
    }

    /// Write one burst of `kind` (random when `None`) at `origin`.
    ///
    /// Returns `false` without touching any column if the burst does not fit.
    pub fn spawn(&mut self, origin: Vec3, kind: Option<FireworkType>) -> bool {
        let kind = match kind {
            Some(kind) => kind,
            None => catalog::random_type(&mut self.rng),
        };
        let config = catalog::config_for(kind);
        let count = config.particle_count as usize;

        if !self.can_spawn(count) {
            log::debug!(
                "burst of {} {} rejected: {}/{} slots in use",
                count,
                kind.name(),
                self.active_count,
                self.capacity
            );
            return false;
        }

        let start = self.active_count;
        let id = u32::from(kind);
        for i in 0..count {
            let idx = start + i;
            self.positions[idx] = origin;
            self.velocities[idx] = catalog::velocity_for(
                kind,
                i as u32,
                config.particle_count,
                config.speed,
                &mut self.rng,
            );
            self.colors[idx] = catalog::color_for(kind, &mut self.rng);
            self.sizes[idx] = catalog::size_for(kind, &mut self.rng);
            self.ages[idx] = 0.0;
            self.max_ages[idx] = catalog::max_age_for(kind, &mut self.rng);
            self.kinds[idx] = id;
        }
        self.active_count += count;

        self.bursts.push_back(Burst {
            start_index: start,
            count,
            kind,
            spawn_time: self.clock,
        });
        if self.bursts.len() > self.max_bursts {
            self.bursts.pop_front();
        }
        self.total_bursts += 1;

        true
    }

    /// Integrate every live particle by one frame, then cull the expired.
    pub fn update(&mut self, dt: f32) {
        self.clock += dt;
        if self.active_count == 0 {
            return;
        }

        let tension = self.tension;
        let center = tension.center.unwrap_or(Vec3::ZERO);
        let engaged = tension.is_engaged();
        let pull = tension.compression * TENSION_PULL;
        let tension_damping = 1.0 - tension.compression * TENSION_DAMPING;

        for i in 0..self.active_count {
            let config = config_for_id(self.kinds[i]);

            let mut velocity = self.velocities[i];
            velocity.y += config.gravity;
            velocity *= config.damping;

            let mut position = self.positions[i] + velocity;

            if engaged {
                position += (center - position) * pull;
                velocity *= tension_damping;
            }

            self.positions[i] = position;
            self.velocities[i] = velocity;
            self.ages[i] += dt;
        }

        self.cull_expired();
    }

    /// Swap-and-pop every particle with `age >= max_age`.
    ///
    /// Returns how many particles were removed. A slot that receives a
    /// swapped-in particle is re-examined before the cursor advances.
    pub fn cull_expired(&mut self) -> usize {
        let before = self.active_count;
        let mut i = 0;
        while i < self.active_count {
            if self.ages[i] >= self.max_ages[i] {
                let last = self.active_count - 1;
                if i != last {
                    self.swap_slots(i, last);
                }
                self.active_count -= 1;
            } else {
                i += 1;
            }
        }
        before - self.active_count
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.positions.swap(a, b);
        self.velocities.swap(a, b);
        self.colors.swap(a, b);
        self.sizes.swap(a, b);
        self.ages.swap(a, b);
        self.max_ages.swap(a, b);
        self.kinds.swap(a, b);
    }

    /// Whether `count` more particles fit.
    #[inline]
    pub fn can_spawn(&self, count: usize) -> bool {
        self.active_count + count <= self.capacity
    }

    /// [`can_spawn`](Self::can_spawn) with the default room of 150 particles.
    #[inline]
    pub fn can_spawn_default(&self) -> bool {
        self.can_spawn(DEFAULT_SPAWN_ROOM)
    }

    /// Set the attractor. Compression is clamped to `[0, 1]`; a `None` center
    /// disables the field whatever the compression.
    pub fn set_tension_state(&mut self, center: Option<Vec3>, compression: f32) {
        let compression = if compression.is_nan() {
            0.0
        } else {
            compression.clamp(0.0, 1.0)
        };
        self.tension = TensionField {
            center,
            compression,
        };
    }

    /// Current attractor.
    #[inline]
    pub fn tension(&self) -> TensionField {
        self.tension
    }

    /// Drop every particle and burst record. Columns are left as they are.
    pub fn clear(&mut self) {
        self.active_count = 0;
        self.bursts.clear();
    }

    /// Live particle count.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Total slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent bursts, oldest first.
    pub fn bursts(&self) -> impl ExactSizeIterator<Item = &Burst> {
        self.bursts.iter()
    }

    /// Bursts spawned since construction, including evicted records.
    #[inline]
    pub fn total_bursts(&self) -> u64 {
        self.total_bursts
    }

    /// Seconds of simulated time since construction.
    #[inline]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Live columns for the renderer.
    pub fn view(&self) -> ParticleView<'_> {
        let n = self.active_count;
        ParticleView {
            positions: &self.positions[..n],
            velocities: &self.velocities[..n],
            colors: &self.colors[..n],
            sizes: &self.sizes[..n],
            ages: &self.ages[..n],
            max_ages: &self.max_ages[..n],
            kinds: &self.kinds[..n],
        }
    }

    /// Shader uniforms for this frame.
    pub fn uniforms(&self) -> ParticleUniforms {
        ParticleUniforms {
            time: self.clock,
            tension_intensity: self.tension.compression,
        }
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
