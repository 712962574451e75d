//! Renderer boundary.
//!
//! The engine never builds meshes or shaders itself. Everything it needs from
//! a renderer goes through [`Scene`]: group visibility, post-process bloom,
//! the countdown display, and the per-frame particle upload.

use crate::pool::{ParticleUniforms, ParticleView};
use crate::Vec3;

/// Top-level visual groups the engine toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneGroup {
    /// The decorative tree.
    Tree,
    /// Falling snow around the tree.
    Snow,
    /// Firework particle points.
    Fireworks,
    /// Neon countdown digits.
    Countdown,
}

impl SceneGroup {
    /// Every group, in display order.
    pub const ALL: [SceneGroup; 4] = [
        SceneGroup::Tree,
        SceneGroup::Snow,
        SceneGroup::Fireworks,
        SceneGroup::Countdown,
    ];

    fn slot(self) -> usize {
        match self {
            SceneGroup::Tree => 0,
            SceneGroup::Snow => 1,
            SceneGroup::Fireworks => 2,
            SceneGroup::Countdown => 3,
        }
    }
}

/// Unreal-style bloom pass parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Luminance threshold.
    pub threshold: f32,
    /// Glow strength.
    pub strength: f32,
    /// Blur radius.
    pub radius: f32,
}

impl BloomSettings {
    /// Strong glow for the countdown and fireworks.
    pub const NEON: BloomSettings = BloomSettings {
        threshold: 0.5,
        strength: 1.5,
        radius: 0.6,
    };

    /// Softer glow for the tree.
    pub const TREE: BloomSettings = BloomSettings {
        threshold: 0.7,
        strength: 1.0,
        radius: 0.4,
    };
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self::TREE
    }
}

/// Whatever draws the frame.
///
/// All calls are fire-and-forget; a renderer that cannot honour one simply
/// ignores it.
pub trait Scene {
    /// Show or hide a group.
    fn set_group_visible(&mut self, group: SceneGroup, visible: bool);

    /// Replace the bloom pass parameters.
    fn set_bloom(&mut self, bloom: BloomSettings);

    /// Display a countdown number.
    fn show_countdown_value(&mut self, value: i32);

    /// Tint the countdown digits.
    fn set_neon_color(&mut self, color: Vec3);

    /// Upload the live particles for this frame.
    fn draw_particles(&mut self, particles: ParticleView<'_>, uniforms: ParticleUniforms);
}

/// A [`Scene`] that just remembers the last state it was given.
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    visible: [bool; 4],
    /// Last bloom parameters.
    pub bloom: BloomSettings,
    /// Last countdown number displayed.
    pub countdown_value: Option<i32>,
    /// Every countdown number displayed, in order.
    pub countdown_history: Vec<i32>,
    /// Last neon tint.
    pub neon_color: Vec3,
    /// Particle count of the last draw.
    pub drawn_particles: usize,
    /// Uniforms of the last draw.
    pub uniforms: ParticleUniforms,
    /// Draw calls received.
    pub frames_drawn: u64,
}

impl HeadlessScene {
    /// Tree and snow visible, fireworks and countdown hidden.
    pub fn new() -> Self {
        Self {
            visible: [true, true, false, false],
            bloom: BloomSettings::TREE,
            countdown_value: None,
            countdown_history: Vec::new(),
            neon_color: Vec3::ONE,
            drawn_particles: 0,
            uniforms: ParticleUniforms::default(),
            frames_drawn: 0,
        }
    }

    /// Whether a group is currently shown.
    pub fn is_visible(&self, group: SceneGroup) -> bool {
        self.visible[group.slot()]
    }
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for HeadlessScene {
    fn set_group_visible(&mut self, group: SceneGroup, visible: bool) {
        self.visible[group.slot()] = visible;
    }

    fn set_bloom(&mut self, bloom: BloomSettings) {
        self.bloom = bloom;
    }

    fn show_countdown_value(&mut self, value: i32) {
        self.countdown_value = Some(value);
        self.countdown_history.push(value);
    }

    fn set_neon_color(&mut self, color: Vec3) {
        self.neon_color = color;
    }

    fn draw_particles(&mut self, particles: ParticleView<'_>, uniforms: ParticleUniforms) {
        self.drawn_particles = particles.len();
        self.uniforms = uniforms;
        self.frames_drawn += 1;
    }
}
