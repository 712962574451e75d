//! The firework display mode.
//!
//! [`FireworkMode`] owns one particle pool, one effect gateway and one
//! countdown, and drives them from the host's frame loop. While active it
//! replaces the tree scene: tree and snow are hidden, the countdown runs, and
//! bursts are launched from four sources.
//!
//! | Source | Trigger | Type selection |
//! |--------|---------|----------------|
//! | Auto-spawn | every `auto_spawn_interval` seconds | shared round-robin |
//! | Pointer | [`spawn_at_position`](FireworkMode::spawn_at_position) | shared round-robin |
//! | Countdown finale | count reaches zero | every type, `finale_bursts_per_type` each |
//! | Gesture finale | fist held for `fist_hold_threshold` | `ALL[i % 5]` per burst |
//!
//! Staggered bursts go through a [`DeferredQueue`] polled once per
//! [`update`](FireworkMode::update). Each activation opens a new session;
//! bursts scheduled in an earlier session are dropped when they come due.
//!
//! # Example
//!
//! ```ignore
//! let mut mode = FireworkMode::new(&config, scene, audio, prefs);
//! mode.activate();
//! loop {
//!     let dt = clock.update();
//!     mode.apply_gesture(tracker.frame(), dt);
//!     mode.update(dt);
//! }
//! ```

use crate::audio::EffectGateway;
use crate::camera::Camera;
use crate::catalog::FireworkType;
use crate::config::EngineConfig;
use crate::countdown::{CountdownEvent, CountdownTimer};
use crate::gesture::GestureFrame;
use crate::pool::{ParticlePool, PoolConfig};
use crate::prefs::{self, PreferenceStore};
use crate::scene::{Scene, SceneGroup};
use crate::schedule::{Deferred, DeferredQueue};
use crate::spawn::SpawnRng;
use crate::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Preference key of the "mode left on" flag.
pub const MODE_KEY: &str = "newYearModeEnabled";

/// Auto-spawn region: x in [-10, 10], y in [5, 15], z in [-5, 5].
const AUTO_SPAWN_CENTER: Vec3 = Vec3::new(0.0, 10.0, 0.0);
const AUTO_SPAWN_HALF: Vec3 = Vec3::new(10.0, 5.0, 5.0);

/// Finale region: x in [-15, 15], y in [8, 16], z in [-7.5, 7.5].
const FINALE_CENTER: Vec3 = Vec3::new(0.0, 12.0, 0.0);
const FINALE_HALF: Vec3 = Vec3::new(15.0, 4.0, 7.5);

/// Behaviour of the display mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Seconds between automatic bursts.
    pub auto_spawn_interval: f32,
    /// Seconds a fist must be held to fire the gesture finale.
    pub fist_hold_threshold: f32,
    /// Bursts in a gesture finale.
    pub gesture_burst_count: usize,
    /// Seconds between gesture finale bursts.
    pub gesture_burst_stagger: f32,
    /// Edge length of the cube gesture bursts are scattered in.
    pub gesture_burst_spread: f32,
    /// Bursts per type in the countdown finale.
    pub finale_bursts_per_type: usize,
    /// Seconds between finale types.
    pub finale_stagger: f32,
    /// Distance from the camera at which pointer bursts appear.
    pub click_spawn_distance: f32,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            auto_spawn_interval: 1.5,
            fist_hold_threshold: 0.5,
            gesture_burst_count: 8,
            gesture_burst_stagger: 0.08,
            gesture_burst_spread: 5.0,
            finale_bursts_per_type: 3,
            finale_stagger: 0.2,
            click_spawn_distance: 30.0,
        }
    }
}

/// Mode flags and timers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeState {
    pub active: bool,
    pub auto_spawn_elapsed: f32,
    /// A hand was seen this frame.
    pub gesture_active: bool,
    pub fist_hold_elapsed: f32,
    /// The current fist already fired its finale.
    pub gesture_finale_triggered: bool,
}

/// Burst counters, by source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeStats {
    pub auto_bursts: u64,
    pub pointer_bursts: u64,
    pub gesture_bursts: u64,
    pub finale_bursts: u64,
    /// Gesture finales triggered.
    pub gesture_finales: u64,
    /// Countdown finales triggered.
    pub countdown_finales: u64,
    /// Scheduled bursts dropped because their session ended.
    pub stale_dropped: u64,
}

/// A burst waiting in the deferred queue.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ScheduledBurst {
    Gesture { index: usize },
    Finale { kind: FireworkType },
}

/// Display-mode coordinator.
pub struct FireworkMode<S: Scene> {
    config: ModeConfig,
    pool_config: PoolConfig,

    scene: S,
    pool: ParticlePool,
    audio: EffectGateway,
    countdown: CountdownTimer,
    camera: Camera,
    viewport: Vec2,
    prefs: Box<dyn PreferenceStore>,

    state: ModeState,
    stats: ModeStats,
    finger_count: u32,
    tension_center: Vec3,
    type_cursor: usize,

    queue: DeferredQueue<ScheduledBurst>,
    clock: f64,
    session: u64,
    rng: SpawnRng,

    saved_preference: bool,
}

impl<S: Scene> FireworkMode<S> {
    /// Build an inactive mode. Reads the saved mode flag but does not act on it.
    pub fn new(
        config: &EngineConfig,
        scene: S,
        audio: EffectGateway,
        prefs: Box<dyn PreferenceStore>,
    ) -> Self {
        let saved_preference = prefs::load_or_default(prefs.as_ref(), MODE_KEY);
        Self {
            config: config.mode,
            pool_config: config.pool,
            scene,
            pool: ParticlePool::new(config.pool),
            audio,
            countdown: CountdownTimer::new(config.countdown),
            camera: config.camera,
            viewport: Vec2::new(1280.0, 720.0),
            prefs,
            state: ModeState::default(),
            stats: ModeStats::default(),
            finger_count: 5,
            tension_center: Vec3::new(0.0, 5.0, 0.0),
            type_cursor: 0,
            queue: DeferredQueue::new(),
            clock: 0.0,
            session: 0,
            rng: SpawnRng::new(),
            saved_preference,
        }
    }

    /// Make every random choice reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.pool = ParticlePool::with_seed(self.pool_config, seed);
        self.rng = SpawnRng::with_seed(seed.wrapping_add(1));
        self
    }

    // ========== Activation ==========

    /// Switch the display to fireworks.
    pub fn activate(&mut self) {
        if self.state.active {
            return;
        }
        self.state.active = true;
        self.state.auto_spawn_elapsed = 0.0;
        self.session += 1;

        self.audio.init();
        self.audio.resume();

        self.scene.set_group_visible(SceneGroup::Tree, false);
        self.scene.set_group_visible(SceneGroup::Snow, false);
        self.scene.set_group_visible(SceneGroup::Fireworks, true);
        self.countdown.start(&mut self.scene);

        prefs::store_or_warn(self.prefs.as_mut(), MODE_KEY, true);
        log::info!("firework mode on (session {})", self.session);
    }

    /// Switch back to the tree.
    ///
    /// Particles are cleared. Bursts still queued are left in place and
    /// dropped when they come due in a later session.
    pub fn deactivate(&mut self) {
        if !self.state.active {
            return;
        }
        self.state = ModeState::default();

        self.scene.set_group_visible(SceneGroup::Tree, true);
        self.scene.set_group_visible(SceneGroup::Snow, true);
        self.scene.set_group_visible(SceneGroup::Fireworks, false);

        self.pool.clear();
        self.pool.set_tension_state(None, 0.0);
        self.countdown.clear_external_value(&mut self.scene);
        self.countdown.stop(&mut self.scene);

        prefs::store_or_warn(self.prefs.as_mut(), MODE_KEY, false);
        log::info!("firework mode off");
    }

    /// Flip the mode and return whether it is now active.
    pub fn toggle(&mut self) -> bool {
        if self.state.active {
            self.deactivate();
        } else {
            self.activate();
        }
        self.state.active
    }

    // ========== Frame ==========

    /// Advance one frame. Does nothing while inactive.
    pub fn update(&mut self, dt: f32) {
        if !self.state.active {
            return;
        }
        self.clock += f64::from(dt);

        self.pool.update(dt);

        if let Some(CountdownEvent::Finale) = self.countdown.update(dt, &mut self.scene) {
            self.trigger_finale();
        }

        self.audio.update(dt);
        self.run_due();

        self.state.auto_spawn_elapsed += dt;
        if self.state.auto_spawn_elapsed >= self.config.auto_spawn_interval {
            self.state.auto_spawn_elapsed = 0.0;
            self.spawn_random_firework();
        }

        self.scene.draw_particles(self.pool.view(), self.pool.uniforms());
    }

    fn run_due(&mut self) {
        while let Some(item) = self.queue.pop_due(self.clock) {
            self.fire(item);
        }
    }

    fn fire(&mut self, item: Deferred<ScheduledBurst>) {
        if item.session != self.session || !self.state.active {
            self.stats.stale_dropped += 1;
            log::debug!("dropping stale {:?} from session {}", item.action, item.session);
            return;
        }

        match item.action {
            ScheduledBurst::Gesture { index } => {
                let half = Vec3::splat(self.config.gesture_burst_spread * 0.5);
                let origin = self.rng.random_in_box(self.tension_center, half);
                let kind = FireworkType::ALL[index % FireworkType::ALL.len()];
                if self.launch(origin, kind) {
                    self.stats.gesture_bursts += 1;
                }
            }
            ScheduledBurst::Finale { kind } => {
                for _ in 0..self.config.finale_bursts_per_type {
                    let origin = self.rng.random_in_box(FINALE_CENTER, FINALE_HALF);
                    if self.launch(origin, kind) {
                        self.stats.finale_bursts += 1;
                    }
                }
            }
        }
    }

    /// Spawn and play if there is room.
    fn launch(&mut self, origin: Vec3, kind: FireworkType) -> bool {
        if !self.pool.can_spawn_default() {
            return false;
        }
        if self.pool.spawn(origin, Some(kind)) {
            self.audio.play(kind);
            true
        } else {
            false
        }
    }

    fn next_round_robin(&mut self) -> FireworkType {
        let kind = FireworkType::ALL[self.type_cursor % FireworkType::ALL.len()];
        self.type_cursor = self.type_cursor.wrapping_add(1);
        kind
    }

    fn spawn_random_firework(&mut self) {
        if !self.pool.can_spawn_default() {
            return;
        }
        let kind = self.next_round_robin();
        let origin = self.rng.random_in_box(AUTO_SPAWN_CENTER, AUTO_SPAWN_HALF);
        if self.launch(origin, kind) {
            self.stats.auto_bursts += 1;
        }
    }

    // ========== Input ==========

    /// Launch a burst along the camera ray through a window pixel.
    ///
    /// Returns whether a burst was spawned.
    pub fn spawn_at_position(&mut self, screen_x: f32, screen_y: f32) -> bool {
        if !self.state.active || !self.pool.can_spawn_default() {
            return false;
        }
        let Some(origin) = self.camera.screen_point_at_distance(
            Vec2::new(screen_x, screen_y),
            self.viewport,
            self.config.click_spawn_distance,
        ) else {
            return false;
        };

        let kind = self.next_round_robin();
        let spawned = self.launch(origin, kind);
        if spawned {
            self.stats.pointer_bursts += 1;
        }
        spawned
    }

    /// Feed one frame of hand input.
    ///
    /// Out-of-range values are clamped. Ignored while inactive.
    pub fn set_gesture_state(&mut self, finger_count: i32, x: f32, y: f32, dt: f32) {
        self.set_gesture_frame(GestureFrame::new(finger_count, x, y), dt);
    }

    /// [`set_gesture_state`](Self::set_gesture_state) for an already clamped frame.
    pub fn set_gesture_frame(&mut self, frame: GestureFrame, dt: f32) {
        if !self.state.active {
            return;
        }
        self.state.gesture_active = true;
        self.finger_count = frame.finger_count;
        self.tension_center = frame.world_center();

        self.countdown
            .set_external_value(frame.finger_count as i32, &mut self.scene);
        self.pool
            .set_tension_state(Some(self.tension_center), frame.compression());

        if frame.is_fist() {
            self.state.fist_hold_elapsed += dt;
            if self.state.fist_hold_elapsed >= self.config.fist_hold_threshold
                && !self.state.gesture_finale_triggered
            {
                self.trigger_gesture_finale();
            }
        } else {
            self.state.fist_hold_elapsed = 0.0;
            self.state.gesture_finale_triggered = false;
        }
    }

    /// Release the tension field and the countdown override. Call on frames
    /// with no hand.
    pub fn clear_gesture_state(&mut self) {
        self.state.gesture_active = false;
        self.state.fist_hold_elapsed = 0.0;
        self.pool.set_tension_state(None, 0.0);
        self.countdown.clear_external_value(&mut self.scene);
    }

    /// Apply this frame's gesture, or clear it when no hand was seen.
    pub fn apply_gesture(&mut self, frame: Option<GestureFrame>, dt: f32) {
        match frame {
            Some(frame) => self.set_gesture_frame(frame, dt),
            None => self.clear_gesture_state(),
        }
    }

    fn trigger_gesture_finale(&mut self) {
        self.state.gesture_finale_triggered = true;
        self.stats.gesture_finales += 1;
        for index in 0..self.config.gesture_burst_count {
            let due = self.clock + index as f64 * f64::from(self.config.gesture_burst_stagger);
            self.queue
                .schedule(due, self.session, ScheduledBurst::Gesture { index });
        }
        log::debug!("gesture finale at {:?}", self.tension_center);
    }

    /// Schedule the multi-type finale: every type, staggered.
    pub fn trigger_finale(&mut self) {
        self.stats.countdown_finales += 1;
        for (i, kind) in FireworkType::ALL.into_iter().enumerate() {
            let due = self.clock + i as f64 * f64::from(self.config.finale_stagger);
            self.queue
                .schedule(due, self.session, ScheduledBurst::Finale { kind });
        }
        log::debug!("countdown finale scheduled");
    }

    /// Track the window size used for pointer unprojection.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
            self.camera.set_viewport(width, height);
        }
    }

    // ========== Accessors ==========

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Whether the mode was left on last time, as read at construction.
    #[inline]
    pub fn saved_preference(&self) -> bool {
        self.saved_preference
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn stats(&self) -> &ModeStats {
        &self.stats
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    pub fn audio(&self) -> &EffectGateway {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut EffectGateway {
        &mut self.audio
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Last stable finger count received.
    #[inline]
    pub fn finger_count(&self) -> u32 {
        self.finger_count
    }

    /// Current tension field center in world space.
    #[inline]
    pub fn tension_center(&self) -> Vec3 {
        self.tension_center
    }

    /// Bursts waiting to fire.
    pub fn pending_bursts(&self) -> usize {
        self.queue.len()
    }

    /// Seconds of active time since construction.
    #[inline]
    pub fn clock(&self) -> f64 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioConfig, OfflineOutput};
    use crate::prefs::MemoryPreferences;
    use crate::scene::HeadlessScene;

    fn mode_with(config: EngineConfig) -> FireworkMode<HeadlessScene> {
        let prefs = MemoryPreferences::new();
        let audio = EffectGateway::new(
            AudioConfig::default(),
            Box::new(OfflineOutput::new(8_000, 10)),
            Box::new(prefs.clone()),
        );
        FireworkMode::new(&config, HeadlessScene::new(), audio, Box::new(prefs)).with_seed(3)
    }

    fn mode() -> FireworkMode<HeadlessScene> {
        mode_with(EngineConfig::default())
    }

    #[test]
    fn test_update_inactive_is_noop() {
        let mut mode = mode();
        mode.update(5.0);
        assert_eq!(mode.pool().active_count(), 0);
        assert_eq!(mode.clock(), 0.0);
        assert_eq!(mode.scene().frames_drawn, 0);
    }

    #[test]
    fn test_finale_drains_after_a_week() {
        let mut config = EngineConfig::default();
        config.mode.finale_bursts_per_type = 1;
        let mut mode = mode_with(config);
        mode.activate();
        mode.clock = 604_800.0;

        mode.trigger_finale();
        assert_eq!(mode.pending_bursts(), FireworkType::ALL.len());
        for _ in 0..600 {
            mode.update(0.016);
        }
        assert_eq!(mode.pending_bursts(), 0);
        assert_eq!(mode.stats().finale_bursts, FireworkType::ALL.len() as u64);
    }

    #[test]
    fn test_activate_switches_scene() {
        let mut mode = mode();
        mode.activate();
        assert!(mode.is_active());
        let scene = mode.scene();
        assert!(!scene.is_visible(SceneGroup::Tree));
        assert!(!scene.is_visible(SceneGroup::Snow));
        assert!(scene.is_visible(SceneGroup::Fireworks));
        assert!(scene.is_visible(SceneGroup::Countdown));
        assert!(mode.audio().is_initialized());
    }

    #[test]
    fn test_auto_spawn_round_robin() {
        let mut mode = mode();
        mode.activate();
        let mut kinds = Vec::new();
        for _ in 0..5 {
            // 1.5s in 0.25s steps
            for _ in 0..6 {
                mode.update(0.25);
            }
            let last = mode.pool().bursts().last().map(|b| b.kind);
            kinds.push(last.expect("a burst was spawned"));
        }
        assert_eq!(kinds, FireworkType::ALL.to_vec());
        assert_eq!(mode.stats().auto_bursts, 5);
    }

    #[test]
    fn test_auto_spawn_region() {
        let mut mode = mode();
        mode.activate();
        mode.update(1.5);
        let origin = mode.pool().view().positions[0];
        assert!(origin.x.abs() <= 10.0);
        assert!(origin.y >= 5.0 && origin.y <= 15.0);
        assert!(origin.z.abs() <= 5.0);
    }

    #[test]
    fn test_gesture_sets_tension_and_override() {
        let mut mode = mode();
        mode.activate();
        mode.set_gesture_state(2, 0.5, -0.4, 0.016);

        let tension = mode.pool().tension();
        assert_eq!(tension.center, Some(Vec3::new(7.5, 7.0, 0.0)));
        assert!((tension.compression - 0.6).abs() < 1e-6);
        assert_eq!(mode.countdown().displayed_value(), 2);
        assert!(mode.state().gesture_active);

        mode.clear_gesture_state();
        assert_eq!(mode.pool().tension().compression, 0.0);
        assert!(mode.pool().tension().center.is_none());
        assert_eq!(mode.countdown().external_value(), None);
        assert!(!mode.state().gesture_active);
    }

    #[test]
    fn test_gesture_clamps_input() {
        let mut mode = mode();
        mode.activate();
        mode.set_gesture_state(12, -4.0, 9.0, 0.016);
        assert_eq!(mode.finger_count(), 5);
        assert_eq!(mode.tension_center(), Vec3::new(-15.0, 0.0, 0.0));
    }

    #[test]
    fn test_gesture_ignored_while_inactive() {
        let mut mode = mode();
        mode.set_gesture_state(0, 0.0, 0.0, 1.0);
        assert!(!mode.state().gesture_active);
        assert_eq!(mode.pending_bursts(), 0);
    }

    #[test]
    fn test_fist_schedules_once() {
        let mut mode = mode();
        mode.activate();
        for _ in 0..40 {
            mode.set_gesture_state(0, 0.0, 0.0, 0.016);
        }
        assert_eq!(mode.stats().gesture_finales, 1);
        assert_eq!(mode.pending_bursts(), 8);

        // Absence of a hand does not re-arm the finale
        mode.clear_gesture_state();
        for _ in 0..40 {
            mode.set_gesture_state(0, 0.0, 0.0, 0.016);
        }
        assert_eq!(mode.stats().gesture_finales, 1);

        mode.set_gesture_state(4, 0.0, 0.0, 0.016);
        for _ in 0..40 {
            mode.set_gesture_state(0, 0.0, 0.0, 0.016);
        }
        assert_eq!(mode.stats().gesture_finales, 2);
    }

    #[test]
    fn test_countdown_finale_spawns_every_type() {
        let mut mode = mode();
        mode.activate();
        // Ten ticks reach zero; keep frames short enough that the finale
        // bursts fire before auto-spawn fills the pool.
        for _ in 0..10 {
            mode.update(1.0);
        }
        assert_eq!(mode.stats().countdown_finales, 1);
        for _ in 0..10 {
            mode.update(0.1);
        }
        assert_eq!(mode.pending_bursts(), 0);
        assert!(mode.stats().finale_bursts > 0);
    }

    #[test]
    fn test_pointer_spawn() {
        let mut mode = mode();
        assert!(!mode.spawn_at_position(100.0, 100.0));

        mode.activate();
        mode.set_viewport(800.0, 600.0);
        assert!(mode.spawn_at_position(400.0, 300.0));
        assert!(mode.spawn_at_position(400.0, 300.0));
        let kinds: Vec<FireworkType> = mode.pool().bursts().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![FireworkType::Bloom, FireworkType::Spark]);
        assert_eq!(mode.stats().pointer_bursts, 2);

        let origin = mode.pool().view().positions[0];
        let distance = (origin - mode.camera().position).length();
        assert!((distance - 30.0).abs() < 1e-2);
    }

    #[test]
    fn test_deactivate_restores_scene_and_clears() {
        let mut mode = mode();
        mode.activate();
        mode.update(1.5);
        assert!(mode.pool().active_count() > 0);

        mode.deactivate();
        assert!(!mode.is_active());
        assert_eq!(mode.pool().active_count(), 0);
        let scene = mode.scene();
        assert!(scene.is_visible(SceneGroup::Tree));
        assert!(scene.is_visible(SceneGroup::Snow));
        assert!(!scene.is_visible(SceneGroup::Fireworks));
        assert!(!scene.is_visible(SceneGroup::Countdown));
    }

    #[test]
    fn test_toggle() {
        let mut mode = mode();
        assert!(mode.toggle());
        assert!(!mode.toggle());
    }
}
