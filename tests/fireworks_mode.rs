//! End-to-end tests for the firework display mode.
//!
//! These drive `FireworkMode` the way a host would: one `update` per frame,
//! gesture input fed before it, and a `HeadlessScene` standing in for the
//! renderer.

use pyro::prelude::*;
use pyro::{CountdownPhase, ModeStats};
use std::path::Path;

const FRAME: f32 = 0.016;

fn mode_with_prefs(
    config: &EngineConfig,
    audio_prefs: Box<dyn PreferenceStore>,
    mode_prefs: Box<dyn PreferenceStore>,
) -> FireworkMode<HeadlessScene> {
    let output = OfflineOutput::new(8_000, config.audio.max_voices);
    let audio = EffectGateway::new(config.audio, Box::new(output), audio_prefs);
    FireworkMode::new(config, HeadlessScene::new(), audio, mode_prefs).with_seed(11)
}

fn memory_mode() -> FireworkMode<HeadlessScene> {
    let prefs = MemoryPreferences::new();
    mode_with_prefs(
        &EngineConfig::default(),
        Box::new(prefs.clone()),
        Box::new(prefs),
    )
}

fn file_mode(path: &Path) -> FireworkMode<HeadlessScene> {
    let prefs = FilePreferences::new(path);
    mode_with_prefs(
        &EngineConfig::default(),
        Box::new(prefs.clone()),
        Box::new(prefs),
    )
}

/// Hold a closed fist at the screen center for `frames` frames.
fn hold_fist(mode: &mut FireworkMode<HeadlessScene>, frames: usize) {
    for _ in 0..frames {
        mode.set_gesture_state(0, 0.0, 0.0, FRAME);
        mode.update(FRAME);
    }
}

fn run(mode: &mut FireworkMode<HeadlessScene>, frames: usize) {
    for _ in 0..frames {
        mode.update(FRAME);
    }
}

#[test]
fn test_fist_fires_one_staggered_finale() {
    let mut mode = memory_mode();
    mode.activate();

    // 0.608s of fist: past the 0.5s threshold
    hold_fist(&mut mode, 38);
    assert_eq!(mode.stats().gesture_finales, 1);
    assert!(mode.state().gesture_finale_triggered);

    // Staggered over 8 * 0.08s, so some bursts are still waiting
    assert!(mode.pending_bursts() > 0);

    mode.clear_gesture_state();
    run(&mut mode, 62);

    let stats = *mode.stats();
    assert_eq!(stats.gesture_finales, 1);
    assert_eq!(stats.gesture_bursts, 8);
    assert_eq!(mode.pending_bursts(), 0);
    assert!(mode.pool().active_count() > 0);
}

#[test]
fn test_fist_rearms_after_fingers_reappear() {
    let mut mode = memory_mode();
    mode.activate();

    hold_fist(&mut mode, 38);
    hold_fist(&mut mode, 38);
    assert_eq!(mode.stats().gesture_finales, 1);

    mode.set_gesture_state(3, 0.0, 0.0, FRAME);
    mode.update(FRAME);
    assert!(!mode.state().gesture_finale_triggered);
    assert_eq!(mode.state().fist_hold_elapsed, 0.0);

    hold_fist(&mut mode, 38);
    assert_eq!(mode.stats().gesture_finales, 2);
}

#[test]
fn test_short_fist_does_not_fire() {
    let mut mode = memory_mode();
    mode.activate();

    hold_fist(&mut mode, 20);
    mode.set_gesture_state(5, 0.0, 0.0, FRAME);
    hold_fist(&mut mode, 20);

    assert_eq!(mode.stats().gesture_finales, 0);
    assert_eq!(mode.pending_bursts(), 0);
}

#[test]
fn test_gesture_overrides_countdown_display() {
    let mut mode = memory_mode();
    mode.activate();
    assert_eq!(mode.scene().countdown_value, Some(10));

    mode.set_gesture_state(3, 0.2, 0.2, FRAME);
    assert_eq!(mode.scene().countdown_value, Some(3));

    // Ticks keep counting underneath but do not reach the display
    for _ in 0..3 {
        mode.set_gesture_state(3, 0.2, 0.2, 1.0);
        mode.update(1.0);
    }
    assert_eq!(mode.scene().countdown_value, Some(3));
    assert_eq!(mode.countdown().value(), 7);

    mode.clear_gesture_state();
    assert_eq!(mode.scene().countdown_value, Some(7));
}

#[test]
fn test_countdown_loops_with_finale() {
    let mut mode = memory_mode();
    mode.activate();

    for _ in 0..10 {
        mode.update(1.0);
    }
    assert_eq!(mode.stats().countdown_finales, 1);
    assert_eq!(mode.countdown().phase(), CountdownPhase::FinaleFired);
    assert_eq!(
        mode.scene().countdown_history,
        vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0]
    );

    // -1, then the two second wait
    mode.update(1.0);
    assert!(mode.countdown().awaiting_reset());
    mode.update(1.0);
    mode.update(1.0);
    assert_eq!(mode.countdown().value(), 10);
    assert_eq!(mode.scene().countdown_value, Some(10));

    for _ in 0..10 {
        mode.update(1.0);
    }
    assert_eq!(mode.stats().countdown_finales, 2);
}

#[test]
fn test_finale_covers_every_type() {
    // One burst per type so the whole finale fits the pool
    let mut config = EngineConfig::default();
    config.mode.finale_bursts_per_type = 1;
    let prefs = MemoryPreferences::new();
    let mut mode = mode_with_prefs(&config, Box::new(prefs.clone()), Box::new(prefs));
    mode.activate();
    mode.trigger_finale();
    assert_eq!(mode.pending_bursts(), FireworkType::ALL.len());

    // Finale kinds fire 0.2s apart
    let mut seen = Vec::new();
    for _ in 0..60 {
        mode.update(FRAME);
        for burst in mode.pool().bursts() {
            if !seen.contains(&burst.kind) {
                seen.push(burst.kind);
            }
        }
    }
    assert_eq!(seen, FireworkType::ALL.to_vec());
    assert_eq!(mode.pending_bursts(), 0);
}

#[test]
fn test_stale_bursts_dropped_after_reactivation() {
    let mut mode = memory_mode();
    mode.activate();

    // Trigger the gesture finale without advancing the clock
    for _ in 0..40 {
        mode.set_gesture_state(0, 0.0, 0.0, FRAME);
    }
    assert_eq!(mode.pending_bursts(), 8);

    mode.deactivate();
    mode.activate();
    mode.update(1.0);

    let stats: ModeStats = *mode.stats();
    assert_eq!(stats.stale_dropped, 8);
    assert_eq!(stats.gesture_bursts, 0);
    assert_eq!(mode.pending_bursts(), 0);
}

#[test]
fn test_visibility_follows_mode() {
    let mut mode = memory_mode();
    let groups = |mode: &FireworkMode<HeadlessScene>| {
        SceneGroup::ALL.map(|g| mode.scene().is_visible(g))
    };

    // Tree, snow, fireworks, countdown
    assert_eq!(groups(&mode), [true, true, false, false]);
    assert_eq!(mode.scene().bloom, BloomSettings::TREE);

    mode.toggle();
    assert_eq!(groups(&mode), [false, false, true, true]);
    assert_eq!(mode.scene().bloom, BloomSettings::NEON);

    mode.toggle();
    assert_eq!(groups(&mode), [true, true, false, false]);
    assert_eq!(mode.scene().bloom, BloomSettings::TREE);
}

#[test]
fn test_particles_drawn_every_active_frame() {
    let mut mode = memory_mode();
    run(&mut mode, 10);
    assert_eq!(mode.scene().frames_drawn, 0);

    mode.activate();
    run(&mut mode, 100);
    assert_eq!(mode.scene().frames_drawn, 100);
    assert_eq!(mode.scene().drawn_particles, mode.pool().active_count());
}

#[test]
fn test_mode_preference_persists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prefs").join("pyro.toml");

    let mut first = file_mode(&path);
    assert!(!first.saved_preference());
    first.activate();
    drop(first);

    let mut second = file_mode(&path);
    assert!(second.saved_preference());
    assert!(!second.is_active());
    second.activate();
    second.deactivate();
    drop(second);

    assert!(!file_mode(&path).saved_preference());
}

#[test]
fn test_saved_preference_waits_for_user() {
    let prefs = MemoryPreferences::new();
    let mut first = mode_with_prefs(
        &EngineConfig::default(),
        Box::new(prefs.clone()),
        Box::new(prefs.clone()),
    );
    first.activate();
    drop(first);

    let mut mode = mode_with_prefs(
        &EngineConfig::default(),
        Box::new(prefs.clone()),
        Box::new(prefs),
    );
    assert!(mode.saved_preference());
    run(&mut mode, 120);
    assert!(!mode.is_active());
    assert!(!mode.audio().is_initialized());
    assert_eq!(mode.pool().total_bursts(), 0);

    mode.toggle();
    assert!(mode.is_active());
    assert!(mode.audio().is_initialized());
}

#[test]
fn test_mute_persists_across_gateways() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pyro.toml");

    let mut mode = file_mode(&path);
    assert!(!mode.audio().muted());
    assert!(mode.audio_mut().toggle_mute());
    drop(mode);

    let mode = file_mode(&path);
    assert!(mode.audio().muted());
}

#[test]
fn test_pool_never_exceeds_capacity() {
    let mut mode = memory_mode();
    mode.activate();
    mode.set_viewport(800.0, 600.0);

    for frame in 0..600 {
        mode.spawn_at_position(400.0, 300.0);
        if frame % 30 == 0 {
            mode.trigger_finale();
        }
        mode.update(FRAME);
        assert!(mode.pool().active_count() <= mode.pool().capacity());
    }
    assert!(mode.stats().pointer_bursts > 0);
}
