//! Looping neon countdown with a finale trigger.
//!
//! The timer counts down from [`CountdownConfig::start_value`] once per tick.
//! Reaching zero fires the finale exactly once; one tick later the timer waits
//! [`CountdownConfig::finale_wait_seconds`] and starts over without hiding.
//!
//! ```text
//!            start()                 value hits 0              value hits -1
//!   Idle ───────────────▶ Counting ───────────────▶ FinaleFired ──────────────▶ AwaitingReset
//!    ▲                       ▲                                                        │
//!    │ stop()                └──────────────── wait elapsed ──────────────────────────┘
//!    └── (from any state)
//! ```
//!
//! A live input source can superimpose its own number on the display with
//! [`CountdownTimer::set_external_value`] without disturbing the internal
//! count.

use crate::scene::{BloomSettings, Scene, SceneGroup};
use crate::spawn::hsv_to_rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Countdown timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// First number shown after `start()` and after every reset.
    pub start_value: i32,
    /// Seconds per decrement.
    pub tick_seconds: f32,
    /// Pause between the finale and the next loop.
    pub finale_wait_seconds: f32,
    /// Hue turns per second of the neon tint.
    pub hue_speed: f32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            start_value: 10,
            tick_seconds: 1.0,
            finale_wait_seconds: 2.0,
            hue_speed: 0.1,
        }
    }
}

/// Something the owner has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// The count reached zero.
    Finale,
}

/// Where the timer is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    /// Stopped and hidden.
    Idle,
    /// Counting toward zero.
    Counting,
    /// Zero was reached; waiting for the tick that goes negative.
    FinaleFired,
    /// Waiting out the pause before the next loop.
    AwaitingReset,
}

type FinaleCallback = Box<dyn FnMut()>;

/// The countdown state machine.
pub struct CountdownTimer {
    config: CountdownConfig,

    value: i32,
    elapsed: f32,
    active: bool,
    finale_triggered: bool,
    awaiting_reset: bool,
    external_value: Option<i32>,

    visible: bool,
    hue: f32,

    on_finale: Option<FinaleCallback>,
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("value", &self.value)
            .field("elapsed", &self.elapsed)
            .field("phase", &self.phase())
            .field("external_value", &self.external_value)
            .field("visible", &self.visible)
            .field("hue", &self.hue)
            .field("has_callback", &self.on_finale.is_some())
            .finish()
    }
}

impl CountdownTimer {
    /// Create an idle, hidden timer.
    pub fn new(config: CountdownConfig) -> Self {
        Self {
            value: config.start_value,
            config,
            elapsed: 0.0,
            active: false,
            finale_triggered: false,
            awaiting_reset: false,
            external_value: None,
            visible: false,
            hue: 0.0,
            on_finale: None,
        }
    }

    /// Register a callback invoked once per loop when the count reaches zero.
    ///
    /// [`update`](Self::update) also returns [`CountdownEvent::Finale`] on the
    /// same frame, so owners that cannot hand out a closure can react to that
    /// instead.
    pub fn set_finale_callback<F>(&mut self, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.on_finale = Some(Box::new(callback));
    }

    /// Drop the finale callback.
    pub fn clear_finale_callback(&mut self) {
        self.on_finale = None;
    }

    /// Begin counting from the start value, show the digits and switch the
    /// scene to neon bloom.
    pub fn start(&mut self, scene: &mut dyn Scene) {
        self.active = true;
        self.reset_loop();
        self.show(scene);
        self.refresh(scene);
        scene.set_bloom(BloomSettings::NEON);
        log::debug!("countdown started at {}", self.value);
    }

    /// Stop counting, hide the digits and restore tree bloom.
    pub fn stop(&mut self, scene: &mut dyn Scene) {
        self.active = false;
        self.hide(scene);
        scene.set_bloom(BloomSettings::TREE);
        log::debug!("countdown stopped at {}", self.value);
    }

    /// Advance by `dt` seconds.
    ///
    /// At most one decrement happens per call, however large `dt` is.
    pub fn update(&mut self, dt: f32, scene: &mut dyn Scene) -> Option<CountdownEvent> {
        if self.visible {
            self.hue = (self.hue + dt * self.config.hue_speed).rem_euclid(1.0);
            scene.set_neon_color(hsv_to_rgb(self.hue, 1.0, 1.0));
        }

        if !self.active {
            return None;
        }

        self.elapsed += dt;

        if self.awaiting_reset {
            if self.elapsed >= self.config.finale_wait_seconds {
                self.reset_loop();
                self.refresh(scene);
                log::debug!("countdown loop restarted");
            }
            return None;
        }

        if self.elapsed < self.config.tick_seconds {
            return None;
        }

        self.elapsed -= self.config.tick_seconds;
        self.value -= 1;

        if self.value >= 0 {
            self.refresh(scene);
        }

        let mut event = None;
        if self.value == 0 && !self.finale_triggered {
            self.finale_triggered = true;
            if let Some(callback) = self.on_finale.as_mut() {
                callback();
            }
            log::debug!("countdown finale");
            event = Some(CountdownEvent::Finale);
        }

        if self.value < 0 && self.finale_triggered {
            self.awaiting_reset = true;
            self.elapsed = 0.0;
        }

        event
    }

    /// Show `value` instead of the internal count until cleared.
    pub fn set_external_value(&mut self, value: i32, scene: &mut dyn Scene) {
        if self.external_value != Some(value) {
            self.external_value = Some(value);
            scene.show_countdown_value(value);
        }
    }

    /// Go back to displaying the internal count.
    pub fn clear_external_value(&mut self, scene: &mut dyn Scene) {
        if self.external_value.take().is_some() {
            scene.show_countdown_value(self.value.max(0));
        }
    }

    /// Show the countdown group.
    pub fn show(&mut self, scene: &mut dyn Scene) {
        self.visible = true;
        scene.set_group_visible(SceneGroup::Countdown, true);
    }

    /// Hide the countdown group.
    pub fn hide(&mut self, scene: &mut dyn Scene) {
        self.visible = false;
        scene.set_group_visible(SceneGroup::Countdown, false);
    }

    fn reset_loop(&mut self) {
        self.value = self.config.start_value;
        self.elapsed = 0.0;
        self.finale_triggered = false;
        self.awaiting_reset = false;
    }

    fn refresh(&self, scene: &mut dyn Scene) {
        if self.external_value.is_none() {
            scene.show_countdown_value(self.value.max(0));
        }
    }

    /// Current loop phase.
    pub fn phase(&self) -> CountdownPhase {
        match (self.active, self.finale_triggered, self.awaiting_reset) {
            (false, _, _) => CountdownPhase::Idle,
            (true, false, _) => CountdownPhase::Counting,
            (true, true, false) => CountdownPhase::FinaleFired,
            (true, true, true) => CountdownPhase::AwaitingReset,
        }
    }

    /// Internal count. Goes to -1 briefly after the finale.
    #[inline]
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Number the display should be showing.
    pub fn displayed_value(&self) -> i32 {
        self.external_value.unwrap_or(self.value.max(0))
    }

    /// Active override, if any.
    #[inline]
    pub fn external_value(&self) -> Option<i32> {
        self.external_value
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn finale_triggered(&self) -> bool {
        self.finale_triggered
    }

    #[inline]
    pub fn awaiting_reset(&self) -> bool {
        self.awaiting_reset
    }

    /// Neon hue in `[0, 1)`.
    #[inline]
    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(CountdownConfig::default())
    }
}
