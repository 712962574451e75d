//! Window input for the demo runner.
//!
//! [`Input`] folds winit window events into per-frame state: keys pressed
//! this frame, keys held, clicks and the cursor position. The runner turns
//! that into mode commands and simulated gesture frames.
//!
//! ```ignore
//! input.handle_event(&event);
//! // once per frame:
//! if input.key_pressed(KeyCode::N) {
//!     mode.toggle();
//! }
//! let frame = input.simulated_gesture();
//! input.begin_frame();
//! ```

use crate::gesture::GestureFrame;
use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the runner reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Toggle the firework mode.
    N,
    /// Toggle mute.
    M,
    /// Digit keys 0-5, used to fake a finger count.
    Digit(u8),
    Escape,
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyN => KeyCode::N,
            WinitKeyCode::KeyM => KeyCode::M,
            WinitKeyCode::Digit0 | WinitKeyCode::Numpad0 => KeyCode::Digit(0),
            WinitKeyCode::Digit1 | WinitKeyCode::Numpad1 => KeyCode::Digit(1),
            WinitKeyCode::Digit2 | WinitKeyCode::Numpad2 => KeyCode::Digit(2),
            WinitKeyCode::Digit3 | WinitKeyCode::Numpad3 => KeyCode::Digit(3),
            WinitKeyCode::Digit4 | WinitKeyCode::Numpad4 => KeyCode::Digit(4),
            WinitKeyCode::Digit5 | WinitKeyCode::Numpad5 => KeyCode::Digit(5),
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other,
        }
    }
}

/// Per-frame input state.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    clicks: Vec<Vec2>,
    cursor: Vec2,

    window_size: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self {
            window_size: Vec2::new(1280.0, 720.0),
            ..Default::default()
        }
    }

    /// Whether `key` went down this frame. Auto-repeat does not count.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Left clicks this frame, in window pixels.
    pub fn clicks(&self) -> &[Vec2] {
        &self.clicks
    }

    /// Cursor position in window pixels.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn window_size(&self) -> Vec2 {
        self.window_size
    }

    /// Cursor in `[-1, 1]` on both axes, `y` growing downward like an image.
    pub fn cursor_normalized(&self) -> Vec2 {
        if self.window_size.x <= 0.0 || self.window_size.y <= 0.0 {
            return Vec2::ZERO;
        }
        (self.cursor / self.window_size) * 2.0 - Vec2::ONE
    }

    /// Lowest digit key held, as a finger count.
    pub fn held_finger_count(&self) -> Option<u8> {
        (0..=5).find(|d| self.keys_held.contains(&KeyCode::Digit(*d)))
    }

    /// A gesture frame built from the held digit and the cursor, or `None`
    /// when no digit is held.
    pub fn simulated_gesture(&self) -> Option<GestureFrame> {
        let fingers = self.held_finger_count()?;
        let pos = self.cursor_normalized();
        Some(GestureFrame::new(i32::from(fingers), pos.x, pos.y))
    }

    /// Clear per-frame state. Call after the frame has consumed it.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.clicks.clear();
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = Vec2::new(width as f32, height as f32);
    }

    /// Fold one window event into the state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.key_event(KeyCode::from(code), event.state);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.clicks.push(self.cursor);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
            }
            _ => {}
        }
    }

    fn key_event(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = Input::new();
        assert!(!input.key_held(KeyCode::N));

        input.key_event(KeyCode::N, ElementState::Pressed);
        assert!(input.key_pressed(KeyCode::N));
        assert!(input.key_held(KeyCode::N));

        // Repeat while held is not a new press
        input.begin_frame();
        input.key_event(KeyCode::N, ElementState::Pressed);
        assert!(!input.key_pressed(KeyCode::N));
        assert!(input.key_held(KeyCode::N));

        input.key_event(KeyCode::N, ElementState::Released);
        assert!(!input.key_held(KeyCode::N));
    }

    #[test]
    fn test_simulated_gesture() {
        let mut input = Input::new();
        input.set_window_size(800, 600);
        input.cursor = Vec2::new(600.0, 150.0);
        assert!(input.simulated_gesture().is_none());

        input.key_event(KeyCode::Digit(3), ElementState::Pressed);
        input.key_event(KeyCode::Digit(1), ElementState::Pressed);
        let frame = input.simulated_gesture().expect("digit held");
        assert_eq!(frame.finger_count, 1);
        assert!((frame.x - 0.5).abs() < 1e-6);
        assert!((frame.y + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyCode::from(WinitKeyCode::Digit4), KeyCode::Digit(4));
        assert_eq!(KeyCode::from(WinitKeyCode::Numpad0), KeyCode::Digit(0));
        assert_eq!(KeyCode::from(WinitKeyCode::KeyQ), KeyCode::Other);
    }
}
