//! Pointer and keyboard input.
//!
//! The pointer is stored twice: the raw position written by cursor events
//! as they arrive, and a smoothed copy advanced once per frame by
//! exponential decay toward the raw value. Both are in normalized device
//! coordinates: origin at the window center, X right, Y up, [-1, 1].

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the background host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Toggle light/dark theme.
    T,
    /// Pause or resume the clock.
    Space,
    Escape,
}

impl Key {
    fn from_winit(key: WinitKeyCode) -> Option<Self> {
        match key {
            WinitKeyCode::KeyT => Some(Key::T),
            WinitKeyCode::Space => Some(Key::Space),
            WinitKeyCode::Escape => Some(Key::Escape),
            _ => None,
        }
    }
}

/// Raw and smoothed pointer position.
#[derive(Debug, Clone)]
pub struct Pointer {
    raw: Vec2,
    smoothed: Vec2,
    /// Per-frame smoothing factor in (0, 1].
    smoothing: f32,
    window_size: (u32, u32),
}

impl Pointer {
    pub fn new(smoothing: f32) -> Self {
        Self {
            raw: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            smoothing,
            window_size: (800, 600),
        }
    }

    /// Latest pointer position reported by the window.
    pub fn raw(&self) -> Vec2 {
        self.raw
    }

    /// Filtered pointer position, updated once per frame.
    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Record a cursor position in window pixels.
    ///
    /// Ignored while the window has a zero-sized dimension.
    pub fn set_screen_position(&mut self, x: f32, y: f32) {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            self.raw = Vec2::new((x / w as f32) * 2.0 - 1.0, -(y / h as f32) * 2.0 + 1.0);
        }
    }

    /// Record a position already in normalized device coordinates.
    pub fn set_ndc(&mut self, ndc: Vec2) {
        self.raw = ndc;
    }

    /// Move the smoothed copy one step toward the raw position.
    pub fn advance(&mut self) {
        self.smoothed += (self.raw - self.smoothed) * self.smoothing;
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new(0.08)
    }
}

/// Key state collected from window events between frames.
///
/// Cursor and resize events are forwarded to the [`Pointer`] owned by the
/// simulation instance.
#[derive(Debug, Default)]
pub struct Input {
    keys_pressed: HashSet<Key>,
    keys_held: HashSet<Key>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a key went down since the last [`begin_frame`](Self::begin_frame).
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    /// Clear per-frame key state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent, pointer: &mut Pointer) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                if let Some(key) = Key::from_winit(code) {
                    self.key_event(key, event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                pointer.set_screen_position(position.x as f32, position.y as f32);
            }
            WindowEvent::Resized(size) => {
                pointer.set_window_size(size.width, size.height);
            }
            _ => {}
        }
    }

    fn key_event(&mut self, key: Key, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // No auto-repeat
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
    fn test_screen_to_ndc() {
        let mut pointer = Pointer::new(0.08);
        pointer.set_window_size(800, 600);

        pointer.set_screen_position(400.0, 300.0);
        assert!(pointer.raw().length() < 1e-6);

        pointer.set_screen_position(0.0, 0.0);
        assert_eq!(pointer.raw(), Vec2::new(-1.0, 1.0));

        pointer.set_screen_position(800.0, 600.0);
        assert_eq!(pointer.raw(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_zero_sized_window_keeps_last_position() {
        let mut pointer = Pointer::new(0.08);
        pointer.set_window_size(800, 600);
        pointer.set_screen_position(600.0, 300.0);
        pointer.set_window_size(0, 600);
        pointer.set_screen_position(0.0, 0.0);
        assert!((pointer.raw().x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_decays_toward_raw() {
        let mut pointer = Pointer::new(0.08);
        pointer.set_ndc(Vec2::new(1.0, 0.0));

        pointer.advance();
        assert!((pointer.smoothed().x - 0.08).abs() < 1e-6);
        assert_eq!(pointer.raw().x, 1.0);

        for _ in 0..200 {
            pointer.advance();
        }
        assert!((pointer.smoothed().x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_key_pressed_cleared_each_frame() {
        let mut input = Input::new();
        input.key_event(Key::T, ElementState::Pressed);
        assert!(input.key_pressed(Key::T));
        assert!(input.key_held(Key::T));

        input.begin_frame();
        assert!(!input.key_pressed(Key::T));
        assert!(input.key_held(Key::T));
    }

    #[test]
    fn test_held_key_does_not_repeat() {
        let mut input = Input::new();
        input.key_event(Key::Space, ElementState::Pressed);
        input.begin_frame();
        input.key_event(Key::Space, ElementState::Pressed);
        assert!(!input.key_pressed(Key::Space));

        input.key_event(Key::Space, ElementState::Released);
        input.key_event(Key::Space, ElementState::Pressed);
        assert!(input.key_pressed(Key::Space));
    }
}
