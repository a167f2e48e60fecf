use glam::Vec2;
use rustc_hash::FxHashSet;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Keyboard and mouse state accumulated between two frames.
///
/// Held keys and buttons persist; deltas and one-shot presses are cleared by
/// [`end_frame`](Self::end_frame).
#[derive(Default, Debug, Clone)]
pub struct Input {
    pub cursor_position: Option<Vec2>,
    /// Cursor motion since the last frame, y down.
    pub cursor_delta: Vec2,
    /// Scroll lines since the last frame.
    pub scroll_delta: Vec2,
    keys_held: FxHashSet<KeyCode>,
    keys_pressed: FxHashSet<KeyCode>,
    mouse_buttons: FxHashSet<MouseButton>,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.keys_pressed.clear();
    }

    pub fn handle_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if !repeat {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    pub fn handle_cursor_move(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if let Some(old) = self.cursor_position {
            self.cursor_delta += new_pos - old;
        }
        self.cursor_position = Some(new_pos);
    }

    pub fn handle_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    pub fn handle_scroll(&mut self, dx: f32, dy: f32) {
        self.scroll_delta += Vec2::new(dx, dy);
    }

    /// Drops every held key and button, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys_held.clear();
        self.mouse_buttons.clear();
    }

    #[must_use]
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Keys that went down this frame, without auto-repeat.
    pub fn keys_pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys_pressed.iter().copied()
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cursor_event_has_no_delta() {
        let mut input = Input::new();
        input.handle_cursor_move(100.0, 50.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        input.handle_cursor_move(110.0, 45.0);
        assert_eq!(input.cursor_delta, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn end_frame_keeps_held_keys() {
        let mut input = Input::new();
        input.handle_key(KeyCode::KeyW, ElementState::Pressed, false);
        input.handle_scroll(0.0, 2.0);
        input.end_frame();
        assert!(input.is_key_held(KeyCode::KeyW));
        assert_eq!(input.keys_pressed().count(), 0);
        assert_eq!(input.scroll_delta, Vec2::ZERO);
    }

    #[test]
    fn repeats_are_not_fresh_presses() {
        let mut input = Input::new();
        input.handle_key(KeyCode::F2, ElementState::Pressed, true);
        assert_eq!(input.keys_pressed().count(), 0);
        assert!(input.is_key_held(KeyCode::F2));
    }
}
