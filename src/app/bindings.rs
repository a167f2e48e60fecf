//! Viewer key and mouse bindings.
//!
//! | Input                  | Action                          |
//! |------------------------|---------------------------------|
//! | W / A / S / D          | Fly forward / left / back / right |
//! | Middle mouse + drag    | Look around                     |
//! | Scroll                 | Zoom (field of view)            |
//! | F1 .. F9               | G-buffer debug view             |
//! | Esc                    | Quit                            |

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use super::input::Input;
use crate::scene::camera::{Camera, CameraMovement};
use crate::scene::frame_state::{FrameState, GBufferView};

const MOVEMENT_KEYS: [(KeyCode, CameraMovement); 4] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
];

const LOOK_BUTTON: MouseButton = MouseButton::Middle;

/// What the frame loop should do after input was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    Quit,
}

#[must_use]
pub fn debug_view_for_key(key: KeyCode) -> Option<GBufferView> {
    let n = match key {
        KeyCode::F1 => 1,
        KeyCode::F2 => 2,
        KeyCode::F3 => 3,
        KeyCode::F4 => 4,
        KeyCode::F5 => 5,
        KeyCode::F6 => 6,
        KeyCode::F7 => 7,
        KeyCode::F8 => 8,
        KeyCode::F9 => 9,
        _ => return None,
    };
    GBufferView::from_function_key(n)
}

/// Applies one frame of input to the camera and frame state.
///
/// `pointer_captured` is set while the UI owns the mouse; camera look and
/// zoom are suppressed then, keyboard movement is not.
pub fn apply_input(
    input: &Input,
    camera: &mut Camera,
    state: &mut FrameState,
    pointer_captured: bool,
) -> InputOutcome {
    for key in input.keys_pressed() {
        if key == KeyCode::Escape {
            return InputOutcome::Quit;
        }
        if let Some(view) = debug_view_for_key(key) {
            state.gbuffer_view = view;
        }
    }

    for (key, movement) in MOVEMENT_KEYS {
        if input.is_key_held(key) {
            camera.process_movement(movement, state.delta_seconds);
        }
    }

    if !pointer_captured {
        if input.is_button_pressed(LOOK_BUTTON) {
            // Window y grows downwards, pitch grows upwards.
            camera.process_mouse(input.cursor_delta.x, -input.cursor_delta.y);
        }
        if input.scroll_delta.y != 0.0 {
            camera.process_scroll(input.scroll_delta.y);
        }
    }

    InputOutcome::Continue
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use winit::event::ElementState;

    use super::*;

    fn press(input: &mut Input, key: KeyCode) {
        input.handle_key(key, ElementState::Pressed, false);
    }

    #[test]
    fn function_keys_select_debug_views() {
        assert_eq!(debug_view_for_key(KeyCode::F1), Some(GBufferView::Final));
        assert_eq!(debug_view_for_key(KeyCode::F9), Some(GBufferView::Velocity));
        assert_eq!(debug_view_for_key(KeyCode::F10), None);

        let mut input = Input::new();
        let mut camera = Camera::default();
        let mut state = FrameState::default();
        press(&mut input, KeyCode::F3);
        assert_eq!(
            apply_input(&input, &mut camera, &mut state, false),
            InputOutcome::Continue
        );
        assert_eq!(state.gbuffer_view, GBufferView::Normal);
    }

    #[test]
    fn escape_quits() {
        let mut input = Input::new();
        press(&mut input, KeyCode::Escape);
        let outcome = apply_input(
            &input,
            &mut Camera::default(),
            &mut FrameState::default(),
            false,
        );
        assert_eq!(outcome, InputOutcome::Quit);
    }

    #[test]
    fn held_w_moves_by_speed_times_delta() {
        let mut input = Input::new();
        press(&mut input, KeyCode::KeyW);
        let mut camera = Camera::default();
        let start = camera.position;
        let state = &mut FrameState {
            delta_seconds: 0.5,
            ..Default::default()
        };
        apply_input(&input, &mut camera, state, false);
        let moved = camera.position - start;
        assert!((moved - Vec3::NEG_Z * camera.speed * 0.5).length() < 1e-5);
    }

    #[test]
    fn look_needs_middle_button_and_free_pointer() {
        let mut input = Input::new();
        input.handle_cursor_move(0.0, 0.0);
        input.handle_cursor_move(10.0, 0.0);
        let mut camera = Camera::default();
        let yaw = camera.yaw();

        apply_input(&input, &mut camera, &mut FrameState::default(), false);
        assert!((camera.yaw() - yaw).abs() < f32::EPSILON);

        input.handle_mouse_input(ElementState::Pressed, MouseButton::Middle);
        apply_input(&input, &mut camera, &mut FrameState::default(), true);
        assert!((camera.yaw() - yaw).abs() < f32::EPSILON);

        apply_input(&input, &mut camera, &mut FrameState::default(), false);
        assert!((camera.yaw() - (yaw + 10.0 * camera.sensitivity)).abs() < 1e-4);
    }
}
