//! Feeds winit window events into [`Input`].

use winit::event::{MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::app::input::Input;

/// Scroll lines per pixel of touchpad scrolling.
const PIXEL_SCALE: f32 = 0.01;

pub fn process_window_event(input: &mut Input, event: &WindowEvent) {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            if let PhysicalKey::Code(code) = event.physical_key {
                input.handle_key(code, event.state, event.repeat);
            }
        }

        WindowEvent::CursorMoved { position, .. } => {
            input.handle_cursor_move(position.x, position.y);
        }

        WindowEvent::MouseInput { state, button, .. } => {
            input.handle_mouse_input(*state, *button);
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => {
                    (pos.x as f32 * PIXEL_SCALE, pos.y as f32 * PIXEL_SCALE)
                }
            };
            input.handle_scroll(dx, dy);
        }

        WindowEvent::Focused(false) => input.release_all(),

        _ => {}
    }
}
