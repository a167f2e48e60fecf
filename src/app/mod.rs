//! Interactive viewer
//!
//! Everything a window session needs on top of the renderer:
//! - [`input`]: keyboard and mouse state between frames
//! - [`bindings`]: WASD fly, middle-mouse look, scroll zoom, F1..F9, Esc
//! - [`ui`] / [`panels`]: the egui overlay and its control panels
//! - [`winit`]: the [`App`] builder and the event loop

pub mod bindings;
pub mod input;
pub mod panels;
pub mod ui;
pub mod winit;

pub use self::bindings::{InputOutcome, apply_input};
pub use self::input::Input;
pub use self::ui::UiPass;
pub use self::winit::{App, Viewer};
