//! Utility Module
//!
//! - [`FpsCounter`]: frame rate estimate over a fixed window
//! - [`FrameClock`]: per-frame wall-clock delta

pub mod fps_counter;
pub mod time;

pub use fps_counter::FpsCounter;
pub use time::FrameClock;
