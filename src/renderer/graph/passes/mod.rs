//! Render passes
//!
//! The environment stage runs on demand; the rest run every frame in the
//! order listed here.

pub mod environment;
pub mod forward;
pub mod geometry;
pub mod lighting;
pub mod post_process;
pub mod sao;
pub mod ui;

pub use environment::{EnvironmentMapSet, EnvironmentStage};
pub use forward::ForwardPass;
pub use geometry::GeometryPass;
pub use lighting::LightingPass;
pub use post_process::PostProcessPass;
pub use sao::SaoPass;
pub use ui::UiOverlay;
