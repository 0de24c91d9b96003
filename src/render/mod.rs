//! Terminal rendering of frame snapshots.

pub mod interpolate;
pub mod renderer;

pub use renderer::Renderer;
