//! Glide Snake - a smooth-motion Snake game for the terminal
//!
//! This library provides:
//! - Core game logic on a fixed timestep (game module)
//! - Timed visual effects and the per-frame session driver (effects, session)
//! - Interpolated TUI rendering (render module)
//! - Keyboard and pointer gesture input (input module)
//! - The interactive terminal host (modes module)

pub mod audio;
pub mod effects;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod session;
