//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies:
//! the grid simulation, the input mediator and the fixed-step clock.

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod mediator;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use clock::FixedStepClock;
pub use config::{ConfigError, Difficulty, GameConfig, SelfCollisionPolicy};
pub use engine::{BiteReport, Collision, GameEngine, StepInfo, StepResult};
pub use events::GameEvent;
pub use mediator::{RejectReason, Submission, submit_direction};
pub use state::{GameState, Phase, Position, Snake};
