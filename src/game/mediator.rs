//! Turns raw directional intents into the pending direction.
//!
//! Keyboard, swipe and joystick input all funnel through
//! [`submit_direction`]. It is the only writer of `pending_direction`
//! besides the engine's reset.

use super::{
    action::Direction,
    state::{GameState, Phase},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Game not started yet, or already over
    Inactive,
    /// Exact opposite of the direction committed last tick
    Reversal,
}

/// What became of a submitted direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Rejected(RejectReason),
    /// Stored as the pending direction for the next tick
    Queued,
    /// First input of the game: the snake starts moving. The caller must
    /// restart its step accumulator so no move happens early.
    Started,
}

pub fn submit_direction(state: &mut GameState, candidate: Direction) -> Submission {
    if !state.phase.accepts_input() {
        return Submission::Rejected(RejectReason::Inactive);
    }

    if state.phase == Phase::AwaitingFirstInput {
        // nothing to reverse into yet
        state.snake.direction = candidate;
        state.pending_direction = candidate;
        state.phase = Phase::Running;
        return Submission::Started;
    }

    if state.snake.direction.is_opposite(candidate) {
        return Submission::Rejected(RejectReason::Reversal);
    }
    state.pending_direction = candidate;
    Submission::Queued
}
