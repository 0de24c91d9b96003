/// Discrete things that happened in the simulation, for audio and UI
/// collaborators. Consumers never feed anything back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The player pressed play
    Started,
    /// The first direction arrived and the snake began to move
    FirstMove,
    FoodEaten {
        score: u32,
    },
    WallCollision,
    SelfCollision {
        /// Segments cut off the body
        removed: usize,
        /// Score charged for the lost segments, before the zero floor
        penalty: u32,
        fatal: bool,
    },
    /// No free cell was left for food
    BoardCleared,
    Reset,
}

impl GameEvent {
    /// Whether this event ends the current game
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameEvent::WallCollision
                | GameEvent::BoardCleared
                | GameEvent::SelfCollision { fatal: true, .. }
        )
    }
}
