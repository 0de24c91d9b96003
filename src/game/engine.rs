use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{
    action::Direction,
    config::{ConfigError, GameConfig, SelfCollisionPolicy},
    events::GameEvent,
    state::{GameState, Phase, Position, Snake},
};

/// Details of a head-into-body collision
#[derive(Debug, Clone, PartialEq)]
pub struct BiteReport {
    /// Index of the bitten segment in the pre-move body
    pub index: usize,
    /// Cell where the bite happened (the would-be new head)
    pub cell: Position,
    /// Heading of the head when it bit
    pub heading: Direction,
    /// Pre-move body from the bitten segment to the tail, for the visual
    pub removed_path: Vec<Position>,
    /// Segments actually removed from the body
    pub removed: usize,
    /// Score charged before the zero floor
    pub penalty: u32,
    pub fatal: bool,
}

/// Collision that occurred during a step
#[derive(Debug, Clone, PartialEq)]
pub enum Collision {
    /// Snake tried to leave the grid at `at`
    Wall { at: Position },
    SelfBite(BiteReport),
}

/// Information about a step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Collision if one occurred
    pub collision: Option<Collision>,
    /// Food was eaten and no free cell remained for the next one
    pub board_full: bool,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    /// Score after the step
    pub score: u32,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    /// A step that did nothing (phase was not `Running`)
    pub fn idle(state: &GameState) -> Self {
        Self {
            terminated: state.is_over(),
            score: state.score,
            info: StepInfo::default(),
        }
    }

    /// Named events for audio/UI collaborators, in the order they happened
    pub fn events(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match &self.info.collision {
            Some(Collision::Wall { .. }) => events.push(GameEvent::WallCollision),
            Some(Collision::SelfBite(bite)) => events.push(GameEvent::SelfCollision {
                removed: bite.removed,
                penalty: bite.penalty,
                fatal: bite.fatal,
            }),
            None => {}
        }
        if self.info.ate_food {
            events.push(GameEvent::FoodEaten { score: self.score });
        }
        if self.info.board_full {
            events.push(GameEvent::BoardCleared);
        }
        events
    }
}

/// The grid simulation. Owns the rules and the rng; the state lives in
/// [`GameState`] and is only mutated through [`GameEngine::step`],
/// [`GameEngine::start`] and the input mediator.
pub struct GameEngine<R: Rng = StdRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Create a new game engine; seeded from `config.rng_seed` when set
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> GameEngine<R> {
    /// Rejects configs whose starting snake would not fit the grid
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh game in the `NotStarted` phase
    pub fn reset(&mut self) -> GameState {
        let head = Position::new(
            self.config.start_column() as i32,
            (self.config.grid_height / 2) as i32,
        );

        let snake = Snake::new(head, Direction::Right, self.config.initial_snake_length);
        let mut state = GameState::new(
            snake,
            Position::new(0, 0),
            self.config.grid_width,
            self.config.grid_height,
        );

        // validated configs always leave free cells around the starting snake
        if let Some(food) = self.spawn_food_avoid_snake(&state) {
            state.food = food;
        }
        state
    }

    /// Leave `NotStarted`. Returns false when the game was already started.
    pub fn start(&self, state: &mut GameState) -> bool {
        if state.phase != Phase::NotStarted {
            return false;
        }
        state.phase = if self.config.await_first_input {
            Phase::AwaitingFirstInput
        } else {
            Phase::Running
        };
        true
    }

    /// Execute one tick of the game
    pub fn step(&mut self, state: &mut GameState) -> StepResult {
        if state.phase != Phase::Running {
            return StepResult::idle(state);
        }

        state.snake.direction = state.pending_direction;
        state.sync_previous_body();
        state.steps += 1;

        // Calculate new head position
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        if !state.is_in_bounds(new_head) {
            state.phase = Phase::Over;
            return StepResult {
                terminated: true,
                score: state.score,
                info: StepInfo {
                    collision: Some(Collision::Wall { at: new_head }),
                    ..StepInfo::default()
                },
            };
        }

        if let Some(index) = state.snake.segment_index(new_head) {
            return self.bite(state, index, new_head);
        }

        let ate_food = new_head == state.food;
        state.snake.advance(new_head, ate_food);
        debug_assert!(state.snake.is_contiguous());

        let mut board_full = false;
        if ate_food {
            state.score += self.config.food_score;
            state.apples += 1;
            match self.spawn_food_avoid_snake(state) {
                Some(food) => state.food = food,
                None => {
                    board_full = true;
                    state.phase = Phase::Over;
                }
            }
        }

        StepResult {
            terminated: board_full,
            score: state.score,
            info: StepInfo {
                ate_food,
                collision: None,
                board_full,
            },
        }
    }

    /// Head ran into segment `index` of the pre-move body
    fn bite(&mut self, state: &mut GameState, index: usize, new_head: Position) -> StepResult {
        let previous_len = state.snake.len();
        let removed_path = state.snake.body[index..].to_vec();
        let heading = state.snake.direction;

        let (removed, penalty, fatal) = match self.config.self_collision_policy {
            SelfCollisionPolicy::Fatal => {
                state.phase = Phase::Over;
                (0, 0, true)
            }
            SelfCollisionPolicy::TruncateAndPenalize => {
                // keep the front part up to the bite, the new head included
                let keep = (index + 1).max(2);
                state.snake.body.insert(0, new_head);
                state.snake.body.truncate(keep);

                debug_assert!(state.snake.is_contiguous());

                let removed = previous_len.saturating_sub(keep);
                let penalty = removed as u32 * self.config.bite_penalty_per_segment;
                state.score = state.score.saturating_sub(penalty);
                (removed, penalty, false)
            }
        };

        StepResult {
            terminated: fatal,
            score: state.score,
            info: StepInfo {
                ate_food: false,
                collision: Some(Collision::SelfBite(BiteReport {
                    index,
                    cell: new_head,
                    heading,
                    removed_path,
                    removed,
                    penalty,
                    fatal,
                })),
                board_full: false,
            },
        }
    }

    /// Spawn food at a uniformly random empty cell by rejection sampling.
    /// `None` only when the snake covers the whole grid.
    fn spawn_food_avoid_snake(&mut self, state: &GameState) -> Option<Position> {
        if state.snake.len() >= state.cell_count() {
            return None;
        }

        loop {
            let x = self.rng.gen_range(0..state.grid_width) as i32;
            let y = self.rng.gen_range(0..state.grid_height) as i32;
            let pos = Position::new(x, y);

            if !state.is_occupied_by_snake(pos) {
                return Some(pos);
            }
        }
    }
}
