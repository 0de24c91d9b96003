//! One game session on one cooperative timeline.
//!
//! [`GameSession`] ties the simulation to the clock, the effect tracker and
//! the peripheral collaborators. Everything is driven from [`GameSession::frame`]
//! and the input entry points; within a frame all due ticks finish before the
//! snapshot for rendering is taken.

use tracing::{debug, info};

use crate::audio::{Muted, SoundSink};
use crate::effects::{ActiveEffects, EffectTracker, WallFlash};
use crate::game::{
    Collision, ConfigError, Difficulty, Direction, FixedStepClock, GameConfig, GameEngine,
    GameEvent, GameState, Phase, Position, Submission, submit_direction,
};
use crate::metrics::GameMetrics;

/// Read-only view of everything the renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub snake: &'a [Position],
    /// Body before the last tick, for interpolation
    pub previous_snake: &'a [Position],
    pub direction: Direction,
    pub food: Position,
    pub grid_width: usize,
    pub grid_height: usize,
    pub phase: Phase,
    pub score: u32,
    pub apples: u32,
    /// Progress from the previous tick to the next, `[0, 1]`
    pub alpha: f64,
    pub effects: ActiveEffects<'a>,
    pub difficulty: Difficulty,
    pub status: &'a str,
    pub metrics: &'a GameMetrics,
    /// Bumped on every restart, so render-side caches know to start over
    pub round: u32,
    pub now_ms: f64,
}

pub struct GameSession {
    engine: GameEngine,
    state: GameState,
    clock: FixedStepClock,
    effects: EffectTracker,
    metrics: GameMetrics,
    sound: Box<dyn SoundSink>,
    difficulty: Difficulty,
    started: bool,
    round: u32,
    status: String,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_sound(config, Box::new(Muted))
    }

    pub fn with_sound(config: GameConfig, sound: Box<dyn SoundSink>) -> Result<Self, ConfigError> {
        let difficulty = config.difficulty;
        let clock = FixedStepClock::new(difficulty.step_duration_ms(), config.max_frame_delta_ms);
        let mut engine = GameEngine::new(config)?;
        let state = engine.reset();

        Ok(Self {
            engine,
            state,
            clock,
            effects: EffectTracker::new(),
            metrics: GameMetrics::new(),
            sound,
            difficulty,
            started: false,
            round: 0,
            status: String::from("Press Space to play."),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    /// Leave the start screen. Ignored once the session has started.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(difficulty = self.difficulty.label(), "session started");
        self.restart();
        self.emit(GameEvent::Started);
    }

    /// Throw the current game away and set up a fresh one.
    ///
    /// Clears effects, the pending direction and the clock. A session that
    /// was already started goes straight back to the started phase.
    pub fn restart(&mut self) {
        self.state = self.engine.reset();
        self.round = self.round.wrapping_add(1);
        self.effects.clear();
        self.clock.reset();
        self.metrics.on_game_start();
        if self.started {
            self.engine.start(&mut self.state);
        }
        self.status = match self.state.phase {
            Phase::NotStarted => String::from("Press Space to play."),
            Phase::AwaitingFirstInput => String::from("Press an arrow key to move."),
            _ => String::new(),
        };
        self.emit(GameEvent::Reset);
    }

    /// Feed a directional intent from any input source
    pub fn submit_direction(&mut self, direction: Direction) -> Submission {
        let submission = submit_direction(&mut self.state, direction);
        match submission {
            Submission::Started => {
                // the first move waits a full step from now
                self.clock.reset_accumulator();
                self.status.clear();
                self.emit(GameEvent::FirstMove);
            }
            Submission::Rejected(reason) => {
                debug!(?direction, ?reason, "direction ignored");
            }
            Submission::Queued => {}
        }
        submission
    }

    /// Change tick cadence; simulation state is untouched
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if difficulty == self.difficulty {
            return;
        }
        self.difficulty = difficulty;
        self.clock.set_step_duration(difficulty.step_duration_ms());
        info!(
            difficulty = difficulty.label(),
            step_ms = difficulty.step_duration_ms(),
            "difficulty changed"
        );
    }

    pub fn cycle_difficulty(&mut self) {
        self.set_difficulty(self.difficulty.next());
    }

    /// Run every tick due by `now_ms`, then snapshot the result
    pub fn frame(&mut self, now_ms: f64) -> FrameSnapshot<'_> {
        let due = self.clock.advance(now_ms);
        for _ in 0..due {
            self.tick(now_ms);
        }
        self.effects.expire(now_ms);
        if self.state.phase == Phase::Running {
            self.metrics.tick(now_ms);
        }
        self.snapshot(now_ms)
    }

    /// Snapshot without advancing time
    pub fn snapshot(&self, now_ms: f64) -> FrameSnapshot<'_> {
        FrameSnapshot {
            snake: &self.state.snake.body,
            previous_snake: &self.state.previous_body,
            direction: self.state.snake.direction,
            food: self.state.food,
            grid_width: self.state.grid_width,
            grid_height: self.state.grid_height,
            phase: self.state.phase,
            score: self.state.score,
            apples: self.state.apples,
            alpha: self.clock.alpha(),
            effects: self.effects.active(),
            difficulty: self.difficulty,
            status: &self.status,
            metrics: &self.metrics,
            round: self.round,
            now_ms,
        }
    }

    fn tick(&mut self, now_ms: f64) {
        let result = self.engine.step(&mut self.state);

        let wall_flash_ms = self.engine.config().wall_flash_ms;
        let self_bite_ms = self.engine.config().self_bite_ms;
        match &result.info.collision {
            Some(Collision::Wall { at }) => {
                self.effects
                    .flash_wall(now_ms, wall_flash_ms, WallFlash { at: *at });
            }
            Some(Collision::SelfBite(report)) => {
                self.effects.bite(now_ms, self_bite_ms, report.into());
            }
            None => {}
        }

        for event in result.events() {
            self.emit(event);
        }
    }

    fn emit(&mut self, event: GameEvent) {
        match event {
            GameEvent::SelfCollision {
                removed,
                penalty,
                fatal: false,
            } => {
                info!(removed, penalty, score = self.state.score, "self bite");
                if removed > 0 {
                    self.status = format!("Self bite! -{penalty}");
                }
            }
            GameEvent::BoardCleared => {
                self.status = String::from("Board cleared! Press R to play again.");
            }
            event if event.is_terminal() => {
                self.status = String::from("Game over. Press R to restart.");
            }
            _ => {}
        }

        if event.is_terminal() {
            info!(
                ?event,
                score = self.state.score,
                apples = self.state.apples,
                steps = self.state.steps,
                "game over"
            );
            self.metrics
                .on_game_over(self.state.score, self.state.apples);
        }

        self.sound.on_event(&event);
    }
}
