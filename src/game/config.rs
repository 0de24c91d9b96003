use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    #[default]
    Medium,
    High,
}

impl Difficulty {
    /// Milliseconds per simulation step
    pub fn step_duration_ms(&self) -> u32 {
        match self {
            Difficulty::Low => 130,
            Difficulty::Medium => 95,
            Difficulty::High => 70,
        }
    }

    pub fn next(&self) -> Difficulty {
        match self {
            Difficulty::Low => Difficulty::Medium,
            Difficulty::Medium => Difficulty::High,
            Difficulty::High => Difficulty::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Low => "low",
            Difficulty::Medium => "medium",
            Difficulty::High => "high",
        }
    }
}

/// What happens when the head runs into the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SelfCollisionPolicy {
    /// Game over
    Fatal,
    /// Cut the body at the bite and charge a score penalty per lost segment
    #[default]
    TruncateAndPenalize,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("initial snake length must be at least 3, got {0}")]
    SnakeTooShort(usize),
    #[error("grid {width}x{height} cannot fit a starting snake of length {length}")]
    GridTooSmall {
        width: usize,
        height: usize,
        length: usize,
    },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("failed to read config: {0}")]
    Io(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    /// Score awarded per food item
    pub food_score: u32,
    /// Score removed per segment lost to a self-bite
    pub bite_penalty_per_segment: u32,
    pub self_collision_policy: SelfCollisionPolicy,
    /// Hold the snake still after start until a direction is pressed
    pub await_first_input: bool,

    pub difficulty: Difficulty,
    /// Upper bound on wall time fed to the clock per frame
    pub max_frame_delta_ms: f64,

    pub wall_flash_ms: f64,
    pub self_bite_ms: f64,

    /// Seed for food placement; `None` draws from the thread rng
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            food_score: 10,
            bite_penalty_per_segment: 10,
            self_collision_policy: SelfCollisionPolicy::TruncateAndPenalize,
            await_first_input: true,
            difficulty: Difficulty::Medium,
            max_frame_delta_ms: 40.0,
            wall_flash_ms: 420.0,
            self_bite_ms: 760.0,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Old-school rules: biting yourself ends the game and the snake moves
    /// as soon as play starts.
    pub fn classic() -> Self {
        Self {
            self_collision_policy: SelfCollisionPolicy::Fatal,
            await_first_input: false,
            ..Default::default()
        }
    }

    /// Column the head starts in; the body trails to the left of it.
    pub fn start_column(&self) -> usize {
        self.initial_snake_length + 3
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_snake_length < 3 {
            return Err(ConfigError::SnakeTooShort(self.initial_snake_length));
        }
        // one free column ahead of the head, at least one spare row
        if self.start_column() + 2 > self.grid_width || self.grid_height < 3 {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
                length: self.initial_snake_length,
            });
        }
        if self.max_frame_delta_ms <= 0.0 {
            return Err(ConfigError::ZeroDuration("max_frame_delta_ms"));
        }
        if self.wall_flash_ms <= 0.0 {
            return Err(ConfigError::ZeroDuration("wall_flash_ms"));
        }
        if self.self_bite_ms <= 0.0 {
            return Err(ConfigError::ZeroDuration("self_bite_ms"));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: GameConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
    }

    #[test]
    fn test_difficulty_speeds() {
        assert_eq!(Difficulty::Low.step_duration_ms(), 130);
        assert_eq!(Difficulty::Medium.step_duration_ms(), 95);
        assert_eq!(Difficulty::High.step_duration_ms(), 70);
        assert_eq!(Difficulty::High.next(), Difficulty::Low);
    }

    #[test]
    fn test_classic_preset() {
        let config = GameConfig::classic();
        assert_eq!(config.self_collision_policy, SelfCollisionPolicy::Fatal);
        assert!(!config.await_first_input);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.initial_snake_length = 2;
        assert_eq!(config.validate(), Err(ConfigError::SnakeTooShort(2)));

        let config = GameConfig::new(7, 20);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooSmall { .. })
        ));

        let mut config = GameConfig::default();
        config.max_frame_delta_ms = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration("max_frame_delta_ms"))
        );

        assert!(GameConfig::small().validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "grid_width": 30, "difficulty": "high", "self_collision_policy": "fatal" }}"#
        )
        .unwrap();

        let config = GameConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.grid_width, 30);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.difficulty, Difficulty::High);
        assert_eq!(config.self_collision_policy, SelfCollisionPolicy::Fatal);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            GameConfig::from_json_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
