use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use glide_snake::audio::{Muted, SoundSink, TerminalBell};
use glide_snake::game::{Difficulty, GameConfig, SelfCollisionPolicy};
use glide_snake::modes::HumanMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glide_snake")]
#[command(version, about = "Smooth-motion snake for the terminal")]
struct Cli {
    /// JSON file with a game configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Game speed
    #[arg(long, value_enum)]
    difficulty: Option<Difficulty>,

    /// Biting yourself ends the game and the snake moves right away
    #[arg(long)]
    classic: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the terminal bell
    #[arg(long)]
    mute: bool,

    /// Write logs here; nothing is logged otherwise since the UI owns the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None if self.classic => GameConfig::classic(),
            None => GameConfig::default(),
        };

        if self.classic {
            config.self_collision_policy = SelfCollisionPolicy::Fatal;
            config.await_first_input = false;
        }
        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if self.seed.is_some() {
            config.rng_seed = self.seed;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    info!(?config, "starting");

    let sound: Box<dyn SoundSink> = if cli.mute {
        Box::new(Muted)
    } else {
        Box::new(TerminalBell::new())
    };

    let mut human_mode = HumanMode::new(config, sound)?;
    human_mode.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["glide_snake"]);
        let config = cli.game_config().unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "glide_snake",
            "--width",
            "30",
            "--height",
            "15",
            "--difficulty",
            "high",
            "--seed",
            "9",
        ]);
        let config = cli.game_config().unwrap();
        assert_eq!(config.grid_width, 30);
        assert_eq!(config.grid_height, 15);
        assert_eq!(config.difficulty, Difficulty::High);
        assert_eq!(config.rng_seed, Some(9));
    }

    #[test]
    fn test_classic_flag() {
        let cli = Cli::parse_from(["glide_snake", "--classic"]);
        let config = cli.game_config().unwrap();
        assert_eq!(config.self_collision_policy, SelfCollisionPolicy::Fatal);
        assert!(!config.await_first_input);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"grid_width": 40, "difficulty": "low"}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from(["glide_snake", "--config", &path, "--difficulty", "high"]);
        let config = cli.game_config().unwrap();
        assert_eq!(config.grid_width, 40);
        assert_eq!(config.difficulty, Difficulty::High);
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let cli = Cli::parse_from(["glide_snake", "--width", "4"]);
        assert!(cli.game_config().is_err());
    }
}
