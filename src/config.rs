use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnakeError};
use crate::snake::Direction;

/// Configuration for the game, fixed once the game has started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cells per axis of the square board
    pub grid_size: usize,
    /// Milliseconds between ticks
    pub tick_ms: u64,
    pub initial_snake_length: usize,
    pub initial_direction: Direction,
    /// Points awarded for each food eaten
    pub food_reward: u32,
    /// Logical width and height of the drawing surface
    pub canvas_size: f32,
    /// Minimum drag distance, in logical units, that counts as a swipe
    pub swipe_threshold: f32,
    pub high_score_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            tick_ms: 100,
            initial_snake_length: 3,
            initial_direction: Direction::Right,
            food_reward: 10,
            canvas_size: 400.0,
            swipe_threshold: 30.0,
            high_score_path: PathBuf::from(".gridsnake_high_score"),
        }
    }
}

impl GameConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Logical size of one cell on the drawing surface
    pub fn cell_size(&self) -> f32 {
        self.canvas_size / self.grid_size as f32
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(invalid("grid size must be at least 2"));
        }
        if self.tick_ms == 0 {
            return Err(invalid("tick period must be positive"));
        }
        if self.initial_snake_length == 0 {
            return Err(invalid("initial snake length must be at least 1"));
        }
        // the body trails left of the centre column
        if self.initial_snake_length > self.grid_size / 2 + 1 {
            return Err(invalid(format!(
                "a snake of length {} does not fit left of the centre of a {}x{} grid",
                self.initial_snake_length, self.grid_size, self.grid_size
            )));
        }
        if self.initial_snake_length >= self.cell_count() {
            return Err(invalid("the initial snake leaves no room for food"));
        }
        if self.initial_direction == Direction::Left && self.initial_snake_length > 1 {
            return Err(invalid("initial direction points into the snake's own body"));
        }
        // the best possible score has to fit the score counter
        let best_score = self.food_reward as u64 * self.cell_count() as u64;
        if best_score > u32::MAX as u64 {
            return Err(invalid(format!(
                "a reward of {} per food can overflow the score on a {}x{} grid",
                self.food_reward, self.grid_size, self.grid_size
            )));
        }
        if !(self.canvas_size > 0.0) {
            return Err(invalid("canvas size must be positive"));
        }
        if !(self.swipe_threshold > 0.0) {
            return Err(invalid("swipe threshold must be positive"));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> SnakeError {
    SnakeError::InvalidConfig(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.tick_period(), Duration::from_millis(100));
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.initial_direction, Direction::Right);
        assert_eq!(config.food_reward, 10);
        assert_eq!(config.cell_size(), 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_configs() {
        let bad = [
            GameConfig {
                grid_size: 1,
                ..Default::default()
            },
            GameConfig {
                tick_ms: 0,
                ..Default::default()
            },
            GameConfig {
                initial_snake_length: 0,
                ..Default::default()
            },
            GameConfig {
                initial_snake_length: 12,
                ..Default::default()
            },
            GameConfig {
                initial_direction: Direction::Left,
                ..Default::default()
            },
            GameConfig {
                swipe_threshold: 0.0,
                ..Default::default()
            },
            GameConfig {
                food_reward: u32::MAX / 100,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(SnakeError::InvalidConfig(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_largest_reward_that_fits() {
        let config = GameConfig {
            food_reward: u32::MAX / 400,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "grid_size": 12, "initial_direction": "up" }"#).unwrap();
        assert_eq!(config.grid_size, 12);
        assert_eq!(config.initial_direction, Direction::Up);
        assert_eq!(config.tick_ms, 100);
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("gridsnake-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "tick_ms": 250, "food_reward": 5 }"#).unwrap();

        let config = GameConfig::from_json_file(&path).unwrap();
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.food_reward, 5);
        assert_eq!(config.grid_size, 20);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_parse_error_names_the_cause() {
        let path = std::env::temp_dir().join(format!("gridsnake-bad-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "grid_size": "big" }"#).unwrap();

        let error = GameConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(error, SnakeError::ConfigParse { .. }));
        assert!(error.to_string().contains("invalid type"), "{}", error);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("gridsnake-config-does-not-exist.json");
        assert!(matches!(
            GameConfig::from_json_file(&path),
            Err(SnakeError::Io { .. })
        ));
    }
}
