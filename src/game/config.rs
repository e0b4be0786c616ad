use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::GridPoint;

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("board must be at least 2x2 cells, got {width}x{height}")]
    BoardTooSmall { width: i32, height: i32 },
    #[error("initial snake length must be at least 1")]
    EmptySnake,
    #[error("minimum tick interval must be positive")]
    ZeroMinTick,
    #[error("base tick interval {base_ms}ms is below the minimum {min_ms}ms")]
    BaseBelowMinimum { base_ms: u64, min_ms: u64 },
    #[error("bonus food chance must be within [0, 1], got {0}")]
    BonusChanceOutOfRange(f64),
    #[error("at least one apple must be required to open the gate")]
    ZeroGateThreshold,
    #[error("level count must be at least 1")]
    NoLevels,
    #[error("starting level {starting} is outside 1..={count}")]
    StartingLevelOutOfRange { starting: u32, count: u32 },
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub board_width: i32,
    /// Height of the game grid
    pub board_height: i32,
    /// Initial length of the snake at the start of every level
    pub initial_snake_length: usize,
    /// Head position of a freshly spawned snake; the body trails to the left
    pub snake_start: GridPoint,

    // Speed
    /// Tick interval on the first level, in milliseconds
    pub base_tick_ms: u64,
    /// Interval reduction per completed level, in milliseconds
    pub tick_step_ms: u64,
    /// Fastest allowed tick interval, in milliseconds
    pub min_tick_ms: u64,

    // Food
    /// Extra growth ticks queued after eating
    pub growth_per_food: u32,
    pub normal_food_score: u32,
    pub bonus_food_score: u32,
    /// Probability that a spawned food item is a bonus one
    pub bonus_food_chance: f64,
    /// Apples to eat in a level before the gate opens
    pub apples_to_open_gate: u32,

    // Levels
    /// Number of levels before the catalog wraps around
    pub level_count: u32,
    pub starting_level: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 20,
            board_height: 20,
            initial_snake_length: 10,
            snake_start: GridPoint::new(3, 1),
            base_tick_ms: 200,
            tick_step_ms: 20,
            min_tick_ms: 80,
            growth_per_food: 4,
            normal_food_score: 5,
            bonus_food_score: 10,
            bonus_food_chance: 0.2,
            apples_to_open_gate: 5,
            level_count: 12,
            starting_level: 1,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            board_width: width,
            board_height: height,
            ..Default::default()
        }
    }

    /// Load a JSON configuration file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to deserialize config")?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {:?}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_width < 2 || self.board_height < 2 {
            return Err(ConfigError::BoardTooSmall {
                width: self.board_width,
                height: self.board_height,
            });
        }
        if self.initial_snake_length == 0 {
            return Err(ConfigError::EmptySnake);
        }
        if self.min_tick_ms == 0 {
            return Err(ConfigError::ZeroMinTick);
        }
        if self.base_tick_ms < self.min_tick_ms {
            return Err(ConfigError::BaseBelowMinimum {
                base_ms: self.base_tick_ms,
                min_ms: self.min_tick_ms,
            });
        }
        if !(0.0..=1.0).contains(&self.bonus_food_chance) {
            return Err(ConfigError::BonusChanceOutOfRange(self.bonus_food_chance));
        }
        if self.apples_to_open_gate == 0 {
            return Err(ConfigError::ZeroGateThreshold);
        }
        if self.level_count == 0 {
            return Err(ConfigError::NoLevels);
        }
        if self.starting_level == 0 || self.starting_level > self.level_count {
            return Err(ConfigError::StartingLevelOutOfRange {
                starting: self.starting_level,
                count: self.level_count,
            });
        }
        Ok(())
    }

    /// Tick interval after `levels_completed` levels
    ///
    /// `max(base - completed * step, min)`, never increasing as levels are completed.
    pub fn tick_interval(&self, levels_completed: u32) -> Duration {
        let reduction = self.tick_step_ms.saturating_mul(u64::from(levels_completed));
        let ms = self
            .base_tick_ms
            .saturating_sub(reduction)
            .max(self.min_tick_ms);
        Duration::from_millis(ms)
    }
}
