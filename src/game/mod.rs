//! Core game logic module
//!
//! Everything that decides how a game of Snake plays out lives here, free of any I/O,
//! timers or rendering. The async driver in `runtime` and the terminal UI in `modes`
//! build on top of it.

pub mod action;
pub mod board;
pub mod collision;
pub mod config;
pub mod engine;
pub mod food;
pub mod levels;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use board::Board;
pub use collision::{detect_collision, is_collision_detected, CollisionKind};
pub use config::{ConfigError, GameConfig};
pub use engine::{GameEngine, GameSnapshot, LoopDirective, TickOutcome};
pub use food::{FoodEaten, FoodItem, FoodSpawner, FoodTier};
pub use levels::{level_layout, next_level, LevelConfig};
pub use state::{GameState, GridPoint, Snake};
