//! Gate Snake - a level-based Snake game with an exit gate and a leaderboard
//!
//! This library provides:
//! - Core game rules: snake, board, food, collisions, levels (game module)
//! - The async tick loop and live session (runtime module)
//! - Score persistence (leaderboard module)
//! - Terminal input, rendering and the interactive mode (input, render, modes)

pub mod game;
pub mod input;
pub mod leaderboard;
pub mod modes;
pub mod render;
pub mod runtime;
