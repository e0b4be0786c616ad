use std::collections::HashSet;

use super::levels::LevelConfig;
use super::state::GridPoint;

/// Playing field for the current level
///
/// Only [`Board::setup_level`] and [`Board::open_gate`] mutate it; the gate opens at most
/// once per level and never closes again until the next setup.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: i32,
    height: i32,
    obstacles: HashSet<GridPoint>,
    gate_position: GridPoint,
    gate_open: bool,
}

impl Board {
    pub fn new(level: &LevelConfig) -> Self {
        let mut board = Self {
            width: 0,
            height: 0,
            obstacles: HashSet::new(),
            gate_position: level.gate_position,
            gate_open: false,
        };
        board.setup_level(level);
        board
    }

    /// Replace dimensions, obstacles and gate with the level's, closing the gate
    pub fn setup_level(&mut self, level: &LevelConfig) {
        self.obstacles.clear();
        self.width = level.width;
        self.height = level.height;
        self.obstacles
            .extend(level.obstacles.iter().filter(|p| **p != level.gate_position));
        self.gate_position = level.gate_position;
        self.gate_open = false;
    }

    /// Idempotent
    pub fn open_gate(&mut self) {
        self.gate_open = true;
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn obstacles(&self) -> &HashSet<GridPoint> {
        &self.obstacles
    }

    pub fn gate_position(&self) -> GridPoint {
        self.gate_position
    }

    pub fn is_gate_open(&self) -> bool {
        self.gate_open
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: GridPoint) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn is_obstacle(&self, pos: GridPoint) -> bool {
        self.obstacles.contains(&pos)
    }

    /// True when `pos` is the gate cell and the gate has been opened
    pub fn is_open_gate(&self, pos: GridPoint) -> bool {
        self.gate_open && pos == self.gate_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::levels::level_layout;

    #[test]
    fn test_board_from_level() {
        let board = Board::new(&level_layout(2, 20, 20));
        assert_eq!(board.width(), 20);
        assert_eq!(board.height(), 20);
        assert_eq!(board.obstacles().len(), 10);
        assert_eq!(board.gate_position(), GridPoint::new(10, 1));
        assert!(!board.is_gate_open());
    }

    #[test]
    fn test_gate_opens_once_and_resets_on_setup() {
        let mut board = Board::new(&level_layout(1, 20, 20));
        board.open_gate();
        board.open_gate();
        assert!(board.is_gate_open());
        assert!(board.is_open_gate(GridPoint::new(10, 1)));
        assert!(!board.is_open_gate(GridPoint::new(9, 1)));

        board.setup_level(&level_layout(7, 20, 20));
        assert!(!board.is_gate_open());
        assert_eq!(board.obstacles().len(), 36);
        assert!(!board.is_obstacle(GridPoint::new(8, 5)));
    }

    #[test]
    fn test_gate_never_becomes_an_obstacle() {
        let mut level = level_layout(1, 20, 20);
        level.obstacles.insert(level.gate_position);
        let board = Board::new(&level);
        assert!(!board.is_obstacle(board.gate_position()));
    }

    #[test]
    fn test_bounds_checking() {
        let board = Board::new(&level_layout(0, 20, 20));
        assert!(board.is_in_bounds(GridPoint::new(0, 0)));
        assert!(board.is_in_bounds(GridPoint::new(19, 19)));
        assert!(!board.is_in_bounds(GridPoint::new(-1, 0)));
        assert!(!board.is_in_bounds(GridPoint::new(20, 0)));
        assert!(!board.is_in_bounds(GridPoint::new(0, 20)));
    }
}
