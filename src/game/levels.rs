//! Level catalog and level progression
//!
//! Layouts are authored for a 20x20 board. Each one is a union of straight runs and
//! filled rectangles; every level shares the gate cell at the middle of the second row.

use std::collections::HashSet;

use super::state::GridPoint;

/// Level number a wrapped catalog returns to
pub const FIRST_LEVEL: u32 = 1;

/// Read-only layout for one level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub level_number: u32,
    pub width: i32,
    pub height: i32,
    pub obstacles: HashSet<GridPoint>,
    pub gate_position: GridPoint,
}

/// Gate cell for a board: horizontal midpoint, one row below the top edge
pub fn gate_position(width: i32) -> GridPoint {
    GridPoint::new(width / 2, 1)
}

/// `length` cells to the right of `(x, y)`, inclusive
pub fn horizontal_line(x: i32, y: i32, length: i32) -> impl Iterator<Item = GridPoint> {
    (0..length).map(move |i| GridPoint::new(x + i, y))
}

/// `length` cells downwards from `(x, y)`, inclusive
pub fn vertical_line(x: i32, y: i32, length: i32) -> impl Iterator<Item = GridPoint> {
    (0..length).map(move |i| GridPoint::new(x, y + i))
}

/// Filled `width` x `height` block with its top-left corner at `(x, y)`
pub fn rectangle(x: i32, y: i32, width: i32, height: i32) -> impl Iterator<Item = GridPoint> {
    (0..width).flat_map(move |dx| (0..height).map(move |dy| GridPoint::new(x + dx, y + dy)))
}

fn four_squares() -> impl Iterator<Item = GridPoint> {
    rectangle(13, 13, 3, 3)
        .chain(rectangle(4, 4, 3, 3))
        .chain(rectangle(4, 13, 3, 3))
        .chain(rectangle(13, 4, 3, 3))
}

fn obstacle_pattern(level_number: u32) -> Vec<GridPoint> {
    match level_number {
        // Horizontal bar
        1 => horizontal_line(5, 5, 10).collect(),
        // Vertical bar
        2 => vertical_line(10, 5, 10).collect(),
        // T
        3 => horizontal_line(5, 5, 10)
            .chain(vertical_line(10, 5, 10))
            .collect(),
        // I-beam
        4 => horizontal_line(5, 5, 10)
            .chain(vertical_line(10, 5, 10))
            .chain(vertical_line(9, 5, 10))
            .chain(horizontal_line(5, 14, 10))
            .collect(),
        // Tunnel
        5 => horizontal_line(5, 5, 10)
            .chain(vertical_line(10, 5, 4))
            .chain(vertical_line(9, 5, 4))
            .chain(vertical_line(10, 11, 4))
            .chain(vertical_line(9, 11, 4))
            .chain(horizontal_line(5, 14, 10))
            .collect(),
        6 => rectangle(13, 13, 3, 3)
            .chain(rectangle(4, 4, 3, 3))
            .collect(),
        7 => four_squares().collect(),
        // Five on a die
        8 => four_squares().chain(rectangle(9, 9, 2, 2)).collect(),
        // Shelves
        9 => horizontal_line(0, 5, 15)
            .chain(horizontal_line(5, 10, 15))
            .chain(horizontal_line(0, 15, 15))
            .collect(),
        // Columns
        10 => vertical_line(5, 4, 12)
            .chain(vertical_line(10, 4, 12))
            .chain(vertical_line(15, 4, 12))
            .collect(),
        // U-ramp
        11 => vertical_line(5, 5, 10)
            .chain(vertical_line(14, 5, 10))
            .chain(horizontal_line(5, 14, 10))
            .chain(rectangle(9, 8, 2, 3))
            .collect(),
        // Spiral
        12 => vertical_line(4, 4, 13)
            .chain(horizontal_line(4, 16, 13))
            .chain(vertical_line(16, 4, 13))
            .chain(horizontal_line(8, 4, 9))
            .chain(vertical_line(8, 5, 8))
            .chain(horizontal_line(8, 12, 5))
            .chain(vertical_line(12, 8, 5))
            .collect(),
        _ => Vec::new(),
    }
}

/// Layout for a level number on a `width` x `height` board
///
/// Total: unknown level numbers get an empty board. Obstacle cells that fall outside
/// the board or onto the gate are dropped, so the layout is valid for any board size.
pub fn level_layout(level_number: u32, width: i32, height: i32) -> LevelConfig {
    let gate = gate_position(width);
    let obstacles = obstacle_pattern(level_number)
        .into_iter()
        .filter(|p| p.x >= 0 && p.x < width && p.y >= 0 && p.y < height && *p != gate)
        .collect();

    LevelConfig {
        level_number,
        width,
        height,
        obstacles,
        gate_position: gate,
    }
}

/// Level that follows `current`, wrapping to [`FIRST_LEVEL`] after `level_count`
pub fn next_level(current: u32, level_count: u32) -> u32 {
    if current >= level_count {
        FIRST_LEVEL
    } else {
        current + 1
    }
}
