use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A cell coordinate on the game grid
///
/// `(0, 0)` is the top-left corner; x grows to the right and y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// Lifecycle state of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    /// Fresh game loaded, waiting for the player to start
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// The snake in the game
///
/// The body always holds at least one segment. The head lives at the front of the
/// deque; moving pushes a new head and (unless growing) pops the tail.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<GridPoint>,
    direction: Direction,
}

impl Snake {
    /// Create a new snake with given head position and heading
    ///
    /// The remaining `length - 1` segments trail behind the head, opposite to the heading.
    /// A length of zero is treated as one.
    pub fn new(head: GridPoint, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.opposite().delta();
        let body = (0..length.max(1) as i32)
            .map(|i| head.moved_by(dx * i, dy * i))
            .collect();

        Self { body, direction }
    }

    /// Build a snake from explicit segments, head first
    ///
    /// Returns `None` for an empty segment list.
    pub fn from_segments(segments: Vec<GridPoint>, direction: Direction) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            body: segments.into(),
            direction,
        })
    }

    /// Get the head position
    pub fn head(&self) -> GridPoint {
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// All segments, head first
    pub fn body(&self) -> impl ExactSizeIterator<Item = &GridPoint> + '_ {
        self.body.iter()
    }

    /// Check if any segment (head included) occupies the position
    pub fn occupies(&self, pos: GridPoint) -> bool {
        self.body.contains(&pos)
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: GridPoint) -> bool {
        self.body.iter().skip(1).any(|segment| *segment == pos)
    }

    /// Where the head lands on the next move; ignores bounds and obstacles
    pub fn next_head_position(&self) -> GridPoint {
        self.head().moved_in_direction(self.direction)
    }

    /// Move snake in current direction, growing if should_grow is true
    pub fn move_snake(&mut self, should_grow: bool) {
        let new_head = self.next_head_position();
        self.body.push_front(new_head);

        if !should_grow {
            self.body.pop_back();
        }
    }

    /// True when the current head overlaps another segment
    pub fn is_self_collision(&self) -> bool {
        self.collides_with_body(self.head())
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_position_movement() {
        let pos = GridPoint::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), GridPoint::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), GridPoint::new(4, 5));
        assert_eq!(pos.moved_in_direction(Direction::Down), GridPoint::new(5, 6));
        assert_eq!(pos.moved_in_direction(Direction::Up), GridPoint::new(5, 4));
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(GridPoint::new(3, 1), Direction::Right, 10);
        assert_eq!(snake.len(), 10);
        assert_eq!(snake.head(), GridPoint::new(3, 1));
        assert_eq!(snake.body().last().copied().unwrap(), GridPoint::new(-6, 1));
        assert_eq!(snake.direction(), Direction::Right);
    }

    #[test]
    fn test_zero_length_snake_has_a_head() {
        let snake = Snake::new(GridPoint::new(2, 2), Direction::Up, 0);
        assert_eq!(snake.len(), 1);
        assert!(Snake::from_segments(Vec::new(), Direction::Up).is_none());
    }

    #[test]
    fn test_next_head_does_not_mutate() {
        let snake = Snake::new(GridPoint::new(0, 0), Direction::Left, 3);
        assert_eq!(snake.next_head_position(), GridPoint::new(-1, 0));
        assert_eq!(snake.head(), GridPoint::new(0, 0));
    }

    #[test]
    fn test_snake_movement() {
        let mut snake = Snake::new(GridPoint::new(5, 5), Direction::Right, 3);

        snake.move_snake(false);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), GridPoint::new(6, 5));
        assert_eq!(snake.body().last().copied().unwrap(), GridPoint::new(4, 5));

        snake.move_snake(true);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), GridPoint::new(7, 5));
        assert_eq!(snake.body().last().copied().unwrap(), GridPoint::new(4, 5));
    }

    #[test]
    fn test_self_collision_uses_current_head() {
        // Head at (5,5) with the rest of the body curling around it
        let mut snake = Snake::from_segments(
            vec![
                GridPoint::new(5, 5),
                GridPoint::new(6, 5),
                GridPoint::new(6, 4),
                GridPoint::new(5, 4),
                GridPoint::new(4, 4),
            ],
            Direction::Up,
        )
        .unwrap();
        assert!(!snake.is_self_collision());

        snake.move_snake(false);
        assert_eq!(snake.head(), GridPoint::new(5, 4));
        assert!(snake.is_self_collision());
    }

    #[test]
    fn test_collision_detection() {
        let snake = Snake::new(GridPoint::new(5, 5), Direction::Right, 3);
        assert!(!snake.collides_with_body(GridPoint::new(5, 5))); // head
        assert!(snake.collides_with_body(GridPoint::new(4, 5))); // body
        assert!(!snake.collides_with_body(GridPoint::new(10, 10))); // empty
        assert!(snake.occupies(GridPoint::new(5, 5)));
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_move_length_invariant(
            len in 1usize..30,
            dir in any_direction(),
            moves in prop::collection::vec(any::<bool>(), 0..40),
        ) {
            let mut snake = Snake::new(GridPoint::new(0, 0), dir, len);
            for grow in moves {
                let before = snake.len();
                let expected_head = snake.next_head_position();
                snake.move_snake(grow);
                prop_assert_eq!(snake.head(), expected_head);
                prop_assert_eq!(snake.len(), if grow { before + 1 } else { before });
            }
        }
    }
}
