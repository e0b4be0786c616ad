use super::board::Board;
use super::state::Snake;

/// Type of collision that ended the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Head left the board
    Boundary,
    /// Head ran into the snake's own body
    SelfCollision,
    /// Head hit a wall cell
    Obstacle,
}

/// Check the snake's current head against the board
///
/// A head off the board always collides, whatever the gate state. Reaching the gate
/// is handled by the engine after this check.
pub fn detect_collision(board: &Board, snake: &Snake) -> Option<CollisionKind> {
    let head = snake.head();

    if !board.is_in_bounds(head) {
        return Some(CollisionKind::Boundary);
    }
    if snake.is_self_collision() {
        return Some(CollisionKind::SelfCollision);
    }
    if board.is_obstacle(head) {
        return Some(CollisionKind::Obstacle);
    }
    None
}

pub fn is_collision_detected(board: &Board, snake: &Snake) -> bool {
    detect_collision(board, snake).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Direction;
    use crate::game::levels::{level_layout, LevelConfig};
    use crate::game::state::GridPoint;

    fn empty_board() -> Board {
        Board::new(&level_layout(0, 10, 10))
    }

    #[test]
    fn test_no_collision_in_open_space() {
        let snake = Snake::new(GridPoint::new(5, 5), Direction::Right, 3);
        assert_eq!(detect_collision(&empty_board(), &snake), None);
        assert!(!is_collision_detected(&empty_board(), &snake));
    }

    #[test]
    fn test_boundary_collision() {
        for head in [
            GridPoint::new(-1, 5),
            GridPoint::new(10, 5),
            GridPoint::new(5, -1),
            GridPoint::new(5, 10),
        ] {
            let snake = Snake::new(head, Direction::Right, 1);
            assert_eq!(
                detect_collision(&empty_board(), &snake),
                Some(CollisionKind::Boundary)
            );
        }
    }

    #[test]
    fn test_boundary_collision_ignores_gate_state_elsewhere() {
        let mut board = empty_board();
        board.open_gate();
        let snake = Snake::new(GridPoint::new(5, -1), Direction::Up, 1);
        assert_eq!(detect_collision(&board, &snake), Some(CollisionKind::Boundary));
    }

    #[test]
    fn test_off_board_head_collides_even_on_open_gate() {
        let level = LevelConfig {
            level_number: 0,
            width: 10,
            height: 10,
            obstacles: Default::default(),
            gate_position: GridPoint::new(5, -1),
        };
        let mut board = Board::new(&level);
        let snake = Snake::new(GridPoint::new(5, -1), Direction::Up, 1);
        assert!(is_collision_detected(&board, &snake));

        board.open_gate();
        assert_eq!(detect_collision(&board, &snake), Some(CollisionKind::Boundary));
    }

    #[test]
    fn test_open_gate_on_board_is_not_a_collision() {
        let mut board = Board::new(&level_layout(1, 20, 20));
        board.open_gate();
        let snake = Snake::new(board.gate_position(), Direction::Up, 1);
        assert_eq!(detect_collision(&board, &snake), None);
    }

    #[test]
    fn test_obstacle_collision() {
        let board = Board::new(&level_layout(1, 20, 20));
        let snake = Snake::new(GridPoint::new(5, 5), Direction::Down, 2);
        assert_eq!(detect_collision(&board, &snake), Some(CollisionKind::Obstacle));
    }

    #[test]
    fn test_self_collision() {
        let snake = Snake::from_segments(
            vec![
                GridPoint::new(4, 4),
                GridPoint::new(5, 4),
                GridPoint::new(5, 5),
                GridPoint::new(4, 5),
                GridPoint::new(4, 4),
            ],
            Direction::Up,
        )
        .unwrap();
        assert_eq!(
            detect_collision(&empty_board(), &snake),
            Some(CollisionKind::SelfCollision)
        );
    }
}
