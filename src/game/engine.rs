use std::time::{Duration, SystemTime};

use log::{debug, info};

use super::{
    action::Direction,
    board::Board,
    collision::{detect_collision, CollisionKind},
    config::{ConfigError, GameConfig},
    food::{FoodItem, FoodSpawner},
    levels::{level_layout, next_level},
    state::{GameState, Snake},
};

/// What the tick loop should do after an engine transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopDirective {
    /// (Re)start the loop with this interval
    Start(Duration),
    Stop,
}

/// Result of one engine tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing changed
    Idle,
    /// Snake moved one cell
    Moved { ate_food: bool, gate_opened: bool },
    /// Snake went through the open gate; the next level is loaded
    LevelAdvanced { level: u32, interval: Duration },
    GameOver(CollisionKind),
}

impl TickOutcome {
    /// Loop change implied by this tick, if any
    pub fn loop_directive(&self) -> Option<LoopDirective> {
        match self {
            TickOutcome::LevelAdvanced { interval, .. } => Some(LoopDirective::Start(*interval)),
            TickOutcome::GameOver(_) => Some(LoopDirective::Stop),
            TickOutcome::Idle | TickOutcome::Moved { .. } => None,
        }
    }

    /// Whether observers need to re-read state
    pub fn changed_state(&self) -> bool {
        !matches!(self, TickOutcome::Idle)
    }
}

/// Read-only copy of everything a UI needs to draw a frame
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub snake: Snake,
    pub board: Board,
    pub food: Option<FoodItem>,
    pub score: u32,
    pub current_level: u32,
    pub total_levels_completed: u32,
    pub state: GameState,
    pub game_over_at: Option<SystemTime>,
    pub apples_eaten_in_level: u32,
    pub apples_to_open_gate: u32,
    pub tick_interval: Duration,
}

/// Authoritative state machine for one game session
///
/// Owns snake, board, food, score and level progress. Commands never fail: a command
/// that does not apply to the current state is ignored. The engine does not drive
/// time itself; callers invoke [`GameEngine::tick`] and honour the returned
/// [`LoopDirective`]s.
pub struct GameEngine {
    config: GameConfig,
    spawner: FoodSpawner,
    snake: Snake,
    board: Board,
    food: Option<FoodItem>,
    score: u32,
    current_level: u32,
    total_levels_completed: u32,
    state: GameState,
    game_over_at: Option<SystemTime>,
    direction_changed_this_tick: bool,
    apples_eaten_in_level: u32,
    grow_buffer: u32,
}

impl GameEngine {
    /// Create an engine with an entropy-seeded food spawner, in the Menu state
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawner = FoodSpawner::new(&config);
        Ok(Self::with_spawner(config, spawner))
    }

    /// Create an engine whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawner = FoodSpawner::seeded(&config, seed);
        Ok(Self::with_spawner(config, spawner))
    }

    fn with_spawner(config: GameConfig, mut spawner: FoodSpawner) -> Self {
        let level = config.starting_level;
        let board = Board::new(&level_layout(level, config.board_width, config.board_height));
        let snake = Self::spawn_snake(&config);
        let food = spawner.create_food_item(&board, &snake);

        Self {
            config,
            spawner,
            snake,
            board,
            food,
            score: 0,
            current_level: level,
            total_levels_completed: 0,
            state: GameState::Menu,
            game_over_at: None,
            direction_changed_this_tick: false,
            apples_eaten_in_level: 0,
            grow_buffer: 0,
        }
    }

    fn spawn_snake(config: &GameConfig) -> Snake {
        Snake::new(
            config.snake_start,
            Direction::Right,
            config.initial_snake_length,
        )
    }

    /// Reset everything for a fresh game on the starting level, in the Menu state
    pub fn load_new_game(&mut self) -> LoopDirective {
        self.current_level = self.config.starting_level;
        self.score = 0;
        self.total_levels_completed = 0;
        self.game_over_at = None;
        self.load_level();
        self.state = GameState::Menu;
        info!("New game loaded on level {}", self.current_level);
        LoopDirective::Stop
    }

    /// Load a new game and begin playing it
    pub fn start_new_game(&mut self) -> LoopDirective {
        self.load_new_game();
        self.state = GameState::Playing;
        info!("Game started");
        LoopDirective::Start(self.tick_interval())
    }

    /// Playing -> Paused; `None` from any other state
    pub fn pause_game(&mut self) -> Option<LoopDirective> {
        if self.state != GameState::Playing {
            return None;
        }
        self.state = GameState::Paused;
        info!("Game paused");
        Some(LoopDirective::Stop)
    }

    /// Paused -> Playing; `None` from any other state
    pub fn resume_game(&mut self) -> Option<LoopDirective> {
        if self.state != GameState::Paused {
            return None;
        }
        self.state = GameState::Playing;
        info!("Game resumed");
        Some(LoopDirective::Start(self.tick_interval()))
    }

    /// Turn the snake, at most once per tick and never back onto itself
    ///
    /// Returns whether the heading changed.
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        if self.direction_changed_this_tick {
            return false;
        }
        if self.snake.direction().is_opposite(direction) {
            return false;
        }
        self.snake.set_direction(direction);
        self.direction_changed_this_tick = true;
        true
    }

    /// Advance the game by one step
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != GameState::Playing {
            return TickOutcome::Idle;
        }
        self.direction_changed_this_tick = false;

        let next_head = self.snake.next_head_position();
        let mut ate_food = false;
        let mut gate_opened = false;

        let food = self.food;
        match food {
            Some(food) if food.position() == next_head => {
                ate_food = true;
                gate_opened = self.eat(food);
            }
            _ if self.grow_buffer > 0 => {
                self.snake.move_snake(true);
                self.grow_buffer -= 1;
            }
            _ => self.snake.move_snake(false),
        }

        if let Some(collision) = detect_collision(&self.board, &self.snake) {
            self.game_over(collision);
            return TickOutcome::GameOver(collision);
        }

        if self.board.is_open_gate(self.snake.head()) {
            return self.advance_level();
        }

        TickOutcome::Moved {
            ate_food,
            gate_opened,
        }
    }

    /// Returns true when this food opened the gate
    fn eat(&mut self, food: FoodItem) -> bool {
        self.grow_buffer = self.config.growth_per_food;
        self.snake.move_snake(true);

        let result = self.spawner.handle_food_eaten(
            &self.board,
            &self.snake,
            &food,
            self.apples_eaten_in_level,
        );
        self.score += result.score_value;
        self.apples_eaten_in_level = result.apples_eaten_in_level;
        if result.should_open_gate {
            self.board.open_gate();
            info!(
                "Gate opened on level {} after {} apples",
                self.current_level, self.apples_eaten_in_level
            );
        }
        self.food = result.next_food;
        debug!(
            "Ate food worth {} (score {}, apples {})",
            result.score_value, self.score, self.apples_eaten_in_level
        );
        result.should_open_gate
    }

    fn game_over(&mut self, collision: CollisionKind) {
        self.state = GameState::GameOver;
        self.game_over_at = Some(SystemTime::now());
        info!(
            "Game over ({:?}) with score {} on level {}",
            collision, self.score, self.current_level
        );
    }

    fn advance_level(&mut self) -> TickOutcome {
        self.total_levels_completed += 1;
        self.current_level = next_level(self.current_level, self.config.level_count);
        self.load_level();
        let interval = self.tick_interval();
        info!(
            "Advanced to level {} ({} completed, tick {:?})",
            self.current_level, self.total_levels_completed, interval
        );
        TickOutcome::LevelAdvanced {
            level: self.current_level,
            interval,
        }
    }

    /// Fresh board, snake and food for `current_level`; clears per-level counters
    fn load_level(&mut self) {
        let layout = level_layout(
            self.current_level,
            self.config.board_width,
            self.config.board_height,
        );
        self.board.setup_level(&layout);
        self.snake = Self::spawn_snake(&self.config);
        self.food = self.spawner.create_food_item(&self.board, &self.snake);
        self.apples_eaten_in_level = 0;
        self.grow_buffer = 0;
        self.direction_changed_this_tick = false;
    }

    /// Current interval between ticks
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval(self.total_levels_completed)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn food(&self) -> Option<&FoodItem> {
        self.food.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn total_levels_completed(&self) -> u32 {
        self.total_levels_completed
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn game_over_at(&self) -> Option<SystemTime> {
        self.game_over_at
    }

    pub fn apples_eaten_in_level(&self) -> u32 {
        self.apples_eaten_in_level
    }

    /// Pending growth steps from the last meal
    pub fn grow_buffer(&self) -> u32 {
        self.grow_buffer
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            snake: self.snake.clone(),
            board: self.board.clone(),
            food: self.food,
            score: self.score,
            current_level: self.current_level,
            total_levels_completed: self.total_levels_completed,
            state: self.state,
            game_over_at: self.game_over_at,
            apples_eaten_in_level: self.apples_eaten_in_level,
            apples_to_open_gate: self.config.apples_to_open_gate,
            tick_interval: self.tick_interval(),
        }
    }
}

#[cfg(test)]
impl GameEngine {
    pub(crate) fn place_food(&mut self, food: Option<FoodItem>) {
        self.food = food;
    }

    pub(crate) fn replace_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}
