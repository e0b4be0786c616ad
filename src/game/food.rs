use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::board::Board;
use super::config::GameConfig;
use super::state::{GridPoint, Snake};

/// Score tier of a food item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodTier {
    Normal,
    Bonus,
}

/// A piece of food on the board; replaced rather than mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodItem {
    position: GridPoint,
    tier: FoodTier,
    score_value: u32,
}

impl FoodItem {
    pub fn new(position: GridPoint, tier: FoodTier, score_value: u32) -> Self {
        Self {
            position,
            tier,
            score_value,
        }
    }

    pub fn position(&self) -> GridPoint {
        self.position
    }

    pub fn tier(&self) -> FoodTier {
        self.tier
    }

    pub fn score_value(&self) -> u32 {
        self.score_value
    }
}

/// What eating a food item means for the level
#[derive(Debug, Clone, PartialEq)]
pub struct FoodEaten {
    pub score_value: u32,
    pub apples_eaten_in_level: u32,
    pub should_open_gate: bool,
    /// `None` once the gate opens, or when no free cell is left
    pub next_food: Option<FoodItem>,
}

/// Places food on free cells and decides gate opening
pub struct FoodSpawner {
    rng: StdRng,
    normal_score: u32,
    bonus_score: u32,
    bonus_chance: f64,
    apples_to_open_gate: u32,
}

impl FoodSpawner {
    /// Spawner seeded from OS entropy
    pub fn new(config: &GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic spawner, for replays and tests
    pub fn seeded(config: &GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, rng: StdRng) -> Self {
        Self {
            rng,
            normal_score: config.normal_food_score,
            bonus_score: config.bonus_food_score,
            bonus_chance: config.bonus_food_chance.clamp(0.0, 1.0),
            apples_to_open_gate: config.apples_to_open_gate,
        }
    }

    /// Place a new food item on a random cell free of the snake and of walls
    ///
    /// Random sampling is bounded to `4 * width * height` draws; after that every cell is
    /// scanned in row-major order. Returns `None` only when no free cell exists.
    pub fn create_food_item(&mut self, board: &Board, snake: &Snake) -> Option<FoodItem> {
        let (tier, score_value) = if self.rng.gen_bool(self.bonus_chance) {
            (FoodTier::Bonus, self.bonus_score)
        } else {
            (FoodTier::Normal, self.normal_score)
        };

        let (width, height) = (board.width(), board.height());
        if width <= 0 || height <= 0 {
            return None;
        }

        let is_free = |pos: GridPoint| !snake.occupies(pos) && !board.is_obstacle(pos);

        let attempts = 4 * width as usize * height as usize;
        for _ in 0..attempts {
            let pos = GridPoint::new(
                self.rng.gen_range(0..width),
                self.rng.gen_range(0..height),
            );
            if is_free(pos) {
                return Some(FoodItem::new(pos, tier, score_value));
            }
        }

        let fallback = (0..height)
            .flat_map(|y| (0..width).map(move |x| GridPoint::new(x, y)))
            .find(|pos| is_free(*pos));

        if fallback.is_none() {
            warn!("No free cell left for food on a {}x{} board", width, height);
        }
        fallback.map(|pos| FoodItem::new(pos, tier, score_value))
    }

    /// Count the eaten item and decide what happens next
    ///
    /// Reaching the gate threshold suppresses food for the rest of the level. Nothing is
    /// mutated here; the caller applies the result.
    pub fn handle_food_eaten(
        &mut self,
        board: &Board,
        snake: &Snake,
        eaten: &FoodItem,
        apples_eaten_in_level: u32,
    ) -> FoodEaten {
        let apples_eaten_in_level = apples_eaten_in_level + 1;
        let should_open_gate = apples_eaten_in_level >= self.apples_to_open_gate;
        let next_food = if should_open_gate {
            None
        } else {
            self.create_food_item(board, snake)
        };

        FoodEaten {
            score_value: eaten.score_value(),
            apples_eaten_in_level,
            should_open_gate,
            next_food,
        }
    }
}
