//! Movement engine: snake state, tick, collisions, state machine.

use super::food::{select_food_type, spawn_food_position, Food, FoodType};
use super::obstacles::maze_obstacles;
use super::power_ups::{PowerUpKind, PowerUpTracker};
use super::types::{Direction, GameMode, GamePhase, Grid, Level, Position};
use crate::core::config::ArcadeConfig;
use crate::core::constants::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashSet, VecDeque};

/// What ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionCause {
    Wall,
    SelfCollision,
    Obstacle,
}

/// A food item consumed this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodEaten {
    pub food_type: FoodType,
    pub position: Position,
    /// Points actually awarded (after double points).
    pub points: u32,
    pub gems: u32,
    pub power_up: Option<PowerUpKind>,
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickResult {
    pub food_eaten: Option<FoodEaten>,
    pub game_over: Option<CollisionCause>,
    /// Power-ups whose sweep expired them since the last poll.
    pub expired_power_ups: Vec<PowerUpKind>,
}

impl TickResult {
    pub fn is_empty(&self) -> bool {
        self.food_eaten.is_none() && self.game_over.is_none() && self.expired_power_ups.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SnakeGame {
    pub grid: Grid,
    pub level: Level,
    pub mode: GameMode,

    /// Head at index 0.
    pub snake: VecDeque<Position>,
    /// Direction applied on the last tick.
    pub direction: Direction,
    /// Direction to apply on the next tick (last accepted input wins).
    pub pending_direction: Direction,

    pub food: Food,
    pub score: u32,
    pub fruits_eaten: u32,

    pub power_ups: PowerUpTracker,
    obstacles: HashSet<Position>,
    phase: GamePhase,

    // Movement timer
    tick_interval_ms: u64,
    next_tick_at: Option<u64>,
    pub tick_count: u64,

    rng: ChaCha8Rng,
}

fn initial_snake(grid: Grid) -> VecDeque<Position> {
    let center = grid.center();
    (0..INITIAL_SNAKE_LENGTH as i32)
        .map(|i| grid.wrap(Position::new(center.x - i, center.y)))
        .collect()
}

impl SnakeGame {
    /// Create a game in `NotStarted`. `seed = None` seeds from entropy.
    pub fn new(grid: Grid, level: Level, mode: GameMode, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let obstacles = if level.has_obstacles() {
            maze_obstacles(grid)
        } else {
            HashSet::new()
        };

        let mut game = Self {
            grid,
            level,
            mode,
            snake: initial_snake(grid),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            // Overwritten by reset_food
            food: Food {
                position: Position::new(0, 0),
                food_type: FoodType::Regular,
            },
            score: 0,
            fruits_eaten: 0,
            power_ups: PowerUpTracker::default(),
            obstacles,
            phase: GamePhase::NotStarted,
            tick_interval_ms: mode.tick_interval_ms(0),
            next_tick_at: None,
            tick_count: 0,
            rng,
        };
        game.reset_food();
        game
    }

    pub fn from_config(config: &ArcadeConfig, level: Level, mode: GameMode) -> Self {
        let mut game = Self::new(
            Grid::new(config.grid_width, config.grid_height),
            level,
            mode,
            None,
        );
        game.power_ups = PowerUpTracker::new(config.power_up_poll_ms);
        game
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn obstacles(&self) -> &HashSet<Position> {
        &self.obstacles
    }

    /// Period used for the next scheduled tick.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    pub fn next_tick_at(&self) -> Option<u64> {
        self.next_tick_at
    }

    /// `base_speed(mode, score) * power-up speed factor`, at least 1ms.
    pub fn current_speed_ms(&self) -> u64 {
        let base = self.mode.tick_interval_ms(self.score) as f64;
        ((base * self.power_ups.speed_factor()).round() as u64).max(1)
    }

    fn reset_food(&mut self) {
        let position = spawn_food_position(self.grid, &self.snake, &self.obstacles, &mut self.rng);
        let food_type = select_food_type(self.fruits_eaten, self.mode, &mut self.rng);
        self.food = Food {
            position,
            food_type,
        };
    }

    fn schedule_next_tick(&mut self, now_ms: u64) {
        self.next_tick_at = Some(now_ms + self.tick_interval_ms);
    }

    /// `NotStarted` → `Running`.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.phase != GamePhase::NotStarted {
            return false;
        }
        self.phase = GamePhase::Running;
        self.tick_interval_ms = self.current_speed_ms();
        self.schedule_next_tick(now_ms);
        true
    }

    /// Halt the movement timer.
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.phase = GamePhase::Paused;
        self.next_tick_at = None;
        true
    }

    /// Reschedule at the last computed speed.
    pub fn resume(&mut self, now_ms: u64) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Running;
        self.schedule_next_tick(now_ms);
        true
    }

    /// Full reset of the run (snake, direction, score, fruit counter, food,
    /// power-ups) and straight back to `Running`. Only valid after game over.
    pub fn restart(&mut self, now_ms: u64) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.snake = initial_snake(self.grid);
        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        self.score = 0;
        self.fruits_eaten = 0;
        self.tick_count = 0;
        self.power_ups.clear();
        self.reset_food();
        self.phase = GamePhase::Running;
        self.tick_interval_ms = self.current_speed_ms();
        self.schedule_next_tick(now_ms);
        true
    }

    /// Continue after a fatal collision: respawn at the centre with a short
    /// invincibility window. Score and fruit counter are kept. The caller
    /// pays the heart.
    pub fn revive(&mut self, now_ms: u64) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.snake = initial_snake(self.grid);
        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        if self.snake.contains(&self.food.position) {
            let food_type = self.food.food_type;
            self.reset_food();
            self.food.food_type = food_type;
        }
        self.power_ups
            .activate(PowerUpKind::Invincibility, CONTINUE_IMMUNITY_MS, None, now_ms);
        self.phase = GamePhase::Running;
        self.tick_interval_ms = self.current_speed_ms();
        self.schedule_next_tick(now_ms);
        true
    }

    /// Cancel every timer owned by the game (teardown).
    pub fn cancel_timers(&mut self) {
        self.next_tick_at = None;
        self.power_ups.clear();
        if matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            self.phase = GamePhase::GameOver;
        }
    }

    /// Buffer a direction for the next tick.
    ///
    /// Rejected when it reverses the direction currently executing (not the
    /// pending one) or when the run isn't live.
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        if !matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            return false;
        }
        if direction == self.direction.opposite() {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    /// Advance both game timers. Returns `None` when nothing was due.
    pub fn poll(&mut self, now_ms: u64) -> Option<TickResult> {
        let expired = self.power_ups.poll(now_ms);

        let due = self.phase == GamePhase::Running
            && self.next_tick_at.map_or(false, |at| now_ms >= at);

        if !due {
            if expired.is_empty() {
                return None;
            }
            return Some(TickResult {
                expired_power_ups: expired,
                ..Default::default()
            });
        }

        let mut result = self.step(now_ms);
        result.expired_power_ups = expired;
        if self.phase == GamePhase::Running {
            self.schedule_next_tick(now_ms);
        }
        Some(result)
    }

    fn end_game(&mut self, cause: CollisionCause) -> TickResult {
        self.phase = GamePhase::GameOver;
        self.next_tick_at = None;
        log::info!(
            "Game over ({:?}) on {} with score {}",
            cause,
            self.level.name(),
            self.score
        );
        TickResult {
            game_over: Some(cause),
            ..Default::default()
        }
    }

    /// Single movement step. Does nothing unless the run is `Running`.
    pub(crate) fn step(&mut self, now_ms: u64) -> TickResult {
        if self.phase != GamePhase::Running {
            return TickResult::default();
        }
        self.tick_count += 1;

        self.direction = self.pending_direction;
        let raw_head = self.head().step(self.direction);

        // Wall policy
        let new_head = if self.level.wraps() {
            self.grid.wrap(raw_head)
        } else if self.grid.contains(raw_head) {
            raw_head
        } else {
            return self.end_game(CollisionCause::Wall);
        };

        let ghost = self.power_ups.is_active(PowerUpKind::GhostMode);
        if self.obstacles.contains(&new_head) && !ghost {
            return self.end_game(CollisionCause::Obstacle);
        }

        // The tail moves away this tick unless we're eating, so it doesn't count.
        let eating = new_head == self.food.position;
        let body_len = if eating {
            self.snake.len()
        } else {
            self.snake.len() - 1
        };
        let immune = ghost || self.power_ups.is_active(PowerUpKind::Invincibility);
        if !immune && self.snake.iter().take(body_len).any(|&seg| seg == new_head) {
            return self.end_game(CollisionCause::SelfCollision);
        }

        self.snake.push_front(new_head);

        let mut result = TickResult::default();
        if eating {
            result.food_eaten = Some(self.consume_food(now_ms));
        } else {
            self.snake.pop_back();
        }

        self.tick_interval_ms = self.current_speed_ms();
        result
    }

    fn consume_food(&mut self, now_ms: u64) -> FoodEaten {
        let food = self.food;
        let spec = food.food_type.spec();

        let mut points = spec.points;
        if self.power_ups.is_active(PowerUpKind::DoublePoints) {
            points *= 2;
        }
        self.score += points;

        if let Some(effect) = spec.effect {
            self.power_ups
                .activate(effect.kind, effect.duration_ms, effect.speed_factor, now_ms);
        }

        self.fruits_eaten += 1;
        self.reset_food();

        FoodEaten {
            food_type: food.food_type,
            position: food.position,
            points,
            gems: spec.gems,
            power_up: spec.effect.map(|e| e.kind),
        }
    }
}
