//! Headless runs of the real movement engine under a greedy autopilot.
//!
//! Time is simulated: the runner jumps straight to the next due deadline, so a
//! game that would take minutes on screen finishes in microseconds.

use super::config::SimConfig;
use super::report::SimReport;
use crate::game::{
    CollisionCause, Direction, GameMode, GamePhase, Grid, Level, PowerUpKind, Position, SnakeGame,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Outcome of one simulated game.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub mode: GameMode,
    pub level: Level,
    pub score: u32,
    pub length: usize,
    pub fruits_eaten: u32,
    pub gems_earned: u32,
    pub power_ups_collected: u32,
    pub ticks: u64,
    /// `None` when the run hit the tick cap.
    pub cause: Option<CollisionCause>,
}

impl RunStats {
    pub fn timed_out(&self) -> bool {
        self.cause.is_none()
    }
}

/// Run every configured mode/level combination and return a report.
pub fn run_simulation(config: &SimConfig) -> SimReport {
    let mut runs = Vec::new();
    let mut seeder = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    for &mode in &config.modes {
        for &level in &config.levels {
            for run_idx in 0..config.num_runs {
                let seed = seeder.gen::<u64>();
                let stats = simulate_single_run(config, level, mode, seed);
                if config.verbosity >= 2 {
                    println!(
                        "{} {} #{} - score {}, length {}, fruits {}, gems {}, {}",
                        mode.name(),
                        level.name(),
                        run_idx + 1,
                        stats.score,
                        stats.length,
                        stats.fruits_eaten,
                        stats.gems_earned,
                        stats
                            .cause
                            .map_or("timed out".to_string(), |c| format!("{:?}", c))
                    );
                }
                runs.push(stats);
            }
        }
    }

    SimReport::from_runs(runs, config.max_ticks_per_run)
}

/// Play one game to completion (or the tick cap).
pub fn simulate_single_run(config: &SimConfig, level: Level, mode: GameMode, seed: u64) -> RunStats {
    let grid = Grid::new(config.grid_width, config.grid_height);
    let mut game = SnakeGame::new(grid, level, mode, Some(seed));
    let mut now = 0;
    game.start(now);

    let mut gems_earned = 0;
    let mut power_ups_collected = 0;
    let mut cause = None;

    while game.phase() == GamePhase::Running && game.tick_count < config.max_ticks_per_run {
        let next = [game.next_tick_at(), game.power_ups.next_sweep_at()]
            .into_iter()
            .flatten()
            .min();
        let Some(next) = next else {
            break;
        };
        now = next.max(now);

        if game.next_tick_at() == Some(now) {
            if let Some(dir) = choose_direction(&game) {
                game.change_direction(dir);
            }
        }

        if let Some(result) = game.poll(now) {
            if let Some(eaten) = result.food_eaten {
                gems_earned += eaten.gems;
                if eaten.power_up.is_some() {
                    power_ups_collected += 1;
                }
            }
            if result.game_over.is_some() {
                cause = result.game_over;
            }
        }
    }

    RunStats {
        mode,
        level,
        score: game.score,
        length: game.snake.len(),
        fruits_eaten: game.fruits_eaten,
        gems_earned,
        power_ups_collected,
        ticks: game.tick_count,
        cause,
    }
}

/// Where the head would land moving `dir`, or `None` if that's off a solid wall.
fn next_cell(game: &SnakeGame, dir: Direction) -> Option<Position> {
    let raw = game.head().step(dir);
    if game.level.wraps() {
        Some(game.grid.wrap(raw))
    } else if game.grid.contains(raw) {
        Some(raw)
    } else {
        None
    }
}

fn is_safe(game: &SnakeGame, cell: Position) -> bool {
    let ghost = game.power_ups.is_active(PowerUpKind::GhostMode);
    if game.obstacles().contains(&cell) && !ghost {
        return false;
    }
    if ghost || game.power_ups.is_active(PowerUpKind::Invincibility) {
        return true;
    }
    // The tail moves out of the way unless this move eats.
    let tail_free = cell != game.food.position;
    let body_len = game.snake.len() - usize::from(tail_free);
    !game.snake.iter().take(body_len).any(|&p| p == cell)
}

/// Distance along one axis, taking wrap-around into account.
fn axis_distance(a: i32, b: i32, size: i32, wraps: bool) -> i32 {
    let d = (a - b).abs();
    if wraps {
        d.min(size - d)
    } else {
        d
    }
}

fn distance_to_food(game: &SnakeGame, cell: Position) -> i32 {
    let wraps = game.level.wraps();
    let food = game.food.position;
    axis_distance(cell.x, food.x, game.grid.width, wraps)
        + axis_distance(cell.y, food.y, game.grid.height, wraps)
}

/// Greedy autopilot: the safe move that gets closest to the food.
pub fn choose_direction(game: &SnakeGame) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&d| d != game.direction.opposite())
        .filter_map(|d| next_cell(game, d).map(|cell| (d, cell)))
        .filter(|&(_, cell)| is_safe(game, cell))
        .min_by_key(|&(d, cell)| (distance_to_food(game, cell), d != game.direction))
        .map(|(d, _)| d)
}
