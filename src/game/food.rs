//! Food types, next-type selection and collision-free placement.

use super::power_ups::PowerUpKind;
use super::types::{GameMode, Grid, Position};
use crate::core::constants::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    Regular,
    Golden,
    Speed,
    Slow,
    Shield,
    DoublePoints,
    Ghost,
    // Milestones
    Ruby,
    Emerald,
    Diamond,
}

/// Effect granted when a food is eaten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodEffect {
    pub kind: PowerUpKind,
    pub duration_ms: u64,
    pub speed_factor: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodSpec {
    pub points: u32,
    pub effect: Option<FoodEffect>,
    pub gems: u32,
}

const fn effect(kind: PowerUpKind, duration_ms: u64, speed_factor: Option<f64>) -> Option<FoodEffect> {
    Some(FoodEffect {
        kind,
        duration_ms,
        speed_factor,
    })
}

impl FoodType {
    pub fn spec(&self) -> FoodSpec {
        let (points, effect, gems) = match self {
            Self::Regular => (1, None, 0),
            Self::Golden => (5, None, 0),
            Self::Speed => (2, effect(PowerUpKind::SpeedBoost, 5_000, Some(0.7)), 0),
            Self::Slow => (2, effect(PowerUpKind::SpeedSlow, 5_000, Some(1.5)), 0),
            Self::Shield => (2, effect(PowerUpKind::Invincibility, 5_000, None), 0),
            Self::DoublePoints => (2, effect(PowerUpKind::DoublePoints, 10_000, None), 0),
            Self::Ghost => (2, effect(PowerUpKind::GhostMode, 5_000, None), 0),
            Self::Ruby => (10, None, 5),
            Self::Emerald => (20, None, 10),
            Self::Diamond => (50, None, 25),
        };
        FoodSpec {
            points,
            effect,
            gems,
        }
    }

    pub fn is_milestone(&self) -> bool {
        matches!(self, Self::Ruby | Self::Emerald | Self::Diamond)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Regular => "Apple",
            Self::Golden => "Golden Apple",
            Self::Speed => "Pepper",
            Self::Slow => "Snail Berry",
            Self::Shield => "Shield Fruit",
            Self::DoublePoints => "Star Fruit",
            Self::Ghost => "Ghost Plum",
            Self::Ruby => "Ruby",
            Self::Emerald => "Emerald",
            Self::Diamond => "Diamond",
        }
    }
}

/// The single food item on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub position: Position,
    pub food_type: FoodType,
}

/// Fixed walk order for weighted selection.
pub const WEIGHTED_TYPES: [FoodType; 7] = [
    FoodType::Regular,
    FoodType::Golden,
    FoodType::Speed,
    FoodType::Slow,
    FoodType::Shield,
    FoodType::DoublePoints,
    FoodType::Ghost,
];

/// Probability of each entry of [`WEIGHTED_TYPES`] for a mode.
pub fn type_weights(mode: GameMode) -> [f64; 7] {
    match mode {
        GameMode::Easy => [0.55, 0.10, 0.05, 0.10, 0.10, 0.05, 0.05],
        GameMode::Normal => [0.60, 0.10, 0.08, 0.06, 0.06, 0.05, 0.05],
        GameMode::Hard => [0.65, 0.08, 0.10, 0.04, 0.05, 0.04, 0.04],
    }
}

/// Milestone owed after `fruits_eaten` fruits, highest value first.
pub fn milestone_food(fruits_eaten: u32) -> Option<FoodType> {
    if fruits_eaten == 0 {
        return None;
    }
    if fruits_eaten % DIAMOND_EVERY == 0 {
        Some(FoodType::Diamond)
    } else if fruits_eaten % EMERALD_EVERY == 0 {
        Some(FoodType::Emerald)
    } else if fruits_eaten % RUBY_EVERY == 0 {
        Some(FoodType::Ruby)
    } else {
        None
    }
}

/// Cumulative-distribution walk for a uniform `roll` in `[0, 1)`.
pub fn pick_weighted(mode: GameMode, roll: f64) -> FoodType {
    let mut cumulative = 0.0;
    for (food_type, weight) in WEIGHTED_TYPES.iter().zip(type_weights(mode)) {
        cumulative += weight;
        if roll < cumulative {
            return *food_type;
        }
    }
    // Float slack at the top of the range
    FoodType::Regular
}

/// Type of the next food to spawn.
pub fn select_food_type<R: Rng>(fruits_eaten: u32, mode: GameMode, rng: &mut R) -> FoodType {
    milestone_food(fruits_eaten).unwrap_or_else(|| pick_weighted(mode, rng.gen::<f64>()))
}

/// Edge margin for one axis: `clamp(floor(dim * 0.1), 1, 3)`.
pub fn placement_margin(dimension: i32) -> i32 {
    ((dimension as f64 * FOOD_MARGIN_RATIO).floor() as i32).clamp(FOOD_MARGIN_MIN, FOOD_MARGIN_MAX)
}

/// Sampling range for one axis, falling back to the whole axis when the
/// margins would leave nothing.
fn axis_range(dimension: i32) -> (i32, i32) {
    let margin = placement_margin(dimension);
    if dimension - 2 * margin > 0 {
        (margin, dimension - margin)
    } else {
        (0, dimension)
    }
}

/// Sample a food position inside the inset rectangle, avoiding the snake and
/// obstacles.
///
/// Gives up after [`FOOD_PLACEMENT_ATTEMPTS`] samples and returns the last
/// candidate even if it overlaps something.
pub fn spawn_food_position<R: Rng>(
    grid: Grid,
    snake: &VecDeque<Position>,
    obstacles: &HashSet<Position>,
    rng: &mut R,
) -> Position {
    let (min_x, max_x) = axis_range(grid.width);
    let (min_y, max_y) = axis_range(grid.height);

    let mut candidate = grid.center();
    for _ in 0..FOOD_PLACEMENT_ATTEMPTS {
        candidate = Position::new(rng.gen_range(min_x..max_x), rng.gen_range(min_y..max_y));
        if !snake.contains(&candidate) && !obstacles.contains(&candidate) {
            return candidate;
        }
    }
    log::debug!(
        "Food placement budget exhausted, accepting {:?}",
        candidate
    );
    candidate
}
