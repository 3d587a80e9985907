//! Board value types: positions, directions, levels, difficulty modes.

use serde::{Deserialize, Serialize};

/// A cell on the grid. `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Cardinal direction for snake movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns the (dx, dy) delta for this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Normalize a decoded swipe/pad vector to a unit direction.
    ///
    /// The dominant axis wins; horizontal wins a tie. A zero vector has no
    /// direction.
    pub fn from_vector(dx: f32, dy: f32) -> Option<Self> {
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return None;
        }
        if dx.abs() >= dy.abs() {
            Some(if dx > 0.0 { Self::Right } else { Self::Left })
        } else {
            Some(if dy > 0.0 { Self::Down } else { Self::Up })
        }
    }
}

/// Board ruleset. Each level has its own wall policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// Level 1: toroidal wrap on both axes.
    Classic,
    /// Level 2: solid walls, leaving the board ends the run.
    Walled,
    /// Level 3: wrap, plus static maze obstacles.
    Maze,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Classic, Level::Walled, Level::Maze];

    pub fn number(&self) -> u8 {
        match self {
            Self::Classic => 1,
            Self::Walled => 2,
            Self::Maze => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Classic),
            2 => Some(Self::Walled),
            3 => Some(Self::Maze),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Walled => "Walled",
            Self::Maze => "Maze",
        }
    }

    pub fn wraps(&self) -> bool {
        !matches!(self, Self::Walled)
    }

    pub fn has_obstacles(&self) -> bool {
        matches!(self, Self::Maze)
    }
}

/// Difficulty preset controlling tick speed and food odds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Easy,
    Normal,
    Hard,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Easy, GameMode::Normal, GameMode::Hard];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Tick period at score 0, in milliseconds.
    pub fn base_speed_ms(&self) -> u64 {
        match self {
            Self::Easy => 200,
            Self::Normal => 150,
            Self::Hard => 100,
        }
    }

    /// Milliseconds shaved off the tick period per point scored.
    pub fn speed_increment_ms(&self) -> u64 {
        match self {
            Self::Easy => 1,
            Self::Normal => 2,
            Self::Hard => 2,
        }
    }

    /// Cap on the total score-driven reduction.
    pub fn max_reduction_ms(&self) -> u64 {
        match self {
            Self::Easy => 100,
            Self::Normal => 100,
            Self::Hard => 60,
        }
    }

    /// `base - min(score * increment, max_reduction)`
    pub fn tick_interval_ms(&self, score: u32) -> u64 {
        let reduction = (score as u64)
            .saturating_mul(self.speed_increment_ms())
            .min(self.max_reduction_ms());
        self.base_speed_ms() - reduction
    }
}

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// Board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Toroidal wrap: `-1` maps to `dim - 1`, `dim` maps to `0`.
    pub fn wrap(&self, pos: Position) -> Position {
        Position {
            x: pos.x.rem_euclid(self.width),
            y: pos.y.rem_euclid(self.height),
        }
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}
