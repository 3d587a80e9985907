//! Simulation configuration.

use crate::game::{GameMode, Level};

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of games per mode/level combination
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Maximum movement ticks per game before it counts as timed out
    pub max_ticks_per_run: u64,

    pub modes: Vec<GameMode>,
    pub levels: Vec<Level>,

    pub grid_width: i32,
    pub grid_height: i32,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per run)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 200,
            seed: None,
            max_ticks_per_run: 20_000,
            modes: GameMode::ALL.to_vec(),
            levels: Level::ALL.to_vec(),
            grid_width: crate::core::constants::DEFAULT_GRID_WIDTH,
            grid_height: crate::core::constants::DEFAULT_GRID_HEIGHT,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Small run for a fast sanity check.
    pub fn quick() -> Self {
        Self {
            num_runs: 20,
            max_ticks_per_run: 5_000,
            ..Default::default()
        }
    }
}
