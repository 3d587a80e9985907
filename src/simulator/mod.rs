//! Headless gameplay simulator for balance analysis.
//!
//! Runs the real movement engine under a greedy autopilot to estimate scores,
//! gem income and typical causes of death per mode and level.

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::{GroupReport, SimReport};
pub use runner::{choose_direction, run_simulation, simulate_single_run, RunStats};
