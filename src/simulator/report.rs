//! Simulation report generation.

use super::runner::RunStats;
use crate::game::{CollisionCause, GameMode, Level};
use serde::Serialize;

/// Aggregate for one mode/level combination.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub mode: String,
    pub level: String,
    pub runs: u32,
    pub runs_timed_out: u32,
    pub avg_score: f64,
    pub max_score: u32,
    pub avg_length: f64,
    pub avg_fruits: f64,
    pub avg_gems: f64,
    pub avg_power_ups: f64,
    pub avg_ticks: f64,
    pub wall_deaths: u32,
    pub self_deaths: u32,
    pub obstacle_deaths: u32,
}

impl GroupReport {
    fn from_runs(mode: GameMode, level: Level, runs: &[&RunStats]) -> Self {
        let n = runs.len().max(1) as f64;
        let avg = |f: &dyn Fn(&RunStats) -> f64| runs.iter().map(|&r| f(r)).sum::<f64>() / n;
        let deaths = |cause: CollisionCause| {
            runs.iter().filter(|r| r.cause == Some(cause)).count() as u32
        };

        Self {
            mode: mode.name().to_string(),
            level: level.name().to_string(),
            runs: runs.len() as u32,
            runs_timed_out: runs.iter().filter(|r| r.timed_out()).count() as u32,
            avg_score: avg(&|r| r.score as f64),
            max_score: runs.iter().map(|r| r.score).max().unwrap_or(0),
            avg_length: avg(&|r| r.length as f64),
            avg_fruits: avg(&|r| r.fruits_eaten as f64),
            avg_gems: avg(&|r| r.gems_earned as f64),
            avg_power_ups: avg(&|r| r.power_ups_collected as f64),
            avg_ticks: avg(&|r| r.ticks as f64),
            wall_deaths: deaths(CollisionCause::Wall),
            self_deaths: deaths(CollisionCause::SelfCollision),
            obstacle_deaths: deaths(CollisionCause::Obstacle),
        }
    }

    /// Average games needed to afford a level at this earn rate.
    pub fn games_to_earn(&self, cost: u32) -> Option<f64> {
        (self.avg_gems > 0.0).then(|| cost as f64 / self.avg_gems)
    }
}

/// Aggregated results from multiple simulation runs.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub max_ticks_per_run: u64,
    pub groups: Vec<GroupReport>,
    #[serde(skip)]
    pub run_stats: Vec<RunStats>,
}

impl SimReport {
    pub fn from_runs(runs: Vec<RunStats>, max_ticks_per_run: u64) -> Self {
        let mut groups = Vec::new();
        for mode in GameMode::ALL {
            for level in Level::ALL {
                let group: Vec<&RunStats> = runs
                    .iter()
                    .filter(|r| r.mode == mode && r.level == level)
                    .collect();
                if !group.is_empty() {
                    groups.push(GroupReport::from_runs(mode, level, &group));
                }
            }
        }

        Self {
            num_runs: runs.len() as u32,
            max_ticks_per_run,
            groups,
            run_stats: runs,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    SIMULATION REPORT\n");
        report.push_str("               (Greedy autopilot, real engine)\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} total, tick cap {}\n\n",
            self.num_runs, self.max_ticks_per_run
        ));

        report.push_str("── PER MODE / LEVEL ─────────────────────────────────────────────\n");
        report.push_str("  Mode    Level     Score   Max  Length  Fruits  Gems   Ticks\n");
        report.push_str("  ──────  ───────  ──────  ────  ──────  ──────  ─────  ──────\n");
        for g in &self.groups {
            report.push_str(&format!(
                "  {:<6}  {:<7}  {:6.1}  {:4}  {:6.1}  {:6.1}  {:5.1}  {:6.0}\n",
                g.mode,
                g.level,
                g.avg_score,
                g.max_score,
                g.avg_length,
                g.avg_fruits,
                g.avg_gems,
                g.avg_ticks
            ));
        }
        report.push('\n');

        report.push_str("── DEATHS ───────────────────────────────────────────────────────\n");
        for g in &self.groups {
            report.push_str(&format!(
                "  {:<6} {:<7}  wall {:3}  self {:3}  obstacle {:3}  timeout {:3}\n",
                g.mode, g.level, g.wall_deaths, g.self_deaths, g.obstacle_deaths, g.runs_timed_out
            ));
        }
        report.push('\n');

        report.push_str("── ECONOMY ──────────────────────────────────────────────────────\n");
        for g in self.groups.iter().filter(|g| g.level == Level::Classic.name()) {
            let to_level = |cost: u32| {
                g.games_to_earn(cost)
                    .map_or("never".to_string(), |games| format!("{:.1} games", games))
            };
            report.push_str(&format!(
                "  {:<6}  level 2: {:<12} level 3: {}\n",
                g.mode,
                to_level(crate::core::constants::LEVEL_2_COST),
                to_level(crate::core::constants::LEVEL_3_COST)
            ));
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
