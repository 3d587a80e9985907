//! Economy snapshot and the local/remote merge rule.

use crate::core::constants::*;
use crate::game::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Gems, hearts, unlocked levels and high score as one flat snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyState {
    pub gems: u32,
    pub hearts: u32,
    /// Level numbers. Level 1 is always present.
    pub unlocked_levels: BTreeSet<u8>,
    pub high_score: u32,
}

impl Default for EconomyState {
    fn default() -> Self {
        Self {
            gems: 0,
            hearts: 0,
            unlocked_levels: BTreeSet::from([Level::Classic.number()]),
            high_score: 0,
        }
    }
}

impl EconomyState {
    /// Re-insert level 1 if a loaded or remote snapshot lost it.
    pub fn normalized(mut self) -> Self {
        self.unlocked_levels.insert(Level::Classic.number());
        self
    }

    pub fn is_level_unlocked(&self, level: Level) -> bool {
        level == Level::Classic || self.unlocked_levels.contains(&level.number())
    }
}

/// Everything the local store persists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameData {
    pub economy: EconomyState,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Element-wise max for scalars, union for unlocked levels.
///
/// Commutative, idempotent and monotonic: no field of the result is below the
/// corresponding field of either input.
pub fn merge(local: &EconomyState, remote: &EconomyState) -> EconomyState {
    EconomyState {
        gems: local.gems.max(remote.gems),
        hearts: local.hearts.max(remote.hearts),
        unlocked_levels: local
            .unlocked_levels
            .union(&remote.unlocked_levels)
            .copied()
            .collect(),
        high_score: local.high_score.max(remote.high_score),
    }
    .normalized()
}

/// Gem cost to unlock a level. Level 1 is free.
pub fn level_cost(level: Level) -> u32 {
    match level {
        Level::Classic => 0,
        Level::Walled => LEVEL_2_COST,
        Level::Maze => LEVEL_3_COST,
    }
}

/// A heart shop offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartBundle {
    pub hearts: u32,
    pub cost: u32,
}

pub fn heart_bundles() -> Vec<HeartBundle> {
    HEART_BUNDLES
        .iter()
        .map(|&(hearts, cost)| HeartBundle { hearts, cost })
        .collect()
}

/// Bundle selling exactly `hearts` hearts, if offered.
pub fn heart_bundle(hearts: u32) -> Option<HeartBundle> {
    heart_bundles().into_iter().find(|b| b.hearts == hearts)
}
