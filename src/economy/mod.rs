//! Progression and economy: gems, hearts, unlocked levels, high score.

pub mod store;
pub mod types;

pub use store::{lock_economy, EconomyStore, SharedEconomy};
pub use types::{heart_bundle, heart_bundles, level_cost, merge, EconomyState, GameData, HeartBundle};
