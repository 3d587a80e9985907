//! The economy store: single owner of gems, hearts, unlocked levels and high
//! score.
//!
//! Every mutator is synchronous and all-or-nothing. A successful mutation bumps
//! `revision` (which the sync reconciler watches) and persists only the fields
//! it touched.

use super::types::{heart_bundle, level_cost, merge, EconomyState};
use crate::game::Level;
use crate::storage::GameDataStorage;
use std::sync::{Arc, Mutex, MutexGuard};

/// Economy store shared between the session and the sync worker.
pub type SharedEconomy = Arc<Mutex<EconomyStore>>;

/// Lock the shared store. A panicked holder cannot leave it half-mutated, so
/// poisoning is ignored.
pub fn lock_economy(economy: &SharedEconomy) -> MutexGuard<'_, EconomyStore> {
    economy.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct EconomyStore {
    state: EconomyState,
    revision: u64,
    storage: Option<GameDataStorage>,
}

impl EconomyStore {
    /// Store without persistence.
    pub fn new(state: EconomyState) -> Self {
        Self {
            state: state.normalized(),
            revision: 0,
            storage: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(EconomyState::default())
    }

    /// Load the persisted snapshot and write through to `storage` from now on.
    pub fn load(storage: GameDataStorage) -> Self {
        let state = storage.get_game_data().economy;
        log::debug!(
            "Loaded economy: {} gems, {} hearts, levels {:?}, high score {}",
            state.gems,
            state.hearts,
            state.unlocked_levels,
            state.high_score
        );
        Self {
            state,
            revision: 0,
            storage: Some(storage),
        }
    }

    pub fn into_shared(self) -> SharedEconomy {
        Arc::new(Mutex::new(self))
    }

    pub fn snapshot(&self) -> EconomyState {
        self.state.clone()
    }

    pub fn gems(&self) -> u32 {
        self.state.gems
    }

    pub fn hearts(&self) -> u32 {
        self.state.hearts
    }

    pub fn high_score(&self) -> u32 {
        self.state.high_score
    }

    /// Incremented by every successful local mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn storage(&self) -> Option<&GameDataStorage> {
        self.storage.as_ref()
    }

    fn persist(&self, f: impl FnOnce(&GameDataStorage, &EconomyState)) {
        if let Some(storage) = &self.storage {
            f(storage, &self.state);
        }
    }

    fn touched(&mut self) {
        self.revision += 1;
    }

    pub fn add_gems(&mut self, n: u32) {
        if n == 0 {
            return;
        }
        self.state.gems = self.state.gems.saturating_add(n);
        self.persist(|s, st| s.save_gems(st.gems));
        self.touched();
    }

    pub fn is_level_unlocked(&self, level: Level) -> bool {
        self.state.is_level_unlocked(level)
    }

    pub fn can_unlock(&self, level: Level) -> bool {
        !self.is_level_unlocked(level) && self.state.gems >= level_cost(level)
    }

    /// Deduct the level's cost and unlock it. No change on failure.
    pub fn unlock(&mut self, level: Level) -> bool {
        if !self.can_unlock(level) {
            return false;
        }
        self.state.gems -= level_cost(level);
        self.state.unlocked_levels.insert(level.number());
        self.persist(|s, st| {
            s.save_gems(st.gems);
            s.save_unlocked_levels(&st.unlocked_levels);
        });
        self.touched();
        log::info!("Unlocked level {} ({})", level.number(), level.name());
        true
    }

    pub fn add_heart(&mut self) {
        self.state.hearts = self.state.hearts.saturating_add(1);
        self.persist(|s, st| s.save_hearts(st.hearts));
        self.touched();
    }

    /// Spend one heart. False (and no change) when there are none.
    pub fn use_heart(&mut self) -> bool {
        if self.state.hearts == 0 {
            return false;
        }
        self.state.hearts -= 1;
        self.persist(|s, st| s.save_hearts(st.hearts));
        self.touched();
        true
    }

    /// Trade `cost` gems for `count` hearts. No change if gems are short.
    pub fn buy_hearts(&mut self, count: u32, cost: u32) -> bool {
        if self.state.gems < cost {
            return false;
        }
        self.state.gems -= cost;
        self.state.hearts = self.state.hearts.saturating_add(count);
        self.persist(|s, st| {
            s.save_gems(st.gems);
            s.save_hearts(st.hearts);
        });
        self.touched();
        true
    }

    /// Buy one of the shop bundles by its heart count.
    pub fn buy_bundle(&mut self, hearts: u32) -> bool {
        match heart_bundle(hearts) {
            Some(bundle) => self.buy_hearts(bundle.hearts, bundle.cost),
            None => false,
        }
    }

    /// Returns true when `score` is a new high score.
    pub fn record_game_end(&mut self, score: u32) -> bool {
        if score <= self.state.high_score {
            return false;
        }
        self.state.high_score = score;
        self.persist(|s, st| s.save_high_score(st.high_score));
        self.touched();
        true
    }

    /// Merge a server snapshot into local state and persist the result.
    ///
    /// Does not bump the revision, so a merge never schedules another sync.
    pub fn apply_remote(&mut self, remote: &EconomyState) {
        self.state = merge(&self.state, remote);
        self.persist(|s, st| s.save_economy(st));
    }

    /// Back to first-launch defaults, removing every stored field.
    pub fn reset(&mut self) {
        self.state = EconomyState::default();
        if let Some(storage) = &self.storage {
            storage.clear_game_data();
        }
        self.touched();
    }
}

impl Default for EconomyStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn with_gems(gems: u32) -> EconomyStore {
        EconomyStore::new(EconomyState {
            gems,
            ..EconomyState::default()
        })
    }

    #[test]
    fn test_defaults() {
        let store = EconomyStore::in_memory();
        assert_eq!(store.gems(), 0);
        assert_eq!(store.hearts(), 0);
        assert_eq!(store.high_score(), 0);
        assert!(store.is_level_unlocked(Level::Classic));
        assert!(!store.is_level_unlocked(Level::Walled));
    }

    #[test]
    fn test_unlock_insufficient_gems() {
        let mut store = with_gems(40);
        assert!(!store.can_unlock(Level::Walled));
        assert!(!store.unlock(Level::Walled));
        assert_eq!(store.gems(), 40);
        assert!(!store.is_level_unlocked(Level::Walled));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_unlock_deducts_exact_cost() {
        let mut store = with_gems(170);
        assert!(store.unlock(Level::Maze));
        assert_eq!(store.gems(), 20);
        assert!(store.is_level_unlocked(Level::Maze));
        // Already unlocked
        assert!(!store.can_unlock(Level::Maze));
        assert!(!store.unlock(Level::Maze));
        assert_eq!(store.gems(), 20);
    }

    #[test]
    fn test_level_one_never_unlockable() {
        let mut store = with_gems(1000);
        assert!(!store.unlock(Level::Classic));
        assert_eq!(store.gems(), 1000);
    }

    #[test]
    fn test_hearts_floor_at_zero() {
        let mut store = EconomyStore::in_memory();
        assert!(!store.use_heart());
        assert_eq!(store.hearts(), 0);
        store.add_heart();
        assert!(store.use_heart());
        assert!(!store.use_heart());
    }

    #[test]
    fn test_buy_hearts() {
        let mut store = with_gems(60);
        assert!(store.buy_hearts(3, 50));
        assert_eq!((store.gems(), store.hearts()), (10, 3));
        assert!(!store.buy_hearts(1, 20));
        assert_eq!((store.gems(), store.hearts()), (10, 3));
    }

    #[test]
    fn test_buy_bundle() {
        let mut store = with_gems(80);
        assert!(!store.buy_bundle(2));
        assert!(store.buy_bundle(5));
        assert_eq!((store.gems(), store.hearts()), (5, 5));
    }

    #[test]
    fn test_record_game_end() {
        let mut store = EconomyStore::in_memory();
        assert!(store.record_game_end(12));
        assert!(!store.record_game_end(12));
        assert!(!store.record_game_end(3));
        assert_eq!(store.high_score(), 12);
    }

    #[test]
    fn test_revision_tracks_successful_mutations() {
        let mut store = EconomyStore::in_memory();
        store.add_gems(0);
        assert_eq!(store.revision(), 0);
        store.add_gems(5);
        store.add_heart();
        assert!(!store.unlock(Level::Maze));
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_apply_remote_merges_without_revision() {
        let mut store = with_gems(30);
        let remote = EconomyState {
            gems: 10,
            hearts: 4,
            unlocked_levels: BTreeSet::from([1, 2]),
            high_score: 99,
        };
        store.apply_remote(&remote);
        let state = store.snapshot();
        assert_eq!(state.gems, 30);
        assert_eq!(state.hearts, 4);
        assert_eq!(state.unlocked_levels, BTreeSet::from([1, 2]));
        assert_eq!(state.high_score, 99);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_mutations_persist() {
        let storage = GameDataStorage::in_memory();
        let mut store = EconomyStore::load(storage.clone());
        store.add_gems(75);
        assert!(store.unlock(Level::Walled));
        assert!(store.buy_hearts(1, 20));
        store.record_game_end(31);

        let reloaded = EconomyStore::load(storage);
        assert_eq!(reloaded.snapshot(), store.snapshot());
        assert_eq!(reloaded.gems(), 5);
        assert_eq!(reloaded.hearts(), 1);
    }

    #[test]
    fn test_reset_clears_storage() {
        let storage = GameDataStorage::in_memory();
        let mut store = EconomyStore::load(storage.clone());
        store.add_gems(10);
        store.record_game_end(4);
        store.reset();
        assert_eq!(store.snapshot(), EconomyState::default());
        assert_eq!(storage.get_game_data().economy, EconomyState::default());
    }
}
