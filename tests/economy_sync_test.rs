//! Integration test: economy store, merge rule and sync reconciler
//!
//! Covers the unlock/purchase invariants, the max/union merge properties and
//! the debounced reconciliation against an in-process server.

mod common;

use common::FakeServer;
use proptest::prelude::*;
use snake_arcade::economy::{lock_economy, merge, EconomyState, EconomyStore};
use snake_arcade::game::Level;
use snake_arcade::remote::{RemoteApi, SyncPayload};
use snake_arcade::storage::GameDataStorage;
use snake_arcade::sync::SyncReconciler;
use std::collections::BTreeSet;
use std::sync::Arc;

// =============================================================================
// Economy store
// =============================================================================

#[test]
fn test_unlock_with_forty_gems_fails() {
    let mut store = EconomyStore::new(EconomyState {
        gems: 40,
        ..EconomyState::default()
    });
    assert!(!store.unlock(Level::Walled));
    assert_eq!(store.gems(), 40);
    assert!(!store.is_level_unlocked(Level::Walled));
}

#[test]
fn test_unlock_then_buy_hearts() {
    let mut store = EconomyStore::in_memory();
    store.add_gems(200);
    assert!(store.unlock(Level::Walled));
    assert!(store.unlock(Level::Maze));
    assert_eq!(store.gems(), 0);
    assert!(!store.buy_bundle(1));
    assert_eq!(store.hearts(), 0);

    store.add_gems(20);
    assert!(store.buy_bundle(1));
    assert_eq!((store.gems(), store.hearts()), (0, 1));
}

#[test]
fn test_store_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        let backend = snake_arcade::storage::FileStore::open(dir.path()).unwrap();
        GameDataStorage::open(Arc::new(backend), std::time::Duration::from_secs(1))
    };

    {
        let mut store = EconomyStore::load(open());
        store.add_gems(60);
        assert!(store.unlock(Level::Walled));
        store.add_heart();
        store.record_game_end(42);
        store.storage().unwrap().flush();
    }

    let store = EconomyStore::load(open());
    assert_eq!(store.gems(), 10);
    assert_eq!(store.hearts(), 1);
    assert_eq!(store.high_score(), 42);
    assert!(store.is_level_unlocked(Level::Walled));
}

// =============================================================================
// Merge properties
// =============================================================================

fn economy_strategy() -> impl Strategy<Value = EconomyState> {
    (
        0u32..10_000,
        0u32..100,
        prop::collection::btree_set(1u8..=3, 0..3),
        0u32..100_000,
    )
        .prop_map(|(gems, hearts, unlocked_levels, high_score)| {
            EconomyState {
                gems,
                hearts,
                unlocked_levels,
                high_score,
            }
            .normalized()
        })
}

proptest! {
    #[test]
    fn prop_merge_idempotent(local in economy_strategy(), remote in economy_strategy()) {
        let once = merge(&local, &remote);
        prop_assert_eq!(merge(&once, &remote), once);
    }

    #[test]
    fn prop_merge_monotonic(local in economy_strategy(), remote in economy_strategy()) {
        let merged = merge(&local, &remote);
        prop_assert!(merged.gems >= local.gems && merged.gems >= remote.gems);
        prop_assert!(merged.hearts >= local.hearts && merged.hearts >= remote.hearts);
        prop_assert!(merged.high_score >= local.high_score && merged.high_score >= remote.high_score);
        prop_assert!(merged.unlocked_levels.is_superset(&local.unlocked_levels));
        prop_assert!(merged.unlocked_levels.is_superset(&remote.unlocked_levels));
    }

    #[test]
    fn prop_merge_commutative(a in economy_strategy(), b in economy_strategy()) {
        prop_assert_eq!(merge(&a, &b), merge(&b, &a));
    }

    #[test]
    fn prop_failed_unlock_leaves_state(gems in 0u32..150) {
        let mut store = EconomyStore::new(EconomyState { gems, ..EconomyState::default() });
        let before = store.snapshot();
        prop_assert!(!store.unlock(Level::Maze));
        prop_assert_eq!(store.snapshot(), before);
    }
}

// =============================================================================
// Reconciler
// =============================================================================

fn reconciler(server: &Arc<FakeServer>) -> (snake_arcade::economy::SharedEconomy, SyncReconciler) {
    let economy = EconomyStore::load(GameDataStorage::in_memory()).into_shared();
    let api: Arc<dyn RemoteApi> = server.clone();
    let sync = SyncReconciler::new(Arc::clone(&economy), api, 2_000);
    (economy, sync)
}

#[test]
fn test_burst_of_mutations_syncs_once() {
    let server = Arc::new(FakeServer::logged_in());
    let (economy, mut sync) = reconciler(&server);

    for t in 0..5 {
        lock_economy(&economy).add_gems(1);
        sync.poll(t * 500);
    }
    assert_eq!(sync.due_at(), Some(4_000));
    sync.poll(3_999);
    assert!(!sync.is_busy());
    sync.poll(4_000);
    sync.wait().unwrap().unwrap();

    assert_eq!(server.sync_count(), 1);
    assert_eq!(server.pushed.lock().unwrap()[0].gems, 5);
}

#[test]
fn test_sync_merges_server_progress() {
    let server = Arc::new(FakeServer::logged_in().with_server_state(SyncPayload {
        gems: 80,
        hearts: 0,
        unlocked_levels: vec![1, 3],
        high_score: 1_200,
    }));
    let (economy, mut sync) = reconciler(&server);
    lock_economy(&economy).add_heart();

    sync.sync_now();
    let merged = sync.wait().unwrap().unwrap();

    assert_eq!(merged.gems, 80);
    assert_eq!(merged.hearts, 1);
    assert_eq!(merged.unlocked_levels, BTreeSet::from([1, 3]));
    assert_eq!(merged.high_score, 1_200);
    assert_eq!(lock_economy(&economy).snapshot(), merged);

    let storage = lock_economy(&economy).storage().cloned().unwrap();
    let data = storage.get_game_data();
    assert_eq!(data.economy, merged);
    assert!(data.last_sync.is_some());
}

#[test]
fn test_failed_sync_is_swallowed() {
    let server = Arc::new(FakeServer::logged_in());
    *server.reject_sync.lock().unwrap() = Some(500);
    let (economy, mut sync) = reconciler(&server);
    lock_economy(&economy).add_gems(9);

    sync.sync_now();
    assert!(sync.wait().unwrap().is_err());
    assert_eq!(lock_economy(&economy).gems(), 9);
    let storage = lock_economy(&economy).storage().cloned().unwrap();
    assert!(storage.get_game_data().last_sync.is_none());
}

#[test]
fn test_unauthorized_stops_syncing() {
    let server = Arc::new(FakeServer::logged_in());
    *server.reject_sync.lock().unwrap() = Some(401);
    let (economy, mut sync) = reconciler(&server);

    sync.sync_now();
    assert!(sync.wait().unwrap().is_err());
    assert!(!server.is_authenticated());

    lock_economy(&economy).add_gems(1);
    sync.poll(0);
    assert_eq!(sync.due_at(), None);
}

#[test]
fn test_guest_progress_is_not_pushed() {
    let server = Arc::new(FakeServer::new());
    let (economy, mut sync) = reconciler(&server);
    lock_economy(&economy).add_gems(3);
    sync.poll(0);
    sync.poll(10_000);
    assert!(!sync.is_busy());
    assert_eq!(server.sync_count(), 0);
}
