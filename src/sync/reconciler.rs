//! Debounced push/merge of the local economy against the server.
//!
//! The reconciler is polled by the host loop. It watches the economy store's
//! revision counter: every change while logged in (re)arms a single debounce
//! deadline. When the deadline passes the round trip runs on a worker thread.
//! Only one round trip is ever in flight; a sync that falls due meanwhile is
//! started as soon as the current one finishes.

use crate::economy::{lock_economy, EconomyState, SharedEconomy};
use crate::remote::{ApiError, RemoteApi, SyncPayload};
use chrono::Utc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub type SyncResult = Result<EconomyState, ApiError>;

pub struct SyncReconciler {
    economy: SharedEconomy,
    api: Arc<dyn RemoteApi>,
    debounce_ms: u64,
    seen_revision: u64,
    due_at: Option<u64>,
    in_flight: Option<JoinHandle<SyncResult>>,
    resync: bool,
    completed: u64,
}

/// One full round trip: snapshot, push, merge the reply, stamp last sync.
///
/// The economy lock is not held across the network call. Local mutations made
/// meanwhile survive because the merge never lowers a field.
pub fn sync_once(economy: &SharedEconomy, api: &dyn RemoteApi) -> SyncResult {
    let local = SyncPayload::from(&lock_economy(economy).snapshot());
    let remote = EconomyState::from(api.sync(&local)?);

    let mut store = lock_economy(economy);
    store.apply_remote(&remote);
    if let Some(storage) = store.storage() {
        storage.save_last_sync(Utc::now());
    }
    Ok(store.snapshot())
}

impl SyncReconciler {
    pub fn new(economy: SharedEconomy, api: Arc<dyn RemoteApi>, debounce_ms: u64) -> Self {
        let seen_revision = lock_economy(&economy).revision();
        Self {
            economy,
            api,
            debounce_ms,
            seen_revision,
            due_at: None,
            in_flight: None,
            resync: false,
            completed: 0,
        }
    }

    /// Pending debounce deadline, if any.
    pub fn due_at(&self) -> Option<u64> {
        self.due_at
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some() || self.resync
    }

    /// Number of round trips that have finished (successfully or not).
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Advance the debounce timer and collect a finished round trip.
    pub fn poll(&mut self, now_ms: u64) -> Option<SyncResult> {
        let finished = if self.in_flight.as_ref().is_some_and(|h| h.is_finished()) {
            self.collect()
        } else {
            None
        };

        let revision = lock_economy(&self.economy).revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            if self.api.is_authenticated() {
                self.due_at = Some(now_ms + self.debounce_ms);
            }
        }

        if self.resync && self.in_flight.is_none() {
            self.resync = false;
            self.due_at = None;
            self.start();
        }

        if self.due_at.is_some_and(|due| now_ms >= due) {
            self.due_at = None;
            if self.in_flight.is_some() {
                self.resync = true;
            } else {
                self.start();
            }
        }

        finished
    }

    /// Skip the debounce and sync right away (or right after the current one).
    pub fn sync_now(&mut self) {
        self.due_at = None;
        self.seen_revision = lock_economy(&self.economy).revision();
        if self.in_flight.is_some() {
            self.resync = true;
        } else {
            self.start();
        }
    }

    /// Block until the in-flight round trip (if any) finishes.
    pub fn wait(&mut self) -> Option<SyncResult> {
        self.collect()
    }

    /// Drop the pending timer and any queued resync. A round trip already in
    /// flight is left to finish on its own.
    pub fn cancel(&mut self) {
        self.due_at = None;
        self.resync = false;
    }

    fn start(&mut self) {
        if !self.api.is_authenticated() {
            log::debug!("Skipping sync, not logged in");
            return;
        }
        let economy = Arc::clone(&self.economy);
        let api = Arc::clone(&self.api);
        match thread::Builder::new()
            .name("economy-sync".to_string())
            .spawn(move || sync_once(&economy, api.as_ref()))
        {
            Ok(handle) => self.in_flight = Some(handle),
            Err(e) => log::warn!("Could not start sync: {}", e),
        }
    }

    fn collect(&mut self) -> Option<SyncResult> {
        let handle = self.in_flight.take()?;
        self.completed += 1;
        let result = handle
            .join()
            .unwrap_or_else(|_| Err(ApiError::Transport("sync worker panicked".to_string())));
        match &result {
            Ok(state) => log::info!(
                "Synced: {} gems, {} hearts, high score {}",
                state.gems,
                state.hearts,
                state.high_score
            ),
            Err(e) => log::warn!("Sync failed: {}", e),
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::EconomyStore;
    use crate::remote::*;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeSync {
        logged_in: AtomicBool,
        calls: AtomicUsize,
        reply: Mutex<SyncPayload>,
        fail: AtomicBool,
    }

    impl FakeSync {
        fn new(reply: SyncPayload) -> Arc<Self> {
            Arc::new(Self {
                logged_in: AtomicBool::new(true),
                calls: AtomicUsize::new(0),
                reply: Mutex::new(reply),
                fail: AtomicBool::new(false),
            })
        }
    }

    impl RemoteApi for FakeSync {
        fn is_authenticated(&self) -> bool {
            self.logged_in.load(Ordering::SeqCst)
        }
        fn login(&self, _: &str, _: &str) -> Result<AuthResponse, ApiError> {
            Err(ApiError::Unauthorized)
        }
        fn register(&self, _: &str, _: &str, _: &str) -> Result<AuthResponse, ApiError> {
            Err(ApiError::Unauthorized)
        }
        fn logout(&self) -> Result<(), ApiError> {
            Ok(())
        }
        fn current_user(&self) -> Result<User, ApiError> {
            Ok(User::default())
        }
        fn user_stats(&self) -> Result<UserStats, ApiError> {
            Ok(UserStats::default())
        }
        fn submit_score(&self, _: &ScoreSubmission) -> Result<(), ApiError> {
            Ok(())
        }
        fn leaderboard(&self, _: LeaderboardPeriod) -> Result<Vec<LeaderboardEntry>, ApiError> {
            Ok(Vec::new())
        }
        fn sync(&self, _local: &SyncPayload) -> Result<SyncPayload, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Transport("offline".to_string()));
            }
            Ok(self.reply.lock().unwrap().clone())
        }
    }

    fn setup(reply: SyncPayload) -> (SharedEconomy, Arc<FakeSync>, SyncReconciler) {
        let economy = EconomyStore::in_memory().into_shared();
        let api = FakeSync::new(reply);
        let reconciler = SyncReconciler::new(Arc::clone(&economy), api.clone(), 2000);
        (economy, api, reconciler)
    }

    #[test]
    fn test_mutations_collapse_into_one_sync() {
        let (economy, api, mut sync) = setup(SyncPayload::default());

        lock_economy(&economy).add_gems(5);
        assert!(sync.poll(0).is_none());
        assert_eq!(sync.due_at(), Some(2000));

        lock_economy(&economy).add_gems(5);
        sync.poll(1500);
        assert_eq!(sync.due_at(), Some(3500));

        sync.poll(3499);
        assert!(!sync.is_busy());
        sync.poll(3500);
        assert!(sync.is_busy());
        assert!(sync.wait().unwrap().is_ok());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_merge_applied_without_rescheduling() {
        let reply = SyncPayload {
            gems: 3,
            hearts: 2,
            unlocked_levels: vec![1, 2],
            high_score: 500,
        };
        let (economy, _api, mut sync) = setup(reply);
        lock_economy(&economy).add_gems(10);
        sync.sync_now();
        let merged = sync.wait().unwrap().unwrap();
        assert_eq!(merged.gems, 10);
        assert_eq!(merged.hearts, 2);
        assert_eq!(merged.unlocked_levels, BTreeSet::from([1, 2]));
        assert_eq!(merged.high_score, 500);

        sync.poll(10);
        assert!(!sync.is_pending());
    }

    #[test]
    fn test_logged_out_does_not_schedule() {
        let (economy, api, mut sync) = setup(SyncPayload::default());
        api.logged_in.store(false, Ordering::SeqCst);
        lock_economy(&economy).add_heart();
        sync.poll(0);
        assert_eq!(sync.due_at(), None);
        sync.sync_now();
        assert!(!sync.is_busy());
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failure_keeps_local_state() {
        let (economy, api, mut sync) = setup(SyncPayload::default());
        api.fail.store(true, Ordering::SeqCst);
        lock_economy(&economy).add_gems(7);
        sync.sync_now();
        assert!(sync.wait().unwrap().is_err());
        assert_eq!(lock_economy(&economy).gems(), 7);
        // No proactive retry
        sync.poll(100_000);
        assert!(!sync.is_busy());
    }

    #[test]
    fn test_due_while_in_flight_runs_after() {
        let (economy, api, mut sync) = setup(SyncPayload::default());
        sync.sync_now();
        assert!(sync.is_busy());
        sync.sync_now();
        assert!(sync.is_pending());

        let _ = sync.wait();
        sync.poll(0);
        assert!(sync.is_busy());
        let _ = sync.wait();
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
        drop(economy);
    }

    #[test]
    fn test_cancel_clears_timer() {
        let (economy, api, mut sync) = setup(SyncPayload::default());
        lock_economy(&economy).add_gems(1);
        sync.poll(0);
        sync.cancel();
        sync.poll(5000);
        assert!(!sync.is_busy());
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }
}
