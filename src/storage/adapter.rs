//! Persistence adapter for the economy fields.
//!
//! The durable backend is probed once (write, read back, delete) under a short
//! timeout. If the probe fails, the adapter uses an in-process [`MemoryStore`]
//! for the rest of the process and never re-probes.
//!
//! Writes are fire-and-forget: they are queued to a background writer thread
//! and failures are logged, never returned. Each field is an independent key,
//! so a failed write of one field leaves the others alone.

use super::backend::{FileStore, KeyValueStore, MemoryStore};
use crate::core::config::ArcadeConfig;
use crate::core::constants::*;
use crate::economy::{EconomyState, GameData};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Stable storage keys.
pub mod keys {
    pub const GEMS: &str = "snake_arcade.gems";
    pub const HEARTS: &str = "snake_arcade.hearts";
    pub const UNLOCKED_LEVELS: &str = "snake_arcade.unlocked_levels";
    pub const HIGH_SCORE: &str = "snake_arcade.high_score";
    pub const LAST_SYNC: &str = "snake_arcade.last_sync";
    pub const AUTH_TOKEN: &str = "snake_arcade.auth_token";
    pub(crate) const PROBE: &str = "snake_arcade.probe";

    pub const GAME_DATA: [&str; 5] = [GEMS, HEARTS, UNLOCKED_LEVELS, HIGH_SCORE, LAST_SYNC];
}

enum WriteOp {
    Set(&'static str, String),
    Remove(Vec<&'static str>),
    Flush(mpsc::Sender<()>),
}

fn apply(backend: &dyn KeyValueStore, op: WriteOp) {
    match op {
        WriteOp::Set(key, value) => {
            if let Err(e) = backend.set(key, &value) {
                log::warn!("Failed to save {}: {}", key, e);
            }
        }
        WriteOp::Remove(keys) => {
            if let Err(e) = backend.multi_remove(&keys) {
                log::warn!("Failed to remove {:?}: {}", keys, e);
            }
        }
        WriteOp::Flush(done) => {
            let _ = done.send(());
        }
    }
}

/// Round-trip write/read/delete against `backend`, bounded by `timeout`.
pub fn probe_backend(backend: Arc<dyn KeyValueStore>, timeout: Duration) -> bool {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("storage-probe".to_string())
        .spawn(move || {
            let outcome = backend
                .set(keys::PROBE, "ok")
                .and_then(|_| backend.get(keys::PROBE))
                .and_then(|value| {
                    backend.remove(keys::PROBE)?;
                    Ok(value.as_deref() == Some("ok"))
                });
            let _ = tx.send(outcome);
        });
    if spawned.is_err() {
        return false;
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(true)) => true,
        Ok(Ok(false)) => {
            log::warn!("Storage probe read back a different value");
            false
        }
        Ok(Err(e)) => {
            log::warn!("Storage probe failed: {}", e);
            false
        }
        Err(_) => {
            log::warn!("Storage probe timed out after {:?}", timeout);
            false
        }
    }
}

/// Handle to the selected backend. Cheap to clone.
#[derive(Clone)]
pub struct GameDataStorage {
    backend: Arc<dyn KeyValueStore>,
    durable: bool,
    writer: Option<mpsc::Sender<WriteOp>>,
}

impl GameDataStorage {
    /// Probe `durable` and fall back to memory if it is unusable.
    pub fn open(durable: Arc<dyn KeyValueStore>, probe_timeout: Duration) -> Self {
        if probe_backend(Arc::clone(&durable), probe_timeout) {
            log::debug!("Durable storage available");
            Self::with_backend(durable, true)
        } else {
            log::warn!("Durable storage unavailable, progress will not survive a restart");
            Self::in_memory()
        }
    }

    /// File store in the configured data directory, with fallback.
    pub fn from_config(config: &ArcadeConfig) -> Self {
        let timeout = Duration::from_millis(config.storage_probe_timeout_ms);
        match config.resolve_data_dir().and_then(FileStore::open) {
            Ok(store) => Self::open(Arc::new(store), timeout),
            Err(e) => {
                log::warn!("Cannot open data directory: {}", e);
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryStore::new()), false)
    }

    fn with_backend(backend: Arc<dyn KeyValueStore>, durable: bool) -> Self {
        let (tx, rx) = mpsc::channel::<WriteOp>();
        let worker_backend = Arc::clone(&backend);
        let writer = thread::Builder::new()
            .name("storage-writer".to_string())
            .spawn(move || {
                for op in rx {
                    apply(worker_backend.as_ref(), op);
                }
            })
            .map(|_| tx)
            .map_err(|e| log::warn!("No storage writer thread, writing inline: {}", e))
            .ok();

        Self {
            backend,
            durable,
            writer,
        }
    }

    /// False when running on the in-memory fallback.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    fn submit(&self, op: WriteOp) {
        match &self.writer {
            Some(tx) => {
                if let Err(mpsc::SendError(op)) = tx.send(op) {
                    apply(self.backend.as_ref(), op);
                }
            }
            None => apply(self.backend.as_ref(), op),
        }
    }

    /// Wait (bounded) until every queued write has been applied.
    pub fn flush(&self) {
        let Some(tx) = &self.writer else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if tx.send(WriteOp::Flush(done_tx)).is_ok()
            && done_rx
                .recv_timeout(Duration::from_millis(STORAGE_FLUSH_TIMEOUT_MS))
                .is_err()
        {
            log::warn!("Storage flush timed out");
        }
    }

    pub fn save_gems(&self, gems: u32) {
        self.submit(WriteOp::Set(keys::GEMS, gems.to_string()));
    }

    pub fn save_hearts(&self, hearts: u32) {
        self.submit(WriteOp::Set(keys::HEARTS, hearts.to_string()));
    }

    pub fn save_unlocked_levels(&self, levels: &BTreeSet<u8>) {
        match serde_json::to_string(levels) {
            Ok(json) => self.submit(WriteOp::Set(keys::UNLOCKED_LEVELS, json)),
            Err(e) => log::warn!("Failed to encode unlocked levels: {}", e),
        }
    }

    pub fn save_high_score(&self, high_score: u32) {
        self.submit(WriteOp::Set(keys::HIGH_SCORE, high_score.to_string()));
    }

    pub fn save_last_sync(&self, at: DateTime<Utc>) {
        self.submit(WriteOp::Set(keys::LAST_SYNC, at.to_rfc3339()));
    }

    /// Save all four economy fields as independent writes.
    pub fn save_economy(&self, state: &EconomyState) {
        self.save_gems(state.gems);
        self.save_hearts(state.hearts);
        self.save_unlocked_levels(&state.unlocked_levels);
        self.save_high_score(state.high_score);
    }

    /// Remove every game-data key.
    pub fn clear_game_data(&self) {
        self.submit(WriteOp::Remove(keys::GAME_DATA.to_vec()));
    }

    pub fn save_auth_token(&self, token: &str) {
        self.submit(WriteOp::Set(keys::AUTH_TOKEN, token.to_string()));
    }

    pub fn clear_auth_token(&self) {
        self.submit(WriteOp::Remove(vec![keys::AUTH_TOKEN]));
    }

    pub fn load_auth_token(&self) -> Option<String> {
        self.flush();
        self.read(keys::AUTH_TOKEN).filter(|t| !t.is_empty())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn read_u32(&self, key: &str) -> u32 {
        let Some(raw) = self.read(key) else {
            return 0;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring malformed {}: {:?}", key, raw);
            0
        })
    }

    /// Full snapshot; any missing or malformed field takes its zero value.
    pub fn get_game_data(&self) -> GameData {
        self.flush();

        let unlocked_levels = self
            .read(keys::UNLOCKED_LEVELS)
            .and_then(|raw| match serde_json::from_str::<BTreeSet<u8>>(&raw) {
                Ok(levels) => Some(levels),
                Err(e) => {
                    log::warn!("Ignoring malformed unlocked levels: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        let last_sync = self
            .read(keys::LAST_SYNC)
            .and_then(|raw| match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(at) => Some(at.with_timezone(&Utc)),
                Err(e) => {
                    log::warn!("Ignoring malformed last sync time: {}", e);
                    None
                }
            });

        GameData {
            economy: EconomyState {
                gems: self.read_u32(keys::GEMS),
                hearts: self.read_u32(keys::HEARTS),
                unlocked_levels,
                high_score: self.read_u32(keys::HIGH_SCORE),
            }
            .normalized(),
            last_sync,
        }
    }
}

impl std::fmt::Debug for GameDataStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameDataStorage")
            .field("durable", &self.durable)
            .finish()
    }
}
