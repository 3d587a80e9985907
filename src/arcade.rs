//! Game session orchestration.
//!
//! `Arcade` owns the three cooperative timers (movement tick, power-up sweep,
//! debounced sync) and routes gameplay events into the economy. The host calls
//! [`Arcade::poll`] with a monotonic millisecond clock and can sleep until
//! [`Arcade::next_deadline`].

use crate::core::config::ArcadeConfig;
use crate::economy::{lock_economy, EconomyState, EconomyStore, SharedEconomy};
use crate::game::{
    CollisionCause, Direction, FoodEaten, GameMode, GamePhase, Grid, Level, PowerUpKind,
    PowerUpTracker, SnakeGame,
};
use crate::remote::*;
use crate::storage::GameDataStorage;
use crate::sync::SyncReconciler;
use std::sync::{Arc, MutexGuard};
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("level {0} is locked")]
    LevelLocked(u8),
    #[error("no game in progress")]
    NoActiveGame,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Something the presentation layer may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ArcadeEvent {
    FoodEaten(FoodEaten),
    PowerUpExpired(PowerUpKind),
    GameOver {
        cause: CollisionCause,
        score: u32,
        new_high_score: bool,
    },
    Synced(EconomyState),
    SyncFailed(String),
}

pub struct Arcade {
    config: ArcadeConfig,
    storage: GameDataStorage,
    economy: SharedEconomy,
    api: Arc<dyn RemoteApi>,
    sync: SyncReconciler,
    game: Option<SnakeGame>,
    uploads: Vec<JoinHandle<()>>,
}

impl Arcade {
    /// Wire the session from explicit collaborators.
    pub fn new(config: ArcadeConfig, storage: GameDataStorage, api: Arc<dyn RemoteApi>) -> Self {
        let economy = EconomyStore::load(storage.clone()).into_shared();
        let sync = SyncReconciler::new(
            Arc::clone(&economy),
            Arc::clone(&api),
            config.sync_debounce_ms,
        );
        Self {
            config,
            storage,
            economy,
            api,
            sync,
            game: None,
            uploads: Vec::new(),
        }
    }

    /// Durable storage from the config (with fallback) and the HTTP client.
    pub fn open(config: ArcadeConfig) -> Self {
        let storage = GameDataStorage::from_config(&config);
        let api: Arc<dyn RemoteApi> = Arc::new(HttpApiClient::new(
            &config.api_base_url,
            TokenStore::load(storage.clone()),
        ));
        Self::new(config, storage, api)
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    pub fn storage(&self) -> &GameDataStorage {
        &self.storage
    }

    pub fn economy(&self) -> MutexGuard<'_, EconomyStore> {
        lock_economy(&self.economy)
    }

    pub fn shared_economy(&self) -> SharedEconomy {
        Arc::clone(&self.economy)
    }

    pub fn api(&self) -> &dyn RemoteApi {
        self.api.as_ref()
    }

    pub fn sync(&self) -> &SyncReconciler {
        &self.sync
    }

    pub fn game(&self) -> Option<&SnakeGame> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut SnakeGame> {
        self.game.as_mut()
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.is_authenticated()
    }

    // ---- Game lifecycle ----

    /// Start a run on `level`. Fails if the level is still locked.
    pub fn start_game(
        &mut self,
        level: Level,
        mode: Option<GameMode>,
        now_ms: u64,
    ) -> Result<&SnakeGame, ArcadeError> {
        let mode = mode.unwrap_or(self.config.mode);
        let game = SnakeGame::from_config(&self.config, level, mode);
        self.begin(game, now_ms)
    }

    /// Same as [`Arcade::start_game`] with a fixed RNG seed.
    pub fn start_seeded_game(
        &mut self,
        level: Level,
        mode: GameMode,
        seed: u64,
        now_ms: u64,
    ) -> Result<&SnakeGame, ArcadeError> {
        let grid = Grid::new(self.config.grid_width, self.config.grid_height);
        let mut game = SnakeGame::new(grid, level, mode, Some(seed));
        game.power_ups = PowerUpTracker::new(self.config.power_up_poll_ms);
        self.begin(game, now_ms)
    }

    fn begin(&mut self, mut game: SnakeGame, now_ms: u64) -> Result<&SnakeGame, ArcadeError> {
        if !self.economy().is_level_unlocked(game.level) {
            return Err(ArcadeError::LevelLocked(game.level.number()));
        }
        self.end_session();
        game.start(now_ms);
        log::info!(
            "Starting {} ({}) at {}ms per tick",
            game.level.name(),
            game.mode.name(),
            game.tick_interval_ms()
        );
        Ok(self.game.insert(game))
    }

    fn live_game(&mut self) -> Result<&mut SnakeGame, ArcadeError> {
        self.game.as_mut().ok_or(ArcadeError::NoActiveGame)
    }

    pub fn change_direction(&mut self, direction: Direction) -> bool {
        self.game
            .as_mut()
            .is_some_and(|g| g.change_direction(direction))
    }

    /// Steer from a raw gesture vector.
    pub fn steer(&mut self, dx: f32, dy: f32) -> bool {
        Direction::from_vector(dx, dy).is_some_and(|d| self.change_direction(d))
    }

    pub fn pause(&mut self) -> Result<bool, ArcadeError> {
        Ok(self.live_game()?.pause())
    }

    pub fn resume(&mut self, now_ms: u64) -> Result<bool, ArcadeError> {
        Ok(self.live_game()?.resume(now_ms))
    }

    /// Play the same level again after game over. The finished run's score
    /// is uploaded first. False while the run is still live.
    pub fn restart(&mut self, now_ms: u64) -> Result<bool, ArcadeError> {
        let game = self.game.take().ok_or(ArcadeError::NoActiveGame)?;
        if game.phase() == GamePhase::GameOver {
            self.upload_final_score(&game);
        }
        let game = self.game.insert(game);
        Ok(game.restart(now_ms))
    }

    /// Spend a heart to revive after game over. False when there is nothing
    /// to continue or no heart to spend.
    pub fn continue_with_heart(&mut self, now_ms: u64) -> Result<bool, ArcadeError> {
        let game = self.game.as_mut().ok_or(ArcadeError::NoActiveGame)?;
        if game.phase() != GamePhase::GameOver {
            return Ok(false);
        }
        if !lock_economy(&self.economy).use_heart() {
            return Ok(false);
        }
        Ok(game.revive(now_ms))
    }

    /// Tear down the current run. A run still in progress counts as ended.
    /// This is where the final score is uploaded.
    pub fn end_session(&mut self) {
        if let Some(mut game) = self.game.take() {
            let live = matches!(game.phase(), GamePhase::Running | GamePhase::Paused);
            game.cancel_timers();
            if live {
                self.record_death(&game);
            }
            self.upload_final_score(&game);
        }
    }

    /// End the session and stop every timer.
    pub fn shutdown(&mut self) {
        self.end_session();
        self.sync.cancel();
        self.storage.flush();
    }

    // ---- Timers ----

    /// Earliest pending deadline across all timers.
    pub fn next_deadline(&self) -> Option<u64> {
        let game = self.game.as_ref();
        [
            game.and_then(|g| g.next_tick_at()),
            game.and_then(|g| g.power_ups.next_sweep_at()),
            self.sync.due_at(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Drive every timer that is due at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Vec<ArcadeEvent> {
        let mut events = Vec::new();

        if let Some(result) = self.game.as_mut().and_then(|g| g.poll(now_ms)) {
            events.extend(
                result
                    .expired_power_ups
                    .into_iter()
                    .map(ArcadeEvent::PowerUpExpired),
            );
            if let Some(eaten) = result.food_eaten {
                if eaten.gems > 0 {
                    lock_economy(&self.economy).add_gems(eaten.gems);
                }
                events.push(ArcadeEvent::FoodEaten(eaten));
            }
            if let Some(cause) = result.game_over {
                if let Some(game) = self.game.take() {
                    let new_high_score = self.record_death(&game);
                    events.push(ArcadeEvent::GameOver {
                        cause,
                        score: game.score,
                        new_high_score,
                    });
                    self.game = Some(game);
                }
            }
        }

        match self.sync.poll(now_ms) {
            Some(Ok(state)) => events.push(ArcadeEvent::Synced(state)),
            Some(Err(e)) => events.push(ArcadeEvent::SyncFailed(e.to_string())),
            None => {}
        }

        self.uploads.retain(|h| !h.is_finished());
        events
    }

    // A death may still be continued with a heart, so only the local high
    // score is settled here.
    fn record_death(&mut self, game: &SnakeGame) -> bool {
        lock_economy(&self.economy).record_game_end(game.score)
    }

    fn upload_final_score(&mut self, game: &SnakeGame) {
        if self.api.is_authenticated() && game.score > 0 {
            self.submit_score(ScoreSubmission::new(
                game.score,
                game.level,
                game.mode,
                game.fruits_eaten,
            ));
        }
    }

    fn submit_score(&mut self, submission: ScoreSubmission) {
        let api = Arc::clone(&self.api);
        let spawned = thread::Builder::new()
            .name("score-upload".to_string())
            .spawn(move || {
                if let Err(e) = api.submit_score(&submission) {
                    log::warn!("Score upload failed: {}", e);
                }
            });
        match spawned {
            Ok(handle) => self.uploads.push(handle),
            Err(e) => log::warn!("Could not start score upload: {}", e),
        }
    }

    /// Block until queued score uploads are done.
    pub fn wait_for_uploads(&mut self) {
        for handle in self.uploads.drain(..) {
            let _ = handle.join();
        }
    }

    // ---- Economy ----

    pub fn unlock_level(&mut self, level: Level) -> bool {
        self.economy().unlock(level)
    }

    pub fn buy_hearts(&mut self, bundle_hearts: u32) -> bool {
        self.economy().buy_bundle(bundle_hearts)
    }

    pub fn reset_progress(&mut self) {
        self.economy().reset();
    }

    // ---- Account ----

    pub fn login(&mut self, email: &str, password: &str) -> Result<User, ArcadeError> {
        let auth = self.api.login(email, password)?;
        self.sync.sync_now();
        Ok(auth.user)
    }

    pub fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ArcadeError> {
        let auth = self.api.register(username, email, password)?;
        self.sync.sync_now();
        Ok(auth.user)
    }

    /// Best-effort server logout; the local token is always dropped.
    pub fn logout(&mut self) {
        self.sync.cancel();
        if let Err(e) = self.api.logout() {
            log::warn!("Logout request failed: {}", e);
        }
    }

    pub fn sync_now(&mut self) {
        self.sync.sync_now();
    }

    /// Block on the in-flight sync, if any.
    pub fn wait_for_sync(&mut self) -> Option<Result<EconomyState, ApiError>> {
        self.sync.wait()
    }

    pub fn current_user(&self) -> Result<User, ArcadeError> {
        Ok(self.api.current_user()?)
    }

    pub fn user_stats(&self) -> Result<UserStats, ArcadeError> {
        Ok(self.api.user_stats()?)
    }

    pub fn leaderboard(
        &self,
        period: LeaderboardPeriod,
    ) -> Result<Vec<LeaderboardEntry>, ArcadeError> {
        Ok(self.api.leaderboard(period)?)
    }
}

impl Drop for Arcade {
    fn drop(&mut self) {
        self.shutdown();
    }
}
