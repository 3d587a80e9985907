//! Shared fakes for integration tests.

#![allow(dead_code)]

use snake_arcade::remote::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-process stand-in for the scoring server.
///
/// Holds a server-side economy snapshot that `sync` merges with the pushed
/// one, like the real endpoint does.
#[derive(Default)]
pub struct FakeServer {
    pub token: Mutex<Option<String>>,
    pub server_state: Mutex<SyncPayload>,
    pub pushed: Mutex<Vec<SyncPayload>>,
    pub scores: Mutex<Vec<ScoreSubmission>>,
    pub sync_calls: AtomicUsize,
    pub reject_sync: Mutex<Option<u16>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged_in() -> Self {
        let server = Self::new();
        *server.token.lock().unwrap() = Some("token".to_string());
        server
    }

    pub fn with_server_state(self, state: SyncPayload) -> Self {
        *self.server_state.lock().unwrap() = state;
        self
    }

    pub fn sync_count(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }

    fn require_token(&self) -> Result<(), ApiError> {
        if self.token.lock().unwrap().is_some() {
            Ok(())
        } else {
            Err(ApiError::NotAuthenticated)
        }
    }

    fn auth(&self, username: &str) -> AuthResponse {
        let token = format!("token-{}", username);
        *self.token.lock().unwrap() = Some(token.clone());
        AuthResponse {
            token,
            user: User {
                id: "1".to_string(),
                username: username.to_string(),
                email: format!("{}@example.com", username),
            },
        }
    }
}

impl RemoteApi for FakeServer {
    fn is_authenticated(&self) -> bool {
        self.token.lock().unwrap().is_some()
    }

    fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        if password != "hunter2" {
            return Err(ApiError::Status {
                code: 400,
                message: "Invalid credentials".to_string(),
            });
        }
        let name = email.split('@').next().unwrap_or(email);
        Ok(self.auth(name))
    }

    fn register(&self, username: &str, _email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        Ok(self.auth(username))
    }

    fn logout(&self) -> Result<(), ApiError> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }

    fn current_user(&self) -> Result<User, ApiError> {
        self.require_token()?;
        Ok(User::default())
    }

    fn user_stats(&self) -> Result<UserStats, ApiError> {
        self.require_token()?;
        let scores = self.scores.lock().unwrap();
        Ok(UserStats {
            games_played: scores.len() as u32,
            total_score: scores.iter().map(|s| s.score as u64).sum(),
            best_score: scores.iter().map(|s| s.score).max().unwrap_or(0),
            fruits_eaten: scores.iter().map(|s| s.fruits_eaten as u64).sum(),
        })
    }

    fn submit_score(&self, score: &ScoreSubmission) -> Result<(), ApiError> {
        self.require_token()?;
        self.scores.lock().unwrap().push(score.clone());
        Ok(())
    }

    fn leaderboard(&self, _period: LeaderboardPeriod) -> Result<Vec<LeaderboardEntry>, ApiError> {
        Ok(vec![LeaderboardEntry {
            rank: 1,
            username: "ada".to_string(),
            score: 999,
            level: 3,
        }])
    }

    fn sync(&self, local: &SyncPayload) -> Result<SyncPayload, ApiError> {
        self.require_token()?;
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = *self.reject_sync.lock().unwrap() {
            if code == 401 {
                *self.token.lock().unwrap() = None;
                return Err(ApiError::Unauthorized);
            }
            return Err(ApiError::Status {
                code,
                message: "rejected".to_string(),
            });
        }
        self.pushed.lock().unwrap().push(local.clone());
        let mut server = self.server_state.lock().unwrap();
        server.gems = server.gems.max(local.gems);
        server.hearts = server.hearts.max(local.hearts);
        server.high_score = server.high_score.max(local.high_score);
        for level in &local.unlocked_levels {
            if !server.unlocked_levels.contains(level) {
                server.unlocked_levels.push(*level);
            }
        }
        server.unlocked_levels.sort_unstable();
        Ok(server.clone())
    }
}
