//! Request and response shapes of the scoring/economy API.

use crate::economy::EconomyState;
use crate::game::{GameMode, Level};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub games_played: u32,
    pub total_score: u64,
    pub best_score: u32,
    pub fruits_eaten: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub score: u32,
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardPeriod {
    Global,
    Daily,
    Weekly,
    Monthly,
}

impl LeaderboardPeriod {
    pub const ALL: [LeaderboardPeriod; 4] = [
        LeaderboardPeriod::Global,
        LeaderboardPeriod::Daily,
        LeaderboardPeriod::Weekly,
        LeaderboardPeriod::Monthly,
    ];

    /// Path segment used in `/leaderboard/{period}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardPeriod::Global => "global",
            LeaderboardPeriod::Daily => "daily",
            LeaderboardPeriod::Weekly => "weekly",
            LeaderboardPeriod::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
    }
}

/// Body of `POST /scores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score: u32,
    pub level: u8,
    pub mode: String,
    pub fruits_eaten: u32,
}

impl ScoreSubmission {
    pub fn new(score: u32, level: Level, mode: GameMode, fruits_eaten: u32) -> Self {
        Self {
            score,
            level: level.number(),
            mode: mode.name().to_lowercase(),
            fruits_eaten,
        }
    }
}

/// Sync request body; the response has the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPayload {
    pub gems: u32,
    pub hearts: u32,
    pub unlocked_levels: Vec<u8>,
    pub high_score: u32,
}

impl From<&EconomyState> for SyncPayload {
    fn from(state: &EconomyState) -> Self {
        Self {
            gems: state.gems,
            hearts: state.hearts,
            unlocked_levels: state.unlocked_levels.iter().copied().collect(),
            high_score: state.high_score,
        }
    }
}

impl From<SyncPayload> for EconomyState {
    fn from(payload: SyncPayload) -> Self {
        EconomyState {
            gems: payload.gems,
            hearts: payload.hearts,
            unlocked_levels: payload.unlocked_levels.into_iter().collect(),
            high_score: payload.high_score,
        }
        .normalized()
    }
}
