//! Remote scoring/economy API.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::TokenStore;
pub use client::{ApiError, HttpApiClient, RemoteApi};
pub use types::{
    AuthResponse, LeaderboardEntry, LeaderboardPeriod, ScoreSubmission, SyncPayload, User,
    UserStats,
};
