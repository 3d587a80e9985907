//! Blocking HTTP client for the scoring/economy API.

use super::auth::TokenStore;
use super::types::*;
use crate::core::constants::HTTP_TIMEOUT_SECONDS;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session expired, please log in again")]
    Unauthorized,
    #[error("server returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("not logged in")]
    NotAuthenticated,
}

/// Everything the game needs from the remote service.
///
/// Implementations own the bearer token: a successful login or registration
/// stores it, logout and any 401 response clear it.
pub trait RemoteApi: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
    fn register(&self, username: &str, email: &str, password: &str)
        -> Result<AuthResponse, ApiError>;
    fn logout(&self) -> Result<(), ApiError>;
    fn current_user(&self) -> Result<User, ApiError>;
    fn user_stats(&self) -> Result<UserStats, ApiError>;
    fn submit_score(&self, score: &ScoreSubmission) -> Result<(), ApiError>;
    fn leaderboard(&self, period: LeaderboardPeriod) -> Result<Vec<LeaderboardEntry>, ApiError>;
    /// Push the local snapshot and return the server's view of the same fields.
    fn sync(&self, local: &SyncPayload) -> Result<SyncPayload, ApiError>;
}

pub struct HttpApiClient {
    agent: ureq::Agent,
    base_url: String,
    tokens: TokenStore,
}

impl HttpApiClient {
    pub fn new(base_url: &str, tokens: TokenStore) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .user_agent(concat!("snake-arcade/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: ureq::Request, required: bool) -> Result<ureq::Request, ApiError> {
        match self.tokens.get() {
            Some(token) => Ok(request.set("Authorization", &format!("Bearer {}", token))),
            None if required => Err(ApiError::NotAuthenticated),
            None => Ok(request),
        }
    }

    fn handle(&self, result: Result<ureq::Response, ureq::Error>) -> Result<ureq::Response, ApiError> {
        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(401, _)) => {
                if self.tokens.is_present() {
                    log::warn!("Server rejected the session token, logging out");
                    self.tokens.clear();
                }
                Err(ApiError::Unauthorized)
            }
            Err(ureq::Error::Status(code, response)) => Err(ApiError::Status {
                code,
                message: error_message(response),
            }),
            Err(ureq::Error::Transport(t)) => Err(ApiError::Transport(t.to_string())),
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str, auth_required: bool) -> Result<T, ApiError> {
        let request = self.authorize(self.agent.get(&self.url(path)), auth_required)?;
        decode(self.handle(request.call())?)
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth_required: bool,
    ) -> Result<T, ApiError> {
        let request = self.authorize(self.agent.post(&self.url(path)), auth_required)?;
        decode(self.handle(request.send_json(body))?)
    }

    fn post_discard<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let request = self.authorize(self.agent.post(&self.url(path)), true)?;
        self.handle(request.send_json(body)).map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ApiError> {
    response
        .into_json()
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Prefer the `message`/`error` field of a JSON error body over the raw text.
fn error_message(response: ureq::Response) -> String {
    let status_text = response.status_text().to_string();
    let body = response.into_string().unwrap_or_default();
    extract_error_message(&body).unwrap_or(status_text)
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|k| value.get(k).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

impl RemoteApi for HttpApiClient {
    fn is_authenticated(&self) -> bool {
        self.tokens.is_present()
    }

    fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse =
            self.post("/auth/login", &LoginRequest { email, password }, false)?;
        self.tokens.set(&auth.token);
        log::info!("Logged in as {}", auth.user.username);
        Ok(auth)
    }

    fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        let auth: AuthResponse = self.post("/auth/register", &body, false)?;
        self.tokens.set(&auth.token);
        log::info!("Registered {}", auth.user.username);
        Ok(auth)
    }

    fn logout(&self) -> Result<(), ApiError> {
        let result = self.post_discard("/auth/logout", &serde_json::json!({}));
        self.tokens.clear();
        result
    }

    fn current_user(&self) -> Result<User, ApiError> {
        self.get("/user", true)
    }

    fn user_stats(&self) -> Result<UserStats, ApiError> {
        self.get("/user/stats", true)
    }

    fn submit_score(&self, score: &ScoreSubmission) -> Result<(), ApiError> {
        self.post_discard("/scores", score)
    }

    fn leaderboard(&self, period: LeaderboardPeriod) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.get(&format!("/leaderboard/{}", period.as_str()), false)
    }

    fn sync(&self, local: &SyncPayload) -> Result<SyncPayload, ApiError> {
        self.post("/user/sync", local, true)
    }
}
