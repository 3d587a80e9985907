//! Runtime configuration.
//!
//! Read from `config.json` in the platform config directory. A missing or
//! unreadable file yields the defaults; `SNAKE_ARCADE_API_URL` and
//! `SNAKE_ARCADE_DATA_DIR` override the file.

use super::constants::*;
use crate::game::GameMode;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const ENV_API_URL: &str = "SNAKE_ARCADE_API_URL";
pub const ENV_DATA_DIR: &str = "SNAKE_ARCADE_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    /// Base URL of the scoring/economy API, without trailing slash.
    pub api_base_url: String,
    pub grid_width: i32,
    pub grid_height: i32,
    /// Difficulty used when a game is started without an explicit mode.
    pub mode: GameMode,
    pub sync_debounce_ms: u64,
    pub storage_probe_timeout_ms: u64,
    pub power_up_poll_ms: u64,
    /// Where the durable key-value files live. `None` = platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            mode: GameMode::Normal,
            sync_debounce_ms: SYNC_DEBOUNCE_MS,
            storage_probe_timeout_ms: STORAGE_PROBE_TIMEOUT_MS,
            power_up_poll_ms: POWER_UP_POLL_MS,
            data_dir: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "snake-arcade", "snake-arcade")
}

impl ArcadeConfig {
    /// Load from the platform config directory, then apply env overrides.
    pub fn load() -> Self {
        let mut config = project_dirs()
            .map(|dirs| Self::load_from(&dirs.config_dir().join(CONFIG_FILE)))
            .unwrap_or_default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load a config file, returning defaults if missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|s| !s.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|s| !s.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
    }

    /// Directory for the durable key-value store.
    pub fn resolve_data_dir(&self) -> io::Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArcadeConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 30);
        assert_eq!(config.mode, GameMode::Normal);
        assert_eq!(config.sync_debounce_ms, 2_000);
        assert_eq!(config.storage_probe_timeout_ms, 1_000);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArcadeConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, ArcadeConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"grid_width": 24, "mode": "Hard"}"#).unwrap();

        let config = ArcadeConfig::load_from(&path);
        assert_eq!(config.grid_width, 24);
        assert_eq!(config.mode, GameMode::Hard);
        assert_eq!(config.grid_height, 30);
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();
        assert_eq!(ArcadeConfig::load_from(&path), ArcadeConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = ArcadeConfig {
            sync_debounce_ms: 500,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(ArcadeConfig::load_from(&path), config);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ArcadeConfig::default();
        config.apply_env_overrides(|key| match key {
            ENV_API_URL => Some("http://localhost:8080/api/".to_string()),
            ENV_DATA_DIR => Some("/tmp/arcade".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/arcade")));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = ArcadeConfig {
            data_dir: Some(PathBuf::from("/data/arcade")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_data_dir().unwrap(),
            PathBuf::from("/data/arcade")
        );
    }
}
