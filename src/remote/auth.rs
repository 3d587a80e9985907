//! Bearer token held in memory and mirrored to local storage.

use crate::storage::GameDataStorage;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
    storage: Option<GameDataStorage>,
}

impl TokenStore {
    /// Token store without persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously saved token from `storage`.
    pub fn load(storage: GameDataStorage) -> Self {
        let token = storage.load_auth_token();
        if token.is_some() {
            log::debug!("Restored saved session");
        }
        Self {
            token: RwLock::new(token),
            storage: Some(storage),
        }
    }

    pub fn get(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    pub fn set(&self, token: &str) {
        self.replace(Some(token.to_string()));
        if let Some(storage) = &self.storage {
            storage.save_auth_token(token);
        }
    }

    pub fn clear(&self) {
        self.replace(None);
        if let Some(storage) = &self.storage {
            storage.clear_auth_token();
        }
    }

    fn replace(&self, value: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}
