//! Local persistence: key-value backends and the game-data adapter.

pub mod adapter;
pub mod backend;

pub use adapter::{keys, GameDataStorage};
pub use backend::{FileStore, KeyValueStore, MemoryStore};
