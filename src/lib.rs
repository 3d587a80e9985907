//! Snake Arcade - game core library
//!
//! Movement engine, food and power-up generation, the gem/heart economy, local
//! persistence and server sync. The binaries are thin front-ends over this.

pub mod arcade;
pub mod core;
pub mod economy;
pub mod game;
pub mod remote;
pub mod simulator;
pub mod storage;
pub mod sync;

pub use arcade::{Arcade, ArcadeError, ArcadeEvent};
