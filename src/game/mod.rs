//! Snake gameplay: board types, food, power-ups and the movement engine.

pub mod engine;
pub mod food;
pub mod obstacles;
pub mod power_ups;
pub mod types;

pub use engine::{CollisionCause, FoodEaten, SnakeGame, TickResult};
pub use food::{Food, FoodType};
pub use power_ups::{ActivePowerUp, PowerUpKind, PowerUpTracker};
pub use types::{Direction, GameMode, GamePhase, Grid, Level, Position};
