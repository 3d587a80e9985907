//! Constants, configuration, clock and build info shared by every module.

pub mod build_info;
pub mod clock;
pub mod config;
pub mod constants;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ArcadeConfig;
pub use constants::*;
