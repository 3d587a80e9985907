//! Time-boxed status effects granted by special food.
//!
//! Expiry is swept on a fixed poll interval rather than checked lazily, so an
//! effect may outlive its end time by at most one interval.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    SpeedSlow,
    Invincibility,
    DoublePoints,
    GhostMode,
}

impl PowerUpKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpeedBoost => "Speed Boost",
            Self::SpeedSlow => "Slow Motion",
            Self::Invincibility => "Invincible",
            Self::DoublePoints => "Double Points",
            Self::GhostMode => "Ghost",
        }
    }

    pub fn affects_speed(&self) -> bool {
        matches!(self, Self::SpeedBoost | Self::SpeedSlow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub end_ms: u64,
    /// Tick-period multiplier (< 1 faster, > 1 slower). Speed effects only.
    pub speed_factor: Option<f64>,
}

impl ActivePowerUp {
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.end_ms.saturating_sub(now_ms)
    }
}

#[derive(Debug, Clone)]
pub struct PowerUpTracker {
    active: Vec<ActivePowerUp>,
    poll_interval_ms: u64,
    next_sweep_at: Option<u64>,
}

impl PowerUpTracker {
    pub fn new(poll_interval_ms: u64) -> Self {
        Self {
            active: Vec::new(),
            poll_interval_ms: poll_interval_ms.max(1),
            next_sweep_at: None,
        }
    }

    /// Start (or refresh) an effect. Durations never stack.
    ///
    /// Speed effects are mutually exclusive: the most recently activated one
    /// replaces the other.
    pub fn activate(
        &mut self,
        kind: PowerUpKind,
        duration_ms: u64,
        speed_factor: Option<f64>,
        now_ms: u64,
    ) {
        self.active.retain(|p| {
            p.kind != kind && !(kind.affects_speed() && p.kind.affects_speed())
        });
        self.active.push(ActivePowerUp {
            kind,
            end_ms: now_ms.saturating_add(duration_ms),
            speed_factor: if kind.affects_speed() {
                speed_factor
            } else {
                None
            },
        });
        if self.next_sweep_at.is_none() {
            self.next_sweep_at = Some(now_ms + self.poll_interval_ms);
        }
    }

    /// Run the expiry sweep if its timer is due. Returns the kinds that expired.
    pub fn poll(&mut self, now_ms: u64) -> Vec<PowerUpKind> {
        match self.next_sweep_at {
            Some(due) if now_ms >= due => {}
            _ => return Vec::new(),
        }

        let mut expired = Vec::new();
        self.active.retain(|p| {
            if p.end_ms <= now_ms {
                expired.push(p.kind);
                false
            } else {
                true
            }
        });

        self.next_sweep_at = if self.active.is_empty() {
            None
        } else {
            Some(now_ms + self.poll_interval_ms)
        };
        expired
    }

    /// Membership against the last sweep.
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|p| p.kind == kind)
    }

    /// Factor of the active speed effect, or 1.0.
    pub fn speed_factor(&self) -> f64 {
        self.active
            .iter()
            .find_map(|p| p.speed_factor)
            .unwrap_or(1.0)
    }

    /// Active effects with remaining time, for display.
    pub fn active_list(&self, now_ms: u64) -> Vec<(PowerUpKind, u64)> {
        self.active
            .iter()
            .map(|p| (p.kind, p.remaining_ms(now_ms)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop every effect and cancel the sweep timer.
    pub fn clear(&mut self) {
        self.active.clear();
        self.next_sweep_at = None;
    }

    pub fn next_sweep_at(&self) -> Option<u64> {
        self.next_sweep_at
    }
}

impl Default for PowerUpTracker {
    fn default() -> Self {
        Self::new(crate::core::constants::POWER_UP_POLL_MS)
    }
}
