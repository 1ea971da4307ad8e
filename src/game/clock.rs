//! Round countdown

use serde::{Deserialize, Serialize};

/// Default round length in seconds
pub const DEFAULT_ROUND_SECS: f32 = 30.0;

/// Counts a fixed time budget down to zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundClock {
    limit: f32,
    remaining: f32,
}

impl RoundClock {
    pub fn new(limit: f32) -> Self {
        let limit = limit.max(0.0);
        Self {
            limit,
            remaining: limit,
        }
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Seconds left, never below zero
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Override the time left (scripted scenarios, debug tooling)
    pub fn set_remaining(&mut self, secs: f32) {
        self.remaining = secs.clamp(0.0, f32::MAX);
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Count down by `dt`; returns true once the budget is exhausted
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        self.is_expired()
    }
}

impl Default for RoundClock {
    fn default() -> Self {
        Self::new(DEFAULT_ROUND_SECS)
    }
}
