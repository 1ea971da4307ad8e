//! Rate limiting for inbound host commands

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Max inbound commands per second (intent updates arrive at display rate)
pub const COMMAND_RATE_LIMIT: u32 = 240;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Command gate for a single host connection
#[derive(Clone)]
pub struct CommandRateLimiter {
    limiter: Arc<Limiter>,
}

impl CommandRateLimiter {
    pub fn new(per_second: u32) -> Self {
        Self {
            limiter: create_limiter(per_second),
        }
    }

    /// Returns true if the command may be processed
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for CommandRateLimiter {
    fn default() -> Self {
        Self::new(COMMAND_RATE_LIMIT)
    }
}

impl std::fmt::Debug for CommandRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRateLimiter").finish_non_exhaustive()
    }
}
