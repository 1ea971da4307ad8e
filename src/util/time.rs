//! Time utilities for the simulation loop

use std::time::Instant;

/// Default tick rate for the headless host (one tick per display refresh)
pub const SIMULATION_TPS: u32 = 60;
/// Render frames emitted per second
pub const SNAPSHOT_TPS: u32 = 20;

/// Largest step fed into a single tick, bounds error during frame hitches
pub const MAX_FRAME_STEP: f32 = 0.05;

/// Clamp a measured frame delta into `[0, MAX_FRAME_STEP]`
pub fn clamp_step(dt: f32) -> f32 {
    // NaN collapses to zero through `max`
    dt.max(0.0).min(MAX_FRAME_STEP)
}

/// How many ticks to wait between render frames
pub fn snapshot_interval(tick_rate: u32) -> u32 {
    (tick_rate / SNAPSHOT_TPS).max(1)
}

/// Wall-clock frame timer used by the host loop to measure dt
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last: Instant,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call (or construction), clamped to a safe step
    pub fn lap(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        clamp_step(dt)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
