//! Actor movement and arena constraints

use rand::Rng;

use super::actor::Actor;

/// Margin kept clear on the left, right and bottom edges
pub const SIDE_MARGIN: f32 = 20.0;
/// Top margin, reserves the HUD strip
pub const TOP_MARGIN: f32 = 60.0;

/// Spawn area insets (relative to the full arena)
const SPAWN_INSET_X: f32 = 60.0;
const SPAWN_INSET_TOP: f32 = 80.0;
const SPAWN_INSET_BOTTOM: f32 = 120.0;

/// Arena dimensions and the playable rectangle derived from them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    pub width: f32,
    pub height: f32,
}

impl ArenaBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn min_x(&self) -> f32 {
        SIDE_MARGIN
    }

    pub fn max_x(&self) -> f32 {
        (self.width - SIDE_MARGIN).max(SIDE_MARGIN)
    }

    pub fn min_y(&self) -> f32 {
        TOP_MARGIN
    }

    pub fn max_y(&self) -> f32 {
        (self.height - SIDE_MARGIN).max(TOP_MARGIN)
    }

    /// Clamp a point into the playable rectangle
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(self.min_x(), self.max_x()),
            y.clamp(self.min_y(), self.max_y()),
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (self.min_x()..=self.max_x()).contains(&x) && (self.min_y()..=self.max_y()).contains(&y)
    }

    /// Random spawn point, kept away from the edges
    pub fn spawn_point<R: Rng + ?Sized>(&self, rng: &mut R) -> (f32, f32) {
        let x = sample_span(rng, SPAWN_INSET_X, self.width - SPAWN_INSET_X);
        let y = sample_span(rng, SPAWN_INSET_TOP, self.height - SPAWN_INSET_BOTTOM);
        self.clamp(x, y)
    }
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self::new(960.0, 640.0)
    }
}

fn sample_span<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Movement resolver for actors
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Set velocity from a control intent; magnitude is capped at 1 before scaling
    pub fn steer(actor: &mut Actor, intent_x: f32, intent_y: f32) {
        let (ix, iy) = clamp_magnitude(intent_x, intent_y);
        actor.vel_x = ix * actor.speed;
        actor.vel_y = iy * actor.speed;
    }

    /// Move by current velocity and clamp into the arena. Dead actors stay put.
    pub fn integrate(actor: &mut Actor, dt: f32, bounds: &ArenaBounds) {
        if !actor.alive {
            return;
        }

        let (x, y) = bounds.clamp(actor.x + actor.vel_x * dt, actor.y + actor.vel_y * dt);
        actor.x = x;
        actor.y = y;
    }

    /// Apply a control intent and integrate in one step
    pub fn advance(actor: &mut Actor, intent_x: f32, intent_y: f32, dt: f32, bounds: &ArenaBounds) {
        if !actor.alive {
            return;
        }
        Self::steer(actor, intent_x, intent_y);
        Self::integrate(actor, dt, bounds);
    }

    /// Velocity pointing from `from` to `to` at `speed`; None when the points
    /// are too close for a meaningful heading
    pub fn velocity_toward(from: &Actor, to: &Actor, speed: f32) -> Option<(f32, f32)> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let dist = dx.hypot(dy);
        if dist <= 1.0 {
            return None;
        }
        Some((dx / dist * speed, dy / dist * speed))
    }
}

/// Scale a vector down to unit length if it is longer
pub fn clamp_magnitude(x: f32, y: f32) -> (f32, f32) {
    if !x.is_finite() || !y.is_finite() {
        return (0.0, 0.0);
    }
    let mag = x.hypot(y);
    if mag > 1.0 {
        (x / mag, y / mag)
    } else {
        (x, y)
    }
}
