//! Actor model and roster spawning

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics::ArenaBounds;

/// Collision/visual radius shared by every actor
pub const ACTOR_RADIUS: f32 = 16.0;
/// Base speed of autonomous actors (units per second)
pub const BASE_SPEED: f32 = 50.0;
/// Base speed of the human-controlled actor
pub const HUMAN_SPEED: f32 = 120.0;

/// Body colors, cycled over the roster
pub const ACTOR_COLORS: [&str; 6] = [
    "#e74c3c", "#27ae60", "#f39c12", "#3498db", "#9b59b6", "#e67e22",
];

/// One participant in the match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Driven by host input instead of wandering
    pub is_human: bool,

    // Position and movement
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub radius: f32,
    pub speed: f32,

    pub alive: bool,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: ACTOR_COLORS[0].to_string(),
            is_human: false,
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            radius: ACTOR_RADIUS,
            speed: BASE_SPEED,
            alive: true,
        }
    }

    /// Mark as the locally controlled participant (gets the faster base speed)
    pub fn into_human(mut self) -> Self {
        self.is_human = true;
        self.speed = HUMAN_SPEED;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Euclidean distance to another actor
    pub fn distance_to(&self, other: &Actor) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Spawn a fresh roster; slot 0 is always the human
pub fn spawn_roster<R: Rng + ?Sized>(rng: &mut R, size: usize, bounds: &ArenaBounds) -> Vec<Actor> {
    (0..size)
        .map(|i| {
            let (x, y) = bounds.spawn_point(rng);
            let actor = Actor::new(format!("p{i}"), format!("Player {}", i + 1), x, y)
                .with_color(ACTOR_COLORS[i % ACTOR_COLORS.len()]);
            if i == 0 {
                actor.into_human()
            } else {
                actor
            }
        })
        .collect()
}
