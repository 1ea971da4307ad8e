//! Human control intent: held directions, joystick and the action button

use serde::{Deserialize, Serialize};

use super::physics::clamp_magnitude;

/// Directional input (keyboard arrows / WASD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Control state sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Movement vector, magnitude in [0, 1]
    pub move_x: f32,
    pub move_y: f32,
    /// Accusation button held
    pub action: bool,
}

impl PlayerIntent {
    pub fn new(move_x: f32, move_y: f32, action: bool) -> Self {
        let (move_x, move_y) = clamp_magnitude(move_x, move_y);
        Self {
            move_x,
            move_y,
            action,
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }
}

/// Tracks which inputs are currently held and folds them into a `PlayerIntent`
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    /// Analog stick vector, overrides keys while engaged
    stick: Option<(f32, f32)>,
    /// Host-mapped movement, dropped as soon as a key or the stick is used
    raw: Option<(f32, f32)>,
    action: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_direction(&mut self, direction: Direction, pressed: bool) {
        self.raw = None;
        match direction {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    /// Stick moved: `angle` in radians (screen space, y down), `force` >= 0
    pub fn set_stick(&mut self, angle: f32, force: f32) {
        let force = force.clamp(0.0, 1.0);
        self.raw = None;
        self.stick = Some((angle.cos() * force, angle.sin() * force));
    }

    pub fn release_stick(&mut self) {
        self.stick = None;
    }

    pub fn set_action(&mut self, pressed: bool) {
        self.action = pressed;
    }

    /// Replace everything with an explicit intent (hosts that do their own mapping)
    pub fn set_raw(&mut self, intent: PlayerIntent) {
        *self = Self::default();
        self.raw = Some((intent.move_x, intent.move_y));
        self.action = intent.action;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Current intent; diagonal key input is normalized so it is no faster than an axis
    pub fn intent(&self) -> PlayerIntent {
        let (x, y) = match self.stick.or(self.raw) {
            Some(v) => v,
            None => {
                let x = axis(self.left, self.right);
                let y = axis(self.up, self.down);
                let mag = x.hypot(y);
                if mag > 0.0 {
                    (x / mag, y / mag)
                } else {
                    (0.0, 0.0)
                }
            }
        };
        PlayerIntent::new(x, y, self.action)
    }
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}
