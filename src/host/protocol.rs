//! Host protocol message definitions
//! These are the JSON-line types exchanged with the embedding host (stdin/stdout)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{
    ActorView, Direction, HudSnapshot, MatchOutcome, MatchResult, ResolutionReason, VoteCandidate,
};

/// Messages sent from the host to the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    /// Pre-mapped movement vector and action button
    Intent {
        move_x: f32,
        move_y: f32,
        #[serde(default)]
        action: bool,
    },

    /// Directional key pressed or released
    Key { direction: Direction, pressed: bool },

    /// Virtual joystick moved
    Stick { angle: f32, force: f32 },

    /// Virtual joystick let go
    StickReleased,

    /// Action button pressed or released
    Action { pressed: bool },

    /// Call a vote early
    RequestVote,

    /// Submit the vote (absent id = nobody)
    ResolveVote {
        #[serde(default)]
        selected_id: Option<String>,
    },

    /// Start a new match
    Reset,

    /// Stop the host loop
    Quit,
}

/// Messages sent from the simulation to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// New match began
    MatchStarted {
        match_id: Uuid,
        roster: Vec<ActorView>,
    },

    /// HUD refresh
    Hud(HudSnapshot),

    /// Render frame (sent at the snapshot rate)
    Frame { tick: u64, actors: Vec<ActorView> },

    /// Voting opened; offer these actors
    VotePrompt { candidates: Vec<VoteCandidate> },

    /// Actor taken out by the impostor
    Eliminated { victim_id: String, name: String },

    /// Match has ended
    MatchEnd {
        match_id: Uuid,
        result: MatchResult,
        reason: ResolutionReason,
        message: String,
        ended_at: DateTime<Utc>,
    },

    /// Error message
    Error { code: String, message: String },
}

impl HostEvent {
    pub fn match_end(match_id: Uuid, outcome: MatchOutcome) -> Self {
        HostEvent::MatchEnd {
            match_id,
            result: outcome.result,
            reason: outcome.reason,
            message: outcome.message().to_string(),
            ended_at: Utc::now(),
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        HostEvent::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Parse one inbound JSON line
pub fn parse_command(line: &str) -> Result<HostCommand, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Encode one outbound event as a JSON line (without the newline)
pub fn encode_event(event: &HostEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}
