//! Read-only views of the match for HUD, render and vote-prompt consumers

use serde::{Deserialize, Serialize};

use super::r#match::{MatchPhase, MatchState};

/// Status text while the round is running
pub const STATUS_PLAYING: &str = "Playing";
/// Status text while the world is frozen for a vote
pub const STATUS_VOTING: &str = "Voting in progress";

/// HUD line: countdown plus status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    /// Seconds left in the round (never negative)
    pub time_remaining: f32,
    /// "Playing", "Voting in progress" or the outcome message
    pub status_text: String,
}

/// Entry in the vote prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCandidate {
    pub id: String,
    pub name: String,
    pub is_human: bool,
}

/// Everything a renderer needs to draw one actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    pub id: String,
    pub name: String,
    pub color: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub alive: bool,
    pub is_human: bool,
}

/// Builds views and paces render frames
#[derive(Debug)]
pub struct SnapshotBuilder {
    /// Tick counter since last frame
    ticks_since_snapshot: u32,
    /// Frame interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a render frame
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force a frame on next check (used for eliminations and phase changes)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    pub fn hud(state: &MatchState) -> HudSnapshot {
        let status_text = match state.phase() {
            MatchPhase::Playing => STATUS_PLAYING.to_string(),
            MatchPhase::Voting => STATUS_VOTING.to_string(),
            MatchPhase::Resolved(outcome) => outcome.message().to_string(),
        };

        HudSnapshot {
            time_remaining: state.clock.remaining(),
            status_text,
        }
    }

    /// Alive actors in roster order
    pub fn vote_candidates(state: &MatchState) -> Vec<VoteCandidate> {
        state
            .roster()
            .iter()
            .filter(|a| a.alive)
            .map(|a| VoteCandidate {
                id: a.id.clone(),
                name: a.name.clone(),
                is_human: a.is_human,
            })
            .collect()
    }

    /// Whole roster, dead actors included (drawn as ghosts)
    pub fn frame(state: &MatchState) -> Vec<ActorView> {
        state
            .roster()
            .iter()
            .map(|a| ActorView {
                id: a.id.clone(),
                name: a.name.clone(),
                color: a.color.clone(),
                x: a.x,
                y: a.y,
                radius: a.radius,
                alive: a.alive,
                is_human: a.is_human,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::Actor;
    use crate::game::clock::RoundClock;
    use uuid::Uuid;

    fn state() -> MatchState {
        let roster = vec![
            Actor::new("p0", "Player 1", 100.0, 100.0).into_human(),
            Actor::new("p1", "Player 2", 200.0, 100.0),
            Actor::new("p2", "Player 3", 300.0, 100.0),
        ];
        MatchState::scripted(Uuid::nil(), roster, "p2", RoundClock::new(30.0))
            .expect("valid roster")
    }

    #[test]
    fn frame_interval_paces_frames() {
        let mut builder = SnapshotBuilder::new(3);
        assert!(!builder.should_send());
        assert!(!builder.should_send());
        assert!(builder.should_send());
        builder.force_next();
        assert!(builder.should_send());
    }

    #[test]
    fn candidates_skip_the_dead() {
        let mut state = state();
        state.set_alive("p1", false).expect("p1 exists");
        let ids: Vec<_> = SnapshotBuilder::vote_candidates(&state)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, ["p0", "p2"]);
        assert_eq!(SnapshotBuilder::frame(&state).len(), 3);
    }

    #[test]
    fn hud_reports_playing() {
        let hud = SnapshotBuilder::hud(&state());
        assert_eq!(hud.status_text, STATUS_PLAYING);
        assert_eq!(hud.time_remaining, 30.0);
    }
}
