//! Game simulation modules

pub mod actor;
pub mod ai;
pub mod clock;
pub mod intent;
pub mod r#match;
pub mod physics;
pub mod snapshot;
pub mod vote;

pub use actor::Actor;
pub use intent::{ControlState, Direction, PlayerIntent};
pub use physics::ArenaBounds;
pub use r#match::{
    GameMatch, MatchError, MatchEvent, MatchOutcome, MatchPhase, MatchResult, MatchSettings,
    MatchState, ResolutionReason,
};
pub use snapshot::{ActorView, HudSnapshot, SnapshotBuilder, VoteCandidate};
