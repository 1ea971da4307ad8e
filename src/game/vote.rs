//! Vote resolution

use super::r#match::{MatchOutcome, ResolutionReason};

/// What the vote did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteVerdict {
    /// Nobody was selected
    Abstained,
    /// The impostor was picked and is ejected
    ImpostorEjected,
    /// Someone innocent was picked
    WrongPick,
}

impl VoteVerdict {
    pub fn outcome(self) -> MatchOutcome {
        match self {
            VoteVerdict::Abstained => MatchOutcome::lost(ResolutionReason::NobodyEjected),
            VoteVerdict::ImpostorEjected => MatchOutcome::won(ResolutionReason::ImpostorEjected),
            VoteVerdict::WrongPick => MatchOutcome::lost(ResolutionReason::ImpostorRemainsFree),
        }
    }
}

/// Decide a vote. Depends only on the selection and the impostor's id; the
/// impostor's current alive status does not matter.
pub fn resolve_vote(selection: Option<&str>, impostor_id: &str) -> VoteVerdict {
    match selection {
        None => VoteVerdict::Abstained,
        Some(id) if id == impostor_id => VoteVerdict::ImpostorEjected,
        Some(_) => VoteVerdict::WrongPick,
    }
}
