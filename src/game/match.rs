//! Match state, phase machine and the per-tick simulation

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::actor::{spawn_roster, Actor};
use super::ai::AiSystem;
use super::clock::{RoundClock, DEFAULT_ROUND_SECS};
use super::intent::PlayerIntent;
use super::physics::{ArenaBounds, PhysicsSystem};
use super::snapshot::{ActorView, HudSnapshot, SnapshotBuilder, VoteCandidate};
use super::vote::{self, VoteVerdict};

/// Win/loss from the crew's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Won,
    Lost,
}

/// Why the match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionReason {
    /// The impostor got the human
    KilledByImpostor,
    /// The human confronted the impostor up close
    ImpostorFound,
    /// The vote picked the impostor
    ImpostorEjected,
    /// The vote picked nobody
    NobodyEjected,
    /// The vote picked an innocent
    ImpostorRemainsFree,
}

impl ResolutionReason {
    pub fn message(self) -> &'static str {
        match self {
            ResolutionReason::KilledByImpostor => "You were killed by the impostor.",
            ResolutionReason::ImpostorFound => "You found the impostor. You win!",
            ResolutionReason::ImpostorEjected => "The impostor was ejected. The crew wins!",
            ResolutionReason::NobodyEjected => "No one was ejected. The impostor wins.",
            ResolutionReason::ImpostorRemainsFree => "The impostor remains free. You lose.",
        }
    }
}

/// Final result plus the reason shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub result: MatchResult,
    pub reason: ResolutionReason,
}

impl MatchOutcome {
    pub fn won(reason: ResolutionReason) -> Self {
        Self {
            result: MatchResult::Won,
            reason,
        }
    }

    pub fn lost(reason: ResolutionReason) -> Self {
        Self {
            result: MatchResult::Lost,
            reason,
        }
    }

    pub fn message(&self) -> &'static str {
        self.reason.message()
    }
}

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MatchPhase {
    /// Round running, world simulated every tick
    Playing,
    /// World frozen until the vote is resolved
    Voting,
    /// Terminal until reset
    Resolved(MatchOutcome),
}

impl MatchPhase {
    pub fn is_playing(&self) -> bool {
        matches!(self, MatchPhase::Playing)
    }

    pub fn is_voting(&self) -> bool {
        matches!(self, MatchPhase::Voting)
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        match self {
            MatchPhase::Resolved(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPhase::Playing => f.write_str("playing"),
            MatchPhase::Voting => f.write_str("voting"),
            MatchPhase::Resolved(_) => f.write_str("resolved"),
        }
    }
}

/// Invalid calls against the phase machine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    #[error("cannot start a vote while {phase}")]
    NotPlaying { phase: MatchPhase },

    #[error("cannot resolve a vote while {phase}")]
    NotVoting { phase: MatchPhase },

    #[error("invalid roster: {0}")]
    InvalidRoster(&'static str),

    #[error("impostor {0} is not in the roster")]
    UnknownImpostor(String),

    #[error("no actor with id {0}")]
    UnknownActor(String),
}

/// Tuning for a match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    pub roster_size: usize,
    pub round_secs: f32,
    pub arena: ArenaBounds,
    /// Per-tick chance an autonomous actor picks a new heading
    pub wander_chance: f64,
    /// Per-tick chance the impostor locks onto a new target
    pub retarget_chance: f64,
    /// Impostor chase speed as a fraction of its base speed
    pub chase_factor: f32,
    /// Impostor eliminates anyone strictly closer than this
    pub kill_radius: f32,
    /// Human accusation reach, wider than the kill radius
    pub confront_radius: f32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            roster_size: 6,
            round_secs: DEFAULT_ROUND_SECS,
            arena: ArenaBounds::default(),
            wander_chance: 0.02,
            retarget_chance: 0.01,
            chase_factor: 0.9,
            kill_radius: 22.0,
            confront_radius: 36.0,
        }
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MatchEvent {
    /// HUD refresh, emitted on every simulated tick
    Hud(HudSnapshot),
    /// Round ran out; alive actors to offer in the prompt
    VotingStarted { candidates: Vec<VoteCandidate> },
    /// The impostor got someone
    Eliminated { victim_id: String },
    /// Match is over
    Resolved { outcome: MatchOutcome },
}

/// Match state (owned by the controller)
#[derive(Debug, Clone)]
pub struct MatchState {
    pub id: Uuid,
    pub tick: u64,
    pub clock: RoundClock,
    phase: MatchPhase,
    impostor_id: String,
    roster: Vec<Actor>,
}

impl MatchState {
    /// Fresh roster with a uniformly chosen impostor
    pub fn new<R: Rng + ?Sized>(settings: &MatchSettings, rng: &mut R) -> Self {
        let roster = spawn_roster(rng, settings.roster_size.max(1), &settings.arena);
        let impostor = rng.gen_range(0..roster.len());
        let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();

        Self {
            id,
            tick: 0,
            clock: RoundClock::new(settings.round_secs),
            phase: MatchPhase::Playing,
            impostor_id: roster[impostor].id.clone(),
            roster,
        }
    }

    /// Hand-assembled match (scripted scenarios, replays); the caller supplies the id
    pub fn scripted(
        id: Uuid,
        roster: Vec<Actor>,
        impostor_id: &str,
        clock: RoundClock,
    ) -> Result<Self, MatchError> {
        if roster.iter().filter(|a| a.is_human).count() != 1 {
            return Err(MatchError::InvalidRoster(
                "exactly one actor must be human-controlled",
            ));
        }
        if !roster.iter().any(|a| a.id == impostor_id) {
            return Err(MatchError::UnknownImpostor(impostor_id.to_string()));
        }

        Ok(Self {
            id,
            tick: 0,
            clock,
            phase: MatchPhase::Playing,
            impostor_id: impostor_id.to_string(),
            roster,
        })
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.phase.outcome()
    }

    pub fn impostor_id(&self) -> &str {
        &self.impostor_id
    }

    pub fn roster(&self) -> &[Actor] {
        &self.roster
    }

    pub fn actor(&self, id: &str) -> Option<&Actor> {
        self.roster.iter().find(|a| a.id == id)
    }

    /// Move an actor (scripted setups)
    pub fn place_actor(&mut self, id: &str, x: f32, y: f32) -> Result<(), MatchError> {
        let actor = self.actor_entry(id)?;
        actor.x = x;
        actor.y = y;
        Ok(())
    }

    pub fn set_velocity(&mut self, id: &str, vel_x: f32, vel_y: f32) -> Result<(), MatchError> {
        let actor = self.actor_entry(id)?;
        actor.vel_x = vel_x;
        actor.vel_y = vel_y;
        Ok(())
    }

    pub fn set_alive(&mut self, id: &str, alive: bool) -> Result<(), MatchError> {
        self.actor_entry(id)?.alive = alive;
        Ok(())
    }

    fn actor_entry(&mut self, id: &str) -> Result<&mut Actor, MatchError> {
        self.roster
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| MatchError::UnknownActor(id.to_string()))
    }

    pub fn impostor_index(&self) -> usize {
        self.index_of(&self.impostor_id).unwrap_or(0)
    }

    pub fn human_index(&self) -> usize {
        self.roster.iter().position(|a| a.is_human).unwrap_or(0)
    }

    pub fn human(&self) -> &Actor {
        &self.roster[self.human_index()]
    }

    pub fn impostor(&self) -> &Actor {
        &self.roster[self.impostor_index()]
    }

    /// Count alive actors
    pub fn alive_count(&self) -> usize {
        self.roster.iter().filter(|a| a.alive).count()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.roster.iter().position(|a| a.id == id)
    }

    /// Playing -> Voting
    pub(crate) fn begin_voting(&mut self) -> Result<(), MatchError> {
        if !self.phase.is_playing() {
            return Err(MatchError::NotPlaying { phase: self.phase });
        }
        self.phase = MatchPhase::Voting;
        Ok(())
    }

    /// Voting -> Resolved
    pub(crate) fn conclude_vote(&mut self, outcome: MatchOutcome) -> Result<(), MatchError> {
        if !self.phase.is_voting() {
            return Err(MatchError::NotVoting { phase: self.phase });
        }
        self.phase = MatchPhase::Resolved(outcome);
        Ok(())
    }

    /// Playing -> Resolved (kill or confrontation)
    pub(crate) fn end_round(&mut self, outcome: MatchOutcome) -> Result<(), MatchError> {
        if !self.phase.is_playing() {
            return Err(MatchError::NotPlaying { phase: self.phase });
        }
        self.phase = MatchPhase::Resolved(outcome);
        Ok(())
    }
}

/// The game controller: owns the match and drives it one tick at a time
pub struct GameMatch<R = ChaCha8Rng> {
    settings: MatchSettings,
    state: MatchState,
    intent: PlayerIntent,
    rng: R,
}

impl GameMatch<ChaCha8Rng> {
    /// Controller with a seeded ChaCha generator
    pub fn with_seed(settings: MatchSettings, seed: u64) -> Self {
        Self::new(settings, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameMatch<R> {
    /// Create a controller and start the first match
    pub fn new(settings: MatchSettings, mut rng: R) -> Self {
        let state = MatchState::new(&settings, &mut rng);
        log_match_start(&state);
        Self {
            settings,
            state,
            intent: PlayerIntent::idle(),
            rng,
        }
    }

    /// Wrap an existing state
    pub fn from_state(settings: MatchSettings, state: MatchState, rng: R) -> Self {
        Self {
            settings,
            state,
            intent: PlayerIntent::idle(),
            rng,
        }
    }

    /// New roster, new impostor, full clock
    pub fn reset(&mut self) {
        self.state = MatchState::new(&self.settings, &mut self.rng);
        self.intent = PlayerIntent::idle();
        log_match_start(&self.state);
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn intent(&self) -> PlayerIntent {
        self.intent
    }

    /// Latest human input, sampled on the next tick
    pub fn set_intent(&mut self, intent: PlayerIntent) {
        self.intent = intent;
    }

    pub fn hud(&self) -> HudSnapshot {
        SnapshotBuilder::hud(&self.state)
    }

    /// Alive actors for the vote prompt
    pub fn alive_roster(&self) -> Vec<VoteCandidate> {
        SnapshotBuilder::vote_candidates(&self.state)
    }

    pub fn roster_view(&self) -> Vec<ActorView> {
        SnapshotBuilder::frame(&self.state)
    }

    /// Manual call for a vote. Returns the prompt candidates.
    pub fn request_vote(&mut self) -> Result<Vec<VoteCandidate>, MatchError> {
        self.state.begin_voting()?;
        info!(match_id = %self.state.id, tick = self.state.tick, "Vote called");
        Ok(self.alive_roster())
    }

    /// Settle the vote. Only valid while voting.
    pub fn resolve_vote(&mut self, selection: Option<&str>) -> Result<MatchOutcome, MatchError> {
        if !self.state.phase.is_voting() {
            return Err(MatchError::NotVoting {
                phase: self.state.phase,
            });
        }

        let verdict = vote::resolve_vote(selection, &self.state.impostor_id);
        match verdict {
            VoteVerdict::ImpostorEjected => {
                let impostor = self.state.impostor_index();
                self.state.roster[impostor].alive = false;
            }
            VoteVerdict::WrongPick => {
                if let Some(id) = selection.filter(|id| self.state.actor(id).is_none()) {
                    warn!(match_id = %self.state.id, selected = %id, "Vote for unknown actor");
                }
            }
            VoteVerdict::Abstained => {}
        }

        let outcome = verdict.outcome();
        self.state.conclude_vote(outcome)?;
        log_resolution(&self.state, outcome);
        Ok(outcome)
    }

    /// Advance the simulation by `dt` seconds (caller clamps to a max step)
    pub fn tick(&mut self, dt: f32) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        if !self.state.phase.is_playing() {
            return events;
        }

        let dt = dt.max(0.0);
        self.state.tick += 1;

        // Expiry ends the tick: the world freezes where it stood
        if self.state.clock.advance(dt) {
            if self.state.begin_voting().is_ok() {
                info!(match_id = %self.state.id, tick = self.state.tick, "Round over, voting");
                events.push(MatchEvent::VotingStarted {
                    candidates: self.alive_roster(),
                });
            }
            events.push(MatchEvent::Hud(self.hud()));
            return events;
        }

        self.move_human(dt);
        self.move_autonomous(dt);

        if let Some(victim_id) = self.run_impostor() {
            let human_killed = self.state.human().id == victim_id;
            events.push(MatchEvent::Eliminated { victim_id });
            if human_killed {
                self.finish(MatchOutcome::lost(ResolutionReason::KilledByImpostor), &mut events);
                return events;
            }
        }

        if self.human_confronts_impostor() {
            self.finish(MatchOutcome::won(ResolutionReason::ImpostorFound), &mut events);
            return events;
        }

        events.push(MatchEvent::Hud(self.hud()));
        events
    }

    fn move_human(&mut self, dt: f32) {
        let human = self.state.human_index();
        let PlayerIntent { move_x, move_y, .. } = self.intent;
        PhysicsSystem::advance(
            &mut self.state.roster[human],
            move_x,
            move_y,
            dt,
            &self.settings.arena,
        );
    }

    /// Wander for everyone but the human (impostor included)
    fn move_autonomous(&mut self, dt: f32) {
        for actor in self.state.roster.iter_mut() {
            if !actor.alive || actor.is_human {
                continue;
            }

            if let Some((vel_x, vel_y)) =
                AiSystem::wander(actor, self.settings.wander_chance, &mut self.rng)
            {
                actor.vel_x = vel_x;
                actor.vel_y = vel_y;
            }

            PhysicsSystem::integrate(actor, dt, &self.settings.arena);
        }
    }

    /// Retarget override, then at most one elimination. Returns the victim id.
    fn run_impostor(&mut self) -> Option<String> {
        let impostor = self.state.impostor_index();
        if !self.state.roster[impostor].alive {
            return None;
        }

        // A human impostor steers with input, not AI
        if !self.state.roster[impostor].is_human {
            if let Some(pursuit) = AiSystem::retarget(
                &self.state.roster,
                impostor,
                self.settings.retarget_chance,
                self.settings.chase_factor,
                &mut self.rng,
            ) {
                debug!(
                    match_id = %self.state.id,
                    target = %self.state.roster[pursuit.target].id,
                    "Impostor retargeted"
                );
                let hunter = &mut self.state.roster[impostor];
                hunter.vel_x = pursuit.vel_x;
                hunter.vel_y = pursuit.vel_y;
            }
        }

        let victim =
            AiSystem::find_victim(&self.state.roster, impostor, self.settings.kill_radius)?;
        let actor = &mut self.state.roster[victim];
        actor.alive = false;
        info!(
            match_id = %self.state.id,
            victim_id = %actor.id,
            tick = self.state.tick,
            "Actor eliminated"
        );
        Some(actor.id.clone())
    }

    fn human_confronts_impostor(&self) -> bool {
        if !self.intent.action {
            return false;
        }
        let human = self.state.human();
        let impostor = self.state.impostor();
        // Accusing yourself is not a confrontation
        human.alive
            && impostor.alive
            && !impostor.is_human
            && human.distance_to(impostor) < self.settings.confront_radius
    }

    fn finish(&mut self, outcome: MatchOutcome, events: &mut Vec<MatchEvent>) {
        if self.state.end_round(outcome).is_ok() {
            log_resolution(&self.state, outcome);
            events.push(MatchEvent::Resolved { outcome });
        }
        events.push(MatchEvent::Hud(self.hud()));
    }
}

impl<R> fmt::Debug for GameMatch<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameMatch")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("intent", &self.intent)
            .finish_non_exhaustive()
    }
}

fn log_match_start(state: &MatchState) {
    info!(
        match_id = %state.id,
        roster = state.roster.len(),
        round_secs = state.clock.limit(),
        "Match started"
    );
    debug!(match_id = %state.id, impostor_id = %state.impostor_id, "Impostor chosen");
}

fn log_resolution(state: &MatchState, outcome: MatchOutcome) {
    info!(
        match_id = %state.id,
        tick = state.tick,
        result = ?outcome.result,
        reason = ?outcome.reason,
        "Match resolved"
    );
}
