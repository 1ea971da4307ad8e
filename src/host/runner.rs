//! Headless host loop: drains inbound commands, ticks the match, forwards events

use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::game::{ControlState, GameMatch, MatchEvent, PlayerIntent, SnapshotBuilder};
use crate::util::rate_limit::CommandRateLimiter;
use crate::util::time::{snapshot_interval, FrameTimer};

use super::protocol::{HostCommand, HostEvent};

/// Whether the loop should keep going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drives one `GameMatch` on behalf of a host
pub struct HostRunner<R = ChaCha8Rng> {
    game: GameMatch<R>,
    controls: ControlState,
    limiter: CommandRateLimiter,
    snapshots: SnapshotBuilder,
    tick_rate: u32,
}

impl<R: Rng> HostRunner<R> {
    pub fn new(game: GameMatch<R>, tick_rate: u32) -> Self {
        Self::with_limiter(game, tick_rate, CommandRateLimiter::default())
    }

    pub fn with_limiter(game: GameMatch<R>, tick_rate: u32, limiter: CommandRateLimiter) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            game,
            controls: ControlState::new(),
            limiter,
            snapshots: SnapshotBuilder::new(snapshot_interval(tick_rate)),
            tick_rate,
        }
    }

    pub fn game(&self) -> &GameMatch<R> {
        &self.game
    }

    /// Announcement for the current match
    pub fn start_events(&self) -> Vec<HostEvent> {
        vec![
            HostEvent::MatchStarted {
                match_id: self.game.state().id,
                roster: self.game.roster_view(),
            },
            HostEvent::Hud(self.game.hud()),
        ]
    }

    /// Apply one inbound command
    pub fn handle_command(&mut self, command: HostCommand) -> (Flow, Vec<HostEvent>) {
        // Quitting is never throttled
        if command != HostCommand::Quit && !self.limiter.check() {
            warn!(match_id = %self.game.state().id, "Command rate limit exceeded");
            return (
                Flow::Continue,
                vec![HostEvent::error("rate_limited", "too many commands")],
            );
        }

        let mut events = Vec::new();
        match command {
            HostCommand::Intent {
                move_x,
                move_y,
                action,
            } => {
                self.controls.set_raw(PlayerIntent::new(move_x, move_y, action));
            }
            HostCommand::Key { direction, pressed } => {
                self.controls.set_direction(direction, pressed);
            }
            HostCommand::Stick { angle, force } => self.controls.set_stick(angle, force),
            HostCommand::StickReleased => self.controls.release_stick(),
            HostCommand::Action { pressed } => self.controls.set_action(pressed),
            HostCommand::RequestVote => match self.game.request_vote() {
                Ok(candidates) => {
                    events.push(HostEvent::VotePrompt { candidates });
                    events.push(HostEvent::Hud(self.game.hud()));
                    events.push(self.frame());
                }
                Err(e) => {
                    debug!(error = %e, "Vote request ignored");
                    events.push(HostEvent::error("invalid_phase", e.to_string()));
                }
            },
            HostCommand::ResolveVote { selected_id } => {
                match self.game.resolve_vote(selected_id.as_deref()) {
                    Ok(outcome) => {
                        events.push(HostEvent::match_end(self.game.state().id, outcome));
                        events.push(HostEvent::Hud(self.game.hud()));
                        // Ticks are frozen from here on, so the final roster goes out now
                        events.push(self.frame());
                    }
                    Err(e) => {
                        debug!(error = %e, "Vote resolution ignored");
                        events.push(HostEvent::error("invalid_phase", e.to_string()));
                    }
                }
            }
            HostCommand::Reset => {
                self.game.reset();
                self.controls.clear();
                self.snapshots.force_next();
                events.extend(self.start_events());
            }
            HostCommand::Quit => return (Flow::Quit, Vec::new()),
        }

        self.game.set_intent(self.controls.intent());
        (Flow::Continue, events)
    }

    /// Run one simulation tick and translate what happened
    pub fn step(&mut self, dt: f32) -> Vec<HostEvent> {
        let tick_events = self.game.tick(dt);
        if tick_events.is_empty() {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(tick_events.len() + 1);
        for event in tick_events {
            match event {
                MatchEvent::Hud(hud) => events.push(HostEvent::Hud(hud)),
                MatchEvent::VotingStarted { candidates } => {
                    self.snapshots.force_next();
                    events.push(HostEvent::VotePrompt { candidates });
                }
                MatchEvent::Eliminated { victim_id } => {
                    self.snapshots.force_next();
                    let name = self
                        .game
                        .state()
                        .actor(&victim_id)
                        .map(|a| a.name.clone())
                        .unwrap_or_default();
                    events.push(HostEvent::Eliminated { victim_id, name });
                }
                MatchEvent::Resolved { outcome } => {
                    self.snapshots.force_next();
                    events.push(HostEvent::match_end(self.game.state().id, outcome));
                }
            }
        }

        if self.snapshots.should_send() {
            events.push(self.frame());
        }

        events
    }

    fn frame(&self) -> HostEvent {
        HostEvent::Frame {
            tick: self.game.state().tick,
            actors: self.game.roster_view(),
        }
    }

    /// Run the tick loop until the host quits or disconnects
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<HostCommand>,
        events: mpsc::Sender<HostEvent>,
    ) {
        info!(match_id = %self.game.state().id, tick_rate = self.tick_rate, "Host loop started");

        let tick_duration = Duration::from_micros(1_000_000 / self.tick_rate as u64);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut timer = FrameTimer::new();

        if forward(&events, self.start_events()).await.is_err() {
            return;
        }

        loop {
            tick_interval.tick().await;

            // Drain command queue
            loop {
                match commands.try_recv() {
                    Ok(command) => {
                        let (flow, out) = self.handle_command(command);
                        if forward(&events, out).await.is_err() {
                            info!("Event sink closed, stopping host loop");
                            return;
                        }
                        if flow == Flow::Quit {
                            info!(match_id = %self.game.state().id, "Host requested quit");
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!(match_id = %self.game.state().id, "Host disconnected, stopping");
                        return;
                    }
                }
            }

            let dt = timer.lap();
            if forward(&events, self.step(dt)).await.is_err() {
                info!("Event sink closed, stopping host loop");
                return;
            }
        }
    }
}

async fn forward(
    sink: &mpsc::Sender<HostEvent>,
    events: Vec<HostEvent>,
) -> Result<(), mpsc::error::SendError<HostEvent>> {
    for event in events {
        sink.send(event).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::clock::RoundClock;
    use crate::game::{
        Actor, Direction, MatchPhase, MatchResult, MatchSettings, MatchState, ResolutionReason,
    };
    use rand::SeedableRng;
    use uuid::Uuid;

    fn runner() -> HostRunner {
        let roster = vec![
            Actor::new("p0", "Player 1", 100.0, 100.0).into_human(),
            Actor::new("p1", "Player 2", 400.0, 300.0),
            Actor::new("p2", "Player 3", 700.0, 500.0),
        ];
        let state = MatchState::scripted(Uuid::from_u128(5), roster, "p2", RoundClock::new(30.0))
            .expect("valid roster");
        let settings = MatchSettings {
            wander_chance: 0.0,
            retarget_chance: 0.0,
            ..MatchSettings::default()
        };
        let game = GameMatch::from_state(settings, state, ChaCha8Rng::seed_from_u64(9));
        HostRunner::new(game, 60)
    }

    #[test]
    fn key_commands_drive_the_human() {
        let mut runner = runner();
        let (flow, events) = runner.handle_command(HostCommand::Key {
            direction: Direction::Right,
            pressed: true,
        });
        assert_eq!(flow, Flow::Continue);
        assert!(events.is_empty());
        assert_eq!(runner.game().intent().move_x, 1.0);

        runner.step(0.05);
        assert!((runner.game().state().human().x - 106.0).abs() < 1e-3);
    }

    #[test]
    fn vote_flow_produces_prompt_then_match_end() {
        let mut runner = runner();
        let (_, events) = runner.handle_command(HostCommand::RequestVote);
        assert!(matches!(&events[0], HostEvent::VotePrompt { candidates } if candidates.len() == 3));

        let (_, events) = runner.handle_command(HostCommand::ResolveVote {
            selected_id: Some("p2".to_string()),
        });
        assert!(matches!(
            &events[0],
            HostEvent::MatchEnd { result: MatchResult::Won, reason: ResolutionReason::ImpostorEjected, .. }
        ));
    }

    #[test]
    fn resolved_vote_sends_a_final_frame() {
        let mut runner = runner();
        let (_, events) = runner.handle_command(HostCommand::RequestVote);
        assert!(events.iter().any(|e| matches!(e, HostEvent::Frame { .. })));

        let (_, events) = runner.handle_command(HostCommand::ResolveVote {
            selected_id: Some("p2".to_string()),
        });
        let actors = events
            .iter()
            .find_map(|e| match e {
                HostEvent::Frame { actors, .. } => Some(actors),
                _ => None,
            })
            .expect("frame after resolution");
        let impostor = actors.iter().find(|a| a.id == "p2").expect("impostor in frame");
        assert!(!impostor.alive);

        assert!(runner.step(0.016).is_empty());
    }

    #[test]
    fn intent_then_key_keeps_keyboard_movement() {
        let mut runner = runner();
        runner.handle_command(HostCommand::Intent {
            move_x: 0.0,
            move_y: 0.0,
            action: true,
        });
        runner.handle_command(HostCommand::Key {
            direction: Direction::Right,
            pressed: true,
        });
        assert_eq!(runner.game().intent().move_x, 1.0);
        assert!(runner.game().intent().action);
    }

    #[test]
    fn out_of_phase_commands_report_errors() {
        let mut runner = runner();
        let (_, events) = runner.handle_command(HostCommand::ResolveVote { selected_id: None });
        assert!(matches!(&events[0], HostEvent::Error { code, .. } if code == "invalid_phase"));
        assert_eq!(runner.game().phase(), MatchPhase::Playing);
    }

    #[test]
    fn rate_limited_commands_are_dropped() {
        let mut runner = HostRunner::with_limiter(runner().game, 60, CommandRateLimiter::new(1));
        runner.handle_command(HostCommand::Action { pressed: false });
        let (flow, events) = runner.handle_command(HostCommand::RequestVote);
        assert_eq!(flow, Flow::Continue);
        assert!(matches!(&events[0], HostEvent::Error { code, .. } if code == "rate_limited"));
        assert_eq!(runner.game().phase(), MatchPhase::Playing);

        assert_eq!(runner.handle_command(HostCommand::Quit).0, Flow::Quit);
    }

    #[test]
    fn frames_follow_the_snapshot_rate() {
        let mut runner = runner();
        let frames = (0..6)
            .flat_map(|_| runner.step(0.016))
            .filter(|e| matches!(e, HostEvent::Frame { .. }))
            .count();
        assert_eq!(frames, 2);
    }

    #[test]
    fn reset_announces_a_new_match() {
        let mut runner = runner();
        let (_, events) = runner.handle_command(HostCommand::Reset);
        assert!(matches!(&events[0], HostEvent::MatchStarted { roster, .. } if roster.len() == 6));
    }

    #[test]
    fn run_loop_processes_queued_commands_and_quits() {
        let runner = runner();
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, mut event_rx) = mpsc::channel(256);

        command_tx.try_send(HostCommand::RequestVote).expect("queue");
        command_tx
            .try_send(HostCommand::ResolveVote { selected_id: None })
            .expect("queue");
        command_tx.try_send(HostCommand::Quit).expect("queue");

        tokio_test::block_on(runner.run(command_rx, event_tx));

        let mut saw_start = false;
        let mut outcome = None;
        while let Ok(event) = event_rx.try_recv() {
            match event {
                HostEvent::MatchStarted { .. } => saw_start = true,
                HostEvent::MatchEnd { reason, .. } => outcome = Some(reason),
                _ => {}
            }
        }
        assert!(saw_start);
        assert_eq!(outcome, Some(ResolutionReason::NobodyEjected));
    }

    #[test]
    fn run_loop_stops_when_host_disconnects() {
        let runner = runner();
        let (command_tx, command_rx) = mpsc::channel::<HostCommand>(1);
        let (event_tx, _event_rx) = mpsc::channel(256);
        drop(command_tx);
        tokio_test::block_on(runner.run(command_rx, event_tx));
    }
}
