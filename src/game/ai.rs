//! Autonomous behaviour: wandering and the impostor's hunt
//!
//! Every decision is a pure function of the actors involved and an injected
//! RNG, so branches can be forced in tests with a mock generator.

use std::f32::consts::TAU;

use rand::Rng;

use super::actor::Actor;
use super::physics::PhysicsSystem;

/// Slowest wander speed as a fraction of base speed
pub const WANDER_MIN_FRACTION: f32 = 0.3;

/// A freshly chosen chase heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pursuit {
    /// Roster index of the chosen target
    pub target: usize,
    pub vel_x: f32,
    pub vel_y: f32,
}

/// AI system for wander and impostor decisions
pub struct AiSystem;

impl AiSystem {
    /// Random-walk step: occasionally pick a new heading and speed, otherwise keep inertia
    pub fn wander<R: Rng + ?Sized>(actor: &Actor, chance: f64, rng: &mut R) -> Option<(f32, f32)> {
        if !actor.alive || !roll(rng, chance) {
            return None;
        }

        let heading = rng.gen_range(0.0..TAU);
        let speed = actor.speed * rng.gen_range(WANDER_MIN_FRACTION..=1.0);
        Some((heading.cos() * speed, heading.sin() * speed))
    }

    /// Indices of alive actors other than `exclude`, in roster order
    pub fn alive_others(roster: &[Actor], exclude: usize) -> Vec<usize> {
        roster
            .iter()
            .enumerate()
            .filter(|(i, a)| *i != exclude && a.alive)
            .map(|(i, _)| i)
            .collect()
    }

    /// Occasionally lock onto a random alive actor and head straight for it
    pub fn retarget<R: Rng + ?Sized>(
        roster: &[Actor],
        impostor: usize,
        chance: f64,
        chase_factor: f32,
        rng: &mut R,
    ) -> Option<Pursuit> {
        let hunter = roster.get(impostor).filter(|a| a.alive)?;
        let candidates = Self::alive_others(roster, impostor);
        if candidates.is_empty() || !roll(rng, chance) {
            return None;
        }

        let target = candidates[rng.gen_range(0..candidates.len())];
        let (vel_x, vel_y) =
            PhysicsSystem::velocity_toward(hunter, &roster[target], hunter.speed * chase_factor)?;
        Some(Pursuit {
            target,
            vel_x,
            vel_y,
        })
    }

    /// First alive actor (roster order) strictly inside the kill radius
    pub fn find_victim(roster: &[Actor], impostor: usize, kill_radius: f32) -> Option<usize> {
        let hunter = roster.get(impostor).filter(|a| a.alive)?;
        Self::alive_others(roster, impostor)
            .into_iter()
            .find(|&i| hunter.distance_to(&roster[i]) < kill_radius)
    }
}

/// Bernoulli trial that tolerates out-of-range chances
fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    chance > 0.0 && rng.gen_bool(chance.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn roster() -> Vec<Actor> {
        vec![
            Actor::new("p0", "Player 1", 100.0, 100.0).into_human(),
            Actor::new("p1", "Player 2", 300.0, 100.0),
            Actor::new("p2", "Player 3", 110.0, 100.0),
            Actor::new("p3", "Player 4", 120.0, 100.0),
        ]
    }

    #[test]
    fn wander_keeps_inertia_when_the_roll_fails() {
        let actor = Actor::new("a", "A", 0.0, 0.0);
        assert_eq!(AiSystem::wander(&actor, 0.02, &mut never()), None);
        assert_eq!(AiSystem::wander(&actor, 0.0, &mut always()), None);
    }

    #[test]
    fn wander_speed_stays_in_fraction_band() {
        let actor = Actor::new("a", "A", 0.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let (vx, vy) = AiSystem::wander(&actor, 1.0, &mut rng).expect("chance is 1");
            let speed = vx.hypot(vy);
            assert!(speed >= actor.speed * WANDER_MIN_FRACTION - 1e-3);
            assert!(speed <= actor.speed + 1e-3);
        }
    }

    #[test]
    fn dead_actor_never_wanders() {
        let mut actor = Actor::new("a", "A", 0.0, 0.0);
        actor.alive = false;
        assert_eq!(AiSystem::wander(&actor, 1.0, &mut always()), None);
    }

    #[test]
    fn retarget_chases_an_alive_other() {
        let mut roster = roster();
        roster[1].alive = false;
        let pursuit = AiSystem::retarget(&roster, 1, 1.0, 0.9, &mut always());
        // the impostor itself is dead
        assert_eq!(pursuit, None);

        // StepRng(0) picks the first candidate: p0
        let pursuit = AiSystem::retarget(&roster, 3, 1.0, 0.9, &mut always()).expect("fires");
        assert_eq!(pursuit.target, 0);
        assert!((pursuit.vel_x + 45.0).abs() < 1e-3);
        assert!(pursuit.vel_y.abs() < 1e-3);
    }

    #[test]
    fn retarget_is_inert_without_targets_or_luck() {
        let mut roster = roster();
        assert_eq!(AiSystem::retarget(&roster, 1, 0.01, 0.9, &mut never()), None);
        for actor in roster.iter_mut().skip(1) {
            actor.alive = false;
        }
        roster[1].alive = true;
        roster[0].alive = false;
        assert_eq!(AiSystem::retarget(&roster, 1, 1.0, 0.9, &mut always()), None);
    }

    #[test]
    fn victim_scan_uses_roster_order() {
        let roster = roster();
        // p0 and p2 are both within 22 of p3 at x=120; p0 is 20 away, p2 10 away
        assert_eq!(AiSystem::find_victim(&roster, 3, 22.0), Some(0));
        assert_eq!(AiSystem::find_victim(&roster, 3, 15.0), Some(2));
        assert_eq!(AiSystem::find_victim(&roster, 1, 22.0), None);
    }

    #[test]
    fn victim_radius_is_strict() {
        let roster = vec![
            Actor::new("p0", "A", 0.0, 100.0),
            Actor::new("p1", "B", 22.0, 100.0),
        ];
        assert_eq!(AiSystem::find_victim(&roster, 1, 22.0), None);
    }
}
