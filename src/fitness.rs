//! Attempt scoring and termination.

use crate::character::Character;
use crate::config::AttemptConfig;
use serde::{Deserialize, Serialize};

/// Why an attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    FellOff,
    Stuck,
    TimedOut,
}

/// Scores finished attempts and decides when an attempt is over
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    /// Multiplier applied to the distance of an attempt that fell off
    pub fell_penalty: f32,
    /// Attempt wall-clock limit
    pub timeout_ms: u64,
}

impl Default for FitnessEvaluator {
    fn default() -> Self {
        Self::from_config(&AttemptConfig::default())
    }
}

impl FitnessEvaluator {
    pub fn from_config(config: &AttemptConfig) -> Self {
        Self {
            fell_penalty: config.fell_penalty,
            timeout_ms: config.timeout_ms,
        }
    }

    /// Net forward distance, penalized on a fall, never negative
    pub fn score(&self, character: &Character, fell_off: bool) -> f32 {
        let distance = character.distance();
        let fitness = if fell_off {
            distance * self.fell_penalty
        } else {
            distance
        };
        fitness.max(0.0)
    }

    /// Whether the attempt begun at `start_ms` is over at `now_ms`
    pub fn should_terminate(&self, start_ms: u64, now_ms: u64, fell_off: bool, stuck: bool) -> bool {
        self.termination(start_ms, now_ms, fell_off, stuck).is_some()
    }

    /// Reason the attempt is over, if it is. Falling takes precedence over
    /// stalling, which takes precedence over the timeout.
    pub fn termination(
        &self,
        start_ms: u64,
        now_ms: u64,
        fell_off: bool,
        stuck: bool,
    ) -> Option<Termination> {
        if fell_off {
            Some(Termination::FellOff)
        } else if stuck {
            Some(Termination::Stuck)
        } else if now_ms.saturating_sub(start_ms) > self.timeout_ms {
            Some(Termination::TimedOut)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Character {
        let mut c = Character::new(100.0, 450.0, 30.0);
        c.x = x;
        c
    }

    #[test]
    fn test_score_is_distance() {
        let eval = FitnessEvaluator::default();
        assert_eq!(eval.score(&at(150.0), false), 50.0);
    }

    #[test]
    fn test_fall_penalty() {
        let eval = FitnessEvaluator::default();
        for x in [100.0, 137.5, 150.0, 1234.0] {
            let c = at(x);
            assert_eq!(eval.score(&c, true), 0.7 * eval.score(&c, false));
        }
    }

    #[test]
    fn test_score_never_negative() {
        let eval = FitnessEvaluator::default();
        assert_eq!(eval.score(&at(20.0), false), 0.0);
        assert_eq!(eval.score(&at(20.0), true), 0.0);
    }

    #[test]
    fn test_termination_reasons() {
        let eval = FitnessEvaluator::default();

        assert_eq!(eval.termination(0, 100, false, false), None);
        assert_eq!(eval.termination(0, 6000, false, false), None);
        assert_eq!(eval.termination(0, 6001, false, false), Some(Termination::TimedOut));
        assert_eq!(eval.termination(0, 100, false, true), Some(Termination::Stuck));
        assert_eq!(eval.termination(0, 100, true, true), Some(Termination::FellOff));
        assert!(eval.should_terminate(1000, 7001, false, false));
        assert!(!eval.should_terminate(1000, 7000, false, false));
    }

    #[test]
    fn test_clock_going_backwards_never_times_out() {
        let eval = FitnessEvaluator::default();
        assert!(!eval.should_terminate(10_000, 5, false, false));
    }
}
