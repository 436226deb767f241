// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Distributed Simulated Annealing (DSAN).
//!
//! DSAN proposes one value uniformly at random from the full domain each
//! round. Improving proposals are always adopted; non-improving proposals
//! are adopted with a probability supplied by an injected exploration
//! schedule that decays with the agent's private round counter, shifting
//! the agent from exploratory to exploitative behavior over time. The
//! design separates the acceptance logic from temperature management, so
//! different decay shapes can be plugged in without touching the policy.
//!
//! The counter increases monotonically across the whole run and is never
//! reset. After every transition the policy rescans the domain for a value
//! strictly better than the one it now holds — this feeds both the local
//! convergence signal (a frozen, stuck, unsatisfied agent stops
//! broadcasting) and the global Nash-equilibrium aggregate. That scan is
//! `O(|domain| · |incident constraints|)` per round and dominates DSAN's
//! cost.

use crate::policy::{DecisionInput, SignalInput};
use parley_core::num::UtilityNumeric;
use parley_model::index::ValueIndex;
use rand::Rng;
use std::sync::Arc;

/// Exploration probability below which the schedule counts as frozen for
/// the local convergence signal.
const FROZEN_PROBABILITY: f64 = 1e-6;

/// Defines the cooling behavior of the annealing process.
///
/// Implementors map the agent's private round counter and a non-positive
/// utility delta to the probability of accepting that worsening move. The
/// probability must be monotonically decreasing in time for the local
/// convergence signal to be meaningful.
pub trait ExplorationSchedule<U>: Send + Sync + std::fmt::Debug {
    /// Probability of accepting a move with utility change `delta`
    /// (`delta <= 0`) at round `time`. Values outside `[0, 1]` are clamped
    /// by the caller.
    fn probability(&self, time: u64, delta: U) -> f64;
}

/// The standard DSAN schedule: `exp(delta · t² / constant)`.
///
/// Larger constants cool more slowly and explore longer.
#[derive(Debug, Clone, Copy)]
pub struct QuadraticSchedule {
    constant: f64,
}

impl QuadraticSchedule {
    /// Creates a schedule with the given cooling constant (must be
    /// positive).
    #[inline]
    pub fn new(constant: f64) -> Self {
        debug_assert!(constant > 0.0, "cooling constant must be positive");
        Self { constant }
    }
}

impl Default for QuadraticSchedule {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl<U> ExplorationSchedule<U> for QuadraticSchedule
where
    U: UtilityNumeric,
{
    #[inline]
    fn probability(&self, time: u64, delta: U) -> f64 {
        let delta: f64 = delta.into();
        let t = time as f64;
        (delta * t * t / self.constant).exp()
    }
}

/// A time-independent schedule, useful for tests and pure random walks.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSchedule(pub f64);

impl<U> ExplorationSchedule<U> for ConstantSchedule
where
    U: UtilityNumeric,
{
    #[inline]
    fn probability(&self, _time: u64, _delta: U) -> f64 {
        self.0
    }
}

/// Configuration for DSAN: the injected exploration schedule.
#[derive(Debug, Clone)]
pub struct DsanConfig<U> {
    /// The exploration schedule shared by agents built from this spec.
    pub schedule: Arc<dyn ExplorationSchedule<U>>,
}

impl<U> Default for DsanConfig<U>
where
    U: UtilityNumeric,
{
    fn default() -> Self {
        Self {
            schedule: Arc::new(QuadraticSchedule::default()),
        }
    }
}

/// Per-agent DSAN state.
#[derive(Debug, Clone)]
pub struct DsanState<U> {
    config: DsanConfig<U>,
    /// Private round counter; monotonically increasing, never reset.
    time: u64,
    exists_better: bool,
    /// Largest (closest to zero) strictly negative delta seen from the
    /// held value, if any; drives the frozen test.
    max_negative_delta: Option<U>,
}

impl<U> DsanState<U>
where
    U: UtilityNumeric,
{
    /// Creates DSAN state for the given configuration.
    pub fn new(config: DsanConfig<U>) -> Self {
        Self {
            config,
            time: 0,
            exists_better: false,
            max_negative_delta: None,
        }
    }

    /// Returns the private round counter.
    #[inline]
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Whether a strictly better value existed after the last transition.
    #[inline]
    pub fn exists_better(&self) -> bool {
        self.exists_better
    }

    /// One DSAN transition: uniform proposal, Metropolis-style acceptance,
    /// then the full-domain rescan for the Nash flag.
    pub fn decide<R>(&mut self, input: &DecisionInput<'_, U>, rng: &mut R) -> ValueIndex
    where
        R: Rng,
    {
        self.time += 1;

        let utilities = input.utilities;
        let current = input.current;
        let candidate = ValueIndex::new(rng.random_range(0..utilities.len()));
        let delta = utilities[candidate.get()] - utilities[current.get()];

        let chosen = if delta > U::zero() {
            candidate
        } else {
            let probability = self
                .config
                .schedule
                .probability(self.time, delta)
                .clamp(0.0, 1.0);
            if rng.random_bool(probability) {
                candidate
            } else {
                current
            }
        };

        // Rescan relative to the adopted value: Nash flag and the least
        // negative delta for the frozen test.
        let chosen_utility = utilities[chosen.get()];
        let mut exists_better = false;
        let mut max_negative_delta: Option<U> = None;
        for (position, &utility) in utilities.iter().enumerate() {
            if position == chosen.get() {
                continue;
            }
            let difference = utility - chosen_utility;
            if difference > U::zero() {
                exists_better = true;
            } else if difference < U::zero() {
                max_negative_delta = Some(match max_negative_delta {
                    Some(previous) if previous >= difference => previous,
                    _ => difference,
                });
            }
        }
        self.exists_better = exists_better;
        self.max_negative_delta = max_negative_delta;

        chosen
    }

    /// Suppression rule for an unchanged value: fully satisfied, or the
    /// schedule is frozen and no better state exists.
    pub(crate) fn score_signal(&self, input: &SignalInput<U>) -> f64 {
        if input.all_satisfied {
            return 0.0;
        }
        let frozen = match self.max_negative_delta {
            Some(delta) => {
                self.config.schedule.probability(self.time, delta) < FROZEN_PROBABILITY
            }
            // No downhill move exists; the schedule has nothing left to
            // explore.
            None => true,
        };
        if frozen && !self.exists_better {
            0.0
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(23)
    }

    fn dsan(schedule: impl ExplorationSchedule<f64> + 'static) -> DsanState<f64> {
        DsanState::new(DsanConfig {
            schedule: Arc::new(schedule),
        })
    }

    fn input(utilities: &[f64], current: usize) -> DecisionInput<'_, f64> {
        DecisionInput {
            utilities,
            current: ValueIndex::new(current),
            all_satisfied: false,
        }
    }

    #[test]
    fn test_positive_delta_always_adopted() {
        // Even with a schedule that never explores, an improving proposal
        // is adopted as soon as it is drawn.
        let mut state = dsan(ConstantSchedule(0.0));
        let utilities = [0.0f64, 1.0];
        let mut rng = rng();
        let mut position = 0usize;
        for _ in 0..50 {
            let chosen = state.decide(&input(&utilities, position), &mut rng);
            position = chosen.get();
            if position == 1 {
                break;
            }
        }
        assert_eq!(position, 1, "improving proposal must be adopted");
        assert!(!state.exists_better());
    }

    #[test]
    fn test_zero_exploration_never_worsens() {
        let mut state = dsan(ConstantSchedule(0.0));
        let utilities = [1.0f64, 0.0];
        let mut rng = rng();
        for _ in 0..50 {
            let chosen = state.decide(&input(&utilities, 0), &mut rng);
            assert_eq!(chosen.get(), 0, "zero exploration must reject worsening moves");
        }
    }

    #[test]
    fn test_full_exploration_is_a_random_walk() {
        let mut state = dsan(ConstantSchedule(1.0));
        let utilities = [1.0f64, 0.0];
        let mut rng = rng();
        let mut moved = false;
        for _ in 0..50 {
            if state.decide(&input(&utilities, 0), &mut rng).get() == 1 {
                moved = true;
                break;
            }
        }
        assert!(moved, "probability-one exploration must take worsening moves");
    }

    #[test]
    fn test_time_is_monotone_and_never_reset() {
        let mut state = dsan(ConstantSchedule(0.0));
        let utilities = [1.0f64, 0.0];
        let mut rng = rng();
        for expected in 1..=5 {
            let _ = state.decide(&input(&utilities, 0), &mut rng);
            assert_eq!(state.time(), expected);
        }
    }

    #[test]
    fn test_quadratic_schedule_decays_in_time() {
        let schedule = QuadraticSchedule::default();
        let p0 = ExplorationSchedule::<f64>::probability(&schedule, 1, 0.0);
        let early = ExplorationSchedule::<f64>::probability(&schedule, 10, -1.0);
        let late = ExplorationSchedule::<f64>::probability(&schedule, 200, -1.0);
        assert_eq!(p0, 1.0);
        assert!(early > late, "schedule must decay with time");
        assert!(late < FROZEN_PROBABILITY);
    }

    #[test]
    fn test_signal_suppressed_when_frozen_and_stuck() {
        let mut state = dsan(QuadraticSchedule::default());
        let utilities = [1.0f64, 0.0];
        let mut rng = rng();
        let _ = state.decide(&input(&utilities, 0), &mut rng);
        // At the local optimum with exploration still warm, keep
        // signaling.
        let warm = state.score_signal(&SignalInput {
            changed: false,
            all_satisfied: false,
            utility: 1.0,
            num_incident: 2,
        });
        assert_eq!(warm, 1.0);

        // Advance far enough that exp(-t²/1000) is below the frozen
        // threshold.
        state.time = 200;
        let frozen = state.score_signal(&SignalInput {
            changed: false,
            all_satisfied: false,
            utility: 1.0,
            num_incident: 2,
        });
        assert_eq!(frozen, 0.0, "frozen and stuck must suppress");
    }

    #[test]
    fn test_signal_suppressed_when_satisfied() {
        let mut state = dsan(ConstantSchedule(1.0));
        let utilities = [1.0f64, 1.0];
        let mut rng = rng();
        let _ = state.decide(&input(&utilities, 0), &mut rng);
        let score = state.score_signal(&SignalInput {
            changed: false,
            all_satisfied: true,
            utility: 1.0,
            num_incident: 1,
        });
        assert_eq!(score, 0.0);
    }
}
