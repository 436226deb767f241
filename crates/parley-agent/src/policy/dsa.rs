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

//! The Distributed Stochastic Algorithm (DSA), variants A through E.
//!
//! All variants share one preamble: find the best non-current domain value
//! (ties broken by the first encountered in domain order, never randomly)
//! and its utility gain `max_delta` over the held value, then draw a single
//! uniform probability. The variants differ only in the accept/reject rule
//! applied to that triple, trading convergence safety against speed:
//!
//! | Variant | Adopt when |
//! |---------|------------|
//! | A | `max_delta > 0` and `p > inertia` |
//! | B | (`max_delta > 0` or (`max_delta == 0` and unsatisfied)) and `p > inertia` |
//! | C | `max_delta >= 0` and `p > inertia` |
//! | D | `max_delta > 0` or (`max_delta == 0` and unsatisfied and `p > inertia`) |
//! | E | `max_delta > 0` or (`max_delta == 0` and `p > inertia`) |
//!
//! D and E adopt improving moves unconditionally, with no inertia gate.
//! Two neighboring agents can therefore flip in lockstep forever; the
//! published algorithm accepts this cyclic non-convergence and so does
//! this implementation.

use crate::policy::{exists_better_than, DecisionInput, SignalInput};
use parley_core::num::UtilityNumeric;
use parley_model::index::ValueIndex;
use rand::Rng;

/// The five published DSA accept-rule variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DsaVariant {
    A,
    B,
    C,
    D,
    E,
}

impl DsaVariant {
    /// Returns the display name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            DsaVariant::A => "DSA-A",
            DsaVariant::B => "DSA-B",
            DsaVariant::C => "DSA-C",
            DsaVariant::D => "DSA-D",
            DsaVariant::E => "DSA-E",
        }
    }
}

impl std::fmt::Display for DsaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tunable parameters for DSA.
#[derive(Debug, Clone, Copy)]
pub struct DsaConfig {
    /// The accept-rule variant.
    pub variant: DsaVariant,
    /// Probability of resisting a value change, in `[0, 1]`. Ignored by
    /// the ungated branches of D and E.
    pub inertia: f64,
}

/// Per-agent DSA state.
#[derive(Debug, Clone)]
pub struct DsaState<U> {
    config: DsaConfig,
    max_delta: U,
    exists_better: bool,
}

impl<U> DsaState<U>
where
    U: UtilityNumeric,
{
    /// Creates DSA state for the given configuration.
    pub fn new(config: DsaConfig) -> Self {
        Self {
            config,
            max_delta: U::zero(),
            exists_better: false,
        }
    }

    /// Returns the configured variant.
    #[inline]
    pub fn variant(&self) -> DsaVariant {
        self.config.variant
    }

    /// Returns the best-alternative utility gain of the last round.
    #[inline]
    pub fn max_delta(&self) -> U {
        self.max_delta
    }

    /// Whether a strictly better value existed after the last transition.
    #[inline]
    pub fn exists_better(&self) -> bool {
        self.exists_better
    }

    /// One DSA transition: shared preamble, then the variant's accept rule.
    pub fn decide<R>(&mut self, input: &DecisionInput<'_, U>, rng: &mut R) -> ValueIndex
    where
        R: Rng,
    {
        let utilities = input.utilities;
        let current = input.current;
        let current_utility = utilities[current.get()];

        // Best non-current value; strict comparison keeps the first
        // encountered on ties.
        let mut max_delta_state = None;
        let mut best_utility = U::neg_infinity();
        for (position, &utility) in utilities.iter().enumerate() {
            if position != current.get() && utility > best_utility {
                best_utility = utility;
                max_delta_state = Some(ValueIndex::new(position));
            }
        }

        let max_delta = best_utility - current_utility;
        self.max_delta = max_delta;

        let probability = rng.random::<f64>();
        let inertia_open = probability > self.config.inertia;
        let zero = U::zero();
        let unsatisfied = !input.all_satisfied;

        let adopt = match self.config.variant {
            DsaVariant::A => max_delta > zero && inertia_open,
            DsaVariant::B => {
                (max_delta > zero || (max_delta == zero && unsatisfied)) && inertia_open
            }
            DsaVariant::C => max_delta >= zero && inertia_open,
            DsaVariant::D => {
                max_delta > zero || (max_delta == zero && unsatisfied && inertia_open)
            }
            DsaVariant::E => max_delta > zero || (max_delta == zero && inertia_open),
        };

        let chosen = match (adopt, max_delta_state) {
            (true, Some(position)) => position,
            _ => current,
        };

        self.exists_better = exists_better_than(utilities, chosen);
        chosen
    }

    /// Suppression rule for an unchanged value: no improving move known.
    #[inline]
    pub(crate) fn score_signal(&self, _input: &SignalInput<U>) -> f64 {
        if self.max_delta <= U::zero() {
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
        ChaCha8Rng::seed_from_u64(11)
    }

    fn input(utilities: &[f64], current: usize, all_satisfied: bool) -> DecisionInput<'_, f64> {
        DecisionInput {
            utilities,
            current: ValueIndex::new(current),
            all_satisfied,
        }
    }

    fn state(variant: DsaVariant, inertia: f64) -> DsaState<f64> {
        DsaState::new(DsaConfig { variant, inertia })
    }

    #[test]
    fn test_variant_a_adopted_moves_strictly_improve() {
        // Across many randomized utility landscapes, any adopted move must
        // strictly improve the utility.
        let mut rng = rng();
        let mut state = state(DsaVariant::A, 0.3);
        for _ in 0..200 {
            let utilities: Vec<f64> = (0..4).map(|_| rng.random::<f64>() * 3.0).collect();
            let current = rng.random_range(0..4);
            let chosen = state.decide(&input(&utilities, current, false), &mut rng);
            assert!(chosen.get() < 4, "chosen position must stay in the domain");
            if chosen.get() != current {
                assert!(
                    utilities[chosen.get()] > utilities[current],
                    "DSA-A adopted a non-improving move: {} -> {}",
                    utilities[current],
                    utilities[chosen.get()]
                );
            }
        }
    }

    #[test]
    fn test_tie_break_is_first_in_domain_order() {
        let mut state = state(DsaVariant::D, 0.0);
        let mut rng = rng();
        let chosen = state.decide(&input(&[1.0, 3.0, 3.0], 0, false), &mut rng);
        assert_eq!(chosen, ValueIndex::new(1), "ties break to the first value");
    }

    #[test]
    fn test_variant_d_ignores_inertia_on_improving_move() {
        // Inertia 1.0 closes the gate completely; D must still adopt.
        let mut state = state(DsaVariant::D, 1.0);
        let mut rng = rng();
        let chosen = state.decide(&input(&[0.0, 1.0], 0, false), &mut rng);
        assert_eq!(chosen, ValueIndex::new(1));
    }

    #[test]
    fn test_variant_a_rejects_sideways_move() {
        let mut state = state(DsaVariant::A, 0.0);
        let mut rng = rng();
        for _ in 0..20 {
            let chosen = state.decide(&input(&[1.0, 1.0], 0, false), &mut rng);
            assert_eq!(chosen, ValueIndex::new(0), "A never moves on max_delta == 0");
        }
    }

    #[test]
    fn test_variant_c_accepts_sideways_move() {
        let mut state = state(DsaVariant::C, 0.0);
        let mut rng = rng();
        let mut moved = false;
        for _ in 0..20 {
            if state.decide(&input(&[1.0, 1.0], 0, true), &mut rng) == ValueIndex::new(1) {
                moved = true;
                break;
            }
        }
        assert!(moved, "C must take sideways moves with open inertia");
    }

    #[test]
    fn test_variant_b_requires_unsatisfied_for_sideways_move() {
        let mut rng = rng();
        let mut satisfied_state = state(DsaVariant::B, 0.0);
        for _ in 0..20 {
            let chosen = satisfied_state.decide(&input(&[1.0, 1.0], 0, true), &mut rng);
            assert_eq!(chosen, ValueIndex::new(0), "B keeps satisfied plateaus");
        }

        let mut unsatisfied_state = state(DsaVariant::B, 0.0);
        let mut moved = false;
        for _ in 0..20 {
            if unsatisfied_state.decide(&input(&[1.0, 1.0], 0, false), &mut rng)
                == ValueIndex::new(1)
            {
                moved = true;
                break;
            }
        }
        assert!(moved, "B must explore unsatisfied plateaus");
    }

    #[test]
    fn test_signal_suppressed_without_improving_move() {
        let mut state = state(DsaVariant::A, 0.0);
        let mut rng = rng();
        let chosen = state.decide(&input(&[2.0, 1.0], 0, true), &mut rng);
        assert_eq!(chosen, ValueIndex::new(0));
        assert!(state.max_delta() < 0.0);
        let score = state.score_signal(&SignalInput {
            changed: false,
            all_satisfied: true,
            utility: 2.0,
            num_incident: 2,
        });
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_nash_flag_tracks_remaining_improvement() {
        let mut state = state(DsaVariant::A, 1.0);
        let mut rng = rng();
        // Inertia 1.0 blocks the move, so a better value remains.
        let chosen = state.decide(&input(&[0.0, 1.0], 0, false), &mut rng);
        assert_eq!(chosen, ValueIndex::new(0));
        assert!(state.exists_better());
    }
}
