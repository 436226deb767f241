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

//! Weighted Regret Monitoring with Inertia (WRMI).
//!
//! WRMI keeps an exponentially fading estimate of the regret of every
//! domain value: how much better that value would have scored than the
//! held one, averaged over recent rounds. Positive regrets form a sampling
//! distribution; one candidate is drawn proportionally to regret, then an
//! independent inertia gate decides whether the agent actually switches.
//! Fading memory smooths out single-round noise from concurrently moving
//! neighbors; inertia damps the oscillation that plagues greedy distributed
//! search.
//!
//! When every clipped regret is (numerically) zero the sampling
//! distribution is degenerate; this is the defined fallback to keeping the
//! current value, not an error condition. The flat-regret state also feeds
//! the local convergence signal: an unchanged, satisfied-or-flat agent
//! stops broadcasting.

use crate::policy::{exists_better_than, DecisionInput, SignalInput};
use parley_core::num::UtilityNumeric;
use parley_model::index::ValueIndex;
use rand::Rng;

/// Tunable parameters for WRMI.
#[derive(Debug, Clone, Copy)]
pub struct WrmiConfig<U> {
    /// Weight of the newest regret observation in the fading average,
    /// in `(0, 1]`.
    pub fading_memory: U,
    /// Probability of resisting a value change, in `[0, 1]`.
    pub inertia: f64,
    /// Threshold below which regrets and the normalization factor are
    /// treated as zero.
    pub eps: U,
}

impl<U> Default for WrmiConfig<U>
where
    U: UtilityNumeric,
{
    fn default() -> Self {
        Self {
            fading_memory: 0.03.into(),
            inertia: 0.5,
            eps: 0.0001.into(),
        }
    }
}

/// Per-agent WRMI state: the fading regret arrays, re-derived every round
/// from the previous round's values.
#[derive(Debug, Clone)]
pub struct WrmiState<U> {
    config: WrmiConfig<U>,
    weighted_avg_diff: Vec<U>,
    state_regret: Vec<U>,
    norm_factor: U,
    exists_better: bool,
}

impl<U> WrmiState<U>
where
    U: UtilityNumeric,
{
    /// Creates WRMI state for a domain of `domain_len` values.
    pub fn new(config: WrmiConfig<U>, domain_len: usize) -> Self {
        Self {
            config,
            weighted_avg_diff: vec![U::zero(); domain_len],
            state_regret: vec![U::zero(); domain_len],
            norm_factor: U::zero(),
            exists_better: false,
        }
    }

    /// Returns the normalization factor of the last round's regret
    /// distribution.
    #[inline]
    pub fn norm_factor(&self) -> U {
        self.norm_factor
    }

    /// Returns the clipped regret estimates, indexed by domain position.
    #[inline]
    pub fn state_regret(&self) -> &[U] {
        &self.state_regret
    }

    /// Whether a strictly better value existed after the last transition.
    #[inline]
    pub fn exists_better(&self) -> bool {
        self.exists_better
    }

    /// One WRMI transition.
    ///
    /// Updates the fading regret estimates, draws a candidate by
    /// inverse-CDF sampling over the clipped regrets (or falls back to the
    /// current value on a degenerate distribution), and applies the
    /// inertia gate.
    pub fn decide<R>(&mut self, input: &DecisionInput<'_, U>, rng: &mut R) -> ValueIndex
    where
        R: Rng,
    {
        let utilities = input.utilities;
        debug_assert_eq!(
            utilities.len(),
            self.weighted_avg_diff.len(),
            "called `WrmiState::decide` with {} utilities for {} domain values",
            utilities.len(),
            self.weighted_avg_diff.len()
        );

        let current_utility = utilities[input.current.get()];
        let fading = self.config.fading_memory;
        let retained = U::one() - fading;

        let mut norm_factor = U::zero();
        for position in 0..utilities.len() {
            let regret = utilities[position] - current_utility;
            let faded = fading * regret + retained * self.weighted_avg_diff[position];
            self.weighted_avg_diff[position] = faded;
            let clipped = if faded > self.config.eps {
                faded
            } else {
                U::zero()
            };
            self.state_regret[position] = clipped;
            norm_factor = norm_factor + clipped;
        }
        self.norm_factor = norm_factor;

        let candidate = if norm_factor < self.config.eps {
            // Degenerate distribution: defined fallback, keep the value.
            input.current
        } else {
            let draw: U = rng.random::<f64>().into();
            let target = draw * norm_factor;
            let mut cumulative = U::zero();
            let mut picked = ValueIndex::new(utilities.len() - 1);
            for (position, &regret) in self.state_regret.iter().enumerate() {
                cumulative = cumulative + regret;
                if cumulative >= target {
                    picked = ValueIndex::new(position);
                    break;
                }
            }
            picked
        };

        let acceptance = rng.random::<f64>();
        let chosen = if acceptance > self.config.inertia && candidate != input.current {
            candidate
        } else {
            input.current
        };

        self.exists_better = exists_better_than(utilities, chosen);
        chosen
    }

    /// Suppression rule for an unchanged value: fully satisfied, or the
    /// regret signal has gone flat.
    #[inline]
    pub(crate) fn score_signal(&self, input: &SignalInput<U>) -> f64 {
        let full: U = (input.num_incident as f64).into();
        if input.utility == full || self.norm_factor < self.config.eps {
            0.0
        } else {
            1.0
        }
    }
}
