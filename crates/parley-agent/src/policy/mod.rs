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

//! Decision policies for the per-agent update.
//!
//! A decision policy turns the utilities an agent would achieve at each of
//! its domain values (under the latest neighbor configuration) into the
//! value the agent holds for the next round. The three families differ in
//! how they trade exploitation against oscillation damping and escape from
//! local optima:
//!
//! - `wrmi`: weighted regret monitoring with inertia — fading-memory regret
//!   estimates drive a weighted-random value draw, gated by inertia.
//! - `dsa`: the distributed stochastic algorithm, variants A through E —
//!   a deterministic best-alternative move gated by per-variant
//!   accept/reject rules.
//! - `dsan`: distributed simulated annealing — a uniformly random proposal
//!   accepted by a Metropolis-style rule under an injected, time-decaying
//!   exploration schedule.
//!
//! The families are a closed set, modeled as a tagged variant type rather
//! than an open trait hierarchy: variant-specific bookkeeping (regret
//! arrays, round counters, schedules) stays inside its variant, and the
//! scheduler dispatches through one `decide` entry point. Every policy also
//! answers the local convergence question (`score_signal`) and exposes the
//! Nash flag consumed by the global termination aggregate.
//!
//! All randomness flows through the caller-supplied generator; policies
//! hold no RNG of their own, which keeps per-agent streams independent and
//! unit tests reproducible.

pub mod dsa;
pub mod dsan;
pub mod wrmi;

use parley_core::num::UtilityNumeric;
use parley_model::index::ValueIndex;
use rand::Rng;
use std::sync::Arc;

pub use dsa::{DsaConfig, DsaState, DsaVariant};
pub use dsan::{
    ConstantSchedule, DsanConfig, DsanState, ExplorationSchedule, QuadraticSchedule,
};
pub use wrmi::{WrmiConfig, WrmiState};

/// Per-invocation input to a decision policy.
///
/// `utilities` holds the agent's total utility at every domain position
/// under the current neighbor configuration; it is the agent's scratch
/// arena, filled once per update.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a, U> {
    /// Total utility at each domain position, indexed by position.
    pub utilities: &'a [U],
    /// The position currently held by the agent.
    pub current: ValueIndex,
    /// Whether every incident constraint is satisfied at `current`.
    pub all_satisfied: bool,
}

/// Input to the local convergence signal, derived after an update.
#[derive(Debug, Clone, Copy)]
pub struct SignalInput<U> {
    /// Whether the last update adopted a different value.
    pub changed: bool,
    /// Whether every incident constraint is satisfied at the held value.
    pub all_satisfied: bool,
    /// Total utility at the held value.
    pub utility: U,
    /// Number of incident constraints.
    pub num_incident: usize,
}

/// Configuration for a decision policy, instantiated per agent.
///
/// The spec is sized-agnostic and cloneable; per-agent state (regret
/// arrays, counters) is allocated when the agent is built.
#[derive(Debug, Clone)]
pub enum PolicySpec<U> {
    /// Weighted regret monitoring with inertia.
    Wrmi(WrmiConfig<U>),
    /// Distributed stochastic algorithm, one of variants A through E.
    Dsa(DsaConfig),
    /// Distributed simulated annealing with an exploration schedule.
    Dsan(DsanConfig<U>),
}

impl<U> PolicySpec<U>
where
    U: UtilityNumeric,
{
    /// WRMI with default parameters.
    #[inline]
    pub fn wrmi() -> Self {
        PolicySpec::Wrmi(WrmiConfig::default())
    }

    /// DSA with the given variant and inertia.
    #[inline]
    pub fn dsa(variant: DsaVariant, inertia: f64) -> Self {
        PolicySpec::Dsa(DsaConfig { variant, inertia })
    }

    /// DSAN with the standard quadratic exploration schedule.
    #[inline]
    pub fn dsan() -> Self {
        PolicySpec::Dsan(DsanConfig::default())
    }

    /// DSAN with a custom exploration schedule.
    #[inline]
    pub fn dsan_with_schedule(schedule: Arc<dyn ExplorationSchedule<U>>) -> Self {
        PolicySpec::Dsan(DsanConfig { schedule })
    }
}

/// The closed set of decision policies, carrying per-agent state.
#[derive(Debug, Clone)]
pub enum DecisionPolicy<U> {
    /// Weighted regret monitoring with inertia.
    Wrmi(WrmiState<U>),
    /// Distributed stochastic algorithm.
    Dsa(DsaState<U>),
    /// Distributed simulated annealing.
    Dsan(DsanState<U>),
}

impl<U> DecisionPolicy<U>
where
    U: UtilityNumeric,
{
    /// Instantiates per-agent policy state from a spec, sized to the
    /// agent's domain.
    pub fn from_spec(spec: &PolicySpec<U>, domain_len: usize) -> Self {
        match spec {
            PolicySpec::Wrmi(config) => {
                DecisionPolicy::Wrmi(WrmiState::new(config.clone(), domain_len))
            }
            PolicySpec::Dsa(config) => DecisionPolicy::Dsa(DsaState::new(*config)),
            PolicySpec::Dsan(config) => DecisionPolicy::Dsan(DsanState::new(config.clone())),
        }
    }

    /// Returns the name of the policy family (and variant, for DSA).
    pub fn name(&self) -> &'static str {
        match self {
            DecisionPolicy::Wrmi(_) => "WRMI",
            DecisionPolicy::Dsa(state) => state.variant().name(),
            DecisionPolicy::Dsan(_) => "DSAN",
        }
    }

    /// Computes the position to hold for the next round.
    ///
    /// One state-machine transition: the policy updates its internal
    /// bookkeeping (regrets, deltas, round counter, Nash flag) and returns
    /// the chosen position, which may equal the current one.
    #[inline]
    pub fn decide<R>(&mut self, input: &DecisionInput<'_, U>, rng: &mut R) -> ValueIndex
    where
        R: Rng,
    {
        match self {
            DecisionPolicy::Wrmi(state) => state.decide(input, rng),
            DecisionPolicy::Dsa(state) => state.decide(input, rng),
            DecisionPolicy::Dsan(state) => state.decide(input, rng),
        }
    }

    /// Returns the activity score after an update: `1.0` to keep
    /// broadcasting the held value, `0.0` to suppress.
    ///
    /// Any value change always signals; the per-family suppression rules
    /// apply only to unchanged values.
    #[inline]
    pub fn score_signal(&self, input: &SignalInput<U>) -> f64 {
        if input.changed {
            return 1.0;
        }
        match self {
            DecisionPolicy::Wrmi(state) => state.score_signal(input),
            DecisionPolicy::Dsa(state) => state.score_signal(input),
            DecisionPolicy::Dsan(state) => state.score_signal(input),
        }
    }

    /// Whether a strictly better unilateral value existed at the end of
    /// the last update. Feeds the Nash-equilibrium aggregate only; no
    /// policy consults it for its own transition.
    #[inline]
    pub fn exists_better(&self) -> bool {
        match self {
            DecisionPolicy::Wrmi(state) => state.exists_better(),
            DecisionPolicy::Dsa(state) => state.exists_better(),
            DecisionPolicy::Dsan(state) => state.exists_better(),
        }
    }
}

/// Returns `true` if any position other than `chosen` has strictly higher
/// utility.
#[inline]
pub(crate) fn exists_better_than<U>(utilities: &[U], chosen: ValueIndex) -> bool
where
    U: UtilityNumeric,
{
    let reference = utilities[chosen.get()];
    utilities
        .iter()
        .enumerate()
        .any(|(position, &utility)| position != chosen.get() && utility > reference)
}
