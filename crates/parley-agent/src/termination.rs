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

//! Global termination aggregates.
//!
//! Two reductions over the agent population, each commutative and
//! associative so any parallel reduction order yields the same result:
//! the utility aggregate sums per-agent constraint counts against achieved
//! utility and declares global optimality when the gap closes below an
//! epsilon, and the Nash aggregate ANDs the per-agent "no strictly better
//! unilateral move" flags. The scheduler polls them at its own cadence,
//! not every round; for a frozen population both reductions are stable
//! across repeated polls, but any agent movement invalidates the previous
//! poll.

use crate::agent::AgentState;
use parley_core::num::UtilityNumeric;
use parley_model::domain::ValueLabel;

/// Default gap below which the utility aggregate declares global
/// optimality.
pub const DEFAULT_OPTIMALITY_EPS: f64 = 0.001;

/// Sum of per-agent constraint counts and achieved utilities.
///
/// Constraints shared by several agents are counted once per participant
/// on both sides of the gap, so the comparison stays consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityAggregate<U> {
    constraint_count: u64,
    utility: U,
}

impl<U> UtilityAggregate<U>
where
    U: UtilityNumeric,
{
    /// The reduction identity: the empty population.
    #[inline]
    pub fn identity() -> Self {
        Self {
            constraint_count: 0,
            utility: U::zero(),
        }
    }

    /// Creates the aggregate contribution of a single agent.
    #[inline]
    pub fn from_parts(constraint_count: u64, utility: U) -> Self {
        Self {
            constraint_count,
            utility,
        }
    }

    /// Extracts the contribution of `agent` from its last update.
    #[inline]
    pub fn from_agent<V>(agent: &AgentState<V, U>) -> Self
    where
        V: ValueLabel,
    {
        Self {
            constraint_count: agent.num_incident_constraints(),
            utility: agent.utility(),
        }
    }

    /// Combines two partial aggregates. Commutative and associative.
    #[inline]
    pub fn combine(self, other: Self) -> Self {
        Self {
            constraint_count: self.constraint_count + other.constraint_count,
            utility: self.utility + other.utility,
        }
    }

    /// Returns the summed constraint count.
    #[inline]
    pub fn constraint_count(&self) -> u64 {
        self.constraint_count
    }

    /// Returns the summed achieved utility.
    #[inline]
    pub fn utility(&self) -> U {
        self.utility
    }

    /// Gap between the summed constraint count and the summed utility.
    #[inline]
    pub fn gap(&self) -> U {
        let full: U = (self.constraint_count as f64).into();
        full - self.utility
    }

    /// `true` when the gap has closed below `eps`.
    #[inline]
    pub fn is_globally_optimal(&self, eps: U) -> bool {
        self.gap() < eps
    }
}

impl<U> std::fmt::Display for UtilityAggregate<U>
where
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "UtilityAggregate(constraints: {}, utility: {})",
            self.constraint_count, self.utility
        )
    }
}

/// Logical AND of the per-agent Nash flags.
///
/// `true` exactly when no agent had a strictly improving unilateral move
/// at its last update: a (possibly non-strict) Nash equilibrium of the
/// induced game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NashAggregate {
    equilibrium: bool,
}

impl NashAggregate {
    /// The reduction identity: the empty population is in equilibrium.
    #[inline]
    pub fn identity() -> Self {
        Self { equilibrium: true }
    }

    /// Creates the aggregate contribution of a single flag.
    #[inline]
    pub fn from_flag(flag: bool) -> Self {
        Self { equilibrium: flag }
    }

    /// Extracts the contribution of `agent` from its last update.
    #[inline]
    pub fn from_agent<V, U>(agent: &AgentState<V, U>) -> Self
    where
        V: ValueLabel,
        U: UtilityNumeric,
    {
        Self {
            equilibrium: agent.nash_flag(),
        }
    }

    /// Combines two partial aggregates. Commutative and associative.
    #[inline]
    pub fn combine(self, other: Self) -> Self {
        Self {
            equilibrium: self.equilibrium && other.equilibrium,
        }
    }

    /// `true` when every reduced agent reported no improving move.
    #[inline]
    pub fn is_equilibrium(&self) -> bool {
        self.equilibrium
    }
}

impl std::fmt::Display for NashAggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NashAggregate({})", self.equilibrium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_aggregate_combine_is_commutative_and_associative() {
        let a = UtilityAggregate::from_parts(2, 1.5f64);
        let b = UtilityAggregate::from_parts(3, 3.0f64);
        let c = UtilityAggregate::from_parts(1, 0.25f64);

        assert_eq!(a.combine(b), b.combine(a));
        assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
        assert_eq!(a.combine(UtilityAggregate::identity()), a);
    }

    #[test]
    fn test_utility_aggregate_repeated_reduction_is_stable() {
        // A frozen population reduces to the same pair on every poll.
        let parts = [
            UtilityAggregate::from_parts(2, 2.0f64),
            UtilityAggregate::from_parts(3, 2.5f64),
            UtilityAggregate::from_parts(1, 1.0f64),
        ];
        let first = parts
            .iter()
            .fold(UtilityAggregate::identity(), |acc, &p| acc.combine(p));
        let second = parts
            .iter()
            .fold(UtilityAggregate::identity(), |acc, &p| acc.combine(p));
        assert_eq!(first, second);
        assert_eq!(first.constraint_count(), 6);
        assert_eq!(first.utility(), 5.5);
    }

    #[test]
    fn test_utility_aggregate_optimality_gap() {
        let optimal = UtilityAggregate::from_parts(4, 4.0f64);
        assert_eq!(optimal.gap(), 0.0);
        assert!(optimal.is_globally_optimal(DEFAULT_OPTIMALITY_EPS.into()));

        let short = UtilityAggregate::from_parts(4, 3.0f64);
        assert_eq!(short.gap(), 1.0);
        assert!(!short.is_globally_optimal(DEFAULT_OPTIMALITY_EPS.into()));
    }

    #[test]
    fn test_nash_aggregate_is_logical_and() {
        let yes = NashAggregate::from_flag(true);
        let no = NashAggregate::from_flag(false);

        assert!(yes.combine(yes).is_equilibrium());
        assert!(!yes.combine(no).is_equilibrium());
        assert!(!no.combine(yes).is_equilibrium());
        assert!(NashAggregate::identity().is_equilibrium());
    }

    #[test]
    fn test_nash_aggregate_all_true_population() {
        let population = [true, true, true];
        let reduced = population
            .iter()
            .fold(NashAggregate::identity(), |acc, &flag| {
                acc.combine(NashAggregate::from_flag(flag))
            });
        assert!(reduced.is_equilibrium());
    }
}
