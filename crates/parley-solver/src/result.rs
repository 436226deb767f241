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

//! Solve outcome and termination reporting.
//!
//! This module encapsulates the final result produced by a solver run,
//! including the assignment the population settled on, aggregate run
//! statistics, and a concise termination reason. The `SolveOutcome` serves
//! as a single transport object for downstream consumers such as monitors,
//! CLI tools, or higher-level orchestration logic. Termination reasons
//! distinguish between the two global convergence signals, population
//! quiescence, and solver-imposed limits, making it straightforward to
//! audit the end state of a run.

use crate::stats::SolveStatistics;
use parley_core::num::UtilityNumeric;
use parley_model::assignment::Assignment;
use parley_model::domain::ValueLabel;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// Every constraint in the model is satisfied within the optimality
    /// tolerance. This is the strongest possible outcome.
    GlobalOptimum,

    /// No agent can strictly improve its local utility by changing its own
    /// value. The assignment may still violate constraints.
    NashEquilibrium,

    /// Every agent suppressed its broadcast and the active set drained.
    /// Only reachable under synchronous scheduling.
    Quiescence,

    /// The synchronous round budget was exhausted.
    RoundLimit,

    /// The asynchronous per-agent update budget was exhausted.
    UpdateLimit,

    /// The wall-clock time budget was exhausted.
    TimeLimit,

    /// The solver aborted for an external reason. The string contains
    /// information about the cause.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::GlobalOptimum => write!(f, "Global Optimum Reached"),
            TerminationReason::NashEquilibrium => write!(f, "Nash Equilibrium Reached"),
            TerminationReason::Quiescence => write!(f, "Population Quiescent"),
            TerminationReason::RoundLimit => write!(f, "Round Limit Reached"),
            TerminationReason::UpdateLimit => write!(f, "Update Limit Reached"),
            TerminationReason::TimeLimit => write!(f, "Time Limit Reached"),
            TerminationReason::Aborted(msg) => write!(f, "Aborted: {}", msg),
        }
    }
}

/// Result of the solver after termination.
#[derive(Debug, Clone)]
pub struct SolveOutcome<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    termination_reason: TerminationReason,
    assignment: Assignment<V, U>,
    statistics: SolveStatistics,
}

impl<V, U> SolveOutcome<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// Creates a new outcome.
    #[inline]
    pub fn new(
        termination_reason: TerminationReason,
        assignment: Assignment<V, U>,
        statistics: SolveStatistics,
    ) -> Self {
        Self {
            termination_reason,
            assignment,
            statistics,
        }
    }

    /// Returns the termination reason.
    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    /// Returns the final assignment.
    #[inline]
    pub fn assignment(&self) -> &Assignment<V, U> {
        &self.assignment
    }

    /// Returns the run statistics.
    #[inline]
    pub fn statistics(&self) -> &SolveStatistics {
        &self.statistics
    }

    /// Returns `true` if the run ended in one of the two global
    /// convergence states rather than at a budget limit.
    #[inline]
    pub fn is_converged(&self) -> bool {
        matches!(
            self.termination_reason,
            TerminationReason::GlobalOptimum | TerminationReason::NashEquilibrium
        )
    }
}

impl<V, U> std::fmt::Display for SolveOutcome<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Termination: {}", self.termination_reason)?;
        writeln!(f, "{}", self.assignment)?;
        write!(f, "{}", self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termination_reason_display() {
        assert_eq!(
            TerminationReason::GlobalOptimum.to_string(),
            "Global Optimum Reached"
        );
        assert_eq!(
            TerminationReason::Aborted("user interrupt".to_string()).to_string(),
            "Aborted: user interrupt"
        );
    }

    fn outcome_with(reason: TerminationReason) -> SolveOutcome<u32, f64> {
        let assignment = Assignment::new(vec![0u32, 1], 1.0, 1, 1);
        SolveOutcome::new(reason, assignment, SolveStatistics::default())
    }

    #[test]
    fn test_is_converged() {
        assert!(outcome_with(TerminationReason::GlobalOptimum).is_converged());
        assert!(outcome_with(TerminationReason::NashEquilibrium).is_converged());
        assert!(!outcome_with(TerminationReason::Quiescence).is_converged());
        assert!(!outcome_with(TerminationReason::RoundLimit).is_converged());
        assert!(!outcome_with(TerminationReason::TimeLimit).is_converged());
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = outcome_with(TerminationReason::GlobalOptimum);
        assert_eq!(*outcome.termination_reason(), TerminationReason::GlobalOptimum);
        assert!(outcome.assignment().is_fully_satisfied());
        assert_eq!(outcome.statistics().rounds, 0);
    }
}
