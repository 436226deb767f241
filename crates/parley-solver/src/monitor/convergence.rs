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

//! # Convergence Monitor
//!
//! Watches the global aggregates the engine assembles on polling rounds and
//! requests termination once one of the two convergence tests holds:
//!
//! - **Global optimum**: the gap between the total constraint count and the
//!   summed satisfaction utility is below the optimality tolerance. Every
//!   constraint is satisfied.
//! - **Nash equilibrium**: the conjunction of all per-agent flags is true,
//!   meaning no agent can strictly improve by changing its own value.
//!
//! The global optimum check runs first, so a run that is both satisfied and
//! stable reports the stronger reason.

use crate::monitor::solve_monitor::{RoundObservation, SolveMonitor, SolverCommand};
use crate::result::TerminationReason;
use parley_agent::termination::DEFAULT_OPTIMALITY_EPS;
use parley_core::num::UtilityNumeric;

#[derive(Debug, Clone)]
pub struct ConvergenceMonitor<U>
where
    U: UtilityNumeric,
{
    optimality_eps: U,
    command: SolverCommand,
}

impl<U> ConvergenceMonitor<U>
where
    U: UtilityNumeric,
{
    #[inline]
    pub fn new(optimality_eps: U) -> Self {
        Self {
            optimality_eps,
            command: SolverCommand::Continue,
        }
    }

    /// Returns the configured optimality tolerance.
    #[inline]
    pub fn optimality_eps(&self) -> U {
        self.optimality_eps
    }
}

impl<U> Default for ConvergenceMonitor<U>
where
    U: UtilityNumeric,
{
    fn default() -> Self {
        Self::new(<U as From<f64>>::from(DEFAULT_OPTIMALITY_EPS))
    }
}

impl<U> SolveMonitor<U> for ConvergenceMonitor<U>
where
    U: UtilityNumeric,
{
    fn name(&self) -> &str {
        "ConvergenceMonitor"
    }

    fn on_enter_solve(&mut self, _num_agents: usize) {
        self.command = SolverCommand::Continue;
    }

    fn on_exit_solve(&mut self) {}

    #[inline(always)]
    fn on_round(&mut self, observation: &RoundObservation<U>) {
        let Some((utility, nash)) = &observation.aggregates else {
            return;
        };

        if utility.is_globally_optimal(self.optimality_eps) {
            self.command = SolverCommand::Terminate(TerminationReason::GlobalOptimum);
        } else if nash.is_equilibrium() {
            self.command = SolverCommand::Terminate(TerminationReason::NashEquilibrium);
        }
    }

    #[inline(always)]
    fn search_command(&self) -> SolverCommand {
        self.command.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_agent::termination::{NashAggregate, UtilityAggregate};

    fn observation(
        aggregates: Option<(UtilityAggregate<f64>, NashAggregate)>,
    ) -> RoundObservation<f64> {
        RoundObservation {
            round: 1,
            active_agents: 2,
            aggregates,
        }
    }

    #[test]
    fn test_waits_between_polls() {
        let mut mon = ConvergenceMonitor::<f64>::default();
        mon.on_enter_solve(3);
        mon.on_round(&observation(None));
        assert_eq!(mon.search_command(), SolverCommand::Continue);
    }

    #[test]
    fn test_global_optimum_fires_on_zero_gap() {
        let mut mon = ConvergenceMonitor::<f64>::default();
        mon.on_enter_solve(3);

        let utility = UtilityAggregate::from_parts(8, 8.0);
        mon.on_round(&observation(Some((utility, NashAggregate::from_flag(false)))));
        assert_eq!(
            mon.search_command(),
            SolverCommand::Terminate(TerminationReason::GlobalOptimum)
        );
    }

    #[test]
    fn test_nash_equilibrium_fires_when_unsatisfied_but_stable() {
        let mut mon = ConvergenceMonitor::<f64>::default();
        mon.on_enter_solve(3);

        let utility = UtilityAggregate::from_parts(8, 6.0);
        mon.on_round(&observation(Some((utility, NashAggregate::from_flag(true)))));
        assert_eq!(
            mon.search_command(),
            SolverCommand::Terminate(TerminationReason::NashEquilibrium)
        );
    }

    #[test]
    fn test_global_optimum_takes_precedence_over_nash() {
        let mut mon = ConvergenceMonitor::<f64>::default();
        mon.on_enter_solve(3);

        let utility = UtilityAggregate::from_parts(8, 8.0);
        mon.on_round(&observation(Some((utility, NashAggregate::from_flag(true)))));
        assert_eq!(
            mon.search_command(),
            SolverCommand::Terminate(TerminationReason::GlobalOptimum)
        );
    }

    #[test]
    fn test_no_trigger_while_gap_remains() {
        let mut mon = ConvergenceMonitor::<f64>::default();
        mon.on_enter_solve(3);

        let utility = UtilityAggregate::from_parts(8, 5.0);
        mon.on_round(&observation(Some((utility, NashAggregate::from_flag(false)))));
        assert_eq!(mon.search_command(), SolverCommand::Continue);
    }
}
