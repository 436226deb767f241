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

use crate::monitor::solve_monitor::{RoundObservation, SolveMonitor, SolverCommand};
use crate::result::TerminationReason;
use parley_core::num::UtilityNumeric;

/// A monitor that caps the number of scheduling rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundLimitMonitor {
    round_limit: u64,
    rounds: u64,
}

impl RoundLimitMonitor {
    #[inline]
    pub fn new(round_limit: u64) -> Self {
        Self {
            round_limit,
            rounds: 0,
        }
    }

    /// Returns the configured limit.
    #[inline]
    pub fn round_limit(&self) -> u64 {
        self.round_limit
    }
}

impl<U> SolveMonitor<U> for RoundLimitMonitor
where
    U: UtilityNumeric,
{
    fn name(&self) -> &str {
        "RoundLimitMonitor"
    }

    fn on_enter_solve(&mut self, _num_agents: usize) {
        self.rounds = 0;
    }

    fn on_exit_solve(&mut self) {}

    #[inline(always)]
    fn on_round(&mut self, observation: &RoundObservation<U>) {
        self.rounds = observation.round;
    }

    #[inline(always)]
    fn search_command(&self) -> SolverCommand {
        if self.rounds >= self.round_limit {
            return SolverCommand::Terminate(TerminationReason::RoundLimit);
        }
        SolverCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(round: u64) -> RoundObservation<f64> {
        RoundObservation {
            round,
            active_agents: 1,
            aggregates: None,
        }
    }

    #[test]
    fn test_continues_below_limit() {
        let mut mon = RoundLimitMonitor::new(10);
        <RoundLimitMonitor as SolveMonitor<f64>>::on_enter_solve(&mut mon, 4);
        mon.on_round(&observation(9));
        assert_eq!(
            <RoundLimitMonitor as SolveMonitor<f64>>::search_command(&mon),
            SolverCommand::Continue
        );
    }

    #[test]
    fn test_terminates_at_limit() {
        let mut mon = RoundLimitMonitor::new(10);
        <RoundLimitMonitor as SolveMonitor<f64>>::on_enter_solve(&mut mon, 4);
        mon.on_round(&observation(10));
        assert_eq!(
            <RoundLimitMonitor as SolveMonitor<f64>>::search_command(&mon),
            SolverCommand::Terminate(TerminationReason::RoundLimit)
        );
    }

    #[test]
    fn test_enter_solve_resets_round_counter() {
        let mut mon = RoundLimitMonitor::new(5);
        mon.on_round(&observation(5));
        <RoundLimitMonitor as SolveMonitor<f64>>::on_enter_solve(&mut mon, 4);
        assert_eq!(
            <RoundLimitMonitor as SolveMonitor<f64>>::search_command(&mon),
            SolverCommand::Continue
        );
    }
}
