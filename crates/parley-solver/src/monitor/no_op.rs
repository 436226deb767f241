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
use parley_core::num::UtilityNumeric;

/// A no-operation monitor that implements the `SolveMonitor` trait
/// but does nothing on any of the events, always returning `Continue` for the
/// search command.
#[repr(transparent)]
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct NoOperationMonitor<U>
where
    U: UtilityNumeric,
{
    _phantom: std::marker::PhantomData<U>,
}

impl<U> NoOperationMonitor<U>
where
    U: UtilityNumeric,
{
    /// Creates a new `NoOperationMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<U> SolveMonitor<U> for NoOperationMonitor<U>
where
    U: UtilityNumeric,
{
    #[inline(always)]
    fn name(&self) -> &str {
        "NoOperationMonitor"
    }

    #[inline(always)]
    fn on_enter_solve(&mut self, _num_agents: usize) {}

    #[inline(always)]
    fn on_exit_solve(&mut self) {}

    #[inline(always)]
    fn on_round(&mut self, _observation: &RoundObservation<U>) {}

    #[inline(always)]
    fn search_command(&self) -> SolverCommand {
        SolverCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_continues() {
        let mut mon = NoOperationMonitor::<f64>::new();
        mon.on_enter_solve(8);
        mon.on_round(&RoundObservation {
            round: 1,
            active_agents: 8,
            aggregates: None,
        });
        assert_eq!(mon.search_command(), SolverCommand::Continue);
        mon.on_exit_solve();
    }
}
