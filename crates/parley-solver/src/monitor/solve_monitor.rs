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

//! Monitor contract for the synchronous solve loop.
//!
//! Monitors observe the engine between rounds and can request termination.
//! The engine drives them through three hooks: `on_enter_solve` before the
//! first round, `on_round` after every completed round, and `on_exit_solve`
//! once the loop has stopped. After each `on_round` the engine asks every
//! monitor for a `SolverCommand`; the first `Terminate` wins and carries a
//! typed `TerminationReason` into the outcome.

use crate::result::TerminationReason;
use parley_agent::termination::{NashAggregate, UtilityAggregate};
use parley_core::num::UtilityNumeric;

#[derive(Clone, PartialEq, Debug, Default)]
pub enum SolverCommand {
    #[default]
    Continue,
    Terminate(TerminationReason),
}

impl std::fmt::Display for SolverCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverCommand::Continue => write!(f, "Continue"),
            SolverCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// Snapshot of a completed round handed to every monitor.
///
/// The global aggregates are assembled only on polling rounds; in between
/// they are `None` and monitors that depend on them simply wait.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundObservation<U>
where
    U: UtilityNumeric,
{
    /// Index of the round that just completed, starting at one.
    pub round: u64,

    /// Number of agents scheduled for the next round.
    pub active_agents: usize,

    /// Global aggregates, present on polling rounds only.
    pub aggregates: Option<(UtilityAggregate<U>, NashAggregate)>,
}

pub trait SolveMonitor<U>
where
    U: UtilityNumeric,
{
    fn name(&self) -> &str;
    fn on_enter_solve(&mut self, num_agents: usize);
    fn on_exit_solve(&mut self);
    fn on_round(&mut self, observation: &RoundObservation<U>);
    fn search_command(&self) -> SolverCommand;
}

impl<U> std::fmt::Debug for dyn SolveMonitor<U>
where
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SolveMonitor({})", self.name())
    }
}

impl<U> std::fmt::Display for dyn SolveMonitor<U>
where
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SolveMonitor({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_default_is_continue() {
        assert_eq!(SolverCommand::default(), SolverCommand::Continue);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(SolverCommand::Continue.to_string(), "Continue");
        assert_eq!(
            SolverCommand::Terminate(TerminationReason::RoundLimit).to_string(),
            "Terminate: Round Limit Reached"
        );
    }
}
