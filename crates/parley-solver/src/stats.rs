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

//! Statistics reporting for solver runs.
//!
//! This module defines a lightweight container for tracking aggregate metrics
//! during a solve, including round count, number of agent updates, number of
//! adopted values, suppressed broadcasts, aggregator polls, and total elapsed
//! time. The interface is optimized for hot-loop usage: updates rely on
//! saturating arithmetic to avoid overflow traps and expose clear, inline
//! methods for per-round and per-event accounting. The resulting
//! `SolveStatistics` can be consumed by monitors and result reporting to
//! provide visibility into solver progress without imposing measurable
//! overhead on the inner loop.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolveStatistics {
    /// Number of scheduling rounds performed. Under asynchronous execution
    /// this counts coordinator polls instead.
    pub rounds: u64,

    /// Total number of agent decision steps performed.
    pub agent_updates: u64,

    /// Number of decision steps that adopted a new value.
    pub values_adopted: u64,

    /// Number of decision steps whose broadcast was suppressed by a
    /// zero convergence score.
    pub suppressed_broadcasts: u64,

    /// Number of times the global aggregates were assembled.
    pub aggregator_polls: u64,

    /// Total wall-clock time taken by the run.
    pub time_total: Duration,
}

impl Default for SolveStatistics {
    fn default() -> Self {
        Self {
            rounds: 0,
            agent_updates: 0,
            values_adopted: 0,
            suppressed_broadcasts: 0,
            aggregator_polls: 0,
            time_total: Duration::ZERO,
        }
    }
}

impl SolveStatistics {
    /// Called at the end of each scheduling round.
    #[inline]
    pub fn on_round(&mut self) {
        self.rounds = self.rounds.saturating_add(1);
    }

    /// Called when an agent performs a decision step.
    #[inline]
    pub fn on_update(&mut self, adopted: bool) {
        self.agent_updates = self.agent_updates.saturating_add(1);
        if adopted {
            self.values_adopted = self.values_adopted.saturating_add(1);
        }
    }

    /// Called when an agent suppresses its broadcast.
    #[inline]
    pub fn on_suppressed_broadcast(&mut self) {
        self.suppressed_broadcasts = self.suppressed_broadcasts.saturating_add(1);
    }

    /// Called when the global aggregates are assembled.
    #[inline]
    pub fn on_aggregator_poll(&mut self) {
        self.aggregator_polls = self.aggregator_polls.saturating_add(1);
    }

    /// Sets the total time taken by the run.
    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Folds the per-thread counters of `other` into this instance. Round,
    /// poll, and time accounting stay with the coordinator.
    pub fn merge_agent_counters(&mut self, other: &SolveStatistics) {
        self.agent_updates = self.agent_updates.saturating_add(other.agent_updates);
        self.values_adopted = self.values_adopted.saturating_add(other.values_adopted);
        self.suppressed_broadcasts = self
            .suppressed_broadcasts
            .saturating_add(other.suppressed_broadcasts);
    }

    /// Number of decision steps that kept the current value.
    #[inline]
    pub fn values_kept(&self) -> u64 {
        self.agent_updates.saturating_sub(self.values_adopted)
    }
}

impl std::fmt::Display for SolveStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Parley Solver Statistics:")?;
        writeln!(f, "   Rounds:                {}", self.rounds)?;
        writeln!(f, "   Agent Updates:         {}", self.agent_updates)?;
        writeln!(f, "   Values Adopted:        {}", self.values_adopted)?;
        writeln!(f, "   Values Kept:           {}", self.values_kept())?;
        writeln!(f, "   Suppressed Broadcasts: {}", self.suppressed_broadcasts)?;
        writeln!(f, "   Aggregator Polls:      {}", self.aggregator_polls)?;
        writeln!(f, "   Total Time:            {:?}", self.time_total)?;
        Ok(())
    }
}
