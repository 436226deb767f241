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

//! # Time Limit Monitor
//!
//! A lightweight monitor that enforces a wall-clock time budget on the
//! solve. It periodically checks elapsed time (using a bitmask-based round
//! filter) and requests termination once the configured `Duration` has been
//! exceeded. A round moves every active agent once, so the default mask
//! (`0x3F`) keeps clock reads off the common path while still bounding the
//! overshoot to 64 rounds.

use crate::monitor::solve_monitor::{RoundObservation, SolveMonitor, SolverCommand};
use crate::result::TerminationReason;
use parley_core::num::UtilityNumeric;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    clock_check_mask: u64,
    rounds: u64,
    time_limit: Duration,
    start_time: Instant,
}

impl TimeLimitMonitor {
    /// Default mask: check every 64 rounds (2^6).
    /// 64 - 1 = 63 = 0x3F
    const DEFAULT_ROUND_CLOCK_CHECK_MASK: u64 = 0x3F;

    #[inline]
    pub fn new(time_limit: Duration) -> Self {
        Self {
            clock_check_mask: Self::DEFAULT_ROUND_CLOCK_CHECK_MASK,
            rounds: 0,
            time_limit,
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn with_clock_check_mask(time_limit: Duration, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            rounds: 0,
            time_limit,
            start_time: Instant::now(),
        }
    }
}

impl<U> SolveMonitor<U> for TimeLimitMonitor
where
    U: UtilityNumeric,
{
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_solve(&mut self, _num_agents: usize) {
        self.start_time = Instant::now();
        self.rounds = 0;
    }

    fn on_exit_solve(&mut self) {}

    #[inline(always)]
    fn on_round(&mut self, _observation: &RoundObservation<U>) {
        self.rounds = self.rounds.wrapping_add(1);
    }

    #[inline(always)]
    fn search_command(&self) -> SolverCommand {
        if (self.rounds & self.clock_check_mask) == 0 && self.start_time.elapsed() >= self.time_limit
        {
            return SolverCommand::Terminate(TerminationReason::TimeLimit);
        }
        SolverCommand::Continue
    }
}
