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
use std::time::{Duration, Instant};

/// Periodic console progress reporting for the solve loop.
///
/// Prints a header when the solve starts and a table row at most once per
/// `log_interval`. The utility gap and equilibrium columns are refreshed
/// whenever a polling round supplies new aggregates; between polls the last
/// known values are shown.
#[derive(Debug, Clone)]
pub struct LogMonitor<U>
where
    U: UtilityNumeric,
{
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    last_gap: Option<U>,
    last_equilibrium: Option<bool>,
}

impl<U> LogMonitor<U>
where
    U: UtilityNumeric,
{
    pub fn new(log_interval: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            last_gap: None,
            last_equilibrium: None,
        }
    }

    #[inline(always)]
    fn print_header(&self) {
        println!(
            "{:<9} | {:<12} | {:<13} | {:<14} | {:<11}",
            "Elapsed", "Round", "Active Agents", "Utility Gap", "Equilibrium"
        );
        println!("{}", "-".repeat(72));
    }

    #[inline(always)]
    fn log_line(&mut self, observation: &RoundObservation<U>) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start_time).as_secs_f32();

        let gap_str = match &self.last_gap {
            Some(gap) => format!("{}", gap),
            None => "?".to_string(),
        };
        let equilibrium_str = match self.last_equilibrium {
            Some(true) => "yes",
            Some(false) => "no",
            None => "?",
        };

        let elapsed_field = format!("{:.1}s", elapsed);

        println!(
            "{:<9} | {:<12} | {:<13} | {:<14} | {:<11}",
            elapsed_field, observation.round, observation.active_agents, gap_str, equilibrium_str
        );

        self.last_log_time = now;
    }
}

impl<U> Default for LogMonitor<U>
where
    U: UtilityNumeric,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl<U> std::fmt::Display for LogMonitor<U>
where
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LogMonitor(log_interval: {}s)", self.log_interval.as_secs())
    }
}

impl<U> SolveMonitor<U> for LogMonitor<U>
where
    U: UtilityNumeric,
{
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_solve(&mut self, _num_agents: usize) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.last_gap = None;
        self.last_equilibrium = None;
        self.print_header();
    }

    fn on_round(&mut self, observation: &RoundObservation<U>) {
        if let Some((utility, nash)) = &observation.aggregates {
            self.last_gap = Some(utility.gap());
            self.last_equilibrium = Some(nash.is_equilibrium());
        }

        if self.last_log_time.elapsed() >= self.log_interval {
            self.log_line(observation);
        }
    }

    fn on_exit_solve(&mut self) {
        println!("{}", "-".repeat(72));
        println!("Solve finished.");
    }

    fn search_command(&self) -> SolverCommand {
        SolverCommand::Continue
    }
}
