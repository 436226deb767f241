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

/// A composite monitor that aggregates multiple monitors and forwards events to all of them.
pub struct CompositeMonitor<'a, U> {
    monitors: Vec<Box<dyn SolveMonitor<U> + 'a>>,
}

impl<'a, U> std::fmt::Debug for CompositeMonitor<'a, U>
where
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let monitors_str = self
            .monitors
            .iter()
            .map(|m| m.name())
            .collect::<Vec<&str>>()
            .join(", ");

        f.debug_struct("CompositeMonitor")
            .field("monitors", &monitors_str)
            .finish()
    }
}

impl<'a, U> std::fmt::Display for CompositeMonitor<'a, U>
where
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let monitors_str = self
            .monitors
            .iter()
            .map(|m| m.name())
            .collect::<Vec<&str>>()
            .join(", ");

        write!(f, "CompositeMonitor([{}])", monitors_str)
    }
}

impl<'a, U> Default for CompositeMonitor<'a, U>
where
    U: UtilityNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, U> CompositeMonitor<'a, U>
where
    U: UtilityNumeric,
{
    /// Creates a new empty `CompositeMonitor`.
    #[inline]
    pub fn new() -> CompositeMonitor<'a, U> {
        CompositeMonitor {
            monitors: Vec::new(),
        }
    }

    /// Creates a new `CompositeMonitor` with the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> CompositeMonitor<'a, U> {
        CompositeMonitor {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Creates a new `CompositeMonitor` from a vector of boxed monitors.
    #[inline]
    pub fn from_vec(monitors: Vec<Box<dyn SolveMonitor<U> + 'a>>) -> CompositeMonitor<'a, U> {
        CompositeMonitor { monitors }
    }

    /// Adds a new monitor to the composite monitor.
    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: SolveMonitor<U> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Adds a new boxed monitor to the composite monitor.
    #[inline]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn SolveMonitor<U> + 'a>) {
        self.monitors.push(monitor);
    }

    /// Returns the number of monitors in the composite monitor.
    #[inline]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Returns `true` if the composite monitor contains no monitors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, U> FromIterator<Box<dyn SolveMonitor<U> + 'a>> for CompositeMonitor<'a, U>
where
    U: UtilityNumeric,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn SolveMonitor<U> + 'a>>,
    {
        let monitors: Vec<Box<dyn SolveMonitor<U> + 'a>> = iter.into_iter().collect();
        CompositeMonitor { monitors }
    }
}

impl<'a, U> SolveMonitor<U> for CompositeMonitor<'a, U>
where
    U: UtilityNumeric,
{
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_enter_solve(&mut self, num_agents: usize) {
        for monitor in &mut self.monitors {
            monitor.on_enter_solve(num_agents);
        }
    }

    fn on_exit_solve(&mut self) {
        for monitor in &mut self.monitors {
            monitor.on_exit_solve();
        }
    }

    fn on_round(&mut self, observation: &RoundObservation<U>) {
        for monitor in &mut self.monitors {
            monitor.on_round(observation);
        }
    }

    fn search_command(&self) -> SolverCommand {
        // A plain loop instead of `Iterator::find_map`: this is queried after
        // every round and the first terminating monitor settles it.
        for monitor in &self.monitors {
            if let SolverCommand::Terminate(reason) = monitor.search_command() {
                return SolverCommand::Terminate(reason);
            }
        }
        SolverCommand::Continue
    }
}
