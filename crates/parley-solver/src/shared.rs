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

//! Shared state for free-running agent threads.
//!
//! Under asynchronous scheduling every agent publishes its latest decision
//! into a lock-free cell that neighbors and the coordinator read without
//! blocking. All fields use relaxed atomics: agents tolerate arbitrarily
//! stale neighbor views, and the coordinator's aggregates only need to be
//! eventually consistent. The utility is a finite `f64` transported through
//! its raw bit pattern.

use parley_agent::termination::{NashAggregate, UtilityAggregate};
use parley_core::num::UtilityNumeric;
use parley_model::index::ValueIndex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Per-agent publication slot.
#[derive(Debug)]
pub struct AgentCell {
    position: AtomicUsize,
    utility_bits: AtomicU64,
    satisfied_constraints: AtomicU64,
    nash_flag: AtomicBool,
    constraint_count: u64,
}

impl AgentCell {
    /// Creates a cell for an agent incident to `constraint_count` constraints,
    /// seeded with its initial domain position.
    #[inline]
    pub fn new(initial_position: ValueIndex, constraint_count: u64) -> Self {
        Self {
            position: AtomicUsize::new(initial_position.get()),
            utility_bits: AtomicU64::new(0.0f64.to_bits()),
            satisfied_constraints: AtomicU64::new(0),
            // Seeded false so the coordinator cannot observe a spurious
            // equilibrium before the first decision step.
            nash_flag: AtomicBool::new(false),
            constraint_count,
        }
    }

    /// Publishes the result of a decision step.
    #[inline]
    pub fn publish(&self, position: ValueIndex, utility: f64, satisfied: u64, nash: bool) {
        self.position.store(position.get(), Ordering::Relaxed);
        self.utility_bits.store(utility.to_bits(), Ordering::Relaxed);
        self.satisfied_constraints.store(satisfied, Ordering::Relaxed);
        self.nash_flag.store(nash, Ordering::Relaxed);
    }

    /// Returns the last published domain position.
    #[inline]
    pub fn position(&self) -> ValueIndex {
        ValueIndex::new(self.position.load(Ordering::Relaxed))
    }

    /// Returns the last published local utility.
    #[inline]
    pub fn utility(&self) -> f64 {
        f64::from_bits(self.utility_bits.load(Ordering::Relaxed))
    }

    /// Returns the last published satisfied-constraint count.
    #[inline]
    pub fn satisfied_constraints(&self) -> u64 {
        self.satisfied_constraints.load(Ordering::Relaxed)
    }

    /// Returns the last published equilibrium flag.
    #[inline]
    pub fn nash_flag(&self) -> bool {
        self.nash_flag.load(Ordering::Relaxed)
    }

    /// Returns the number of constraints incident to this agent.
    #[inline]
    pub fn constraint_count(&self) -> u64 {
        self.constraint_count
    }
}

/// The full publication table, one cell per agent.
#[derive(Debug)]
pub struct SharedLedger {
    cells: Vec<AgentCell>,
}

impl SharedLedger {
    #[inline]
    pub fn from_cells(cells: Vec<AgentCell>) -> Self {
        Self { cells }
    }

    /// Returns the cell belonging to the agent at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn cell(&self, index: usize) -> &AgentCell {
        &self.cells[index]
    }

    /// Returns the number of agents covered by the ledger.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Folds every cell into the global utility aggregate.
    pub fn reduce_utility<U>(&self) -> UtilityAggregate<U>
    where
        U: UtilityNumeric,
    {
        self.cells
            .iter()
            .fold(UtilityAggregate::identity(), |acc, cell| {
                acc.combine(UtilityAggregate::from_parts(
                    cell.constraint_count(),
                    <U as From<f64>>::from(cell.utility()),
                ))
            })
    }

    /// Folds every cell into the global equilibrium aggregate.
    pub fn reduce_nash(&self) -> NashAggregate {
        self.cells.iter().fold(NashAggregate::identity(), |acc, cell| {
            acc.combine(NashAggregate::from_flag(cell.nash_flag()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_two_agents() -> SharedLedger {
        SharedLedger::from_cells(vec![
            AgentCell::new(ValueIndex::new(0), 2),
            AgentCell::new(ValueIndex::new(1), 3),
        ])
    }

    #[test]
    fn test_initial_cell_state() {
        let ledger = ledger_with_two_agents();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.cell(0).position(), ValueIndex::new(0));
        assert_eq!(ledger.cell(1).position(), ValueIndex::new(1));
        assert_eq!(ledger.cell(0).utility(), 0.0);
        assert!(!ledger.cell(0).nash_flag());
    }

    #[test]
    fn test_publish_round_trips() {
        let ledger = ledger_with_two_agents();
        ledger.cell(0).publish(ValueIndex::new(2), 1.5, 1, true);

        assert_eq!(ledger.cell(0).position(), ValueIndex::new(2));
        assert_eq!(ledger.cell(0).utility(), 1.5);
        assert_eq!(ledger.cell(0).satisfied_constraints(), 1);
        assert!(ledger.cell(0).nash_flag());
    }

    #[test]
    fn test_reduce_utility_sums_counts_and_utilities() {
        let ledger = ledger_with_two_agents();
        ledger.cell(0).publish(ValueIndex::new(0), 2.0, 2, true);
        ledger.cell(1).publish(ValueIndex::new(1), 3.0, 3, true);

        let aggregate = ledger.reduce_utility::<f64>();
        assert_eq!(aggregate.constraint_count(), 5);
        assert_eq!(aggregate.utility(), 5.0);
        assert!(aggregate.is_globally_optimal(0.001));
    }

    #[test]
    fn test_reduce_nash_is_conjunction() {
        let ledger = ledger_with_two_agents();
        ledger.cell(0).publish(ValueIndex::new(0), 2.0, 2, true);
        assert!(!ledger.reduce_nash().is_equilibrium());

        ledger.cell(1).publish(ValueIndex::new(1), 3.0, 3, true);
        assert!(ledger.reduce_nash().is_equilibrium());
    }

    #[test]
    fn test_fresh_ledger_is_not_an_equilibrium() {
        let ledger = ledger_with_two_agents();
        assert!(!ledger.reduce_nash().is_equilibrium());
        let aggregate = ledger.reduce_utility::<f64>();
        assert!(!aggregate.is_globally_optimal(0.001));
    }
}
