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

//! Utility constraints over partial assignments.
//!
//! A constraint declares an ordered list of participating agents and maps
//! any assignment covering those agents to a real-valued utility. This is
//! the atomic unit of local evaluation: an agent's total utility at a
//! candidate value is the sum over its incident constraints, evaluated
//! against its own view of the latest neighbor values.
//!
//! Constraints are pure and immutable after construction. They are shared
//! read-only (`Arc`) by every participating agent and evaluated
//! concurrently, so implementations must not carry interior mutability.
//! The caller guarantees that the supplied view covers every declared
//! participant; evaluating against an incomplete view is a caller error,
//! checked with debug assertions on the hot path.
//!
//! Stock implementations cover the common cases: `NotEqual` for
//! graph-coloring style problems, `TableConstraint` for explicit utility
//! tables, and `FnConstraint` for arbitrary functions.

use crate::domain::ValueLabel;
use crate::index::AgentIndex;
use parley_core::num::UtilityNumeric;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A read-only view of a (partial) variable assignment.
///
/// The engine hands constraints a view backed by the evaluating agent's
/// neighbor map with the agent's own variable overridden by the candidate
/// value under evaluation; no per-call map is materialized.
pub trait AssignmentView<V> {
    /// Returns the value currently assigned to `agent`, if known.
    fn value_of(&self, agent: AgentIndex) -> Option<V>;
}

/// A pure utility function over an ordered set of participating variables.
///
/// Implementations must be deterministic and side-effect free; the same
/// constraint instance is evaluated concurrently by all of its
/// participants.
pub trait ConstraintFunction<V, U>: Send + Sync
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// The agents whose variables this constraint ranges over, in the
    /// declared order.
    fn participants(&self) -> &[AgentIndex];

    /// Evaluates the constraint against `view`.
    ///
    /// `view` must cover every participant; behavior on a missing
    /// participant is a caller error.
    fn utility(&self, view: &dyn AssignmentView<V>) -> U;

    /// Returns `true` if the constraint is satisfied under `view`.
    ///
    /// The default treats utility `>= 1` as satisfied, matching the common
    /// 1.0/0.0 encoding; constraints with other utility scales may
    /// override.
    fn is_satisfied(&self, view: &dyn AssignmentView<V>) -> bool {
        self.utility(view) >= U::one()
    }
}

impl<V, U> std::fmt::Debug for dyn ConstraintFunction<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConstraintFunction({:?})", self.participants())
    }
}

/// A binary constraint awarding utility 1 when the two variables differ.
///
/// The workhorse of graph-coloring benchmarks.
#[derive(Debug, Clone)]
pub struct NotEqual<U> {
    participants: [AgentIndex; 2],
    _marker: std::marker::PhantomData<U>,
}

impl<U> NotEqual<U> {
    /// Creates a not-equal constraint between agents `a` and `b`.
    #[inline]
    pub fn new(a: AgentIndex, b: AgentIndex) -> Self {
        Self {
            participants: [a, b],
            _marker: std::marker::PhantomData,
        }
    }
}

impl<V, U> ConstraintFunction<V, U> for NotEqual<U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    #[inline]
    fn participants(&self) -> &[AgentIndex] {
        &self.participants
    }

    #[inline]
    fn utility(&self, view: &dyn AssignmentView<V>) -> U {
        let a = view.value_of(self.participants[0]);
        let b = view.value_of(self.participants[1]);
        debug_assert!(
            a.is_some() && b.is_some(),
            "called `NotEqual::utility` with a view missing participant {} or {}",
            self.participants[0],
            self.participants[1]
        );
        match (a, b) {
            (Some(a), Some(b)) if a != b => U::one(),
            _ => U::zero(),
        }
    }
}

/// Inline capacity for participant keys; constraints are almost always
/// binary or ternary.
type ValueKey<V> = SmallVec<[V; 4]>;

/// A constraint defined by an explicit table of joint values to utility.
///
/// Rows not present in the table score `default` (zero unless configured
/// otherwise).
pub struct TableConstraint<V, U>
where
    V: ValueLabel,
{
    participants: SmallVec<[AgentIndex; 4]>,
    rows: FxHashMap<ValueKey<V>, U>,
    default: U,
}

impl<V, U> TableConstraint<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// Creates an empty table over the given participants.
    pub fn new<I>(participants: I) -> Self
    where
        I: IntoIterator<Item = AgentIndex>,
    {
        Self {
            participants: participants.into_iter().collect(),
            rows: FxHashMap::default(),
            default: U::zero(),
        }
    }

    /// Sets the utility scored by joint values not listed in the table.
    #[inline]
    pub fn with_default(mut self, default: U) -> Self {
        self.default = default;
        self
    }

    /// Adds a table row: one joint value per participant, in participant
    /// order, mapped to `utility`.
    ///
    /// # Panics
    ///
    /// Panics if the row length does not match the participant count.
    pub fn with_row<I>(mut self, values: I, utility: U) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        let key: ValueKey<V> = values.into_iter().collect();
        assert_eq!(
            key.len(),
            self.participants.len(),
            "table row length {} does not match participant count {}",
            key.len(),
            self.participants.len()
        );
        self.rows.insert(key, utility);
        self
    }
}

impl<V, U> ConstraintFunction<V, U> for TableConstraint<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    #[inline]
    fn participants(&self) -> &[AgentIndex] {
        &self.participants
    }

    fn utility(&self, view: &dyn AssignmentView<V>) -> U {
        let mut key: ValueKey<V> = SmallVec::with_capacity(self.participants.len());
        for &agent in self.participants.iter() {
            match view.value_of(agent) {
                Some(value) => key.push(value),
                None => {
                    debug_assert!(
                        false,
                        "called `TableConstraint::utility` with a view missing participant {}",
                        agent
                    );
                    return self.default;
                }
            }
        }
        self.rows.get(&key).copied().unwrap_or(self.default)
    }
}

impl<V, U> std::fmt::Debug for TableConstraint<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableConstraint")
            .field("participants", &self.participants)
            .field("rows", &self.rows.len())
            .finish()
    }
}

/// A constraint backed by an arbitrary pure function.
pub struct FnConstraint<V, U> {
    participants: SmallVec<[AgentIndex; 4]>,
    #[allow(clippy::type_complexity)]
    function: Box<dyn Fn(&dyn AssignmentView<V>) -> U + Send + Sync>,
}

impl<V, U> FnConstraint<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// Creates a constraint from a participant list and a pure function.
    ///
    /// The function must be deterministic and side-effect free; it is
    /// evaluated concurrently by all participating agents.
    pub fn new<I, F>(participants: I, function: F) -> Self
    where
        I: IntoIterator<Item = AgentIndex>,
        F: Fn(&dyn AssignmentView<V>) -> U + Send + Sync + 'static,
    {
        Self {
            participants: participants.into_iter().collect(),
            function: Box::new(function),
        }
    }
}

impl<V, U> ConstraintFunction<V, U> for FnConstraint<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    #[inline]
    fn participants(&self) -> &[AgentIndex] {
        &self.participants
    }

    #[inline]
    fn utility(&self, view: &dyn AssignmentView<V>) -> U {
        (self.function)(view)
    }
}

impl<V, U> std::fmt::Debug for FnConstraint<V, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnConstraint")
            .field("participants", &self.participants)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SliceView<'a>(&'a [(AgentIndex, i64)]);

    impl AssignmentView<i64> for SliceView<'_> {
        fn value_of(&self, agent: AgentIndex) -> Option<i64> {
            self.0.iter().find(|(a, _)| *a == agent).map(|(_, v)| *v)
        }
    }

    fn a(i: usize) -> AgentIndex {
        AgentIndex::new(i)
    }

    #[test]
    fn test_not_equal_scores_one_when_values_differ() {
        let c = NotEqual::<f64>::new(a(0), a(1));
        let differ = SliceView(&[(a(0), 0), (a(1), 1)]);
        let same = SliceView(&[(a(0), 2), (a(1), 2)]);
        assert_eq!(ConstraintFunction::<i64, f64>::utility(&c, &differ), 1.0);
        assert_eq!(ConstraintFunction::<i64, f64>::utility(&c, &same), 0.0);
        assert!(ConstraintFunction::<i64, f64>::is_satisfied(&c, &differ));
        assert!(!ConstraintFunction::<i64, f64>::is_satisfied(&c, &same));
    }

    #[test]
    fn test_table_constraint_rows_and_default() {
        let c = TableConstraint::<i64, f64>::new([a(0), a(1)])
            .with_default(0.25)
            .with_row([1, 2], 3.0);
        let hit = SliceView(&[(a(0), 1), (a(1), 2)]);
        let miss = SliceView(&[(a(0), 2), (a(1), 1)]);
        assert_eq!(c.utility(&hit), 3.0);
        assert_eq!(c.utility(&miss), 0.25);
    }

    #[test]
    #[should_panic(expected = "does not match participant count")]
    fn test_table_constraint_rejects_short_row() {
        let _ = TableConstraint::<i64, f64>::new([a(0), a(1)]).with_row([1], 1.0);
    }

    #[test]
    fn test_fn_constraint_sums_values() {
        let c = FnConstraint::<i64, f64>::new([a(0), a(1)], |view| {
            let x = view.value_of(a(0)).unwrap_or(0);
            let y = view.value_of(a(1)).unwrap_or(0);
            (x + y) as f64
        });
        let view = SliceView(&[(a(0), 2), (a(1), 3)]);
        assert_eq!(c.utility(&view), 5.0);
        assert_eq!(c.participants(), &[a(0), a(1)]);
    }
}
