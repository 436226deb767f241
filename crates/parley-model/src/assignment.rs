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

//! Joint assignments reported by a run.
//!
//! `Assignment` captures the complete value vector at the end of a run
//! together with the objective actually achieved and the satisfied
//! constraint count, and can re-evaluate itself against a model for
//! verification.

use crate::constraint::AssignmentView;
use crate::domain::ValueLabel;
use crate::index::AgentIndex;
use crate::model::Model;
use parley_core::num::UtilityNumeric;

/// A complete joint assignment: one value per agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<V, U> {
    values: Vec<V>,
    utility: U,
    satisfied_constraints: u64,
    total_constraints: u64,
}

impl<V, U> Assignment<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// Creates an assignment from raw parts.
    #[inline]
    pub fn new(values: Vec<V>, utility: U, satisfied_constraints: u64, total_constraints: u64) -> Self {
        Self {
            values,
            utility,
            satisfied_constraints,
            total_constraints,
        }
    }

    /// Builds an assignment by evaluating `values` against `model`.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold exactly one value per model agent.
    pub fn evaluate(model: &Model<V, U>, values: Vec<V>) -> Self {
        assert_eq!(
            values.len(),
            model.num_agents(),
            "assignment holds {} values for {} agents",
            values.len(),
            model.num_agents()
        );

        let view = FullView(&values);
        let mut utility = U::zero();
        let mut satisfied = 0u64;
        for constraint in model.constraints() {
            utility = utility + constraint.utility(&view);
            if constraint.is_satisfied(&view) {
                satisfied += 1;
            }
        }

        Self {
            values,
            utility,
            satisfied_constraints: satisfied,
            total_constraints: model.num_constraints() as u64,
        }
    }

    /// Returns the value assigned to `agent`.
    #[inline]
    pub fn value(&self, agent: AgentIndex) -> V {
        self.values[agent.get()]
    }

    /// Returns the full value vector in agent order.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Returns the total utility achieved by this assignment.
    #[inline]
    pub fn utility(&self) -> U {
        self.utility
    }

    /// Returns the number of satisfied constraints.
    #[inline]
    pub fn satisfied_constraints(&self) -> u64 {
        self.satisfied_constraints
    }

    /// Returns the total number of constraints in the model.
    #[inline]
    pub fn total_constraints(&self) -> u64 {
        self.total_constraints
    }

    /// Returns `true` if every constraint is satisfied.
    #[inline]
    pub fn is_fully_satisfied(&self) -> bool {
        self.satisfied_constraints == self.total_constraints
    }
}

impl<V, U> std::fmt::Display for Assignment<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Assignment(utility: {}, satisfied: {}/{})",
            self.utility, self.satisfied_constraints, self.total_constraints
        )
    }
}

/// View over a complete value vector, indexed by agent.
struct FullView<'a, V>(&'a [V]);

impl<V> AssignmentView<V> for FullView<'_, V>
where
    V: ValueLabel,
{
    #[inline]
    fn value_of(&self, agent: AgentIndex) -> Option<V> {
        self.0.get(agent.get()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::NotEqual;
    use crate::domain::Domain;
    use crate::model::ModelBuilder;

    fn triangle() -> Model<i64, f64> {
        let mut builder = ModelBuilder::new();
        let domain = Domain::new([0i64, 1, 2]);
        let agents = builder.add_agents(3, &domain);
        builder.add_constraint(NotEqual::new(agents[0], agents[1]));
        builder.add_constraint(NotEqual::new(agents[1], agents[2]));
        builder.add_constraint(NotEqual::new(agents[2], agents[0]));
        builder.build().expect("triangle must build")
    }

    #[test]
    fn test_evaluate_proper_coloring() {
        let model = triangle();
        let assignment = Assignment::evaluate(&model, vec![0, 1, 2]);
        assert_eq!(assignment.utility(), 3.0);
        assert_eq!(assignment.satisfied_constraints(), 3);
        assert!(assignment.is_fully_satisfied());
    }

    #[test]
    fn test_evaluate_conflicting_assignment() {
        let model = triangle();
        let assignment = Assignment::evaluate(&model, vec![0, 0, 1]);
        assert_eq!(assignment.utility(), 2.0);
        assert_eq!(assignment.satisfied_constraints(), 2);
        assert!(!assignment.is_fully_satisfied());
    }

    #[test]
    #[should_panic(expected = "values for")]
    fn test_evaluate_rejects_wrong_arity() {
        let model = triangle();
        let _ = Assignment::evaluate(&model, vec![0, 1]);
    }
}
