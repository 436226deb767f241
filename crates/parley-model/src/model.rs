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

//! Validated DCOP problem instances.
//!
//! The `ModelBuilder` collects agent domains and shared constraints, then
//! `build` validates the wiring once and derives the per-agent incidence
//! and neighbor structure consumed by the engine. All configuration errors
//! surface here, before the first round: a constraint referencing an
//! unknown agent, a duplicated participant, an empty participant list, or
//! an empty domain all reject the model with a descriptive error. The
//! resulting `Model` is immutable and shared read-only across every agent
//! for the lifetime of a run.

use crate::constraint::ConstraintFunction;
use crate::domain::{Domain, ValueLabel};
use crate::index::AgentIndex;
use parley_core::num::UtilityNumeric;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// The error type for model construction.
#[derive(Debug)]
pub enum ModelBuildError {
    /// A constraint references an agent index outside the model.
    UnknownAgent {
        /// Position of the offending constraint in insertion order.
        constraint: usize,
        /// The out-of-range agent reference.
        agent: AgentIndex,
    },
    /// A constraint lists the same agent more than once.
    DuplicateParticipant {
        /// Position of the offending constraint in insertion order.
        constraint: usize,
        /// The duplicated agent.
        agent: AgentIndex,
    },
    /// A constraint declares no participants.
    NoParticipants {
        /// Position of the offending constraint in insertion order.
        constraint: usize,
    },
    /// An agent was registered with an empty value domain.
    EmptyDomain {
        /// The agent with no admissible values.
        agent: AgentIndex,
    },
}

impl std::fmt::Display for ModelBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelBuildError::UnknownAgent { constraint, agent } => write!(
                f,
                "constraint {} references unknown agent {}",
                constraint, agent
            ),
            ModelBuildError::DuplicateParticipant { constraint, agent } => write!(
                f,
                "constraint {} lists agent {} more than once",
                constraint, agent
            ),
            ModelBuildError::NoParticipants { constraint } => {
                write!(f, "constraint {} declares no participants", constraint)
            }
            ModelBuildError::EmptyDomain { agent } => {
                write!(f, "agent {} has an empty value domain", agent)
            }
        }
    }
}

impl std::error::Error for ModelBuildError {}

/// An immutable, validated DCOP instance.
///
/// Holds one domain per agent, the shared constraint set, and the derived
/// per-agent incidence and neighbor lists. Shared read-only by all agents;
/// constraint instances are reference-counted, never cloned.
#[derive(Debug)]
pub struct Model<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    domains: Vec<Domain<V>>,
    constraints: Vec<Arc<dyn ConstraintFunction<V, U>>>,
    /// Per agent: positions into `constraints` of the incident constraints.
    incident: Vec<Vec<usize>>,
    /// Per agent: the distinct other agents co-occurring in any incident
    /// constraint, in ascending index order.
    neighbors: Vec<Vec<AgentIndex>>,
}

impl<V, U> Model<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// Returns the number of agents in the model.
    #[inline]
    pub fn num_agents(&self) -> usize {
        self.domains.len()
    }

    /// Returns the number of constraints in the model.
    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Returns the value domain of `agent`.
    #[inline]
    pub fn domain(&self, agent: AgentIndex) -> &Domain<V> {
        &self.domains[agent.get()]
    }

    /// Returns all constraints in insertion order.
    #[inline]
    pub fn constraints(&self) -> &[Arc<dyn ConstraintFunction<V, U>>] {
        &self.constraints
    }

    /// Returns the constraint at `index`.
    #[inline]
    pub fn constraint(&self, index: usize) -> &Arc<dyn ConstraintFunction<V, U>> {
        &self.constraints[index]
    }

    /// Returns the positions of the constraints incident to `agent`.
    #[inline]
    pub fn incident_constraints(&self, agent: AgentIndex) -> &[usize] {
        &self.incident[agent.get()]
    }

    /// Returns the constraint-neighbors of `agent`, ascending, excluding
    /// the agent itself.
    #[inline]
    pub fn neighbors(&self, agent: AgentIndex) -> &[AgentIndex] {
        &self.neighbors[agent.get()]
    }

    /// Iterates over all agent indices.
    #[inline]
    pub fn agents(&self) -> impl Iterator<Item = AgentIndex> {
        (0..self.num_agents()).map(AgentIndex::new)
    }
}

impl<V, U> std::fmt::Display for Model<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model(agents: {}, constraints: {})",
            self.num_agents(),
            self.num_constraints()
        )
    }
}

/// Builder for `Model`.
///
/// Agents are registered with their domains, constraints with their
/// participant wiring; `build` performs all validation.
pub struct ModelBuilder<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    domains: Vec<Domain<V>>,
    constraints: Vec<Arc<dyn ConstraintFunction<V, U>>>,
}

impl<V, U> Default for ModelBuilder<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, U> ModelBuilder<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// Creates an empty builder.
    #[inline]
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Registers an agent with the given domain and returns its index.
    #[inline]
    pub fn add_agent(&mut self, domain: Domain<V>) -> AgentIndex {
        let index = AgentIndex::new(self.domains.len());
        self.domains.push(domain);
        index
    }

    /// Registers `count` agents sharing the same domain.
    pub fn add_agents(&mut self, count: usize, domain: &Domain<V>) -> Vec<AgentIndex> {
        (0..count).map(|_| self.add_agent(domain.clone())).collect()
    }

    /// Registers a constraint.
    #[inline]
    pub fn add_constraint<C>(&mut self, constraint: C) -> &mut Self
    where
        C: ConstraintFunction<V, U> + 'static,
    {
        self.constraints.push(Arc::new(constraint));
        self
    }

    /// Registers an already shared constraint.
    #[inline]
    pub fn add_shared_constraint(
        &mut self,
        constraint: Arc<dyn ConstraintFunction<V, U>>,
    ) -> &mut Self {
        self.constraints.push(constraint);
        self
    }

    /// Validates the wiring and builds the model.
    ///
    /// Rejects empty domains, constraints without participants, duplicated
    /// participants, and references to unregistered agents. On success the
    /// per-agent incidence and neighbor lists are derived here so the hot
    /// path never re-scans the constraint set.
    pub fn build(self) -> Result<Model<V, U>, ModelBuildError> {
        let num_agents = self.domains.len();

        for (index, domain) in self.domains.iter().enumerate() {
            if domain.is_empty() {
                return Err(ModelBuildError::EmptyDomain {
                    agent: AgentIndex::new(index),
                });
            }
        }

        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); num_agents];
        let mut neighbor_sets: Vec<FxHashSet<AgentIndex>> =
            vec![FxHashSet::default(); num_agents];

        for (position, constraint) in self.constraints.iter().enumerate() {
            let participants = constraint.participants();
            if participants.is_empty() {
                return Err(ModelBuildError::NoParticipants {
                    constraint: position,
                });
            }

            let mut seen: FxHashSet<AgentIndex> = FxHashSet::default();
            for &agent in participants {
                if agent.get() >= num_agents {
                    return Err(ModelBuildError::UnknownAgent {
                        constraint: position,
                        agent,
                    });
                }
                if !seen.insert(agent) {
                    return Err(ModelBuildError::DuplicateParticipant {
                        constraint: position,
                        agent,
                    });
                }
            }

            for &agent in participants {
                incident[agent.get()].push(position);
                for &other in participants {
                    if other != agent {
                        neighbor_sets[agent.get()].insert(other);
                    }
                }
            }
        }

        let neighbors = neighbor_sets
            .into_iter()
            .map(|set| {
                let mut list: Vec<AgentIndex> = set.into_iter().collect();
                list.sort_unstable();
                list
            })
            .collect();

        Ok(Model {
            domains: self.domains,
            constraints: self.constraints,
            incident,
            neighbors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::NotEqual;

    fn coloring_domain() -> Domain<i64> {
        Domain::new([0i64, 1, 2])
    }

    #[test]
    fn test_build_derives_incidence_and_neighbors() {
        let mut builder = ModelBuilder::<i64, f64>::new();
        let domain = coloring_domain();
        let agents = builder.add_agents(3, &domain);
        builder.add_constraint(NotEqual::new(agents[0], agents[1]));
        builder.add_constraint(NotEqual::new(agents[1], agents[2]));

        let model = builder.build().expect("model must build");
        assert_eq!(model.num_agents(), 3);
        assert_eq!(model.num_constraints(), 2);
        assert_eq!(model.incident_constraints(agents[0]), &[0]);
        assert_eq!(model.incident_constraints(agents[1]), &[0, 1]);
        assert_eq!(model.neighbors(agents[1]), &[agents[0], agents[2]]);
        assert_eq!(model.neighbors(agents[0]), &[agents[1]]);
    }

    #[test]
    fn test_build_rejects_unknown_agent() {
        let mut builder = ModelBuilder::<i64, f64>::new();
        let a = builder.add_agent(coloring_domain());
        builder.add_constraint(NotEqual::new(a, AgentIndex::new(5)));

        match builder.build() {
            Err(ModelBuildError::UnknownAgent { constraint, agent }) => {
                assert_eq!(constraint, 0);
                assert_eq!(agent, AgentIndex::new(5));
            }
            other => panic!("expected UnknownAgent, got {:?}", other.map(|m| m.to_string())),
        }
    }

    #[test]
    fn test_build_rejects_duplicate_participant() {
        let mut builder = ModelBuilder::<i64, f64>::new();
        let a = builder.add_agent(coloring_domain());
        builder.add_constraint(NotEqual::new(a, a));

        assert!(matches!(
            builder.build(),
            Err(ModelBuildError::DuplicateParticipant { constraint: 0, .. })
        ));
    }

    #[test]
    fn test_build_rejects_empty_domain() {
        let mut builder = ModelBuilder::<i64, f64>::new();
        builder.add_agent(Domain::new(std::iter::empty::<i64>()));

        assert!(matches!(
            builder.build(),
            Err(ModelBuildError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn test_error_display_is_descriptive() {
        let err = ModelBuildError::UnknownAgent {
            constraint: 3,
            agent: AgentIndex::new(9),
        };
        assert_eq!(
            format!("{}", err),
            "constraint 3 references unknown agent AgentIndex(9)"
        );
    }
}
