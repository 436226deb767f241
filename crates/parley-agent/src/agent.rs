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

//! Per-agent state and the scheduler-facing entry points.
//!
//! An `AgentState` owns everything one agent needs to act: its current
//! domain position, the latest value received from each constraint
//! neighbor, a reference-counted view of the shared model, its decision
//! policy, a private RNG stream, and a scratch arena holding the utility
//! of every domain value under the current neighbor configuration. The
//! arena is sized once at construction; the hot path allocates nothing.
//!
//! The ownership contract is strict: the scheduler writes the
//! neighbor-value map (`ingest`) before each decision invocation and never
//! touches anything else; the agent mutates only its own state inside
//! `update`. No two agents share mutable memory, so the core needs no
//! locks under either scheduling discipline. `update` always runs to
//! completion and the agent must tolerate never being invoked again once
//! the scheduler declares global termination.
//!
//! Randomness is a per-agent `ChaCha8Rng` stream derived from the run's
//! master seed and the agent index, keeping concurrently scheduled agents
//! decorrelated and runs reproducible.

use crate::policy::{DecisionInput, DecisionPolicy, PolicySpec, SignalInput};
use parley_core::num::UtilityNumeric;
use parley_model::constraint::AssignmentView;
use parley_model::domain::ValueLabel;
use parley_model::index::{AgentIndex, ValueIndex};
use parley_model::model::Model;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Derives an independent per-agent seed from the run's master seed.
///
/// SplitMix64 finalizer; adjacent agent indices land in unrelated parts of
/// the stream space.
#[inline]
pub fn agent_seed(master_seed: u64, agent: AgentIndex) -> u64 {
    let mut z = master_seed ^ (agent.get() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// The agent's view of an assignment: its own candidate value overrides
/// whatever the neighbor map holds for everyone else.
struct LocalView<'a, V> {
    agent: AgentIndex,
    own_value: V,
    neighbors: &'a FxHashMap<AgentIndex, V>,
}

impl<V> AssignmentView<V> for LocalView<'_, V>
where
    V: ValueLabel,
{
    #[inline]
    fn value_of(&self, agent: AgentIndex) -> Option<V> {
        if agent == self.agent {
            Some(self.own_value)
        } else {
            self.neighbors.get(&agent).copied()
        }
    }
}

/// Mutable per-agent record driven by the scheduler.
#[derive(Debug)]
pub struct AgentState<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    index: AgentIndex,
    model: Arc<Model<V, U>>,
    current: ValueIndex,
    neighbor_values: FxHashMap<AgentIndex, V>,
    policy: DecisionPolicy<U>,
    rng: ChaCha8Rng,
    /// Scratch arena: utility at each domain position, rewritten every
    /// update.
    utilities: Vec<U>,
    changed: bool,
    last_utility: U,
    last_satisfied: u64,
}

impl<V, U> AgentState<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// Builds the agent with a uniformly random initial value from its
    /// domain.
    pub fn build(
        model: Arc<Model<V, U>>,
        index: AgentIndex,
        spec: &PolicySpec<U>,
        master_seed: u64,
    ) -> Self {
        let domain_len = model.domain(index).len();
        let mut rng = ChaCha8Rng::seed_from_u64(agent_seed(master_seed, index));
        let current = ValueIndex::new(rng.random_range(0..domain_len));
        let policy = DecisionPolicy::from_spec(spec, domain_len);
        let neighbor_count = model.neighbors(index).len();

        Self {
            index,
            model,
            current,
            neighbor_values: FxHashMap::with_capacity_and_hasher(
                neighbor_count,
                Default::default(),
            ),
            policy,
            rng,
            utilities: vec![U::zero(); domain_len],
            changed: false,
            last_utility: U::zero(),
            last_satisfied: 0,
        }
    }

    /// Returns the agent's index.
    #[inline]
    pub fn index(&self) -> AgentIndex {
        self.index
    }

    /// Returns the currently held domain position.
    #[inline]
    pub fn position(&self) -> ValueIndex {
        self.current
    }

    /// Returns the currently held value.
    #[inline]
    pub fn value(&self) -> V {
        self.model.domain(self.index).value(self.current)
    }

    /// Returns the policy driving this agent.
    #[inline]
    pub fn policy(&self) -> &DecisionPolicy<U> {
        &self.policy
    }

    /// Forces the held position, overriding the random initial value.
    ///
    /// Used by schedulers that replay a fixed initial assignment.
    #[inline]
    pub fn set_position(&mut self, position: ValueIndex) {
        debug_assert!(
            position.get() < self.model.domain(self.index).len(),
            "called `AgentState::set_position` with out-of-domain position {}",
            position
        );
        self.current = position;
    }

    /// Records the latest value received from `neighbor`.
    ///
    /// Written exclusively by the scheduler on message delivery, before
    /// the next `update`.
    #[inline]
    pub fn ingest(&mut self, neighbor: AgentIndex, value: V) {
        debug_assert!(
            self.model.neighbors(self.index).binary_search(&neighbor).is_ok(),
            "called `AgentState::ingest` with non-neighbor {}",
            neighbor
        );
        self.neighbor_values.insert(neighbor, value);
    }

    /// Total utility the agent would achieve at `position` under the
    /// current neighbor configuration.
    ///
    /// O(|incident constraints|), the most frequently invoked operation in
    /// the engine.
    pub fn compute_utility(&self, position: ValueIndex) -> U {
        let view = LocalView {
            agent: self.index,
            own_value: self.model.domain(self.index).value(position),
            neighbors: &self.neighbor_values,
        };
        let mut total = U::zero();
        for &constraint in self.model.incident_constraints(self.index) {
            total = total + self.model.constraint(constraint).utility(&view);
        }
        total
    }

    /// Number of incident constraints satisfied at `position` under the
    /// current neighbor configuration.
    pub fn satisfied_at(&self, position: ValueIndex) -> u64 {
        let view = LocalView {
            agent: self.index,
            own_value: self.model.domain(self.index).value(position),
            neighbors: &self.neighbor_values,
        };
        let mut satisfied = 0u64;
        for &constraint in self.model.incident_constraints(self.index) {
            if self.model.constraint(constraint).is_satisfied(&view) {
                satisfied += 1;
            }
        }
        satisfied
    }

    /// One decision-policy invocation. Returns the value to broadcast,
    /// which may equal the previous one.
    ///
    /// The scheduler must have refreshed the neighbor map for every
    /// neighbor before calling this.
    pub fn update(&mut self) -> V {
        let num_incident = self.model.incident_constraints(self.index).len() as u64;

        // Fill the scratch arena: utility at every domain position. Split
        // borrow keeps this allocation-free.
        {
            let Self {
                index,
                model,
                neighbor_values,
                utilities,
                ..
            } = self;
            for position in 0..utilities.len() {
                let view = LocalView {
                    agent: *index,
                    own_value: model.domain(*index).value(ValueIndex::new(position)),
                    neighbors: neighbor_values,
                };
                let mut total = U::zero();
                for &constraint in model.incident_constraints(*index) {
                    total = total + model.constraint(constraint).utility(&view);
                }
                utilities[position] = total;
            }
        }

        let all_satisfied = self.satisfied_at(self.current) == num_incident;
        let input = DecisionInput {
            utilities: &self.utilities,
            current: self.current,
            all_satisfied,
        };
        let chosen = self.policy.decide(&input, &mut self.rng);
        debug_assert!(
            chosen.get() < self.utilities.len(),
            "policy chose out-of-domain position {}",
            chosen
        );

        self.changed = chosen != self.current;
        self.current = chosen;
        self.last_utility = self.utilities[chosen.get()];
        self.last_satisfied = self.satisfied_at(chosen);
        self.value()
    }

    /// Activity score after the last update: `1.0` to keep broadcasting,
    /// `0.0` to suppress.
    pub fn score_signal(&self) -> f64 {
        let num_incident = self.model.incident_constraints(self.index).len() as u64;
        self.policy.score_signal(&SignalInput {
            changed: self.changed,
            all_satisfied: self.last_satisfied == num_incident,
            utility: self.last_utility,
            num_incident: num_incident as usize,
        })
    }

    /// Whether the last update adopted a different value.
    #[inline]
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Utility achieved at the held value during the last update.
    #[inline]
    pub fn utility(&self) -> U {
        self.last_utility
    }

    /// Incident constraints satisfied at the held value during the last
    /// update.
    #[inline]
    pub fn satisfied_constraints(&self) -> u64 {
        self.last_satisfied
    }

    /// Number of incident constraints.
    #[inline]
    pub fn num_incident_constraints(&self) -> u64 {
        self.model.incident_constraints(self.index).len() as u64
    }

    /// The agent's Nash flag: `true` when no strictly better unilateral
    /// value existed at the end of the last update.
    #[inline]
    pub fn nash_flag(&self) -> bool {
        !self.policy.exists_better()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DsaVariant;
    use parley_model::constraint::NotEqual;
    use parley_model::domain::Domain;
    use parley_model::model::ModelBuilder;

    fn pair_model() -> Arc<Model<i64, f64>> {
        let mut builder = ModelBuilder::new();
        let domain = Domain::new([0i64, 1]);
        let a = builder.add_agent(domain.clone());
        let b = builder.add_agent(domain);
        builder.add_constraint(NotEqual::new(a, b));
        Arc::new(builder.build().expect("pair model must build"))
    }

    #[test]
    fn test_build_initial_value_is_in_domain() {
        let model = pair_model();
        for seed in 0..32 {
            let agent = AgentState::build(
                Arc::clone(&model),
                AgentIndex::new(0),
                &PolicySpec::wrmi(),
                seed,
            );
            assert!(agent.position().get() < 2);
        }
    }

    #[test]
    fn test_build_is_deterministic_per_seed() {
        let model = pair_model();
        let a = AgentState::<i64, f64>::build(
            Arc::clone(&model),
            AgentIndex::new(0),
            &PolicySpec::wrmi(),
            42,
        );
        let b = AgentState::<i64, f64>::build(
            Arc::clone(&model),
            AgentIndex::new(0),
            &PolicySpec::wrmi(),
            42,
        );
        assert_eq!(a.position(), b.position());
    }

    #[test]
    fn test_seed_streams_differ_across_agents() {
        assert_ne!(
            agent_seed(42, AgentIndex::new(0)),
            agent_seed(42, AgentIndex::new(1))
        );
        assert_ne!(agent_seed(1, AgentIndex::new(5)), agent_seed(2, AgentIndex::new(5)));
    }

    #[test]
    fn test_compute_utility_and_satisfaction() {
        let model = pair_model();
        let mut agent = AgentState::build(
            Arc::clone(&model),
            AgentIndex::new(0),
            &PolicySpec::dsa(DsaVariant::A, 0.0),
            1,
        );
        agent.ingest(AgentIndex::new(1), 1);

        assert_eq!(agent.compute_utility(ValueIndex::new(0)), 1.0);
        assert_eq!(agent.compute_utility(ValueIndex::new(1)), 0.0);
        assert_eq!(agent.satisfied_at(ValueIndex::new(0)), 1);
        assert_eq!(agent.satisfied_at(ValueIndex::new(1)), 0);
    }

    #[test]
    fn test_update_moves_to_conflict_free_value() {
        let model = pair_model();
        let mut agent = AgentState::build(
            Arc::clone(&model),
            AgentIndex::new(0),
            &PolicySpec::dsa(DsaVariant::D, 0.0),
            3,
        );
        agent.set_position(ValueIndex::new(1));
        agent.ingest(AgentIndex::new(1), 1);

        let value = agent.update();
        assert_eq!(value, 0, "conflicting agent must switch to the free value");
        assert!(agent.changed());
        assert_eq!(agent.utility(), 1.0);
        assert_eq!(agent.satisfied_constraints(), 1);
        assert!(agent.nash_flag());
        assert_eq!(agent.score_signal(), 1.0, "a change always signals");
    }

    #[test]
    fn test_domain_closure_over_many_updates() {
        let model = pair_model();
        for spec in [
            PolicySpec::wrmi(),
            PolicySpec::dsa(DsaVariant::B, 0.2),
            PolicySpec::dsan(),
        ] {
            let mut agent =
                AgentState::build(Arc::clone(&model), AgentIndex::new(0), &spec, 9);
            for round in 0..100 {
                agent.ingest(AgentIndex::new(1), (round % 2) as i64);
                let value = agent.update();
                assert!(
                    value == 0 || value == 1,
                    "value {} escaped the domain under {}",
                    value,
                    agent.policy().name()
                );
            }
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-neighbor")]
    fn test_ingest_rejects_non_neighbor() {
        let mut builder = ModelBuilder::<i64, f64>::new();
        let domain = Domain::new([0i64, 1]);
        let a = builder.add_agent(domain.clone());
        let b = builder.add_agent(domain.clone());
        let _c = builder.add_agent(domain);
        builder.add_constraint(NotEqual::new(a, b));
        let model = Arc::new(builder.build().expect("model must build"));

        let mut agent = AgentState::build(model, a, &PolicySpec::<f64>::wrmi(), 0);
        agent.ingest(AgentIndex::new(2), 0);
    }
}
