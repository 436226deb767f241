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

//! Synchronous round-barrier scheduling.
//!
//! The sweep engine moves the whole population in lockstep. Within a round
//! every active agent reads the values its neighbors published at the end of
//! the previous round, performs one decision step, and stages its own value
//! for the next round. No decision made within a round is visible to any
//! other agent in the same round, so the engine is deterministic for a fixed
//! model, policy, and master seed.
//!
//! Activity is driven by the convergence score: an agent that suppresses its
//! broadcast drops out of the active set and sleeps until one of its
//! neighbors (or the agent itself) signals again. When the active set drains
//! completely the population is quiescent and the run stops.

use crate::monitor::solve_monitor::{RoundObservation, SolveMonitor, SolverCommand};
use crate::result::{SolveOutcome, TerminationReason};
use crate::stats::SolveStatistics;
use fixedbitset::FixedBitSet;
use parley_agent::agent::AgentState;
use parley_agent::policy::PolicySpec;
use parley_agent::termination::{NashAggregate, UtilityAggregate};
use parley_core::num::UtilityNumeric;
use parley_model::assignment::Assignment;
use parley_model::domain::ValueLabel;
use parley_model::index::{AgentIndex, ValueIndex};
use parley_model::model::Model;
use std::sync::Arc;
use std::time::Instant;

/// Default cadence for assembling the global aggregates, in rounds.
pub const DEFAULT_POLL_INTERVAL: u64 = 8;

pub struct SweepEngine<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    model: Arc<Model<V, U>>,
    agents: Vec<AgentState<V, U>>,
    /// Values visible to neighbors, frozen at the last round barrier.
    published: Vec<V>,
    /// Values staged during the current round, promoted at the barrier.
    staged: Vec<V>,
    active: FixedBitSet,
    next_active: FixedBitSet,
    round: u64,
    poll_interval: u64,
    stats: SolveStatistics,
}

impl<V, U> SweepEngine<V, U>
where
    V: ValueLabel,
    U: UtilityNumeric,
{
    /// Creates an engine with every agent active and holding a seeded random
    /// initial value.
    pub fn new(model: Arc<Model<V, U>>, spec: &PolicySpec<U>, master_seed: u64) -> Self {
        Self::with_poll_interval(model, spec, master_seed, DEFAULT_POLL_INTERVAL)
    }

    /// Creates an engine that assembles the global aggregates every
    /// `poll_interval` rounds.
    ///
    /// # Panics
    ///
    /// Panics if `poll_interval` is zero.
    pub fn with_poll_interval(
        model: Arc<Model<V, U>>,
        spec: &PolicySpec<U>,
        master_seed: u64,
        poll_interval: u64,
    ) -> Self {
        assert!(poll_interval > 0, "poll interval must be positive");

        let num_agents = model.num_agents();
        let agents: Vec<AgentState<V, U>> = model
            .agents()
            .map(|index| AgentState::build(Arc::clone(&model), index, spec, master_seed))
            .collect();

        let published: Vec<V> = agents.iter().map(|agent| agent.value()).collect();
        let staged = published.clone();

        let mut active = FixedBitSet::with_capacity(num_agents);
        active.insert_range(..);

        Self {
            model,
            agents,
            published,
            staged,
            active,
            next_active: FixedBitSet::with_capacity(num_agents),
            round: 0,
            poll_interval,
            stats: SolveStatistics::default(),
        }
    }

    /// Overrides the initial positions, for replaying a known configuration.
    ///
    /// # Panics
    ///
    /// Panics if `positions` does not hold one entry per agent.
    pub fn force_positions(&mut self, positions: &[ValueIndex]) {
        assert_eq!(
            positions.len(),
            self.agents.len(),
            "expected {} positions, got {}",
            self.agents.len(),
            positions.len()
        );

        for (agent, &position) in self.agents.iter_mut().zip(positions) {
            agent.set_position(position);
        }
        for (slot, agent) in self.published.iter_mut().zip(&self.agents) {
            *slot = agent.value();
        }
        self.staged.copy_from_slice(&self.published);
    }

    /// Returns the values currently held by the agents.
    pub fn values(&self) -> Vec<V> {
        self.agents.iter().map(|agent| agent.value()).collect()
    }

    /// Returns the round counter.
    #[inline]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Returns the agent at `index`.
    #[inline]
    pub fn agent(&self, index: AgentIndex) -> &AgentState<V, U> {
        &self.agents[index.get()]
    }

    /// Folds every agent into the global utility aggregate.
    pub fn utility_aggregate(&self) -> UtilityAggregate<U> {
        self.agents
            .iter()
            .fold(UtilityAggregate::identity(), |acc, agent| {
                acc.combine(UtilityAggregate::from_agent(agent))
            })
    }

    /// Folds every agent into the global equilibrium aggregate.
    pub fn nash_aggregate(&self) -> NashAggregate {
        self.agents.iter().fold(NashAggregate::identity(), |acc, agent| {
            acc.combine(NashAggregate::from_agent(agent))
        })
    }

    /// Runs one full round and returns the observation for it.
    pub fn step(&mut self) -> RoundObservation<U> {
        let Self {
            model,
            agents,
            published,
            staged,
            active,
            next_active,
            stats,
            ..
        } = self;

        next_active.clear();

        for agent_index in active.ones() {
            let agent = &mut agents[agent_index];
            for &neighbor in model.neighbors(agent.index()) {
                agent.ingest(neighbor, published[neighbor.get()]);
            }
            agent.update();
            stats.on_update(agent.changed());

            if agent.score_signal() > 0.0 {
                staged[agent_index] = agent.value();
                next_active.insert(agent_index);
                for &neighbor in model.neighbors(agent.index()) {
                    next_active.insert(neighbor.get());
                }
            } else {
                stats.on_suppressed_broadcast();
            }
        }

        // Round barrier: promote staged values and rotate the active sets.
        published.copy_from_slice(staged);
        std::mem::swap(active, next_active);
        stats.on_round();
        self.round += 1;

        let active_agents = self.active.count_ones(..);
        let aggregates = if self.round % self.poll_interval == 0 || active_agents == 0 {
            self.stats.on_aggregator_poll();
            Some((self.utility_aggregate(), self.nash_aggregate()))
        } else {
            None
        };

        RoundObservation {
            round: self.round,
            active_agents,
            aggregates,
        }
    }

    /// Runs rounds until a monitor terminates the solve or the population
    /// goes quiescent, and returns the outcome.
    pub fn run<M>(&mut self, monitor: &mut M) -> SolveOutcome<V, U>
    where
        M: SolveMonitor<U>,
    {
        let start_time = Instant::now();
        monitor.on_enter_solve(self.model.num_agents());

        let reason = loop {
            let observation = self.step();
            monitor.on_round(&observation);

            if let SolverCommand::Terminate(reason) = monitor.search_command() {
                break reason;
            }
            if observation.active_agents == 0 {
                break TerminationReason::Quiescence;
            }
        };

        monitor.on_exit_solve();
        self.stats.set_total_time(start_time.elapsed());

        let assignment = Assignment::evaluate(&self.model, self.values());
        SolveOutcome::new(reason, assignment, self.stats.clone())
    }
}
