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

//! Asynchronous free-running scheduling.
//!
//! Every agent runs on its own thread, reading whatever its neighbors last
//! published to the shared ledger and publishing its own decisions as fast
//! as it makes them. There are no barriers and no ordering guarantees:
//! agents see arbitrarily stale views and the run is not reproducible even
//! for a fixed master seed.
//!
//! A coordinator thread polls the ledger on a fixed cadence and stops the
//! population once a budget is exhausted or a global convergence test
//! holds. Budgets are checked before the convergence tests, and because the
//! per-agent flags are read mid-flight the convergence verdicts are
//! approximate: the reported aggregates may mix states from different
//! moments. The returned assignment is re-evaluated against the model after
//! every thread has stopped, so its utility and satisfaction counts are
//! exact even when the termination verdict was stale.

use crate::result::{SolveOutcome, TerminationReason};
use crate::shared::{AgentCell, SharedLedger};
use crate::stats::SolveStatistics;
use parley_agent::agent::AgentState;
use parley_agent::policy::PolicySpec;
use parley_agent::termination::DEFAULT_OPTIMALITY_EPS;
use parley_core::num::UtilityNumeric;
use parley_model::assignment::Assignment;
use parley_model::domain::ValueLabel;
use parley_model::index::ValueIndex;
use parley_model::model::Model;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Budgets and cadence for a free-running solve.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeRunConfig<U>
where
    U: UtilityNumeric,
{
    /// Total decision-step budget across all agents.
    pub update_limit: Option<u64>,

    /// Wall-clock budget.
    pub time_limit: Option<Duration>,

    /// How long the coordinator sleeps between ledger polls.
    pub poll_interval: Duration,

    /// Tolerance for the global optimality test.
    pub optimality_eps: U,

    /// Overrides the seeded initial positions, for replaying a known
    /// configuration. Must hold one entry per agent when set.
    pub initial_positions: Option<Vec<ValueIndex>>,
}

impl<U> Default for FreeRunConfig<U>
where
    U: UtilityNumeric,
{
    fn default() -> Self {
        Self {
            update_limit: None,
            time_limit: None,
            poll_interval: Duration::from_millis(1),
            optimality_eps: <U as From<f64>>::from(DEFAULT_OPTIMALITY_EPS),
            initial_positions: None,
        }
    }
}

pub struct FreeRunEngine;

impl FreeRunEngine {
    /// Runs the population until the coordinator stops it.
    pub fn run<V, U>(
        model: Arc<Model<V, U>>,
        spec: &PolicySpec<U>,
        master_seed: u64,
        config: &FreeRunConfig<U>,
    ) -> SolveOutcome<V, U>
    where
        V: ValueLabel,
        U: UtilityNumeric,
    {
        let start_time = Instant::now();
        let mut stats = SolveStatistics::default();

        let mut agents: Vec<AgentState<V, U>> = model
            .agents()
            .map(|index| AgentState::build(Arc::clone(&model), index, spec, master_seed))
            .collect();

        if let Some(positions) = &config.initial_positions {
            assert_eq!(
                positions.len(),
                agents.len(),
                "expected {} positions, got {}",
                agents.len(),
                positions.len()
            );
            for (agent, &position) in agents.iter_mut().zip(positions) {
                agent.set_position(position);
            }
        }

        let ledger = SharedLedger::from_cells(
            agents
                .iter()
                .map(|agent| {
                    AgentCell::new(agent.position(), agent.num_incident_constraints())
                })
                .collect(),
        );
        let stop = AtomicBool::new(false);
        let total_updates = AtomicU64::new(0);

        let ledger_ref = &ledger;
        let stop_ref = &stop;
        let total_updates_ref = &total_updates;

        let (reason, final_agents) = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(agents.len());

            for mut agent in agents {
                let thread_model = Arc::clone(&model);
                let handle = scope.spawn(move || {
                    let own = agent.index().get();
                    let mut local = SolveStatistics::default();

                    while !stop_ref.load(Ordering::Acquire) {
                        for &neighbor in thread_model.neighbors(agent.index()) {
                            let position = ledger_ref.cell(neighbor.get()).position();
                            agent.ingest(neighbor, thread_model.domain(neighbor).value(position));
                        }
                        agent.update();
                        local.on_update(agent.changed());
                        total_updates_ref.fetch_add(1, Ordering::Relaxed);

                        let score = agent.score_signal();
                        ledger_ref.cell(own).publish(
                            agent.position(),
                            agent.utility().into(),
                            agent.satisfied_constraints(),
                            agent.nash_flag(),
                        );

                        // A suppressed agent backs off instead of spinning;
                        // it re-checks because its neighbors keep moving.
                        if score == 0.0 {
                            local.on_suppressed_broadcast();
                            std::thread::yield_now();
                        }
                    }

                    (agent, local)
                });
                handles.push(handle);
            }

            let reason = loop {
                std::thread::sleep(config.poll_interval);
                stats.on_round();
                stats.on_aggregator_poll();

                if let Some(limit) = config.time_limit {
                    if start_time.elapsed() >= limit {
                        break TerminationReason::TimeLimit;
                    }
                }
                if let Some(limit) = config.update_limit {
                    if total_updates_ref.load(Ordering::Relaxed) >= limit {
                        break TerminationReason::UpdateLimit;
                    }
                }

                let utility = ledger_ref.reduce_utility::<U>();
                let nash = ledger_ref.reduce_nash();
                if utility.is_globally_optimal(config.optimality_eps) {
                    break TerminationReason::GlobalOptimum;
                }
                if nash.is_equilibrium() {
                    break TerminationReason::NashEquilibrium;
                }
            };

            stop.store(true, Ordering::Release);

            let mut final_agents = Vec::with_capacity(handles.len());
            for handle in handles {
                let (agent, local) = handle.join().expect("agent thread panicked");
                stats.merge_agent_counters(&local);
                final_agents.push(agent);
            }

            (reason, final_agents)
        });

        stats.set_total_time(start_time.elapsed());

        let values: Vec<V> = final_agents.iter().map(|agent| agent.value()).collect();
        let assignment = Assignment::evaluate(&model, values);
        SolveOutcome::new(reason, assignment, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_agent::policy::dsa::DsaVariant;
    use parley_model::constraint::NotEqual;
    use parley_model::domain::Domain;
    use parley_model::model::ModelBuilder;

    /// Two agents over a single-value domain with an inequality constraint:
    /// unsatisfiable, and no agent ever has an alternative.
    fn frozen_model() -> Arc<Model<u32, f64>> {
        let mut builder = ModelBuilder::new();
        let domain = Domain::new(vec![0u32]);
        let agents = builder.add_agents(2, &domain);
        builder.add_constraint(NotEqual::new(agents[0], agents[1]));
        Arc::new(builder.build().expect("valid model"))
    }

    fn six_agent_model() -> Arc<Model<u32, f64>> {
        let mut builder = ModelBuilder::new();
        let domain = Domain::new(vec![0u32, 1, 2]);
        let a = builder.add_agents(6, &domain);
        let edges = [
            (0, 1),
            (0, 2),
            (2, 1),
            (2, 3),
            (4, 3),
            (4, 2),
            (4, 5),
            (5, 1),
        ];
        for (left, right) in edges {
            builder.add_constraint(NotEqual::new(a[left], a[right]));
        }
        Arc::new(builder.build().expect("valid model"))
    }

    #[test]
    fn test_update_limit_checked_before_convergence() {
        let config = FreeRunConfig {
            update_limit: Some(1),
            time_limit: Some(Duration::from_secs(10)),
            ..FreeRunConfig::default()
        };
        let spec = PolicySpec::dsa(DsaVariant::A, 0.5);
        let outcome = FreeRunEngine::run(frozen_model(), &spec, 11, &config);

        assert_eq!(*outcome.termination_reason(), TerminationReason::UpdateLimit);
        assert!(outcome.statistics().agent_updates >= 1);
    }

    #[test]
    fn test_nash_equilibrium_on_unsatisfiable_instance() {
        let config = FreeRunConfig {
            time_limit: Some(Duration::from_secs(10)),
            ..FreeRunConfig::default()
        };
        let spec = PolicySpec::dsa(DsaVariant::A, 0.5);
        let outcome = FreeRunEngine::run(frozen_model(), &spec, 11, &config);

        // Neither agent has an alternative value, so both flags settle true
        // while the single constraint stays violated.
        assert_eq!(
            *outcome.termination_reason(),
            TerminationReason::NashEquilibrium
        );
        assert!(!outcome.assignment().is_fully_satisfied());
    }

    #[test]
    fn test_six_agent_coloring_converges_asynchronously() {
        let config = FreeRunConfig {
            time_limit: Some(Duration::from_secs(30)),
            ..FreeRunConfig::default()
        };
        let spec = PolicySpec::dsa(DsaVariant::A, 0.5);
        let outcome = FreeRunEngine::run(six_agent_model(), &spec, 42, &config);

        assert!(
            outcome.is_converged(),
            "expected convergence, got {}",
            outcome.termination_reason()
        );
        assert_eq!(outcome.assignment().values().len(), 6);
        assert!(outcome.statistics().agent_updates > 0);
        assert!(outcome.statistics().aggregator_polls > 0);
    }
}
