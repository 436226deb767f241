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

//! # High-Level Solver Facade
//!
//! A configured front door over the two scheduling substrates. Callers pick
//! an execution mode, set budgets and the optimality tolerance through the
//! builder, and hand in a model together with a decision-policy
//! specification; the facade assembles the monitor stack (synchronous) or
//! the coordinator configuration (asynchronous) and returns a unified
//! `SolveOutcome`.
//!
//! ## Highlights
//!
//! - Builder pattern: `DcopSolverBuilder` to configure mode, budgets,
//!   polling cadence, tolerance, master seed, and optional progress logging.
//! - Synchronous runs are deterministic for a fixed model, policy, and
//!   master seed; asynchronous runs are not.
//! - The round limit applies to synchronous runs, the update limit to
//!   asynchronous runs; both may be left unset for convergence-only
//!   termination.

use crate::freerun::{FreeRunConfig, FreeRunEngine};
use crate::monitor::composite::CompositeMonitor;
use crate::monitor::convergence::ConvergenceMonitor;
use crate::monitor::log::LogMonitor;
use crate::monitor::round_limit::RoundLimitMonitor;
use crate::monitor::time_limit::TimeLimitMonitor;
use crate::result::SolveOutcome;
use crate::sweep::{SweepEngine, DEFAULT_POLL_INTERVAL};
use parley_agent::policy::PolicySpec;
use parley_agent::termination::DEFAULT_OPTIMALITY_EPS;
use parley_core::num::UtilityNumeric;
use parley_model::domain::ValueLabel;
use parley_model::index::ValueIndex;
use parley_model::model::Model;
use std::sync::Arc;
use std::time::Duration;

/// How the population is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    /// Lockstep rounds with a barrier between them. Deterministic.
    #[default]
    Synchronous,
    /// One free-running thread per agent. Not reproducible.
    Asynchronous,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Synchronous => write!(f, "Synchronous"),
            ExecutionMode::Asynchronous => write!(f, "Asynchronous"),
        }
    }
}

pub struct DcopSolver {
    mode: ExecutionMode,
    round_limit: Option<u64>,
    update_limit: Option<u64>,
    time_limit: Option<Duration>,
    sync_poll_interval: u64,
    async_poll_interval: Duration,
    optimality_eps: f64,
    master_seed: u64,
    log_interval: Option<Duration>,
    initial_positions: Option<Vec<ValueIndex>>,
}

impl DcopSolver {
    #[inline]
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    #[inline]
    pub fn round_limit(&self) -> Option<u64> {
        self.round_limit
    }

    #[inline]
    pub fn update_limit(&self) -> Option<u64> {
        self.update_limit
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[inline]
    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    #[inline]
    pub fn optimality_eps(&self) -> f64 {
        self.optimality_eps
    }

    /// Solves the model with the configured schedule and returns the
    /// outcome.
    pub fn solve<V, U>(
        &self,
        model: Arc<Model<V, U>>,
        spec: &PolicySpec<U>,
    ) -> SolveOutcome<V, U>
    where
        V: ValueLabel,
        U: UtilityNumeric,
    {
        match self.mode {
            ExecutionMode::Synchronous => self.solve_synchronous(model, spec),
            ExecutionMode::Asynchronous => self.solve_asynchronous(model, spec),
        }
    }

    fn solve_synchronous<V, U>(
        &self,
        model: Arc<Model<V, U>>,
        spec: &PolicySpec<U>,
    ) -> SolveOutcome<V, U>
    where
        V: ValueLabel,
        U: UtilityNumeric,
    {
        let mut engine = SweepEngine::with_poll_interval(
            model,
            spec,
            self.master_seed,
            self.sync_poll_interval,
        );
        if let Some(positions) = &self.initial_positions {
            engine.force_positions(positions);
        }

        let mut monitor = CompositeMonitor::<U>::new();
        monitor.add_monitor(ConvergenceMonitor::new(<U as From<f64>>::from(self.optimality_eps)));
        if let Some(limit) = self.round_limit {
            monitor.add_monitor(RoundLimitMonitor::new(limit));
        }
        if let Some(limit) = self.time_limit {
            monitor.add_monitor(TimeLimitMonitor::new(limit));
        }
        if let Some(interval) = self.log_interval {
            monitor.add_monitor(LogMonitor::new(interval));
        }

        engine.run(&mut monitor)
    }

    fn solve_asynchronous<V, U>(
        &self,
        model: Arc<Model<V, U>>,
        spec: &PolicySpec<U>,
    ) -> SolveOutcome<V, U>
    where
        V: ValueLabel,
        U: UtilityNumeric,
    {
        let config = FreeRunConfig {
            update_limit: self.update_limit,
            time_limit: self.time_limit,
            poll_interval: self.async_poll_interval,
            optimality_eps: <U as From<f64>>::from(self.optimality_eps),
            initial_positions: self.initial_positions.clone(),
        };
        FreeRunEngine::run(model, spec, self.master_seed, &config)
    }
}

pub struct DcopSolverBuilder {
    mode: ExecutionMode,
    round_limit: Option<u64>,
    update_limit: Option<u64>,
    time_limit: Option<Duration>,
    sync_poll_interval: u64,
    async_poll_interval: Duration,
    optimality_eps: f64,
    master_seed: u64,
    log_interval: Option<Duration>,
    initial_positions: Option<Vec<ValueIndex>>,
}

impl Default for DcopSolverBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DcopSolverBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            mode: ExecutionMode::Synchronous,
            round_limit: None,
            update_limit: None,
            time_limit: None,
            sync_poll_interval: DEFAULT_POLL_INTERVAL,
            async_poll_interval: Duration::from_millis(1),
            optimality_eps: DEFAULT_OPTIMALITY_EPS,
            master_seed: 0,
            log_interval: None,
            initial_positions: None,
        }
    }

    #[inline]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn with_round_limit(mut self, limit: u64) -> Self {
        self.round_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_update_limit(mut self, limit: u64) -> Self {
        self.update_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Cadence of the aggregate poll in rounds (synchronous mode).
    ///
    /// # Panics
    ///
    /// The engine panics at solve time if `interval` is zero.
    #[inline]
    pub fn with_sync_poll_interval(mut self, interval: u64) -> Self {
        self.sync_poll_interval = interval;
        self
    }

    /// Cadence of the coordinator poll (asynchronous mode).
    #[inline]
    pub fn with_async_poll_interval(mut self, interval: Duration) -> Self {
        self.async_poll_interval = interval;
        self
    }

    #[inline]
    pub fn with_optimality_eps(mut self, eps: f64) -> Self {
        self.optimality_eps = eps;
        self
    }

    #[inline]
    pub fn with_master_seed(mut self, seed: u64) -> Self {
        self.master_seed = seed;
        self
    }

    /// Enables periodic console progress reporting (synchronous mode).
    #[inline]
    pub fn with_progress_log(mut self, interval: Duration) -> Self {
        self.log_interval = Some(interval);
        self
    }

    /// Overrides the seeded initial positions, for replaying a known
    /// configuration. Must hold one entry per agent.
    #[inline]
    pub fn with_initial_positions(mut self, positions: Vec<ValueIndex>) -> Self {
        self.initial_positions = Some(positions);
        self
    }

    #[inline]
    pub fn build(self) -> DcopSolver {
        DcopSolver {
            mode: self.mode,
            round_limit: self.round_limit,
            update_limit: self.update_limit,
            time_limit: self.time_limit,
            sync_poll_interval: self.sync_poll_interval,
            async_poll_interval: self.async_poll_interval,
            optimality_eps: self.optimality_eps,
            master_seed: self.master_seed,
            log_interval: self.log_interval,
            initial_positions: self.initial_positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::TerminationReason;
    use parley_agent::policy::dsa::DsaVariant;
    use parley_model::constraint::NotEqual;
    use parley_model::domain::Domain;
    use parley_model::model::ModelBuilder;

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
    fn test_builder_defaults() {
        let solver = DcopSolverBuilder::new().build();
        assert_eq!(solver.mode(), ExecutionMode::Synchronous);
        assert_eq!(solver.round_limit(), None);
        assert_eq!(solver.update_limit(), None);
        assert_eq!(solver.time_limit(), None);
        assert_eq!(solver.master_seed(), 0);
        assert_eq!(solver.optimality_eps(), DEFAULT_OPTIMALITY_EPS);
    }

    /// Two agents over a binary domain with one inequality constraint.
    fn two_agent_model() -> Arc<Model<u32, f64>> {
        let mut builder = ModelBuilder::new();
        let domain = Domain::new(vec![0u32, 1]);
        let agents = builder.add_agents(2, &domain);
        builder.add_constraint(NotEqual::new(agents[0], agents[1]));
        Arc::new(builder.build().expect("valid model"))
    }

    #[test]
    fn test_synchronous_solve_respects_round_limit() {
        // Both agents start equal and flip together at every barrier, so the
        // run never satisfies the constraint and never settles.
        let solver = DcopSolverBuilder::new()
            .with_round_limit(25)
            .with_initial_positions(vec![ValueIndex::new(0), ValueIndex::new(0)])
            .build();

        let spec = PolicySpec::dsa(DsaVariant::D, 0.0);
        let outcome = solver.solve(two_agent_model(), &spec);
        assert_eq!(*outcome.termination_reason(), TerminationReason::RoundLimit);
        assert_eq!(outcome.statistics().rounds, 25);
    }

    #[test]
    fn test_synchronous_solve_reaches_proper_coloring() {
        let spec = PolicySpec::dsa(DsaVariant::A, 0.5);

        let solved = (0..5u64).any(|seed| {
            let solver = DcopSolverBuilder::new()
                .with_round_limit(1000)
                .with_sync_poll_interval(1)
                .with_master_seed(seed)
                .build();
            let outcome = solver.solve(six_agent_model(), &spec);
            *outcome.termination_reason() == TerminationReason::GlobalOptimum
                && outcome.assignment().is_fully_satisfied()
        });
        assert!(solved);
    }

    #[test]
    fn test_asynchronous_solve_converges() {
        let solver = DcopSolverBuilder::new()
            .with_mode(ExecutionMode::Asynchronous)
            .with_time_limit(Duration::from_secs(30))
            .with_master_seed(9)
            .build();

        let spec = PolicySpec::dsa(DsaVariant::A, 0.5);
        let outcome = solver.solve(six_agent_model(), &spec);
        assert!(
            outcome.is_converged(),
            "expected convergence, got {}",
            outcome.termination_reason()
        );
    }
}
