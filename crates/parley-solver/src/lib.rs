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

//! # Parley Solver
//!
//! Scheduling and orchestration for the Parley DCOP solver. This crate
//! drives the agent population built by `parley-agent` over a model from
//! `parley-model` and decides when a run is over.
//!
//! ## Modules
//!
//! - `sweep`: Synchronous round-barrier engine with activity gating;
//!   deterministic for a fixed model, policy, and master seed.
//! - `freerun`: Asynchronous engine with one free-running thread per agent,
//!   a lock-free publication ledger, and a polling coordinator.
//! - `shared`: The per-agent publication cells and ledger reductions used
//!   by the asynchronous engine.
//! - `monitor`: The `SolveMonitor` stack for the synchronous loop:
//!   convergence, round limit, time limit, logging, composition.
//! - `solver`: The `DcopSolver` facade and builder over both engines.
//! - `result`, `stats`: Outcome transport and run accounting.
//!
//! Both engines terminate through the same two-level contract: agents gate
//! their broadcasts with a local convergence score, and the global verdict
//! comes from reducing the commutative aggregates in
//! `parley_agent::termination` over the whole population.

pub mod freerun;
pub mod monitor;
pub mod result;
pub mod shared;
pub mod solver;
pub mod stats;
pub mod sweep;
