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

//! # Parley Agent
//!
//! The vertex-centric core of the Parley DCOP solver: the per-agent state
//! machine that turns the latest neighbor values into a new candidate value
//! each round, under one of three pluggable decision-policy families.
//!
//! ## Modules
//!
//! - `agent`: `AgentState` — current value, neighbor-value map, scratch
//!   utility arena, per-agent RNG, and the `update` / `score_signal` /
//!   extraction entry points consumed by the scheduler.
//! - `policy`: The closed `DecisionPolicy` variant type with the three
//!   families: weighted regret monitoring with inertia (WRMI), the
//!   distributed stochastic algorithm variants A through E (DSA), and
//!   distributed simulated annealing (DSAN) with an injected exploration
//!   schedule.
//! - `termination`: Commutative, associative aggregates reduced over the
//!   agent population to decide global termination (utility gap and Nash
//!   equilibrium).
//!
//! Agents own their state exclusively. The scheduler writes the
//! neighbor-value map before each decision invocation and reads the signal
//! score afterwards; nothing in this crate locks or blocks.

pub mod agent;
pub mod policy;
pub mod termination;
