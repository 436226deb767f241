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

//! # Parley Model
//!
//! Immutable problem description for the Parley DCOP solver. A problem is a
//! set of agents, each owning one variable over a finite ordered domain, and
//! a set of shared utility constraints over those variables. The model is
//! validated once at construction time and then read concurrently by every
//! agent during the run.
//!
//! ## Modules
//!
//! - `index`: Typed `AgentIndex` and `ValueIndex` spaces.
//! - `domain`: Finite ordered value domains with O(1) position lookup.
//! - `constraint`: The `ConstraintFunction` trait and stock constraints.
//! - `model`: `Model` + `ModelBuilder` with construction-time validation.
//! - `assignment`: The final joint assignment reported by a run.

pub mod assignment;
pub mod constraint;
pub mod domain;
pub mod index;
pub mod model;
