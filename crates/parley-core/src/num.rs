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

//! # Utility Numeric Trait
//!
//! Unified numeric bounds for the Parley core. `UtilityNumeric` specifies
//! the floating-point capabilities required from the utility scalar used in
//! constraint evaluation, regret bookkeeping, and termination aggregation.
//!
//! ## Motivation
//!
//! Agent and solver code should stay generic over the utility scalar while
//! retaining predictable arithmetic semantics and cheap interop with the
//! random draws (uniform `f64` in `[0, 1)`) that drive the stochastic
//! decision policies. This trait collects the necessary bounds into a single
//! alias, simplifying generic signatures across the workspace.
//!
//! ## Highlights
//!
//! - Requires `num_traits::Float` for the numeric fundamentals.
//! - Enforces `From<f64> + Into<f64>` for interop with RNG draws and
//!   exploration schedules.
//! - `Send + Sync` for concurrent (free-running) execution.
//!
//! Note: `f32` is intentionally excluded by the `From<f64>` bound. Regret
//! fading and temperature schedules involve long chains of small updates
//! where single precision drifts noticeably.

use num_traits::Float;

/// A trait alias for the scalar type carrying constraint utilities.
///
/// In practice this is `f64`; the alias keeps the model, agent, and solver
/// crates generic without repeating the bound list everywhere.
pub trait UtilityNumeric:
    Float
    + From<f64>
    + Into<f64>
    + std::fmt::Debug
    + std::fmt::Display
    + Send
    + Sync
    + 'static
{
}

impl<T> UtilityNumeric for T where
    T: Float
        + From<f64>
        + Into<f64>
        + std::fmt::Debug
        + std::fmt::Display
        + Send
        + Sync
        + 'static
{
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_utility_numeric<T: UtilityNumeric>() {}

    #[test]
    fn test_f64_satisfies_bounds() {
        assert_utility_numeric::<f64>();
    }

    #[test]
    fn test_round_trip_through_f64() {
        let x: f64 = 1.5f64.into();
        let y: f64 = <f64 as Into<f64>>::into(x);
        assert_eq!(y, 1.5);
    }
}
