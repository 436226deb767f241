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

//! Finite ordered value domains.
//!
//! Every agent owns exactly one variable over a `Domain<V>`: a finite,
//! ordered set of admissible values. The decision policies index their
//! scratch arrays (regrets, utilities) by domain position, so the domain
//! provides both directions of the mapping: position to value for message
//! emission and value to position for ingesting neighbor values. The
//! reverse map is interned once at construction so both lookups are O(1)
//! on the hot path.

use crate::index::ValueIndex;
use rustc_hash::FxHashMap;

/// Bounds on the value label type carried by domains and messages.
///
/// Labels travel in neighbor messages and index constraint tables, so they
/// must be cheap to copy, hashable, and printable in diagnostics.
pub trait ValueLabel:
    Copy + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
}

impl<V> ValueLabel for V where
    V: Copy + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
}

/// A finite, ordered set of admissible values for one variable.
///
/// Order is significant: tie-breaking in the DSA policies and the layout of
/// per-value scratch arrays both follow domain order.
#[derive(Debug, Clone)]
pub struct Domain<V> {
    values: Vec<V>,
    positions: FxHashMap<V, ValueIndex>,
}

impl<V> Domain<V>
where
    V: ValueLabel,
{
    /// Creates a domain from an ordered list of values.
    ///
    /// Duplicate values are collapsed onto their first occurrence; an empty
    /// list is accepted here and rejected by `ModelBuilder::build`.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        let mut seen = FxHashMap::default();
        let mut ordered = Vec::new();
        for value in values {
            if !seen.contains_key(&value) {
                seen.insert(value, ValueIndex::new(ordered.len()));
                ordered.push(value);
            }
        }
        Self {
            values: ordered,
            positions: seen,
        }
    }

    /// Returns the number of values in the domain.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the domain contains no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at the given domain position.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds. Positions originate from the
    /// domain itself, so an out-of-bounds position is a logic error.
    #[inline]
    pub fn value(&self, position: ValueIndex) -> V {
        self.values[position.get()]
    }

    /// Returns the position of `value` in the domain, if present.
    #[inline]
    pub fn position_of(&self, value: V) -> Option<ValueIndex> {
        self.positions.get(&value).copied()
    }

    /// Returns `true` if `value` is an element of the domain.
    #[inline]
    pub fn contains(&self, value: V) -> bool {
        self.positions.contains_key(&value)
    }

    /// Returns the values in domain order.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Iterates over `(position, value)` pairs in domain order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (ValueIndex, V)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (ValueIndex::new(i), v))
    }
}

impl<V> std::fmt::Display for Domain<V>
where
    V: ValueLabel,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Domain[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_and_positions() {
        let domain = Domain::new([2i64, 0, 1]);
        assert_eq!(domain.len(), 3);
        assert_eq!(domain.value(ValueIndex::new(0)), 2);
        assert_eq!(domain.position_of(1), Some(ValueIndex::new(2)));
        assert_eq!(domain.position_of(7), None);
    }

    #[test]
    fn test_duplicates_collapse_to_first_occurrence() {
        let domain = Domain::new([1i64, 1, 2]);
        assert_eq!(domain.len(), 2);
        assert_eq!(domain.values(), &[1, 2]);
        assert_eq!(domain.position_of(1), Some(ValueIndex::new(0)));
    }

    #[test]
    fn test_iter_yields_positions_in_order() {
        let domain = Domain::new([5i64, 9]);
        let pairs: Vec<_> = domain.iter().collect();
        assert_eq!(
            pairs,
            vec![(ValueIndex::new(0), 5), (ValueIndex::new(1), 9)]
        );
    }

    #[test]
    fn test_display() {
        let domain = Domain::new([0i64, 1, 2]);
        assert_eq!(format!("{}", domain), "Domain[0, 1, 2]");
    }
}
