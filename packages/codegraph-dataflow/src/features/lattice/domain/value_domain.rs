//! Abstract value domain contract

use std::fmt::Debug;
use std::hash::Hash;

/// Partial order between two lattice elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatticeOrdering {
    Less,
    Equal,
    Greater,
    Incomparable,
}

impl LatticeOrdering {
    /// Combine pointwise results into the ordering of the whole
    pub fn then(self, other: LatticeOrdering) -> LatticeOrdering {
        use LatticeOrdering::*;
        match (self, other) {
            (Equal, x) | (x, Equal) => x,
            (Less, Less) => Less,
            (Greater, Greater) => Greater,
            _ => Incomparable,
        }
    }

    pub fn reverse(self) -> LatticeOrdering {
        match self {
            LatticeOrdering::Less => LatticeOrdering::Greater,
            LatticeOrdering::Greater => LatticeOrdering::Less,
            other => other,
        }
    }

    /// `Less` or `Equal`
    pub fn is_le(self) -> bool {
        matches!(self, LatticeOrdering::Less | LatticeOrdering::Equal)
    }
}

/// Value lattice of one analysis instance
///
/// `merge(a, b)` must be an upper bound of both arguments (the least one the
/// domain can represent) and monotonic. Termination of the fixpoint depends
/// on it; [`laws`](crate::features::lattice::laws) checks it on samples.
pub trait AbstractValueDomain: Send + Sync {
    type Value: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn bottom(&self) -> Self::Value;

    /// Top element
    fn unknown(&self) -> Self::Value;

    fn compare(&self, a: &Self::Value, b: &Self::Value) -> LatticeOrdering;

    fn merge(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;

    /// `None` for an empty input
    fn merge_all<'v, I>(&self, values: I) -> Option<Self::Value>
    where
        I: IntoIterator<Item = &'v Self::Value>,
        Self::Value: 'v,
    {
        let mut iter = values.into_iter();
        let first = iter.next()?.clone();
        Some(iter.fold(first, |acc, v| self.merge(&acc, v)))
    }
}
