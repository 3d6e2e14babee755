//! Typed handles into a [`SparseSet`](crate::sparse_set::SparseSet).
//!
//! A [`SparseIndex`] is the stable, caller-facing handle. A [`DenseIndex`] is a
//! position in the packed backing storage and never leaves the crate. Both
//! wrap a `u32`; the newtypes exist so the two tables cannot be indexed with
//! the wrong kind of integer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SparseIndex
// ---------------------------------------------------------------------------

/// A stable handle to an element of a sparse set.
///
/// Valid until the element it refers to is removed. After removal the same
/// value may be handed out again by a later `add`, so holders must drop their
/// copy once they remove the element.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SparseIndex(u32);

impl SparseIndex {
    /// Construct a handle from its raw value.
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw `u32` representation.
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn new(slot: usize) -> Self {
        Self(u32::try_from(slot).expect("sparse set exceeded u32::MAX handles"))
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SparseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SparseIndex({})", self.0)
    }
}

impl fmt::Display for SparseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DenseIndex
// ---------------------------------------------------------------------------

/// A position in the packed storage of a sparse set.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct DenseIndex(u32);

impl DenseIndex {
    #[inline]
    pub(crate) fn new(position: usize) -> Self {
        let raw = u32::try_from(position).expect("sparse set exceeded u32::MAX slots");
        Self(raw)
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DenseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DenseIndex({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_index_roundtrip() {
        let idx = SparseIndex::from_raw(42);
        assert_eq!(idx.to_raw(), 42);
        assert_eq!(idx.slot(), 42);
        assert_eq!(SparseIndex::from_raw(idx.to_raw()), idx);
    }

    #[test]
    fn formatting() {
        let idx = SparseIndex::from_raw(7);
        assert_eq!(format!("{idx:?}"), "SparseIndex(7)");
        assert_eq!(format!("{idx}"), "#7");
        assert_eq!(format!("{:?}", DenseIndex::new(3)), "DenseIndex(3)");
    }

    #[test]
    fn dense_index_slot() {
        assert_eq!(DenseIndex::new(0).slot(), 0);
        assert_eq!(DenseIndex::new(1_000).slot(), 1_000);
    }
}
