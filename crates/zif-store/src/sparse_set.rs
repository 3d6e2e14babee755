//! Stable-index container with packed storage.
//!
//! A [`SparseSet`] keeps two tables:
//!
//! - `sparse`: [`SparseIndex`] -> [`DenseIndex`], one entry per handle ever
//!   handed out.
//! - `dense`: the packed [`DenseElement`]s. Only the first `len()` entries are
//!   live; the tail is scratch left behind by swap-removes and is reused by the
//!   next [`add`](SparseSet::add) before anything new is allocated.
//!
//! For every handle `s`, `dense[sparse[s]].sparse_index == s`. The two tables
//! are a bijection over the allocated slots, which is what lets a freed slot
//! carry its handle until it is reused.
//!
//! # Example
//!
//! ```
//! use zif_store::prelude::*;
//!
//! let mut set = SparseSet::new();
//! let a = set.add("a");
//! let b = set.add("b");
//!
//! assert!(set.remove(a));
//! assert!(!set.contains(a));
//! assert_eq!(set[b], "b");
//!
//! // The freed slot is reused, and so is its handle.
//! let c = set.add("c");
//! assert_eq!(c, a);
//! assert_eq!(set.len(), 2);
//! ```

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::index::{DenseIndex, SparseIndex};
use crate::StoreError;

// ---------------------------------------------------------------------------
// DenseElement
// ---------------------------------------------------------------------------

/// A value in packed storage together with the handle that owns its slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseElement<T> {
    sparse_index: SparseIndex,
    /// The stored value.
    pub value: T,
}

impl<T> DenseElement<T> {
    /// The handle that currently owns this slot.
    #[inline]
    pub fn sparse_index(&self) -> SparseIndex {
        self.sparse_index
    }
}

// ---------------------------------------------------------------------------
// SparseSet
// ---------------------------------------------------------------------------

/// Packed container addressed through stable [`SparseIndex`] handles.
///
/// `add`, `remove`, `contains` and lookups are O(1). Iteration walks the
/// packed prefix, so its order is unspecified and changes on removal.
#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    sparse: Vec<DenseIndex>,
    dense: Vec<DenseElement<T>>,
    count: usize,
    /// Scratch buffer for [`remove_all`](Self::remove_all).
    to_remove: Vec<SparseIndex>,
}

impl<T> SparseSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            count: 0,
            to_remove: Vec::new(),
        }
    }

    /// Create an empty set with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::with_capacity(capacity),
            dense: Vec::with_capacity(capacity),
            count: 0,
            to_remove: Vec::new(),
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the set holds no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots ever allocated (live plus reusable scratch).
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.dense.len()
    }

    /// Insert a value and return its handle.
    ///
    /// Reuses the slot at position `len()` if an earlier removal left one
    /// there, returning the handle that slot carries. Otherwise a new handle
    /// equal to the current number of slots is allocated.
    pub fn add(&mut self, value: T) -> SparseIndex {
        let dense_index = DenseIndex::new(self.count);
        self.count += 1;

        if let Some(element) = self.dense.get_mut(dense_index.slot()) {
            element.value = value;
            return element.sparse_index;
        }

        let sparse_index = SparseIndex::new(self.sparse.len());
        self.dense.push(DenseElement {
            sparse_index,
            value,
        });
        self.sparse.push(dense_index);
        sparse_index
    }

    /// Remove the element behind `index`.
    ///
    /// Returns `false` without touching the set if `index` is stale or out of
    /// range. Otherwise the element is swapped with the last live element and
    /// the live prefix shrinks by one. The vacated slot keeps `index` so the
    /// next `add` hands it out again. No other handle is invalidated.
    pub fn remove(&mut self, index: SparseIndex) -> bool {
        if !self.contains(index) {
            return false;
        }

        self.count -= 1;

        let removed = self.sparse[index.slot()];
        let end = DenseIndex::new(self.count);

        self.dense.swap(removed.slot(), end.slot());

        let moved_owner = self.dense[removed.slot()].sparse_index;
        self.sparse[moved_owner.slot()] = removed;
        self.sparse[index.slot()] = end;

        true
    }

    /// Whether `index` refers to a live element.
    pub fn contains(&self, index: SparseIndex) -> bool {
        let Some(&dense_index) = self.sparse.get(index.slot()) else {
            return false;
        };

        dense_index.slot() < self.count && self.dense[dense_index.slot()].sparse_index == index
    }

    /// Borrow the value behind `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StaleIndex`] if `index` is not live.
    pub fn get(&self, index: SparseIndex) -> Result<&T, StoreError> {
        if !self.contains(index) {
            return Err(StoreError::StaleIndex { index });
        }
        Ok(&self.dense[self.sparse[index.slot()].slot()].value)
    }

    /// Mutably borrow the value behind `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StaleIndex`] if `index` is not live.
    pub fn get_mut(&mut self, index: SparseIndex) -> Result<&mut T, StoreError> {
        if !self.contains(index) {
            return Err(StoreError::StaleIndex { index });
        }
        let slot = self.sparse[index.slot()].slot();
        Ok(&mut self.dense[slot].value)
    }

    /// Overwrite the value behind `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StaleIndex`] if `index` is not live.
    pub fn replace(&mut self, index: SparseIndex, value: T) -> Result<T, StoreError> {
        self.get_mut(index).map(|slot| std::mem::replace(slot, value))
    }

    /// The live prefix of the packed storage.
    #[inline]
    pub fn as_slice(&self) -> &[DenseElement<T>] {
        &self.dense[..self.count]
    }

    /// Iterate over live `(handle, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (SparseIndex, &T)> + '_ {
        self.as_slice()
            .iter()
            .map(|element| (element.sparse_index, &element.value))
    }

    /// Iterate mutably over live values.
    ///
    /// Values may be changed in place. The borrow covers the whole set, so no
    /// element can be added or removed until the iterator is dropped.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SparseIndex, &mut T)> + '_ {
        self.dense[..self.count]
            .iter_mut()
            .map(|element| (element.sparse_index, &mut element.value))
    }

    /// Remove every live element matching `predicate`. Returns how many were
    /// removed.
    ///
    /// Matching handles are collected in one pass before anything is removed,
    /// since each swap-remove reorders the live prefix.
    pub fn remove_all(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let mut to_remove = std::mem::take(&mut self.to_remove);
        to_remove.clear();

        to_remove.extend(
            self.as_slice()
                .iter()
                .filter(|element| predicate(&element.value))
                .map(|element| element.sparse_index),
        );

        let removed = to_remove.iter().filter(|&&index| self.remove(index)).count();

        if removed > 0 {
            trace!(removed, remaining = self.count, "sparse set sweep");
        }

        self.to_remove = to_remove;
        removed
    }

    /// Remove every element and release all slots.
    pub fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.count = 0;
        self.to_remove.clear();
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<SparseIndex> for SparseSet<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index` is stale or out of range.
    fn index(&self, index: SparseIndex) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> IndexMut<SparseIndex> for SparseSet<T> {
    /// # Panics
    ///
    /// Panics if `index` is stale or out of range.
    fn index_mut(&mut self, index: SparseIndex) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<'a, T> IntoIterator for &'a SparseSet<T> {
    type Item = &'a DenseElement<T>;
    type IntoIter = std::slice::Iter<'a, DenseElement<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T> FromIterator<T> for SparseSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = SparseSet::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
