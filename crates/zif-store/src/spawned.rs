//! Deferred-deletion wrapper for entities living in a sparse set.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// A value plus a deletion flag.
///
/// Update passes never remove entities while they iterate. They flag them
/// instead, and the owner sweeps everything flagged in one
/// [`remove_all`](crate::sparse_set::SparseSet::remove_all) afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spawned<T> {
    /// The wrapped entity.
    pub value: T,
    /// Set once the entity should be swept.
    pub flagged_for_deletion: bool,
}

impl<T> Spawned<T> {
    /// Wrap a freshly spawned value.
    pub fn new(value: T) -> Self {
        Self {
            value,
            flagged_for_deletion: false,
        }
    }

    /// Mark for removal at the next sweep.
    #[inline]
    pub fn flag_for_deletion(&mut self) {
        self.flagged_for_deletion = true;
    }

    #[inline]
    pub fn is_flagged_for_deletion(&self) -> bool {
        self.flagged_for_deletion
    }

    /// Unwrap the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> From<T> for Spawned<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> Deref for Spawned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Spawned<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}
