//! ZIF Store -- stable-index entity storage for the Zero Insertion Force core.
//!
//! The central type is [`SparseSet`](sparse_set::SparseSet): a packed array of
//! values addressed through [`SparseIndex`](index::SparseIndex) handles that
//! stay valid while other elements are added and removed. Insert, remove and
//! lookup are O(1), and iteration touches only live elements in one
//! contiguous run.
//!
//! # Quick Start
//!
//! ```
//! use zif_store::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Bullet { x: f32 }
//!
//! let mut bullets: SparseSet<Spawned<Bullet>> = SparseSet::new();
//! let first = bullets.add(Bullet { x: 0.0 }.into());
//! bullets.add(Bullet { x: 200.0 }.into());
//!
//! for (_, bullet) in bullets.iter_mut() {
//!     if bullet.x > 100.0 {
//!         bullet.flag_for_deletion();
//!     }
//! }
//! bullets.remove_all(Spawned::is_flagged_for_deletion);
//!
//! assert_eq!(bullets.len(), 1);
//! assert_eq!(bullets[first].x, 0.0);
//! ```

#![deny(unsafe_code)]

pub mod index;
pub mod sparse_set;
pub mod spawned;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The handle does not refer to a live element.
    #[error("sparse index {index:?} is stale or out of range")]
    StaleIndex { index: index::SparseIndex },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::index::SparseIndex;
    pub use crate::sparse_set::{DenseElement, SparseSet};
    pub use crate::spawned::Spawned;
    pub use crate::StoreError;
}
