//! Property tests for sparse set operations.
//!
//! These tests use `proptest` to generate random sequences of add/remove/sweep
//! operations and check the set against a plain model after every step.

use std::collections::BTreeMap;

use proptest::prelude::*;
use zif_store::prelude::*;

/// Operations we can perform on the set.
#[derive(Debug, Clone)]
enum SetOp {
    Add(i32),
    /// Remove the n-th handle we are tracking (modulo the tracked count).
    Remove(usize),
    /// Remove a handle that may or may not be live.
    RemoveRaw(u32),
    /// Sweep every value divisible by the divisor.
    RemoveAll(i32),
    /// Add 1 to every live value in place.
    Bump,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        4 => (-1_000i32..1_000).prop_map(SetOp::Add),
        3 => (0..100usize).prop_map(SetOp::Remove),
        1 => (0..64u32).prop_map(SetOp::RemoveRaw),
        1 => (2..7i32).prop_map(SetOp::RemoveAll),
        1 => Just(SetOp::Bump),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_match_model(ops in prop::collection::vec(set_op_strategy(), 1..80)) {
        let mut set: SparseSet<i32> = SparseSet::new();
        let mut model: BTreeMap<SparseIndex, i32> = BTreeMap::new();
        let mut adds = 0usize;
        let mut removes = 0usize;

        for op in ops {
            match op {
                SetOp::Add(v) => {
                    let h = set.add(v);
                    prop_assert!(!model.contains_key(&h), "handle {h:?} handed out while live");
                    model.insert(h, v);
                    adds += 1;
                }
                SetOp::Remove(n) => {
                    if !model.is_empty() {
                        let h = *model.keys().nth(n % model.len()).unwrap();
                        prop_assert!(set.remove(h));
                        model.remove(&h);
                        removes += 1;

                        prop_assert!(!set.contains(h));
                        prop_assert!(set.get(h).is_err());
                    }
                }
                SetOp::RemoveRaw(raw) => {
                    let h = SparseIndex::from_raw(raw);
                    let expected = model.remove(&h).is_some();
                    prop_assert_eq!(set.remove(h), expected);
                    if expected {
                        removes += 1;
                    }
                }
                SetOp::RemoveAll(div) => {
                    let doomed: Vec<SparseIndex> = model
                        .iter()
                        .filter(|(_, v)| **v % div == 0)
                        .map(|(h, _)| *h)
                        .collect();
                    let swept = set.remove_all(|v| *v % div == 0);
                    prop_assert_eq!(swept, doomed.len());
                    for h in doomed {
                        model.remove(&h);
                        prop_assert!(!set.contains(h));
                    }
                    removes += swept;
                }
                SetOp::Bump => {
                    for (_, v) in set.iter_mut() {
                        *v += 1;
                    }
                    for v in model.values_mut() {
                        *v += 1;
                    }
                }
            }

            // Invariant: len tracks adds minus successful removes.
            prop_assert_eq!(set.len(), adds - removes);
            prop_assert_eq!(set.iter().count(), set.len());

            // Invariant: every tracked handle still maps to its own value.
            for (h, v) in &model {
                prop_assert!(set.contains(*h));
                prop_assert_eq!(set.get(*h).ok(), Some(v));
            }

            // Invariant: iteration reports exactly the tracked handles.
            for (h, v) in set.iter() {
                prop_assert_eq!(model.get(&h), Some(v));
            }
        }
    }

    /// Removing any one live handle never changes another handle's value.
    #[test]
    fn remove_preserves_other_values(
        values in prop::collection::vec(any::<i64>(), 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut set = SparseSet::new();
        let handles: Vec<SparseIndex> = values.iter().map(|&v| set.add(v)).collect();
        let victim = pick.index(handles.len());

        prop_assert!(set.remove(handles[victim]));

        for (i, &h) in handles.iter().enumerate() {
            if i == victim {
                prop_assert!(!set.contains(h));
            } else {
                prop_assert_eq!(set[h], values[i]);
            }
        }
    }

    /// Slots freed by removal are reused before the set grows.
    #[test]
    fn freed_slots_are_reused(count in 1usize..50, removed in 0usize..50) {
        let removed = removed.min(count);
        let mut set = SparseSet::new();
        let handles: Vec<SparseIndex> = (0..count).map(|i| set.add(i)).collect();
        for &h in handles.iter().take(removed) {
            set.remove(h);
        }
        for i in 0..removed {
            set.add(i + 1_000);
        }
        prop_assert_eq!(set.slot_count(), count);
        prop_assert_eq!(set.len(), count);
    }
}
