//! # Layout Data Store Properties
//!
//! Randomized allocate/free sequences checked against a simple model:
//! data round-trips, stale handles never validate, and growth preserves
//! every live slot's bytes.

use std::collections::HashMap;

use proptest::prelude::*;
use trellis_core::{ComponentDescriptor, LayoutDataStore, LayoutHandle, StoreConfig};

#[derive(Clone, Debug)]
enum Op {
    Allocate(u32, u64),
    Free(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<u32>(), any::<u64>()).prop_map(|(a, b)| Op::Allocate(a, b)),
        2 => any::<usize>().prop_map(Op::Free),
    ]
}

fn new_store(capacity: u32) -> LayoutDataStore {
    LayoutDataStore::new(
        &[ComponentDescriptor::of::<u32>(), ComponentDescriptor::of::<u64>()],
        // Small chunks so sequences cross chunk boundaries.
        StoreConfig::with_capacity(capacity).chunk_bytes(64),
    )
}

proptest! {
    #[test]
    fn live_data_round_trips(capacity in 0u32..8, ops in prop::collection::vec(op(), 1..200)) {
        let mut store = new_store(capacity);
        let mut live: Vec<(LayoutHandle, u32, u64)> = Vec::new();
        let mut dead: Vec<LayoutHandle> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(a, b) => {
                    let h = store.allocate_with((a, b)).unwrap();
                    prop_assert!(live.iter().all(|(other, _, _)| other.index() != h.index()));
                    live.push((h, a, b));
                }
                Op::Free(pick) if !live.is_empty() => {
                    let (h, _, _) = live.swap_remove(pick % live.len());
                    store.free(h).unwrap();
                    dead.push(h);
                }
                Op::Free(_) => {}
            }

            for (h, a, b) in &live {
                prop_assert!(store.exists(*h));
                prop_assert_eq!(*store.get::<u32>(*h, 0).unwrap(), *a);
                prop_assert_eq!(*store.get::<u64>(*h, 1).unwrap(), *b);
            }
            for h in &dead {
                prop_assert!(!store.exists(*h));
            }
        }
        prop_assert_eq!(store.len() as usize, live.len());
    }

    #[test]
    fn reuse_always_bumps_version(rounds in 1usize..50) {
        let mut store = new_store(1);
        let mut last_version: HashMap<u32, u32> = HashMap::new();

        for _ in 0..rounds {
            let h = store.allocate();
            if let Some(previous) = last_version.insert(h.index(), h.version()) {
                prop_assert!(h.version() > previous);
            }
            store.free(h).unwrap();
            prop_assert!(store.free(h).is_err());
        }
    }

    #[test]
    fn growth_preserves_live_bytes(capacity in 1u32..16, extra in 1u32..64) {
        let mut store = new_store(capacity);
        let seeded: Vec<_> = (0..capacity)
            .map(|i| store.allocate_with((i, u64::from(i) * 31)).unwrap())
            .collect();
        let snapshot: Vec<Vec<u8>> = seeded
            .iter()
            .map(|h| store.component_bytes(h.index(), 1).to_vec())
            .collect();

        for _ in 0..extra {
            let _ = store.allocate();
        }

        prop_assert!(store.capacity() >= capacity + extra);
        for (h, bytes) in seeded.iter().zip(&snapshot) {
            prop_assert_eq!(store.component_bytes(h.index(), 1), bytes.as_slice());
        }
    }
}
