//! # Layout Data Store Scenarios
//!
//! End-to-end lifecycle checks against the public API:
//!
//! 1. **Growth**: exhausting the free list grows capacity by 1.5x
//! 2. **Reuse**: a freed slot comes back with a higher version
//! 3. **Shrink**: trailing slots disappear, leading data is untouched
//! 4. **Stability**: chunk bodies do not move while the store grows

use trellis_core::{
    ComponentDescriptor, LayoutDataStore, LayoutHandle, StoreConfig, StoreError,
};

fn sized_store(sizes: &[usize], capacity: u32) -> LayoutDataStore {
    let descriptors: Vec<_> = sizes
        .iter()
        .map(|&size| ComponentDescriptor::raw("raw", size))
        .collect();
    LayoutDataStore::new(&descriptors, StoreConfig::with_capacity(capacity).label("scenario"))
}

#[test]
fn test_grow_free_and_reuse() {
    let mut store = sized_store(&[4, 16], 4);

    let h: Vec<LayoutHandle> = (0..4).map(|_| store.allocate()).collect();
    for (i, handle) in h.iter().enumerate() {
        assert_eq!(handle.index() as usize, i);
        assert_eq!(handle.version(), 1);
    }
    assert_eq!(store.capacity(), 4);

    let fifth = store.allocate();
    assert_eq!(fifth.index(), 4);
    assert_eq!(store.capacity(), 6);

    store.free(h[1]).unwrap();
    assert!(!store.exists(h[1]));

    let again = store.allocate();
    assert_eq!(again.index(), 1);
    assert_eq!(again.version(), 2);
    assert_ne!(again, h[1]);
}

#[test]
fn test_shrink_after_freeing_grown_slots() {
    let mut store = sized_store(&[4, 16], 4);
    let h: Vec<LayoutHandle> = (0..6).map(|_| store.allocate()).collect();
    assert_eq!(store.capacity(), 6);

    for (i, handle) in h.iter().take(4).enumerate() {
        store.write(handle.index(), 1, [i as u32; 4]);
    }

    store.free(h[4]).unwrap();
    store.free(h[5]).unwrap();
    store.resize_capacity(4).unwrap();

    assert_eq!(store.capacity(), 4);
    assert!(!store.exists(h[4]));
    assert!(!store.exists(h[5]));
    assert!(!store.exists(LayoutHandle::new(4, 2)));
    for (i, handle) in h.iter().take(4).enumerate() {
        assert!(store.exists(*handle));
        assert_eq!(*store.read::<[u32; 4]>(handle.index(), 1), [i as u32; 4]);
    }
}

#[test]
fn test_shrink_with_live_tail_is_refused() {
    let mut store = sized_store(&[4, 16], 4);
    let h: Vec<LayoutHandle> = (0..6).map(|_| store.allocate()).collect();
    store.free(h[4]).unwrap();

    let result = store.resize_capacity(4);
    assert_eq!(
        result,
        Err(StoreError::LiveSlotsBeyondCapacity {
            requested: 4,
            live: 1
        })
    );
    assert!(store.exists(h[5]));
    assert_eq!(store.capacity(), 6);
}

#[test]
fn test_chunk_bodies_stable_across_growth() {
    // 64-byte chunks with 16-byte elements: four slots per chunk.
    let config = StoreConfig::with_capacity(4).chunk_bytes(64);
    let mut store = LayoutDataStore::new(
        &[ComponentDescriptor::of::<[u32; 4]>()],
        config,
    );
    let first = store.allocate_with(([1u32, 2, 3, 4],)).unwrap();
    let before = store.component_bytes(first.index(), 0).as_ptr();

    for _ in 0..100 {
        let _ = store.allocate();
    }

    assert!(store.stats().chunk_count > 1);
    assert_eq!(store.component_bytes(first.index(), 0).as_ptr(), before);
    assert_eq!(*store.get::<[u32; 4]>(first, 0).unwrap(), [1, 2, 3, 4]);
}

#[test]
fn test_handles_as_component_payload() {
    let mut store = LayoutDataStore::new(
        &[
            ComponentDescriptor::of::<u32>().named("flags"),
            ComponentDescriptor::of::<LayoutHandle>().named("parent"),
        ],
        StoreConfig::with_capacity(2),
    );
    let root = store.allocate_with((0u32, LayoutHandle::INVALID)).unwrap();
    let child = store.allocate_with((0u32, root)).unwrap();

    let parent = *store.get::<LayoutHandle>(child, 1).unwrap();
    assert_eq!(parent, root);
    assert!(store.exists(parent));

    store.free(root).unwrap();
    assert!(!store.exists(*store.get::<LayoutHandle>(child, 1).unwrap()));
}

#[test]
fn test_config_from_toml_drives_store() {
    let config = StoreConfig::from_toml_str(
        r#"
        label = "toml-store"
        initial_capacity = 3
        chunk_bytes = 128
        "#,
    )
    .unwrap();
    let mut store = LayoutDataStore::new(&[ComponentDescriptor::raw("node", 8)], config);
    assert_eq!(store.config().label, "toml-store");
    assert_eq!(store.capacity(), 3);
    for _ in 0..4 {
        let _ = store.allocate();
    }
    assert_eq!(store.capacity(), 4);
    assert_eq!(store.stats().chunk_count, 1);
}
