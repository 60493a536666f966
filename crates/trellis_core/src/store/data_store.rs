//! # Layout Data Store
//!
//! A generational slot arena over N parallel chunked columns.
//!
//! ```text
//! index:        0      1      2      3
//! versions:   [ 1 ][ 2 ][ 1 ][ 1 ]
//! column 0:   [node][next=3][node][next=NONE]   <- free list threaded here
//! column 1:   [style][....][style][....]
//! column 2:   [cache][....][cache][....]
//!                    ▲
//!             next_free = 1
//! ```
//!
//! Every slot is either free or live. `allocate` pops the free-list head and
//! `free` bumps the slot's version and pushes it back, which invalidates every
//! outstanding handle to it at once.
//!
//! ## Trust boundary
//!
//! Handle-based accessors ([`get`](LayoutDataStore::get),
//! [`get_mut`](LayoutDataStore::get_mut), [`set`](LayoutDataStore::set)) check
//! the handle's generation and the component's type. Index-based accessors
//! ([`component_bytes`](LayoutDataStore::component_bytes),
//! [`read`](LayoutDataStore::read), [`write`](LayoutDataStore::write)) are the
//! hot path: they trust the caller to pass the index of a live slot and only
//! keep memory safety (panicking on an unaddressable index).

use bytemuck::Pod;

use super::component_set::ComponentSet;
use super::descriptor::ComponentDescriptor;
use super::handle::LayoutHandle;
use super::stats::StoreStats;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::memory::{ChunkedColumn, CHUNK_ALIGN};

/// Free-list terminator.
const NONE: u32 = u32::MAX;

/// Bytes of component 0 used as the free-list link of a free slot.
pub const LINK_BYTES: usize = std::mem::size_of::<u32>();

/// Chunked, componentized slot arena with versioned handles.
///
/// # Thread Safety
///
/// The store performs no locking. It is `Send`, and `&mut` access serializes
/// all mutation; use one store per layout thread.
///
/// # Example
///
/// ```
/// use trellis_core::{ComponentDescriptor, LayoutDataStore, StoreConfig};
///
/// let mut store = LayoutDataStore::new(
///     &[ComponentDescriptor::of::<u32>(), ComponentDescriptor::of::<[f32; 4]>()],
///     StoreConfig::with_capacity(4),
/// );
///
/// let h = store.allocate_with((7u32, [1.0f32, 2.0, 3.0, 4.0])).unwrap();
/// assert_eq!(*store.get::<u32>(h, 0).unwrap(), 7);
///
/// store.free(h).unwrap();
/// assert!(!store.exists(h));
/// ```
pub struct LayoutDataStore {
    /// Construction parameters, including the allocator tag.
    config: StoreConfig,
    /// One column per component, all at the same capacity.
    columns: Vec<ChunkedColumn>,
    /// Current version of every slot ever backed. Not truncated on shrink so
    /// that stale handles stay stale if the store regrows.
    versions: Vec<u32>,
    /// Slots currently backed by storage.
    capacity: u32,
    /// Head of the free list, or `NONE`.
    next_free: u32,
    /// Number of live slots.
    live: u32,
}

impl LayoutDataStore {
    /// Creates a store with one column per descriptor.
    ///
    /// # Panics
    ///
    /// Panics on any precondition [`try_new`](Self::try_new) reports: no
    /// components, component 0 smaller than 4 bytes, a zero-sized or
    /// over-sized component, or an invalid config.
    #[must_use]
    pub fn new(descriptors: &[ComponentDescriptor], config: StoreConfig) -> Self {
        Self::try_new(descriptors, config)
            .unwrap_or_else(|e| panic!("invalid layout data store: {e}"))
    }

    /// Creates a store, reporting precondition violations as errors.
    ///
    /// Every slot starts free at version 1, and the free list runs through the
    /// slots in ascending order.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NoComponents`] if `descriptors` is empty
    /// - [`StoreError::LinkComponentTooSmall`] if component 0 cannot hold the free-list link
    /// - [`StoreError::ZeroSizedComponent`] / [`StoreError::ComponentLargerThanChunk`]
    /// - [`StoreError::UnsupportedAlignment`] if a descriptor needs more than chunk alignment
    /// - [`StoreError::InvalidConfig`] if `config` fails validation
    pub fn try_new(descriptors: &[ComponentDescriptor], config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let first = descriptors.first().ok_or(StoreError::NoComponents)?;
        if first.size < LINK_BYTES {
            return Err(StoreError::LinkComponentTooSmall { size: first.size });
        }
        for (component, descriptor) in descriptors.iter().enumerate() {
            if descriptor.size == 0 {
                return Err(StoreError::ZeroSizedComponent { component });
            }
            if descriptor.align > CHUNK_ALIGN {
                return Err(StoreError::UnsupportedAlignment {
                    component,
                    align: descriptor.align,
                });
            }
            if descriptor.size > config.chunk_bytes {
                return Err(StoreError::ComponentLargerThanChunk {
                    component,
                    size: descriptor.size,
                    chunk_bytes: config.chunk_bytes,
                });
            }
        }

        let columns = descriptors
            .iter()
            .map(|d| ChunkedColumn::new(*d, config.chunk_bytes))
            .collect();
        let initial_capacity = config.initial_capacity;
        let mut store = Self {
            config,
            columns,
            versions: Vec::new(),
            capacity: 0,
            next_free: NONE,
            live: 0,
        };
        store.grow_to(initial_capacity);

        tracing::debug!(
            label = %store.config.label,
            components = store.columns.len(),
            capacity = store.capacity,
            "layout data store created"
        );
        Ok(store)
    }

    /// The configuration the store was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Slots currently backed by storage.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of live slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.live
    }

    /// Checks whether no slot is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of component columns.
    #[inline]
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.columns.len()
    }

    /// Descriptor of `component`.
    #[inline]
    #[must_use]
    pub fn descriptor(&self, component: usize) -> Option<&ComponentDescriptor> {
        self.columns.get(component).map(ChunkedColumn::descriptor)
    }

    /// Current occupancy figures.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            capacity: self.capacity,
            live: self.live,
            free: self.capacity - self.live,
            component_count: self.columns.len(),
            chunk_count: self.columns.iter().map(ChunkedColumn::chunk_count).sum(),
            reserved_bytes: self.columns.iter().map(ChunkedColumn::reserved_bytes).sum(),
        }
    }

    // =========================================================================
    // Slot lifecycle
    // =========================================================================

    /// Allocates a slot.
    ///
    /// Pops the free-list head. If the free list is empty, capacity first grows
    /// by the configured factor (1.5 by default). Component data of a reused
    /// slot is not cleared.
    pub fn allocate(&mut self) -> LayoutHandle {
        if self.next_free == NONE {
            let grown = self.config.grown_capacity(self.capacity);
            tracing::debug!(
                label = %self.config.label,
                from = self.capacity,
                to = grown,
                "layout data store growing"
            );
            self.grow_to(grown);
        }

        let index = self.next_free;
        self.next_free = self.link(index);
        self.live += 1;
        LayoutHandle::new(index, self.versions[index as usize])
    }

    /// Allocates a slot and writes `values` into components `0..N`.
    ///
    /// Every value is checked before the free list is touched, so an error
    /// leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentOutOfRange`], [`StoreError::SizeMismatch`]
    /// or [`StoreError::UnsupportedAlignment`] for the first offending value.
    pub fn allocate_with<S: ComponentSet>(&mut self, values: S) -> StoreResult<LayoutHandle> {
        S::validate(self)?;
        let handle = self.allocate();
        values.write(self, handle.index());
        Ok(handle)
    }

    /// Frees the slot `handle` refers to.
    ///
    /// Bumps the slot's version, which invalidates `handle` and every copy of
    /// it, and pushes the slot onto the free list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidHandle`] if `handle` is stale or out of
    /// range. Double frees are caught this way.
    pub fn free(&mut self, handle: LayoutHandle) -> StoreResult<()> {
        self.check_handle(handle)?;
        let index = handle.index();
        let version = &mut self.versions[index as usize];
        *version = next_version(*version);
        self.set_link(index, self.next_free);
        self.next_free = index;
        self.live -= 1;
        Ok(())
    }

    /// Checks whether `handle` refers to the current generation of a slot.
    ///
    /// This is the only validity gate in the store.
    #[inline]
    #[must_use]
    pub fn exists(&self, handle: LayoutHandle) -> bool {
        handle.index() < self.capacity && self.versions[handle.index() as usize] == handle.version()
    }

    /// Frees every slot at once.
    ///
    /// Every version is bumped, so all outstanding handles become stale, and
    /// the free list is rethreaded in ascending order. Storage is kept.
    pub fn clear(&mut self) {
        for version in &mut self.versions[..self.capacity as usize] {
            *version = next_version(*version);
        }
        self.next_free = NONE;
        for index in (0..self.capacity).rev() {
            self.set_link(index, self.next_free);
            self.next_free = index;
        }
        self.live = 0;
    }

    /// Grows or shrinks the store to exactly `capacity` slots.
    ///
    /// Shrinking frees trailing chunks in every column and drops the removed
    /// indices from the free list. Handles with an index at or past the new
    /// capacity stop existing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LiveSlotsBeyondCapacity`] if any slot at or past
    /// `capacity` is live; the store is unchanged in that case.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is `u32::MAX`.
    pub fn resize_capacity(&mut self, capacity: u32) -> StoreResult<()> {
        assert!(capacity < NONE, "capacity must be below u32::MAX");
        if capacity >= self.capacity {
            self.grow_to(capacity);
            return Ok(());
        }

        let dropped = self.capacity - capacity;
        let mut free_beyond = 0;
        let mut cursor = self.next_free;
        while cursor != NONE {
            if cursor >= capacity {
                free_beyond += 1;
            }
            cursor = self.link(cursor);
        }
        if free_beyond < dropped {
            let live = dropped - free_beyond;
            tracing::warn!(
                label = %self.config.label,
                requested = capacity,
                live,
                "layout data store shrink refused"
            );
            return Err(StoreError::LiveSlotsBeyondCapacity {
                requested: capacity,
                live,
            });
        }

        // Rebuild the free list without the dropped indices, keeping order.
        let mut head = NONE;
        let mut tail = NONE;
        let mut cursor = self.next_free;
        while cursor != NONE {
            let next = self.link(cursor);
            if cursor < capacity {
                if tail == NONE {
                    head = cursor;
                } else {
                    self.set_link(tail, cursor);
                }
                tail = cursor;
            }
            cursor = next;
        }
        if tail != NONE {
            self.set_link(tail, NONE);
        }
        self.next_free = head;

        for column in &mut self.columns {
            column.resize_capacity(capacity as usize);
        }
        tracing::debug!(
            label = %self.config.label,
            from = self.capacity,
            to = capacity,
            "layout data store shrank"
        );
        self.capacity = capacity;
        Ok(())
    }

    // =========================================================================
    // Checked access
    // =========================================================================

    /// Reads component `component` of a live slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidHandle`] for a stale handle, or the
    /// type errors of [`check_component`](Self::check_component).
    pub fn get<T: Pod>(&self, handle: LayoutHandle, component: usize) -> StoreResult<&T> {
        self.check_handle(handle)?;
        self.check_component::<T>(component)?;
        Ok(self.read(handle.index(), component))
    }

    /// Mutably borrows component `component` of a live slot.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get).
    pub fn get_mut<T: Pod>(&mut self, handle: LayoutHandle, component: usize) -> StoreResult<&mut T> {
        self.check_handle(handle)?;
        self.check_component::<T>(component)?;
        Ok(self.read_mut(handle.index(), component))
    }

    /// Overwrites component `component` of a live slot.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get).
    pub fn set<T: Pod>(&mut self, handle: LayoutHandle, component: usize, value: T) -> StoreResult<()> {
        self.check_handle(handle)?;
        self.check_component::<T>(component)?;
        self.write(handle.index(), component, value);
        Ok(())
    }

    /// Fails unless `handle` [`exists`](Self::exists).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidHandle`].
    #[inline]
    pub fn check_handle(&self, handle: LayoutHandle) -> StoreResult<()> {
        if self.exists(handle) {
            Ok(())
        } else {
            Err(StoreError::InvalidHandle {
                index: handle.index(),
                version: handle.version(),
            })
        }
    }

    /// Fails unless values of `T` can be viewed in column `component`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ComponentOutOfRange`], [`StoreError::SizeMismatch`]
    /// or [`StoreError::UnsupportedAlignment`].
    pub fn check_component<T: Pod>(&self, component: usize) -> StoreResult<()> {
        let descriptor = self
            .descriptor(component)
            .ok_or(StoreError::ComponentOutOfRange {
                component,
                count: self.columns.len(),
            })?;
        if !descriptor.fits::<T>() {
            return Err(StoreError::SizeMismatch {
                component,
                expected: descriptor.size,
                actual: std::mem::size_of::<T>(),
            });
        }
        let align = std::mem::align_of::<T>();
        if align > CHUNK_ALIGN {
            return Err(StoreError::UnsupportedAlignment { component, align });
        }
        Ok(())
    }

    // =========================================================================
    // Trusted access (hot path)
    // =========================================================================

    /// Bytes of component `component` at slot `index`.
    ///
    /// No generation check: `index` must belong to a live slot. The bytes stay
    /// at the same address until the slot's chunk is freed by a shrink.
    ///
    /// # Panics
    ///
    /// Panics if `component` is out of range or `index` is not addressable.
    #[inline]
    #[must_use]
    pub fn component_bytes(&self, index: u32, component: usize) -> &[u8] {
        debug_assert!(index < self.capacity, "index {index} beyond capacity {}", self.capacity);
        self.columns[component].element(index as usize)
    }

    /// Mutable bytes of component `component` at slot `index`.
    ///
    /// # Panics
    ///
    /// As [`component_bytes`](Self::component_bytes).
    #[inline]
    pub fn component_bytes_mut(&mut self, index: u32, component: usize) -> &mut [u8] {
        debug_assert!(index < self.capacity, "index {index} beyond capacity {}", self.capacity);
        self.columns[component].element_mut(index as usize)
    }

    /// Typed view of component `component` at slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the component's size, or as
    /// [`component_bytes`](Self::component_bytes).
    #[inline]
    #[must_use]
    pub fn read<T: Pod>(&self, index: u32, component: usize) -> &T {
        bytemuck::from_bytes(self.component_bytes(index, component))
    }

    /// Mutable typed view of component `component` at slot `index`.
    ///
    /// # Panics
    ///
    /// As [`read`](Self::read).
    #[inline]
    pub fn read_mut<T: Pod>(&mut self, index: u32, component: usize) -> &mut T {
        bytemuck::from_bytes_mut(self.component_bytes_mut(index, component))
    }

    /// Copies `value` into component `component` at slot `index`.
    ///
    /// # Panics
    ///
    /// As [`read`](Self::read).
    #[inline]
    pub fn write<T: Pod>(&mut self, index: u32, component: usize, value: T) {
        self.component_bytes_mut(index, component)
            .copy_from_slice(bytemuck::bytes_of(&value));
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Backs `capacity` slots and threads the new ones onto the free list in
    /// ascending order, ahead of the current head.
    fn grow_to(&mut self, capacity: u32) {
        let old = self.capacity;
        if capacity <= old {
            return;
        }
        for column in &mut self.columns {
            column.ensure_capacity(capacity as usize);
        }
        if self.versions.len() < capacity as usize {
            self.versions.resize(capacity as usize, 1);
        }
        self.capacity = capacity;
        for index in (old..capacity).rev() {
            self.set_link(index, self.next_free);
            self.next_free = index;
        }
    }

    /// Free-list successor stored in a free slot.
    #[inline]
    fn link(&self, index: u32) -> u32 {
        bytemuck::pod_read_unaligned(&self.columns[0].element(index as usize)[..LINK_BYTES])
    }

    #[inline]
    fn set_link(&mut self, index: u32, next: u32) {
        self.columns[0].element_mut(index as usize)[..LINK_BYTES]
            .copy_from_slice(bytemuck::bytes_of(&next));
    }
}

impl Drop for LayoutDataStore {
    fn drop(&mut self) {
        let stats = self.stats();
        tracing::debug!(
            label = %self.config.label,
            chunks = stats.chunk_count,
            bytes = stats.reserved_bytes,
            "layout data store released"
        );
    }
}

impl std::fmt::Debug for LayoutDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutDataStore")
            .field("label", &self.config.label)
            .field("capacity", &self.capacity)
            .field("live", &self.live)
            .field("components", &self.columns.len())
            .finish_non_exhaustive()
    }
}

/// Version after a free. Skips 0 so [`LayoutHandle::INVALID`] never validates.
#[inline]
const fn next_version(version: u32) -> u32 {
    match version.wrapping_add(1) {
        0 => 1,
        v => v,
    }
}
