//! # Store Statistics
//!
//! Point-in-time occupancy figures, used for profiling and for verifying that
//! growth and shrink behave as expected.

/// Occupancy of a [`LayoutDataStore`](super::LayoutDataStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Slots currently backed by storage.
    pub capacity: u32,
    /// Slots currently allocated.
    pub live: u32,
    /// Slots on the free list.
    pub free: u32,
    /// Number of component columns.
    pub component_count: usize,
    /// Chunks owned across all columns.
    pub chunk_count: usize,
    /// Bytes reserved by those chunks.
    pub reserved_bytes: usize,
}

impl StoreStats {
    /// Fraction of capacity in use (0.0 to 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f32 {
        if self.capacity == 0 {
            0.0
        } else {
            self.live as f32 / self.capacity as f32
        }
    }
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} slots live, {} components, {} chunks ({} KiB)",
            self.live,
            self.capacity,
            self.component_count,
            self.chunk_count,
            self.reserved_bytes / 1024
        )
    }
}
