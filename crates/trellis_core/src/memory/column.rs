//! # Chunked Column Storage
//!
//! Storage for one component type, split across fixed-size chunks.
//!
//! ```text
//! directory: Vec<Chunk>   (may reallocate on grow/shrink)
//!   [0] ──► | e0 | e1 | ... | e(n-1) |    n = chunk_bytes / element_size
//!   [1] ──► | en | ...                |
//!   [2] ──► | ...                     |   (bodies never move)
//! ```
//!
//! A dense index maps to `(index / n, (index % n) * element_size)`.

use super::chunk::Chunk;
use crate::store::ComponentDescriptor;

/// Dense storage for a single component type.
///
/// Growing appends chunks; existing chunk bodies are untouched, so byte
/// addresses of already-addressable elements stay stable across growth. Only
/// the directory of chunks is reallocated.
///
/// The column performs no liveness checks. The owning store guarantees that
/// every index it passes is below [`capacity`](Self::capacity), and keeps all
/// of its columns at the same capacity.
#[derive(Debug)]
pub struct ChunkedColumn {
    /// What this column stores.
    descriptor: ComponentDescriptor,
    /// Owned chunks, in index order.
    chunks: Vec<Chunk>,
    /// Size of every chunk in bytes.
    chunk_bytes: usize,
    /// `chunk_bytes / descriptor.size`.
    elements_per_chunk: usize,
}

impl ChunkedColumn {
    /// Creates an empty column.
    ///
    /// # Panics
    ///
    /// Panics if the component is zero-sized or larger than `chunk_bytes`.
    #[must_use]
    pub fn new(descriptor: ComponentDescriptor, chunk_bytes: usize) -> Self {
        assert!(descriptor.size > 0, "component '{}' is zero-sized", descriptor.name);
        assert!(
            descriptor.size <= chunk_bytes,
            "component '{}' ({} bytes) does not fit a {chunk_bytes}-byte chunk",
            descriptor.name,
            descriptor.size
        );
        Self {
            elements_per_chunk: chunk_bytes / descriptor.size,
            descriptor,
            chunks: Vec::new(),
            chunk_bytes,
        }
    }

    /// The component this column stores.
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    /// Size of one element in bytes.
    #[inline]
    #[must_use]
    pub fn element_size(&self) -> usize {
        self.descriptor.size
    }

    /// Number of elements stored per chunk.
    #[inline]
    #[must_use]
    pub fn elements_per_chunk(&self) -> usize {
        self.elements_per_chunk
    }

    /// Number of chunks currently owned.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of addressable elements.
    ///
    /// May exceed the store's slot capacity because whole chunks are allocated.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.elements_per_chunk
    }

    /// Bytes reserved by all chunks.
    #[inline]
    #[must_use]
    pub fn reserved_bytes(&self) -> usize {
        self.chunks.len() * self.chunk_bytes
    }

    /// Chunk index and byte offset of element `index`.
    #[inline]
    #[must_use]
    pub fn locate(&self, index: usize) -> (usize, usize) {
        (
            index / self.elements_per_chunk,
            (index % self.elements_per_chunk) * self.descriptor.size,
        )
    }

    /// Bytes of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not addressable.
    #[inline]
    #[must_use]
    pub fn element(&self, index: usize) -> &[u8] {
        let (chunk, offset) = self.locate(index);
        &self.chunks[chunk].as_bytes()[offset..offset + self.descriptor.size]
    }

    /// Mutable bytes of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not addressable.
    #[inline]
    pub fn element_mut(&mut self, index: usize) -> &mut [u8] {
        let (chunk, offset) = self.locate(index);
        let size = self.descriptor.size;
        &mut self.chunks[chunk].as_bytes_mut()[offset..offset + size]
    }

    /// Body address of chunk `chunk`, if it exists.
    #[inline]
    #[must_use]
    pub fn chunk_ptr(&self, chunk: usize) -> Option<*const u8> {
        self.chunks.get(chunk).map(Chunk::as_ptr)
    }

    /// Grows until at least `capacity` elements are addressable. Never shrinks.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let needed = capacity.div_ceil(self.elements_per_chunk);
        if needed <= self.chunks.len() {
            return;
        }
        self.chunks.reserve_exact(needed - self.chunks.len());
        while self.chunks.len() < needed {
            self.chunks.push(Chunk::new(self.chunk_bytes));
        }
    }

    /// Grows or shrinks so exactly the chunks needed for `capacity` are owned.
    ///
    /// Shrinking frees trailing chunks and shrinks the directory.
    pub fn resize_capacity(&mut self, capacity: usize) {
        let needed = capacity.div_ceil(self.elements_per_chunk);
        if needed >= self.chunks.len() {
            self.ensure_capacity(capacity);
        } else {
            self.chunks.truncate(needed);
            self.chunks.shrink_to_fit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(size: usize, chunk_bytes: usize) -> ChunkedColumn {
        ChunkedColumn::new(ComponentDescriptor::raw("test", size), chunk_bytes)
    }

    #[test]
    fn test_elements_per_chunk() {
        let col = column(16, 32 * 1024);
        assert_eq!(col.elements_per_chunk(), 2048);
        assert_eq!(col.capacity(), 0);
    }

    #[test]
    fn test_locate_crosses_chunk_boundary() {
        let col = column(12, 64); // 5 elements per chunk
        assert_eq!(col.locate(0), (0, 0));
        assert_eq!(col.locate(4), (0, 48));
        assert_eq!(col.locate(5), (1, 0));
        assert_eq!(col.locate(11), (2, 12));
    }

    #[test]
    fn test_ensure_capacity_allocates_whole_chunks() {
        let mut col = column(16, 64); // 4 per chunk
        col.ensure_capacity(5);
        assert_eq!(col.chunk_count(), 2);
        assert_eq!(col.capacity(), 8);

        // Never shrinks.
        col.ensure_capacity(1);
        assert_eq!(col.chunk_count(), 2);
    }

    #[test]
    fn test_growth_keeps_chunk_bodies_in_place() {
        let mut col = column(8, 64);
        col.ensure_capacity(8);
        col.element_mut(3).copy_from_slice(&[7u8; 8]);
        let first = col.chunk_ptr(0).unwrap();

        col.ensure_capacity(1000);

        assert_eq!(col.chunk_ptr(0).unwrap(), first);
        assert_eq!(col.element(3), &[7u8; 8]);
    }

    #[test]
    fn test_resize_frees_trailing_chunks() {
        let mut col = column(16, 64);
        col.ensure_capacity(16);
        col.element_mut(2).copy_from_slice(&[9u8; 16]);
        assert_eq!(col.chunk_count(), 4);

        col.resize_capacity(4);
        assert_eq!(col.chunk_count(), 1);
        assert_eq!(col.element(2), &[9u8; 16]);

        col.resize_capacity(9);
        assert_eq!(col.chunk_count(), 3);
    }

    #[test]
    fn test_elements_do_not_overlap() {
        let mut col = column(4, 64);
        col.ensure_capacity(40);
        for i in 0..40u32 {
            col.element_mut(i as usize).copy_from_slice(&i.to_le_bytes());
        }
        for i in 0..40u32 {
            assert_eq!(col.element(i as usize), &i.to_le_bytes());
        }
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_oversized_component_panics() {
        let _ = column(128, 64);
    }
}
