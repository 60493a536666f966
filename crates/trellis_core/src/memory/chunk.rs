//! # Chunks
//!
//! A fixed-size block of zeroed memory. Chunks are the unit of growth for a
//! [`ChunkedColumn`](super::ChunkedColumn).

/// Default chunk size: 32 KiB.
pub const DEFAULT_CHUNK_BYTES: usize = 32 * 1024;

/// Alignment of every chunk body. Typed component views may not exceed it.
pub const CHUNK_ALIGN: usize = std::mem::align_of::<u64>();

/// A fixed-capacity raw byte buffer.
///
/// The body is allocated once and never resized, so its address is stable
/// for the chunk's whole lifetime, even when the owning column reallocates its
/// directory of chunks.
///
/// Allocation failure aborts the process through the global allocator; a
/// layout pass has no sane local recovery from running out of memory.
pub struct Chunk {
    /// Backing storage. `u64` words give the body its alignment.
    words: Box<[u64]>,
}

impl Chunk {
    /// Allocates a zeroed chunk of `bytes` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is zero or not a multiple of [`CHUNK_ALIGN`].
    #[must_use]
    pub fn new(bytes: usize) -> Self {
        assert!(
            bytes > 0 && bytes % CHUNK_ALIGN == 0,
            "chunk size must be a non-zero multiple of {CHUNK_ALIGN}, got {bytes}"
        );
        Self {
            words: vec![0u64; bytes / CHUNK_ALIGN].into_boxed_slice(),
        }
    }

    /// Size of the chunk in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len() * CHUNK_ALIGN
    }

    /// Always `false`: chunks are never empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The chunk body as bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    /// The chunk body as mutable bytes.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.words)
    }

    /// Address of the chunk body. Stable until the chunk is dropped.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.words.as_ptr().cast()
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("bytes", &self.len())
            .field("addr", &self.as_ptr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_is_zeroed() {
        let chunk = Chunk::new(DEFAULT_CHUNK_BYTES);
        assert_eq!(chunk.len(), DEFAULT_CHUNK_BYTES);
        assert!(chunk.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_chunk_body_is_aligned() {
        let chunk = Chunk::new(64);
        assert_eq!(chunk.as_ptr() as usize % CHUNK_ALIGN, 0);
    }

    #[test]
    fn test_chunk_write_read() {
        let mut chunk = Chunk::new(64);
        chunk.as_bytes_mut()[10] = 0xAB;
        assert_eq!(chunk.as_bytes()[10], 0xAB);
    }

    #[test]
    fn test_body_address_survives_move() {
        let chunk = Chunk::new(128);
        let before = chunk.as_ptr();
        let moved = vec![chunk];
        assert_eq!(moved[0].as_ptr(), before);
    }

    #[test]
    #[should_panic(expected = "chunk size")]
    fn test_unaligned_size_panics() {
        let _ = Chunk::new(CHUNK_ALIGN + 1);
    }
}
