//! # Memory Management
//!
//! Fixed-size chunks and the chunked columns built from them.
//!
//! ## Design Philosophy
//!
//! Memory grows in whole chunks and is never moved once allocated:
//! - No per-node heap allocation
//! - Stable element addresses across growth
//! - Predictable, flat latency during a layout pass

mod chunk;
mod column;

pub use chunk::{Chunk, CHUNK_ALIGN, DEFAULT_CHUNK_BYTES};
pub use column::ChunkedColumn;
