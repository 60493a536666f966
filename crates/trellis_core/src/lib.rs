//! # Trellis Core
//!
//! Retained storage for layout trees, designed for:
//! - Hundreds of thousands of nodes without per-node heap allocation
//! - O(1) allocate, free and component access
//! - Stable element addresses while the store grows
//!
//! ## Architecture Rules
//!
//! 1. **Chunked growth** - Columns grow by whole 32 KiB chunks; chunk bodies never move
//! 2. **Data-oriented design** - Each component is stored in its own column
//! 3. **Versioned handles** - Stale handles are detected, never dereferenced
//!
//! ## Example
//!
//! ```rust
//! use trellis_core::{ComponentDescriptor, LayoutDataStore, StoreConfig};
//!
//! let mut store = LayoutDataStore::new(
//!     &[ComponentDescriptor::raw("node", 4), ComponentDescriptor::raw("cache", 16)],
//!     StoreConfig::with_capacity(4),
//! );
//! let handle = store.allocate();
//! assert!(store.exists(handle));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod memory;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::{Chunk, ChunkedColumn, CHUNK_ALIGN, DEFAULT_CHUNK_BYTES};
pub use store::{
    ComponentDescriptor, ComponentSet, LayoutDataStore, LayoutHandle, StoreStats, LINK_BYTES,
};
