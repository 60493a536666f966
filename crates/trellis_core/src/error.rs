//! # Store Error Types
//!
//! All errors that can occur in the layout data store.

use thiserror::Error;

/// Errors that can occur in the layout data store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The handle is stale (version mismatch) or its index is out of range.
    #[error("invalid handle: index {index}, version {version}")]
    InvalidHandle {
        /// Index carried by the handle.
        index: u32,
        /// Version carried by the handle.
        version: u32,
    },

    /// A component index beyond the store's component list.
    #[error("component {component} out of range: store has {count} components")]
    ComponentOutOfRange {
        /// The requested component index.
        component: usize,
        /// Number of components in the store.
        count: usize,
    },

    /// A typed value whose size does not match the component's descriptor.
    #[error("component {component} size mismatch: descriptor is {expected} bytes, value is {actual}")]
    SizeMismatch {
        /// The component index.
        component: usize,
        /// Size recorded in the descriptor.
        expected: usize,
        /// Size of the supplied type.
        actual: usize,
    },

    /// A typed view whose alignment exceeds what chunk memory guarantees.
    #[error("component {component} requires alignment {align}, above the chunk alignment")]
    UnsupportedAlignment {
        /// The component index.
        component: usize,
        /// Alignment of the requested type.
        align: usize,
    },

    /// A shrink would drop slots that are still live.
    #[error("cannot shrink to {requested} slots: {live} live slots lie beyond it")]
    LiveSlotsBeyondCapacity {
        /// The requested capacity.
        requested: u32,
        /// Number of live slots at or past `requested`.
        live: u32,
    },

    /// A store was described with no components.
    #[error("a layout data store needs at least one component")]
    NoComponents,

    /// Component 0 cannot hold the free-list link.
    #[error("component 0 is {size} bytes, at least 4 are needed for the free-list link")]
    LinkComponentTooSmall {
        /// Size of component 0.
        size: usize,
    },

    /// A component with no bytes cannot be addressed by index.
    #[error("component {component} is zero-sized")]
    ZeroSizedComponent {
        /// The component index.
        component: usize,
    },

    /// A component does not fit in a single chunk.
    #[error("component {component} is {size} bytes, larger than a {chunk_bytes}-byte chunk")]
    ComponentLargerThanChunk {
        /// The component index.
        component: usize,
        /// Size of the component.
        size: usize,
        /// Configured chunk size.
        chunk_bytes: usize,
    },

    /// Invalid configuration value or document.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    ConfigIo(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
