//! # Layout Error Types

use thiserror::Error;
use trellis_core::{LayoutHandle, StoreError};

/// Errors that can occur while editing a layout tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The underlying data store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The node was destroyed, or never belonged to this tree.
    #[error("stale layout node {0}")]
    StaleNode(LayoutHandle),

    /// The child already has a parent.
    #[error("layout node {0} is already attached to a parent")]
    AlreadyAttached(LayoutHandle),

    /// The node is not a child of the given parent.
    #[error("layout node {child} is not a child of {parent}")]
    NotAChild {
        /// The expected parent.
        parent: LayoutHandle,
        /// The node that was not found under it.
        child: LayoutHandle,
    },

    /// Attaching the child would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCreateCycle {
        /// The prospective parent.
        parent: LayoutHandle,
        /// The prospective child.
        child: LayoutHandle,
    },

    /// Insertion index past the end of the child list.
    #[error("child index {index} out of range: node has {count} children")]
    ChildIndexOutOfRange {
        /// The requested position.
        index: u32,
        /// Current number of children.
        count: u32,
    },
}

/// Result type for layout tree operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
