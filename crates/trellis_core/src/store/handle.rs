//! # Layout Handles
//!
//! Handles are lightweight identifiers consisting of:
//! - A dense index shared by every component column
//! - A version counter for detecting stale references

use bytemuck::{Pod, Zeroable};

/// Opaque reference to a slot in a [`LayoutDataStore`](super::LayoutDataStore).
///
/// Two handles are equal iff both index and version match. A handle is only
/// meaningful for the store that issued it, and only while its version equals
/// the slot's current version.
///
/// Handles are plain data, so callers may store them inside components to
/// encode tree or graph structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct LayoutHandle {
    index: u32,
    version: u32,
}

impl LayoutHandle {
    /// A handle that no store ever issues (versions start at 1).
    pub const INVALID: Self = Self {
        index: u32::MAX,
        version: 0,
    };

    /// Creates a handle from raw parts.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, version: u32) -> Self {
        Self { index, version }
    }

    /// Dense slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Version captured when the handle was issued.
    #[inline]
    #[must_use]
    pub const fn version(self) -> u32 {
        self.version
    }

    /// Checks whether this is [`LayoutHandle::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.version == 0
    }
}

impl Default for LayoutHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for LayoutHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.version)
    }
}
