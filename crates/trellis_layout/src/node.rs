//! # Layout Components
//!
//! Components are pure data containers with no behavior. They must be `Pod`
//! so the data store can hold them in raw chunk memory.
//!
//! Column order is fixed: [`NODE`], [`STYLE`], [`COMPUTED`], [`CACHE`].

use bytemuck::{Pod, Zeroable};
use trellis_core::{ComponentDescriptor, LayoutHandle};

/// Column of [`NodeData`]. Also carries the store's free-list link.
pub const NODE: usize = 0;
/// Column of [`StyleData`].
pub const STYLE: usize = 1;
/// Column of [`ComputedData`].
pub const COMPUTED: usize = 2;
/// Column of [`CacheData`].
pub const CACHE: usize = 3;

/// Descriptors for every layout column, in column order.
#[must_use]
pub fn layout_descriptors() -> [ComponentDescriptor; 4] {
    [
        ComponentDescriptor::of::<NodeData>().named("node"),
        ComponentDescriptor::of::<StyleData>().named("style"),
        ComponentDescriptor::of::<ComputedData>().named("computed"),
        ComponentDescriptor::of::<CacheData>().named("cache"),
    ]
}

/// Tree links and status bits of a node.
///
/// Siblings form a doubly linked list; the parent keeps both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct NodeData {
    /// Parent node, or `INVALID` for a root.
    pub parent: LayoutHandle,
    /// First child.
    pub first_child: LayoutHandle,
    /// Last child.
    pub last_child: LayoutHandle,
    /// Previous sibling.
    pub prev_sibling: LayoutHandle,
    /// Next sibling.
    pub next_sibling: LayoutHandle,
    /// Number of children.
    pub child_count: u32,
    /// Status bits, see [`NodeData::DIRTY`].
    pub flags: u32,
}

impl NodeData {
    /// Layout must be recomputed.
    pub const DIRTY: u32 = 1 << 0;
    /// Computed layout changed since the caller last looked.
    pub const HAS_NEW_LAYOUT: u32 = 1 << 1;

    /// A node with no relatives that still needs layout.
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            parent: LayoutHandle::INVALID,
            first_child: LayoutHandle::INVALID,
            last_child: LayoutHandle::INVALID,
            prev_sibling: LayoutHandle::INVALID,
            next_sibling: LayoutHandle::INVALID,
            child_count: 0,
            flags: Self::DIRTY,
        }
    }

    /// Checks a status bit.
    #[inline]
    #[must_use]
    pub const fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// Main axis of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum FlexDirection {
    /// Top to bottom.
    #[default]
    Column = 0,
    /// Bottom to top.
    ColumnReverse = 1,
    /// Left to right.
    Row = 2,
    /// Right to left.
    RowReverse = 3,
}

impl FlexDirection {
    /// Decodes a stored value. Unknown values fall back to `Column`.
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::ColumnReverse,
            2 => Self::Row,
            3 => Self::RowReverse,
            _ => Self::Column,
        }
    }
}

/// Author-specified layout inputs. `NaN` lengths mean "auto".
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct StyleData {
    /// Preferred width.
    pub width: f32,
    /// Preferred height.
    pub height: f32,
    /// Minimum width.
    pub min_width: f32,
    /// Minimum height.
    pub min_height: f32,
    /// Maximum width.
    pub max_width: f32,
    /// Maximum height.
    pub max_height: f32,
    /// Share of free space taken when growing.
    pub flex_grow: f32,
    /// Share of overflow absorbed when shrinking.
    pub flex_shrink: f32,
    /// Initial main size.
    pub flex_basis: f32,
    /// Margins: left, top, right, bottom.
    pub margin: [f32; 4],
    /// Padding: left, top, right, bottom.
    pub padding: [f32; 4],
    /// Encoded [`FlexDirection`].
    pub flex_direction: u32,
}

impl StyleData {
    /// Style with a fixed size and defaults elsewhere.
    #[must_use]
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Decoded main axis.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> FlexDirection {
        FlexDirection::from_u32(self.flex_direction)
    }

    /// Sets the main axis.
    #[must_use]
    pub const fn with_direction(mut self, direction: FlexDirection) -> Self {
        self.flex_direction = direction as u32;
        self
    }
}

impl Default for StyleData {
    fn default() -> Self {
        Self {
            width: f32::NAN,
            height: f32::NAN,
            min_width: f32::NAN,
            min_height: f32::NAN,
            max_width: f32::NAN,
            max_height: f32::NAN,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: f32::NAN,
            margin: [0.0; 4],
            padding: [0.0; 4],
            flex_direction: FlexDirection::Column as u32,
        }
    }
}

/// Layout output, relative to the parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ComputedData {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Final width.
    pub width: f32,
    /// Final height.
    pub height: f32,
}

/// Last measurement, reused while inputs are unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct CacheData {
    /// Available width and height the measurement was made with.
    pub available: [f32; 2],
    /// Measured width and height.
    pub measured: [f32; 2],
    /// Non-zero when the entry may be reused.
    pub valid: u32,
}

impl CacheData {
    /// A valid cache entry.
    #[must_use]
    pub const fn new(available: [f32; 2], measured: [f32; 2]) -> Self {
        Self {
            available,
            measured,
            valid: 1,
        }
    }

    /// Whether the entry may be reused.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid != 0
    }
}
