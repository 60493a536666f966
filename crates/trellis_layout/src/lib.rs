//! # Trellis Layout
//!
//! Layout node tree stored in a [`trellis_core::LayoutDataStore`].
//!
//! ## Components
//!
//! Every node owns four plain-data components:
//! - [`NodeData`]: parent, sibling and child links plus status flags
//! - [`StyleData`]: author inputs
//! - [`ComputedData`]: layout results
//! - [`CacheData`]: last measurement
//!
//! Links between nodes are [`trellis_core::LayoutHandle`]s, so a destroyed
//! node can never be reached through a stale reference.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod node;
pub mod tree;

pub use error::{LayoutError, LayoutResult};
pub use node::{
    layout_descriptors, CacheData, ComputedData, FlexDirection, NodeData, StyleData, CACHE,
    COMPUTED, NODE, STYLE,
};
pub use tree::{Children, LayoutNode, LayoutTree};
