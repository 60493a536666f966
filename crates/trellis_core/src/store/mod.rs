//! # Layout Data Store
//!
//! A generational slot arena with struct-of-arrays component storage.
//!
//! ## Design Philosophy
//!
//! - Every component lives in its own chunked column
//! - One dense index addresses a slot across all columns
//! - Handles carry a version, so freeing a slot invalidates every copy of
//!   its handle without finding them
//! - No dynamic dispatch in hot paths

mod component_set;
mod data_store;
mod descriptor;
mod handle;
mod stats;

pub use component_set::ComponentSet;
pub use data_store::{LayoutDataStore, LINK_BYTES};
pub use descriptor::ComponentDescriptor;
pub use handle::LayoutHandle;
pub use stats::StoreStats;
