//! # Component Sets
//!
//! Tuples of plain-data values that seed a slot in one call.
//!
//! A set of arity `N` writes its elements to components `0..N`, in order.
//! Sets are implemented for tuples of arity 1 through 7.
//!
//! ```rust,ignore
//! let handle = store.allocate_with((node, style, computed))?;
//! ```

use bytemuck::Pod;

use super::data_store::LayoutDataStore;
use crate::error::{StoreError, StoreResult};

/// Values for the leading components of a slot.
pub trait ComponentSet: Sized {
    /// Number of components written.
    const LEN: usize;

    /// Checks every element against the store's descriptors without touching
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns the first component that is out of range, the wrong size or
    /// over-aligned.
    fn validate(store: &LayoutDataStore) -> StoreResult<()>;

    /// Writes every element into slot `index`.
    ///
    /// Callers must have run [`validate`](Self::validate) first.
    fn write(self, store: &mut LayoutDataStore, index: u32);
}

macro_rules! impl_component_set {
    ($len:expr; $($ty:ident : $idx:tt),+) => {
        impl<$($ty: Pod),+> ComponentSet for ($($ty,)+) {
            const LEN: usize = $len;

            fn validate(store: &LayoutDataStore) -> StoreResult<()> {
                let count = store.component_count();
                if Self::LEN > count {
                    return Err(StoreError::ComponentOutOfRange {
                        component: count,
                        count,
                    });
                }
                $( store.check_component::<$ty>($idx)?; )+
                Ok(())
            }

            fn write(self, store: &mut LayoutDataStore, index: u32) {
                $( store.write::<$ty>(index, $idx, self.$idx); )+
            }
        }
    };
}

impl_component_set!(1; A: 0);
impl_component_set!(2; A: 0, B: 1);
impl_component_set!(3; A: 0, B: 1, C: 2);
impl_component_set!(4; A: 0, B: 1, C: 2, D: 3);
impl_component_set!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_component_set!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_component_set!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
