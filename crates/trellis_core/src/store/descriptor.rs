//! # Component Descriptors
//!
//! A descriptor names one column of a store and fixes its element size.
//! The descriptor list passed at construction is immutable for the store's
//! lifetime; its order defines component indices.

use bytemuck::Pod;

/// Size and alignment of one component column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Human-readable name, used in logs and panics.
    pub name: &'static str,
    /// Element size in bytes.
    pub size: usize,
    /// Alignment required by typed views of this component. Stores reject
    /// descriptors aligned beyond the chunk alignment.
    pub align: usize,
}

impl ComponentDescriptor {
    /// Describes a plain-data component type.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis_core::ComponentDescriptor;
    ///
    /// let d = ComponentDescriptor::of::<[f32; 4]>();
    /// assert_eq!(d.size, 16);
    /// ```
    #[must_use]
    pub fn of<T: Pod>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }

    /// Describes an untyped byte column.
    #[must_use]
    pub const fn raw(name: &'static str, size: usize) -> Self {
        Self {
            name,
            size,
            align: 1,
        }
    }

    /// Renames the descriptor.
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Whether values of `T` can be stored in this column.
    #[inline]
    #[must_use]
    pub fn fits<T: Pod>(&self) -> bool {
        std::mem::size_of::<T>() == self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_descriptor() {
        let d = ComponentDescriptor::of::<u64>();
        assert_eq!(d.size, 8);
        assert_eq!(d.align, std::mem::align_of::<u64>());
        assert!(d.fits::<[u32; 2]>());
        assert!(!d.fits::<u32>());
    }

    #[test]
    fn test_raw_descriptor() {
        let d = ComponentDescriptor::raw("cache", 48).named("layout-cache");
        assert_eq!(d.name, "layout-cache");
        assert_eq!(d.size, 48);
        assert_eq!(d.align, 1);
    }
}
