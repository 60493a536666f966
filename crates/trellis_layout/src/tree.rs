//! # Layout Tree
//!
//! Nodes live in a [`LayoutDataStore`] with four columns (see [`crate::node`]).
//! Tree topology is stored as [`LayoutHandle`]s inside [`NodeData`], so the
//! tree itself owns no per-node heap memory.
//!
//! Public entry points validate the caller's handles. Links reached from a
//! validated node are trusted: destroying a node unlinks it from its parent
//! and orphans its children, so no stored link ever points at a freed slot.

use std::fmt;

use tracing::debug;
use trellis_core::{LayoutDataStore, LayoutHandle, StoreConfig, StoreStats};

use crate::error::{LayoutError, LayoutResult};
use crate::node::{
    layout_descriptors, CacheData, ComputedData, NodeData, StyleData, CACHE, COMPUTED, NODE,
    STYLE,
};

/// A node of a [`LayoutTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutNode(LayoutHandle);

impl LayoutNode {
    /// The underlying store handle.
    #[inline]
    #[must_use]
    pub const fn handle(self) -> LayoutHandle {
        self.0
    }
}

impl fmt::Display for LayoutNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// A tree of layout nodes backed by a layout data store.
pub struct LayoutTree {
    store: LayoutDataStore,
}

impl LayoutTree {
    /// Creates an empty tree.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            store: LayoutDataStore::new(&layout_descriptors(), config),
        }
    }

    /// Creates an empty tree with room for `capacity` nodes before growing.
    #[must_use]
    pub fn with_capacity(capacity: u32) -> Self {
        Self::new(StoreConfig::with_capacity(capacity).label("layout-tree"))
    }

    /// Number of live nodes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.store.len()
    }

    /// Whether the tree has no nodes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Read access to the backing store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &LayoutDataStore {
        &self.store
    }

    /// Backing store statistics.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    // =========================================================================
    // NODE LIFECYCLE
    // =========================================================================

    /// Creates a detached, dirty node.
    ///
    /// # Errors
    ///
    /// Propagates store errors; none occur with the built-in columns.
    pub fn create_node(&mut self, style: StyleData) -> LayoutResult<LayoutNode> {
        let handle = self.store.allocate_with((
            NodeData::detached(),
            style,
            ComputedData::default(),
            CacheData::default(),
        ))?;
        Ok(LayoutNode(handle))
    }

    /// Whether `node` is live in this tree.
    #[inline]
    #[must_use]
    pub fn contains(&self, node: LayoutNode) -> bool {
        self.store.exists(node.0)
    }

    /// Destroys a node.
    ///
    /// The node is removed from its parent, which becomes dirty. Its
    /// children become dirty roots; they are not destroyed.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn destroy_node(&mut self, node: LayoutNode) -> LayoutResult<()> {
        self.check(node)?;

        let parent = self.links(node.0).parent;
        if !parent.is_invalid() {
            self.detach(node.0);
            self.mark_dirty_from(parent);
        }

        let orphaned = self.links(node.0).child_count;
        let mut cursor = self.links(node.0).first_child;
        while !cursor.is_invalid() {
            let links = self.links_mut(cursor);
            let next = links.next_sibling;
            links.parent = LayoutHandle::INVALID;
            links.prev_sibling = LayoutHandle::INVALID;
            links.next_sibling = LayoutHandle::INVALID;
            // Lost its containing block.
            self.mark_dirty_from(cursor);
            cursor = next;
        }

        self.store.free(node.0)?;
        debug!(node = %node.0, orphaned, "destroyed layout node");
        Ok(())
    }

    // =========================================================================
    // TREE EDITS
    // =========================================================================

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`LayoutTree::insert_child`].
    pub fn append_child(&mut self, parent: LayoutNode, child: LayoutNode) -> LayoutResult<()> {
        self.check(parent)?;
        let count = self.links(parent.0).child_count;
        self.insert_child(parent, child, count)
    }

    /// Inserts `child` under `parent` at position `index`.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::StaleNode`] if either node is not live
    /// - [`LayoutError::AlreadyAttached`] if `child` has a parent
    /// - [`LayoutError::WouldCreateCycle`] if `child` is `parent` or one of its ancestors
    /// - [`LayoutError::ChildIndexOutOfRange`] if `index` exceeds the child count
    pub fn insert_child(
        &mut self,
        parent: LayoutNode,
        child: LayoutNode,
        index: u32,
    ) -> LayoutResult<()> {
        self.check(parent)?;
        self.check(child)?;

        if !self.links(child.0).parent.is_invalid() {
            return Err(LayoutError::AlreadyAttached(child.0));
        }
        if self.is_ancestor_or_self(child.0, parent.0) {
            return Err(LayoutError::WouldCreateCycle {
                parent: parent.0,
                child: child.0,
            });
        }

        let count = self.links(parent.0).child_count;
        if index > count {
            return Err(LayoutError::ChildIndexOutOfRange { index, count });
        }

        let next = self.nth_child(parent.0, index);
        let prev = if next.is_invalid() {
            self.links(parent.0).last_child
        } else {
            self.links(next).prev_sibling
        };

        {
            let links = self.links_mut(child.0);
            links.parent = parent.0;
            links.prev_sibling = prev;
            links.next_sibling = next;
        }
        if prev.is_invalid() {
            self.links_mut(parent.0).first_child = child.0;
        } else {
            self.links_mut(prev).next_sibling = child.0;
        }
        if next.is_invalid() {
            self.links_mut(parent.0).last_child = child.0;
        } else {
            self.links_mut(next).prev_sibling = child.0;
        }
        self.links_mut(parent.0).child_count += 1;

        self.mark_dirty_from(parent.0);
        Ok(())
    }

    /// Removes `child` from `parent`. The child becomes a dirty root.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::StaleNode`] if either node is not live
    /// - [`LayoutError::NotAChild`] if `child` is not directly under `parent`
    pub fn remove_child(&mut self, parent: LayoutNode, child: LayoutNode) -> LayoutResult<()> {
        self.check(parent)?;
        self.check(child)?;

        if self.links(child.0).parent != parent.0 {
            return Err(LayoutError::NotAChild {
                parent: parent.0,
                child: child.0,
            });
        }

        self.detach(child.0);
        self.mark_dirty_from(parent.0);
        self.mark_dirty_from(child.0);
        Ok(())
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Parent of `node`, or `None` for a root.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn parent(&self, node: LayoutNode) -> LayoutResult<Option<LayoutNode>> {
        self.check(node)?;
        let parent = self.links(node.0).parent;
        Ok((!parent.is_invalid()).then_some(LayoutNode(parent)))
    }

    /// Number of direct children.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn child_count(&self, node: LayoutNode) -> LayoutResult<u32> {
        self.check(node)?;
        Ok(self.links(node.0).child_count)
    }

    /// Child at position `index`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn child_at(&self, node: LayoutNode, index: u32) -> LayoutResult<Option<LayoutNode>> {
        self.check(node)?;
        let child = self.nth_child(node.0, index);
        Ok((!child.is_invalid()).then_some(LayoutNode(child)))
    }

    /// Iterates over the direct children in order.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn children(&self, node: LayoutNode) -> LayoutResult<Children<'_>> {
        self.check(node)?;
        let links = self.links(node.0);
        Ok(Children {
            store: &self.store,
            next: links.first_child,
            remaining: links.child_count,
        })
    }

    // =========================================================================
    // COMPONENT ACCESS
    // =========================================================================

    /// Style of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn style(&self, node: LayoutNode) -> LayoutResult<&StyleData> {
        self.check(node)?;
        Ok(self.store.read::<StyleData>(node.0.index(), STYLE))
    }

    /// Replaces the style of `node` and marks it dirty.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn set_style(&mut self, node: LayoutNode, style: StyleData) -> LayoutResult<()> {
        self.check(node)?;
        self.store.write(node.0.index(), STYLE, style);
        self.mark_dirty_from(node.0);
        Ok(())
    }

    /// Computed layout of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn computed(&self, node: LayoutNode) -> LayoutResult<&ComputedData> {
        self.check(node)?;
        Ok(self.store.read::<ComputedData>(node.0.index(), COMPUTED))
    }

    /// Stores a layout result. Flags the node as having a new layout when
    /// the value differs bitwise from the previous one, so a repeated `NaN`
    /// is not a change.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn set_computed(&mut self, node: LayoutNode, computed: ComputedData) -> LayoutResult<()> {
        self.check(node)?;
        let slot = self.store.read_mut::<ComputedData>(node.0.index(), COMPUTED);
        if bytemuck::bytes_of(slot) != bytemuck::bytes_of(&computed) {
            *slot = computed;
            self.links_mut(node.0).flags |= NodeData::HAS_NEW_LAYOUT;
        }
        Ok(())
    }

    /// Returns and clears the new-layout flag.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn take_new_layout(&mut self, node: LayoutNode) -> LayoutResult<bool> {
        self.check(node)?;
        let links = self.links_mut(node.0);
        let had = links.has_flag(NodeData::HAS_NEW_LAYOUT);
        links.flags &= !NodeData::HAS_NEW_LAYOUT;
        Ok(had)
    }

    /// Measurement cache of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn cache(&self, node: LayoutNode) -> LayoutResult<&CacheData> {
        self.check(node)?;
        Ok(self.store.read::<CacheData>(node.0.index(), CACHE))
    }

    /// Replaces the measurement cache of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn set_cache(&mut self, node: LayoutNode, cache: CacheData) -> LayoutResult<()> {
        self.check(node)?;
        self.store.write(node.0.index(), CACHE, cache);
        Ok(())
    }

    // =========================================================================
    // DIRTY TRACKING
    // =========================================================================

    /// Marks `node` and its ancestors dirty and invalidates their caches.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn mark_dirty(&mut self, node: LayoutNode) -> LayoutResult<()> {
        self.check(node)?;
        self.mark_dirty_from(node.0);
        Ok(())
    }

    /// Whether `node` needs layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn is_dirty(&self, node: LayoutNode) -> LayoutResult<bool> {
        self.check(node)?;
        Ok(self.links(node.0).has_flag(NodeData::DIRTY))
    }

    /// Clears the dirty flag of `node` only.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::StaleNode`] if `node` is not live.
    pub fn clear_dirty(&mut self, node: LayoutNode) -> LayoutResult<()> {
        self.check(node)?;
        self.links_mut(node.0).flags &= !NodeData::DIRTY;
        Ok(())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn check(&self, node: LayoutNode) -> LayoutResult<()> {
        if self.store.exists(node.0) {
            Ok(())
        } else {
            Err(LayoutError::StaleNode(node.0))
        }
    }

    #[inline]
    fn links(&self, handle: LayoutHandle) -> NodeData {
        *self.store.read::<NodeData>(handle.index(), NODE)
    }

    #[inline]
    fn links_mut(&mut self, handle: LayoutHandle) -> &mut NodeData {
        self.store.read_mut::<NodeData>(handle.index(), NODE)
    }

    fn nth_child(&self, parent: LayoutHandle, index: u32) -> LayoutHandle {
        let mut cursor = self.links(parent).first_child;
        for _ in 0..index {
            if cursor.is_invalid() {
                break;
            }
            cursor = self.links(cursor).next_sibling;
        }
        cursor
    }

    /// Whether `candidate` is `node` or one of its ancestors.
    fn is_ancestor_or_self(&self, candidate: LayoutHandle, node: LayoutHandle) -> bool {
        let mut cursor = node;
        while !cursor.is_invalid() {
            if cursor == candidate {
                return true;
            }
            cursor = self.links(cursor).parent;
        }
        false
    }

    /// Unlinks an attached node from its parent and siblings.
    fn detach(&mut self, child: LayoutHandle) {
        let NodeData {
            parent,
            prev_sibling: prev,
            next_sibling: next,
            ..
        } = self.links(child);

        if prev.is_invalid() {
            self.links_mut(parent).first_child = next;
        } else {
            self.links_mut(prev).next_sibling = next;
        }
        if next.is_invalid() {
            self.links_mut(parent).last_child = prev;
        } else {
            self.links_mut(next).prev_sibling = prev;
        }
        self.links_mut(parent).child_count -= 1;

        let links = self.links_mut(child);
        links.parent = LayoutHandle::INVALID;
        links.prev_sibling = LayoutHandle::INVALID;
        links.next_sibling = LayoutHandle::INVALID;
    }

    /// Dirties `start` and every ancestor up to the root.
    fn mark_dirty_from(&mut self, start: LayoutHandle) {
        let mut cursor = start;
        while !cursor.is_invalid() {
            self.store.read_mut::<CacheData>(cursor.index(), CACHE).valid = 0;
            let links = self.links_mut(cursor);
            links.flags |= NodeData::DIRTY;
            cursor = links.parent;
        }
    }
}

impl fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutTree")
            .field("nodes", &self.store.len())
            .field("capacity", &self.store.capacity())
            .finish()
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    store: &'a LayoutDataStore,
    next: LayoutHandle,
    remaining: u32,
}

impl Iterator for Children<'_> {
    type Item = LayoutNode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_invalid() {
            return None;
        }
        let current = self.next;
        self.next = self
            .store
            .read::<NodeData>(current.index(), NODE)
            .next_sibling;
        self.remaining = self.remaining.saturating_sub(1);
        Some(LayoutNode(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Children<'_> {}
