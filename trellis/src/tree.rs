//! The layout tree: an arena of nodes with declarative dimensions.
//!
//! All nodes live in a single owning [`LayoutTree`]; parents, children
//! and iteration clones refer to each other through plain [`NodeId`]s,
//! so the child->parent and iteration->template back-references are
//! trivially acyclic. Ids are generational: destroying a node
//! invalidates every outstanding id for it.
//!
//! Sibling array order is semantically significant: it is the
//! dependency order for STACK/COMPLEMENT resolution and the paint
//! order. A node's `index` always equals its position in the parent's
//! child array; every structural mutation renumbers.

use std::ops::{Index, IndexMut};

use crate::dimension::{AxisContext, Axis, Dimension, Span};
use crate::error::LayoutError;
use crate::iter::LayoutIterator;
use crate::primitives::{Point, Rect};
use crate::scroll::ScrollPane;

/// Ceiling on direct children per node. Generous; exceeding it is a
/// recoverable [`LayoutError::CapacityExceeded`].
pub const MAX_CHILDREN: usize = 1024;

/// A stable, generational handle to a node in a [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// What role a node plays in the tree.
///
/// A closed sum type; the iterator is owned by the `Template` variant,
/// so it exists exactly when the node is a template.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// An ordinary, editable node.
    Normal,
    /// A node whose subtree is stamped out repeatedly by its iterator.
    Template(LayoutIterator),
    /// One concrete clone produced from a template. Excluded from
    /// editing and serialization.
    Iteration,
    /// Used for program operation; not part of the editable hierarchy.
    Internal,
}

impl NodeKind {
    /// Token used in the serialized text format.
    pub fn token(&self) -> &'static str {
        match self {
            NodeKind::Normal => "NORMAL",
            NodeKind::Template(_) => "TEMPLATE",
            NodeKind::Iteration => "ITERATION",
            NodeKind::Internal => "PRGRM_INTERNAL",
        }
    }

    /// Parse a serialized kind token. `TEMPLATE` yields an empty
    /// iterator; the serialization adapter re-populates it.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "NORMAL" => Some(NodeKind::Normal),
            "TEMPLATE" => Some(NodeKind::Template(LayoutIterator::new(Axis::Vertical, false))),
            "ITERATION" => Some(NodeKind::Iteration),
            "PRGRM_INTERNAL" => Some(NodeKind::Internal),
            _ => None,
        }
    }

    pub fn is_iteration(&self) -> bool {
        matches!(self, NodeKind::Iteration)
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, NodeKind::Internal)
    }
}

/// One node of the layout tree.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub name: String,
    /// Resolved pixel rect. A deterministic function of the dimensions
    /// plus ancestor/sibling geometry, except transiently during
    /// interactive drag, when it is set directly and back-solved.
    pub rect: Rect,
    pub x: Dimension,
    pub y: Dimension,
    pub w: Dimension,
    pub h: Dimension,
    pub kind: NodeKind,
    pub hidden: bool,
    /// Scroll offsets and momentum for plain overflow containers.
    pub scroll: ScrollPane,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) index: usize,
}

impl LayoutNode {
    fn new(name: String) -> Self {
        Self {
            name,
            rect: Rect::ZERO,
            x: Dimension::rel(0.0),
            y: Dimension::rel(0.0),
            w: Dimension::abs(0.0),
            h: Dimension::abs(0.0),
            kind: NodeKind::Normal,
            hidden: false,
            scroll: ScrollPane::default(),
            parent: None,
            children: Vec::new(),
            index: 0,
        }
    }

    /// Clone the node's own data (name, dimensions, rect, hidden flag)
    /// without links, kind payload, or scroll state.
    pub(crate) fn clone_shell(&self) -> LayoutNode {
        let mut node = LayoutNode::new(self.name.clone());
        node.rect = self.rect;
        node.x = self.x;
        node.y = self.y;
        node.w = self.w;
        node.h = self.h;
        node.hidden = self.hidden;
        node
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Position in the parent's child array.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The node's iterator, if it is a template.
    pub fn iterator(&self) -> Option<&LayoutIterator> {
        match &self.kind {
            NodeKind::Template(it) => Some(it),
            _ => None,
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<LayoutNode>,
}

/// The owning arena of layout nodes.
#[derive(Default)]
pub struct LayoutTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            generation: 0,
            node: None,
        }
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Fallible node access; `None` if the id is stale.
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    /// Fallible mutable node access; `None` if the id is stale.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut LayoutNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn alloc(&mut self, node: LayoutNode) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, id: NodeId) {
        let slot = &mut self.slots[id.index as usize];
        if slot.generation == id.generation && slot.node.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.live -= 1;
        }
    }

    // =====================================================================
    // Creation
    // =====================================================================

    /// Create a detached, empty node.
    pub fn create(&mut self) -> NodeId {
        self.alloc(LayoutNode::new("Lt".to_string()))
    }

    /// Create a root node pinned to a window of `width` x `height`
    /// logical units.
    pub fn create_root(&mut self, width: f32, height: f32) -> NodeId {
        let mut node = LayoutNode::new("main".to_string());
        node.x = Dimension::abs(0.0);
        node.y = Dimension::abs(0.0);
        node.w = Dimension::abs(width);
        node.h = Dimension::abs(height);
        node.rect = Rect::new(0.0, 0.0, width, height);
        self.alloc(node)
    }

    /// Create a new child with default dimensions (positioned a quarter
    /// into the parent, sized to half of it) and attach it.
    pub fn add_child(&mut self, parent: NodeId, scale: f32) -> Result<NodeId, LayoutError> {
        let parent_node = self.get(parent).ok_or(LayoutError::StaleNode)?;
        let logical_w = parent_node.rect.width / scale;
        let logical_h = parent_node.rect.height / scale;
        let name = format!("{}_child{}", parent_node.name, parent_node.children.len() + 1);

        let mut node = LayoutNode::new(name);
        node.x = Dimension::rel(logical_w / 4.0);
        node.y = Dimension::rel(logical_h / 4.0);
        node.w = Dimension::rel(logical_w / 2.0);
        node.h = Dimension::rel(logical_h / 2.0);

        let id = self.alloc(node);
        self.attach(id, parent)?;
        Ok(id)
    }

    /// Add a child whose size on `axis` complements the preceding
    /// sibling's.
    pub fn add_complementary_child(
        &mut self,
        parent: NodeId,
        axis: Axis,
        scale: f32,
    ) -> Result<NodeId, LayoutError> {
        let id = self.add_child(parent, scale)?;
        let node = &mut self[id];
        match axis {
            Axis::Horizontal => node.w = Dimension::complement(),
            Axis::Vertical => node.h = Dimension::complement(),
        }
        Ok(id)
    }

    // =====================================================================
    // Structural mutation
    // =====================================================================

    /// Attach a detached node to a parent, assigning the next sibling
    /// index. Ownership transfers immediately.
    pub(crate) fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), LayoutError> {
        let parent_node = self.get(parent).ok_or(LayoutError::StaleNode)?;
        if parent_node.children.len() >= MAX_CHILDREN {
            return Err(LayoutError::CapacityExceeded {
                kind: "child",
                limit: MAX_CHILDREN,
                name: parent_node.name.clone(),
            });
        }
        let index = parent_node.children.len();
        self[parent].children.push(child);
        let node = &mut self[child];
        node.parent = Some(parent);
        node.index = index;
        Ok(())
    }

    /// Splice a node out of its parent's child array, decrementing
    /// every subsequent sibling's index. The subtree stays alive,
    /// detached.
    pub fn remove_child(&mut self, child: NodeId) -> Result<(), LayoutError> {
        let node = self.get(child).ok_or(LayoutError::StaleNode)?;
        let Some(parent) = node.parent else {
            return Err(LayoutError::NoParent(node.name.clone()));
        };
        let index = node.index;
        if self[parent].children.get(index) != Some(&child) {
            return Err(LayoutError::IndexMismatch(node.name.clone()));
        }
        self[parent].children.remove(index);
        self.renumber_from(parent, index);
        let node = &mut self[child];
        node.parent = None;
        node.index = 0;
        Ok(())
    }

    /// Detach a node and insert it into `parent`'s child array at
    /// `index`, renumbering subsequent siblings upward.
    pub fn insert_child_at(
        &mut self,
        child: NodeId,
        parent: NodeId,
        index: usize,
    ) -> Result<(), LayoutError> {
        if self.get(child).ok_or(LayoutError::StaleNode)?.parent.is_some() {
            self.remove_child(child)?;
        }
        let parent_node = self.get(parent).ok_or(LayoutError::StaleNode)?;
        if parent_node.children.len() >= MAX_CHILDREN {
            return Err(LayoutError::CapacityExceeded {
                kind: "child",
                limit: MAX_CHILDREN,
                name: parent_node.name.clone(),
            });
        }
        let index = index.min(parent_node.children.len());
        self[parent].children.insert(index, child);
        self.renumber_from(parent, index);
        self[child].parent = Some(parent);
        Ok(())
    }

    /// Swap two children of the same parent, preserving both subtrees.
    pub fn swap_children(&mut self, a: NodeId, b: NodeId) -> Result<(), LayoutError> {
        let node_a = self.get(a).ok_or(LayoutError::StaleNode)?;
        let node_b = self.get(b).ok_or(LayoutError::StaleNode)?;
        let (Some(parent), parent_b) = (node_a.parent, node_b.parent) else {
            return Err(LayoutError::NoParent(node_a.name.clone()));
        };
        if parent_b != Some(parent) {
            return Err(LayoutError::NoParent(node_b.name.clone()));
        }
        let (ia, ib) = (node_a.index, node_b.index);
        self[parent].children.swap(ia, ib);
        self[a].index = ib;
        self[b].index = ia;
        Ok(())
    }

    /// Detach a subtree from its current parent (if any) and reattach
    /// it under `new_parent`. The caller resets afterward.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Result<(), LayoutError> {
        if self.get(child).ok_or(LayoutError::StaleNode)?.parent.is_some() {
            self.remove_child(child)?;
        }
        self.attach(child, new_parent)
    }

    /// Permanently destroy a node, its children and its iterations,
    /// splicing it out of its parent's child array.
    ///
    /// Iteration clones are refused: their template's iterator holds
    /// their id, so they only die through `remove_iteration` or with
    /// the template itself. Fails loudly (without mutating) if the
    /// parent's index bookkeeping is inconsistent.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = self.get(id).ok_or(LayoutError::StaleNode)?;
        if node.kind.is_iteration() {
            return Err(LayoutError::IterationOwned(node.name.clone()));
        }
        self.splice_and_release(id)
    }

    /// `destroy` minus the iteration guard, for cleanup paths that
    /// already own the clone they are dropping.
    fn splice_and_release(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = self.get(id).ok_or(LayoutError::StaleNode)?;
        if let Some(parent) = node.parent {
            let index = node.index;
            if self[parent].children.get(index) != Some(&id) {
                return Err(LayoutError::IndexMismatch(node.name.clone()));
            }
            self[parent].children.remove(index);
            self.renumber_from(parent, index);
        }
        self.release_subtree(id);
        Ok(())
    }

    pub(crate) fn release_subtree(&mut self, id: NodeId) {
        let Some(node) = self.get_mut(id) else { return };
        let children = std::mem::take(&mut node.children);
        let kind = std::mem::replace(&mut node.kind, NodeKind::Normal);
        if let NodeKind::Template(it) = kind {
            for iteration in it.iterations {
                self.release_subtree(iteration);
            }
        }
        for child in children {
            self.release_subtree(child);
        }
        self.release(id);
    }

    fn renumber_from(&mut self, parent: NodeId, start: usize) {
        let children: Vec<NodeId> = self[parent].children[start..].to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self[child].index = start + offset;
        }
    }

    // =====================================================================
    // Copy
    // =====================================================================

    /// Deep-clone a subtree (dimensions, name, kind, hidden flag),
    /// optionally attaching the clone to `new_parent`. A template's
    /// iterator is re-created with cloned iterations.
    pub fn copy(&mut self, src: NodeId, new_parent: Option<NodeId>) -> Result<NodeId, LayoutError> {
        let src_node = self.get(src).ok_or(LayoutError::StaleNode)?;
        let mut clone = src_node.clone_shell();
        clone.kind = match &src_node.kind {
            NodeKind::Iteration => NodeKind::Iteration,
            NodeKind::Internal => NodeKind::Internal,
            // Template payload is rebuilt below, after children.
            NodeKind::Normal | NodeKind::Template(_) => NodeKind::Normal,
        };
        let src_children = src_node.children.clone();
        let iterator = src_node.iterator().map(|it| {
            (it.axis, it.scrollable, it.iterations.clone())
        });

        let id = self.alloc(clone);
        if let Some(parent) = new_parent {
            if let Err(err) = self.attach(id, parent) {
                self.release_subtree(id);
                return Err(err);
            }
        }
        for child in src_children {
            if let Err(err) = self.copy(child, Some(id)) {
                self.splice_and_release(id).ok();
                return Err(err);
            }
        }
        if let Some((axis, scrollable, iterations)) = iterator {
            let mut it = LayoutIterator::new(axis, scrollable);
            for iteration in iterations {
                match self.copy(iteration, None) {
                    Ok(clone_id) => {
                        self[clone_id].kind = NodeKind::Iteration;
                        it.iterations.push(clone_id);
                    }
                    Err(err) => {
                        for orphan in it.iterations {
                            self.release_subtree(orphan);
                        }
                        self.splice_and_release(id).ok();
                        return Err(err);
                    }
                }
            }
            self[id].kind = NodeKind::Template(it);
        }
        Ok(id)
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// First direct child with the given name.
    pub fn find_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self[child].name == name)
    }

    /// First node named `name` in document order, starting at (and
    /// including) `from`.
    pub fn find_descendant_by_name(&self, from: NodeId, name: &str) -> Option<NodeId> {
        if self[from].name == name {
            return Some(from);
        }
        self[from]
            .children
            .clone()
            .into_iter()
            .find_map(|child| self.find_descendant_by_name(child, name))
    }

    /// The next or previous sibling, if any.
    pub fn sibling(&self, id: NodeId, direction: i32) -> Option<NodeId> {
        let node = &self[id];
        let parent = node.parent?;
        let siblings = &self[parent].children;
        let index = if direction >= 0 {
            node.index.checked_add(1)?
        } else {
            node.index.checked_sub(1)?
        };
        siblings.get(index).copied()
    }

    /// Walk parent links to the root of `id`'s tree.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self[current].parent {
            current = parent;
        }
        current
    }

    /// The deepest node whose rect contains `point`, preferring later
    /// (higher-painted) children.
    pub fn deepest_node_at_point(&self, from: NodeId, point: Point) -> Option<NodeId> {
        if !self[from].rect.contains(point) {
            return None;
        }
        let mut deepest = from;
        for &child in &self[from].children {
            if let Some(hit) = self.deepest_node_at_point(child, point) {
                deepest = hit;
            }
        }
        Some(deepest)
    }

    /// Verify that every node's `index` matches its position in the
    /// parent's child array, recursively.
    pub fn check_indices(&self, from: NodeId) -> Result<(), LayoutError> {
        for (position, &child) in self[from].children.iter().enumerate() {
            let node = &self[child];
            if node.index != position || node.parent != Some(from) {
                return Err(LayoutError::IndexMismatch(node.name.clone()));
            }
            self.check_indices(child)?;
        }
        Ok(())
    }

    /// Build per-axis resolution contexts (parent and preceding-sibling
    /// spans) for a node: `(horizontal, vertical)`.
    pub(crate) fn axis_contexts(&self, id: NodeId, scale: f32) -> (AxisContext, AxisContext) {
        let node = &self[id];
        let parent_rect = node.parent.map(|p| self[p].rect);
        let prev_rect = node.parent.and_then(|p| {
            let index = node.index.checked_sub(1)?;
            self[p].children.get(index).map(|&prev| self[prev].rect)
        });
        let horizontal = AxisContext::new(
            scale,
            parent_rect.map(|r| Span::new(r.x, r.width)),
            prev_rect.map(|r| Span::new(r.x, r.width)),
        );
        let vertical = AxisContext::new(
            scale,
            parent_rect.map(|r| Span::new(r.y, r.height)),
            prev_rect.map(|r| Span::new(r.y, r.height)),
        );
        (horizontal, vertical)
    }
}

impl Index<NodeId> for LayoutTree {
    type Output = LayoutNode;

    /// Panics if the id is stale. Public entry points validate ids
    /// with [`LayoutTree::get`] first.
    fn index(&self, id: NodeId) -> &LayoutNode {
        self.get(id).expect("stale NodeId")
    }
}

impl IndexMut<NodeId> for LayoutTree {
    fn index_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        self.get_mut(id).expect("stale NodeId")
    }
}
