//! Template iteration: stamping a subtree out repeatedly along an axis.
//!
//! A template node owns a [`LayoutIterator`], which owns an ordered
//! list of ITERATION clone subtrees. Clones are created and destroyed
//! as list operations, never reordered; their placement is derived
//! purely from list order on every reset, so removing a clone from the
//! middle repositions the remainder like an ordinary list deletion.

use crate::dimension::Axis;
use crate::error::LayoutError;
use crate::scroll::{apply_scroll, step_momentum};
use crate::tree::{LayoutTree, NodeId, NodeKind};

/// Ceiling on iterations per template. Generous; exceeding it is a
/// recoverable [`LayoutError::CapacityExceeded`].
pub const MAX_ITERATIONS: usize = 256;

/// Iteration state owned by a template node.
#[derive(Debug, Clone)]
pub struct LayoutIterator {
    /// Which way clones are stamped out.
    pub axis: Axis,
    /// Whether the clone strip responds to scroll input.
    pub scrollable: bool,
    /// Ordered clone subtrees, owned through the arena.
    pub(crate) iterations: Vec<NodeId>,
    pub scroll_offset: f32,
    pub scroll_momentum: f32,
    /// Cached strip length along the axis, updated on every placement.
    pub(crate) total_extent: f32,
}

impl LayoutIterator {
    pub fn new(axis: Axis, scrollable: bool) -> Self {
        Self {
            axis,
            scrollable,
            iterations: Vec::new(),
            scroll_offset: 0.0,
            scroll_momentum: 0.0,
            total_extent: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    pub fn iterations(&self) -> &[NodeId] {
        &self.iterations
    }

    /// Strip length along the axis: `len × (template size + offset)`.
    pub fn total_extent(&self) -> f32 {
        self.total_extent
    }

    /// Apply a scroll delta along the iterator axis. Same clamp/seed
    /// contract as plain container scrolling.
    pub fn scroll(&mut self, delta: f32, dynamic: bool) {
        apply_scroll(
            &mut self.scroll_offset,
            &mut self.scroll_momentum,
            delta,
            self.total_extent,
            dynamic,
        );
    }

    /// Advance one frame of inertial scrolling; returns whether motion
    /// should continue.
    pub fn scroll_step(&mut self) -> bool {
        step_momentum(
            &mut self.scroll_offset,
            &mut self.scroll_momentum,
            self.total_extent,
        )
    }
}

impl LayoutTree {
    /// Append one iteration clone to a node, lazily creating its
    /// iterator on first use (which also turns the node into a
    /// template). Returns the clone's id.
    ///
    /// `axis` and `scrollable` only take effect when the iterator is
    /// first created; an existing iterator keeps its configuration.
    pub fn add_iteration(
        &mut self,
        template: NodeId,
        axis: Axis,
        scrollable: bool,
    ) -> Result<NodeId, LayoutError> {
        let node = self.get(template).ok_or(LayoutError::StaleNode)?;
        match &node.kind {
            NodeKind::Normal => {
                let it = LayoutIterator::new(axis, scrollable);
                self[template].kind = NodeKind::Template(it);
            }
            NodeKind::Template(it) => {
                if it.iterations.len() >= MAX_ITERATIONS {
                    return Err(LayoutError::CapacityExceeded {
                        kind: "iteration",
                        limit: MAX_ITERATIONS,
                        name: node.name.clone(),
                    });
                }
            }
            NodeKind::Iteration | NodeKind::Internal => {
                return Err(LayoutError::NotTemplate(node.name.clone()));
            }
        }

        let clone = self.copy_as_iteration(template)?;
        match &mut self[template].kind {
            NodeKind::Template(it) => it.iterations.push(clone),
            // add_iteration promoted the node above; nothing else can
            // have demoted it within this call.
            _ => unreachable!("template demoted during add_iteration"),
        }
        Ok(clone)
    }

    /// Destroy the last iteration clone. An empty iterator is removed
    /// and the node reverts to a normal node.
    pub fn remove_iteration(&mut self, template: NodeId) -> Result<(), LayoutError> {
        let node = self.get_mut(template).ok_or(LayoutError::StaleNode)?;
        let NodeKind::Template(it) = &mut node.kind else {
            return Err(LayoutError::NotTemplate(node.name.clone()));
        };
        let Some(last) = it.iterations.pop() else {
            return Ok(());
        };
        let emptied = it.iterations.is_empty();
        self.release_subtree(last);
        if emptied {
            self[template].kind = NodeKind::Normal;
        }
        Ok(())
    }

    /// Destroy the iteration clone at `index`. Remaining clones keep
    /// their list order and are repositioned by the next reset.
    pub fn remove_iteration_at(
        &mut self,
        template: NodeId,
        index: usize,
    ) -> Result<(), LayoutError> {
        let node = self.get_mut(template).ok_or(LayoutError::StaleNode)?;
        let NodeKind::Template(it) = &mut node.kind else {
            return Err(LayoutError::NotTemplate(node.name.clone()));
        };
        if index >= it.iterations.len() {
            return Ok(());
        }
        let removed = it.iterations.remove(index);
        let emptied = it.iterations.is_empty();
        self.release_subtree(removed);
        if emptied {
            self[template].kind = NodeKind::Normal;
        }
        Ok(())
    }

    /// Deep-clone the template subtree as an iteration: same
    /// dimensions and children, marked ITERATION, without the
    /// template's own iterator.
    fn copy_as_iteration(&mut self, template: NodeId) -> Result<NodeId, LayoutError> {
        let src = self.get(template).ok_or(LayoutError::StaleNode)?;
        let mut shell = src.clone_shell();
        shell.kind = NodeKind::Iteration;
        let src_children = src.children.clone();

        let id = self.alloc(shell);
        for child in src_children {
            if let Err(err) = self.copy(child, Some(id)) {
                self.release_subtree(id);
                return Err(err);
            }
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LayoutContext;
    use crate::dimension::Dimension;
    use crate::primitives::Rect;

    fn ctx() -> LayoutContext {
        LayoutContext::new(1.0, Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    fn template_tree() -> (LayoutTree, NodeId, NodeId) {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let template = tree.add_child(root, 1.0).unwrap();
        tree[template].x = Dimension::rel(0.0);
        tree[template].y = Dimension::rel(0.0);
        tree[template].w = Dimension::abs(800.0);
        tree[template].h = Dimension::abs(40.0);
        (tree, root, template)
    }

    #[test]
    fn add_iteration_promotes_to_template() {
        let (mut tree, _root, template) = template_tree();
        assert!(tree[template].iterator().is_none());
        let clone = tree.add_iteration(template, Axis::Vertical, false).unwrap();
        assert!(matches!(tree[clone].kind, NodeKind::Iteration));
        assert_eq!(tree[template].iterator().unwrap().len(), 1);
    }

    #[test]
    fn iteration_clones_template_children() {
        let (mut tree, _root, template) = template_tree();
        let inner = tree.add_child(template, 1.0).unwrap();
        tree[inner].name = "label".to_string();

        let clone = tree.add_iteration(template, Axis::Vertical, false).unwrap();
        let cloned_inner = tree.find_by_name(clone, "label").unwrap();
        assert_ne!(cloned_inner, inner);
        // The clone root carries no iterator of its own.
        assert!(tree[clone].iterator().is_none());
    }

    #[test]
    fn remove_last_iteration_reverts_to_normal() {
        let (mut tree, _root, template) = template_tree();
        let a = tree.add_iteration(template, Axis::Vertical, false).unwrap();
        let b = tree.add_iteration(template, Axis::Vertical, false).unwrap();

        tree.remove_iteration(template).unwrap();
        assert!(tree.get(b).is_none());
        assert_eq!(tree[template].iterator().unwrap().len(), 1);

        tree.remove_iteration(template).unwrap();
        assert!(tree.get(a).is_none());
        assert!(matches!(tree[template].kind, NodeKind::Normal));
    }

    #[test]
    fn remove_iteration_at_keeps_order() {
        let (mut tree, _root, template) = template_tree();
        let a = tree.add_iteration(template, Axis::Vertical, false).unwrap();
        let b = tree.add_iteration(template, Axis::Vertical, false).unwrap();
        let c = tree.add_iteration(template, Axis::Vertical, false).unwrap();

        tree.remove_iteration_at(template, 1).unwrap();
        assert!(tree.get(b).is_none());
        assert_eq!(tree[template].iterator().unwrap().iterations(), &[a, c]);
    }

    #[test]
    fn iteration_capacity_is_recoverable() {
        let (mut tree, _root, template) = template_tree();
        for _ in 0..MAX_ITERATIONS {
            tree.add_iteration(template, Axis::Vertical, false).unwrap();
        }
        let err = tree.add_iteration(template, Axis::Vertical, false);
        assert!(matches!(err, Err(LayoutError::CapacityExceeded { .. })));
        // Tree is still usable.
        assert_eq!(tree[template].iterator().unwrap().len(), MAX_ITERATIONS);
    }

    #[test]
    fn iterator_scroll_clamps_to_extent() {
        let (mut tree, _root, template) = template_tree();
        for _ in 0..3 {
            tree.add_iteration(template, Axis::Vertical, true).unwrap();
        }
        tree.force_reset(tree.root_of(template), &ctx());

        tree.scroll(template, 0.0, 5000.0, false);
        let it = tree[template].iterator().unwrap();
        assert_eq!(it.scroll_offset, it.total_extent());

        tree.scroll(template, 0.0, -9000.0, false);
        assert_eq!(tree[template].iterator().unwrap().scroll_offset, 0.0);
    }

    #[test]
    fn iterator_momentum_terminates_within_bounds() {
        let (mut tree, _root, template) = template_tree();
        for _ in 0..4 {
            tree.add_iteration(template, Axis::Vertical, true).unwrap();
        }
        tree.force_reset(tree.root_of(template), &ctx());
        tree.scroll(template, 0.0, 6.0, true);

        let mut steps = 0;
        while tree.scroll_step(template) {
            steps += 1;
            assert!(steps < 100, "inertia never settled");
            let it = tree[template].iterator().unwrap();
            assert!(it.scroll_offset >= 0.0);
            assert!(it.scroll_offset <= it.total_extent());
        }
        assert_eq!(tree[template].iterator().unwrap().scroll_momentum, 0.0);
    }

    #[test]
    fn iteration_clones_refuse_direct_destruction() {
        let (mut tree, root, template) = template_tree();
        let clone = tree.add_iteration(template, Axis::Vertical, false).unwrap();

        assert!(matches!(
            tree.destroy(clone),
            Err(LayoutError::IterationOwned(_))
        ));
        // The iterator still owns a live clone and resets stay sound.
        assert!(tree.get(clone).is_some());
        tree.force_reset(root, &ctx());
        assert_eq!(tree[template].iterator().unwrap().len(), 1);

        tree.remove_iteration(template).unwrap();
        assert!(tree.get(clone).is_none());
    }

    #[test]
    fn destroying_template_destroys_iterations() {
        let (mut tree, _root, template) = template_tree();
        let a = tree.add_iteration(template, Axis::Vertical, false).unwrap();
        let b = tree.add_iteration(template, Axis::Vertical, false).unwrap();
        tree.destroy(template).unwrap();
        assert!(tree.get(a).is_none());
        assert!(tree.get(b).is_none());
    }
}
