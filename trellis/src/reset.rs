//! Layout resolution traversals.
//!
//! Two traversals share one resolution step ([`LayoutTree::resolve_rect`]):
//!
//! - [`LayoutTree::reset`] recurses, but prunes subtrees whose resolved
//!   rect misses the padded viewport. Cheap enough to run every frame.
//! - [`LayoutTree::force_reset`] visits every node unconditionally and
//!   walks parent/index links instead of recursing, so arbitrarily deep
//!   trees cannot overflow the call stack. Used after structural
//!   mutation and window resizes.
//!
//! Both resolve sizes before positions (REVREL and PAD read the node's
//! own extent) and resolve siblings in array order (STACK and
//! COMPLEMENT read the preceding sibling's finished rect).

use crate::context::LayoutContext;
use crate::dimension::{resolve_position, resolve_size, Axis, DimKind, Dimension};
use crate::primitives::{Point, Rect};
use crate::tree::{LayoutTree, NodeId, NodeKind};

impl LayoutTree {
    /// Resolve one node's rect from its dimensions and current
    /// geometric context. Children are untouched.
    pub(crate) fn resolve_rect(&mut self, id: NodeId, ctx: &LayoutContext) {
        let (hctx, vctx) = self.axis_contexts(id, ctx.scale);
        let node = &self[id];
        let (x_dim, y_dim, w_dim, h_dim) = (node.x, node.y, node.w, node.h);

        let width = resolve_size(w_dim, x_dim, &hctx);
        let height = resolve_size(h_dim, y_dim, &vctx);
        let mut x = resolve_position(x_dim, width, &hctx);
        let mut y = resolve_position(y_dim, height, &vctx);

        if let Some(parent) = node.parent {
            // Parent scroll shifts everything positioned inside the
            // parent. ABS coordinates ignore it, and a STACK position
            // chained off a preceding sibling inherits the shift
            // through that sibling's already-shifted rect.
            let chained = hctx.prev_sibling.is_some();
            let pane = self[parent].scroll;
            if x_dim.kind != DimKind::Abs && !(x_dim.kind == DimKind::Stack && chained) {
                x -= pane.offset_h;
            }
            if y_dim.kind != DimKind::Abs && !(y_dim.kind == DimKind::Stack && chained) {
                y -= pane.offset_v;
            }
        }
        self[id].rect = Rect::new(x, y, width, height);
    }

    /// Recursive, viewport-culled reset of a subtree. The node's own
    /// rect is always resolved; children are only visited while the
    /// resolved rect intersects the viewport padded by the cull margin.
    pub fn reset(&mut self, id: NodeId, ctx: &LayoutContext) {
        if self.get(id).is_none() {
            return;
        }
        self.resolve_rect(id, ctx);
        let padded = ctx.padded_viewport();
        if !self[id].rect.intersects(&padded) {
            return;
        }
        let children = self[id].children().to_vec();
        for child in children {
            self.reset(child, ctx);
        }
        if self[id].iterator().is_some() {
            for clone in self.place_iterations(id) {
                if !self[clone].rect.intersects(&padded) {
                    continue;
                }
                let clone_children = self[clone].children().to_vec();
                for child in clone_children {
                    self.reset(child, ctx);
                }
            }
        }
    }

    /// Unconditional reset of a subtree, without recursion.
    pub fn force_reset(&mut self, root: NodeId, ctx: &LayoutContext) {
        if self.get(root).is_none() {
            return;
        }
        // Iteration clone subtrees hang off iterators rather than
        // child arrays, so they queue up as further walk roots.
        let mut pending = vec![root];
        while let Some(subtree) = pending.pop() {
            self.force_walk(subtree, ctx, &mut pending);
        }
    }

    /// Resolve every node under `root` in document order by walking
    /// parent/index links: descend to the first child, else climb to
    /// the next sibling of the nearest ancestor.
    fn force_walk(&mut self, root: NodeId, ctx: &LayoutContext, pending: &mut Vec<NodeId>) {
        let mut current = root;
        loop {
            self.resolve_rect(current, ctx);
            if self[current].iterator().is_some() {
                for clone in self.place_iterations(current) {
                    pending.extend(self[clone].children().iter().copied());
                }
            }
            if let Some(&first) = self[current].children().first() {
                current = first;
                continue;
            }
            loop {
                if current == root {
                    return;
                }
                let node = &self[current];
                let Some(parent) = node.parent() else {
                    return;
                };
                let next = node.index() + 1;
                if let Some(&sibling) = self[parent].children().get(next) {
                    current = sibling;
                    break;
                }
                current = parent;
            }
        }
    }

    /// Stamp a template's iteration clones along the iterator axis:
    /// clone `i` sits at the template rect translated by `i × step`
    /// minus the scroll offset, where `step` is the template's extent
    /// plus its offset from the parent's near edge. Updates the
    /// iterator's cached total extent and returns the clone ids;
    /// clone rects are assigned, their children still need resolving.
    fn place_iterations(&mut self, template: NodeId) -> Vec<NodeId> {
        let node = &self[template];
        let Some(it) = node.iterator() else {
            return Vec::new();
        };
        let Some(parent) = node.parent() else {
            tracing::warn!(name = %node.name, "template has no parent; iterations not placed");
            return Vec::new();
        };
        let axis = it.axis;
        let offset = it.scroll_offset;
        let clones = it.iterations().to_vec();
        let base = node.rect;
        let parent_rect = self[parent].rect;
        let step = match axis {
            Axis::Vertical => base.height + (base.y - parent_rect.y),
            Axis::Horizontal => base.width + (base.x - parent_rect.x),
        };

        if let NodeKind::Template(it) = &mut self[template].kind {
            it.total_extent = clones.len() as f32 * step;
        }

        for (i, &clone) in clones.iter().enumerate() {
            let shift = i as f32 * step - offset;
            self[clone].rect = match axis {
                Axis::Vertical => base.translate(Point::new(0.0, shift)),
                Axis::Horizontal => base.translate(Point::new(shift, 0.0)),
            };
        }
        clones
    }

    /// Re-pin the root's fixed dimensions to a new window size and
    /// force-reset the whole tree.
    pub fn reset_from_window(
        &mut self,
        root: NodeId,
        width: f32,
        height: f32,
        ctx: &LayoutContext,
    ) {
        let Some(node) = self.get_mut(root) else {
            return;
        };
        node.w = Dimension::abs(width / ctx.scale);
        node.h = Dimension::abs(height / ctx.scale);
        self.force_reset(root, ctx);
    }
}
