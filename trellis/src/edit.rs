//! Interactive editing: drags that write pixel geometry back into
//! declarative dimensions.
//!
//! Every entry point follows the same shape: optionally snap the raw
//! pointer coordinate, write it into the node's rect, back-solve each
//! invertible dimension from the new rect, then reset the subtree so
//! descendants follow. Dimensions that cannot be inverted (COMPLEMENT,
//! PAD) keep their stored value and reassert themselves on the reset.
//!
//! Iteration clones are not editable; their geometry belongs to the
//! template, and every entry point ignores them.

use crate::context::LayoutContext;
use crate::dimension::{back_solve_position, back_solve_size};
use crate::primitives::{Corner, Edge, Point, Size};
use crate::tree::{LayoutTree, NodeId};

impl LayoutTree {
    /// Drag one edge of a node to a pixel coordinate. The opposite
    /// edge stays put.
    pub fn set_edge(&mut self, id: NodeId, edge: Edge, coordinate: f32, snap: bool, ctx: &LayoutContext) {
        let Some(node) = self.get(id) else {
            return;
        };
        if node.kind.is_iteration() {
            return;
        }
        let target = if snap {
            let root = self.root_of(id);
            if edge.is_horizontal() {
                self.check_snap_y(root, coordinate)
            } else {
                self.check_snap_x(root, coordinate)
            }
        } else {
            coordinate
        };

        let rect = &mut self[id].rect;
        match edge {
            Edge::Left => {
                let right = rect.right();
                rect.x = target;
                rect.width = right - target;
            }
            Edge::Right => rect.width = target - rect.x,
            Edge::Top => {
                let bottom = rect.bottom();
                rect.y = target;
                rect.height = bottom - target;
            }
            Edge::Bottom => rect.height = target - rect.y,
        }
        self.set_values_from_rect(id, ctx);
        self.reset(id, ctx);
    }

    /// Drag a corner: both meeting edges move to the pointer.
    pub fn set_corner(&mut self, id: NodeId, corner: Corner, point: Point, snap: bool, ctx: &LayoutContext) {
        let (vertical, horizontal) = corner.edges();
        self.set_edge(id, vertical, point.x, snap, ctx);
        self.set_edge(id, horizontal, point.y, snap, ctx);
    }

    /// Move a node so its origin lands on `point`, keeping its size.
    /// With snapping, the near edge is tried first and the far edge
    /// only when the near one found nothing.
    pub fn set_position(&mut self, id: NodeId, point: Point, snap: bool, ctx: &LayoutContext) {
        let Some(node) = self.get(id) else {
            return;
        };
        if node.kind.is_iteration() {
            return;
        }
        let size = node.rect.size();
        let (mut x, mut y) = (point.x, point.y);
        if snap {
            let root = self.root_of(id);
            let left = self.check_snap_x(root, x);
            if left != x {
                x = left;
            } else {
                x = self.check_snap_x(root, x + size.width) - size.width;
            }
            let top = self.check_snap_y(root, y);
            if top != y {
                y = top;
            } else {
                y = self.check_snap_y(root, y + size.height) - size.height;
            }
        }
        let rect = &mut self[id].rect;
        rect.x = x;
        rect.y = y;
        self.set_values_from_rect(id, ctx);
        self.reset(id, ctx);
    }

    /// Move a node by a pixel delta.
    pub fn translate(&mut self, id: NodeId, dx: f32, dy: f32, snap: bool, ctx: &LayoutContext) {
        let Some(node) = self.get(id) else {
            return;
        };
        let origin = node.rect.origin();
        self.set_position(id, Point::new(origin.x + dx, origin.y + dy), snap, ctx);
    }

    /// Resize a node to a pixel size, keeping its origin. Snapping
    /// applies to the moving right and bottom edges.
    pub fn resize(&mut self, id: NodeId, size: Size, snap: bool, ctx: &LayoutContext) {
        let Some(node) = self.get(id) else {
            return;
        };
        let rect = node.rect;
        self.set_edge(id, Edge::Right, rect.x + size.width, snap, ctx);
        self.set_edge(id, Edge::Bottom, rect.y + size.height, snap, ctx);
    }

    /// Back-solve every invertible dimension from the node's current
    /// rect, so the declarative rules reproduce it on the next reset.
    /// Non-invertible dimensions keep their stored value.
    pub fn set_values_from_rect(&mut self, id: NodeId, ctx: &LayoutContext) {
        let (hctx, vctx) = self.axis_contexts(id, ctx.scale);
        let node = &self[id];
        let rect = node.rect;
        let (xk, yk, wk, hk) = (node.x.kind, node.y.kind, node.w.kind, node.h.kind);

        if let Some(value) = back_solve_position(xk, rect.x, rect.width, &hctx) {
            self[id].x.value = value;
        }
        if let Some(value) = back_solve_position(yk, rect.y, rect.height, &vctx) {
            self[id].y.value = value;
        }
        if let Some(value) = back_solve_size(wk, rect.width, &hctx) {
            self[id].w.value = value;
        }
        if let Some(value) = back_solve_size(hk, rect.height, &vctx) {
            self[id].h.value = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Dimension;
    use crate::primitives::Rect;

    fn ctx() -> LayoutContext {
        LayoutContext::new(1.0, Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    fn abs_child(tree: &mut LayoutTree, parent: NodeId, x: f32, y: f32, w: f32, h: f32) -> NodeId {
        let id = tree.add_child(parent, 1.0).unwrap();
        let node = &mut tree[id];
        node.x = Dimension::abs(x);
        node.y = Dimension::abs(y);
        node.w = Dimension::abs(w);
        node.h = Dimension::abs(h);
        id
    }

    #[test]
    fn set_edge_right_back_solves_width() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = abs_child(&mut tree, root, 10.0, 10.0, 100.0, 50.0);
        tree.force_reset(root, &ctx());

        tree.set_edge(child, Edge::Right, 160.0, false, &ctx());
        assert_eq!(tree[child].w, Dimension::abs(150.0));
        assert_eq!(tree[child].rect, Rect::new(10.0, 10.0, 150.0, 50.0));
    }

    #[test]
    fn set_edge_left_keeps_the_far_edge() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = abs_child(&mut tree, root, 100.0, 10.0, 100.0, 50.0);
        tree.force_reset(root, &ctx());

        tree.set_edge(child, Edge::Left, 80.0, false, &ctx());
        assert_eq!(tree[child].rect.x, 80.0);
        assert_eq!(tree[child].rect.right(), 200.0);
    }

    #[test]
    fn set_edge_snaps_to_a_sibling() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = abs_child(&mut tree, root, 10.0, 10.0, 100.0, 50.0);
        let _sibling = abs_child(&mut tree, root, 200.0, 10.0, 100.0, 50.0);
        tree.force_reset(root, &ctx());

        tree.set_edge(child, Edge::Right, 195.0, true, &ctx());
        assert_eq!(tree[child].rect.right(), 200.0);
        assert_eq!(tree[child].w, Dimension::abs(190.0));
    }

    #[test]
    fn set_corner_moves_both_edges() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = abs_child(&mut tree, root, 10.0, 10.0, 100.0, 50.0);
        tree.force_reset(root, &ctx());

        tree.set_corner(child, Corner::BottomRight, Point::new(250.0, 140.0), false, &ctx());
        assert_eq!(tree[child].rect, Rect::new(10.0, 10.0, 240.0, 130.0));
    }

    #[test]
    fn translate_back_solves_rel_offsets() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = tree.add_child(root, 1.0).unwrap();
        tree[child].x = Dimension::rel(10.0);
        tree[child].y = Dimension::rel(10.0);
        tree[child].w = Dimension::abs(100.0);
        tree[child].h = Dimension::abs(50.0);
        tree.force_reset(root, &ctx());

        tree.translate(child, 30.0, 20.0, false, &ctx());
        assert_eq!(tree[child].x, Dimension::rel(40.0));
        assert_eq!(tree[child].y, Dimension::rel(30.0));
        assert_eq!(tree[child].rect.x, 40.0);
    }

    #[test]
    fn set_position_snaps_the_far_edge_when_the_near_misses() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = abs_child(&mut tree, root, 10.0, 300.0, 45.0, 45.0);
        let _anchor = abs_child(&mut tree, root, 200.0, 300.0, 100.0, 45.0);
        tree.force_reset(root, &ctx());

        // The left edge at 150 snaps to nothing; the right edge at 195
        // catches the anchor's left edge.
        tree.set_position(child, Point::new(150.0, 300.0), true, &ctx());
        assert_eq!(tree[child].rect.x, 155.0);
        assert_eq!(tree[child].rect.right(), 200.0);
    }

    #[test]
    fn resize_sets_both_extents() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = abs_child(&mut tree, root, 10.0, 10.0, 100.0, 50.0);
        tree.force_reset(root, &ctx());

        tree.resize(child, Size::new(300.0, 80.0), false, &ctx());
        assert_eq!(tree[child].rect.size(), Size::new(300.0, 80.0));
        assert_eq!(tree[child].rect.origin(), Point::new(10.0, 10.0));
    }

    #[test]
    fn scale_dimensions_back_solve_to_proportions() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = tree.add_child(root, 1.0).unwrap();
        tree[child].x = Dimension::scale(0.0);
        tree[child].y = Dimension::scale(0.0);
        tree[child].w = Dimension::scale(0.25);
        tree[child].h = Dimension::scale(0.25);
        tree.force_reset(root, &ctx());

        tree.resize(child, Size::new(400.0, 300.0), false, &ctx());
        assert_eq!(tree[child].w, Dimension::scale(0.5));
        assert_eq!(tree[child].h, Dimension::scale(0.5));
    }

    #[test]
    fn children_follow_an_edit() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let child = abs_child(&mut tree, root, 10.0, 10.0, 100.0, 50.0);
        let inner = tree.add_child(child, 1.0).unwrap();
        tree[inner].x = Dimension::rel(5.0);
        tree[inner].y = Dimension::rel(5.0);
        tree[inner].w = Dimension::abs(10.0);
        tree[inner].h = Dimension::abs(10.0);
        tree.force_reset(root, &ctx());

        tree.translate(child, 100.0, 0.0, false, &ctx());
        assert_eq!(tree[inner].rect.x, tree[child].rect.x + 5.0);
    }

    #[test]
    fn iteration_clones_are_not_editable() {
        use crate::dimension::Axis;

        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let template = abs_child(&mut tree, root, 0.0, 0.0, 800.0, 40.0);
        let clone = tree.add_iteration(template, Axis::Vertical, false).unwrap();
        tree.force_reset(root, &ctx());

        let before = tree[clone].rect;
        tree.set_edge(clone, Edge::Right, 500.0, false, &ctx());
        tree.translate(clone, 50.0, 50.0, false, &ctx());
        tree.resize(clone, Size::new(10.0, 10.0), false, &ctx());
        assert_eq!(tree[clone].rect, before);
    }

    #[test]
    fn non_invertible_dimensions_reassert_on_reset() {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let _first = abs_child(&mut tree, root, 0.0, 0.0, 800.0, 200.0);
        let fill = tree.add_child(root, 1.0).unwrap();
        tree[fill].x = Dimension::rel(0.0);
        tree[fill].y = Dimension::stack(0.0);
        tree[fill].w = Dimension::abs(800.0);
        tree[fill].h = Dimension::complement();
        tree.force_reset(root, &ctx());
        assert_eq!(tree[fill].rect.height, 400.0);

        // Dragging the bottom edge of a COMPLEMENT extent cannot be
        // stored; the reset snaps it back.
        tree.set_edge(fill, Edge::Bottom, 300.0, false, &ctx());
        assert_eq!(tree[fill].h, Dimension::complement());
        assert_eq!(tree[fill].rect.height, 400.0);
    }
}
