//! Edge-snap assist for interactive dragging.
//!
//! While an edge or node is dragged, the raw pointer coordinate is
//! checked against every resolved edge of matching orientation in the
//! tree. The nearest edge strictly within [`SNAP_TOLERANCE`] wins and
//! replaces the raw coordinate; otherwise the coordinate passes
//! through unchanged.

use crate::tree::{LayoutTree, NodeId};

/// Pixel distance below which a dragged coordinate snaps to an
/// existing edge. A candidate exactly this far away does not snap.
pub const SNAP_TOLERANCE: f32 = 7.0;

impl LayoutTree {
    /// Snap an x coordinate to the nearest vertical edge (left or
    /// right side of any node) within tolerance, searching the whole
    /// tree under `root`.
    pub fn check_snap_x(&self, root: NodeId, x: f32) -> f32 {
        let mut best = (f32::INFINITY, x);
        self.collect_snap(root, x, true, &mut best);
        best.1
    }

    /// Snap a y coordinate to the nearest horizontal edge (top or
    /// bottom side of any node) within tolerance.
    pub fn check_snap_y(&self, root: NodeId, y: f32) -> f32 {
        let mut best = (f32::INFINITY, y);
        self.collect_snap(root, y, false, &mut best);
        best.1
    }

    /// Depth-first candidate search. Internal and iteration subtrees
    /// never attract snaps. A strictly smaller distance replaces the
    /// best candidate, so the first-found edge keeps ties; an exactly
    /// coincident edge is not a snap at all.
    fn collect_snap(&self, from: NodeId, target: f32, vertical_edges: bool, best: &mut (f32, f32)) {
        let node = &self[from];
        if node.kind.is_internal() || node.kind.is_iteration() {
            return;
        }
        let edges = if vertical_edges {
            [node.rect.x, node.rect.right()]
        } else {
            [node.rect.y, node.rect.bottom()]
        };
        for edge in edges {
            let dist = (edge - target).abs();
            if dist != 0.0 && dist < SNAP_TOLERANCE && dist < best.0 {
                *best = (dist, edge);
            }
        }
        for &child in node.children() {
            self.collect_snap(child, target, vertical_edges, best);
        }
    }
}
