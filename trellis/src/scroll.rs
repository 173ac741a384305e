//! Momentum scrolling for plain overflow containers.
//!
//! The decay/clamp contract here is shared with iterator scrolling
//! (`iter.rs`): momentum loses one unit of magnitude per frame, the
//! offset stays inside `[0, max]`, and hitting either bound zeroes the
//! momentum and stops inertia.

use crate::dimension::Axis;
use crate::tree::{LayoutTree, NodeId, NodeKind};

/// Scroll offsets and momentum for one node acting as a simple
/// overflow container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollPane {
    pub offset_h: f32,
    pub offset_v: f32,
    pub momentum_h: f32,
    pub momentum_v: f32,
}

/// Apply a scroll delta to an offset, clamping into `[0, max]`.
/// Hitting a bound zeroes the momentum; `dynamic` seeds the momentum
/// with the delta so inertia continues on subsequent frames.
pub(crate) fn apply_scroll(
    offset: &mut f32,
    momentum: &mut f32,
    delta: f32,
    max: f32,
    dynamic: bool,
) {
    if dynamic {
        *momentum = delta;
    }
    *offset += delta;
    if *offset <= 0.0 {
        *offset = 0.0;
        *momentum = 0.0;
    } else if *offset >= max {
        *offset = max;
        *momentum = 0.0;
    }
}

/// Advance one frame of inertial scrolling. Returns whether motion
/// should continue.
pub(crate) fn step_momentum(offset: &mut f32, momentum: &mut f32, max: f32) -> bool {
    if *momentum == 0.0 {
        return false;
    }
    // Decay magnitude by one unit per frame, stopping exactly at zero.
    let decayed = *momentum - momentum.signum();
    *momentum = if decayed * *momentum <= 0.0 { 0.0 } else { decayed };
    *offset += *momentum;
    if *offset <= 0.0 {
        *offset = 0.0;
        *momentum = 0.0;
    } else if *offset >= max {
        *offset = max;
        *momentum = 0.0;
    }
    *momentum != 0.0
}

impl LayoutTree {
    /// Scroll a node. Templates with a scrollable iterator scroll
    /// along the iterator's axis; any other node scrolls its own
    /// overflow offsets. `dynamic` seeds momentum for inertia.
    pub fn scroll(&mut self, id: NodeId, dx: f32, dy: f32, dynamic: bool) {
        let (max_h, max_v) = self.max_scroll(id);
        let Some(node) = self.get_mut(id) else { return };
        if let NodeKind::Template(it) = &mut node.kind {
            if it.scrollable {
                let delta = match it.axis {
                    Axis::Vertical => dy,
                    Axis::Horizontal => dx,
                };
                it.scroll(delta, dynamic);
                return;
            }
        }
        let pane = &mut node.scroll;
        if dx != 0.0 {
            apply_scroll(&mut pane.offset_h, &mut pane.momentum_h, dx, max_h, dynamic);
        }
        if dy != 0.0 {
            apply_scroll(&mut pane.offset_v, &mut pane.momentum_v, dy, max_v, dynamic);
        }
    }

    /// Advance one frame of inertial scrolling on a node. Returns
    /// whether any axis is still in motion (the host keeps stepping
    /// and resetting until this goes false).
    pub fn scroll_step(&mut self, id: NodeId) -> bool {
        let (max_h, max_v) = self.max_scroll(id);
        let Some(node) = self.get_mut(id) else { return false };
        if let NodeKind::Template(it) = &mut node.kind {
            if it.scrollable {
                return it.scroll_step();
            }
        }
        let pane = &mut node.scroll;
        let moving_h = step_momentum(&mut pane.offset_h, &mut pane.momentum_h, max_h);
        let moving_v = step_momentum(&mut pane.offset_v, &mut pane.momentum_v, max_v);
        moving_h || moving_v
    }

    /// Kill all momentum on a node (and its iterator, if any).
    pub fn halt_scroll(&mut self, id: NodeId) {
        let Some(node) = self.get_mut(id) else { return };
        if let NodeKind::Template(it) = &mut node.kind {
            it.scroll_momentum = 0.0;
        }
        node.scroll.momentum_h = 0.0;
        node.scroll.momentum_v = 0.0;
    }

    /// Route a wheel event to the deepest scrollable container under
    /// `point`, if any.
    pub fn scroll_at_point(
        &mut self,
        root: NodeId,
        point: crate::primitives::Point,
        dx: f32,
        dy: f32,
        dynamic: bool,
    ) {
        let mut target = self.deepest_node_at_point(root, point);
        while let Some(id) = target {
            let (max_h, max_v) = self.max_scroll(id);
            let scrollable_iter = self[id]
                .iterator()
                .is_some_and(|it| it.scrollable);
            if scrollable_iter || max_h > 0.0 || max_v > 0.0 {
                self.scroll(id, dx, dy, dynamic);
                return;
            }
            target = self[id].parent();
        }
    }

    /// Maximum scroll offsets for a plain container: content extent
    /// beyond the node's own rect, per axis.
    pub(crate) fn max_scroll(&self, id: NodeId) -> (f32, f32) {
        let Some(node) = self.get(id) else { return (0.0, 0.0) };
        let mut content_w: f32 = 0.0;
        let mut content_h: f32 = 0.0;
        for &child in &node.children {
            let rect = self[child].rect;
            // Child rects were shifted by the current offsets at
            // resolve time; add them back to measure raw content.
            content_w = content_w.max(rect.right() + node.scroll.offset_h - node.rect.x);
            content_h = content_h.max(rect.bottom() + node.scroll.offset_v - node.rect.y);
        }
        (
            (content_w - node.rect.width).max(0.0),
            (content_h - node.rect.height).max(0.0),
        )
    }
}
