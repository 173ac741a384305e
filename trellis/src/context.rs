//! Layout context threaded through every resolve/reset call.
//!
//! Resolution never reads ambient globals: the host hands the current
//! pixel scale factor and viewport to each call instead.

use crate::primitives::Rect;

/// Extra margin around the viewport inside which culled resets still
/// recurse, so edge content is resolved before it scrolls into view.
pub const CULL_PADDING: f32 = 100.0;

/// Per-frame geometric context supplied by the host.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext {
    /// Device-pixels-per-logical-unit ratio applied to ABS/REL/REVREL
    /// magnitudes.
    pub scale: f32,
    /// The visible window region, in pixels.
    pub viewport: Rect,
}

impl LayoutContext {
    pub fn new(scale: f32, viewport: Rect) -> Self {
        debug_assert!(scale > 0.0, "pixel scale factor must be positive");
        Self { scale, viewport }
    }

    /// The viewport grown by the cull margin.
    pub fn padded_viewport(&self) -> Rect {
        self.viewport.expand(CULL_PADDING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_viewport_grows_by_margin() {
        let ctx = LayoutContext::new(1.0, Rect::new(0.0, 0.0, 800.0, 600.0));
        let padded = ctx.padded_viewport();
        assert_eq!(padded.x, -CULL_PADDING);
        assert_eq!(padded.width, 800.0 + 2.0 * CULL_PADDING);
    }
}
