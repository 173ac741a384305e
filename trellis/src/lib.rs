//! Trellis: a retained-mode layout engine.
//!
//! Trellis keeps a tree of nodes whose geometry is declared, not
//! computed by the host: each node carries four declarative
//! [`Dimension`]s (x, y, w, h) and a resolved pixel [`Rect`] derived
//! from them. The host mutates the tree, scrolls it, drags edges, and
//! asks for a reset; the engine does the rest.
//!
//! # Core pieces
//!
//! - [`LayoutTree`]: an arena owning every node, addressed by
//!   generational [`NodeId`]s.
//! - Resolution: [`LayoutTree::reset`] (viewport-culled, per frame)
//!   and [`LayoutTree::force_reset`] (unconditional, after mutation).
//! - Templates: [`LayoutTree::add_iteration`] stamps a subtree out
//!   repeatedly along an axis, with inertial scrolling.
//! - Editing: [`LayoutTree::set_edge`] and friends write pixel drags
//!   back into the declarative dimensions, with edge snapping.
//! - Serialization: [`LayoutTree::serialize`] /
//!   [`LayoutTree::deserialize`] map subtrees to a host-owned [`Tag`]
//!   tree.
//!
//! # Usage
//!
//! ```ignore
//! use trellis::{LayoutContext, LayoutTree, Dimension, Rect};
//!
//! let mut tree = LayoutTree::new();
//! let root = tree.create_root(800.0, 600.0);
//! let panel = tree.add_child(root, 1.0)?;
//! tree[panel].w = Dimension::scale(0.5);
//!
//! let ctx = LayoutContext::new(1.0, Rect::new(0.0, 0.0, 800.0, 600.0));
//! tree.force_reset(root, &ctx);
//! ```

// Core primitives
pub mod primitives;
pub mod context;
pub mod dimension;
pub mod error;

// The tree and its traversals
pub mod tree;
pub mod reset;
pub mod iter;
pub mod scroll;

// Interaction
pub mod snap;
pub mod edit;

// Host-format adapter
pub mod serial;

pub use context::{LayoutContext, CULL_PADDING};
pub use dimension::{Axis, DimKind, Dimension};
pub use error::{LayoutError, SerialError};
pub use iter::{LayoutIterator, MAX_ITERATIONS};
pub use primitives::{Corner, Edge, Point, Rect, Size};
pub use scroll::ScrollPane;
pub use serial::Tag;
pub use snap::SNAP_TOLERANCE;
pub use tree::{LayoutNode, LayoutTree, NodeId, NodeKind, MAX_CHILDREN};
