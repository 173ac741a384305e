//! Declarative dimension rules and their pure resolver.
//!
//! A [`Dimension`] describes how one rect coordinate or extent is
//! derived from its geometric context (parent rect, preceding-sibling
//! rect, pixel scale). [`resolve_position`] / [`resolve_size`] map a
//! rule to pixels; [`back_solve_position`] / [`back_solve_size`] invert
//! that mapping when interactive editing forces a concrete pixel value.
//!
//! All functions here are pure and side-effect-free apart from
//! `tracing` output on documented fallbacks, which must never abort a
//! frame.

use serde::{Deserialize, Serialize};

/// How a rect coordinate or extent is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimKind {
    /// `value × scale`, relative to the window origin.
    Abs,
    /// `value × scale`, offset from the parent's near edge.
    Rel,
    /// Offset backward from the parent's far edge (minus own size).
    RevRel,
    /// A 0..1 proportion of the parent's corresponding extent.
    Scale,
    /// Size only: the parent extent remaining after the preceding
    /// sibling. Resolves to 0 without a sibling.
    Complement,
    /// Position only: preceding sibling's far edge plus `value × scale`.
    /// Falls back to `Rel` without a sibling.
    Stack,
    /// Size only: symmetric margins — parent extent minus twice the
    /// node's own position offset.
    Pad,
}

impl DimKind {
    /// Token used in the serialized text format.
    pub fn token(&self) -> &'static str {
        match self {
            DimKind::Abs => "ABS",
            DimKind::Rel => "REL",
            DimKind::RevRel => "REVREL",
            DimKind::Scale => "SCALE",
            DimKind::Complement => "COMPLEMENT",
            DimKind::Stack => "STACK",
            DimKind::Pad => "PAD",
        }
    }

    /// Parse a serialized kind token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ABS" => Some(DimKind::Abs),
            "REL" => Some(DimKind::Rel),
            "REVREL" => Some(DimKind::RevRel),
            "SCALE" => Some(DimKind::Scale),
            "COMPLEMENT" => Some(DimKind::Complement),
            "STACK" => Some(DimKind::Stack),
            "PAD" => Some(DimKind::Pad),
            _ => None,
        }
    }
}

/// A declarative rule plus its numeric payload.
///
/// The payload is a magnitude in logical units, or a 0..1 proportion
/// for [`DimKind::Scale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub kind: DimKind,
    pub value: f32,
}

impl Dimension {
    pub const fn new(kind: DimKind, value: f32) -> Self {
        Self { kind, value }
    }

    pub const fn abs(value: f32) -> Self {
        Self::new(DimKind::Abs, value)
    }

    pub const fn rel(value: f32) -> Self {
        Self::new(DimKind::Rel, value)
    }

    pub const fn rev_rel(value: f32) -> Self {
        Self::new(DimKind::RevRel, value)
    }

    pub const fn scale(proportion: f32) -> Self {
        Self::new(DimKind::Scale, proportion)
    }

    pub const fn complement() -> Self {
        Self::new(DimKind::Complement, 0.0)
    }

    pub const fn stack(gap: f32) -> Self {
        Self::new(DimKind::Stack, gap)
    }

    pub const fn pad(value: f32) -> Self {
        Self::new(DimKind::Pad, value)
    }
}

/// The axis an iterator stamps clones along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    pub fn token(&self) -> &'static str {
        match self {
            Axis::Vertical => "VERTICAL",
            Axis::Horizontal => "HORIZONTAL",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "VERTICAL" => Some(Axis::Vertical),
            "HORIZONTAL" => Some(Axis::Horizontal),
            _ => None,
        }
    }
}

/// One axis of a rect: a near edge plus an extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f32,
    pub extent: f32,
}

impl Span {
    pub const fn new(start: f32, extent: f32) -> Self {
        Self { start, extent }
    }

    #[inline]
    pub fn end(&self) -> f32 {
        self.start + self.extent
    }
}

/// Geometric context for resolving one axis of one node.
#[derive(Debug, Clone, Copy)]
pub struct AxisContext {
    pub scale: f32,
    /// The parent rect on this axis, if the node has a parent.
    pub parent: Option<Span>,
    /// The preceding sibling's rect on this axis, if any.
    pub prev_sibling: Option<Span>,
}

impl AxisContext {
    pub fn new(scale: f32, parent: Option<Span>, prev_sibling: Option<Span>) -> Self {
        Self {
            scale,
            parent,
            prev_sibling,
        }
    }
}

/// Resolve a position dimension (x or y) to pixels.
///
/// `own_size` is the node's already-resolved extent on the same axis
/// (sizes are resolved before positions; REVREL measures backward from
/// the parent's far edge through the node).
pub fn resolve_position(dim: Dimension, own_size: f32, ctx: &AxisContext) -> f32 {
    match dim.kind {
        DimKind::Abs => dim.value * ctx.scale,
        DimKind::Rel => match ctx.parent {
            Some(parent) => parent.start + dim.value * ctx.scale,
            None => dim.value * ctx.scale,
        },
        DimKind::RevRel => match ctx.parent {
            Some(parent) => parent.end() - dim.value * ctx.scale - own_size,
            None => {
                tracing::warn!("REVREL position with no parent; treating as ABS");
                dim.value * ctx.scale
            }
        },
        DimKind::Scale => match ctx.parent {
            Some(parent) => parent.start + parent.extent * dim.value,
            None => {
                tracing::warn!("SCALE position with no parent; resolving to 0");
                0.0
            }
        },
        DimKind::Stack => match ctx.prev_sibling {
            Some(prev) => prev.end() + dim.value * ctx.scale,
            // No preceding sibling: behave like REL against the parent.
            None => match ctx.parent {
                Some(parent) => parent.start + dim.value * ctx.scale,
                None => dim.value * ctx.scale,
            },
        },
        DimKind::Complement | DimKind::Pad => {
            tracing::warn!(kind = dim.kind.token(), "size-only dimension used for a position; treating as REL");
            match ctx.parent {
                Some(parent) => parent.start + dim.value * ctx.scale,
                None => dim.value * ctx.scale,
            }
        }
    }
}

/// Resolve a size dimension (w or h) to pixels.
///
/// `pos_dim` is the node's position dimension on the same axis; PAD
/// resolves it as a REL offset first and derives a symmetric margin
/// from it.
pub fn resolve_size(dim: Dimension, pos_dim: Dimension, ctx: &AxisContext) -> f32 {
    match dim.kind {
        DimKind::Abs | DimKind::Rel | DimKind::RevRel | DimKind::Stack => dim.value * ctx.scale,
        DimKind::Scale => match ctx.parent {
            Some(parent) => parent.extent * dim.value,
            None => {
                tracing::warn!("SCALE size with no parent; resolving to 0");
                0.0
            }
        },
        DimKind::Complement => match (ctx.parent, ctx.prev_sibling) {
            (Some(parent), Some(prev)) => parent.extent - prev.extent,
            (Some(_), None) => {
                tracing::warn!("COMPLEMENT size with no preceding sibling; resolving to 0");
                0.0
            }
            (None, _) => {
                tracing::warn!("COMPLEMENT size with no parent; resolving to 0");
                0.0
            }
        },
        DimKind::Pad => match ctx.parent {
            // Two-pass: position as if REL, then mirror the margin on
            // the far side.
            Some(parent) => {
                let pos = parent.start + pos_dim.value * ctx.scale;
                parent.extent - 2.0 * (pos - parent.start)
            }
            None => {
                tracing::warn!("PAD size with no parent; resolving to 0");
                0.0
            }
        },
    }
}

/// Recover the stored value for a position dimension from a concrete
/// pixel coordinate. Returns `None` for kinds that are not invertible.
pub fn back_solve_position(
    kind: DimKind,
    pixels: f32,
    own_size: f32,
    ctx: &AxisContext,
) -> Option<f32> {
    match kind {
        DimKind::Abs => Some(pixels / ctx.scale),
        DimKind::Rel => {
            let near = ctx.parent.map_or(0.0, |p| p.start);
            Some((pixels - near) / ctx.scale)
        }
        DimKind::RevRel => ctx
            .parent
            .map(|p| (p.end() - pixels - own_size) / ctx.scale),
        DimKind::Scale => match ctx.parent {
            Some(parent) if parent.extent != 0.0 => Some((pixels - parent.start) / parent.extent),
            _ => None,
        },
        DimKind::Stack => match ctx.prev_sibling {
            Some(prev) => Some((pixels - prev.end()) / ctx.scale),
            None => {
                let near = ctx.parent.map_or(0.0, |p| p.start);
                Some((pixels - near) / ctx.scale)
            }
        },
        DimKind::Complement | DimKind::Pad => None,
    }
}

/// Recover the stored value for a size dimension from a concrete pixel
/// extent. Returns `None` for kinds that are not invertible.
pub fn back_solve_size(kind: DimKind, pixels: f32, ctx: &AxisContext) -> Option<f32> {
    match kind {
        DimKind::Abs | DimKind::Rel | DimKind::RevRel | DimKind::Stack => {
            Some(pixels / ctx.scale)
        }
        DimKind::Scale => match ctx.parent {
            Some(parent) if parent.extent != 0.0 => Some(pixels / parent.extent),
            _ => None,
        },
        DimKind::Complement | DimKind::Pad => None,
    }
}
