//! Layout error types.

use thiserror::Error;

/// Structural and capacity failures reported by tree operations.
///
/// Geometry fallbacks (missing preceding sibling, parentless resolve)
/// are *not* errors: resolution runs every frame and degrades silently,
/// logging via `tracing` instead of interrupting the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("{kind} capacity of {limit} reached on \"{name}\"")]
    CapacityExceeded {
        kind: &'static str,
        limit: usize,
        name: String,
    },

    #[error("node id is stale or was destroyed")]
    StaleNode,

    #[error("sibling index bookkeeping is inconsistent on \"{0}\"")]
    IndexMismatch(String),

    #[error("\"{0}\" has no parent")]
    NoParent(String),

    #[error("\"{0}\" cannot own an iterator")]
    NotTemplate(String),

    #[error("\"{0}\" is owned by a template iterator")]
    IterationOwned(String),
}

/// Failures while mapping a generic tag tree to or from a layout tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerialError {
    #[error("root tag is not a Layout tag (found <{0}>)")]
    BadRoot(String),

    #[error("unknown dimension kind token {0:?}")]
    UnknownDimKind(String),

    #[error("unknown layout type {0:?}")]
    UnknownNodeKind(String),

    #[error("malformed value in <{tag}>: {text:?}")]
    BadValue { tag: String, text: String },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}
