//! Mapping layout trees to and from a generic attributed tag tree.
//!
//! The engine does not parse or print markup itself; the host owns the
//! concrete format and hands over [`Tag`] trees. Serialization writes
//! declarative dimensions only, never resolved rects, so a loaded tree
//! must be force-reset before use. Iteration clones and internal nodes
//! are never serialized; a template round-trips as its prototype plus
//! an iterator tag, and the clones are re-stamped on load.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dimension::{Axis, DimKind, Dimension};
use crate::error::SerialError;
use crate::tree::{LayoutTree, NodeId, NodeKind};

/// Tag name of a serialized layout node.
const LAYOUT_TAG: &str = "Layout";

/// One node of a generic attributed tree, as produced or consumed by
/// the host's markup layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub text: String,
    pub children: Vec<Tag>,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn with_text(name: &str, text: String) -> Self {
        let mut tag = Self::named(name);
        tag.text = text;
        tag
    }
}

fn dim_text(dim: Dimension) -> String {
    format!("{} {}", dim.kind.token(), dim.value)
}

fn parse_dim(tag: &Tag) -> Result<Dimension, SerialError> {
    let mut parts = tag.text.split_whitespace();
    let (Some(kind), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(SerialError::BadValue {
            tag: tag.name.clone(),
            text: tag.text.clone(),
        });
    };
    let kind = DimKind::from_token(kind)
        .ok_or_else(|| SerialError::UnknownDimKind(kind.to_string()))?;
    let value: f32 = value.parse().map_err(|_| SerialError::BadValue {
        tag: tag.name.clone(),
        text: tag.text.clone(),
    })?;
    Ok(Dimension::new(kind, value))
}

impl LayoutTree {
    /// Serialize a subtree as a tag tree. Internal and iteration nodes
    /// have no serialized form and yield `None`.
    pub fn serialize(&self, id: NodeId) -> Option<Tag> {
        let node = self.get(id)?;
        if node.kind.is_internal() || node.kind.is_iteration() {
            return None;
        }
        let mut tag = Tag::named(LAYOUT_TAG);
        tag.attrs.insert("name".to_string(), node.name.clone());
        tag.attrs.insert("type".to_string(), node.kind.token().to_string());
        tag.children.push(Tag::with_text("x", dim_text(node.x)));
        tag.children.push(Tag::with_text("y", dim_text(node.y)));
        tag.children.push(Tag::with_text("w", dim_text(node.w)));
        tag.children.push(Tag::with_text("h", dim_text(node.h)));

        if let Some(it) = node.iterator() {
            let mut iter_tag = Tag::named("iterator");
            iter_tag
                .attrs
                .insert("axis".to_string(), it.axis.token().to_string());
            iter_tag
                .attrs
                .insert("scrollable".to_string(), it.scrollable.to_string());
            iter_tag
                .attrs
                .insert("count".to_string(), it.len().to_string());
            tag.children.push(iter_tag);
        }

        let nested: Vec<Tag> = node
            .children()
            .iter()
            .filter_map(|&child| self.serialize(child))
            .collect();
        if !nested.is_empty() {
            let mut children_tag = Tag::named("children");
            children_tag.children = nested;
            tag.children.push(children_tag);
        }
        Some(tag)
    }

    /// Rebuild a subtree from a tag tree, returning the detached root.
    /// On any error the partially built subtree is destroyed before
    /// returning; nothing leaks into the arena.
    ///
    /// Rects are not part of the format: callers force-reset after
    /// loading.
    pub fn deserialize(&mut self, tag: &Tag) -> Result<NodeId, SerialError> {
        if tag.name != LAYOUT_TAG {
            return Err(SerialError::BadRoot(tag.name.clone()));
        }
        let id = self.create();
        match self.fill_from_tag(id, tag) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.release_subtree(id);
                Err(err)
            }
        }
    }

    fn fill_from_tag(&mut self, id: NodeId, tag: &Tag) -> Result<(), SerialError> {
        if let Some(name) = tag.attrs.get("name") {
            self[id].name = name.clone();
        }
        if let Some(token) = tag.attrs.get("type") {
            let kind = NodeKind::from_token(token)
                .ok_or_else(|| SerialError::UnknownNodeKind(token.clone()))?;
            // A template's kind is re-established below when its
            // iterations are stamped.
            if !matches!(kind, NodeKind::Template(_)) {
                self[id].kind = kind;
            }
        }

        let mut iterator_tag = None;
        for child in &tag.children {
            match child.name.as_str() {
                "x" => self[id].x = parse_dim(child)?,
                "y" => self[id].y = parse_dim(child)?,
                "w" => self[id].w = parse_dim(child)?,
                "h" => self[id].h = parse_dim(child)?,
                "children" => {
                    for nested in &child.children {
                        let child_id = self.deserialize(nested)?;
                        if let Err(err) = self.attach(child_id, id) {
                            // Not attached, so the caller's cleanup
                            // cannot reach it.
                            self.release_subtree(child_id);
                            return Err(err.into());
                        }
                    }
                }
                "iterator" => iterator_tag = Some(child),
                // Unknown tags belong to the host format; skip them.
                _ => {}
            }
        }

        // Stamp iterations last, so the clones pick up the prototype's
        // finished dimensions and children.
        if let Some(iter_tag) = iterator_tag {
            let axis = iter_tag
                .attrs
                .get("axis")
                .and_then(|token| Axis::from_token(token))
                .unwrap_or(Axis::Vertical);
            let scrollable = iter_tag
                .attrs
                .get("scrollable")
                .is_some_and(|text| text == "true");
            let count: usize = match iter_tag.attrs.get("count") {
                Some(text) => text.parse().map_err(|_| SerialError::BadValue {
                    tag: "iterator".to_string(),
                    text: text.clone(),
                })?,
                None => 0,
            };
            for _ in 0..count {
                self.add_iteration(id, axis, scrollable)
                    .map_err(SerialError::from)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LayoutContext;
    use crate::primitives::Rect;

    fn ctx() -> LayoutContext {
        LayoutContext::new(1.0, Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    fn sample_tree() -> (LayoutTree, NodeId) {
        let mut tree = LayoutTree::new();
        let root = tree.create_root(800.0, 600.0);
        let panel = tree.add_child(root, 1.0).unwrap();
        tree[panel].name = "panel".to_string();
        tree[panel].x = Dimension::rel(10.0);
        tree[panel].y = Dimension::rel(10.0);
        tree[panel].w = Dimension::scale(0.5);
        tree[panel].h = Dimension::pad(10.0);
        let row = tree.add_child(panel, 1.0).unwrap();
        tree[row].name = "row".to_string();
        tree[row].h = Dimension::abs(24.0);
        tree.add_iteration(row, Axis::Vertical, true).unwrap();
        tree.add_iteration(row, Axis::Vertical, true).unwrap();
        (tree, root)
    }

    #[test]
    fn serialized_shape() {
        let (tree, root) = sample_tree();
        let tag = tree.serialize(root).unwrap();

        assert_eq!(tag.name, "Layout");
        assert_eq!(tag.attrs.get("name").unwrap(), "main");
        assert_eq!(tag.attrs.get("type").unwrap(), "NORMAL");
        assert_eq!(tag.children[0].name, "x");
        assert_eq!(tag.children[0].text, "ABS 0");

        let children = tag.children.iter().find(|t| t.name == "children").unwrap();
        let panel = &children.children[0];
        assert_eq!(panel.attrs.get("name").unwrap(), "panel");
        assert_eq!(panel.children[3].text, "PAD 10");

        let panel_children = panel.children.iter().find(|t| t.name == "children").unwrap();
        let row = &panel_children.children[0];
        assert_eq!(row.attrs.get("type").unwrap(), "TEMPLATE");
        let iter = row.children.iter().find(|t| t.name == "iterator").unwrap();
        assert_eq!(iter.attrs.get("axis").unwrap(), "VERTICAL");
        assert_eq!(iter.attrs.get("count").unwrap(), "2");
        assert_eq!(iter.attrs.get("scrollable").unwrap(), "true");
    }

    #[test]
    fn round_trip_preserves_structure() {
        let (tree, root) = sample_tree();
        let tag = tree.serialize(root).unwrap();

        let mut loaded = LayoutTree::new();
        let new_root = loaded.deserialize(&tag).unwrap();
        loaded.force_reset(new_root, &ctx());

        assert_eq!(loaded[new_root].name, "main");
        let panel = loaded.find_by_name(new_root, "panel").unwrap();
        assert_eq!(loaded[panel].x, Dimension::rel(10.0));
        assert_eq!(loaded[panel].w, Dimension::scale(0.5));
        assert_eq!(loaded[panel].h, Dimension::pad(10.0));

        let row = loaded.find_by_name(panel, "row").unwrap();
        let it = loaded[row].iterator().unwrap();
        assert_eq!(it.axis, Axis::Vertical);
        assert!(it.scrollable);
        assert_eq!(it.len(), 2);

        // The reloaded tag tree matches the original exactly.
        assert_eq!(loaded.serialize(new_root).unwrap(), tag);
    }

    #[test]
    fn iterations_and_internal_nodes_are_skipped() {
        let (mut tree, root) = sample_tree();
        let hud = tree.add_child(root, 1.0).unwrap();
        tree[hud].kind = NodeKind::Internal;

        let tag = tree.serialize(root).unwrap();
        let children = tag.children.iter().find(|t| t.name == "children").unwrap();
        assert_eq!(children.children.len(), 1);
        assert!(tree.serialize(hud).is_none());
    }

    #[test]
    fn wrong_root_tag_is_rejected() {
        let mut tree = LayoutTree::new();
        let err = tree.deserialize(&Tag::named("Widget"));
        assert_eq!(err, Err(SerialError::BadRoot("Widget".to_string())));
    }

    #[test]
    fn bad_input_releases_the_partial_subtree() {
        let mut tree = LayoutTree::new();
        let before = tree.len();

        let mut good_child = Tag::named("Layout");
        good_child.children.push(Tag::with_text("x", "REL 5".to_string()));
        let mut bad_child = Tag::named("Layout");
        bad_child.children.push(Tag::with_text("w", "SIDEWAYS 10".to_string()));

        let mut children = Tag::named("children");
        children.children.push(good_child);
        children.children.push(bad_child);
        let mut root_tag = Tag::named("Layout");
        root_tag.children.push(children);

        let err = tree.deserialize(&root_tag);
        assert_eq!(
            err,
            Err(SerialError::UnknownDimKind("SIDEWAYS".to_string()))
        );
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn malformed_dimension_text_is_reported() {
        let mut tree = LayoutTree::new();
        let mut tag = Tag::named("Layout");
        tag.children.push(Tag::with_text("x", "REL".to_string()));
        assert!(matches!(
            tree.deserialize(&tag),
            Err(SerialError::BadValue { .. })
        ));

        let mut tag = Tag::named("Layout");
        tag.children.push(Tag::with_text("y", "REL twelve".to_string()));
        assert!(matches!(
            tree.deserialize(&tag),
            Err(SerialError::BadValue { .. })
        ));
    }

    #[test]
    fn child_capacity_overflow_releases_everything() {
        use crate::error::LayoutError;
        use crate::tree::MAX_CHILDREN;

        let mut children = Tag::named("children");
        for _ in 0..=MAX_CHILDREN {
            children.children.push(Tag::named("Layout"));
        }
        let mut root_tag = Tag::named("Layout");
        root_tag.children.push(children);

        let mut tree = LayoutTree::new();
        let err = tree.deserialize(&root_tag);
        assert!(matches!(
            err,
            Err(SerialError::Layout(LayoutError::CapacityExceeded { .. }))
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn unknown_node_type_is_an_error() {
        let mut tree = LayoutTree::new();
        let mut tag = Tag::named("Layout");
        tag.attrs.insert("type".to_string(), "GADGET".to_string());
        assert_eq!(
            tree.deserialize(&tag),
            Err(SerialError::UnknownNodeKind("GADGET".to_string()))
        );
    }
}
