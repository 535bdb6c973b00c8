//! Serialized document format.
//!
//! A document is a JSON array of [node descriptors][`NodeDescriptor`], with
//! the root node first. Parent and children are referred to by node IDs:
//!
//! ```json
//! [
//!   { "id": 0, "title": "", "content": "", "children": [1], "parent": null },
//!   { "id": 1, "title": "A", "content": "", "children": [], "parent": 0 }
//! ]
//! ```

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidTreeReason, LoadError};
use crate::hierarchy::{Hierarchy, Neighbors};
use crate::tree::{NodeData, Tree};
use crate::NodeId;

/// Flat, ID-referencing description of a node.
///
/// Missing `title` and `content` are read as empty strings, missing
/// `children` as no children, and missing `parent` as no parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Node ID.
    pub id: NodeId,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Content.
    #[serde(default)]
    pub content: String,
    /// Child IDs in display order.
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Parent ID.
    #[serde(default)]
    pub parent: Option<NodeId>,
}

/// Output format of an exported document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Pretty-printed with 2-space indentation.
    ///
    /// Friendly to version control diffs.
    #[default]
    Pretty,
    /// Single line without whitespace.
    Compact,
}

/// Parses the document text into descriptors.
///
/// JSON syntax errors are reported as [`LoadError::Malformed`], and valid
/// JSON of a wrong shape as [`LoadError::InvalidTree`].
pub(crate) fn parse(text: &str) -> Result<Vec<NodeDescriptor>, LoadError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(LoadError::Malformed)?;
    serde_json::from_value(value)
        .map_err(|e| LoadError::InvalidTree(InvalidTreeReason::Shape(e.to_string())))
}

/// Renders the descriptors as a document.
pub(crate) fn render(descriptors: &[NodeDescriptor], format: ExportFormat) -> String {
    let text = match format {
        ExportFormat::Pretty => serde_json::to_string_pretty(descriptors),
        ExportFormat::Compact => serde_json::to_string(descriptors),
    };
    text.expect("[validity] descriptors have string keys only and are always serializable")
}

/// Builds a tree from descriptors, validating every structural constraint.
///
/// The first pass collects nodes and IDs, the second pass checks references
/// and links against the collected IDs.
pub(crate) fn build(descriptors: Vec<NodeDescriptor>) -> Result<Tree, InvalidTreeReason> {
    let root = descriptors.first().ok_or(InvalidTreeReason::Empty)?;
    if !root.id.is_root() {
        return Err(InvalidTreeReason::RootNotFirst(root.id));
    }
    if let Some(parent) = root.parent {
        return Err(InvalidTreeReason::RootHasParent(parent));
    }

    // First pass: collect nodes.
    let mut neighbors = IndexMap::with_capacity(descriptors.len());
    let mut data = HashMap::with_capacity(descriptors.len());
    let mut last_id = NodeId::ROOT;
    for desc in descriptors {
        if neighbors.contains_key(&desc.id) {
            return Err(InvalidTreeReason::DuplicateId(desc.id));
        }
        last_id = last_id.max(desc.id);
        neighbors.insert(desc.id, Neighbors::new(desc.parent, desc.children));
        data.insert(
            desc.id,
            NodeData {
                title: desc.title,
                content: desc.content,
            },
        );
    }

    // Second pass: resolve references.
    let mut listed_by: HashMap<NodeId, NodeId> = HashMap::new();
    for (&id, nbs) in &neighbors {
        if let Some(parent) = nbs.parent() {
            if !neighbors.contains_key(&parent) {
                return Err(InvalidTreeReason::DanglingReference {
                    node: id,
                    missing: parent,
                });
            }
        }
        for &child in nbs.children() {
            if !neighbors.contains_key(&child) {
                return Err(InvalidTreeReason::DanglingReference {
                    node: id,
                    missing: child,
                });
            }
            if child.is_root() {
                return Err(InvalidTreeReason::RootIsChild(id));
            }
            if listed_by.insert(child, id).is_some() {
                return Err(InvalidTreeReason::DuplicateChild(child));
            }
        }
    }
    for (&id, nbs) in &neighbors {
        let listed = listed_by.get(&id).copied();
        if nbs.parent() != listed {
            return Err(InvalidTreeReason::InconsistentLinks {
                child: id,
                parent: nbs.parent(),
                listed_by: listed,
            });
        }
    }
    ensure_acyclic(&neighbors)?;
    if last_id.checked_next().is_none() {
        return Err(InvalidTreeReason::IdSpaceExhausted(last_id));
    }

    Ok(Tree::from_parts(
        Hierarchy::from_validated(neighbors),
        data,
        last_id,
    ))
}

/// Checks that following parent links from any node ends at a parentless node.
fn ensure_acyclic(neighbors: &IndexMap<NodeId, Neighbors>) -> Result<(), InvalidTreeReason> {
    // Nodes known to reach a parentless node.
    let mut settled: HashSet<NodeId> = HashSet::with_capacity(neighbors.len());
    let mut path: Vec<NodeId> = Vec::new();
    let mut on_path: HashSet<NodeId> = HashSet::new();

    for &start in neighbors.keys() {
        let mut current = Some(start);
        while let Some(id) = current {
            if settled.contains(&id) {
                break;
            }
            if !on_path.insert(id) {
                return Err(InvalidTreeReason::Cycle(id));
            }
            path.push(id);
            current = neighbors
                .get(&id)
                .expect("[consistency] references have been checked to exist")
                .parent();
        }
        on_path.clear();
        settled.extend(path.drain(..));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    /// Descriptor with a title derived from the ID.
    fn desc(id: u64, children: &[u64], parent: Option<u64>) -> NodeDescriptor {
        NodeDescriptor {
            id: NodeId::new(id),
            title: format!("node {id}"),
            content: String::new(),
            children: children.iter().copied().map(NodeId::new).collect(),
            parent: parent.map(NodeId::new),
        }
    }

    /// Builds the tree, expecting a rejection.
    fn reason(descriptors: Vec<NodeDescriptor>) -> InvalidTreeReason {
        build(descriptors).expect_err("document must be rejected")
    }

    #[test]
    fn missing_fields_take_defaults() {
        let descriptors = parse(r#"[{"id":0}]"#).expect("valid document");
        assert_eq!(
            descriptors,
            [NodeDescriptor {
                id: NodeId::ROOT,
                ..NodeDescriptor::default()
            }]
        );
    }

    #[test]
    fn wrong_shapes_are_invalid_trees() {
        for text in [
            "{}",
            "42",
            r#"[{"title":"no id"}]"#,
            r#"[{"id":-1}]"#,
            r#"[{"id":0.5}]"#,
            r#"[{"id":0,"children":"1"}]"#,
        ] {
            let err = parse(text).expect_err("wrong shape");
            assert!(
                matches!(err, LoadError::InvalidTree(InvalidTreeReason::Shape(_))),
                "unexpected error for {text}: {err:?}"
            );
        }
    }

    #[test]
    fn syntax_errors_are_malformed() {
        for text in ["not json", "", "[{", "[] []"] {
            let err = parse(text).expect_err("invalid JSON");
            assert!(
                matches!(err, LoadError::Malformed(_)),
                "unexpected error for {text:?}: {err:?}"
            );
        }
    }

    #[test]
    fn root_constraints() {
        assert_eq!(reason(vec![]), InvalidTreeReason::Empty);
        assert_eq!(
            reason(vec![desc(1, &[], None)]),
            InvalidTreeReason::RootNotFirst(NodeId::new(1))
        );
        assert_eq!(
            reason(vec![desc(0, &[], Some(1)), desc(1, &[0], None)]),
            InvalidTreeReason::RootHasParent(NodeId::new(1))
        );
        assert_eq!(
            reason(vec![desc(0, &[], None), desc(1, &[0], None)]),
            InvalidTreeReason::RootIsChild(NodeId::new(1))
        );
    }

    #[test]
    fn reference_constraints() {
        assert_eq!(
            reason(vec![desc(0, &[], None), desc(0, &[], None)]),
            InvalidTreeReason::DuplicateId(NodeId::ROOT)
        );
        assert_eq!(
            reason(vec![desc(0, &[7], None)]),
            InvalidTreeReason::DanglingReference {
                node: NodeId::ROOT,
                missing: NodeId::new(7),
            }
        );
        assert_eq!(
            reason(vec![desc(0, &[], None), desc(1, &[], Some(7))]),
            InvalidTreeReason::DanglingReference {
                node: NodeId::new(1),
                missing: NodeId::new(7),
            }
        );
        assert_eq!(
            reason(vec![desc(0, &[1, 1], None), desc(1, &[], Some(0))]),
            InvalidTreeReason::DuplicateChild(NodeId::new(1))
        );
    }

    #[test]
    fn links_must_agree() {
        assert_eq!(
            reason(vec![desc(0, &[1], None), desc(1, &[], None)]),
            InvalidTreeReason::InconsistentLinks {
                child: NodeId::new(1),
                parent: None,
                listed_by: Some(NodeId::ROOT),
            }
        );
        assert_eq!(
            reason(vec![desc(0, &[], None), desc(1, &[], Some(0))]),
            InvalidTreeReason::InconsistentLinks {
                child: NodeId::new(1),
                parent: Some(NodeId::ROOT),
                listed_by: None,
            }
        );
    }

    #[test]
    fn parent_cycles_are_rejected() {
        let err = reason(vec![
            desc(0, &[], None),
            desc(1, &[2], Some(2)),
            desc(2, &[1], Some(1)),
        ]);
        assert!(matches!(err, InvalidTreeReason::Cycle(_)), "{err:?}");

        let err = reason(vec![desc(0, &[], None), desc(1, &[1], Some(1))]);
        assert_eq!(err, InvalidTreeReason::Cycle(NodeId::new(1)));
    }

    #[test]
    fn orphans_are_accepted() {
        let tree = build(vec![
            desc(0, &[], None),
            desc(3, &[4], None),
            desc(4, &[], Some(3)),
        ])
        .expect("orphan subtrees are valid");
        let orphans = tree.orphans().map(|node| node.id()).collect::<Vec<_>>();
        assert_eq!(orphans, [NodeId::new(3)]);
    }

    #[test]
    fn allocation_continues_after_largest_id() {
        let mut tree = build(vec![
            desc(0, &[9], None),
            desc(9, &[], Some(0)),
            desc(2, &[], None),
        ])
        .expect("valid document");
        assert_eq!(tree.create_node("", ""), NodeId::new(10));
    }

    #[test]
    fn largest_possible_id_is_rejected() {
        assert_eq!(
            reason(vec![desc(0, &[], None), desc(u64::MAX, &[], None)]),
            InvalidTreeReason::IdSpaceExhausted(NodeId::new(u64::MAX))
        );
        build(vec![desc(0, &[], None), desc(u64::MAX - 1, &[], None)])
            .expect("one ID is still available");
    }

    #[test]
    fn compact_rendering() {
        let text = render(&[desc(0, &[], None)], ExportFormat::Compact);
        assert_eq!(
            text,
            r#"[{"id":0,"title":"node 0","content":"","children":[],"parent":null}]"#
        );
    }
}
