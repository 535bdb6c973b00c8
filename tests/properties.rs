//! Property tests over random edit sequences.

mod common;

use std::collections::HashSet;

use arborea::{NodeId, StructureError, Tree};
use proptest::prelude::*;

use common::init_test_setup;

/// A structural edit. Node operands are indices into the live node list.
#[derive(Debug, Clone)]
enum Edit {
    Create { title: String },
    CreateChild { parent: usize },
    Append { parent: usize, child: usize },
    Remove { child: usize },
    Delete { target: usize, recursive: bool },
}

/// Strategy for a single edit.
fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        "[a-z\n\"]{0,8}".prop_map(|title| Edit::Create { title }),
        any::<usize>().prop_map(|parent| Edit::CreateChild { parent }),
        (any::<usize>(), any::<usize>()).prop_map(|(parent, child)| Edit::Append { parent, child }),
        any::<usize>().prop_map(|child| Edit::Remove { child }),
        (any::<usize>(), any::<bool>())
            .prop_map(|(target, recursive)| Edit::Delete { target, recursive }),
    ]
}

/// Picks a live node by index.
fn pick(tree: &Tree, index: usize) -> NodeId {
    let ids = tree.iter().map(|node| node.id()).collect::<Vec<_>>();
    ids[index % ids.len()]
}

/// Applies the edit. Rejected edits must leave the tree untouched.
fn apply(tree: &mut Tree, edit: &Edit) -> Result<(), TestCaseError> {
    let before = tree.export();
    let result: Result<(), StructureError> = match *edit {
        Edit::Create { ref title } => {
            tree.create_node(title.as_str(), "");
            Ok(())
        }
        Edit::CreateChild { parent } => {
            let parent = pick(tree, parent);
            tree.create_child(parent, "child", "").map(drop)
        }
        Edit::Append { parent, child } => {
            let (parent, child) = (pick(tree, parent), pick(tree, child));
            tree.append_child(parent, child)
        }
        Edit::Remove { child } => {
            let child = pick(tree, child);
            let parent = tree.node(child).and_then(|node| node.parent_id());
            match parent {
                Some(parent) => tree.remove_child(parent, child),
                None => Ok(()),
            }
        }
        Edit::Delete { target, recursive } => {
            let target = pick(tree, target);
            tree.delete_node(target, recursive).map(drop)
        }
    };
    if result.is_err() {
        prop_assert_eq!(tree.export(), before);
    }
    Ok(())
}

/// Checks the structural invariants of the tree.
fn check_invariants(tree: &Tree) -> Result<(), TestCaseError> {
    prop_assert!(tree.contains(NodeId::ROOT));
    prop_assert_eq!(tree.root().parent_id(), None);

    let mut listed = HashSet::new();
    for node in tree {
        for child in node.children() {
            prop_assert_eq!(child.parent_id(), Some(node.id()));
            prop_assert!(listed.insert(child.id()), "{} listed twice", child.id());
        }
        if let Some(parent) = node.parent() {
            prop_assert!(parent.child_ids().contains(&node.id()));
        }
        // Every ancestor chain terminates within the node count.
        prop_assert!(node.ancestors().count() <= tree.len());
    }
    Ok(())
}

proptest! {
    #[test]
    fn edits_keep_invariants(edits in prop::collection::vec(edit(), 0..48)) {
        init_test_setup();
        let mut tree = Tree::new();
        for edit in &edits {
            apply(&mut tree, edit)?;
            check_invariants(&tree)?;
        }
    }

    #[test]
    fn export_round_trips(edits in prop::collection::vec(edit(), 0..48)) {
        init_test_setup();
        let mut tree = Tree::new();
        for edit in &edits {
            apply(&mut tree, edit)?;
        }

        let saved = tree.export();
        let restored = Tree::from_json(&saved)
            .map_err(|e| TestCaseError::fail(format!("exported document rejected: {e}")))?;
        prop_assert_eq!(restored.export(), saved);
        prop_assert_eq!(restored.len(), tree.len());
    }

    #[test]
    fn ids_are_monotonic(edits in prop::collection::vec(edit(), 0..48)) {
        init_test_setup();
        let mut tree = Tree::new();
        let mut seen = HashSet::from([NodeId::ROOT]);
        let mut last = NodeId::ROOT;
        for edit in &edits {
            apply(&mut tree, edit)?;
            let id = tree.create_node("probe", "");
            prop_assert!(id > last);
            prop_assert!(seen.insert(id), "{} allocated twice", id);
            last = id;
        }
    }
}
