//! Errors.

use thiserror::Error;

use crate::NodeId;

/// Structure inconsistency error.
///
/// Returned by structural mutations of a [`Tree`][`crate::Tree`]. When an
/// operation returns this error, the tree has not been modified.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureError {
    /// The node cannot be used as an argument of the operation.
    ///
    /// The node is not a member of the tree (never existed, or already
    /// deleted), or the root is passed where only a non-root node is allowed.
    #[error("invalid node argument {node}: {reason}")]
    InvalidArgument {
        /// The offending node.
        node: NodeId,
        /// Why the node was rejected.
        reason: &'static str,
    },
    /// Attempt to make a node the ancestor of itself.
    #[error("attempt to make node {child} the ancestor of itself (via new parent {parent})")]
    Cycle {
        /// Receiver of the attach operation.
        parent: NodeId,
        /// Node being attached.
        child: NodeId,
    },
    /// Attempt to detach a node from a node which is not its parent.
    #[error("node {child} is not a child of node {parent}")]
    NotAChild {
        /// Receiver of the detach operation.
        parent: NodeId,
        /// Node being detached.
        child: NodeId,
    },
    /// Attempt to delete a node with children without cascading.
    #[error("node {0} still has children")]
    NodeHasChildren(NodeId),
    /// Attempt to delete the root node.
    #[error("the root node cannot be deleted")]
    RootDeletion,
}

impl StructureError {
    /// Creates an error for a node ID that does not resolve to a live node.
    #[inline]
    #[must_use]
    pub(crate) fn not_a_member(node: NodeId) -> Self {
        Self::InvalidArgument {
            node,
            reason: "no such node in the tree",
        }
    }
}

/// Document loading error.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The document is not syntactically valid JSON.
    #[error("document is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The document is valid JSON but does not describe a valid tree.
    #[error("document is not a valid tree: {0}")]
    InvalidTree(#[from] InvalidTreeReason),
}

/// Reason a parsed document was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTreeReason {
    /// The value is not an array of node descriptors.
    #[error("unexpected document shape: {0}")]
    Shape(String),
    /// The array has no elements.
    #[error("document has no nodes")]
    Empty,
    /// The first element is not the root node.
    #[error("first node must have ID 0, but has ID {0}")]
    RootNotFirst(NodeId),
    /// The root node has a parent.
    #[error("root node must not have a parent, but has parent {0}")]
    RootHasParent(NodeId),
    /// The root node is listed as a child.
    #[error("root node is listed as a child of node {0}")]
    RootIsChild(NodeId),
    /// Two descriptors share the same ID.
    #[error("duplicate node ID {0}")]
    DuplicateId(NodeId),
    /// A parent or child reference points to no descriptor.
    #[error("node {node} refers to missing node {missing}")]
    DanglingReference {
        /// The node holding the reference.
        node: NodeId,
        /// The referenced ID.
        missing: NodeId,
    },
    /// A node is listed as a child more than once.
    #[error("node {0} is listed as a child more than once")]
    DuplicateChild(NodeId),
    /// Parent and children links disagree.
    #[error("node {child} names parent {parent:?} but is listed as a child of {listed_by:?}")]
    InconsistentLinks {
        /// The child node.
        child: NodeId,
        /// The parent the child names.
        parent: Option<NodeId>,
        /// The node listing the child in its children, if any.
        listed_by: Option<NodeId>,
    },
    /// Parent links form a cycle.
    #[error("parent links of node {0} form a cycle")]
    Cycle(NodeId),
    /// The largest ID leaves no room to allocate new nodes.
    #[error("node ID {0} leaves no room for new nodes")]
    IdSpaceExhausted(NodeId),
}
