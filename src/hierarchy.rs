//! Node hierarchy without titles and contents.

use core::fmt;

use indexmap::IndexMap;
use tracing::instrument;

use crate::NodeId;

/// Parent/children links of every member node.
///
/// Entries are kept in storage order: creation order for nodes created in
/// this session, document order for imported nodes. Removing a node keeps
/// the relative order of the others.
///
/// Methods here only keep `parent` and `children` mutually consistent.
/// Rejecting cycles and protecting the root is the caller's job (see
/// [`Tree`][`crate::Tree`]).
#[derive(Debug, Clone, Default)]
pub(crate) struct Hierarchy {
    /// Neighbors storage.
    neighbors: IndexMap<NodeId, Neighbors>,
}

impl Hierarchy {
    /// Creates a hierarchy from links which are already known to be consistent.
    #[must_use]
    pub(crate) fn from_validated(neighbors: IndexMap<NodeId, Neighbors>) -> Self {
        Self { neighbors }
    }

    /// Adds a new node without any neighbors.
    ///
    /// # Panics
    ///
    /// Panics if the ID is already used.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn insert_orphan(&mut self, id: NodeId) {
        let prev = self.neighbors.insert(id, Neighbors::default());
        assert!(prev.is_none(), "[precondition] node ID {id} must be unused");
    }

    /// Returns the neighbors of the node if it is a member.
    #[inline]
    #[must_use]
    pub(crate) fn neighbors(&self, id: NodeId) -> Option<&Neighbors> {
        self.neighbors.get(&id)
    }

    /// Returns true if the node is a member.
    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.neighbors.contains_key(&id)
    }

    /// Returns the number of member nodes.
    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns the member ID at the storage position.
    #[inline]
    #[must_use]
    pub(crate) fn id_at(&self, index: usize) -> Option<NodeId> {
        self.neighbors.get_index(index).map(|(&id, _)| id)
    }

    /// Returns true if `ancestor` is `node` itself or one of its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a member.
    #[must_use]
    pub(crate) fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self
                .neighbors(id)
                .expect("[consistency] ancestors of a live node must be alive")
                .parent();
        }
        false
    }

    /// Detaches the node from its parent.
    ///
    /// The subtree under the node is preserved and the node becomes an orphan.
    /// Does nothing if the node has no parent.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a member.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn detach(&mut self, node: NodeId) {
        let parent = match self
            .neighbors(node)
            .expect("[precondition] the node must be alive")
            .parent()
        {
            Some(v) => v,
            None => return,
        };

        let siblings = &mut self
            .neighbors
            .get_mut(&parent)
            .expect("[consistency] the parent of a live node must be alive")
            .children;
        let pos = siblings
            .iter()
            .position(|&child| child == node)
            .expect("[consistency] the node must be listed by its parent");
        siblings.remove(pos);

        self.neighbors
            .get_mut(&node)
            .expect("[precondition] the node must be alive")
            .parent = None;
    }

    /// Detaches `node` and appends it as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if any of the given nodes are not members.
    /// Panics if `node` is `parent` or an ancestor of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn append_child(&mut self, node: NodeId, parent: NodeId) {
        assert!(
            !self.is_ancestor_or_self(node, parent),
            "[precondition] the node must not be an ancestor of the new parent"
        );
        self.detach(node);

        self.neighbors
            .get_mut(&parent)
            .expect("[precondition] the parent must be alive")
            .children
            .push(node);
        self.neighbors
            .get_mut(&node)
            .expect("[precondition] the node must be alive")
            .parent = Some(parent);
    }

    /// Removes the node from the hierarchy.
    ///
    /// It is caller's responsibility to make the node alone before removal.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a member, or if it still has a parent or children.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove(&mut self, node: NodeId) {
        let nbs = self
            .neighbors
            .shift_remove(&node)
            .expect("[precondition] the node must be alive");
        assert!(nbs.is_alone(), "[precondition] the node must be alone");
    }
}

/// Neighbors of a node.
#[derive(Default, Clone, PartialEq, Eq)]
pub(crate) struct Neighbors {
    /// Parent.
    parent: Option<NodeId>,
    /// Children in display order.
    children: Vec<NodeId>,
}

impl Neighbors {
    /// Creates neighbors from raw links.
    #[inline]
    #[must_use]
    pub(crate) fn new(parent: Option<NodeId>, children: Vec<NodeId>) -> Self {
        Self { parent, children }
    }

    /// Returns the node ID of the parent.
    #[inline]
    #[must_use]
    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the node IDs of the children.
    #[inline]
    #[must_use]
    pub(crate) fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns true if the node has no neighbors.
    #[inline]
    #[must_use]
    pub(crate) fn is_alone(&self) -> bool {
        self.parent.is_none() && self.children.is_empty()
    }
}

// For compact printing.
impl fmt::Debug for Neighbors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        /// A wrapper to print optional node ID in compact form.
        struct OptNodeId(Option<NodeId>);
        impl fmt::Debug for OptNodeId {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    Some(id) => id.fmt(f),
                    None => f.write_str("None"),
                }
            }
        }

        f.debug_struct("Neighbors")
            .field("parent", &OptNodeId(self.parent))
            .field("children", &self.children)
            .finish()
    }
}
