//! Tree.

mod debug_print;
mod node;
pub mod traverse;

use core::str::FromStr;
use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, instrument};

use crate::document::{self, ExportFormat, NodeDescriptor};
use crate::error::{LoadError, StructureError};
use crate::hierarchy::{Hierarchy, Neighbors};
use crate::NodeId;

pub use self::debug_print::DebugPrint;
pub use self::node::{Node, NodeMut};

use self::traverse::{DepthFirstTraverse, Nodes};

/// Title and content of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NodeData {
    /// Title.
    pub(crate) title: String,
    /// Free-form text content.
    pub(crate) content: String,
}

/// Tree of titled text nodes.
///
/// The tree owns every node. Callers address nodes by [`NodeId`] and access
/// them through [`Node`] and [`NodeMut`] proxies, which borrow the tree.
///
/// The root node (ID 0) always exists, never has a parent, and can be neither
/// deleted nor attached under another node. Other nodes are either attached
/// (they have a parent) or orphans (members without a parent, for example
/// right after [`create_node`][`Self::create_node`] or
/// [`remove_child`][`Self::remove_child`]).
///
/// # Examples
///
/// ```
/// use arborea::Tree;
///
/// let mut tree = Tree::new();
/// let chapter = tree.root_mut().create_child("Chapter 1", "");
/// tree.node_mut(chapter)
///     .expect("should never fail: node exists")
///     .create_child("Section 1.1", "Lorem ipsum");
///
/// let titles = tree
///     .root()
///     .depth_first_traverse()
///     .filter_map(|ev| ev.as_open().map(|node| node.title()))
///     .collect::<Vec<_>>();
/// assert_eq!(titles, ["", "Chapter 1", "Section 1.1"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    /// Hierarchy.
    hierarchy: Hierarchy,
    /// Data.
    data: HashMap<NodeId, NodeData>,
    /// The largest ID ever used by this tree.
    ///
    /// Deleting nodes never lowers this, so deleted IDs are not reused.
    last_id: NodeId,
}

impl Tree {
    /// Creates a new tree with only the root node.
    ///
    /// # Examples
    ///
    /// ```
    /// use arborea::{NodeId, Tree};
    ///
    /// let tree = Tree::new();
    /// assert_eq!(tree.len(), 1);
    ///
    /// let root = tree.root();
    /// assert_eq!(root.id(), NodeId::ROOT);
    /// assert_eq!(root.title(), "");
    /// assert!(root.parent().is_none());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let mut hierarchy = Hierarchy::default();
        hierarchy.insert_orphan(NodeId::ROOT);
        let mut data = HashMap::new();
        data.insert(NodeId::ROOT, NodeData::default());

        Self {
            hierarchy,
            data,
            last_id: NodeId::ROOT,
        }
    }

    /// Loads a tree from a serialized document.
    ///
    /// # Errors
    ///
    /// * [`LoadError::Malformed`] if the text is not valid JSON.
    /// * [`LoadError::InvalidTree`] if the JSON value does not describe a
    ///   valid tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use arborea::{NodeId, Tree};
    ///
    /// let tree = Tree::from_json(
    ///     r#"[{"id":0,"title":"root","content":"","children":[],"parent":null}]"#,
    /// )?;
    /// assert_eq!(tree.node(NodeId::ROOT).map(|node| node.title()), Some("root"));
    /// assert!(tree.node(NodeId::new(5)).is_none());
    /// # Ok::<_, arborea::LoadError>(())
    /// ```
    #[instrument(level = "debug", skip(text), fields(len = text.len()))]
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let descriptors = document::parse(text)?;
        Self::from_descriptors(descriptors)
    }

    /// Builds a tree from already parsed node descriptors.
    ///
    /// The first descriptor must be the root. The order of descriptors
    /// becomes the storage order of the tree.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidTree`] if the descriptors do not describe
    /// a valid tree.
    pub fn from_descriptors(descriptors: Vec<NodeDescriptor>) -> Result<Self, LoadError> {
        let tree = document::build(descriptors)?;
        debug!(nodes = tree.len(), last_id = %tree.last_id, "loaded tree");
        Ok(tree)
    }

    /// Assembles a tree from validated parts.
    #[must_use]
    pub(crate) fn from_parts(
        hierarchy: Hierarchy,
        data: HashMap<NodeId, NodeData>,
        last_id: NodeId,
    ) -> Self {
        debug_assert_eq!(hierarchy.len(), data.len());
        debug_assert!(hierarchy
            .neighbors(NodeId::ROOT)
            .map_or(false, |nbs| nbs.parent().is_none()));
        Self {
            hierarchy,
            data,
            last_id,
        }
    }

    /// Replaces the whole tree with the one in the serialized document.
    ///
    /// On failure, the tree is left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`from_json`][`Self::from_json`].
    pub fn import(&mut self, text: &str) -> Result<(), LoadError> {
        *self = Self::from_json(text)?;
        Ok(())
    }

    /// Exports the tree as a pretty-printed JSON document.
    ///
    /// The root comes first, and the other nodes follow in storage order.
    ///
    /// # Examples
    ///
    /// ```
    /// use arborea::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let node = tree.create_node("A", "");
    /// tree.append_child(tree.root_id(), node)?;
    ///
    /// let expected = r#"[
    ///   {
    ///     "id": 0,
    ///     "title": "",
    ///     "content": "",
    ///     "children": [
    ///       1
    ///     ],
    ///     "parent": null
    ///   },
    ///   {
    ///     "id": 1,
    ///     "title": "A",
    ///     "content": "",
    ///     "children": [],
    ///     "parent": 0
    ///   }
    /// ]"#;
    /// assert_eq!(tree.export(), expected);
    /// # Ok::<_, arborea::StructureError>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn export(&self) -> String {
        self.export_with(ExportFormat::Pretty)
    }

    /// Exports the tree as a JSON document in the given format.
    #[must_use]
    pub fn export_with(&self, format: ExportFormat) -> String {
        let text = document::render(&self.to_descriptors(), format);
        debug!(nodes = self.len(), ?format, "exported tree");
        text
    }

    /// Returns descriptors of all nodes in storage order.
    #[must_use]
    pub fn to_descriptors(&self) -> Vec<NodeDescriptor> {
        self.iter()
            .map(|node| NodeDescriptor {
                id: node.id(),
                title: node.title().to_owned(),
                content: node.content().to_owned(),
                children: node.child_ids().to_vec(),
                parent: node.parent_id(),
            })
            .collect()
    }

    /// Returns the number of nodes, including the root and orphans.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.hierarchy.len()
    }

    /// Always returns false, since a tree has at least the root node.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if the node is a member of the tree.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.hierarchy.contains(id)
    }

    /// Returns the ID of the root node.
    #[inline]
    #[must_use]
    pub fn root_id(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns the root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node::new(self, NodeId::ROOT).expect("[validity] the root node always exists")
    }

    /// Returns the root node for modification.
    #[inline]
    #[must_use]
    pub fn root_mut(&mut self) -> NodeMut<'_> {
        NodeMut::new(self, NodeId::ROOT).expect("[validity] the root node always exists")
    }

    /// Returns a [proxy object][`Node`] to the node.
    ///
    /// Returns `None` if the tree has no node with the ID.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        Node::new(self, id)
    }

    /// Returns a [proxy object][`NodeMut`] to the mutable node.
    ///
    /// Returns `None` if the tree has no node with the ID.
    #[inline]
    #[must_use]
    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        NodeMut::new(self, id)
    }

    /// Returns an iterator of all nodes in storage order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Nodes<'_> {
        Nodes::new(self)
    }

    /// Returns an iterator of orphan nodes in storage order.
    ///
    /// Orphans are non-root nodes without a parent.
    pub fn orphans(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.iter().filter(Node::is_orphan)
    }

    /// Returns the depth-first traverser of the subtree under the node.
    ///
    /// Returns `None` if the tree has no node with the ID.
    #[inline]
    #[must_use]
    pub fn depth_first_traverse(&self, id: NodeId) -> Option<DepthFirstTraverse<'_>> {
        self.node(id).map(|node| node.depth_first_traverse())
    }

    /// Returns the pretty-printable proxy object to the subtree under the node.
    ///
    /// Returns `None` if the tree has no node with the ID.
    #[inline]
    #[must_use]
    pub fn debug_print(&self, id: NodeId) -> Option<DebugPrint<'_>> {
        self.node(id).map(|node| node.debug_print())
    }

    /// Returns the neighbors of the node.
    #[inline]
    #[must_use]
    pub(crate) fn neighbors(&self, id: NodeId) -> Option<&Neighbors> {
        self.hierarchy.neighbors(id)
    }

    /// Returns the hierarchy.
    #[inline]
    #[must_use]
    pub(crate) fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Returns the data of the node.
    #[inline]
    #[must_use]
    pub(crate) fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.data.get(&id)
    }

    /// Returns the mutable data of the node.
    #[inline]
    #[must_use]
    pub(crate) fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.data.get_mut(&id)
    }

    /// Returns `Ok(())` if the node is a member, or `InvalidArgument` otherwise.
    fn ensure_member(&self, id: NodeId) -> Result<(), StructureError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(StructureError::not_a_member(id))
        }
    }

    /// Creates a new orphan node.
    ///
    /// The new node gets an ID larger than any ID this tree has ever used,
    /// and it is a member of the tree immediately. Attach it with
    /// [`append_child`][`Self::append_child`].
    ///
    /// # Panics
    ///
    /// Panics if the node ID overflows.
    ///
    /// # Examples
    ///
    /// ```
    /// use arborea::{NodeId, Tree};
    ///
    /// let mut tree = Tree::new();
    /// let first = tree.create_node("first", "");
    /// let second = tree.create_node("second", "");
    /// assert_eq!(first, NodeId::new(1));
    /// assert_eq!(second, NodeId::new(2));
    ///
    /// let node = tree.node(second).expect("should never fail: node exists");
    /// assert!(node.is_orphan());
    /// ```
    #[instrument(level = "debug", skip(self, title, content))]
    pub fn create_node(&mut self, title: impl Into<String>, content: impl Into<String>) -> NodeId {
        let id = self
            .last_id
            .checked_next()
            .expect("[precondition] node ID overflowed presumably due to too many node creations");
        self.hierarchy.insert_orphan(id);
        self.data.insert(
            id,
            NodeData {
                title: title.into(),
                content: content.into(),
            },
        );
        self.last_id = id;
        debug!(%id, "created node");

        id
    }

    /// Deletes the node from the tree.
    ///
    /// The target can be given as a [`NodeId`] or a raw `u64`.
    /// The node is detached from its parent before removal.
    ///
    /// If `recursive` is true, all descendants are deleted as well, children
    /// before their parents. The check for every failure happens before any
    /// modification, so a failed call leaves the tree untouched.
    ///
    /// Returns `Ok(false)` if the target is not a member of the tree.
    ///
    /// # Errors
    ///
    /// * [`StructureError::RootDeletion`] if the target is the root node,
    ///   regardless of `recursive`.
    /// * [`StructureError::NodeHasChildren`] if the target has children and
    ///   `recursive` is false.
    ///
    /// # Examples
    ///
    /// ```
    /// use arborea::{StructureError, Tree};
    ///
    /// let mut tree = Tree::new();
    /// let parent = tree.root_mut().create_child("parent", "");
    /// let child = tree.create_child(parent, "child", "")?;
    ///
    /// assert_eq!(
    ///     tree.delete_node(parent, false),
    ///     Err(StructureError::NodeHasChildren(parent))
    /// );
    /// assert_eq!(tree.delete_node(parent, true), Ok(true));
    /// assert!(!tree.contains(child));
    /// assert_eq!(tree.delete_node(parent, true), Ok(false));
    /// # Ok::<_, StructureError>(())
    /// ```
    #[instrument(level = "debug", skip(self, target))]
    pub fn delete_node(
        &mut self,
        target: impl Into<NodeId>,
        recursive: bool,
    ) -> Result<bool, StructureError> {
        let id = target.into();
        let nbs = match self.neighbors(id) {
            Some(v) => v,
            None => return Ok(false),
        };
        if id.is_root() {
            return Err(StructureError::RootDeletion);
        }
        if !nbs.children().is_empty() && !recursive {
            return Err(StructureError::NodeHasChildren(id));
        }

        // Close events of the depth-first traversal come in post-order.
        let doomed = self
            .depth_first_traverse(id)
            .expect("[consistency] the node has been checked to be alive")
            .filter_map(|ev| ev.as_close().map(|node| node.id()))
            .collect::<Vec<_>>();
        for &node in &doomed {
            self.hierarchy.detach(node);
            self.hierarchy.remove(node);
            self.data.remove(&node);
        }
        debug!(%id, removed = doomed.len(), "deleted node");

        Ok(true)
    }

    /// Detaches `child` and appends it as the last child of `parent`.
    ///
    /// If `child` already has a parent (including `parent` itself), it is
    /// removed from that parent's children first.
    ///
    /// # Errors
    ///
    /// * [`StructureError::InvalidArgument`] if either node is not a member,
    ///   or if `child` is the root node while `parent` is not its descendant.
    /// * [`StructureError::Cycle`] if `child` is `parent` or an ancestor of
    ///   `parent`.
    #[instrument(level = "debug", skip(self))]
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StructureError> {
        self.ensure_member(parent)?;
        self.ensure_member(child)?;
        if self.hierarchy.is_ancestor_or_self(child, parent) {
            return Err(StructureError::Cycle { parent, child });
        }
        if child.is_root() {
            return Err(StructureError::InvalidArgument {
                node: child,
                reason: "the root node cannot have a parent",
            });
        }

        self.hierarchy.append_child(child, parent);
        Ok(())
    }

    /// Detaches `child` from `parent`.
    ///
    /// The detached node stays in the tree as an orphan.
    ///
    /// # Errors
    ///
    /// * [`StructureError::InvalidArgument`] if either node is not a member.
    /// * [`StructureError::NotAChild`] if `child` is not a child of `parent`.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StructureError> {
        self.ensure_child(parent, child)?;
        self.hierarchy.detach(child);
        Ok(())
    }

    /// Creates a new node and appends it as the last child of `parent`.
    ///
    /// Returns the ID of the new node.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::InvalidArgument`] if `parent` is not a
    /// member. No node is created in that case.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<NodeId, StructureError> {
        self.ensure_member(parent)?;
        let child = self.create_node(title, content);
        self.hierarchy.append_child(child, parent);
        Ok(child)
    }

    /// Detaches `child` from `parent` and deletes it from the tree.
    ///
    /// This never deletes descendants: a child which has children of its own
    /// is rejected before anything is modified.
    ///
    /// # Errors
    ///
    /// * [`StructureError::InvalidArgument`] if either node is not a member.
    /// * [`StructureError::NotAChild`] if `child` is not a child of `parent`.
    /// * [`StructureError::NodeHasChildren`] if `child` has children.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StructureError> {
        self.ensure_child(parent, child)?;
        let deleted = self.delete_node(child, false)?;
        debug_assert!(deleted, "[consistency] the child has been checked to be alive");
        Ok(())
    }

    /// Returns `Ok(())` if `child` is a child of `parent`.
    fn ensure_child(&self, parent: NodeId, child: NodeId) -> Result<(), StructureError> {
        self.ensure_member(parent)?;
        let child_parent = self
            .neighbors(child)
            .ok_or_else(|| StructureError::not_a_member(child))?
            .parent();
        if child_parent != Some(parent) {
            return Err(StructureError::NotAChild { parent, child });
        }
        Ok(())
    }
}

impl Default for Tree {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Tree {
    type Err = LoadError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = Node<'a>;
    type IntoIter = Nodes<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Tree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.to_descriptors())
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let descriptors = Vec::<NodeDescriptor>::deserialize(deserializer)?;
        Self::from_descriptors(descriptors).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::InvalidTreeReason;

    #[test]
    fn fresh_tree_has_only_root() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.contains(NodeId::ROOT));
        assert_eq!(tree.orphans().count(), 0);
    }

    #[test]
    fn failed_import_keeps_tree() {
        let mut tree = Tree::new();
        tree.create_node("kept", "");
        let before = tree.export();

        let err = tree.import("[]").expect_err("empty document");
        assert!(matches!(
            err,
            LoadError::InvalidTree(InvalidTreeReason::Empty)
        ));
        assert_eq!(tree.export(), before);
    }

    #[test]
    fn import_replaces_tree() {
        let mut tree = Tree::new();
        tree.create_node("dropped", "");
        tree.import(r#"[{"id":0,"title":"new","content":"","children":[],"parent":null}]"#)
            .expect("valid document");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().title(), "new");
    }

    #[test]
    fn deleting_highest_id_does_not_reuse_it() {
        let mut tree = Tree::new();
        let a = tree.create_node("a", "");
        assert_eq!(tree.delete_node(a, false), Ok(true));
        let b = tree.create_node("b", "");
        assert_eq!(b, NodeId::new(2));
    }

    #[test]
    fn serde_embedding() {
        let mut tree = Tree::new();
        tree.root_mut().create_child("child", "text");
        let value = serde_json::to_value(&tree).expect("serializable");
        let restored: Tree = serde_json::from_value(value).expect("deserializable");
        assert_eq!(restored.export(), tree.export());

        let err = serde_json::from_str::<Tree>("[]").expect_err("empty document");
        assert!(err.to_string().contains("document has no nodes"));
    }
}
