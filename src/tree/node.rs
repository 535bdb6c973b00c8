//! Node.

use core::fmt;

use crate::error::StructureError;
use crate::tree::traverse::{Ancestors, Children, DepthFirstTraverse};
use crate::tree::{DebugPrint, NodeData, Tree};
use crate::NodeId;

/// Immutable reference to a node.
///
/// This type guarantees that the node ID is a member of the tree.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    /// Tree.
    tree: &'a Tree,
    /// Node ID.
    id: NodeId,
}

impl<'a> Node<'a> {
    /// Creates a new `Node` object.
    #[must_use]
    pub(super) fn new(tree: &'a Tree, id: NodeId) -> Option<Self> {
        if !tree.contains(id) {
            return None;
        }
        Some(Self { tree, id })
    }

    /// Returns the data of the node.
    #[must_use]
    fn data(&self) -> &'a NodeData {
        self.tree
            .data(self.id)
            .expect("[validity] the node has been checked to be alive")
    }

    /// Returns the tree the node belongs to.
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Returns the node ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the title.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &'a str {
        &self.data().title
    }

    /// Returns the content.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &'a str {
        &self.data().content
    }

    /// Returns the node ID of the parent.
    #[must_use]
    pub fn parent_id(&self) -> Option<NodeId> {
        self.tree
            .neighbors(self.id)
            .expect("[validity] the node has been checked to be alive")
            .parent()
    }

    /// Returns the node IDs of the children in display order.
    #[must_use]
    pub fn child_ids(&self) -> &'a [NodeId] {
        self.tree
            .neighbors(self.id)
            .expect("[validity] the node has been checked to be alive")
            .children()
    }

    /// Returns the parent node.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.parent_id()
            .map(|id| Self::new(self.tree, id).expect("[consistency] the parent must be alive"))
    }

    /// Returns an iterator of the children in display order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> Children<'a> {
        Children::new(self.tree, self.child_ids())
    }

    /// Returns true if the node is the root node.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    /// Returns true if the node is a non-root node without a parent.
    #[inline]
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        !self.is_root() && self.parent_id().is_none()
    }

    /// Returns an iterator of the node and its ancestors.
    ///
    /// Note that this returns the node itself first, and the topmost ancestor
    /// (the root, unless the node is in a detached subtree) last.
    ///
    /// # Examples
    ///
    /// ```
    /// use arborea::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let a = tree.root_mut().create_child("a", "");
    /// let b = tree.create_child(a, "b", "")?;
    ///
    /// let path = tree
    ///     .node(b)
    ///     .expect("should never fail: node exists")
    ///     .ancestors()
    ///     .map(|node| node.title())
    ///     .collect::<Vec<_>>();
    /// assert_eq!(path, ["b", "a", ""]);
    /// # Ok::<_, arborea::StructureError>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors::with_start(self.tree, self.id)
    }

    /// Returns the depth-first traverser of the subtree under the node.
    #[inline]
    #[must_use]
    pub fn depth_first_traverse(&self) -> DepthFirstTraverse<'a> {
        DepthFirstTraverse::with_toplevel(*self)
    }

    /// Returns the pretty-printable proxy object to the subtree.
    #[inline]
    #[must_use]
    pub fn debug_print(&self) -> DebugPrint<'a> {
        DebugPrint::new(*self)
    }
}

// Avoid dumping the whole tree the node refers to.
impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("title", &self.title())
            .finish()
    }
}

impl From<Node<'_>> for NodeId {
    #[inline]
    fn from(node: Node<'_>) -> Self {
        node.id
    }
}

impl From<&Node<'_>> for NodeId {
    #[inline]
    fn from(node: &Node<'_>) -> Self {
        node.id
    }
}

/// Mutable reference to a node.
///
/// Structural mutations are forwarded to the tree, which validates them.
pub struct NodeMut<'a> {
    /// Tree.
    tree: &'a mut Tree,
    /// Node ID.
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    /// Creates a new `NodeMut` object.
    #[must_use]
    pub(super) fn new(tree: &'a mut Tree, id: NodeId) -> Option<Self> {
        if !tree.contains(id) {
            return None;
        }
        Some(Self { tree, id })
    }

    /// Returns the mutable data of the node.
    #[must_use]
    fn data_mut(&mut self) -> &mut NodeData {
        self.tree
            .data_mut(self.id)
            .expect("[validity] the node has been checked to be alive")
    }

    /// Returns the node ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns an immutable proxy to the node.
    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Node<'_> {
        Node::new(&*self.tree, self.id)
            .expect("[validity] the node has been checked to be alive")
    }

    /// Returns the title.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        self.as_node().title()
    }

    /// Returns the content.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        self.as_node().content()
    }

    /// Replaces the title.
    #[inline]
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.data_mut().title = title.into();
    }

    /// Replaces the content.
    #[inline]
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.data_mut().content = content.into();
    }

    /// Returns a mutable reference to the title.
    #[inline]
    #[must_use]
    pub fn title_mut(&mut self) -> &mut String {
        &mut self.data_mut().title
    }

    /// Returns a mutable reference to the content.
    #[inline]
    #[must_use]
    pub fn content_mut(&mut self) -> &mut String {
        &mut self.data_mut().content
    }

    /// Detaches the given node and appends it as the last child of this node.
    ///
    /// Returns `self` for chaining.
    ///
    /// # Errors
    ///
    /// See [`Tree::append_child`].
    ///
    /// # Examples
    ///
    /// ```
    /// use arborea::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let a = tree.create_node("a", "");
    /// let b = tree.create_node("b", "");
    /// tree.root_mut().append_child(a)?.append_child(b)?;
    ///
    /// assert_eq!(tree.root().child_ids(), [a, b]);
    /// # Ok::<_, arborea::StructureError>(())
    /// ```
    pub fn append_child(&mut self, child: impl Into<NodeId>) -> Result<&mut Self, StructureError> {
        self.tree.append_child(self.id, child.into())?;
        Ok(self)
    }

    /// Detaches the given child from this node.
    ///
    /// The child stays in the tree as an orphan.
    ///
    /// # Errors
    ///
    /// See [`Tree::remove_child`].
    #[inline]
    pub fn remove_child(&mut self, child: impl Into<NodeId>) -> Result<(), StructureError> {
        self.tree.remove_child(self.id, child.into())
    }

    /// Creates a new node and appends it as the last child of this node.
    ///
    /// Returns the ID of the new node.
    pub fn create_child(&mut self, title: impl Into<String>, content: impl Into<String>) -> NodeId {
        self.tree
            .create_child(self.id, title, content)
            .expect("[validity] the node has been checked to be alive")
    }

    /// Detaches the given child from this node and deletes it from the tree.
    ///
    /// # Errors
    ///
    /// See [`Tree::delete_child`].
    #[inline]
    pub fn delete_child(&mut self, child: impl Into<NodeId>) -> Result<(), StructureError> {
        self.tree.delete_child(self.id, child.into())
    }
}

impl fmt::Debug for NodeMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeMut")
            .field("id", &self.id)
            .field("title", &self.title())
            .finish()
    }
}

impl From<&NodeMut<'_>> for NodeId {
    #[inline]
    fn from(node: &NodeMut<'_>) -> Self {
        node.id
    }
}
