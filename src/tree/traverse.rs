//! Tree traversal.

use core::iter;
use core::ops::Range;
use core::slice;

use crate::tree::{Node, Tree};
use crate::NodeId;

/// Depth-first traversal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DftEvent<T> {
    /// Node open.
    Open(T),
    /// Node close.
    Close(T),
}

impl<T> DftEvent<T> {
    /// Converts the internal value.
    pub fn map<F, U>(self, f: F) -> DftEvent<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Open(v) => DftEvent::Open(f(v)),
            Self::Close(v) => DftEvent::Close(f(v)),
        }
    }

    /// Returns the value if the event is `Open`.
    #[inline]
    #[must_use]
    pub fn as_open(&self) -> Option<&T> {
        match self {
            Self::Open(v) => Some(v),
            Self::Close(_) => None,
        }
    }

    /// Returns the value if the event is `Close`.
    #[inline]
    #[must_use]
    pub fn as_close(&self) -> Option<&T> {
        match self {
            Self::Open(_) => None,
            Self::Close(v) => Some(v),
        }
    }
}

/// Iterator for depth-first traversal.
///
/// Each node yields an `Open` event before its descendants and a `Close`
/// event after them, so `Close` events come in post-order.
///
/// # Examples
///
/// ```
/// use arborea::tree::traverse::DftEvent;
/// use arborea::Tree;
///
/// let mut tree = Tree::new();
/// tree.root_mut().set_title("root");
/// let a = tree.root_mut().create_child("a", "");
/// tree.create_child(a, "a-0", "")?;
/// tree.root_mut().create_child("b", "");
///
/// let events = tree
///     .root()
///     .depth_first_traverse()
///     .map(|ev| ev.map(|node| node.title()))
///     .collect::<Vec<_>>();
/// assert_eq!(
///     events,
///     [
///         DftEvent::Open("root"),
///         DftEvent::Open("a"),
///         DftEvent::Open("a-0"),
///         DftEvent::Close("a-0"),
///         DftEvent::Close("a"),
///         DftEvent::Open("b"),
///         DftEvent::Close("b"),
///         DftEvent::Close("root"),
///     ]
/// );
/// # Ok::<_, arborea::StructureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DepthFirstTraverse<'a> {
    /// Tree.
    tree: &'a Tree,
    /// Next event to emit.
    next: Option<DftEvent<NodeId>>,
    /// Open nodes and the index of the next child to visit.
    stack: Vec<(NodeId, usize)>,
}

impl<'a> DepthFirstTraverse<'a> {
    /// Creates a new iterator.
    ///
    /// The toplevel does not need to be the root of the tree.
    #[inline]
    #[must_use]
    pub(crate) fn with_toplevel(node: Node<'a>) -> Self {
        Self {
            tree: node.tree(),
            next: Some(DftEvent::Open(node.id())),
            stack: Vec::new(),
        }
    }

    /// Returns the event following the last emitted one.
    fn advance(&mut self) -> Option<DftEvent<NodeId>> {
        let (id, next_child) = self.stack.last_mut()?;
        let children = self
            .tree
            .neighbors(*id)
            .expect("[consistency] the node being traversed must be alive")
            .children();
        match children.get(*next_child) {
            Some(&child) => {
                *next_child += 1;
                Some(DftEvent::Open(child))
            }
            None => {
                let id = *id;
                self.stack.pop();
                Some(DftEvent::Close(id))
            }
        }
    }
}

impl<'a> Iterator for DepthFirstTraverse<'a> {
    type Item = DftEvent<Node<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let ev = self.next.take()?;
        if let DftEvent::Open(id) = ev {
            self.stack.push((id, 0));
        }
        self.next = self.advance();

        let tree = self.tree;
        Some(ev.map(|id| {
            tree.node(id)
                .expect("[consistency] the node must be the part of the tree")
        }))
    }
}

impl iter::FusedIterator for DepthFirstTraverse<'_> {}

/// Iterator of a node and its ancestors.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    /// Tree.
    tree: &'a Tree,
    /// Next node to emit.
    next: Option<NodeId>,
}

impl<'a> Ancestors<'a> {
    /// Creates a new iterator starting from the given node.
    #[inline]
    #[must_use]
    pub(crate) fn with_start(tree: &'a Tree, id: NodeId) -> Self {
        Self {
            tree,
            next: Some(id),
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self
            .tree
            .node(self.next?)
            .expect("[consistency] ancestors of a live node must be alive");
        self.next = node.parent_id();
        Some(node)
    }
}

impl iter::FusedIterator for Ancestors<'_> {}

/// Iterator of children of a node.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    /// Tree.
    tree: &'a Tree,
    /// Child IDs.
    ids: slice::Iter<'a, NodeId>,
}

impl<'a> Children<'a> {
    /// Creates a new iterator.
    #[inline]
    #[must_use]
    pub(crate) fn new(tree: &'a Tree, ids: &'a [NodeId]) -> Self {
        Self {
            tree,
            ids: ids.iter(),
        }
    }

    /// Converts the ID into a node.
    fn node(&self, id: NodeId) -> Node<'a> {
        self.tree
            .node(id)
            .expect("[consistency] children of a live node must be alive")
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.ids.next()?;
        Some(self.node(id))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = *self.ids.next_back()?;
        Some(self.node(id))
    }
}

impl ExactSizeIterator for Children<'_> {}

impl iter::FusedIterator for Children<'_> {}

/// Iterator of all nodes in storage order.
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    /// Tree.
    tree: &'a Tree,
    /// Remaining storage positions.
    range: Range<usize>,
}

impl<'a> Nodes<'a> {
    /// Creates a new iterator.
    #[inline]
    #[must_use]
    pub(crate) fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            range: 0..tree.len(),
        }
    }

    /// Returns the node at the storage position.
    fn node_at(&self, index: usize) -> Node<'a> {
        let id = self
            .tree
            .hierarchy()
            .id_at(index)
            .expect("[consistency] the position must be in range");
        self.tree
            .node(id)
            .expect("[consistency] stored nodes must be alive")
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        Some(self.node_at(index))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for Nodes<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.range.next_back()?;
        Some(self.node_at(index))
    }
}

impl ExactSizeIterator for Nodes<'_> {}

impl iter::FusedIterator for Nodes<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traverse_leaf() {
        let tree = Tree::new();
        let events = tree
            .root()
            .depth_first_traverse()
            .map(|ev| ev.map(|node| node.id()))
            .collect::<Vec<_>>();
        assert_eq!(
            events,
            [DftEvent::Open(NodeId::ROOT), DftEvent::Close(NodeId::ROOT)]
        );
    }

    #[test]
    fn traverse_subtree_only() {
        let mut tree = Tree::new();
        let a = tree.root_mut().create_child("a", "");
        let a0 = tree.create_child(a, "a-0", "").expect("a is alive");
        tree.root_mut().create_child("b", "");

        let opened = tree
            .depth_first_traverse(a)
            .expect("a is alive")
            .filter_map(|ev| ev.as_open().map(|node| node.id()))
            .collect::<Vec<_>>();
        assert_eq!(opened, [a, a0]);
    }

    #[test]
    fn nodes_in_storage_order() {
        let mut tree = Tree::new();
        let a = tree.create_node("a", "");
        let b = tree.create_node("b", "");
        tree.root_mut().append_child(b).expect("b is alive");
        tree.root_mut().append_child(a).expect("a is alive");

        let ids = tree.iter().map(|node| node.id()).collect::<Vec<_>>();
        assert_eq!(ids, [NodeId::ROOT, a, b]);
        assert_eq!(tree.iter().rev().next().map(|node| node.id()), Some(b));
        assert_eq!(tree.iter().len(), 3);
    }
}
