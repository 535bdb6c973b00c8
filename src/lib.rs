//! Tree of titled text nodes with lossless JSON persistence.
//!
//! This is the core of a hierarchical document editor: a [`Tree`] owns
//! nodes, each with a [`NodeId`], a title, and free-form text content.
//! Nodes are linked into a single tree under the root (ID 0); nodes may also
//! be temporarily left without a parent ("orphans") between structural
//! edits.
//!
//! The tree guarantees that:
//!
//! * the root always exists, never has a parent, and cannot be deleted,
//! * node IDs are unique and never reused by the tree that allocated them,
//! * parent and children links always agree, and
//! * no node becomes its own ancestor.
//!
//! Every operation either succeeds or leaves the tree untouched.
//!
//! # Examples
//!
//! ```
//! use arborea::{StructureError, Tree};
//!
//! let mut tree = Tree::new();
//! tree.root_mut().set_title("Trip");
//! let day1 = tree.root_mut().create_child("Day 1", "Arrive at noon.");
//! let day2 = tree.root_mut().create_child("Day 2", "");
//!
//! // A node cannot become its own descendant.
//! assert!(matches!(
//!     tree.append_child(day1, tree.root_id()),
//!     Err(StructureError::Cycle { .. })
//! ));
//!
//! // Persist and restore.
//! let saved = tree.export();
//! let restored: Tree = saved.parse()?;
//! assert_eq!(restored.root().child_ids(), [day1, day2]);
//! assert_eq!(restored.export(), saved);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod document;
pub mod error;
mod hierarchy;
mod id;
pub mod tree;

pub use self::document::{ExportFormat, NodeDescriptor};
pub use self::error::{InvalidTreeReason, LoadError, StructureError};
pub use self::id::NodeId;
pub use self::tree::traverse::DftEvent;
pub use self::tree::{Node, NodeMut, Tree};
