//! Debug printer.

use core::fmt;

use crate::tree::traverse::DftEvent;
use crate::tree::Node;

/// Indent for a line, given whether each open ancestor is the last sibling.
fn write_indent(f: &mut fmt::Formatter<'_>, levels: &[bool], is_first_line: bool) -> fmt::Result {
    let (last, outer) = match levels.split_last() {
        Some(v) => v,
        None => return Ok(()),
    };
    for &is_last_item in outer {
        f.write_str(if is_last_item { "    " } else { "|   " })?;
    }
    f.write_str(match (*last, is_first_line) {
        (false, true) => "|-- ",
        (true, true) => "`-- ",
        (false, false) => "|   ",
        (true, false) => "    ",
    })
}

/// Tree printer for debugging.
///
/// Each node is printed as its ID and its title. Multi-line titles are
/// continued under the same indent.
///
/// This is provided mainly for debugging purpose. Note that the output
/// format is not guaranteed to be stable.
///
/// # Examples
///
/// ```
/// use arborea::Tree;
///
/// let mut tree = Tree::new();
/// tree.root_mut().set_title("root");
/// let a = tree.root_mut().create_child("a", "");
/// tree.create_child(a, "a-0", "")?;
/// tree.create_child(a, "a-1", "")?;
/// tree.root_mut().create_child("b", "");
///
/// let expected = "\
/// #0 root
/// |-- #1 a
/// |   |-- #2 a-0
/// |   `-- #3 a-1
/// `-- #4 b";
/// assert_eq!(tree.root().debug_print().to_string(), expected);
/// # Ok::<_, arborea::StructureError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DebugPrint<'a> {
    /// Root node of the (sub)tree to print.
    node: Node<'a>,
}

impl<'a> DebugPrint<'a> {
    /// Creates a new `DebugPrint` object for the node.
    #[inline]
    #[must_use]
    pub(crate) fn new(node: Node<'a>) -> Self {
        Self { node }
    }
}

impl fmt::Display for DebugPrint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Whether each open node below the toplevel is the last sibling.
        let mut levels: Vec<bool> = Vec::new();

        for ev in self.node.depth_first_traverse() {
            let node = match ev {
                DftEvent::Open(node) => node,
                DftEvent::Close(node) => {
                    if node.id() != self.node.id() {
                        levels.pop();
                    }
                    continue;
                }
            };
            if node.id() != self.node.id() {
                let is_last_sibling = node
                    .parent()
                    .and_then(|parent| parent.child_ids().last().copied())
                    == Some(node.id());
                levels.push(is_last_sibling);
                f.write_str("\n")?;
            }

            write_indent(f, &levels, true)?;
            write!(f, "#{}", node.id())?;
            let mut lines = node.title().split('\n');
            if let Some(first) = lines.next().filter(|line| !line.is_empty()) {
                write!(f, " {first}")?;
            }
            for line in lines {
                f.write_str("\n")?;
                write_indent(f, &levels, false)?;
                f.write_str(line)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Tree;

    #[test]
    fn single_node() {
        let tree = Tree::new();
        assert_eq!(tree.root().debug_print().to_string(), "#0");
    }

    #[test]
    fn multiline_title() {
        let mut tree = Tree::new();
        let a = tree.root_mut().create_child("first\nsecond", "");
        tree.root_mut().create_child("b", "");
        tree.create_child(a, "a-0", "").expect("a is alive");

        let expected = "\
#0
|-- #1 first
|   second
|   `-- #3 a-0
`-- #2 b";
        assert_eq!(tree.root().debug_print().to_string(), expected);
    }

    #[test]
    fn subtree_of_last_child() {
        let mut tree = Tree::new();
        tree.root_mut().create_child("a", "");
        let b = tree.root_mut().create_child("b", "");
        tree.create_child(b, "b-0", "").expect("b is alive");

        let printed = tree.debug_print(b).expect("b is alive").to_string();
        assert_eq!(printed, "#2 b\n`-- #3 b-0");
    }
}
