//! Depth-first descendant traversal.

use std::rc::Rc;

use super::NodeRef;

/// Pre-order iterator over the descendants of a node, excluding the node
/// itself.
///
/// Children are read from the tree as the walk reaches them, so a fresh
/// iterator always reflects the current shape of the tree.
pub struct Descendants {
    stack: Vec<NodeRef>,
}

impl Descendants {
    pub(super) fn new(node: &NodeRef) -> Self {
        let stack = node.borrow().children().iter().rev().cloned().collect();
        Descendants { stack }
    }
}

impl Iterator for Descendants {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.borrow().children().iter().rev().map(Rc::clone));
        Some(node)
    }
}
