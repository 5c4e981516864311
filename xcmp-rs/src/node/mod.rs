//! Node structures for comparison trees.
//!
//! A comparison tree is a tree of named, optionally valued nodes built either
//! from a plain XML document or from a flattened XSD schema. Nodes are shared
//! through `Rc<RefCell<_>>`; children are owned by their parent and the parent
//! link is a `Weak` back-reference used only to compute paths.

mod descendants;
mod flags;

pub use descendants::Descendants;
pub use flags::{FlagChange, FlagObserver, NodeFlags};

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique node ID.
fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A reference-counted pointer to a node.
pub type NodeRef = Rc<RefCell<NodeInner>>;

/// A non-owning reference to a node.
pub type WeakNodeRef = Weak<RefCell<NodeInner>>;

/// Creates a new node reference.
pub fn new_node_ref(inner: NodeInner) -> NodeRef {
    Rc::new(RefCell::new(inner))
}

/// Creates a detached node with the given name and value.
pub fn new_node(name: impl Into<String>, value: impl Into<String>) -> NodeRef {
    new_node_ref(NodeInner::new(name, value))
}

/// The inner data of a node in a comparison tree.
///
/// Equality is shallow: two nodes are equal when their name and reported
/// value are equal, regardless of children, parent or flags.
#[derive(Debug)]
pub struct NodeInner {
    /// Unique identifier for this node.
    id: u64,
    /// Local element name.
    name: String,
    /// Scalar content. Only reported while the node has no children.
    value: String,
    /// Child nodes in insertion order.
    children: Vec<NodeRef>,
    /// Weak reference to parent node.
    parent: WeakNodeRef,
    /// Missing/expanded state.
    flags: NodeFlags,
}

impl NodeInner {
    /// Creates a new node without children or parent.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        NodeInner {
            id: next_node_id(),
            name: name.into(),
            value: value.into(),
            children: Vec::new(),
            parent: Weak::new(),
            flags: NodeFlags::empty(),
        }
    }

    /// Returns a copy carrying only name and reported value: no children, no
    /// parent, no flags, and a fresh id.
    ///
    /// The copy compares equal to `self` at the time of the call.
    pub fn shallow_clone(&self) -> NodeInner {
        NodeInner::new(self.name.clone(), self.value())
    }

    /// Returns the unique ID of this node.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scalar value, or `""` when the node has children.
    pub fn value(&self) -> &str {
        if self.children.is_empty() {
            &self.value
        } else {
            ""
        }
    }

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the children as a slice.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Returns the parent, if it is still alive.
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.upgrade()
    }

    /// Returns the current flags.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Returns true if the last comparison marked this node missing.
    pub fn is_missing(&self) -> bool {
        self.flags.contains(NodeFlags::MISSING)
    }

    /// Returns true if this node lies on a revealed path.
    pub fn is_expanded(&self) -> bool {
        self.flags.contains(NodeFlags::EXPANDED)
    }

    /// Display text: the name, followed by ` - value` when there is a value.
    pub fn header(&self) -> String {
        let value = self.value();
        if value.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, value)
        }
    }

    /// Sets or clears `flag`. Returns true if the flag flipped.
    fn set_flag(&mut self, flag: NodeFlags, on: bool) -> bool {
        if self.flags.contains(flag) == on {
            return false;
        }
        self.flags.set(flag, on);
        true
    }
}

impl PartialEq for NodeInner {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value() == other.value()
    }
}

impl Eq for NodeInner {}

impl fmt::Display for NodeInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())
    }
}

/// Helper functions that work with NodeRef.
impl NodeInner {
    /// Appends a child, links it to `parent_ref`, and expands the path to it.
    ///
    /// Any previous parent link of the child is overwritten; callers grafting
    /// from another tree should pass a [`shallow_clone`](Self::shallow_clone).
    pub fn add_child_to_ref(
        parent_ref: &NodeRef,
        child_ref: NodeRef,
        observer: &mut dyn FlagObserver,
    ) {
        Self::attach_child_to_ref(parent_ref, Rc::clone(&child_ref));
        Self::expand_path_of_ref(&child_ref, observer);
    }

    /// Appends a child and links it to `parent_ref` without touching flags.
    ///
    /// Used while building trees from documents, where nothing is revealed yet.
    pub fn attach_child_to_ref(parent_ref: &NodeRef, child_ref: NodeRef) {
        child_ref.borrow_mut().parent = Rc::downgrade(parent_ref);
        parent_ref.borrow_mut().children.push(child_ref);
    }

    /// Returns the chain of nodes from the root down to and including `node_ref`.
    pub fn path_of_ref(node_ref: &NodeRef) -> Vec<NodeRef> {
        let mut path = vec![Rc::clone(node_ref)];
        let mut current = node_ref.borrow().parent();
        while let Some(node) = current {
            current = node.borrow().parent();
            path.push(node);
        }
        path.reverse();
        path
    }

    /// Marks every node on the path to `node_ref` as expanded.
    pub fn expand_path_of_ref(node_ref: &NodeRef, observer: &mut dyn FlagObserver) {
        for node in Self::path_of_ref(node_ref) {
            Self::set_flag_on_ref(&node, NodeFlags::EXPANDED, true, observer);
        }
    }

    /// Sets the missing flag, notifying `observer` if it flips.
    pub fn set_missing_on_ref(node_ref: &NodeRef, missing: bool, observer: &mut dyn FlagObserver) {
        Self::set_flag_on_ref(node_ref, NodeFlags::MISSING, missing, observer);
    }

    fn set_flag_on_ref(
        node_ref: &NodeRef,
        flag: NodeFlags,
        on: bool,
        observer: &mut dyn FlagObserver,
    ) {
        let change = {
            let mut node = node_ref.borrow_mut();
            node.set_flag(flag, on).then(|| FlagChange {
                node_id: node.id,
                name: node.name.clone(),
                flag,
                value: on,
            })
        };
        if let Some(change) = change {
            observer.flag_changed(change);
        }
    }

    /// Returns a depth-first, pre-order iterator over the descendants of
    /// `node_ref`, excluding the node itself.
    pub fn descendants_of_ref(node_ref: &NodeRef) -> Descendants {
        Descendants::new(node_ref)
    }

    /// Finds a node by a path of names starting at `root_ref`.
    ///
    /// The first segment must name the root itself; each following segment
    /// picks the first child with that name.
    pub fn find_path_from_ref<S: AsRef<str>>(root_ref: &NodeRef, names: &[S]) -> Option<NodeRef> {
        let (first, rest) = names.split_first()?;
        if root_ref.borrow().name() != first.as_ref() {
            return None;
        }
        let mut current = Rc::clone(root_ref);
        for name in rest {
            let next = current
                .borrow()
                .children()
                .iter()
                .find(|child| child.borrow().name() == name.as_ref())
                .cloned()?;
            current = next;
        }
        Some(current)
    }
}

/// Shallow equality of two node references.
pub fn node_equals(a: &NodeRef, b: &NodeRef) -> bool {
    *a.borrow() == *b.borrow()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (NodeRef, NodeRef, NodeRef, NodeRef) {
        let a = new_node("a", "");
        let b = new_node("b", "1");
        let c = new_node("c", "");
        let d = new_node("d", "2");
        NodeInner::add_child_to_ref(&a, b.clone(), &mut ());
        NodeInner::add_child_to_ref(&a, c.clone(), &mut ());
        NodeInner::add_child_to_ref(&c, d.clone(), &mut ());
        (a, b, c, d)
    }

    #[test]
    fn test_equality_is_shallow() {
        let (a, b, _, _) = tree();
        let lone_a = new_node("a", "");
        assert!(node_equals(&a, &lone_a));
        assert!(!node_equals(&a, &b));
        assert!(node_equals(&b, &new_node("b", "1")));
        assert!(!node_equals(&b, &new_node("b", "2")));
        assert!(node_equals(&b, &b));
    }

    #[test]
    fn test_container_reports_empty_value() {
        let node = new_node("field", "5");
        assert_eq!(node.borrow().value(), "5");
        NodeInner::add_child_to_ref(&node, new_node("sub", ""), &mut ());
        assert_eq!(node.borrow().value(), "");
        assert!(node_equals(&node, &new_node("field", "")));
    }

    #[test]
    fn test_path() {
        let (a, _, c, d) = tree();
        let path = NodeInner::path_of_ref(&d);
        assert_eq!(path.len(), 3);
        assert!(Rc::ptr_eq(&path[0], &a));
        assert!(Rc::ptr_eq(&path[1], &c));
        assert!(Rc::ptr_eq(&path[2], &d));

        let root_path = NodeInner::path_of_ref(&a);
        assert_eq!(root_path.len(), 1);
    }

    #[test]
    fn test_add_child_expands_path() {
        let (a, b, c, d) = tree();
        assert!(a.borrow().is_expanded());
        assert!(b.borrow().is_expanded());
        assert!(c.borrow().is_expanded());
        assert!(d.borrow().is_expanded());
        assert!(Rc::ptr_eq(&d.borrow().parent().unwrap(), &c));
    }

    #[test]
    fn test_attach_child_leaves_flags_alone() {
        let a = new_node("a", "");
        let b = new_node("b", "");
        NodeInner::attach_child_to_ref(&a, b.clone());
        assert!(a.borrow().flags().is_empty());
        assert!(b.borrow().flags().is_empty());
        assert_eq!(NodeInner::path_of_ref(&b).len(), 2);
    }

    #[test]
    fn test_shallow_clone() {
        let (_, _, c, d) = tree();
        NodeInner::set_missing_on_ref(&c, true, &mut ());
        let copy = new_node_ref(c.borrow().shallow_clone());
        let copy = copy.borrow();
        assert_eq!(copy.name(), "c");
        assert_eq!(copy.child_count(), 0);
        assert!(copy.parent().is_none());
        assert!(copy.flags().is_empty());
        assert_ne!(copy.id(), c.borrow().id());
        assert!(d.borrow().parent().is_some());
    }

    #[test]
    fn test_flag_changes_are_reported_once() {
        let node = new_node("x", "");
        let mut changes: Vec<FlagChange> = Vec::new();
        NodeInner::set_missing_on_ref(&node, true, &mut changes);
        NodeInner::set_missing_on_ref(&node, true, &mut changes);
        NodeInner::set_missing_on_ref(&node, false, &mut changes);
        assert_eq!(changes.len(), 2);
        assert!(changes[0].value);
        assert!(!changes[1].value);
        assert_eq!(changes[0].flag, NodeFlags::MISSING);
        assert_eq!(changes[0].name, "x");
    }

    #[test]
    fn test_header() {
        assert_eq!(new_node("a", "").borrow().header(), "a");
        assert_eq!(new_node("a", "1").borrow().to_string(), "a - 1");
    }

    #[test]
    fn test_find_path() {
        let (a, _, _, d) = tree();
        let found = NodeInner::find_path_from_ref(&a, &["a", "c", "d"]).unwrap();
        assert!(Rc::ptr_eq(&found, &d));
        assert!(NodeInner::find_path_from_ref(&a, &["a", "x"]).is_none());
        assert!(NodeInner::find_path_from_ref(&a, &["b"]).is_none());
        assert!(NodeInner::find_path_from_ref::<&str>(&a, &[]).is_none());
    }
}
