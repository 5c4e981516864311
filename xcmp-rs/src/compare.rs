//! Presence comparison between two comparison trees.
//!
//! A node of the candidate tree is present in the reference tree when its
//! whole path, compared step by step with shallow equality, can be walked
//! down from the reference root. Sibling order never matters.

use std::rc::Rc;

use crate::node::{node_equals, FlagObserver, NodeInner, NodeRef};

/// Counts produced by a comparison run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareSummary {
    /// Number of candidate nodes visited.
    pub compared: usize,
    /// Number of candidate nodes marked missing.
    pub missing: usize,
}

/// Returns true if the reference tree rooted at `reference_root` contains the
/// full path of `node`.
pub fn contains(reference_root: &NodeRef, node: &NodeRef) -> bool {
    let mut candidates = vec![Rc::clone(reference_root)];
    for step in NodeInner::path_of_ref(node) {
        let Some(found) = candidates.iter().find(|c| node_equals(c, &step)).cloned() else {
            return false;
        };
        candidates = found.borrow().children().to_vec();
    }
    true
}

/// Marks missing nodes of a candidate tree relative to a reference tree.
///
/// Every candidate node is checked against the whole reference tree, so a
/// node's status depends only on its own path. Missing nodes have their path
/// expanded. Flag transitions are reported to the observer.
pub struct TreeComparator<O: FlagObserver = ()> {
    observer: O,
}

impl TreeComparator<()> {
    /// Creates a comparator that discards flag transitions.
    pub fn new() -> Self {
        TreeComparator { observer: () }
    }
}

impl Default for TreeComparator<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: FlagObserver> TreeComparator<O> {
    /// Creates a comparator reporting flag transitions to `observer`.
    pub fn with_observer(observer: O) -> Self {
        TreeComparator { observer }
    }

    /// Returns the observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Returns a mutable reference to the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consumes the comparator and returns the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Compares `candidate` and all its descendants against `reference_root`.
    pub fn compare(&mut self, candidate: &NodeRef, reference_root: &NodeRef) -> CompareSummary {
        let mut summary = CompareSummary::default();
        self.compare_node(candidate, reference_root, &mut summary);
        tracing::debug!(
            compared = summary.compared,
            missing = summary.missing,
            "Comparison finished"
        );
        summary
    }

    fn compare_node(
        &mut self,
        candidate: &NodeRef,
        reference_root: &NodeRef,
        summary: &mut CompareSummary,
    ) {
        let missing = !contains(reference_root, candidate);
        NodeInner::set_missing_on_ref(candidate, missing, &mut self.observer);
        summary.compared += 1;
        if missing {
            summary.missing += 1;
            tracing::debug!(node = %candidate.borrow(), "Node is missing");
            NodeInner::expand_path_of_ref(candidate, &mut self.observer);
        }

        // Expanding a child's path borrows this node mutably.
        let children = candidate.borrow().children().to_vec();
        for child in &children {
            self.compare_node(child, reference_root, summary);
        }
    }
}

/// Compares `candidate` against `reference_root` without observing flags.
pub fn compare(candidate: &NodeRef, reference_root: &NodeRef) -> CompareSummary {
    TreeComparator::new().compare(candidate, reference_root)
}

/// Returns the nodes of the tree rooted at `root` that are currently marked
/// missing, in pre-order, the root included.
pub fn missing_nodes(root: &NodeRef) -> Vec<NodeRef> {
    std::iter::once(Rc::clone(root))
        .chain(NodeInner::descendants_of_ref(root))
        .filter(|n| n.borrow().is_missing())
        .collect()
}
