//! Grafting missing nodes into a reference tree.
//!
//! A graft walks the path of a candidate node down the reference tree. Path
//! steps that already exist are reused; the first step that does not exist is
//! cloned and attached, and so is every step after it. Nodes are copied, never
//! moved, so the candidate tree is left intact.

use std::rc::Rc;

use crate::compare::{CompareSummary, TreeComparator};
use crate::error::{Error, Result};
use crate::node::{new_node_ref, node_equals, FlagObserver, NodeInner, NodeRef};

/// Result of a single graft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraftOutcome {
    /// Number of nodes created in the reference tree.
    pub created: usize,
    /// Comparison of the candidate tree after the graft.
    pub summary: CompareSummary,
}

/// Result of a bulk graft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Number of missing nodes that were grafted.
    pub grafted: usize,
    /// Total number of nodes created in the reference tree.
    pub created: usize,
    /// Comparison of the candidate tree after the last graft.
    pub summary: CompareSummary,
}

/// Grafts candidate nodes into a reference tree and re-runs the comparison.
pub struct TreeMerger<O: FlagObserver = ()> {
    comparator: TreeComparator<O>,
}

impl TreeMerger<()> {
    /// Creates a merger that discards flag transitions.
    pub fn new() -> Self {
        TreeMerger {
            comparator: TreeComparator::new(),
        }
    }
}

impl Default for TreeMerger<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: FlagObserver> TreeMerger<O> {
    /// Creates a merger reporting flag transitions in both trees to `observer`.
    pub fn with_observer(observer: O) -> Self {
        TreeMerger {
            comparator: TreeComparator::with_observer(observer),
        }
    }

    /// Consumes the merger and returns the observer.
    pub fn into_observer(self) -> O {
        self.comparator.into_observer()
    }

    /// Grafts `node` into the tree rooted at `reference_root`.
    ///
    /// Missing ancestors are created along the way. Afterwards the whole
    /// candidate tree containing `node` is compared again, so grafted nodes
    /// stop being reported missing.
    ///
    /// Fails with [`Error::RootMismatch`] without modifying anything when the
    /// root of `node`'s tree does not equal `reference_root`.
    pub fn add_node(&mut self, node: &NodeRef, reference_root: &NodeRef) -> Result<GraftOutcome> {
        let path = NodeInner::path_of_ref(node);
        let mut created = 0;
        let mut parent: Option<NodeRef> = None;
        let mut candidates = vec![Rc::clone(reference_root)];

        for step in &path {
            let found = candidates.iter().find(|c| node_equals(c, step)).cloned();
            let current = match (found, &parent) {
                (Some(found), _) => found,
                (None, Some(parent)) => {
                    let copy = new_node_ref(step.borrow().shallow_clone());
                    tracing::debug!(
                        node = %copy.borrow(),
                        parent = %parent.borrow(),
                        "Grafting node"
                    );
                    NodeInner::add_child_to_ref(
                        parent,
                        Rc::clone(&copy),
                        self.comparator.observer_mut(),
                    );
                    created += 1;
                    copy
                }
                (None, None) => {
                    return Err(Error::RootMismatch {
                        expected: reference_root.borrow().header(),
                        found: step.borrow().header(),
                    })
                }
            };
            candidates = current.borrow().children().to_vec();
            parent = Some(current);
        }

        let candidate_root = &path[0];
        let summary = self.comparator.compare(candidate_root, reference_root);
        Ok(GraftOutcome { created, summary })
    }

    /// Grafts `node` and every missing node below it.
    pub fn add_node_and_children(
        &mut self,
        node: &NodeRef,
        reference_root: &NodeRef,
    ) -> Result<BulkOutcome> {
        let nodes: Vec<NodeRef> = std::iter::once(Rc::clone(node))
            .chain(NodeInner::descendants_of_ref(node).filter(|n| n.borrow().is_missing()))
            .collect();
        self.add_each(&nodes, reference_root)
    }

    /// Grafts every node of the candidate tree that is marked missing.
    ///
    /// The missing set is taken from the most recent comparison before any
    /// graft happens.
    pub fn add_all_missing(
        &mut self,
        candidate_root: &NodeRef,
        reference_root: &NodeRef,
    ) -> Result<BulkOutcome> {
        let nodes: Vec<NodeRef> = NodeInner::descendants_of_ref(candidate_root)
            .filter(|n| n.borrow().is_missing())
            .collect();
        self.add_each(&nodes, reference_root)
    }

    fn add_each(&mut self, nodes: &[NodeRef], reference_root: &NodeRef) -> Result<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        for node in nodes {
            let graft = self.add_node(node, reference_root)?;
            outcome.grafted += 1;
            outcome.created += graft.created;
            outcome.summary = graft.summary;
        }
        tracing::debug!(
            grafted = outcome.grafted,
            created = outcome.created,
            "Bulk graft finished"
        );
        Ok(outcome)
    }
}
