//! Transient node state and flag-change observation.

use bitflags::bitflags;

bitflags! {
    /// State flags derived by comparison and merging.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The node's full path is absent from the reference tree.
        const MISSING = 1;
        /// The node lies on a path revealed by a comparison or a graft.
        const EXPANDED = 2;
    }
}

/// A single flag transition on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagChange {
    /// Id of the node whose flag changed.
    pub node_id: u64,
    /// Name of the node whose flag changed.
    pub name: String,
    /// The flag that changed.
    pub flag: NodeFlags,
    /// The new state of the flag.
    pub value: bool,
}

/// Receives flag transitions.
///
/// Observers are only notified when a flag actually flips; setting a flag to
/// the state it already has is silent.
pub trait FlagObserver {
    /// Called after `change.flag` was set to `change.value`.
    fn flag_changed(&mut self, change: FlagChange);
}

/// The unit observer discards every change.
impl FlagObserver for () {
    fn flag_changed(&mut self, _change: FlagChange) {}
}

/// Records every change in order.
impl FlagObserver for Vec<FlagChange> {
    fn flag_changed(&mut self, change: FlagChange) {
        self.push(change);
    }
}

impl<T: FlagObserver + ?Sized> FlagObserver for &mut T {
    fn flag_changed(&mut self, change: FlagChange) {
        (**self).flag_changed(change);
    }
}

impl<T: FlagObserver + ?Sized> FlagObserver for Box<T> {
    fn flag_changed(&mut self, change: FlagChange) {
        (**self).flag_changed(change);
    }
}
