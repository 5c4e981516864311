//! Comparison trees from XSD schemas.
//!
//! Schemas wrap the meaningful declarations (`element`, `attribute`, ...) in
//! structural elements such as `complexType` or `sequence` that have no
//! `name` attribute. Flattening keeps the named elements and splices the
//! children of unnamed ones into the level where the wrapper stood.

use super::TreeBuilder;
use crate::error::{Error, Result};
use crate::node::{new_node, NodeInner, NodeRef};
use crate::xml::XmlElement;

/// Attribute that makes a schema element a node.
const NAME_ATTR: &str = "name";

/// Attribute that supplies the node value.
const DEFAULT_ATTR: &str = "default";

/// Flattens a schema into a tree of named nodes.
///
/// The schema must resolve to exactly one top-level named element.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaFlattener;

impl TreeBuilder for SchemaFlattener {
    fn build(&self, root: &XmlElement) -> Result<NodeRef> {
        let mut nodes = flatten_all(root);
        if nodes.len() != 1 {
            tracing::debug!(found = nodes.len(), "Schema has no single top-level node");
            return Err(Error::SchemaShape { found: nodes.len() });
        }
        let node = nodes.remove(0);
        tracing::debug!(
            root = node.borrow().name(),
            descendants = NodeInner::descendants_of_ref(&node).count(),
            "Flattened schema"
        );
        Ok(node)
    }
}

/// Flattens `element` and returns the nodes produced at its level.
///
/// A named element yields one node; an unnamed element yields whatever its
/// children yield, in order.
pub fn flatten_all(element: &XmlElement) -> Vec<NodeRef> {
    let mut out = Vec::new();
    flatten_into(element, &mut out);
    out
}

fn flatten_into(element: &XmlElement, out: &mut Vec<NodeRef>) {
    let Some(name) = element.attribute(NAME_ATTR) else {
        for child in element.child_elements() {
            flatten_into(child, out);
        }
        return;
    };

    let node = new_node(name, element.attribute(DEFAULT_ATTR).unwrap_or_default());
    let mut children = Vec::new();
    for child in element.child_elements() {
        flatten_into(child, &mut children);
    }
    for child in children {
        NodeInner::attach_child_to_ref(&node, child);
    }
    out.push(node);
}
