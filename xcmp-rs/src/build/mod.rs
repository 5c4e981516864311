//! Conversion between parsed XML and comparison trees.
//!
//! Two builders turn an [`XmlElement`] into a comparison tree: the
//! [`DocumentBuilder`] maps every element to a node, while the
//! [`SchemaFlattener`] keeps only schema elements that carry a `name`
//! attribute. [`to_serializable_tree`] goes the other way.

mod document;
mod schema;

pub use document::DocumentBuilder;
pub use schema::{flatten_all, SchemaFlattener};

use crate::error::Result;
use crate::node::NodeRef;
use crate::xml::XmlElement;

/// Trait for building a comparison tree from a parsed document.
///
/// This allows callers to pick the flattening strategy at runtime, depending
/// on whether the source is a plain document or a schema.
pub trait TreeBuilder {
    /// Builds the comparison tree rooted at the single top-level node.
    fn build(&self, root: &XmlElement) -> Result<NodeRef>;
}

/// Converts a comparison tree into an element tree for printing.
///
/// The node name becomes the tag and a non-empty value becomes the text
/// content, both trimmed. Children keep their order.
pub fn to_serializable_tree(node: &NodeRef) -> XmlElement {
    let node = node.borrow();
    let mut element = XmlElement::new(node.name().trim());
    if !node.value().is_empty() {
        element.push_text(node.value().trim());
    }
    for child in node.children() {
        element.push_child(to_serializable_tree(child));
    }
    element
}
