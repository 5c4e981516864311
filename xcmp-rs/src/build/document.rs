//! Comparison trees from plain documents.

use super::TreeBuilder;
use crate::error::Result;
use crate::node::{new_node, NodeInner, NodeRef};
use crate::xml::XmlElement;

/// Builds a node for every element, one to one.
///
/// A node's value is the element's text when it has no child elements, and
/// empty otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentBuilder;

impl DocumentBuilder {
    fn build_node(element: &XmlElement) -> NodeRef {
        let value = if element.has_child_elements() {
            String::new()
        } else {
            element.text_value()
        };
        let node = new_node(element.local_name(), value);
        for child in element.child_elements() {
            NodeInner::attach_child_to_ref(&node, Self::build_node(child));
        }
        node
    }
}

impl TreeBuilder for DocumentBuilder {
    fn build(&self, root: &XmlElement) -> Result<NodeRef> {
        let node = Self::build_node(root);
        tracing::debug!(
            root = root.local_name(),
            descendants = NodeInner::descendants_of_ref(&node).count(),
            "Built document tree"
        );
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;
    use std::rc::Rc;

    fn build(xml: &str) -> NodeRef {
        DocumentBuilder.build(&parse_str(xml).unwrap()).unwrap()
    }

    #[test]
    fn test_every_element_becomes_a_node() {
        let root = build("<a><b>1</b><c><d>2</d></c></a>");
        let root_b = root.borrow();
        assert_eq!(root_b.name(), "a");
        assert_eq!(root_b.value(), "");
        assert_eq!(root_b.child_count(), 2);

        let b = root_b.children()[0].borrow();
        assert_eq!((b.name(), b.value()), ("b", "1"));

        let c = root_b.children()[1].borrow();
        assert_eq!((c.name(), c.value()), ("c", ""));
        let d = c.children()[0].borrow();
        assert_eq!((d.name(), d.value()), ("d", "2"));
    }

    #[test]
    fn test_path_length_matches_depth() {
        let root = build("<a><b><c><d/></c></b></a>");
        let d = NodeInner::find_path_from_ref(&root, &["a", "b", "c", "d"]).unwrap();
        let path = NodeInner::path_of_ref(&d);
        assert_eq!(path.len(), 4);
        assert!(Rc::ptr_eq(&path[0], &root));
        assert!(Rc::ptr_eq(&path[3], &d));
    }

    #[test]
    fn test_containers_have_no_value() {
        let root = build("<a>text<b>1</b>more</a>");
        assert_eq!(root.borrow().value(), "");
        for node in NodeInner::descendants_of_ref(&root) {
            let node = node.borrow();
            assert!(node.child_count() == 0 || node.value().is_empty());
        }
    }

    #[test]
    fn test_building_sets_no_flags() {
        let root = build("<a><b/></a>");
        assert!(root.borrow().flags().is_empty());
        assert!(NodeInner::descendants_of_ref(&root).all(|n| n.borrow().flags().is_empty()));
    }
}
