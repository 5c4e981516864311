//! xcmp - XML/XSD structural comparison and merge
//!
//! This library compares the structure of an XML document with the structure
//! implied by an XSD schema, flags the schema nodes the document lacks, and
//! grafts selected missing nodes into the document.
//!
//! # Overview
//!
//! Both inputs are turned into comparison trees of named, optionally valued
//! nodes. A plain document maps one element to one node. A schema is
//! flattened: only elements carrying a `name` attribute become nodes, with the
//! `default` attribute as value, and unnamed wrappers (`complexType`,
//! `sequence`, ...) are spliced away.
//!
//! A node is present in the other tree when its whole path from the root,
//! compared by name and value, exists there. Sibling order is irrelevant.
//!
//! # Example
//!
//! ```
//! use xml_xcmp::{CompareSession, SourceKind};
//!
//! let mut session = CompareSession::new();
//! session.load_str(SourceKind::Xsd, r#"<e name="a"><s><e name="b"/><e name="c"/></s></e>"#)?;
//! session.load_str(SourceKind::Xml, "<a><b/></a>")?;
//!
//! assert_eq!(session.compare()?.missing, 1);
//! session.add_all_missing()?;
//! assert_eq!(session.compare()?.missing, 0);
//! # Ok::<(), xml_xcmp::Error>(())
//! ```

pub mod build;
pub mod compare;
pub mod error;
pub mod merge;
pub mod node;
pub mod session;
pub mod xml;

// Re-export commonly used types
pub use build::{to_serializable_tree, DocumentBuilder, SchemaFlattener, TreeBuilder};
pub use compare::{compare, contains, missing_nodes, CompareSummary, TreeComparator};
pub use error::{Error, Result};
pub use merge::{BulkOutcome, GraftOutcome, TreeMerger};
pub use node::{
    new_node, new_node_ref, node_equals, Descendants, FlagChange, FlagObserver, NodeFlags,
    NodeInner, NodeRef, WeakNodeRef,
};
pub use session::{CompareSession, MessageService, SourceKind, FILTER_XML, FILTER_XSD};
pub use xml::{
    parse_file, parse_str, print_to_string, print_to_string_pretty, save_to_path, XmlContent,
    XmlElement, XmlParser, XmlPrinter, XmlPrinterOptions,
};
