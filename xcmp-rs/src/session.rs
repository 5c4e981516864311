//! Compare session: the pair of trees a user works on.
//!
//! A session holds the schema tree (the candidate) and the document tree (the
//! reference). Comparing marks schema nodes that the document lacks; adding
//! grafts schema nodes into the document; saving writes the document tree.
//! Loading a new file replaces the matching slot wholesale.

use std::fs;
use std::path::{Path, PathBuf};

use crate::build::{to_serializable_tree, DocumentBuilder, SchemaFlattener, TreeBuilder};
use crate::compare::{CompareSummary, TreeComparator};
use crate::error::{Error, Result};
use crate::merge::{BulkOutcome, GraftOutcome, TreeMerger};
use crate::node::{FlagObserver, NodeInner, NodeRef};
use crate::xml::{
    parse_str, print_to_string, print_to_string_pretty, save_to_path, XmlElement,
    XmlPrinterOptions,
};

/// File extension of plain documents.
pub const FILTER_XML: &str = "xml";

/// File extension of schemas.
pub const FILTER_XSD: &str = "xsd";

/// Which flattening strategy applies to a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A plain document; every element becomes a node.
    Xml,
    /// A schema; only named declarations become nodes.
    Xsd,
}

impl SourceKind {
    /// Maps a file extension (without the dot, any case) to a source kind.
    pub fn from_extension(ext: &str) -> Result<Self> {
        if ext.eq_ignore_ascii_case(FILTER_XML) {
            Ok(SourceKind::Xml)
        } else if ext.eq_ignore_ascii_case(FILTER_XSD) {
            Ok(SourceKind::Xsd)
        } else {
            Err(Error::UnknownSourceKind(ext.to_string()))
        }
    }

    /// Picks the source kind from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext)
    }

    /// Returns the file extension used as a selection filter.
    pub fn filter(self) -> &'static str {
        match self {
            SourceKind::Xml => FILTER_XML,
            SourceKind::Xsd => FILTER_XSD,
        }
    }

    /// Returns the tree builder for this kind.
    pub fn builder(self) -> &'static dyn TreeBuilder {
        match self {
            SourceKind::Xml => &DocumentBuilder,
            SourceKind::Xsd => &SchemaFlattener,
        }
    }
}

/// Receives failures the caller wants to show to the user.
pub trait MessageService {
    /// Shows `message` under `title`.
    fn show(&self, message: &str, title: &str);
}

/// A loaded tree and where it came from.
#[derive(Debug, Clone)]
struct LoadedTree {
    root: NodeRef,
    path: Option<PathBuf>,
}

/// Holds the schema and document trees and runs operations between them.
pub struct CompareSession {
    schema: Option<LoadedTree>,
    document: Option<LoadedTree>,
    observer: Box<dyn FlagObserver>,
}

impl Default for CompareSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CompareSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        CompareSession {
            schema: None,
            document: None,
            observer: Box::new(()),
        }
    }

    /// Reports every flag transition caused by later operations to `observer`.
    pub fn set_observer(&mut self, observer: Box<dyn FlagObserver>) {
        self.observer = observer;
    }

    /// Builds a tree from `text` and stores it in the slot for `kind`.
    pub fn load_str(&mut self, kind: SourceKind, text: &str) -> Result<NodeRef> {
        self.load(kind, text, None)
    }

    /// Loads a file, picking the slot from its extension.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<NodeRef> {
        let kind = SourceKind::from_path(path.as_ref())?;
        self.load_file_as(kind, path)
    }

    /// Loads a file into the slot for `kind`, whatever its extension.
    pub fn load_file_as<P: AsRef<Path>>(&mut self, kind: SourceKind, path: P) -> Result<NodeRef> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        self.load(kind, &text, Some(path.to_path_buf()))
    }

    fn load(&mut self, kind: SourceKind, text: &str, path: Option<PathBuf>) -> Result<NodeRef> {
        let element = parse_str(text)?;
        let root = kind.builder().build(&element)?;
        tracing::info!(
            kind = kind.filter(),
            path = ?path,
            root = %root.borrow(),
            "Loaded tree"
        );
        let loaded = LoadedTree {
            root: root.clone(),
            path,
        };
        match kind {
            SourceKind::Xml => self.document = Some(loaded),
            SourceKind::Xsd => self.schema = Some(loaded),
        }
        Ok(root)
    }

    /// Returns the schema tree, if loaded.
    pub fn schema(&self) -> Option<&NodeRef> {
        self.schema.as_ref().map(|t| &t.root)
    }

    /// Returns the document tree, if loaded.
    pub fn document(&self) -> Option<&NodeRef> {
        self.document.as_ref().map(|t| &t.root)
    }

    /// Returns the file the schema was loaded from.
    pub fn schema_path(&self) -> Option<&Path> {
        self.schema.as_ref().and_then(|t| t.path.as_deref())
    }

    /// Returns the file the document was loaded from.
    pub fn document_path(&self) -> Option<&Path> {
        self.document.as_ref().and_then(|t| t.path.as_deref())
    }

    /// Returns true when both trees are loaded.
    pub fn can_compare(&self) -> bool {
        self.schema.is_some() && self.document.is_some()
    }

    /// Returns true when both trees are loaded.
    pub fn can_save(&self) -> bool {
        self.can_compare()
    }

    /// Returns `(schema, document)`, or a precondition error naming `action`.
    fn trees(&self, action: &str) -> Result<(NodeRef, NodeRef)> {
        match (self.schema(), self.document()) {
            (Some(schema), Some(document)) => Ok((schema.clone(), document.clone())),
            _ => Err(Error::Precondition(format!(
                "cannot {action}: load both an xml document and an xsd schema first"
            ))),
        }
    }

    /// Marks schema nodes whose path is absent from the document.
    pub fn compare(&mut self) -> Result<CompareSummary> {
        let (schema, document) = self.trees("compare")?;
        let summary =
            TreeComparator::with_observer(self.observer.as_mut()).compare(&schema, &document);
        tracing::info!(
            compared = summary.compared,
            missing = summary.missing,
            "Compared schema against document"
        );
        Ok(summary)
    }

    /// Grafts one schema node into the document.
    pub fn add_node(&mut self, node: &NodeRef) -> Result<GraftOutcome> {
        let (_, document) = self.trees("add")?;
        let outcome = self.merger().add_node(node, &document)?;
        tracing::info!(
            node = %node.borrow(),
            created = outcome.created,
            "Added node to document"
        );
        Ok(outcome)
    }

    /// Grafts a schema node and its missing descendants into the document.
    pub fn add_node_and_children(&mut self, node: &NodeRef) -> Result<BulkOutcome> {
        let (_, document) = self.trees("add")?;
        let outcome = self.merger().add_node_and_children(node, &document)?;
        tracing::info!(
            node = %node.borrow(),
            grafted = outcome.grafted,
            created = outcome.created,
            "Added node and children to document"
        );
        Ok(outcome)
    }

    /// Grafts every missing schema node into the document.
    pub fn add_all_missing(&mut self) -> Result<BulkOutcome> {
        let (schema, document) = self.trees("add")?;
        let outcome = self.merger().add_all_missing(&schema, &document)?;
        tracing::info!(
            grafted = outcome.grafted,
            created = outcome.created,
            "Added all missing nodes to document"
        );
        Ok(outcome)
    }

    fn merger(&mut self) -> TreeMerger<&mut (dyn FlagObserver + 'static)> {
        TreeMerger::with_observer(self.observer.as_mut())
    }

    /// Finds a schema node by a `/`-separated name path, starting at the root.
    pub fn find_schema_node(&self, path: &str) -> Option<NodeRef> {
        let names: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        NodeInner::find_path_from_ref(self.schema()?, &names)
    }

    /// Returns the document tree as an element tree ready for printing.
    pub fn to_serializable(&self) -> Result<XmlElement> {
        let (_, document) = self.trees("save")?;
        Ok(to_serializable_tree(&document))
    }

    /// Renders the document tree as XML text.
    pub fn render(&self, options: &XmlPrinterOptions) -> Result<String> {
        let element = self.to_serializable()?;
        let text = if options.pretty_print {
            print_to_string_pretty(&element)?
        } else {
            print_to_string(&element)?
        };
        Ok(text)
    }

    /// Writes the document tree to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, options: XmlPrinterOptions) -> Result<()> {
        let element = self.to_serializable()?;
        save_to_path(&element, path.as_ref(), options)?;
        tracing::info!(path = %path.as_ref().display(), "Saved document");
        Ok(())
    }

    /// Shows `err` through `service`: the message is the cause and the title
    /// is the error category.
    pub fn report(err: &Error, service: &dyn MessageService) {
        tracing::warn!(title = err.title(), "{err}");
        service.show(&err.to_string(), err.title());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{FlagChange, NodeFlags};
    use std::cell::RefCell;
    use std::rc::Rc;

    const XSD: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="a">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="b"/>
                <xs:element name="d" default="4"/>
              </xs:sequence>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;

    const XML: &str = "<a><b/><c>3</c></a>";

    fn loaded() -> CompareSession {
        let mut session = CompareSession::new();
        session.load_str(SourceKind::Xsd, XSD).unwrap();
        session.load_str(SourceKind::Xml, XML).unwrap();
        session
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(String, String)>>);

    impl MessageService for Recorder {
        fn show(&self, message: &str, title: &str) {
            self.0.borrow_mut().push((message.to_string(), title.to_string()));
        }
    }

    #[test]
    fn test_source_kind() {
        assert_eq!(SourceKind::from_extension("XSD").unwrap(), SourceKind::Xsd);
        assert_eq!(
            SourceKind::from_path(Path::new("dir/doc.xml")).unwrap(),
            SourceKind::Xml
        );
        assert!(matches!(
            SourceKind::from_path(Path::new("notes.txt")),
            Err(Error::UnknownSourceKind(_))
        ));
        assert_eq!(SourceKind::Xsd.filter(), "xsd");
    }

    #[test]
    fn test_preconditions() {
        let mut session = CompareSession::new();
        assert!(!session.can_compare());
        assert!(!session.can_save());
        assert!(matches!(session.compare(), Err(Error::Precondition(_))));
        assert!(matches!(session.to_serializable(), Err(Error::Precondition(_))));

        session.load_str(SourceKind::Xml, XML).unwrap();
        assert!(!session.can_compare());
        assert!(matches!(session.add_all_missing(), Err(Error::Precondition(_))));

        session.load_str(SourceKind::Xsd, XSD).unwrap();
        assert!(session.can_compare());
        assert!(session.can_save());
    }

    #[test]
    fn test_compare_add_and_save() {
        let mut session = loaded();
        let summary = session.compare().unwrap();
        assert_eq!(summary.compared, 3);
        assert_eq!(summary.missing, 1);

        let d = session.find_schema_node("a/d").unwrap();
        assert!(d.borrow().is_missing());

        let outcome = session.add_node(&d).unwrap();
        assert_eq!(outcome.created, 1);
        assert!(!d.borrow().is_missing());

        let text = session.render(&XmlPrinterOptions::default()).unwrap();
        assert!(text.contains("<a><b /><c>3</c><d>4</d></a>"));
    }

    #[test]
    fn test_add_all_missing() {
        let mut session = loaded();
        session.compare().unwrap();
        let outcome = session.add_all_missing().unwrap();
        assert_eq!(outcome.grafted, 1);
        assert_eq!(session.compare().unwrap().missing, 0);
    }

    #[test]
    fn test_failed_load_keeps_previous_tree() {
        let mut session = loaded();
        let before = session.document().unwrap().clone();

        let err = session.load_str(SourceKind::Xml, "<a><b></a>").unwrap_err();
        assert_eq!(err.title(), "ParseError");
        assert!(Rc::ptr_eq(session.document().unwrap(), &before));

        let err = session.load_str(SourceKind::Xsd, "<root/>").unwrap_err();
        assert!(matches!(err, Error::SchemaShape { found: 0 }));
        assert!(session.schema().is_some());
    }

    #[test]
    fn test_reload_replaces_tree() {
        let mut session = loaded();
        session.compare().unwrap();
        let first = session.document().unwrap().clone();
        session.load_str(SourceKind::Xml, "<a><b/><d>4</d></a>").unwrap();
        assert!(!Rc::ptr_eq(session.document().unwrap(), &first));
        assert_eq!(session.compare().unwrap().missing, 0);
    }

    #[test]
    fn test_load_and_save_files() {
        let dir = tempfile::tempdir().unwrap();
        let xsd_path = dir.path().join("schema.xsd");
        let xml_path = dir.path().join("doc.xml");
        let out_path = dir.path().join("out.xml");
        fs::write(&xsd_path, XSD).unwrap();
        fs::write(&xml_path, XML).unwrap();

        let mut session = CompareSession::new();
        session.load_file(&xsd_path).unwrap();
        session.load_file(&xml_path).unwrap();
        assert_eq!(session.schema_path(), Some(xsd_path.as_path()));
        assert_eq!(session.document_path(), Some(xml_path.as_path()));

        session.compare().unwrap();
        session.add_all_missing().unwrap();
        session
            .save(&out_path, XmlPrinterOptions { pretty_print: true })
            .unwrap();

        let mut reloaded = CompareSession::new();
        reloaded.load_file(&xsd_path).unwrap();
        reloaded.load_file_as(SourceKind::Xml, &out_path).unwrap();
        assert_eq!(reloaded.compare().unwrap().missing, 0);

        let missing = session.load_file(dir.path().join("gone.xml")).unwrap_err();
        assert_eq!(missing.title(), "IoError");
    }

    #[test]
    fn test_observer_receives_changes() {
        let changes = Rc::new(RefCell::new(Vec::new()));

        struct Shared(Rc<RefCell<Vec<FlagChange>>>);
        impl FlagObserver for Shared {
            fn flag_changed(&mut self, change: FlagChange) {
                self.0.borrow_mut().push(change);
            }
        }

        let mut session = loaded();
        session.set_observer(Box::new(Shared(changes.clone())));
        session.compare().unwrap();
        assert!(changes
            .borrow()
            .iter()
            .any(|c| c.name == "d" && c.flag == NodeFlags::MISSING && c.value));
    }

    #[test]
    fn test_report() {
        let recorder = Recorder::default();
        CompareSession::report(&Error::Parse("bad input".into()), &recorder);
        assert_eq!(
            recorder.0.borrow().as_slice(),
            &[("bad input".to_string(), "ParseError".to_string())]
        );
    }
}
