//! Parsed XML element trees.
//!
//! `XmlElement` is the document representation exchanged with the parser and
//! the printer. It keeps element names, attributes in document order, and the
//! interleaving of text and child elements.

/// A piece of element content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    /// A nested element.
    Element(XmlElement),
    /// Character data, already unescaped.
    Text(String),
}

/// An XML element with a local name, attributes and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    content: Vec<XmlContent>,
}

impl XmlElement {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Adds an attribute, replacing an existing one with the same name.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push_child(child);
        self
    }

    /// Appends character data.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Sets an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.content.push(XmlContent::Element(child));
    }

    /// Appends character data, merging with a preceding text run.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.content.last_mut() {
            Some(XmlContent::Text(existing)) => existing.push_str(&text),
            _ => self.content.push(XmlContent::Text(text)),
        }
    }

    /// Returns the local name (prefix stripped).
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// Returns the value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the raw content list.
    pub fn content(&self) -> &[XmlContent] {
        &self.content
    }

    /// Returns the child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.content.iter().filter_map(|c| match c {
            XmlContent::Element(e) => Some(e),
            XmlContent::Text(_) => None,
        })
    }

    /// Returns true if the element has at least one child element.
    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Returns the concatenated text of this element and all its descendants.
    pub fn text_value(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for c in &self.content {
            match c {
                XmlContent::Text(t) => out.push_str(t),
                XmlContent::Element(e) => e.collect_text(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_value_concatenates_descendants() {
        let e = XmlElement::new("p")
            .with_text("a")
            .with_child(XmlElement::new("b").with_text("b"))
            .with_text("c");
        assert_eq!(e.text_value(), "abc");
        assert!(e.has_child_elements());
        assert_eq!(e.child_elements().count(), 1);
    }

    #[test]
    fn test_attributes() {
        let mut e = XmlElement::new("element")
            .with_attribute("name", "a")
            .with_attribute("default", "1");
        assert_eq!(e.attribute("name"), Some("a"));
        assert_eq!(e.attribute("missing"), None);
        e.set_attribute("name", "b");
        assert_eq!(e.attribute("name"), Some("b"));
        assert_eq!(e.attributes().len(), 2);
    }

    #[test]
    fn test_adjacent_text_merges() {
        let e = XmlElement::new("t").with_text("x").with_text("").with_text("y");
        assert_eq!(e.content(), &[XmlContent::Text("xy".to_string())]);
        assert!(!e.has_child_elements());
    }
}
