//! XML parser that builds element trees.
//!
//! This parser uses quick-xml's streaming API. Element names are reduced to
//! their local part, namespace declarations are dropped, and whitespace-only
//! runs between elements are ignored. Prefixed attributes keep their qualified
//! key, so `attribute("name")` only ever sees the unprefixed attribute.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::XmlElement;
use crate::error::{Error, Result};

/// XML parser that builds element trees.
#[derive(Debug, Default)]
pub struct XmlParser;

/// Accumulated character data between two markup events.
#[derive(Default)]
struct PendingText {
    text: String,
    has_cdata: bool,
}

impl PendingText {
    fn push(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn push_cdata(&mut self, text: &str) {
        self.text.push_str(text);
        self.has_cdata = true;
    }

    /// Takes the text if it is significant.
    fn take(&mut self) -> Option<String> {
        let pending = std::mem::take(self);
        if pending.has_cdata || !pending.text.trim().is_empty() {
            Some(pending.text)
        } else {
            None
        }
    }
}

impl XmlParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        XmlParser
    }

    /// Parses XML from a string.
    pub fn parse_str(&self, xml: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<XmlElement> {
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text(false);
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a quick-xml Reader.
    fn parse_reader<R: BufRead>(&self, reader: &mut Reader<R>) -> Result<XmlElement> {
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut pending = PendingText::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    Self::flush_text(&mut pending, &mut stack)?;
                    let element = self.parse_element(e, reader)?;
                    stack.push(element);
                }
                Ok(Event::End(_)) => {
                    Self::flush_text(&mut pending, &mut stack)?;
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Parse("unexpected closing tag".to_string()))?;
                    Self::attach(element, &mut stack, &mut root)?;
                }
                Ok(Event::Empty(ref e)) => {
                    Self::flush_text(&mut pending, &mut stack)?;
                    let element = self.parse_element(e, reader)?;
                    Self::attach(element, &mut stack, &mut root)?;
                }
                Ok(Event::Text(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    pending.push(&text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let entity = format!("&{};", name);
                    let text = unescape(&entity).map_err(|e| Error::Parse(e.to_string()))?;
                    pending.push(&text);
                }
                Ok(Event::CData(ref e)) => {
                    let text =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    pending.push_cdata(text);
                }
                Ok(Event::Eof) => break,
                // Comments, declarations, processing instructions and doctypes
                // carry nothing a comparison tree needs.
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(position = reader.buffer_position(), "XML reader error");
                    return Err(Error::Xml(e));
                }
            }
            buf.clear();
        }

        Self::flush_text(&mut pending, &mut stack)?;
        if let Some(open) = stack.last() {
            return Err(Error::Parse(format!(
                "unexpected end of document: <{}> is not closed",
                open.local_name()
            )));
        }
        root.ok_or_else(|| Error::Parse("document has no root element".to_string()))
    }

    /// Adds pending text to the innermost open element.
    fn flush_text(pending: &mut PendingText, stack: &mut [XmlElement]) -> Result<()> {
        if let Some(text) = pending.take() {
            match stack.last_mut() {
                Some(parent) => parent.push_text(text),
                None => {
                    return Err(Error::Parse(
                        "text content outside the root element".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Appends a finished element to its parent, or makes it the root.
    fn attach(
        element: XmlElement,
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
    ) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.push_child(element),
            None if root.is_some() => {
                return Err(Error::Parse(format!(
                    "multiple root elements: <{}> follows the root element",
                    element.local_name()
                )))
            }
            None => *root = Some(element),
        }
        Ok(())
    }

    /// Parses an element's local name and attributes.
    fn parse_element<R: BufRead>(&self, e: &BytesStart, reader: &Reader<R>) -> Result<XmlElement> {
        let name = reader
            .decoder()
            .decode(e.local_name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        let mut element = XmlElement::new(name);
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| Error::Parse(format!("attribute error: {}", e)))?;
            let raw_key = attr.key.as_ref();
            if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
                continue;
            }
            let key = reader
                .decoder()
                .decode(raw_key)
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            element.set_attribute(key, value);
        }

        Ok(element)
    }
}

/// Parses XML from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<XmlElement> {
    XmlParser::new().parse_file(path)
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<XmlElement> {
    XmlParser::new().parse_str(xml)
}
