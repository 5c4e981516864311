//! XML printer that outputs element trees.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{XmlContent, XmlElement};
use crate::error::Result;

/// Options for XML printing.
#[derive(Debug, Clone, Default)]
pub struct XmlPrinterOptions {
    /// Whether to pretty-print with indentation.
    pub pretty_print: bool,
}

/// XML printer that outputs element trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: XmlPrinterOptions,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new XML printer.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlPrinterOptions::default())
    }

    /// Creates a new XML printer with the given options.
    pub fn with_options(writer: W, options: XmlPrinterOptions) -> Self {
        XmlPrinter { writer, options }
    }

    /// Prints a document: XML declaration followed by the element tree.
    pub fn print(&mut self, root: &XmlElement) -> std::io::Result<()> {
        write!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        if self.options.pretty_print {
            writeln!(self.writer)?;
        }
        self.print_element(root, 0)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn print_element(&mut self, element: &XmlElement, indent: usize) -> std::io::Result<()> {
        let name = element.local_name();
        self.write_indent(indent)?;
        write!(self.writer, "<{}", name)?;
        for (key, value) in element.attributes() {
            write!(self.writer, " {}=\"{}\"", key, to_entities(value))?;
        }

        if element.content().is_empty() {
            return write!(self.writer, " />");
        }
        write!(self.writer, ">")?;

        // Any text makes the content inline; indenting it would change the value.
        let inline = !self.options.pretty_print
            || element
                .content()
                .iter()
                .any(|c| matches!(c, XmlContent::Text(_)));

        for content in element.content() {
            match content {
                XmlContent::Text(text) => write!(self.writer, "{}", to_entities(text))?,
                XmlContent::Element(child) if inline => self.print_inline(child)?,
                XmlContent::Element(child) => {
                    writeln!(self.writer)?;
                    self.print_element(child, indent + 1)?;
                }
            }
        }

        if !inline {
            writeln!(self.writer)?;
            self.write_indent(indent)?;
        }
        write!(self.writer, "</{}>", name)
    }

    fn print_inline(&mut self, element: &XmlElement) -> std::io::Result<()> {
        let pretty = std::mem::take(&mut self.options.pretty_print);
        let result = self.print_element(element, 0);
        self.options.pretty_print = pretty;
        result
    }

    fn write_indent(&mut self, level: usize) -> std::io::Result<()> {
        if self.options.pretty_print {
            write!(self.writer, "{}", "  ".repeat(level))?;
        }
        Ok(())
    }
}

/// Converts special characters to XML entities.
fn to_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints an element tree to a string.
pub fn print_to_string(root: &XmlElement) -> std::io::Result<String> {
    print_with_options(root, XmlPrinterOptions::default())
}

/// Prints an element tree to a string with pretty printing.
pub fn print_to_string_pretty(root: &XmlElement) -> std::io::Result<String> {
    print_with_options(root, XmlPrinterOptions { pretty_print: true })
}

fn print_with_options(root: &XmlElement, options: XmlPrinterOptions) -> std::io::Result<String> {
    let mut output = Vec::new();
    XmlPrinter::with_options(&mut output, options).print(root)?;
    Ok(String::from_utf8_lossy(&output).to_string())
}

/// Writes an element tree as a document to `path`, replacing the file.
pub fn save_to_path<P: AsRef<Path>>(
    root: &XmlElement,
    path: P,
    options: XmlPrinterOptions,
) -> Result<()> {
    let file = File::create(path)?;
    XmlPrinter::with_options(BufWriter::new(file), options).print(root)?;
    Ok(())
}
