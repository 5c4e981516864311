//! XML parsing and output.
//!
//! This module is the boundary between text and the comparison engine: the
//! parser turns document text into an [`XmlElement`] tree, and the printer
//! turns an element tree back into text.

mod element;
mod parser;
mod printer;

pub use element::{XmlContent, XmlElement};
pub use parser::{parse_file, parse_str, XmlParser};
pub use printer::{
    print_to_string, print_to_string_pretty, save_to_path, XmlPrinter, XmlPrinterOptions,
};
