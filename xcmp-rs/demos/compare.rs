//! Example: Compare an XML document against an XSD schema
//!
//! Prints every schema node with a marker when the document lacks it.
//!
//! Usage: cargo run --example compare <schema.xsd> <document.xml>

use std::env;
use xml_xcmp::{missing_nodes, CompareSession, NodeInner, SourceKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <schema.xsd> <document.xml>", args[0]);
        std::process::exit(1);
    }

    let mut session = CompareSession::new();
    eprintln!("Loading schema: {}", args[1]);
    session.load_file_as(SourceKind::Xsd, &args[1])?;
    eprintln!("Loading document: {}", args[2]);
    session.load_file_as(SourceKind::Xml, &args[2])?;

    let summary = session.compare()?;
    let Some(schema) = session.schema() else {
        return Ok(());
    };

    for node in missing_nodes(schema) {
        let path: Vec<String> = NodeInner::path_of_ref(&node)
            .iter()
            .map(|n| n.borrow().name().to_string())
            .collect();
        println!("missing: {}", path.join("/"));
    }
    eprintln!(
        "{} of {} schema nodes missing.",
        summary.missing, summary.compared
    );

    Ok(())
}
