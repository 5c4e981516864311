//! Example: Add every missing schema node to a document
//!
//! Usage: cargo run --example merge <schema.xsd> <document.xml> [output.xml]

use std::env;
use xml_xcmp::{CompareSession, SourceKind, XmlPrinterOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 || args.len() > 4 {
        eprintln!(
            "Usage: {} <schema.xsd> <document.xml> [output.xml]",
            args[0]
        );
        std::process::exit(1);
    }

    let mut session = CompareSession::new();
    session.load_file_as(SourceKind::Xsd, &args[1])?;
    session.load_file_as(SourceKind::Xml, &args[2])?;

    session.compare()?;
    let outcome = session.add_all_missing()?;
    eprintln!(
        "Grafted {} nodes, created {}.",
        outcome.grafted, outcome.created
    );

    let options = XmlPrinterOptions { pretty_print: true };
    match args.get(3) {
        Some(output) => session.save(output, options)?,
        None => print!("{}", session.render(&options)?),
    }

    Ok(())
}
