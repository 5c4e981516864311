//! xcmp - compare an XML document against an XSD schema and fill in what is
//! missing.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xml_xcmp::{
    CompareSession, CompareSummary, Error, MessageService, NodeRef, SourceKind, XmlPrinterOptions,
};

/// XML/XSD structural comparison tool
#[derive(Parser)]
#[command(name = "xcmp")]
#[command(version)]
#[command(about = "Compare an XML document with an XSD schema and add missing nodes", long_about = None)]
struct Cli {
    /// Log per-node decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the comparison tree of a single .xml or .xsd file
    #[command(visible_alias = "s")]
    Show {
        /// File to load; the extension selects how it is read
        file: PathBuf,
    },

    /// Mark schema nodes that the document lacks
    #[command(visible_alias = "c")]
    Compare {
        /// Schema file (.xsd)
        schema: PathBuf,
        /// Document file (.xml)
        document: PathBuf,
    },

    /// Add one schema node to the document
    #[command(visible_alias = "a")]
    Add {
        /// Schema file (.xsd)
        schema: PathBuf,
        /// Document file (.xml)
        document: PathBuf,
        /// Slash-separated node names from the schema root, e.g. `config/limits/max`
        #[arg(short, long)]
        path: String,
        /// Also add every missing node below the selected one
        #[arg(long)]
        with_children: bool,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Add every missing schema node to the document
    #[command(visible_alias = "m")]
    Merge {
        /// Schema file (.xsd)
        schema: PathBuf,
        /// Document file (.xml)
        document: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Indent the output
    #[arg(long)]
    pretty: bool,
}

/// Shows failures on stderr.
struct StderrMessages;

impl MessageService for StderrMessages {
    fn show(&self, message: &str, title: &str) {
        eprintln!("{}: {}", title, message);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Show { file } => run_show(file),
        Commands::Compare { schema, document } => run_compare(schema, document),
        Commands::Add {
            schema,
            document,
            path,
            with_children,
            output,
        } => run_add(schema, document, &path, with_children, output),
        Commands::Merge {
            schema,
            document,
            output,
        } => run_merge(schema, document, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            CompareSession::report(&e, &StderrMessages);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "xml_xcmp=debug"
    } else {
        "xml_xcmp=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Loads both files into a fresh session and compares them.
fn load_and_compare(
    schema: PathBuf,
    document: PathBuf,
) -> Result<(CompareSession, CompareSummary), Error> {
    let mut session = CompareSession::new();
    session.load_file_as(SourceKind::Xsd, schema)?;
    session.load_file_as(SourceKind::Xml, document)?;
    let summary = session.compare()?;
    Ok((session, summary))
}

fn run_show(file: PathBuf) -> Result<(), Error> {
    let mut session = CompareSession::new();
    let root = session.load_file(&file)?;
    let mut out = io::stdout().lock();
    print_tree(&mut out, &root, 0)?;
    Ok(())
}

fn run_compare(schema: PathBuf, document: PathBuf) -> Result<(), Error> {
    let (session, summary) = load_and_compare(schema, document)?;

    let mut out = io::stdout().lock();
    if let Some(root) = session.schema() {
        print_tree(&mut out, root, 0)?;
    }
    writeln!(
        out,
        "{} of {} schema nodes missing from the document",
        summary.missing, summary.compared
    )?;
    Ok(())
}

fn run_add(
    schema: PathBuf,
    document: PathBuf,
    path: &str,
    with_children: bool,
    output: OutputArgs,
) -> Result<(), Error> {
    let (mut session, _) = load_and_compare(schema, document)?;
    let node = session
        .find_schema_node(path)
        .ok_or_else(|| Error::Precondition(format!("no schema node at '{}'", path)))?;

    if with_children {
        let outcome = session.add_node_and_children(&node)?;
        eprintln!(
            "Added {} nodes ({} created), {} still missing.",
            outcome.grafted, outcome.created, outcome.summary.missing
        );
    } else {
        let outcome = session.add_node(&node)?;
        eprintln!(
            "Created {} nodes, {} still missing.",
            outcome.created, outcome.summary.missing
        );
    }
    write_document(&session, output)
}

fn run_merge(schema: PathBuf, document: PathBuf, output: OutputArgs) -> Result<(), Error> {
    let (mut session, _) = load_and_compare(schema, document)?;
    let outcome = session.add_all_missing()?;
    eprintln!(
        "Added {} missing nodes ({} created).",
        outcome.grafted, outcome.created
    );
    write_document(&session, output)
}

fn write_document(session: &CompareSession, output: OutputArgs) -> Result<(), Error> {
    let options = XmlPrinterOptions {
        pretty_print: output.pretty,
    };
    match output.output {
        Some(path) => session.save(path, options),
        None => {
            let text = session.render(&options)?;
            io::stdout().lock().write_all(text.as_bytes())?;
            Ok(())
        }
    }
}

/// Prints one node per line, indented by depth, marking missing nodes.
fn print_tree(out: &mut impl Write, node: &NodeRef, depth: usize) -> io::Result<()> {
    let children = {
        let inner = node.borrow();
        let marker = if inner.is_missing() { "  [missing]" } else { "" };
        writeln!(out, "{}{}{}", "  ".repeat(depth), inner.header(), marker)?;
        inner.children().to_vec()
    };
    for child in &children {
        print_tree(out, child, depth + 1)?;
    }
    Ok(())
}
