use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use legisgraph::legisgraph::{BuildOptions, LegisGraph, RunSummary};
use legisgraph::resolution::{normalize, CitationParser, InstrumentRegistry};
use legisgraph::types::{CanonicalId, Reference};

/// Builds a cross-reference graph of Canadian federal legislation.
#[derive(Parser)]
#[command(name = "legisgraph", about = "Citation normalization and cross-reference graph for federal legislation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init {
        /// Project path (default: current directory)
        path: Option<String>,
    },
    /// Assemble the graph from every source and write both exports
    Build {
        /// Project path (default: current directory)
        path: Option<String>,
        /// Turtle output file (overrides the configured path)
        #[arg(long)]
        ttl: Option<PathBuf>,
        /// SQLite output file (overrides the configured path)
        #[arg(long)]
        sqlite: Option<PathBuf>,
        /// Fail without exporting when a fact file does not parse
        #[arg(long)]
        strict: bool,
    },
    /// Print the canonical identifier of each citation
    Normalize {
        /// Raw citations
        #[arg(required = true)]
        citations: Vec<String>,
    },
    /// Print the references found in a historical note
    ParseNote {
        /// Note text
        text: String,
        /// Instrument to treat as registered (repeatable)
        #[arg(short, long)]
        known: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("legisgraph=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Runs a command. `Ok(false)` is a completed run that must still exit non-zero.
fn run(cli: Cli) -> legisgraph::errors::Result<bool> {
    match cli.command {
        Commands::Init { path } => {
            let project_path = resolve_path(path);
            LegisGraph::init(&project_path)?;
            println!("Initialized legisgraph at {}", project_path.display());
        }
        Commands::Build {
            path,
            ttl,
            sqlite,
            strict,
        } => {
            let project_path = resolve_path(path);
            let lg = LegisGraph::open(&project_path)?;
            let summary = lg.build(&BuildOptions {
                turtle: ttl,
                sqlite,
                strict,
            })?;
            print_summary(&summary);
            if strict && !summary.parse_passed {
                return Ok(false);
            }
        }
        Commands::Normalize { citations } => {
            for citation in &citations {
                println!("{}", normalize(citation));
            }
        }
        Commands::ParseNote { text, known } => {
            let registry: InstrumentRegistry = known.iter().map(|k| CanonicalId::new(k)).collect();
            let parser = CitationParser::new(&registry);
            for reference in parser.parse_references(&text) {
                println!("{}", describe(&reference));
            }
        }
    }
    Ok(true)
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Parsed {} triples from {} fact files in {}ms",
        summary.triple_count, summary.fact_files, summary.duration_ms
    );
    println!(
        "English acts: {}, regulations: {}, documents: {} processed, {} missing",
        summary.registry.english_acts,
        summary.registry.english_regulations,
        summary.registry.documents_processed,
        summary.registry.documents_missing
    );
    for diagnostic in &summary.diagnostics {
        println!("  {}", diagnostic);
    }
    if !summary.parse_passed {
        println!("Fact-file parsing errors occurred.");
    }
    println!("Unresolved references: {}", summary.unresolved.len());
    for entry in &summary.unresolved {
        println!("  {} ({})", entry.citation, entry.context);
    }
    if let Some(path) = &summary.turtle_path {
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &summary.sqlite_path {
        println!("Wrote {}", path.display());
    }
}

fn describe(reference: &Reference) -> String {
    match reference {
        Reference::Chapter {
            year,
            chapter,
            target,
        } => format!("chapter  {target} (year {year}, chapter {chapter})"),
        Reference::Section { target, section } => format!("section  {target} s. {section}"),
        Reference::SectionList { target, sections } => {
            format!("sections {target} ss. {}", sections.join(", "))
        }
        Reference::Instrument { target } => format!("instrument {target}"),
        Reference::Unresolved { citation, text } => format!("unresolved {citation:?} in {text:?}"),
    }
}

/// Resolves an optional path argument to a `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
