//! Hand-curated fact files.
//!
//! Curated facts and prefix declarations live in a directory of `.ttl`
//! (Turtle) and `.nt` (N-Triples) files, read with `oxttl`. Syntax errors
//! are collected with their line and column and never stop the walk: the
//! parser resumes after the broken statement. A file with any other
//! extension aborts the walk.

use std::fs;
use std::path::{Path, PathBuf};

use oxttl::{NTriplesParser, TurtleParseError, TurtleParser};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{LegisGraphError, Result};
use crate::types::{Literal, Term, Triple};

/// Serialization of a fact file; only these are accepted in the facts
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactSyntax {
    Turtle,
    NTriples,
}

impl FactSyntax {
    /// Syntax for a file extension, `None` if it is not a fact file.
    pub fn from_extension(ext: &str) -> Option<FactSyntax> {
        match ext.to_ascii_lowercase().as_str() {
            "ttl" => Some(FactSyntax::Turtle),
            "nt" => Some(FactSyntax::NTriples),
            _ => None,
        }
    }

    /// Syntax of the file at `path`. Turtle reads N-Triples too, so it is
    /// the fallback for unknown extensions.
    pub fn for_path(path: &str) -> FactSyntax {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FactSyntax::from_extension)
            .unwrap_or(FactSyntax::Turtle)
    }
}

/// Facts and prefixes read from one or more files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactSet {
    /// Prefix declarations, sorted by alias within each file.
    pub prefixes: Vec<(String, String)>,
    pub triples: Vec<Triple>,
}

impl FactSet {
    fn merge(&mut self, other: FactSet) {
        self.prefixes.extend(other.prefixes);
        self.triples.extend(other.triples);
    }
}

/// Accumulated result of reading a facts directory.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub facts: FactSet,
    /// `RecordParse` errors, in file then position order.
    pub diagnostics: Vec<LegisGraphError>,
    pub files: usize,
}

impl ParseOutcome {
    /// `true` when every statement of every file parsed.
    pub fn passed(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Reads every fact file below `dir`, in path order.
///
/// Fails with `SourceFormat` on the first file whose extension is not a
/// fact-file extension.
pub fn load_fact_dir(dir: &Path) -> Result<ParseOutcome> {
    if !dir.is_dir() {
        return Err(LegisGraphError::Source {
            message: "facts directory does not exist".to_string(),
            path: dir.display().to_string(),
        });
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| LegisGraphError::Source {
            message: format!("failed to walk facts directory: {e}"),
            path: dir.display().to_string(),
        })?;
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    paths
        .iter()
        .try_fold(ParseOutcome::default(), |mut outcome, path| {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if FactSyntax::from_extension(&ext).is_none() {
                return Err(LegisGraphError::SourceFormat {
                    message: format!("unexpected file extension '{ext}'"),
                    path: path.display().to_string(),
                });
            }
            let content = fs::read_to_string(path).map_err(|e| LegisGraphError::Source {
                message: format!("failed to read fact file: {e}"),
                path: path.display().to_string(),
            })?;
            let (facts, diagnostics) = parse_facts(&path.display().to_string(), &content);
            for diagnostic in &diagnostics {
                warn!("{diagnostic}");
            }
            debug!(path = %path.display(), triples = facts.triples.len(), "parsed fact file");
            outcome.facts.merge(facts);
            outcome.diagnostics.extend(diagnostics);
            outcome.files += 1;
            Ok(outcome)
        })
}

/// Parses the content of one fact file, choosing the syntax from the
/// extension of `path`.
///
/// Returns the facts of every well-formed statement and a `RecordParse`
/// error for every malformed one.
pub fn parse_facts(path: &str, content: &str) -> (FactSet, Vec<LegisGraphError>) {
    let mut facts = FactSet::default();
    let mut errors = Vec::new();

    match FactSyntax::for_path(path) {
        FactSyntax::Turtle => {
            let mut reader = TurtleParser::new().for_reader(content.as_bytes());
            for result in reader.by_ref() {
                match result {
                    Ok(triple) => facts.triples.push(convert_triple(triple)),
                    Err(e) => errors.push(record_parse_error(path, e)),
                }
            }
            facts.prefixes = reader
                .prefixes()
                .map(|(prefix, namespace)| (prefix.to_string(), namespace.to_string()))
                .collect();
            facts.prefixes.sort();
        }
        FactSyntax::NTriples => {
            for result in NTriplesParser::new().for_reader(content.as_bytes()) {
                match result {
                    Ok(triple) => facts.triples.push(convert_triple(triple)),
                    Err(e) => errors.push(record_parse_error(path, e)),
                }
            }
        }
    }

    (facts, errors)
}

fn convert_triple(triple: oxrdf::Triple) -> Triple {
    let subject = match triple.subject {
        oxrdf::Subject::NamedNode(node) => Term::Uri(node.into_string()),
        oxrdf::Subject::BlankNode(node) => Term::Blank(node.as_str().to_string()),
    };
    let object = match triple.object {
        oxrdf::Term::NamedNode(node) => Term::Uri(node.into_string()),
        oxrdf::Term::BlankNode(node) => Term::Blank(node.as_str().to_string()),
        // Datatypes are not kept; typed literals become their lexical form.
        oxrdf::Term::Literal(literal) => Term::Literal(match literal.language() {
            Some(language) => Literal::tagged(literal.value(), language.to_ascii_lowercase()),
            None => Literal::plain(literal.value()),
        }),
    };
    Triple {
        subject,
        predicate: triple.predicate.into_string(),
        object,
    }
}

/// Positions are 1-based; an I/O failure has no position and reports 0.
fn record_parse_error(path: &str, error: TurtleParseError) -> LegisGraphError {
    match error {
        TurtleParseError::Syntax(e) => {
            let start = e.location().start;
            LegisGraphError::RecordParse {
                message: e.message().to_string(),
                path: path.to_string(),
                line: start.line as usize + 1,
                column: start.column as usize + 1,
            }
        }
        other => LegisGraphError::RecordParse {
            message: other.to_string(),
            path: path.to_string(),
            line: 0,
            column: 0,
        },
    }
}
