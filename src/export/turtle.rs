use std::fs;
use std::path::Path;

use oxrdf::{BlankNodeRef, LiteralRef, NamedNodeRef};

use crate::errors::{LegisGraphError, Result};
use crate::graph::Graph;
use crate::types::{Literal, Term};

/// Serializes the graph as Turtle: the prefix declarations followed by one
/// triple per line, in the graph's sorted order.
pub fn to_turtle(graph: &Graph) -> String {
    let mut out = String::new();
    for (prefix, namespace) in graph.prefixes() {
        out.push_str(&format!("@prefix {prefix}: {} .\n", NamedNodeRef::new_unchecked(namespace)));
    }
    if !graph.prefixes().is_empty() {
        out.push('\n');
    }
    for triple in graph.iter() {
        out.push_str(&format!(
            "{} {} {} .\n",
            format_term(graph, &triple.subject),
            format_uri(graph, &triple.predicate),
            format_term(graph, &triple.object),
        ));
    }
    out
}

/// Writes the Turtle serialization to `path`, creating parent directories.
pub fn write_turtle(graph: &Graph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LegisGraphError::Persistence {
            message: format!("failed to create output directory: {e}"),
            operation: "write_turtle".to_string(),
        })?;
    }
    fs::write(path, to_turtle(graph)).map_err(|e| LegisGraphError::Persistence {
        message: format!("failed to write {}: {e}", path.display()),
        operation: "write_turtle".to_string(),
    })
}

fn format_term(graph: &Graph, term: &Term) -> String {
    match term {
        Term::Uri(uri) => format_uri(graph, uri),
        Term::Blank(label) => BlankNodeRef::new_unchecked(label).to_string(),
        Term::Literal(literal) => format_literal(literal),
    }
}

/// `prefix:local` when the local part needs no escaping, otherwise the
/// full IRI in angle brackets.
fn format_uri(graph: &Graph, uri: &str) -> String {
    match graph.split_uri(uri) {
        Some((prefix, local)) if is_plain_local(local) => format!("{prefix}:{local}"),
        _ => NamedNodeRef::new_unchecked(uri).to_string(),
    }
}

fn format_literal(literal: &Literal) -> String {
    match &literal.language {
        Some(language) => {
            LiteralRef::new_language_tagged_literal_unchecked(&literal.lexical, language).to_string()
        }
        None => LiteralRef::new_simple_literal(&literal.lexical).to_string(),
    }
}

/// ASCII subset of a Turtle local name: no escapes, no leading `-` or `.`,
/// no trailing `.`.
fn is_plain_local(local: &str) -> bool {
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    (first.is_ascii_alphanumeric() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !local.ends_with('.')
}
