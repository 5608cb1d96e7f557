use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Literal, Term, Triple};

/// In-memory triple graph with a prefix table.
///
/// Triples are kept in a set, so a fact asserted by several overlapping
/// sources is stored once; two literals are the same fact only if their
/// language tags match too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
    prefixes: BTreeMap<String, String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with the given prefix table.
    pub fn with_prefixes(prefixes: &BTreeMap<String, String>) -> Self {
        Self {
            triples: BTreeSet::new(),
            prefixes: prefixes.clone(),
        }
    }

    /// Adds a triple. Returns `false` if the graph already held it.
    pub fn add(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Adds a `subject predicate <object>` triple between two URIs.
    pub fn add_uri(&mut self, subject: &str, predicate: &str, object: &str) -> bool {
        self.add(Triple {
            subject: Term::uri(subject),
            predicate: predicate.to_string(),
            object: Term::uri(object),
        })
    }

    /// Adds a `subject predicate "literal"` triple.
    pub fn add_literal(&mut self, subject: &str, predicate: &str, literal: Literal) -> bool {
        self.add(Triple {
            subject: Term::uri(subject),
            predicate: predicate.to_string(),
            object: Term::Literal(literal),
        })
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Declares a prefix, replacing any earlier namespace for it.
    pub fn set_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// All triples in subject, predicate, object order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples with the given subject URI.
    pub fn about<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.subject.as_uri() == Some(subject))
    }

    /// Objects of every `subject predicate ?o` triple.
    pub fn objects<'a>(
        &'a self,
        subject: &'a str,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.about(subject)
            .filter(move |t| t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Splits a URI into the prefix and local part of the longest matching
    /// namespace, or `None` if no namespace matches.
    pub fn split_uri<'a>(&'a self, uri: &'a str) -> Option<(&'a str, &'a str)> {
        self.prefixes
            .iter()
            .filter(|(_, namespace)| !namespace.is_empty() && uri.starts_with(namespace.as_str()))
            .max_by(|(pa, na), (pb, nb)| na.len().cmp(&nb.len()).then_with(|| pb.cmp(pa)))
            .map(|(prefix, namespace)| (prefix.as_str(), &uri[namespace.len()..]))
    }

    /// Compresses a URI to `prefix:local` using the longest matching
    /// namespace, or returns it unchanged.
    pub fn short_form(&self, uri: &str) -> String {
        match self.split_uri(uri) {
            Some((prefix, local)) => format!("{prefix}:{local}"),
            None => uri.to_string(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_prefers_longest_namespace() {
        let mut graph = Graph::new();
        graph.set_prefix("ca", "https://www.canada.ca/");
        graph.set_prefix("si", "https://www.canada.ca/en/si/");
        assert_eq!(graph.short_form("https://www.canada.ca/en/si/SOR-1"), "si:SOR-1");
        assert_eq!(graph.short_form("https://www.canada.ca/fr"), "ca:fr");
        assert_eq!(graph.short_form("https://example.org/x"), "https://example.org/x");
    }

    #[test]
    fn language_tag_distinguishes_literals() {
        let mut graph = Graph::new();
        assert!(graph.add_literal("urn:a", "urn:p", Literal::plain("Loi")));
        assert!(graph.add_literal("urn:a", "urn:p", Literal::tagged("Loi", "fr")));
        assert!(!graph.add_literal("urn:a", "urn:p", Literal::tagged("Loi", "fr")));
        assert_eq!(graph.len(), 2);
    }
}
