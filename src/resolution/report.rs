use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One citation that could not be matched to a known instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedEntry {
    /// The citation as it appeared, before normalization.
    pub citation: String,
    /// The text the citation was found in.
    pub context: String,
}

/// Accumulates unresolved citations for end-of-run reporting.
///
/// Keyed by citation; recording the same citation again keeps the most
/// recent context. Purely diagnostic: nothing here affects the outcome of
/// a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnresolvedReport {
    entries: BTreeMap<String, String>,
}

impl UnresolvedReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, citation: impl Into<String>, context: impl Into<String>) {
        self.entries.insert(citation.into(), context.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, citation: &str) -> bool {
        self.entries.contains_key(citation)
    }

    /// Context recorded for a citation, if it is unresolved.
    pub fn context(&self, citation: &str) -> Option<&str> {
        self.entries.get(citation).map(String::as_str)
    }

    /// All entries, ordered by citation.
    pub fn entries(&self) -> Vec<UnresolvedEntry> {
        self.entries
            .iter()
            .map(|(citation, context)| UnresolvedEntry {
                citation: citation.clone(),
                context: context.clone(),
            })
            .collect()
    }
}
