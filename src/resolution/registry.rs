use std::collections::BTreeSet;

use crate::types::CanonicalId;

/// Set of instrument identifiers known so far in the run.
///
/// Populated incrementally as sources are ingested and queried while
/// historical notes are resolved. A lookup only sees what was registered
/// before it; an instrument registered later stays unresolved for every
/// citation parsed earlier, so source order affects resolution.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    ids: BTreeSet<CanonicalId>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identifier. Returns `true` if it was not known before;
    /// registering a known identifier is a no-op.
    pub fn register(&mut self, id: CanonicalId) -> bool {
        if id.is_empty() {
            return false;
        }
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &CanonicalId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Registered identifiers in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalId> {
        self.ids.iter()
    }
}

impl FromIterator<CanonicalId> for InstrumentRegistry {
    fn from_iter<I: IntoIterator<Item = CanonicalId>>(iter: I) -> Self {
        let mut registry = InstrumentRegistry::new();
        for id in iter {
            registry.register(id);
        }
        registry
    }
}
