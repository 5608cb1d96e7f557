/// Assembles instrument facts and edges from every source.
pub mod assembler;

/// Deduplicating in-memory triple store.
pub mod store;

pub use assembler::{Assembly, DocumentSummary, GraphAssembler, RegistrySummary};
pub use store::Graph;
