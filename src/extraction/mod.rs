/// Source record extraction module.
///
/// Pure helpers that turn already-parsed source values (document trees,
/// index text, fact files) into what the graph assembler consumes.
pub mod document;
pub mod facts;
pub mod index;

pub use document::{analyze, collect_text, count_words, DocumentAnalysis};
pub use facts::{load_fact_dir, parse_facts, FactSet, FactSyntax, ParseOutcome};
pub use index::{is_instrument_id, parse_index_entry, IndexListing};
