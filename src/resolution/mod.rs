/// Citation resolution module.
///
/// Turns hand-formatted legal citations into canonical identifiers and
/// matches them against the instruments registered so far in the run.
mod citation;
mod normalize;
mod registry;
mod report;

pub use citation::{split_citation, CitationParser, Qualifier};
pub use normalize::normalize;
pub use registry::InstrumentRegistry;
pub use report::{UnresolvedEntry, UnresolvedReport};
