use thiserror::Error;

/// Errors that can occur while building or exporting the legislation graph.
///
/// Unresolved citations are deliberately absent: they are diagnostics,
/// collected by [`crate::resolution::UnresolvedReport`], never errors.
#[derive(Error, Debug)]
pub enum LegisGraphError {
    /// A file of an unexpected type was found where only serialized triples
    /// are accepted. Fatal to the whole run.
    #[error("unexpected source format: {message} (path: {path})")]
    SourceFormat { message: String, path: String },

    /// A malformed statement inside a fact file. Recoverable; these are
    /// accumulated into a [`crate::extraction::ParseOutcome`].
    #[error("parse error: {message} (path: {path}, line: {line}, column: {column})")]
    RecordParse {
        message: String,
        path: String,
        line: usize,
        column: usize,
    },

    /// A transactional failure while writing the relational export.
    #[error("persistence error: {message} (operation: {operation})")]
    Persistence { message: String, operation: String },

    #[error("config error: {message}")]
    Config { message: String },

    /// An input file that exists but could not be read or decoded.
    #[error("source error: {message} (path: {path})")]
    Source { message: String, path: String },
}

impl LegisGraphError {
    /// Returns `true` for errors that must abort the run before any export.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LegisGraphError::RecordParse { .. })
    }
}

/// Convenience alias for results using `LegisGraphError`.
pub type Result<T> = std::result::Result<T, LegisGraphError>;
