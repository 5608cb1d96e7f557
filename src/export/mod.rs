/// Graph serialization.
///
/// Two views of the same triple set: a Turtle text file and a SQLite
/// database with `TRIPLES` and `PREFIXES` tables.
pub mod sqlite;
pub mod turtle;

pub use sqlite::{encode_row, export_sqlite, TripleRow, TripleStore};
pub use turtle::{to_turtle, write_turtle};
