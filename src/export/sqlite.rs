use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::errors::{LegisGraphError, Result};
use crate::graph::Graph;
use crate::types::{Term, Triple};

/// Drops and recreates the export tables; runs inside the insert transaction.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Indexes and compaction, run once the inserts are committed.
const FINALIZE_SQL: &str = include_str!("finalize.sql");

/// One `TRIPLES` row: subject, object, predicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TripleRow {
    pub subject: String,
    pub object: String,
    pub predicate: String,
}

/// Relational export of the graph.
///
/// Replacing the tables and inserting every row happen in one transaction,
/// so a failed export leaves the previous contents in place. The finalize
/// script runs only after the commit.
pub struct TripleStore {
    conn: Connection,
}

impl TripleStore {
    /// Opens the database at `path` for writing, creating it and its parent
    /// directories if needed. Tables are replaced by [`Self::write_graph`].
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LegisGraphError::Persistence {
                message: format!("failed to create database directory: {e}"),
                operation: "create".to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| LegisGraphError::Persistence {
            message: format!("failed to open database: {e}"),
            operation: "create".to_string(),
        })?;

        Self::apply_pragmas(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an existing export for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| LegisGraphError::Persistence {
            message: format!("failed to open database: {e}"),
            operation: "open".to_string(),
        })?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Replaces the export tables with the graph's triples and prefixes,
    /// commits, then finalizes.
    pub fn write_graph(&self, graph: &Graph) -> Result<()> {
        let rows = graph.iter().map(|triple| encode_row(graph, triple));
        let prefixes = graph
            .prefixes()
            .iter()
            .map(|(prefix, namespace)| (prefix.as_str(), namespace.as_str()));
        let written = self.replace_contents(rows, prefixes)?;
        debug!(rows = written, "Committed triple export");
        self.finalize()
    }

    fn replace_contents<'a>(
        &self,
        rows: impl IntoIterator<Item = TripleRow>,
        prefixes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| persistence(e, "write_graph"))?;
        tx.execute_batch(SCHEMA_SQL)
            .map_err(|e| persistence(e, "apply_schema"))?;

        let mut written = 0;
        {
            let mut stmt = tx
                .prepare_cached("INSERT INTO TRIPLES (SUBJECT, OBJECT, PREDICATE) VALUES (?1, ?2, ?3)")
                .map_err(|e| persistence(e, "insert_triple"))?;
            for row in rows {
                stmt.execute(params![row.subject, row.object, row.predicate])
                    .map_err(|e| persistence(e, "insert_triple"))?;
                written += 1;
            }

            let mut stmt = tx
                .prepare_cached("INSERT INTO PREFIXES (PREFIX, URL) VALUES (?1, ?2)")
                .map_err(|e| persistence(e, "insert_prefix"))?;
            for (prefix, namespace) in prefixes {
                stmt.execute(params![prefix, namespace])
                    .map_err(|e| persistence(e, "insert_prefix"))?;
            }
        }

        tx.commit().map_err(|e| persistence(e, "commit"))?;
        Ok(written)
    }

    /// Builds the lookup indexes and compacts the file.
    pub fn finalize(&self) -> Result<()> {
        self.conn
            .execute_batch(FINALIZE_SQL)
            .map_err(|e| persistence(e, "finalize"))
    }

    pub fn triple_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM TRIPLES", [], |row| row.get(0))
            .map_err(|e| persistence(e, "triple_count"))?;
        Ok(count as usize)
    }

    /// All rows of `TRIPLES`, sorted.
    pub fn rows(&self) -> Result<Vec<TripleRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT SUBJECT, OBJECT, PREDICATE FROM TRIPLES ORDER BY SUBJECT, PREDICATE, OBJECT")
            .map_err(|e| persistence(e, "rows"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TripleRow {
                    subject: row.get(0)?,
                    object: row.get(1)?,
                    predicate: row.get(2)?,
                })
            })
            .map_err(|e| persistence(e, "rows"))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| persistence(e, "rows"))?);
        }
        out.sort();
        Ok(out)
    }

    /// The `PREFIXES` table as a map.
    pub fn prefixes(&self) -> Result<BTreeMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT PREFIX, URL FROM PREFIXES")
            .map_err(|e| persistence(e, "prefixes"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| persistence(e, "prefixes"))?;
        let mut out = BTreeMap::new();
        for row in rows {
            let (prefix, url) = row.map_err(|e| persistence(e, "prefixes"))?;
            out.insert(prefix, url);
        }
        Ok(out)
    }

    fn apply_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -65536;
             PRAGMA temp_store = MEMORY;",
        )
        .map_err(|e| persistence(e, "apply_pragmas"))
    }
}

/// Encodes a triple as a `TRIPLES` row.
///
/// URIs are written in short form, literals as their quoted lexical form
/// (with `@lang` when tagged), blank nodes as `_:label`.
pub fn encode_row(graph: &Graph, triple: &Triple) -> TripleRow {
    TripleRow {
        subject: encode_term(graph, &triple.subject),
        object: encode_term(graph, &triple.object),
        predicate: graph.short_form(&triple.predicate),
    }
}

fn encode_term(graph: &Graph, term: &Term) -> String {
    match term {
        Term::Uri(uri) => graph.short_form(uri),
        Term::Blank(label) => format!("_:{label}"),
        Term::Literal(literal) => match &literal.language {
            Some(language) => format!("\"{}\"@{language}", literal.lexical),
            None => format!("\"{}\"", literal.lexical),
        },
    }
}

/// Writes the graph to the export database at `path`, replacing earlier
/// contents. Returns the number of rows in `TRIPLES`.
pub fn export_sqlite(graph: &Graph, path: &Path) -> Result<usize> {
    let store = TripleStore::create(path)?;
    store.write_graph(graph)?;
    store.triple_count()
}

fn persistence(e: rusqlite::Error, operation: &str) -> LegisGraphError {
    LegisGraphError::Persistence {
        message: e.to_string(),
        operation: operation.to_string(),
    }
}
