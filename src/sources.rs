//! Local source loaders.
//!
//! Reads the pre-extracted inputs of a run from disk: CSV extracts,
//! the statutory-instrument index and the Acts/Regulations registry as
//! JSON, and one JSON document tree per consolidated instrument.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::errors::{LegisGraphError, Result};
use crate::types::{
    CanonicalId, DepartmentRecord, Element, IndexEntry, LegisRegistry, MetadataRecord, RiasRecord,
};

/// Supplies the consolidated document of an instrument.
///
/// `Ok(None)` means the instrument has no document; an `Err` is a document
/// that exists but could not be read. Either way the assembler skips the
/// instrument and keeps going.
pub trait DocumentSource {
    fn document(&self, id: &CanonicalId) -> Result<Option<Element>>;
}

impl DocumentSource for BTreeMap<CanonicalId, Element> {
    fn document(&self, id: &CanonicalId) -> Result<Option<Element>> {
        Ok(self.get(id).cloned())
    }
}

/// Documents stored as `<canonical id>.json` files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryDocuments {
    dir: PathBuf,
}

impl DirectoryDocuments {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the document file for an instrument.
    pub fn path_for(&self, id: &CanonicalId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl DocumentSource for DirectoryDocuments {
    fn document(&self, id: &CanonicalId) -> Result<Option<Element>> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }
}

/// Reads the departments extract. Surrounding spaces are trimmed.
pub fn read_departments(path: &Path) -> Result<Vec<DepartmentRecord>> {
    read_csv(path, csv::Trim::All)
}

/// Reads the instrument metadata extract.
pub fn read_metadata(path: &Path) -> Result<Vec<MetadataRecord>> {
    read_csv(path, csv::Trim::None)
}

/// Reads the RIAS and consultation extract.
pub fn read_rias(path: &Path) -> Result<Vec<RiasRecord>> {
    read_csv(path, csv::Trim::None)
}

/// Reads the statutory-instrument index entries.
pub fn read_statutory_index(path: &Path) -> Result<Vec<IndexEntry>> {
    read_json(path)
}

/// Reads the Acts/Regulations registry listing.
pub fn read_registry(path: &Path) -> Result<LegisRegistry> {
    read_json(path)
}

fn read_csv<T: DeserializeOwned>(path: &Path, trim: csv::Trim) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(trim)
        .from_path(path)
        .map_err(|e| source_error(path, format!("failed to open csv: {e}")))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row.map_err(|e| source_error(path, format!("failed to read csv row: {e}")))?);
    }
    Ok(records)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| source_error(path, format!("failed to read file: {e}")))?;
    serde_json::from_str(&contents).map_err(|e| source_error(path, format!("failed to parse json: {e}")))
}

fn source_error(path: &Path, message: String) -> LegisGraphError {
    LegisGraphError::Source {
        message,
        path: path.display().to_string(),
    }
}
