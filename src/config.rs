use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LegisGraphError, Result};
use crate::types::Predicate;

/// Name of the configuration file stored inside the `.legisgraph` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the hidden directory used to store legisgraph metadata.
pub const LEGISGRAPH_DIR: &str = ".legisgraph";

/// URI prefix shared by every instrument in the graph.
pub const DEFAULT_INSTRUMENT_BASE: &str =
    "https://www.canada.ca/en/privy-council/ext/statutory-instrument/";

/// Prefix of annual statute pages, suffixed with `<year>_<chapter>`.
pub const DEFAULT_ANNUAL_STATUTE_BASE: &str = "https://laws.justice.gc.ca/eng/AnnualStatutes/";

/// URI prefix for federal organizations, suffixed with the `ORG_ID`.
pub const DEFAULT_DEPARTMENT_BASE: &str = "https://www.tpsgc-pwgsc.gc.ca/recgen/orgid/";

/// Predicate key → URI table.
///
/// Built once at start-up and referenced by [`Predicate`] key everywhere
/// a triple is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary(BTreeMap<String, String>);

impl Vocabulary {
    /// Returns the URI of a predicate.
    ///
    /// Falls back to an empty string when the key is missing; call
    /// [`Vocabulary::validate`] once before use to rule that out.
    pub fn uri(&self, predicate: Predicate) -> &str {
        self.0
            .get(predicate.key())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Checks that every predicate the assembler emits has a non-empty URI.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = Predicate::ALL
            .iter()
            .map(Predicate::key)
            .filter(|key| self.0.get(*key).map_or(true, |uri| uri.trim().is_empty()))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LegisGraphError::Config {
                message: format!("vocabulary is missing predicates: {}", missing.join(", ")),
            })
        }
    }

    /// Overrides or adds the URI of a predicate key.
    pub fn set(&mut self, key: impl Into<String>, uri: impl Into<String>) {
        self.0.insert(key.into(), uri.into());
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        let entries = [
            ("sponsor", "https://www.gazette.gc.ca/ext/sponsor"),
            (
                "consultation_word_count",
                "https://www.gazette.gc.ca/ext/consultation-word-count",
            ),
            ("cba_word_count", "https://www.gazette.gc.ca/ext/cba-word-count"),
            ("rias_word_count", "https://www.gazette.gc.ca/ext/rias-word-count"),
            ("word_count", "https://schema.org/wordCount"),
            ("section_count", "https://laws-lois.justice.gc.ca/ext/section-count"),
            ("enabling_act", "https://laws-lois.justice.gc.ca/ext/enabling-act"),
            (
                "amends_instrument",
                "https://laws-lois.justice.gc.ca/ext/amends-instrument",
            ),
            ("consolidates", "https://laws-lois.justice.gc.ca/ext/consolidates"),
            (
                "enables_regulation",
                "https://laws-lois.justice.gc.ca/ext/enables-regulation",
            ),
            ("title", "https://schema.org/name"),
            ("url", "https://schema.org/url"),
            ("org_name", "https://www.tpsgc-pwgsc.gc.ca/recgen/ext/org-name"),
            (
                "department_head",
                "https://www.tpsgc-pwgsc.gc.ca/recgen/ext/department-head",
            ),
            (
                "instrument_references",
                "https://www.csps-efpc.gc.ca/ext/instrument-references",
            ),
            (
                "instrument_kind",
                "https://laws-lois.justice.gc.ca/ext/instrument-kind",
            ),
            (
                "current_to_date",
                "https://laws-lois.justice.gc.ca/ext/current-to-date",
            ),
        ];
        Vocabulary(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Paths of the local input files, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePaths {
    /// Directory of hand-written `.ttl`/`.nt` fact files.
    pub facts_dir: String,
    pub departments_csv: String,
    pub metadata_csv: String,
    pub rias_csv: String,
    /// JSON array of statutory-instrument index entries.
    pub statutory_index_json: String,
    /// JSON form of the Acts/Regulations registry.
    pub registry_json: String,
    /// Directory holding one `<canonical id>.json` document per instrument.
    pub documents_dir: String,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            facts_dir: "rdf".to_string(),
            departments_csv: "csv/departments.csv".to_string(),
            metadata_csv: "metadata.csv".to_string(),
            rias_csv: "regcan.csv".to_string(),
            statutory_index_json: "statutory-index.json".to_string(),
            registry_json: "legis.json".to_string(),
            documents_dir: "documents".to_string(),
        }
    }
}

/// Paths of the exported files, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPaths {
    pub turtle: String,
    pub sqlite: String,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            turtle: "target/out.ttl".to_string(),
            sqlite: "target/out.sqlite3".to_string(),
        }
    }
}

/// Configuration for a legisgraph project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegisGraphConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Root directory of the project.
    pub root_dir: String,
    pub instrument_base: String,
    pub annual_statute_base: String,
    pub department_base: String,
    pub vocabulary: Vocabulary,
    /// Short alias → namespace URI, used to compress URIs on export.
    pub prefixes: BTreeMap<String, String>,
    pub sources: SourcePaths,
    pub output: OutputPaths,
}

impl Default for LegisGraphConfig {
    fn default() -> Self {
        let prefixes = [
            ("si", DEFAULT_INSTRUMENT_BASE),
            ("schema", "https://schema.org/"),
            ("jus", "https://laws-lois.justice.gc.ca/ext/"),
            ("gaz", "https://www.gazette.gc.ca/ext/"),
            ("recgen", "https://www.tpsgc-pwgsc.gc.ca/recgen/ext/"),
            ("org", DEFAULT_DEPARTMENT_BASE),
            ("csps", "https://www.csps-efpc.gc.ca/ext/"),
        ];
        Self {
            version: 1,
            root_dir: String::new(),
            instrument_base: DEFAULT_INSTRUMENT_BASE.to_string(),
            annual_statute_base: DEFAULT_ANNUAL_STATUTE_BASE.to_string(),
            department_base: DEFAULT_DEPARTMENT_BASE.to_string(),
            vocabulary: Vocabulary::default(),
            prefixes: prefixes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            sources: SourcePaths::default(),
            output: OutputPaths::default(),
        }
    }
}

impl LegisGraphConfig {
    /// Checks the parts of the configuration the assembler relies on.
    pub fn validate(&self) -> Result<()> {
        self.vocabulary.validate()?;
        for (name, base) in [
            ("instrument_base", &self.instrument_base),
            ("annual_statute_base", &self.annual_statute_base),
            ("department_base", &self.department_base),
        ] {
            if base.trim().is_empty() {
                return Err(LegisGraphError::Config {
                    message: format!("{name} must not be empty"),
                });
            }
        }
        Ok(())
    }
}

/// Returns the path to the `.legisgraph` directory within the given project root.
pub fn get_legisgraph_dir(project_root: &Path) -> PathBuf {
    project_root.join(LEGISGRAPH_DIR)
}

/// Returns the path to the configuration file within the `.legisgraph` directory.
pub fn get_config_path(project_root: &Path) -> PathBuf {
    get_legisgraph_dir(project_root).join(CONFIG_FILENAME)
}

/// Reads the project settings from `.legisgraph/config.json`.
///
/// A project that was never initialized builds with the default settings,
/// rooted at `project_root`.
pub fn load_config(project_root: &Path) -> Result<LegisGraphConfig> {
    let path = get_config_path(project_root);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(LegisGraphConfig {
                root_dir: project_root.to_string_lossy().to_string(),
                ..LegisGraphConfig::default()
            });
        }
        Err(e) => return Err(settings_error("cannot read", &path, e)),
    };
    serde_json::from_str(&contents).map_err(|e| settings_error("invalid project settings in", &path, e))
}

/// Stores the project settings, replacing the file in one rename so an
/// interrupted write leaves the previous settings intact.
pub fn save_config(project_root: &Path, config: &LegisGraphConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).map_err(|e| LegisGraphError::Config {
        message: format!("project settings are not serializable: {e}"),
    })?;

    let dir = get_legisgraph_dir(project_root);
    fs::create_dir_all(&dir).map_err(|e| settings_error("cannot create", &dir, e))?;

    let path = get_config_path(project_root);
    let staged = path.with_extension("tmp");
    fs::write(&staged, json).map_err(|e| settings_error("cannot stage", &staged, e))?;
    fs::rename(&staged, &path).map_err(|e| settings_error("cannot install", &path, e))
}

fn settings_error(action: &str, path: &Path, cause: impl std::fmt::Display) -> LegisGraphError {
    LegisGraphError::Config {
        message: format!("{action} {}: {cause}", path.display()),
    }
}
