use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::config::{load_config, save_config, LegisGraphConfig};
use crate::errors::Result;
use crate::export::{export_sqlite, write_turtle};
use crate::extraction::load_fact_dir;
use crate::graph::{Assembly, GraphAssembler, RegistrySummary};
use crate::resolution::UnresolvedEntry;
use crate::sources::{self, DirectoryDocuments};

/// Central orchestrator: feeds every source to the assembler in the fixed
/// order, then writes both exports.
pub struct LegisGraph {
    config: LegisGraphConfig,
    project_root: PathBuf,
}

/// Output overrides for a build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Turtle output path; the configured path when `None`.
    pub turtle: Option<PathBuf>,
    /// SQLite output path; the configured path when `None`.
    pub sqlite: Option<PathBuf>,
    /// Refuse to export when any fact file had a malformed statement.
    pub strict: bool,
}

/// Result of one build.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub triple_count: usize,
    pub fact_files: usize,
    /// `false` when any fact-file statement failed to parse.
    pub parse_passed: bool,
    pub diagnostics: Vec<String>,
    pub unresolved: Vec<UnresolvedEntry>,
    pub registry: RegistrySummary,
    /// Paths written, empty when the export was refused.
    pub turtle_path: Option<PathBuf>,
    pub sqlite_path: Option<PathBuf>,
    pub duration_ms: u64,
}

/// An assembled graph together with the fact-file outcome.
pub struct AssembledRun {
    pub assembly: Assembly,
    pub fact_files: usize,
    pub diagnostics: Vec<String>,
    pub registry: RegistrySummary,
}

impl AssembledRun {
    pub fn parse_passed(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl LegisGraph {
    /// Writes a default configuration under `project_root`.
    pub fn init(project_root: &Path) -> Result<Self> {
        let config = LegisGraphConfig {
            root_dir: project_root.to_string_lossy().to_string(),
            ..LegisGraphConfig::default()
        };
        save_config(project_root, &config)?;
        Ok(Self {
            config,
            project_root: project_root.to_path_buf(),
        })
    }

    /// Opens a project, using the default configuration when none was saved.
    pub fn open(project_root: &Path) -> Result<Self> {
        let config = load_config(project_root)?;
        config.validate()?;
        Ok(Self {
            config,
            project_root: project_root.to_path_buf(),
        })
    }

    /// Uses an in-memory configuration, resolving sources against `project_root`.
    pub fn with_config(project_root: &Path, config: LegisGraphConfig) -> Self {
        Self {
            config,
            project_root: project_root.to_path_buf(),
        }
    }

    pub fn config(&self) -> &LegisGraphConfig {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.project_root.join(relative)
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

impl LegisGraph {
    /// Runs every source through the assembler.
    ///
    /// Order: local facts, statutory-instrument index, departments, RIAS,
    /// Acts/Regulations registry with their documents, metadata. Absent
    /// inputs are skipped with a warning; unreadable ones abort the run.
    pub fn assemble(&self) -> Result<AssembledRun> {
        let mut assembler = GraphAssembler::new(&self.config)?;
        let paths = &self.config.sources;

        let mut fact_files = 0;
        let mut diagnostics = Vec::new();
        let facts_dir = self.resolve(&paths.facts_dir);
        if facts_dir.is_dir() {
            let outcome = load_fact_dir(&facts_dir)?;
            fact_files = outcome.files;
            diagnostics = outcome.diagnostics.iter().map(|e| e.to_string()).collect();
            let added = assembler.ingest_facts(outcome.facts);
            info!(files = fact_files, triples = added, "Loaded local facts");
        } else {
            warn!(path = %facts_dir.display(), "Facts directory not found, skipping");
        }

        if let Some(entries) =
            load_optional(&self.resolve(&paths.statutory_index_json), sources::read_statutory_index)?
        {
            let titled = assembler.ingest_statutory_index(&entries);
            info!(entries = entries.len(), titled, "Loaded statutory-instrument index");
        }

        if let Some(records) =
            load_optional(&self.resolve(&paths.departments_csv), sources::read_departments)?
        {
            let count = assembler.ingest_departments(&records);
            info!(records = count, "Loaded departments");
        }

        if let Some(records) = load_optional(&self.resolve(&paths.rias_csv), sources::read_rias)? {
            let count = assembler.ingest_rias(&records);
            info!(records = count, "Loaded RIAS records");
        }

        let mut registry = RegistrySummary::default();
        if let Some(listing) =
            load_optional(&self.resolve(&paths.registry_json), sources::read_registry)?
        {
            let documents = DirectoryDocuments::new(self.resolve(&paths.documents_dir));
            registry = assembler.ingest_registry(&listing, &documents);
            info!(
                processed = registry.documents_processed,
                missing = registry.documents_missing,
                "Loaded consolidated documents"
            );
        }

        if let Some(records) =
            load_optional(&self.resolve(&paths.metadata_csv), sources::read_metadata)?
        {
            let count = assembler.ingest_metadata(&records);
            info!(records = count, "Loaded instrument metadata");
        }

        Ok(AssembledRun {
            assembly: assembler.finish(),
            fact_files,
            diagnostics,
            registry,
        })
    }

    /// Assembles the graph and writes the Turtle and SQLite exports.
    ///
    /// With `strict`, a failed fact-file parse leaves both outputs unwritten.
    pub fn build(&self, options: &BuildOptions) -> Result<RunSummary> {
        let start = Instant::now();
        let run = self.assemble()?;
        let graph = &run.assembly.graph;

        let mut summary = RunSummary {
            triple_count: graph.len(),
            fact_files: run.fact_files,
            parse_passed: run.parse_passed(),
            diagnostics: run.diagnostics.clone(),
            unresolved: run.assembly.unresolved.entries(),
            registry: run.registry.clone(),
            ..RunSummary::default()
        };

        info!(
            triples = summary.triple_count,
            instruments = run.assembly.registry.len(),
            unresolved = summary.unresolved.len(),
            "Assembled graph"
        );

        if options.strict && !summary.parse_passed {
            warn!(
                diagnostics = summary.diagnostics.len(),
                "Fact files failed to parse, exports not written"
            );
            summary.duration_ms = start.elapsed().as_millis() as u64;
            return Ok(summary);
        }

        let turtle_path = options
            .turtle
            .clone()
            .unwrap_or_else(|| self.resolve(&self.config.output.turtle));
        write_turtle(graph, &turtle_path)?;
        info!(path = %turtle_path.display(), "Wrote Turtle export");

        let sqlite_path = options
            .sqlite
            .clone()
            .unwrap_or_else(|| self.resolve(&self.config.output.sqlite));
        let rows = export_sqlite(graph, &sqlite_path)?;
        info!(path = %sqlite_path.display(), rows, "Wrote SQLite export");

        summary.turtle_path = Some(turtle_path);
        summary.sqlite_path = Some(sqlite_path);
        summary.duration_ms = start.elapsed().as_millis() as u64;
        Ok(summary)
    }
}

/// Reads an input that may legitimately be absent.
fn load_optional<T>(path: &Path, read: impl Fn(&Path) -> Result<T>) -> Result<Option<T>> {
    if !path.exists() {
        warn!(path = %path.display(), "Source not found, skipping");
        return Ok(None);
    }
    read(path).map(Some)
}
