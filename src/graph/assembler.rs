use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::config::{LegisGraphConfig, Vocabulary};
use crate::errors::Result;
use crate::extraction::{self, is_instrument_id, parse_index_entry, FactSet};
use crate::graph::Graph;
use crate::resolution::{CitationParser, InstrumentRegistry, UnresolvedReport};
use crate::sources::DocumentSource;
use crate::types::*;

/// Suffix stripped from Act table-of-contents links.
const INDEX_PAGE_SUFFIX: &str = "/index.html";

/// Everything the assembler produced, handed to the exporters.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub graph: Graph,
    pub registry: InstrumentRegistry,
    pub unresolved: UnresolvedReport,
}

/// Counts from ingesting the Acts/Regulations registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySummary {
    pub english_acts: usize,
    pub english_regulations: usize,
    pub documents_processed: usize,
    pub documents_missing: usize,
}

/// What one consolidated document contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSummary {
    pub word_count: u64,
    pub section_count: u64,
    /// Distinct instruments linked by `Consolidates` edges.
    pub amending_instruments: usize,
    /// Citations that matched nothing.
    pub unresolved: usize,
}

/// Builds the legislation graph from every source, one source at a time.
///
/// Owns the graph, the instrument registry, and the unresolved report for
/// the duration of a run. Sources must be fed in order: historical notes
/// only resolve against instruments registered before them.
pub struct GraphAssembler {
    vocabulary: Vocabulary,
    instrument_base: String,
    annual_statute_base: String,
    department_base: String,
    graph: Graph,
    registry: InstrumentRegistry,
    unresolved: UnresolvedReport,
}

impl GraphAssembler {
    /// Creates an assembler, validating the vocabulary once up front.
    pub fn new(config: &LegisGraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            vocabulary: config.vocabulary.clone(),
            instrument_base: config.instrument_base.clone(),
            annual_statute_base: config.annual_statute_base.clone(),
            department_base: config.department_base.clone(),
            graph: Graph::with_prefixes(&config.prefixes),
            registry: InstrumentRegistry::new(),
            unresolved: UnresolvedReport::new(),
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    pub fn unresolved(&self) -> &UnresolvedReport {
        &self.unresolved
    }

    /// Ends the run, releasing the graph and reports.
    pub fn finish(self) -> Assembly {
        Assembly {
            graph: self.graph,
            registry: self.registry,
            unresolved: self.unresolved,
        }
    }

    /// URI of an instrument.
    pub fn instrument_uri(&self, id: &CanonicalId) -> String {
        format!("{}{}", self.instrument_base, id)
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    /// Registers an instrument, emitting its kind the first time it is
    /// seen. Returns `true` if the instrument was new.
    pub fn register_instrument(&mut self, id: &CanonicalId, kind: Option<InstrumentKind>) -> bool {
        if !self.registry.register(id.clone()) {
            return false;
        }
        if let Some(kind) = kind.or_else(|| InstrumentKind::infer(id)) {
            self.add_literal(id, Predicate::InstrumentKind, Literal::plain(kind.as_str()));
        }
        true
    }

    fn add_literal(&mut self, id: &CanonicalId, predicate: Predicate, literal: Literal) -> bool {
        let subject = self.instrument_uri(id);
        let predicate = self.vocabulary.uri(predicate).to_string();
        self.graph.add_literal(&subject, &predicate, literal)
    }

    /// Adds a non-blank, trimmed literal; blank values are skipped.
    fn add_text(
        &mut self,
        id: &CanonicalId,
        predicate: Predicate,
        value: Option<&str>,
        language: Option<&str>,
    ) {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return;
        };
        let literal = match language {
            Some(lang) => Literal::tagged(value, lang),
            None => Literal::plain(value),
        };
        self.add_literal(id, predicate, literal);
    }

    /// Adds an edge together with its inverse.
    ///
    /// Both endpoints must already be registered; otherwise nothing is
    /// added and `false` is returned.
    pub fn add_edge(&mut self, edge: &Edge) -> bool {
        if !self.registry.contains(&edge.source) || !self.registry.contains(&edge.target) {
            debug!(
                source = %edge.source,
                target = %edge.target,
                kind = ?edge.kind,
                "skipping edge with unregistered endpoint"
            );
            return false;
        }
        let source = self.instrument_uri(&edge.source);
        let target = self.instrument_uri(&edge.target);
        let forward = self.vocabulary.uri(edge.kind.predicate()).to_string();
        let inverse = self.vocabulary.uri(edge.kind.inverse().predicate()).to_string();
        self.graph.add_uri(&source, &forward, &target);
        self.graph.add_uri(&target, &inverse, &source);
        true
    }

    // ------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------

    /// Merges hand-written facts and their prefix declarations.
    pub fn ingest_facts(&mut self, facts: FactSet) -> usize {
        for (prefix, namespace) in facts.prefixes {
            self.graph.set_prefix(prefix, namespace);
        }
        let before = self.graph.len();
        self.graph.extend(facts.triples);
        self.graph.len() - before
    }

    /// Adds titles from the statutory-instrument index.
    ///
    /// Only regulation listings register their instrument. A later entry
    /// for the same identifier replaces the earlier name, and identifiers
    /// without a known instrument prefix are logged and skipped.
    pub fn ingest_statutory_index(&mut self, entries: &[IndexEntry]) -> usize {
        let mut names: BTreeMap<CanonicalId, String> = BTreeMap::new();
        for entry in entries {
            let Some(listing) = parse_index_entry(entry) else {
                debug!(text = entry.text(), "index entry carries no identifier");
                continue;
            };
            if listing.registers {
                self.register_instrument(&listing.id, None);
            }
            names.insert(listing.id, listing.name);
        }

        let mut titled = 0;
        for (id, name) in &names {
            if is_instrument_id(id) {
                self.add_literal(id, Predicate::Title, Literal::plain(name.as_str()));
                titled += 1;
            } else {
                info!("Unparsable instrument: [{id}] {name}");
            }
        }
        titled
    }

    /// Adds organization names and heads from the departments extract.
    pub fn ingest_departments(&mut self, records: &[DepartmentRecord]) -> usize {
        let org_name = self.vocabulary.uri(Predicate::OrgName).to_string();
        let head = self.vocabulary.uri(Predicate::DepartmentHead).to_string();
        let mut count = 0;
        for record in records {
            let org_id = record.org_id.trim();
            if org_id.is_empty() {
                warn!("department record without ORG_ID");
                continue;
            }
            let subject = format!("{}{}", self.department_base, org_id);
            for (predicate, value, language) in [
                (&org_name, &record.name_en, None),
                (&org_name, &record.name_fr, Some("fr")),
                (&head, &record.head_en, None),
            ] {
                let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
                    continue;
                };
                let literal = match language {
                    Some(lang) => Literal::tagged(value, lang),
                    None => Literal::plain(value),
                };
                self.graph.add_literal(&subject, predicate, literal);
            }
            count += 1;
        }
        count
    }

    /// Registers instruments from the RIAS extract and adds their sponsor
    /// and word counts.
    pub fn ingest_rias(&mut self, records: &[RiasRecord]) -> usize {
        let mut count = 0;
        for record in records {
            let id = CanonicalId::new(&record.id);
            if id.is_empty() {
                warn!("RIAS record without ID");
                continue;
            }
            self.register_instrument(&id, None);
            self.add_text(&id, Predicate::Sponsor, record.sponsor.as_deref(), None);
            self.add_text(&id, Predicate::CbaWordCount, record.cba_word_count.as_deref(), None);
            self.add_text(&id, Predicate::RiasWordCount, record.rias_word_count.as_deref(), None);
            self.add_text(
                &id,
                Predicate::ConsultationWordCount,
                record.consultation_word_count.as_deref(),
                None,
            );
            count += 1;
        }
        count
    }

    /// Adds category labels from the metadata extract. Does not register
    /// instruments.
    pub fn ingest_metadata(&mut self, records: &[MetadataRecord]) -> usize {
        let mut count = 0;
        for record in records {
            let id = CanonicalId::new(&record.instrument_number);
            if id.is_empty() {
                continue;
            }
            let before = self.graph.len();
            self.add_text(
                &id,
                Predicate::InstrumentReferences,
                record.category_item_desc_en.as_deref(),
                None,
            );
            if self.graph.len() > before {
                count += 1;
            }
        }
        count
    }

    /// Ingests the Acts/Regulations registry and then the consolidated
    /// document of every English instrument in it.
    ///
    /// Regulations are registered before Acts so that `RegsMadeUnderAct`
    /// references can be linked; all instruments are registered before any
    /// document is read.
    pub fn ingest_registry(
        &mut self,
        registry: &LegisRegistry,
        documents: &dyn DocumentSource,
    ) -> RegistrySummary {
        let mut summary = RegistrySummary::default();
        let mut internal_ids: HashMap<&str, CanonicalId> = HashMap::new();
        let mut instruments: Vec<CanonicalId> = Vec::new();

        for record in &registry.regulations {
            if record.language_code() != "en" {
                continue;
            }
            summary.english_regulations += 1;
            let id = CanonicalId::new(&record.unique_id);
            for internal in [&record.id, &record.olid].into_iter().flatten() {
                internal_ids.insert(internal.as_str(), id.clone());
            }
            self.register_instrument(&id, Some(InstrumentKind::Regulation));
            // Regulation titles are left to the statutory-instrument index.
            self.add_text(&id, Predicate::Url, record.link_to_html_toc.as_deref(), Some("en"));
            self.add_text(&id, Predicate::CurrentToDate, record.current_to_date.as_deref(), None);
            instruments.push(id);
        }

        for record in &registry.acts {
            if record.language_code() != "en" {
                continue;
            }
            summary.english_acts += 1;
            let id = CanonicalId::new(&record.unique_id);
            self.register_instrument(&id, Some(InstrumentKind::Act));
            self.add_text(&id, Predicate::Title, record.title.as_deref(), Some("en"));
            let url = record
                .link_to_html_toc
                .as_deref()
                .map(|link| link.trim().replace(INDEX_PAGE_SUFFIX, ""));
            self.add_text(&id, Predicate::Url, url.as_deref(), Some("en"));
            self.add_text(&id, Predicate::CurrentToDate, record.current_to_date.as_deref(), None);

            for id_ref in &record.regs_made_under_act {
                match internal_ids.get(id_ref.as_str()) {
                    Some(reg) => {
                        self.add_edge(&Edge {
                            source: reg.clone(),
                            target: id.clone(),
                            kind: EdgeKind::EnablingAct,
                        });
                    }
                    None => self.unresolved.record(
                        id_ref.clone(),
                        format!("RegsMadeUnderAct of {}", record.unique_id.trim()),
                    ),
                }
            }
            instruments.push(id);
        }

        info!(
            acts = summary.english_acts,
            regulations = summary.english_regulations,
            "registered English acts and regulations"
        );

        for id in &instruments {
            match documents.document(id) {
                Ok(Some(root)) => {
                    self.ingest_document(id, &root);
                    summary.documents_processed += 1;
                }
                Ok(None) => {
                    warn!(instrument = %id, "no consolidated document");
                    summary.documents_missing += 1;
                }
                Err(e) => {
                    warn!(instrument = %id, "failed to load consolidated document: {e}");
                    summary.documents_missing += 1;
                }
            }
        }

        summary
    }

    /// Ingests the consolidated document of one instrument: its word and
    /// section counts, and a `Consolidates`/`AmendsInstrument` pair for
    /// every instrument its historical notes cite.
    pub fn ingest_document(&mut self, id: &CanonicalId, root: &Element) -> DocumentSummary {
        self.register_instrument(id, None);
        let analysis = extraction::analyze(root);

        let references: Vec<Reference> = {
            let parser = CitationParser::new(&self.registry);
            analysis
                .notes
                .iter()
                .flat_map(|note| parser.parse_references(note))
                .collect()
        };

        let mut amending: BTreeSet<CanonicalId> = BTreeSet::new();
        let mut unresolved = 0;
        for reference in references {
            match reference {
                Reference::Chapter {
                    year,
                    chapter,
                    target,
                } => {
                    if self.register_instrument(&target, Some(InstrumentKind::Act)) {
                        let url = format!("{}{}_{}", self.annual_statute_base, year, chapter);
                        self.add_literal(&target, Predicate::Url, Literal::plain(url));
                    }
                    amending.insert(target);
                }
                Reference::Unresolved { citation, text } => {
                    self.unresolved.record(citation, text);
                    unresolved += 1;
                }
                resolved => {
                    if let Some(target) = resolved.target() {
                        amending.insert(target.clone());
                    }
                }
            }
        }

        for target in &amending {
            self.add_edge(&Edge {
                source: id.clone(),
                target: target.clone(),
                kind: EdgeKind::Consolidates,
            });
        }
        self.add_literal(id, Predicate::WordCount, Literal::integer(analysis.word_count));
        self.add_literal(id, Predicate::SectionCount, Literal::integer(analysis.section_count));

        DocumentSummary {
            word_count: analysis.word_count,
            section_count: analysis.section_count,
            amending_instruments: amending.len(),
            unresolved,
        }
    }
}
