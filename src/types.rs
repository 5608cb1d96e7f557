use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolution::normalize;

/// Canonical identifier of one legal instrument.
///
/// Only constructible through the normalizer (deserialization included), so
/// every value is already in canonical form and
/// `CanonicalId::new(id.as_str()) == id` always holds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Normalizes a raw citation into its canonical identifier.
    pub fn new(raw: &str) -> Self {
        CanonicalId(normalize(raw))
    }

    /// Canonical identifier of an annual statute chapter, e.g. `S.C._2019,c._29`.
    pub fn annual_statute(year: &str, chapter: &str) -> Self {
        CanonicalId::new(&format!("S.C._{year},c._{chapter}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for CanonicalId {
    fn from(raw: String) -> Self {
        CanonicalId::new(&raw)
    }
}

impl From<CanonicalId> for String {
    fn from(id: CanonicalId) -> Self {
        id.0
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kinds of instruments tracked in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    Act,
    Regulation,
    StatutoryInstrument,
}

#[allow(clippy::should_implement_trait)]
impl InstrumentKind {
    /// Returns the string representation of this instrument kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Act => "act",
            InstrumentKind::Regulation => "regulation",
            InstrumentKind::StatutoryInstrument => "statutory-instrument",
        }
    }

    /// Parses a string into an `InstrumentKind`, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<InstrumentKind> {
        match s {
            "act" => Some(InstrumentKind::Act),
            "regulation" => Some(InstrumentKind::Regulation),
            "statutory-instrument" => Some(InstrumentKind::StatutoryInstrument),
            _ => None,
        }
    }

    /// Infers the kind of an instrument from the prefix of its identifier.
    ///
    /// Consolidated Act identifiers (e.g. `F-7`) carry no recognizable
    /// prefix; their kind comes from the registry source instead.
    pub fn infer(id: &CanonicalId) -> Option<InstrumentKind> {
        let id = id.as_str();
        if id.starts_with("SOR-") || id.starts_with("C.R.C.") {
            Some(InstrumentKind::Regulation)
        } else if id.starts_with("SI-") {
            Some(InstrumentKind::StatutoryInstrument)
        } else if id.starts_with("R.S.C.") || id.starts_with("R.S._") || id.starts_with("S.C._") {
            Some(InstrumentKind::Act)
        } else {
            None
        }
    }
}

/// Keys of the predicates the assembler emits.
///
/// URIs are looked up in [`crate::config::Vocabulary`] by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Sponsor,
    ConsultationWordCount,
    CbaWordCount,
    RiasWordCount,
    WordCount,
    SectionCount,
    EnablingAct,
    AmendsInstrument,
    Consolidates,
    EnablesRegulation,
    Title,
    Url,
    OrgName,
    DepartmentHead,
    InstrumentReferences,
    InstrumentKind,
    CurrentToDate,
}

impl Predicate {
    pub const ALL: [Predicate; 17] = [
        Predicate::Sponsor,
        Predicate::ConsultationWordCount,
        Predicate::CbaWordCount,
        Predicate::RiasWordCount,
        Predicate::WordCount,
        Predicate::SectionCount,
        Predicate::EnablingAct,
        Predicate::AmendsInstrument,
        Predicate::Consolidates,
        Predicate::EnablesRegulation,
        Predicate::Title,
        Predicate::Url,
        Predicate::OrgName,
        Predicate::DepartmentHead,
        Predicate::InstrumentReferences,
        Predicate::InstrumentKind,
        Predicate::CurrentToDate,
    ];

    /// Configuration key of this predicate.
    pub fn key(&self) -> &'static str {
        match self {
            Predicate::Sponsor => "sponsor",
            Predicate::ConsultationWordCount => "consultation_word_count",
            Predicate::CbaWordCount => "cba_word_count",
            Predicate::RiasWordCount => "rias_word_count",
            Predicate::WordCount => "word_count",
            Predicate::SectionCount => "section_count",
            Predicate::EnablingAct => "enabling_act",
            Predicate::AmendsInstrument => "amends_instrument",
            Predicate::Consolidates => "consolidates",
            Predicate::EnablesRegulation => "enables_regulation",
            Predicate::Title => "title",
            Predicate::Url => "url",
            Predicate::OrgName => "org_name",
            Predicate::DepartmentHead => "department_head",
            Predicate::InstrumentReferences => "instrument_references",
            Predicate::InstrumentKind => "instrument_kind",
            Predicate::CurrentToDate => "current_to_date",
        }
    }
}

/// Directed relations between two instruments. Each kind has an inverse,
/// and the assembler always emits both directions together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Consolidated instrument → instrument that amended it.
    Consolidates,
    /// Amending instrument → consolidated instrument it amends.
    AmendsInstrument,
    /// Regulation → Act it was made under.
    EnablingAct,
    /// Act → Regulation made under it.
    EnablesRegulation,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::Consolidates,
        EdgeKind::AmendsInstrument,
        EdgeKind::EnablingAct,
        EdgeKind::EnablesRegulation,
    ];

    pub fn inverse(&self) -> EdgeKind {
        match self {
            EdgeKind::Consolidates => EdgeKind::AmendsInstrument,
            EdgeKind::AmendsInstrument => EdgeKind::Consolidates,
            EdgeKind::EnablingAct => EdgeKind::EnablesRegulation,
            EdgeKind::EnablesRegulation => EdgeKind::EnablingAct,
        }
    }

    pub fn predicate(&self) -> Predicate {
        match self {
            EdgeKind::Consolidates => Predicate::Consolidates,
            EdgeKind::AmendsInstrument => Predicate::AmendsInstrument,
            EdgeKind::EnablingAct => Predicate::EnablingAct,
            EdgeKind::EnablesRegulation => Predicate::EnablesRegulation,
        }
    }
}

/// An edge between two instruments, before it is turned into triples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: CanonicalId,
    pub target: CanonicalId,
    pub kind: EdgeKind,
}

/// A parsed mention of another instrument inside a historical note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reference {
    /// An annual statute chapter, e.g. `2019, c. 29`.
    Chapter {
        year: String,
        chapter: String,
        target: CanonicalId,
    },
    /// A known instrument cited with a single section, e.g. `SOR/92-100, s. 2`.
    Section { target: CanonicalId, section: String },
    /// A known instrument cited with a list of sections, e.g. `SOR/92-100, ss. 2, 3`.
    SectionList {
        target: CanonicalId,
        sections: Vec<String>,
    },
    /// A known instrument cited without a section qualifier.
    Instrument { target: CanonicalId },
    /// A citation that matched no registered instrument.
    Unresolved { citation: String, text: String },
}

impl Reference {
    /// The instrument this reference resolves to, if any.
    pub fn target(&self) -> Option<&CanonicalId> {
        match self {
            Reference::Chapter { target, .. }
            | Reference::Section { target, .. }
            | Reference::SectionList { target, .. }
            | Reference::Instrument { target } => Some(target),
            Reference::Unresolved { .. } => None,
        }
    }
}

/// A literal object value, optionally language-tagged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Literal {
            lexical: lexical.into(),
            language: None,
        }
    }

    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Literal {
            lexical: lexical.into(),
            language: Some(language.into()),
        }
    }

    pub fn integer(value: u64) -> Self {
        Literal::plain(value.to_string())
    }
}

/// A node in the graph: a URI, a blank node, or a literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    Uri(String),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn uri(value: impl Into<String>) -> Self {
        Term::Uri(value.into())
    }

    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Term::Uri(uri) => Some(uri),
            _ => None,
        }
    }
}

/// One (subject, predicate, object) fact.
///
/// Ordering is by subject, predicate, then object, which gives exports a
/// stable order and makes identical facts (including the language tag)
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

// ---------------------------------------------------------------------------
// Source records
// ---------------------------------------------------------------------------

/// A row of the departments extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    #[serde(rename = "ORG_ID")]
    pub org_id: String,
    #[serde(rename = "ORGNAME_EN", default)]
    pub name_en: Option<String>,
    #[serde(rename = "ORGNAME_FR", default)]
    pub name_fr: Option<String>,
    #[serde(rename = "DEPT_HEAD_EN", default)]
    pub head_en: Option<String>,
}

/// A row of the instrument metadata extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub instrument_number: String,
    #[serde(default)]
    pub category_item_desc_en: Option<String>,
}

/// A row of the regulatory impact analysis (RIAS) and consultation extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiasRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub sponsor: Option<String>,
    #[serde(rename = "CBA.wordcount", default)]
    pub cba_word_count: Option<String>,
    #[serde(rename = "rias.wordcount", default)]
    pub rias_word_count: Option<String>,
    #[serde(rename = "consultation.wordcount", default)]
    pub consultation_word_count: Option<String>,
}

/// One text entry scraped from the consolidated statutory-instrument index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexEntry {
    /// A section heading whose text carries a bracketed identifier.
    Heading { text: String },
    /// An order listed under a category label.
    Ordered { category: String, text: String },
    /// A regulation listing; the only kind that registers its instrument.
    Regulation { text: String },
}

impl IndexEntry {
    pub fn text(&self) -> &str {
        match self {
            IndexEntry::Heading { text }
            | IndexEntry::Ordered { text, .. }
            | IndexEntry::Regulation { text } => text,
        }
    }
}

/// One `Act` or `Regulation` element of the Acts/Regulations registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Internal identifier used by `RegsMadeUnderAct` references.
    #[serde(default)]
    pub id: Option<String>,
    /// Legacy internal identifier, also usable by references.
    #[serde(default)]
    pub olid: Option<String>,
    #[serde(rename = "UniqueId")]
    pub unique_id: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "CurrentToDate", default)]
    pub current_to_date: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "LinkToHTMLToC", default)]
    pub link_to_html_toc: Option<String>,
    /// Internal identifiers of the regulations made under this act.
    #[serde(rename = "RegsMadeUnderAct", default)]
    pub regs_made_under_act: Vec<String>,
}

impl RegistryRecord {
    /// Two-letter language code of the record (`en`, `fr`).
    pub fn language_code(&self) -> &str {
        let lang = self.language.trim();
        match lang.char_indices().nth(2) {
            Some((idx, _)) => &lang[..idx],
            None => lang,
        }
    }
}

/// The Acts/Regulations registry listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegisRegistry {
    #[serde(rename = "Acts", default)]
    pub acts: Vec<RegistryRecord>,
    #[serde(rename = "Regulations", default)]
    pub regulations: Vec<RegistryRecord>,
}

// ---------------------------------------------------------------------------
// Consolidated documents
// ---------------------------------------------------------------------------

/// A node of a consolidated instrument document: an element or a text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentNode {
    Text(String),
    Element(Element),
}

/// An element of a consolidated instrument document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Element::default()
        }
    }

    /// Builder helper: appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(DocumentNode::Element(child));
        self
    }

    /// Builder helper: appends a text run.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(DocumentNode::Text(text.into()));
        self
    }

    /// First direct child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|child| match child {
            DocumentNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Direct child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |child| match child {
            DocumentNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }
}
