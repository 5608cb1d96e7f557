use std::collections::BTreeMap;

use legisgraph::config::{LegisGraphConfig, Vocabulary, DEFAULT_INSTRUMENT_BASE};
use legisgraph::graph::*;
use legisgraph::types::*;

fn assembler() -> GraphAssembler {
    GraphAssembler::new(&LegisGraphConfig::default()).unwrap()
}

fn uri(predicate: Predicate) -> String {
    Vocabulary::default().uri(predicate).to_string()
}

fn id(raw: &str) -> CanonicalId {
    CanonicalId::new(raw)
}

fn instrument(raw: &str) -> String {
    format!("{DEFAULT_INSTRUMENT_BASE}{}", id(raw))
}

fn objects(asm: &GraphAssembler, raw: &str, predicate: Predicate) -> Vec<Term> {
    let subject = instrument(raw);
    let predicate = uri(predicate);
    asm.graph().objects(&subject, &predicate).cloned().collect()
}

fn document(notes: &[&str]) -> Element {
    let mut note = Element::new("HistoricalNote");
    for text in notes {
        note = note.with_child(Element::new("HistoricalNoteSubItem").with_text(*text));
    }
    Element::new("Regulation")
        .with_child(Element::new("Identification").with_text("Widget Regulations"))
        .with_child(
            Element::new("Body").with_child(
                Element::new("Section")
                    .with_child(Element::new("Text").with_text("Widgets are blue."))
                    .with_child(note),
            ),
        )
}

fn record(internal: &str, unique_id: &str, language: &str) -> RegistryRecord {
    RegistryRecord {
        id: Some(internal.to_string()),
        olid: None,
        unique_id: unique_id.to_string(),
        language: language.to_string(),
        current_to_date: Some("2024-01-01".to_string()),
        title: Some(format!("Title of {unique_id}")),
        link_to_html_toc: Some(format!("https://laws.example/eng/{unique_id}/index.html")),
        regs_made_under_act: Vec::new(),
    }
}

/// Every edge predicate joins two registered instruments.
fn assert_referentially_complete(asm: &GraphAssembler) {
    let edge_predicates: Vec<String> = EdgeKind::ALL.iter().map(|k| uri(k.predicate())).collect();
    for triple in asm.graph().iter() {
        if !edge_predicates.contains(&triple.predicate) {
            continue;
        }
        for term in [&triple.subject, &triple.object] {
            let local = term
                .as_uri()
                .and_then(|u| u.strip_prefix(DEFAULT_INSTRUMENT_BASE))
                .unwrap_or_else(|| panic!("edge endpoint is not an instrument: {term:?}"));
            assert!(asm.registry().contains(&id(local)), "{local} not registered");
        }
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

#[test]
fn test_register_emits_kind_once() {
    let mut asm = assembler();
    assert!(asm.register_instrument(&id("SOR/2020-1"), None));
    assert!(!asm.register_instrument(&id("SOR/2020-1"), Some(InstrumentKind::Act)));
    assert_eq!(
        objects(&asm, "SOR/2020-1", Predicate::InstrumentKind),
        vec![Term::Literal(Literal::plain("regulation"))]
    );
}

#[test]
fn test_edge_requires_registered_endpoints() {
    let mut asm = assembler();
    asm.register_instrument(&id("F-7"), Some(InstrumentKind::Act));
    let edge = Edge {
        source: id("SOR/92-100"),
        target: id("F-7"),
        kind: EdgeKind::EnablingAct,
    };
    let before = asm.graph().len();
    assert!(!asm.add_edge(&edge));
    assert_eq!(asm.graph().len(), before);
}

#[test]
fn test_edge_adds_inverse() {
    let mut asm = assembler();
    asm.register_instrument(&id("F-7"), Some(InstrumentKind::Act));
    asm.register_instrument(&id("SOR/92-100"), None);
    assert!(asm.add_edge(&Edge {
        source: id("SOR/92-100"),
        target: id("F-7"),
        kind: EdgeKind::EnablingAct,
    }));
    assert_eq!(
        objects(&asm, "SOR/92-100", Predicate::EnablingAct),
        vec![Term::uri(instrument("F-7"))]
    );
    assert_eq!(
        objects(&asm, "F-7", Predicate::EnablesRegulation),
        vec![Term::uri(instrument("SOR/92-100"))]
    );
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[test]
fn test_document_links_amending_instruments() {
    let mut asm = assembler();
    asm.register_instrument(&id("SOR/92-100"), None);
    asm.register_instrument(&id("SOR/95-1"), None);

    let summary = asm.ingest_document(
        &id("SOR/95-1"),
        &document(&["SOR/92-100, s. 2; SOR/2099-1", "SOR/92-100, ss. 3 and 4"]),
    );

    assert_eq!(summary.section_count, 1);
    assert_eq!(summary.amending_instruments, 1);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(
        objects(&asm, "SOR/95-1", Predicate::Consolidates),
        vec![Term::uri(instrument("SOR/92-100"))]
    );
    assert_eq!(
        objects(&asm, "SOR/92-100", Predicate::AmendsInstrument),
        vec![Term::uri(instrument("SOR/95-1"))]
    );
    assert_eq!(
        objects(&asm, "SOR/95-1", Predicate::SectionCount),
        vec![Term::Literal(Literal::integer(1))]
    );
    assert_eq!(
        objects(&asm, "SOR/95-1", Predicate::WordCount),
        vec![Term::Literal(Literal::integer(summary.word_count))]
    );
    assert_eq!(asm.unresolved().context("SOR/2099-1"), Some("SOR/2099-1"));
    assert_referentially_complete(&asm);
}

#[test]
fn test_annual_statute_is_registered_on_first_citation() {
    let mut asm = assembler();
    asm.register_instrument(&id("SOR/92-100"), None);
    asm.ingest_document(&id("SOR/92-100"), &document(&["2019, c. 29, s. 4"]));

    let statute = "S.C._2019,c._29";
    assert!(asm.registry().contains(&id(statute)));
    assert_eq!(
        objects(&asm, statute, Predicate::Url),
        vec![Term::Literal(Literal::plain(
            "https://laws.justice.gc.ca/eng/AnnualStatutes/2019_29"
        ))]
    );
    assert_eq!(
        objects(&asm, statute, Predicate::InstrumentKind),
        vec![Term::Literal(Literal::plain("act"))]
    );
    assert_eq!(
        objects(&asm, statute, Predicate::AmendsInstrument),
        vec![Term::uri(instrument("SOR/92-100"))]
    );
    assert_referentially_complete(&asm);
}

#[test]
fn test_document_without_body_counts_zero_sections() {
    let mut asm = assembler();
    let root = Element::new("Statute").with_child(Element::new("Identification").with_text("Short Title Act"));
    let summary = asm.ingest_document(&id("F-7"), &root);
    assert_eq!(summary.section_count, 0);
    assert_eq!(summary.word_count, 3);
    assert!(asm.registry().contains(&id("F-7")));
}

#[test]
fn test_citation_before_registration_stays_unresolved() {
    let mut asm = assembler();
    asm.register_instrument(&id("SOR/95-1"), None);
    asm.ingest_document(&id("SOR/95-1"), &document(&["SOR/2001-5"]));
    asm.register_instrument(&id("SOR/2001-5"), None);

    assert!(asm.unresolved().contains("SOR/2001-5"));
    assert!(objects(&asm, "SOR/95-1", Predicate::Consolidates).is_empty());
}

#[test]
fn test_reingesting_a_document_adds_nothing() {
    let mut asm = assembler();
    asm.register_instrument(&id("SOR/92-100"), None);
    let doc = document(&["SOR/92-100, s. 1"]);
    asm.ingest_document(&id("SOR/95-1"), &doc);
    let len = asm.graph().len();
    asm.ingest_document(&id("SOR/95-1"), &doc);
    assert_eq!(asm.graph().len(), len);
}

// ---------------------------------------------------------------------------
// Registry listing
// ---------------------------------------------------------------------------

#[test]
fn test_registry_links_regulations_to_enabling_act() {
    let mut asm = assembler();
    let mut act = record("A1", "F-7", "eng");
    act.regs_made_under_act = vec!["R1".to_string(), "R9".to_string()];
    let listing = LegisRegistry {
        acts: vec![act, record("A1F", "F-7", "fra")],
        regulations: vec![record("R1", "SOR/92-100", "eng"), record("R1F", "DORS/92-100", "fra")],
    };
    let mut documents: BTreeMap<CanonicalId, Element> = BTreeMap::new();
    documents.insert(id("F-7"), document(&["SOR/92-100, s. 2"]));

    let summary = asm.ingest_registry(&listing, &documents);

    assert_eq!(
        summary,
        RegistrySummary {
            english_acts: 1,
            english_regulations: 1,
            documents_processed: 1,
            documents_missing: 1,
        }
    );
    assert!(!asm.registry().contains(&id("DORS/92-100")));

    assert_eq!(
        objects(&asm, "SOR/92-100", Predicate::EnablingAct),
        vec![Term::uri(instrument("F-7"))]
    );
    assert_eq!(
        objects(&asm, "F-7", Predicate::EnablesRegulation),
        vec![Term::uri(instrument("SOR/92-100"))]
    );
    assert_eq!(
        objects(&asm, "F-7", Predicate::Consolidates),
        vec![Term::uri(instrument("SOR/92-100"))]
    );
    assert_eq!(
        asm.unresolved().context("R9"),
        Some("RegsMadeUnderAct of F-7")
    );
    assert_referentially_complete(&asm);
}

#[test]
fn test_registry_titles_and_urls() {
    let mut asm = assembler();
    let listing = LegisRegistry {
        acts: vec![record("A1", "F-7", "eng")],
        regulations: vec![record("R1", "SOR/92-100", "eng")],
    };
    let documents: BTreeMap<CanonicalId, Element> = BTreeMap::new();
    asm.ingest_registry(&listing, &documents);

    assert_eq!(
        objects(&asm, "F-7", Predicate::Title),
        vec![Term::Literal(Literal::tagged("Title of F-7", "en"))]
    );
    assert_eq!(
        objects(&asm, "F-7", Predicate::Url),
        vec![Term::Literal(Literal::tagged("https://laws.example/eng/F-7", "en"))]
    );
    assert!(objects(&asm, "SOR/92-100", Predicate::Title).is_empty());
    assert_eq!(
        objects(&asm, "SOR/92-100", Predicate::Url),
        vec![Term::Literal(Literal::tagged(
            "https://laws.example/eng/SOR/92-100/index.html",
            "en"
        ))]
    );
    assert_eq!(
        objects(&asm, "F-7", Predicate::CurrentToDate),
        vec![Term::Literal(Literal::plain("2024-01-01"))]
    );
}

// ---------------------------------------------------------------------------
// Tabular sources
// ---------------------------------------------------------------------------

#[test]
fn test_statutory_index_titles() {
    let mut asm = assembler();
    let entries = vec![
        IndexEntry::Regulation {
            text: "Widget Regulations, SOR/2002-44".to_string(),
        },
        IndexEntry::Heading {
            text: "Widget Order [SI/2002-45]".to_string(),
        },
        IndexEntry::Ordered {
            category: "Order".to_string(),
            text: "Designating the Minister, SI/2002-45".to_string(),
        },
        IndexEntry::Heading {
            text: "Miscellany [ABC 1]".to_string(),
        },
    ];

    assert_eq!(asm.ingest_statutory_index(&entries), 2);
    assert!(asm.registry().contains(&id("SOR/2002-44")));
    assert!(!asm.registry().contains(&id("SI/2002-45")));
    assert_eq!(
        objects(&asm, "SI/2002-45", Predicate::Title),
        vec![Term::Literal(Literal::plain("Order Designating the Minister"))]
    );
    assert!(objects(&asm, "ABC 1", Predicate::Title).is_empty());
}

#[test]
fn test_departments() {
    let mut asm = assembler();
    let records = vec![DepartmentRecord {
        org_id: " 42 ".to_string(),
        name_en: Some("Finance".to_string()),
        name_fr: Some("Finances".to_string()),
        head_en: Some(String::new()),
    }];
    assert_eq!(asm.ingest_departments(&records), 1);

    let subject = "https://www.tpsgc-pwgsc.gc.ca/recgen/orgid/42";
    let names: Vec<Term> = asm
        .graph()
        .objects(subject, &uri(Predicate::OrgName))
        .cloned()
        .collect();
    assert_eq!(
        names,
        vec![
            Term::Literal(Literal::plain("Finance")),
            Term::Literal(Literal::tagged("Finances", "fr")),
        ]
    );
    assert_eq!(asm.graph().len(), 2);
}

#[test]
fn test_rias_registers_and_skips_blank_values() {
    let mut asm = assembler();
    let records = vec![RiasRecord {
        id: "SOR/2020-1".to_string(),
        sponsor: Some("Health".to_string()),
        cba_word_count: Some("120".to_string()),
        rias_word_count: Some(" ".to_string()),
        consultation_word_count: None,
    }];
    assert_eq!(asm.ingest_rias(&records), 1);
    assert!(asm.registry().contains(&id("SOR-2020-1")));
    assert_eq!(
        objects(&asm, "SOR/2020-1", Predicate::Sponsor),
        vec![Term::Literal(Literal::plain("Health"))]
    );
    assert!(objects(&asm, "SOR/2020-1", Predicate::RiasWordCount).is_empty());
    assert_eq!(asm.graph().about(&instrument("SOR/2020-1")).count(), 3);
}

#[test]
fn test_metadata_does_not_register() {
    let mut asm = assembler();
    let records = vec![
        MetadataRecord {
            instrument_number: "SOR/2020-1".to_string(),
            category_item_desc_en: Some("Fees".to_string()),
        },
        MetadataRecord {
            instrument_number: "SOR/2020-2".to_string(),
            category_item_desc_en: None,
        },
    ];
    assert_eq!(asm.ingest_metadata(&records), 1);
    assert!(asm.registry().is_empty());
    assert_eq!(
        objects(&asm, "SOR/2020-1", Predicate::InstrumentReferences),
        vec![Term::Literal(Literal::plain("Fees"))]
    );
}

#[test]
fn test_invalid_vocabulary_is_rejected() {
    let mut config = LegisGraphConfig::default();
    config.vocabulary.set("word_count", " ");
    assert!(GraphAssembler::new(&config).is_err());
}
