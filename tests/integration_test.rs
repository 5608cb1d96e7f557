use std::fs;
use std::path::Path;

use legisgraph::config::{LegisGraphConfig, DEFAULT_INSTRUMENT_BASE};
use legisgraph::errors::LegisGraphError;
use legisgraph::export::TripleStore;
use legisgraph::legisgraph::{BuildOptions, LegisGraph};
use legisgraph::types::CanonicalId;
use tempfile::TempDir;

const REGISTRY: &str = r#"{
  "Acts": [
    {
      "id": "A1",
      "UniqueId": "F-7",
      "Language": "eng",
      "CurrentToDate": "2024-01-01",
      "Title": "Food Act",
      "LinkToHTMLToC": "https://laws.example/eng/acts/F-7/index.html",
      "RegsMadeUnderAct": ["R1", "R404"]
    },
    {
      "id": "A1F",
      "UniqueId": "F-7",
      "Language": "fra",
      "Title": "Loi sur les aliments"
    }
  ],
  "Regulations": [
    {
      "id": "R1",
      "UniqueId": "SOR/92-100",
      "Language": "eng",
      "LinkToHTMLToC": "https://laws.example/eng/regulations/SOR-92-100/index.html"
    }
  ]
}"#;

const FOOD_ACT: &str = r#"{
  "name": "Statute",
  "children": [
    { "name": "Identification", "children": ["Food Act"] },
    {
      "name": "Body",
      "children": [
        {
          "name": "Section",
          "children": [
            { "name": "Text", "children": ["No person shall sell unsafe food."] },
            {
              "name": "HistoricalNote",
              "children": [
                { "name": "HistoricalNoteSubItem", "children": ["SOR/92-100, s. 2; 2019, c. 29"] },
                { "name": "HistoricalNoteSubItem", "children": ["SOR/1999-9"] }
              ]
            }
          ]
        }
      ]
    }
  ]
}"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "rdf/base.ttl",
        "@prefix ex: <https://example.org/> .\nex:catalogue ex:label \"Federal legislation\"@en .\n",
    );
    write(
        root,
        "statutory-index.json",
        r#"[{"kind": "regulation", "text": "Food Regulations, SOR/92-100"}]"#,
    );
    write(
        root,
        "csv/departments.csv",
        "ORG_ID,ORGNAME_EN,ORGNAME_FR,DEPT_HEAD_EN\n 42 , Finance , Finances , Minister of Finance \n",
    );
    write(
        root,
        "regcan.csv",
        "ID,sponsor,CBA.wordcount,rias.wordcount,consultation.wordcount\nSOR/92-100,Health,120,,\n",
    );
    write(root, "legis.json", REGISTRY);
    write(root, "documents/F-7.json", FOOD_ACT);
    write(
        root,
        "metadata.csv",
        "instrument_number,category_item_desc_en\nSOR/92-100,Fees\n",
    );
    dir
}

#[test]
fn test_build_end_to_end() {
    let dir = fixture();
    let lg = LegisGraph::init(dir.path()).unwrap();
    let summary = lg.build(&BuildOptions::default()).unwrap();

    assert!(summary.parse_passed);
    assert_eq!(summary.fact_files, 1);
    assert_eq!(summary.registry.english_acts, 1);
    assert_eq!(summary.registry.english_regulations, 1);
    assert_eq!(summary.registry.documents_processed, 1);
    assert_eq!(summary.registry.documents_missing, 1);

    let unresolved: Vec<&str> = summary.unresolved.iter().map(|e| e.citation.as_str()).collect();
    assert_eq!(unresolved, vec!["R404", "SOR/1999-9"]);

    let ttl_path = dir.path().join("target/out.ttl");
    let ttl = fs::read_to_string(&ttl_path).unwrap();
    assert!(ttl.contains("@prefix ex: <https://example.org/> .\n"));
    assert!(ttl.contains("si:F-7 jus:consolidates si:SOR-92-100 .\n"));
    assert!(ttl.contains("si:SOR-92-100 jus:amends-instrument si:F-7 .\n"));
    assert!(ttl.contains("si:SOR-92-100 jus:enabling-act si:F-7 .\n"));
    assert!(ttl.contains("si:F-7 schema:name \"Food Act\"@en .\n"));
    assert!(ttl.contains("si:F-7 schema:url \"https://laws.example/eng/acts/F-7\"@en .\n"));
    assert!(ttl.contains(&format!(
        "<{DEFAULT_INSTRUMENT_BASE}S.C._2019,c._29> jus:amends-instrument si:F-7 .\n"
    )));
    assert!(ttl.contains("org:42 recgen:org-name \"Finances\"@fr .\n"));
    assert!(ttl.contains("si:SOR-92-100 csps:instrument-references \"Fees\" .\n"));
    assert!(!ttl.contains("Loi sur les aliments"));

    let store = TripleStore::open(&dir.path().join("target/out.sqlite3")).unwrap();
    assert_eq!(store.triple_count().unwrap(), summary.triple_count);
    assert_eq!(summary.sqlite_path, Some(dir.path().join("target/out.sqlite3")));
}

#[test]
fn test_rebuild_is_stable() {
    let dir = fixture();
    let lg = LegisGraph::init(dir.path()).unwrap();
    let first = lg.build(&BuildOptions::default()).unwrap();
    let first_ttl = fs::read_to_string(dir.path().join("target/out.ttl")).unwrap();
    let first_rows = TripleStore::open(&dir.path().join("target/out.sqlite3"))
        .unwrap()
        .rows()
        .unwrap();

    let second = lg.build(&BuildOptions::default()).unwrap();
    let second_ttl = fs::read_to_string(dir.path().join("target/out.ttl")).unwrap();
    let second_rows = TripleStore::open(&dir.path().join("target/out.sqlite3"))
        .unwrap()
        .rows()
        .unwrap();

    assert_eq!(first.triple_count, second.triple_count);
    assert_eq!(first_ttl, second_ttl);
    assert_eq!(first_rows, second_rows);
}

#[test]
fn test_output_overrides() {
    let dir = fixture();
    let out = TempDir::new().unwrap();
    let lg = LegisGraph::open(dir.path()).unwrap();
    let options = BuildOptions {
        turtle: Some(out.path().join("graph.ttl")),
        sqlite: Some(out.path().join("graph.db")),
        strict: false,
    };
    lg.build(&options).unwrap();
    assert!(out.path().join("graph.ttl").is_file());
    assert!(out.path().join("graph.db").is_file());
    assert!(!dir.path().join("target").exists());
}

#[test]
fn test_parse_errors_still_export_by_default() {
    let dir = fixture();
    write(dir.path(), "rdf/broken.ttl", "ex:a ex:b .\n");
    let lg = LegisGraph::open(dir.path()).unwrap();

    let summary = lg.build(&BuildOptions::default()).unwrap();
    assert!(!summary.parse_passed);
    assert!(summary.diagnostics.iter().all(|d| d.contains("broken.ttl")));
    assert!(summary.turtle_path.is_some());
    assert!(dir.path().join("target/out.ttl").is_file());
}

#[test]
fn test_strict_build_refuses_to_export_after_parse_errors() {
    let dir = fixture();
    write(dir.path(), "rdf/broken.ttl", "ex:a ex:b .\n");
    let lg = LegisGraph::open(dir.path()).unwrap();

    let summary = lg
        .build(&BuildOptions {
            strict: true,
            ..BuildOptions::default()
        })
        .unwrap();
    assert!(!summary.parse_passed);
    assert!(summary.turtle_path.is_none());
    assert!(!dir.path().join("target/out.ttl").exists());
    assert!(!dir.path().join("target/out.sqlite3").exists());
}

#[test]
fn test_foreign_file_in_facts_aborts_before_export() {
    let dir = fixture();
    write(dir.path(), "rdf/README.md", "# facts\n");
    let lg = LegisGraph::open(dir.path()).unwrap();

    let err = lg.build(&BuildOptions::default()).err().unwrap();
    assert!(matches!(err, LegisGraphError::SourceFormat { .. }));
    assert!(!dir.path().join("target").exists());
}

#[test]
fn test_missing_sources_are_skipped() {
    let dir = TempDir::new().unwrap();
    let lg = LegisGraph::open(dir.path()).unwrap();
    let summary = lg.build(&BuildOptions::default()).unwrap();
    assert_eq!(summary.triple_count, 0);
    assert!(summary.parse_passed);
    assert!(summary.unresolved.is_empty());
}

#[test]
fn test_assemble_registers_every_edge_endpoint() {
    let dir = fixture();
    let lg = LegisGraph::open(dir.path()).unwrap();
    let run = lg.assemble().unwrap();
    let registry = &run.assembly.registry;
    for raw in ["F-7", "SOR/92-100", "S.C._2019,c._29"] {
        assert!(registry.contains(&CanonicalId::new(raw)), "{raw} not registered");
    }
    assert!(!registry.contains(&CanonicalId::new("SOR/1999-9")));
}

#[test]
fn test_turtle_export_reloads_as_facts() {
    let dir = fixture();
    let lg = LegisGraph::open(dir.path()).unwrap();
    let first = lg.build(&BuildOptions::default()).unwrap();

    // Feed the export back in as the only source.
    let reload = TempDir::new().unwrap();
    fs::create_dir_all(reload.path().join("rdf")).unwrap();
    fs::copy(dir.path().join("target/out.ttl"), reload.path().join("rdf/out.ttl")).unwrap();
    let second = LegisGraph::open(reload.path())
        .unwrap()
        .build(&BuildOptions::default())
        .unwrap();

    assert!(second.parse_passed, "{:?}", second.diagnostics);
    assert_eq!(second.triple_count, first.triple_count);
    assert_eq!(
        fs::read_to_string(reload.path().join("target/out.ttl")).unwrap(),
        fs::read_to_string(dir.path().join("target/out.ttl")).unwrap()
    );
}

#[test]
fn test_custom_source_paths() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "curated/facts.nt", "<urn:a> <urn:p> \"x\" .\n");
    let mut config = LegisGraphConfig::default();
    config.sources.facts_dir = "curated".to_string();

    let lg = LegisGraph::with_config(dir.path(), config);
    let run = lg.assemble().unwrap();
    assert_eq!(run.fact_files, 1);
    assert_eq!(run.assembly.graph.len(), 1);
}
