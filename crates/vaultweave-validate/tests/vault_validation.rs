//! vault_validation.rs
//!
//! End-to-end validation runs over a small in-memory vault: a catalog, a
//! page with an inline author, a dataset, and a reference node. Exercises
//! the full pipeline in both modes, plus the dev-mode orphan demotion.

use serde_json::{json, Value};

use vaultweave_core::node::SourceDocument;
use vaultweave_validate::expr::ExprSchema;
use vaultweave_validate::pipeline::{validate_vault, Stage, VaultInput};
use vaultweave_validate::policy::Mode;
use vaultweave_validate::property::{CompiledShapes, ShapesDocument};

fn doc(value: Value, file: &str) -> SourceDocument {
    SourceDocument {
        value,
        file: file.to_string(),
    }
}

fn small_vault() -> VaultInput {
    VaultInput {
        documents: vec![
            doc(
                json!({
                    "@context": "https://schema.org/",
                    "@id": "https://vault.example/",
                    "@type": "Catalog",
                    "name": "Example Vault",
                    "dataset": [{ "@id": "https://vault.example/data/metrics" }],
                    "hasPart": [{ "@id": "https://vault.example/pages/home" }]
                }),
                "vault/index.jsonld",
            ),
            doc(
                json!({
                    "@context": "https://schema.org/",
                    "@graph": [{
                        "@id": "https://vault.example/pages/home",
                        "@type": "WebPage",
                        "name": "Home",
                        "datePublished": "2024-03-01",
                        "author": {
                            "@id": "https://vault.example/people/aria",
                            "@type": "Person",
                            "name": "Aria"
                        },
                        "license": { "@id": "https://vault.example/refs/cc-by" }
                    }]
                }),
                "vault/pages/home.jsonld",
            ),
            doc(
                json!({
                    "@id": "https://vault.example/data/metrics",
                    "@type": "Dataset",
                    "name": "Metrics"
                }),
                "vault/data/metrics.jsonld",
            ),
            doc(
                json!({
                    "@id": "https://vault.example/refs/cc-by",
                    "@type": "Reference",
                    "name": "CC-BY 4.0"
                }),
                "vault/refs/cc-by.jsonld",
            ),
        ],
        load_errors: vec![],
    }
}

fn vault_shapes() -> CompiledShapes {
    ShapesDocument::from_value(&json!({
        "shapes": [
            {
                "id": "PageShape",
                "targetClass": "WebPage",
                "properties": [
                    { "path": "name", "minCount": 1, "maxCount": 1, "datatype": "xsd:string" },
                    { "path": "datePublished", "datatype": "xsd:date" },
                    { "path": "author", "class": "Person" }
                ]
            },
            {
                "id": "DatasetShape",
                "targetClass": "Dataset",
                "properties": [
                    { "path": "name", "minCount": 1 }
                ]
            }
        ]
    }))
    .unwrap()
}

fn vault_schema() -> ExprSchema {
    ExprSchema::from_value(&json!({
        "type": "Schema",
        "start": "PageShape",
        "shapes": [{
            "id": "PageShape",
            "type": "Shape",
            "expression": {
                "type": "EachOf",
                "expressions": [
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
                        "valueExpr": { "type": "NodeConstraint", "values": ["WebPage"] },
                        "min": 1
                    },
                    {
                        "type": "TripleConstraint",
                        "predicate": "https://schema.org/name",
                        "valueExpr": { "type": "NodeConstraint", "datatype": "xsd:string" },
                        "min": 1, "max": 1
                    }
                ]
            }
        }]
    }))
    .unwrap()
}

#[test]
fn clean_vault_passes_in_both_modes() {
    for mode in [Mode::Strict, Mode::Dev] {
        let outcome =
            validate_vault(&small_vault(), &vault_shapes(), &vault_schema(), mode).unwrap();
        assert!(outcome.property_report.ok);
        assert!(outcome.expr_report.ok);
        assert!(outcome.warnings.is_empty());
        // Catalog, page, dataset, reference. The inline author is a
        // definition, not a top-level node.
        assert_eq!(outcome.enriched.len(), 4);
        for enriched in &outcome.enriched {
            assert!(enriched.cid.starts_with("ipfs://sha256-"));
        }
    }
}

#[test]
fn unlinking_a_page_orphans_it_and_its_references() {
    let mut input = small_vault();
    // Drop the catalog's hasPart entry; the page and the reference node it
    // links become unreachable.
    if let Value::Object(ref mut obj) = input.documents[0].value {
        obj.remove("hasPart");
    }

    let failure =
        validate_vault(&input, &vault_shapes(), &vault_schema(), Mode::Strict).unwrap_err();
    assert_eq!(failure.stage, Stage::Reachability);
    assert_eq!(failure.lines[0], "Reachability validation failed (mode: strict):");
    assert!(failure
        .lines
        .iter()
        .any(|l| l.contains("https://vault.example/pages/home")));
    assert!(failure
        .lines
        .iter()
        .any(|l| l.contains("https://vault.example/refs/cc-by")));

    let outcome = validate_vault(&input, &vault_shapes(), &vault_schema(), Mode::Dev).unwrap();
    assert!(!outcome.warnings.is_empty());
    assert_eq!(outcome.warnings[0], "Reachability warning (mode: dev):");
    assert_eq!(
        outcome.warnings.last().map(String::as_str),
        Some("Hint: link it from an index page.")
    );
}

#[test]
fn dataset_prefix_reaches_matching_pages_until_removed() {
    // One catalog whose dataset entry is a prefix defined inline, one page
    // under that prefix, no explicit link between them.
    let prefix_vault = || VaultInput {
        documents: vec![
            doc(
                json!({
                    "@id": "https://vault.example/",
                    "@type": "Catalog",
                    "name": "Example Vault",
                    "dataset": [{
                        "@id": "https://vault.example/pages/",
                        "@type": "Dataset",
                        "name": "Pages"
                    }]
                }),
                "vault/index.jsonld",
            ),
            doc(
                json!({
                    "@id": "https://vault.example/pages/home",
                    "@type": "WebPage",
                    "name": "Home"
                }),
                "vault/pages/home.jsonld",
            ),
        ],
        load_errors: vec![],
    };

    for mode in [Mode::Strict, Mode::Dev] {
        let outcome =
            validate_vault(&prefix_vault(), &vault_shapes(), &vault_schema(), mode).unwrap();
        assert!(outcome.warnings.is_empty());
        assert!(outcome.reach_findings.is_empty());
    }

    let mut input = prefix_vault();
    if let Value::Object(ref mut obj) = input.documents[0].value {
        obj.remove("dataset");
    }

    let failure =
        validate_vault(&input, &vault_shapes(), &vault_schema(), Mode::Strict).unwrap_err();
    assert_eq!(failure.stage, Stage::Reachability);
    assert!(failure
        .lines
        .iter()
        .any(|l| l.contains("Unreachable node detected: https://vault.example/pages/home")));

    let outcome = validate_vault(&input, &vault_shapes(), &vault_schema(), Mode::Dev).unwrap();
    assert_eq!(outcome.reach_findings.len(), 1);
    assert!(outcome
        .warnings
        .iter()
        .any(|l| l.contains("https://vault.example/pages/home")));
}

#[test]
fn broken_link_fails_before_reachability() {
    let mut input = small_vault();
    if let Value::Object(ref mut obj) = input.documents[0].value {
        obj.insert(
            "hasPart".to_string(),
            json!([{ "@id": "https://vault.example/pages/missing" }]),
        );
    }
    let failure = validate_vault(&input, &vault_shapes(), &vault_schema(), Mode::Dev).unwrap_err();
    assert_eq!(failure.stage, Stage::LinkIntegrity);
    assert!(failure
        .lines
        .iter()
        .any(|l| l.contains("Unresolved internal link: https://vault.example/pages/missing")));
}

#[test]
fn shape_violation_reports_the_offending_node_and_file() {
    let mut input = small_vault();
    if let Value::Object(ref mut obj) = input.documents[2].value {
        obj.insert("name".to_string(), json!(42));
        // Keep the minCount satisfied; only the datatype is wrong.
    }
    let shapes = ShapesDocument::from_value(&json!({
        "shapes": [{
            "id": "DatasetShape",
            "targetClass": "Dataset",
            "properties": [{ "path": "name", "minCount": 1, "datatype": "xsd:string" }]
        }]
    }))
    .unwrap();
    let failure = validate_vault(&input, &shapes, &vault_schema(), Mode::Dev).unwrap_err();
    assert_eq!(failure.stage, Stage::PropertyShapes);
    assert_eq!(failure.lines[0], "Property shape validation failed:");
    assert!(failure.lines[1].contains("https://vault.example/data/metrics"));
    assert!(failure.lines[1].contains("vault/data/metrics.jsonld"));
}

#[test]
fn content_identifiers_are_stable_across_runs() {
    let a = validate_vault(&small_vault(), &vault_shapes(), &vault_schema(), Mode::Dev).unwrap();
    let b = validate_vault(&small_vault(), &vault_shapes(), &vault_schema(), Mode::Dev).unwrap();
    let cids_a: Vec<&str> = a.enriched.iter().map(|e| e.cid.as_str()).collect();
    let cids_b: Vec<&str> = b.enriched.iter().map(|e| e.cid.as_str()).collect();
    assert_eq!(cids_a, cids_b);
}
