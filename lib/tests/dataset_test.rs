use oxigraph::store::Store;
use shifty_ds::test_utils::store_from_trig;
use shifty_ds::{ValidationConfig, ValidationMode, ValidationReport, Validator};
use std::error::Error;

const PREFIXES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.org/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
"#;

const PERSON_SHAPE: &str = r#"
    ex:PersonShape a sh:NodeShape ;
        sh:targetClass ex:Person ;
        sh:property [ sh:path ex:name ; sh:minCount 1 ; sh:datatype xsd:string ] .
"#;

fn trig(body: &str) -> Result<Store, Box<dyn Error>> {
    store_from_trig(&format!("{PREFIXES}{body}"))
}

fn run(
    shapes: &str,
    data: &str,
    mode: ValidationMode,
    config: ValidationConfig,
) -> Result<ValidationReport, Box<dyn Error>> {
    let validator = Validator::builder()
        .with_shapes_store(trig(shapes)?)
        .with_data_store(trig(data)?)
        .with_mode(mode)
        .with_config(config)
        .build()?;
    Ok(validator.validate()?)
}

const TWO_GRAPHS: &str = r#"
    ex:g1 { ex:alice a ex:Person . }
    ex:g2 { ex:bob a ex:Person . }
"#;

#[test]
fn shapes_only_validate_their_own_graph() -> Result<(), Box<dyn Error>> {
    let shapes = format!("ex:g1 {{ {PERSON_SHAPE} }}");
    let report = run(
        &shapes,
        TWO_GRAPHS,
        ValidationMode::Dataset,
        ValidationConfig::default(),
    )?;
    assert!(!report.conforms());
    assert_eq!(report.results().len(), 1);
    let result = &report.results()[0];
    assert_eq!(result.focus_node().to_string(), "<http://example.org/alice>");
    assert_eq!(
        result.data_graph().map(|g| g.as_str()),
        Some("http://example.org/g1")
    );
    Ok(())
}

#[test]
fn classic_mode_validates_the_union() -> Result<(), Box<dyn Error>> {
    let shapes = format!("ex:g1 {{ {PERSON_SHAPE} }}");
    let report = run(
        &shapes,
        TWO_GRAPHS,
        ValidationMode::Classic,
        ValidationConfig::default(),
    )?;
    let focus: Vec<String> = report
        .results()
        .iter()
        .map(|r| r.focus_node().to_string())
        .collect();
    assert_eq!(
        focus,
        vec!["<http://example.org/alice>", "<http://example.org/bob>"]
    );
    assert!(report.results().iter().all(|r| r.data_graph().is_none()));
    Ok(())
}

#[test]
fn default_graph_shapes_are_inert_in_dataset_mode() -> Result<(), Box<dyn Error>> {
    let report = run(
        PERSON_SHAPE,
        TWO_GRAPHS,
        ValidationMode::Dataset,
        ValidationConfig::default(),
    )?;
    assert!(report.conforms());
    assert!(report.results().is_empty());
    Ok(())
}

#[test]
fn class_hierarchy_does_not_leak_between_graphs() -> Result<(), Box<dyn Error>> {
    let shapes = format!("ex:g1 {{ {PERSON_SHAPE} }} ex:g2 {{ {PERSON_SHAPE} }}");
    let data = r#"
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        ex:g1 { ex:Student rdfs:subClassOf ex:Person . ex:carol a ex:Student . }
        ex:g2 { ex:dave a ex:Student . }
    "#;
    let report = run(&shapes, data, ValidationMode::Dataset, ValidationConfig::default())?;
    let focus: Vec<String> = report
        .results()
        .iter()
        .map(|r| r.focus_node().to_string())
        .collect();
    assert_eq!(focus, vec!["<http://example.org/carol>"]);
    Ok(())
}

#[test]
fn target_graphs_skip_unmatched_shapes_graphs() -> Result<(), Box<dyn Error>> {
    let shapes = format!("ex:g2 {{ {PERSON_SHAPE} }} ex:g9 {{ {PERSON_SHAPE} }}");
    let validator = Validator::builder()
        .with_shapes_store(trig(&shapes)?)
        .with_data_store(trig(TWO_GRAPHS)?)
        .with_mode(ValidationMode::Dataset)
        .build()?;
    let names: Vec<String> = validator
        .target_graphs()?
        .iter()
        .map(|t| t.scope.to_string())
        .collect();
    assert_eq!(names, vec!["<http://example.org/g2>"]);
    Ok(())
}

#[test]
fn repeated_runs_are_identical() -> Result<(), Box<dyn Error>> {
    let shapes = format!("ex:g1 {{ {PERSON_SHAPE} }} ex:g2 {{ {PERSON_SHAPE} }}");
    let data = r#"
        ex:g1 { ex:a a ex:Person . ex:b a ex:Person ; ex:name 3 . ex:c a ex:Person . }
        ex:g2 { ex:d a ex:Person ; ex:name "ok" . ex:e a ex:Person . }
    "#;
    let validator = Validator::builder()
        .with_shapes_store(trig(&shapes)?)
        .with_data_store(trig(data)?)
        .with_mode(ValidationMode::Dataset)
        .build()?;
    let first = validator.validate()?;
    let second = validator.validate()?;
    assert_eq!(first, second);
    assert_eq!(first.results().len(), 4);

    let sequential = run(
        &shapes,
        data,
        ValidationMode::Dataset,
        ValidationConfig::default().with_parallel(false),
    )?;
    let keys = |report: &ValidationReport| -> Vec<String> {
        report.results().iter().map(|r| r.fingerprint()).collect()
    };
    assert_eq!(keys(&first), keys(&sequential));
    assert!(first.is_equivalent(&sequential));
    Ok(())
}

#[test]
fn blank_focus_nodes_keep_their_order_across_loads() -> Result<(), Box<dyn Error>> {
    let shapes = r#"
        ex:g {
            ex:S a sh:NodeShape ;
                sh:targetClass ex:C ;
                sh:property [ sh:path ex:v ; sh:in ( 0 ) ] .
        }
    "#;
    let data = r#"
        ex:g {
            [] a ex:C ; ex:v 3 .
            [] a ex:C ; ex:v 1 .
            [] a ex:C ; ex:v 4 .
            [] a ex:C ; ex:v 2 .
        }
    "#;
    let values = |report: &ValidationReport| -> Vec<String> {
        report
            .results()
            .iter()
            .map(|r| r.value().map(|v| v.to_string()).unwrap_or_default())
            .collect()
    };
    let first = run(shapes, data, ValidationMode::Dataset, ValidationConfig::default())?;
    let second = run(shapes, data, ValidationMode::Dataset, ValidationConfig::default())?;
    assert_eq!(first.results().len(), 4);
    assert_eq!(values(&first), values(&second));
    let fingerprints = |report: &ValidationReport| -> Vec<String> {
        report.results().iter().map(|r| r.fingerprint()).collect()
    };
    assert_eq!(fingerprints(&first), fingerprints(&second));
    assert!(values(&first)[0].starts_with("\"1\""));
    assert!(values(&first)[3].starts_with("\"4\""));
    Ok(())
}
