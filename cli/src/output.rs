//! Report serialisation and report comparison.

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{
    BlankNode, Graph, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef,
    Term, TermRef, Triple,
};
use serde_json::{json, Value};
use shifty_ds::named_nodes::{RDF, SHACL};
use shifty_ds::{Path, TraceEvent, TraceSink, ValidationReport, ValidationResult};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;

const SHACL_DS_NS: &str = "https://w3id.org/shacl-ds#";

fn data_graph_predicate() -> NamedNode {
    NamedNode::new_unchecked(format!("{SHACL_DS_NS}dataGraph"))
}

/// Builds the report triples in result order with stable blank node labels,
/// so the same report always serialises to the same bytes.
struct ReportTriples {
    triples: Vec<Triple>,
    next_blank: usize,
    relabelled: HashMap<BlankNode, BlankNode>,
}

impl ReportTriples {
    fn new() -> Self {
        ReportTriples {
            triples: Vec::new(),
            next_blank: 0,
            relabelled: HashMap::new(),
        }
    }

    /// Blank nodes from the validated graphs get labels by first appearance.
    fn stable(&mut self, term: &Term) -> Term {
        match term {
            Term::BlankNode(node) => {
                if let Some(label) = self.relabelled.get(node) {
                    return label.clone().into();
                }
                let label = self.blank("b");
                self.relabelled.insert(node.clone(), label.clone());
                label.into()
            }
            other => other.clone(),
        }
    }

    fn blank(&mut self, prefix: &str) -> BlankNode {
        let node = BlankNode::new_unchecked(format!("{}{}", prefix, self.next_blank));
        self.next_blank += 1;
        node
    }

    fn add(
        &mut self,
        subject: impl Into<NamedOrBlankNode>,
        predicate: NamedNodeRef<'_>,
        object: impl Into<Term>,
    ) {
        self.triples
            .push(Triple::new(subject, predicate.into_owned(), object));
    }

    fn report(&mut self, report: &ValidationReport) {
        let node = self.blank("report");
        let (rdf, sh) = (RDF::new(), SHACL::new());
        self.add(node.clone(), rdf.type_, sh.validation_report.into_owned());
        self.add(node.clone(), sh.conforms, Literal::from(report.conforms()));
        let mut result_nodes = Vec::with_capacity(report.results().len());
        for _ in report.results() {
            let result_node = self.blank("result");
            self.add(node.clone(), sh.result, result_node.clone());
            result_nodes.push(result_node);
        }
        for (result_node, result) in result_nodes.into_iter().zip(report.results()) {
            self.result(result_node, result);
        }
    }

    fn result(&mut self, node: BlankNode, result: &ValidationResult) {
        let (rdf, sh) = (RDF::new(), SHACL::new());
        self.add(node.clone(), rdf.type_, sh.validation_result.into_owned());
        let focus = self.stable(result.focus_node());
        self.add(node.clone(), sh.focus_node, focus);
        if let Some(path) = result.result_path() {
            let path_term = self.path(path);
            self.add(node.clone(), sh.result_path, path_term);
        }
        if let Some(value) = result.value() {
            let value = self.stable(value);
            self.add(node.clone(), sh.value, value);
        }
        let shape = self.stable(result.source_shape());
        self.add(node.clone(), sh.source_shape, shape);
        if let Some(kind) = result.source_constraint_component() {
            self.add(node.clone(), sh.source_constraint_component, kind.iri());
        }
        if let Some(constraint) = result.source_constraint() {
            let constraint = self.stable(constraint);
            self.add(node.clone(), sh.source_constraint, constraint);
        }
        self.add(node.clone(), sh.result_severity, result.severity().to_term());
        self.add(
            node.clone(),
            sh.result_message,
            Literal::new_simple_literal(result.message()),
        );
        if let Some(graph) = result.data_graph() {
            self.triples
                .push(Triple::new(node, data_graph_predicate(), graph.clone()));
        }
    }

    fn path(&mut self, path: &Path) -> Term {
        let sh = SHACL::new();
        let wrap = |this: &mut Self, predicate: NamedNodeRef<'_>, inner: &Path| -> Term {
            let node = this.blank("path");
            let inner = this.path(inner);
            this.add(node.clone(), predicate, inner);
            node.into()
        };
        match path {
            Path::Simple(predicate) => predicate.clone().into(),
            Path::Inverse(inner) => wrap(self, sh.inverse_path, inner),
            Path::ZeroOrMore(inner) => wrap(self, sh.zero_or_more_path, inner),
            Path::OneOrMore(inner) => wrap(self, sh.one_or_more_path, inner),
            Path::ZeroOrOne(inner) => wrap(self, sh.zero_or_one_path, inner),
            Path::Sequence(members) => self.list(members),
            Path::Alternative(members) => {
                let node = self.blank("path");
                let list = self.list(members);
                self.add(node.clone(), sh.alternative_path, list);
                node.into()
            }
        }
    }

    fn list(&mut self, members: &[Path]) -> Term {
        let rdf = RDF::new();
        let items: Vec<Term> = members.iter().map(|m| self.path(m)).collect();
        let cells: Vec<BlankNode> = items.iter().map(|_| self.blank("list")).collect();
        for (i, item) in items.into_iter().enumerate() {
            self.add(cells[i].clone(), rdf.first, item);
            let rest: Term = match cells.get(i + 1) {
                Some(next) => next.clone().into(),
                None => rdf.nil.into_owned().into(),
            };
            self.add(cells[i].clone(), rdf.rest, rest);
        }
        match cells.first() {
            Some(head) => head.clone().into(),
            None => rdf.nil.into_owned().into(),
        }
    }
}

/// The report as Turtle.
pub fn report_to_turtle(report: &ValidationReport) -> Result<String, Box<dyn Error>> {
    let mut builder = ReportTriples::new();
    builder.report(report);
    let mut writer = Vec::new();
    let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle)
        .with_prefix("sh", "http://www.w3.org/ns/shacl#")?
        .with_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#")?
        .with_prefix("xsd", "http://www.w3.org/2001/XMLSchema#")?
        .with_prefix("shds", SHACL_DS_NS)?
        .for_writer(&mut writer);
    for triple in &builder.triples {
        serializer.serialize_triple(triple)?;
    }
    serializer.finish()?;
    Ok(String::from_utf8(writer)?)
}

fn term_to_string(term: &Term) -> String {
    match term {
        Term::NamedNode(nn) => nn.as_str().to_string(),
        other => other.to_string(),
    }
}

fn result_to_json(result: &ValidationResult) -> Value {
    json!({
        "focusNode": term_to_string(result.focus_node()),
        "resultPath": result.result_path().map(|p| p.to_sparql_path()),
        "value": result.value().map(term_to_string),
        "sourceShape": term_to_string(result.source_shape()),
        "sourceConstraintComponent": result
            .source_constraint_component()
            .map(|kind| kind.iri().into_string()),
        "sourceConstraint": result.source_constraint().map(term_to_string),
        "severity": result.severity().to_string(),
        "message": result.message(),
        "dataGraph": result.data_graph().map(|g| g.as_str().to_string()),
    })
}

/// The report as a JSON document.
pub fn report_to_json(report: &ValidationReport) -> Result<String, Box<dyn Error>> {
    let value = json!({
        "conforms": report.conforms(),
        "results": report.results().iter().map(result_to_json).collect::<Vec<_>>(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Writes recursion trace events to stderr as JSON lines.
pub struct StderrTraceSink;

impl TraceSink for StderrTraceSink {
    fn record(&self, event: TraceEvent) {
        eprintln!("{}", trace_event_to_json(&event));
    }
}

fn trace_event_to_json(event: &TraceEvent) -> Value {
    match event {
        TraceEvent::EnterShape {
            shape,
            focus,
            depth,
        } => json!({
            "type": "EnterShape",
            "shape": term_to_string(shape),
            "focus": term_to_string(focus),
            "depth": depth,
        }),
        TraceEvent::CycleDetected { shape, node } => json!({
            "type": "CycleDetected",
            "shape": term_to_string(shape),
            "node": term_to_string(node),
        }),
        TraceEvent::DepthLimitReached { shape, node, depth } => json!({
            "type": "DepthLimitReached",
            "shape": term_to_string(shape),
            "node": term_to_string(node),
            "depth": depth,
        }),
        TraceEvent::ConstraintFailed {
            shape,
            component,
            focus,
            value,
        } => json!({
            "type": "ConstraintFailed",
            "shape": term_to_string(shape),
            "component": component.map(|kind| kind.local_name()),
            "focus": term_to_string(focus),
            "value": value.as_ref().map(term_to_string),
        }),
    }
}

/// Describes a node by its outgoing triples; blank nodes have no identity of their own.
fn describe(graph: &Graph, term: TermRef<'_>, depth: usize) -> String {
    let subject = match term {
        TermRef::BlankNode(node) => NamedOrBlankNodeRef::from(node),
        other => return other.to_string(),
    };
    if depth > 8 {
        return "[]".to_string();
    }
    let mut parts: Vec<String> = graph
        .triples_for_subject(subject)
        .map(|t| format!("{} {}", t.predicate, describe(graph, t.object, depth + 1)))
        .collect();
    parts.sort();
    format!("[{}]", parts.join(" ; "))
}

/// One key per validation result in `graph`, ignoring `sh:resultMessage`
/// and blank node labels.
pub fn result_fingerprints(graph: &Graph) -> BTreeSet<String> {
    let (sh, rdf) = (SHACL::new(), RDF::new());
    let mut keys = BTreeSet::new();
    for report in graph.subjects_for_predicate_object(rdf.type_, sh.validation_report) {
        for result in graph.objects_for_subject_predicate(report, sh.result) {
            let node = match result {
                TermRef::BlankNode(node) => NamedOrBlankNodeRef::from(node),
                TermRef::NamedNode(node) => NamedOrBlankNodeRef::from(node),
                _ => continue,
            };
            keys.insert(fingerprint(graph, node, &sh));
        }
    }
    keys
}

fn fingerprint(graph: &Graph, result: NamedOrBlankNodeRef<'_>, sh: &SHACL) -> String {
    let mut parts: Vec<String> = graph
        .triples_for_subject(result)
        .filter(|t| t.predicate != sh.result_message)
        .map(|t| format!("{}={}", t.predicate.as_str(), describe(graph, t.object, 0)))
        .collect();
    parts.sort();
    parts.join("|")
}

/// Results present in only one of the two reports.
pub struct ReportDiff {
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
}

impl ReportDiff {
    pub fn is_empty(&self) -> bool {
        self.only_left.is_empty() && self.only_right.is_empty()
    }
}

pub fn compare_reports(left: &Graph, right: &Graph) -> ReportDiff {
    let left = result_fingerprints(left);
    let right = result_fingerprints(right);
    ReportDiff {
        only_left: left.difference(&right).cloned().collect(),
        only_right: right.difference(&left).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::io::RdfParser;
    use shifty_ds::test_utils::store_from_turtle;
    use shifty_ds::{ValidationMode, Validator};

    fn parse_graph(turtle: &str) -> Result<Graph, Box<dyn Error>> {
        let mut graph = Graph::new();
        for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(turtle.as_bytes()) {
            let quad = quad?;
            graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
        }
        Ok(graph)
    }

    fn sample_report() -> Result<ValidationReport, Box<dyn Error>> {
        let shapes = store_from_turtle(
            r#"
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            @prefix ex: <http://example.org/> .
            ex:S a sh:NodeShape ; sh:targetNode ex:n ;
                sh:property [ sh:path ( ex:p [ sh:inversePath ex:q ] ) ; sh:minCount 1 ] .
            "#,
        )?;
        let data = store_from_turtle("<http://example.org/n> <http://example.org/r> 1 .")?;
        let validator = Validator::builder()
            .with_shapes_store(shapes)
            .with_data_store(data)
            .with_mode(ValidationMode::Classic)
            .build()?;
        Ok(validator.validate()?)
    }

    #[test]
    fn turtle_output_is_stable_and_comparable() -> Result<(), Box<dyn Error>> {
        let report = sample_report()?;
        let first = report_to_turtle(&report)?;
        let second = report_to_turtle(&sample_report()?)?;
        assert_eq!(first, second);
        assert!(first.contains("inversePath"));

        let diff = compare_reports(&parse_graph(&first)?, &parse_graph(&second)?);
        assert!(diff.is_empty());
        assert_eq!(result_fingerprints(&parse_graph(&first)?).len(), 1);
        Ok(())
    }

    #[test]
    fn messages_are_ignored_but_values_are_not() -> Result<(), Box<dyn Error>> {
        let left = parse_graph(
            r#"
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            [] a sh:ValidationReport ; sh:conforms false ;
               sh:result [ a sh:ValidationResult ; sh:focusNode <http://example.org/n> ;
                           sh:resultMessage "one wording" ; sh:sourceShape [] ] .
            "#,
        )?;
        let reworded = parse_graph(
            r#"
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            [] a sh:ValidationReport ; sh:conforms false ;
               sh:result [ a sh:ValidationResult ; sh:focusNode <http://example.org/n> ;
                           sh:resultMessage "another" ; sh:sourceShape [] ] .
            "#,
        )?;
        let other_focus = parse_graph(
            r#"
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            [] a sh:ValidationReport ; sh:conforms false ;
               sh:result [ a sh:ValidationResult ; sh:focusNode <http://example.org/m> ;
                           sh:sourceShape [] ] .
            "#,
        )?;
        assert!(compare_reports(&left, &reworded).is_empty());
        let diff = compare_reports(&left, &other_focus);
        assert_eq!(diff.only_left.len(), 1);
        assert_eq!(diff.only_right.len(), 1);
        Ok(())
    }

    #[test]
    fn json_output_lists_results() -> Result<(), Box<dyn Error>> {
        let json: Value = serde_json::from_str(&report_to_json(&sample_report()?)?)?;
        assert_eq!(json["conforms"], Value::Bool(false));
        let results = json["results"].as_array().map(Vec::len);
        assert_eq!(results, Some(1));
        assert_eq!(
            json["results"][0]["sourceConstraintComponent"],
            Value::String("http://www.w3.org/ns/shacl#MinCountConstraintComponent".to_string())
        );
        Ok(())
    }
}
