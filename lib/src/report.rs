//! Validation results and the report they are collected into.

use crate::model::ConstraintKind;
use crate::types::{Path, Severity};
use oxigraph::model::{NamedNode, Term};
use std::collections::BTreeSet;

/// One entry of a validation report. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationResult {
    focus_node: Term,
    result_path: Option<Path>,
    value: Option<Term>,
    source_shape: Term,
    /// `None` for evaluation anomalies that did not come from a constraint.
    source_constraint_component: Option<ConstraintKind>,
    source_constraint: Option<Term>,
    severity: Severity,
    message: String,
    data_graph: Option<NamedNode>,
}

impl ValidationResult {
    pub(crate) fn new(
        focus_node: Term,
        source_shape: Term,
        component: Option<ConstraintKind>,
        severity: Severity,
        message: String,
    ) -> Self {
        Self {
            focus_node,
            result_path: None,
            value: None,
            source_shape,
            source_constraint_component: component,
            source_constraint: None,
            severity,
            message,
            data_graph: None,
        }
    }

    pub(crate) fn with_path(mut self, path: Option<Path>) -> Self {
        self.result_path = path;
        self
    }

    pub(crate) fn with_value(mut self, value: Option<Term>) -> Self {
        self.value = value;
        self
    }

    pub(crate) fn with_source_constraint(mut self, node: Term) -> Self {
        self.source_constraint = Some(node);
        self
    }

    pub(crate) fn in_graph(mut self, graph: Option<NamedNode>) -> Self {
        self.data_graph = graph;
        self
    }

    pub fn focus_node(&self) -> &Term {
        &self.focus_node
    }

    pub fn result_path(&self) -> Option<&Path> {
        self.result_path.as_ref()
    }

    pub fn value(&self) -> Option<&Term> {
        self.value.as_ref()
    }

    pub fn source_shape(&self) -> &Term {
        &self.source_shape
    }

    pub fn source_constraint_component(&self) -> Option<ConstraintKind> {
        self.source_constraint_component
    }

    pub fn source_constraint(&self) -> Option<&Term> {
        self.source_constraint.as_ref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for results that record an evaluation failure rather than a
    /// constraint violation.
    pub fn is_anomaly(&self) -> bool {
        self.source_constraint_component.is_none()
    }

    /// Data graph the focus node was validated in (dataset mode only).
    pub fn data_graph(&self) -> Option<&NamedNode> {
        self.data_graph.as_ref()
    }

    /// Comparison key that ignores the message and blank node labels.
    pub fn fingerprint(&self) -> String {
        fn term_key(term: &Term) -> String {
            match term {
                Term::BlankNode(_) => "[]".to_string(),
                other => other.to_string(),
            }
        }
        let mut parts = vec![
            format!("focusNode={}", term_key(&self.focus_node)),
            format!("severity={}", self.severity),
            format!("sourceShape={}", term_key(&self.source_shape)),
        ];
        if let Some(path) = &self.result_path {
            parts.push(format!("resultPath={}", path));
        }
        if let Some(value) = &self.value {
            parts.push(format!("value={}", term_key(value)));
        }
        if let Some(kind) = self.source_constraint_component {
            parts.push(format!("sourceConstraintComponent={}", kind.local_name()));
        }
        if let Some(node) = &self.source_constraint {
            parts.push(format!("sourceConstraint={}", term_key(node)));
        }
        if let Some(graph) = &self.data_graph {
            parts.push(format!("dataGraph={}", graph));
        }
        parts.sort();
        parts.join("|")
    }
}

/// Final outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    conforms: bool,
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// True iff no result has severity `Violation`.
    pub fn conforms(&self) -> bool {
        self.conforms
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn violation_count(&self) -> usize {
        self.count(Severity::Violation)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.results
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }

    pub fn fingerprints(&self) -> BTreeSet<String> {
        self.results.iter().map(ValidationResult::fingerprint).collect()
    }

    /// Same results, ignoring order, messages and blank node identity.
    /// Conformance follows from the results, so it is not compared separately.
    pub fn is_equivalent(&self, other: &ValidationReport) -> bool {
        self.fingerprints() == other.fingerprints()
    }
}

/// Collects results in production order and freezes them into a [`ValidationReport`].
pub struct ValidationReportBuilder {
    results: Vec<ValidationResult>,
    min_severity: Severity,
}

impl ValidationReportBuilder {
    pub fn new(min_severity: Severity) -> Self {
        ValidationReportBuilder {
            results: Vec::new(),
            min_severity,
        }
    }

    pub fn add_result(&mut self, result: ValidationResult) {
        if result.severity >= self.min_severity {
            self.results.push(result);
        }
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = ValidationResult>) {
        for result in results {
            self.add_result(result);
        }
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn build(self) -> ValidationReport {
        let conforms = !self
            .results
            .iter()
            .any(|r| r.severity == Severity::Violation);
        ValidationReport {
            conforms,
            results: self.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::BlankNode;

    fn result(severity: Severity, message: &str) -> ValidationResult {
        ValidationResult::new(
            Term::NamedNode(NamedNode::new_unchecked("http://example.org/n")),
            Term::BlankNode(BlankNode::default()),
            Some(ConstraintKind::MinCount),
            severity,
            message.to_string(),
        )
    }

    #[test]
    fn warnings_do_not_break_conformance() {
        let mut builder = ValidationReportBuilder::new(Severity::Info);
        builder.add_result(result(Severity::Warning, "w"));
        builder.add_result(result(Severity::Info, "i"));
        let report = builder.build();
        assert!(report.conforms());
        assert_eq!(report.results().len(), 2);
    }

    #[test]
    fn severity_filter_drops_lower_results() {
        let mut builder = ValidationReportBuilder::new(Severity::Violation);
        builder.extend(vec![
            result(Severity::Warning, "w"),
            result(Severity::Violation, "v"),
        ]);
        let report = builder.build();
        assert!(!report.conforms());
        assert_eq!(report.results().len(), 1);
        assert_eq!(report.violation_count(), 1);
    }

    #[test]
    fn fingerprint_ignores_message_and_blank_labels() {
        let a = result(Severity::Violation, "first wording");
        let b = result(Severity::Violation, "second wording");
        assert_ne!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert!(a.fingerprint().contains("sourceShape=[]"));
    }

    #[test]
    fn fingerprint_separates_data_graphs() {
        let graph =
            |local: &str| Some(NamedNode::new_unchecked(format!("http://example.org/{local}")));
        let in_g1 = result(Severity::Violation, "v").in_graph(graph("g1"));
        let in_g2 = result(Severity::Violation, "v").in_graph(graph("g2"));
        assert_ne!(in_g1.fingerprint(), in_g2.fingerprint());
        assert!(in_g1.fingerprint().contains("dataGraph=<http://example.org/g1>"));

        let report = |r: ValidationResult| {
            let mut builder = ValidationReportBuilder::new(Severity::Info);
            builder.add_result(r);
            builder.build()
        };
        assert!(!report(in_g1.clone()).is_equivalent(&report(in_g2)));
        assert!(report(in_g1.clone()).is_equivalent(&report(in_g1)));
    }

    #[test]
    fn fingerprint_separates_sparql_constraints() {
        let constraint = |local: &str| {
            Term::NamedNode(NamedNode::new_unchecked(format!("http://example.org/{local}")))
        };
        let a = result(Severity::Violation, "v").with_source_constraint(constraint("c1"));
        let b = result(Severity::Violation, "v").with_source_constraint(constraint("c2"));
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
