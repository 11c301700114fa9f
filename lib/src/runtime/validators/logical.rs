use crate::model::ConstraintKind;
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext, VisitedStack};
use crate::types::{Severity, ShapeID};
use oxigraph::model::Term;

fn shape_list(ev: &Evaluator<'_>, shapes: &[ShapeID]) -> String {
    shapes
        .iter()
        .filter_map(|id| ev.model().shape_term(*id))
        .map(Term::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn not(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    shape: ShapeID,
    visited: &mut VisitedStack,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        if ev.nested_conforms(shape, vn, visited, &mut results) {
            results.push(ev.failure(
                ctx,
                ConstraintKind::Not,
                Some(vn.clone()),
                format!(
                    "Value {} conforms to {}, which sh:not forbids",
                    vn,
                    shape_list(ev, &[shape])
                ),
            ));
        }
    }
    results
}

/// Reports the children's own results when any child fails.
pub(crate) fn and(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    shapes: &[ShapeID],
    visited: &mut VisitedStack,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        let mut child_results = Vec::new();
        for shape in shapes {
            child_results.extend(ev.nested(*shape, vn, visited));
        }
        if child_results
            .iter()
            .any(|r| r.severity() == Severity::Violation)
        {
            results.extend(child_results);
        }
    }
    results
}

/// Stops at the first conforming child. One result per failing value node.
pub(crate) fn or(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    shapes: &[ShapeID],
    visited: &mut VisitedStack,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        let mut anomalies = Vec::new();
        let any = shapes
            .iter()
            .any(|shape| ev.nested_conforms(*shape, vn, visited, &mut anomalies));
        results.extend(anomalies);
        if !any {
            results.push(ev.failure(
                ctx,
                ConstraintKind::Or,
                Some(vn.clone()),
                format!(
                    "Value {} does not conform to any of {}",
                    vn,
                    shape_list(ev, shapes)
                ),
            ));
        }
    }
    results
}

/// Stops as soon as a second child conforms.
pub(crate) fn xone(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    shapes: &[ShapeID],
    visited: &mut VisitedStack,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        let mut conforming = 0usize;
        for shape in shapes {
            if ev.nested_conforms(*shape, vn, visited, &mut results) {
                conforming += 1;
                if conforming > 1 {
                    break;
                }
            }
        }
        if conforming != 1 {
            results.push(ev.failure(
                ctx,
                ConstraintKind::Xone,
                Some(vn.clone()),
                format!(
                    "Value {} conforms to {} of {}, expected exactly one",
                    vn,
                    if conforming == 0 { "none" } else { "more than one" },
                    shape_list(ev, shapes)
                ),
            ));
        }
    }
    results
}
