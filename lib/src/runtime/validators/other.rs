use crate::error::BackendError;
use crate::model::ConstraintKind;
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext};
use crate::types::Path;
use oxigraph::model::{NamedNode, Term};

/// One result per triple of a value node whose predicate is not allowed.
pub(crate) fn closed(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    allowed: &[NamedNode],
) -> Result<Vec<ValidationResult>, BackendError> {
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        for triple in ev.view().triples_for_subject(vn)? {
            if allowed.contains(&triple.predicate) {
                continue;
            }
            let message = format!(
                "Predicate {} is not allowed on closed shape {}",
                triple.predicate, ctx.shape.term
            );
            results.push(
                ev.failure(ctx, ConstraintKind::Closed, Some(triple.object), message)
                    .with_path(Some(Path::Simple(triple.predicate))),
            );
        }
    }
    Ok(results)
}

pub(crate) fn has_value(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    value: &Term,
) -> Vec<ValidationResult> {
    if ctx.value_nodes.contains(value) {
        return Vec::new();
    }
    vec![ev.failure(
        ctx,
        ConstraintKind::HasValue,
        None,
        format!("Missing expected value {}", value),
    )]
}

pub(crate) fn in_list(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    values: &[Term],
) -> Vec<ValidationResult> {
    ctx.value_nodes
        .iter()
        .filter(|vn| !values.contains(vn))
        .map(|vn| {
            ev.failure(
                ctx,
                ConstraintKind::In,
                Some(vn.clone()),
                format!("Value {} is not in the allowed list", vn),
            )
        })
        .collect()
}
