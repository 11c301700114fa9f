use super::comparison::compare_terms;
use crate::model::ConstraintKind;
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext};
use oxigraph::model::Term;
use std::cmp::Ordering;

/// `sh:minExclusive`, `sh:minInclusive`, `sh:maxExclusive` and `sh:maxInclusive`.
/// Values that cannot be compared with the bound fail.
pub(crate) fn range(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    kind: ConstraintKind,
    bound: &Term,
) -> Vec<ValidationResult> {
    let relation = match kind {
        ConstraintKind::MinExclusive => "greater than",
        ConstraintKind::MinInclusive => "greater than or equal to",
        ConstraintKind::MaxExclusive => "less than",
        _ => "less than or equal to",
    };
    let accepts = |ordering: Ordering| match kind {
        ConstraintKind::MinExclusive => ordering == Ordering::Greater,
        ConstraintKind::MinInclusive => ordering != Ordering::Less,
        ConstraintKind::MaxExclusive => ordering == Ordering::Less,
        _ => ordering != Ordering::Greater,
    };
    ctx.value_nodes
        .iter()
        .filter(|vn| !compare_terms(vn, bound).is_some_and(accepts))
        .map(|vn| {
            ev.failure(
                ctx,
                kind,
                Some(vn.clone()),
                format!("Value {} is not {} {}", vn, relation, bound),
            )
        })
        .collect()
}
