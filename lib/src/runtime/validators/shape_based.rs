use crate::model::ConstraintKind;
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext, VisitedStack};
use crate::types::ShapeID;

pub(crate) fn node(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    shape: ShapeID,
    visited: &mut VisitedStack,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        if !ev.nested_conforms(shape, vn, visited, &mut results) {
            let target = ev
                .model()
                .shape_term(shape)
                .map(|t| t.to_string())
                .unwrap_or_default();
            results.push(ev.failure(
                ctx,
                ConstraintKind::Node,
                Some(vn.clone()),
                format!("Value {} does not conform to shape {}", vn, target),
            ));
        }
    }
    results
}

/// Each value node becomes the focus node of the property shape, whose
/// results are reported as they are.
pub(crate) fn property(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    shape: ShapeID,
    visited: &mut VisitedStack,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    for vn in ctx.value_nodes {
        results.extend(ev.nested(shape, vn, visited));
    }
    results
}

pub(crate) struct Qualified<'c> {
    pub(crate) shape: ShapeID,
    pub(crate) min_count: Option<u64>,
    pub(crate) max_count: Option<u64>,
    pub(crate) disjoint: bool,
    pub(crate) earlier_siblings: &'c [ShapeID],
}

/// Counts value nodes conforming to the qualified shape. With disjointness,
/// a value that conforms to an earlier sibling's qualified shape is claimed
/// by that sibling and not counted here.
pub(crate) fn qualified(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    q: Qualified<'_>,
    visited: &mut VisitedStack,
) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    let mut count = 0u64;
    for vn in ctx.value_nodes {
        if !ev.nested_conforms(q.shape, vn, visited, &mut results) {
            continue;
        }
        let claimed = q.disjoint
            && q
                .earlier_siblings
                .iter()
                .any(|sibling| ev.nested_conforms(*sibling, vn, visited, &mut results));
        if !claimed {
            count += 1;
        }
    }

    if let Some(min) = q.min_count {
        if count < min {
            results.push(ev.failure(
                ctx,
                ConstraintKind::QualifiedMinCount,
                None,
                format!(
                    "Qualified value count ({}) does not meet minimum requirement: {}",
                    count, min
                ),
            ));
        }
    }
    if let Some(max) = q.max_count {
        if count > max {
            results.push(ev.failure(
                ctx,
                ConstraintKind::QualifiedMaxCount,
                None,
                format!(
                    "Qualified value count ({}) exceeds maximum requirement: {}",
                    count, max
                ),
            ));
        }
    }
    results
}
