use crate::model::ConstraintKind;
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext};

// Value nodes are already distinct, so the slice length is the count.

pub(crate) fn min_count(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    min: u64,
) -> Vec<ValidationResult> {
    let count = ctx.value_nodes.len() as u64;
    if count >= min {
        return Vec::new();
    }
    vec![ev.failure(
        ctx,
        ConstraintKind::MinCount,
        None,
        format!(
            "Value count ({}) does not meet minimum requirement: {}",
            count, min
        ),
    )]
}

pub(crate) fn max_count(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    max: u64,
) -> Vec<ValidationResult> {
    let count = ctx.value_nodes.len() as u64;
    if count <= max {
        return Vec::new();
    }
    vec![ev.failure(
        ctx,
        ConstraintKind::MaxCount,
        None,
        format!("Value count ({}) exceeds maximum requirement: {}", count, max),
    )]
}
