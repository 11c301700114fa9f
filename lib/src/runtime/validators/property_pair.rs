use super::comparison::compare_terms;
use crate::error::BackendError;
use crate::model::ConstraintKind;
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext};
use oxigraph::model::{NamedNode, Term};
use std::cmp::Ordering;

/// `sh:equals`, `sh:disjoint`, `sh:lessThan` and `sh:lessThanOrEquals`, which
/// relate the value nodes to the objects of `property` on the focus node.
pub(crate) fn compare(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    kind: ConstraintKind,
    property: &NamedNode,
) -> Result<Vec<ValidationResult>, BackendError> {
    let others = ev.view().objects(ctx.focus, property.as_ref())?;
    let fail = |value: &Term, message: String| {
        ev.failure(ctx, kind, Some(value.clone()), message)
    };

    let results = match kind {
        ConstraintKind::Equals => {
            let missing_from_property = ctx
                .value_nodes
                .iter()
                .filter(|vn| !others.contains(vn))
                .map(|vn| fail(vn, format!("Value {} is not a value of {}", vn, property)));
            let missing_from_values = others
                .iter()
                .filter(|o| !ctx.value_nodes.contains(o))
                .map(|o| {
                    fail(
                        o,
                        format!("Value {} of {} is not among the value nodes", o, property),
                    )
                });
            missing_from_property.chain(missing_from_values).collect()
        }
        ConstraintKind::Disjoint => ctx
            .value_nodes
            .iter()
            .filter(|vn| others.contains(vn))
            .map(|vn| fail(vn, format!("Value {} is also a value of {}", vn, property)))
            .collect(),
        _ => {
            let strict = kind == ConstraintKind::LessThan;
            let mut results = Vec::new();
            for vn in ctx.value_nodes {
                for other in &others {
                    let ok = match compare_terms(vn, other) {
                        Some(Ordering::Less) => true,
                        Some(Ordering::Equal) => !strict,
                        _ => false,
                    };
                    if !ok {
                        let relation = if strict { "less than" } else { "less than or equal to" };
                        results.push(fail(
                            vn,
                            format!("Value {} is not {} {} ({})", vn, relation, other, property),
                        ));
                    }
                }
            }
            results
        }
    };
    Ok(results)
}
