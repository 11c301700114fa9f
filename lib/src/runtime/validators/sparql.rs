use crate::model::{ConstraintKind, SparqlConstraint};
use crate::report::ValidationResult;
use crate::runtime::{Evaluator, FocusContext};
use crate::sparql::SparqlRequest;
use crate::types::Path;
use oxigraph::model::Term;

/// Fills `{$var}` / `{?var}` placeholders of an `sh:message` template.
fn fill_template(template: &str, bindings: &[(&str, Option<&Term>)]) -> String {
    let mut message = template.to_string();
    for (name, value) in bindings {
        let Some(value) = value else { continue };
        let rendered = match value {
            Term::Literal(lit) => lit.value().to_string(),
            other => other.to_string(),
        };
        for sigil in ['$', '?'] {
            message = message.replace(&format!("{{{}{}}}", sigil, name), &rendered);
        }
    }
    message
}

/// Hands the query to the configured delegate; every returned binding is one
/// violation. Delegate failures become a single anomaly result.
pub(crate) fn evaluate(
    ev: &Evaluator<'_>,
    ctx: &FocusContext<'_>,
    constraint: &SparqlConstraint,
) -> Vec<ValidationResult> {
    if constraint.deactivated {
        return Vec::new();
    }
    let request = SparqlRequest {
        query: &constraint.select,
        focus_node: ctx.focus,
        value_nodes: ctx.value_nodes,
        path: ctx.shape.path.as_ref(),
        scope: ev.view().scope(),
    };
    let outcome = match ev.sparql().evaluate(&request) {
        Ok(outcome) => outcome,
        Err(e) => {
            return vec![ev
                .anomaly(ctx.shape, ctx.focus, format!("sh:sparql constraint failed: {}", e))
                .with_source_constraint(constraint.node.clone())]
        }
    };
    if outcome.conforms && outcome.bindings.is_empty() {
        return Vec::new();
    }

    let mut results = Vec::new();
    for binding in &outcome.bindings {
        // node shapes report the focus node as the value when none is bound
        let value = binding.value.clone().or_else(|| {
            ctx.shape
                .path
                .is_none()
                .then(|| ctx.focus.clone())
        });
        let generated = binding
            .message
            .clone()
            .or_else(|| {
                constraint.message.as_deref().map(|template| {
                    fill_template(
                        template,
                        &[("this", Some(ctx.focus)), ("value", value.as_ref())],
                    )
                })
            })
            .unwrap_or_else(|| {
                format!("Focus node {} violates a SPARQL constraint", ctx.focus)
            });
        let mut result = ev
            .failure(ctx, ConstraintKind::Sparql, value, generated)
            .with_source_constraint(constraint.node.clone());
        if let Some(Term::NamedNode(predicate)) = &binding.path {
            result = result.with_path(Some(Path::Simple(predicate.clone())));
        }
        results.push(result);
    }
    if results.is_empty() {
        // the delegate reported failure without any binding
        results.push(
            ev.failure(
                ctx,
                ConstraintKind::Sparql,
                None,
                format!("Focus node {} violates a SPARQL constraint", ctx.focus),
            )
            .with_source_constraint(constraint.node.clone()),
        );
    }
    results
}

#[cfg(test)]
mod tests {
    use super::fill_template;
    use oxigraph::model::{Literal, NamedNode, Term};

    #[test]
    fn template_placeholders() {
        let this = Term::NamedNode(NamedNode::new_unchecked("http://example.org/a"));
        let value = Term::Literal(Literal::new_simple_literal("x"));
        assert_eq!(
            fill_template(
                "{$this} has {?value}",
                &[("this", Some(&this)), ("value", Some(&value))]
            ),
            "<http://example.org/a> has x"
        );
    }
}
