//! Property path resolution against one graph scope.

use crate::backend::{term_from_subject, GraphView};
use crate::error::BackendError;
use crate::types::{dedup, Path};
use oxigraph::model::Term;
use std::collections::HashSet;

/// Value nodes reached from `focus` through `path`, without duplicates and in
/// discovery order.
pub(crate) fn resolve_path(
    view: &GraphView<'_>,
    focus: &Term,
    path: &Path,
) -> Result<Vec<Term>, BackendError> {
    step(view, vec![focus.clone()], path, false)
}

/// Applies `path` to every node of `nodes`. With `inverse` set the path is
/// walked backwards, which is how `sh:inversePath` over complex paths works.
fn step(
    view: &GraphView<'_>,
    nodes: Vec<Term>,
    path: &Path,
    inverse: bool,
) -> Result<Vec<Term>, BackendError> {
    match path {
        Path::Simple(predicate) => {
            let mut reached = Vec::new();
            for node in &nodes {
                if inverse {
                    reached.extend(
                        view.triples(None, Some(predicate.as_ref()), Some(node))?
                            .into_iter()
                            .map(|t| term_from_subject(t.subject)),
                    );
                } else {
                    reached.extend(view.objects(node, predicate.as_ref())?);
                }
            }
            Ok(dedup(reached))
        }
        Path::Inverse(inner) => step(view, nodes, inner, !inverse),
        Path::Sequence(segments) => {
            let mut current = nodes;
            let ordered: Box<dyn Iterator<Item = &Path>> = if inverse {
                Box::new(segments.iter().rev())
            } else {
                Box::new(segments.iter())
            };
            for segment in ordered {
                if current.is_empty() {
                    break;
                }
                current = step(view, current, segment, inverse)?;
            }
            Ok(current)
        }
        Path::Alternative(branches) => {
            let mut reached = Vec::new();
            for branch in branches {
                reached.extend(step(view, nodes.clone(), branch, inverse)?);
            }
            Ok(dedup(reached))
        }
        Path::ZeroOrMore(inner) => {
            let mut reached = nodes.clone();
            reached.extend(closure(view, nodes, inner, inverse)?);
            Ok(dedup(reached))
        }
        Path::OneOrMore(inner) => closure(view, nodes, inner, inverse),
        Path::ZeroOrOne(inner) => {
            let mut reached = nodes.clone();
            reached.extend(step(view, nodes, inner, inverse)?);
            Ok(dedup(reached))
        }
    }
}

/// Nodes reachable in one or more applications of `inner`. Terminates because
/// a node is only expanded the first time it is reached.
fn closure(
    view: &GraphView<'_>,
    start: Vec<Term>,
    inner: &Path,
    inverse: bool,
) -> Result<Vec<Term>, BackendError> {
    let mut seen: HashSet<Term> = HashSet::new();
    let mut reached = Vec::new();
    let mut frontier = start;
    while !frontier.is_empty() {
        let next = step(view, frontier, inner, inverse)?;
        frontier = Vec::new();
        for node in next {
            if seen.insert(node.clone()) {
                reached.push(node.clone());
                frontier.push(node);
            }
        }
    }
    Ok(reached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GraphScope;
    use crate::test_utils::store_from_trig;
    use oxigraph::model::NamedNode;
    use oxigraph::store::Store;

    const DATA: &str = r#"
        @prefix ex: <http://example.org/> .
        ex:a ex:next ex:b .
        ex:b ex:next ex:c .
        ex:c ex:next ex:a .
        ex:a ex:name "a" .
        ex:b ex:label "b" .
        ex:g { ex:a ex:next ex:z . }
    "#;

    fn ex(local: &str) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(format!("http://example.org/{local}")))
    }

    fn p(local: &str) -> Path {
        Path::Simple(NamedNode::new_unchecked(format!("http://example.org/{local}")))
    }

    fn store() -> Store {
        store_from_trig(DATA).expect("test data parses")
    }

    #[test]
    fn predicate_and_inverse() -> Result<(), BackendError> {
        let store = store();
        let view = GraphView::new(&store, GraphScope::Default);
        assert_eq!(resolve_path(&view, &ex("a"), &p("next"))?, vec![ex("b")]);
        assert_eq!(
            resolve_path(&view, &ex("a"), &Path::Inverse(Box::new(p("next"))))?,
            vec![ex("c")]
        );
        Ok(())
    }

    #[test]
    fn sequence_and_inverse_sequence() -> Result<(), BackendError> {
        let store = store();
        let view = GraphView::new(&store, GraphScope::Default);
        let two_hops = Path::Sequence(vec![p("next"), p("next")]);
        assert_eq!(resolve_path(&view, &ex("a"), &two_hops)?, vec![ex("c")]);
        let back = Path::Inverse(Box::new(Path::Sequence(vec![p("next"), p("label")])));
        let lit = Term::Literal(oxigraph::model::Literal::new_simple_literal("b"));
        assert_eq!(resolve_path(&view, &lit, &back)?, vec![ex("a")]);
        Ok(())
    }

    #[test]
    fn alternative_is_a_union() -> Result<(), BackendError> {
        let store = store();
        let view = GraphView::new(&store, GraphScope::Default);
        let alt = Path::Alternative(vec![p("next"), p("name")]);
        assert_eq!(resolve_path(&view, &ex("a"), &alt)?.len(), 2);
        Ok(())
    }

    #[test]
    fn closures_terminate_on_cycles() -> Result<(), BackendError> {
        let store = store();
        let view = GraphView::new(&store, GraphScope::Default);
        let star = resolve_path(&view, &ex("a"), &Path::ZeroOrMore(Box::new(p("next"))))?;
        assert_eq!(star, vec![ex("a"), ex("b"), ex("c")]);
        let plus = resolve_path(&view, &ex("a"), &Path::OneOrMore(Box::new(p("next"))))?;
        assert_eq!(plus, vec![ex("b"), ex("c"), ex("a")]);
        let opt = resolve_path(&view, &ex("b"), &Path::ZeroOrOne(Box::new(p("next"))))?;
        assert_eq!(opt, vec![ex("b"), ex("c")]);
        Ok(())
    }

    #[test]
    fn resolution_is_scoped() -> Result<(), BackendError> {
        let store = store();
        let view = GraphView::new(
            &store,
            GraphScope::Named(NamedNode::new_unchecked("http://example.org/g")),
        );
        assert_eq!(resolve_path(&view, &ex("a"), &p("next"))?, vec![ex("z")]);
        assert!(resolve_path(&view, &ex("b"), &p("next"))?.is_empty());
        Ok(())
    }
}
