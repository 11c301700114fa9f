//! Read-only graph access.
//!
//! Everything the parser and the evaluator know about RDF data goes through
//! [`GraphBackend`]. A [`GraphView`] pins a backend to one [`GraphScope`] so that
//! pattern lookups made while validating a named graph never see triples from
//! another graph.

use crate::error::BackendError;
use oxigraph::model::{
    GraphNameRef, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Term, TermRef,
    Triple,
};
use oxigraph::store::Store;
use std::collections::HashSet;
use std::fmt;

/// How far blank node descriptions recurse when ordering terms.
const MAX_DESCRIBE_DEPTH: usize = 4;

/// Which graph(s) of a dataset a lookup is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphScope {
    /// The unnamed default graph.
    Default,
    Named(NamedNode),
    /// Every graph of the dataset merged into one, with duplicate triples removed.
    Union,
}

impl GraphScope {
    pub fn graph_name(&self) -> Option<&NamedNode> {
        match self {
            GraphScope::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for GraphScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphScope::Default => write!(f, "default graph"),
            GraphScope::Named(name) => write!(f, "{}", name),
            GraphScope::Union => write!(f, "union graph"),
        }
    }
}

/// Minimal read interface over a graph or dataset.
///
/// Implementations must answer every combination of bound and unbound
/// positions, and must be safe to query from several threads at once.
pub trait GraphBackend: Send + Sync {
    /// Triples in `scope` matching the pattern; `None` is a wildcard.
    fn triples_matching(
        &self,
        scope: &GraphScope,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Triple>, BackendError>;

    /// Names of all non-default graphs, sorted lexicographically.
    fn graph_names(&self) -> Result<Vec<NamedNode>, BackendError>;
}

impl GraphBackend for Store {
    fn triples_matching(
        &self,
        scope: &GraphScope,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Triple>, BackendError> {
        let graph = match scope {
            GraphScope::Default => Some(GraphNameRef::DefaultGraph),
            GraphScope::Named(name) => Some(GraphNameRef::NamedNode(name.as_ref())),
            GraphScope::Union => None,
        };
        let mut triples = Vec::new();
        let mut seen = HashSet::new();
        for quad in self.quads_for_pattern(subject, predicate, object, graph) {
            let quad = quad?;
            let triple = Triple::new(quad.subject, quad.predicate, quad.object);
            if graph.is_some() || seen.insert(triple.clone()) {
                triples.push(triple);
            }
        }
        Ok(triples)
    }

    fn graph_names(&self) -> Result<Vec<NamedNode>, BackendError> {
        let mut names = Vec::new();
        for name in self.named_graphs() {
            match name? {
                NamedOrBlankNode::NamedNode(node) => names.push(node),
                NamedOrBlankNode::BlankNode(node) => {
                    log::warn!("Ignoring graph named by blank node {}", node);
                }
            }
        }
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(names)
    }
}

/// Converts a term to a subject reference; literals have no subject form.
pub(crate) fn subject_ref(term: &Term) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        Term::NamedNode(node) => Some(NamedOrBlankNodeRef::NamedNode(node.as_ref())),
        Term::BlankNode(node) => Some(NamedOrBlankNodeRef::BlankNode(node.as_ref())),
        _ => None,
    }
}

pub(crate) fn term_from_subject(subject: NamedOrBlankNode) -> Term {
    match subject {
        NamedOrBlankNode::NamedNode(node) => Term::NamedNode(node),
        NamedOrBlankNode::BlankNode(node) => Term::BlankNode(node),
    }
}

/// A backend bound to a single graph scope.
#[derive(Clone)]
pub struct GraphView<'a> {
    backend: &'a dyn GraphBackend,
    scope: GraphScope,
}

impl<'a> GraphView<'a> {
    pub fn new(backend: &'a dyn GraphBackend, scope: GraphScope) -> Self {
        Self { backend, scope }
    }

    pub fn scope(&self) -> &GraphScope {
        &self.scope
    }

    pub fn backend(&self) -> &'a dyn GraphBackend {
        self.backend
    }

    pub fn triples(
        &self,
        subject: Option<&Term>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<&Term>,
    ) -> Result<Vec<Triple>, BackendError> {
        let subject = match subject {
            Some(term) => match subject_ref(term) {
                Some(s) => Some(s),
                // a literal never appears in subject position
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        self.backend.triples_matching(
            &self.scope,
            subject,
            predicate,
            object.map(|o| o.as_ref()),
        )
    }

    /// Objects of `subject predicate ?o`, in backend order.
    pub fn objects(
        &self,
        subject: &Term,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Vec<Term>, BackendError> {
        Ok(self
            .triples(Some(subject), Some(predicate), None)?
            .into_iter()
            .map(|t| t.object)
            .collect())
    }

    pub fn object(
        &self,
        subject: &Term,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Option<Term>, BackendError> {
        Ok(self.objects(subject, predicate)?.into_iter().next())
    }

    /// Subjects of `?s predicate object`.
    pub fn subjects(
        &self,
        predicate: NamedNodeRef<'_>,
        object: &Term,
    ) -> Result<Vec<Term>, BackendError> {
        Ok(self
            .triples(None, Some(predicate), Some(object))?
            .into_iter()
            .map(|t| term_from_subject(t.subject))
            .collect())
    }

    pub fn has_triple(
        &self,
        subject: &Term,
        predicate: NamedNodeRef<'_>,
        object: &Term,
    ) -> Result<bool, BackendError> {
        Ok(!self
            .triples(Some(subject), Some(predicate), Some(object))?
            .is_empty())
    }

    pub fn triples_for_subject(&self, subject: &Term) -> Result<Vec<Triple>, BackendError> {
        self.triples(Some(subject), None, None)
    }

    pub fn is_described(&self, subject: &Term) -> Result<bool, BackendError> {
        Ok(!self.triples_for_subject(subject)?.is_empty())
    }

    /// Ordering key for `term` that does not depend on blank node labels.
    ///
    /// Parsers pick blank node labels at random, so a blank node is keyed by
    /// the triples it is the subject of, recursively up to a fixed depth.
    pub fn sort_key(&self, term: &Term) -> Result<String, BackendError> {
        self.describe(term, 0)
    }

    fn describe(&self, term: &Term, depth: usize) -> Result<String, BackendError> {
        match term {
            Term::BlankNode(_) if depth < MAX_DESCRIBE_DEPTH => {
                let mut parts = Vec::new();
                for triple in self.triples_for_subject(term)? {
                    let object = self.describe(&triple.object, depth + 1)?;
                    parts.push(format!("{} {}", triple.predicate, object));
                }
                parts.sort();
                Ok(format!("[{}]", parts.join(" ; ")))
            }
            Term::BlankNode(_) => Ok("[]".to_string()),
            other => Ok(other.to_string()),
        }
    }

    /// Sorts `terms` by [`sort_key`](Self::sort_key). Reloading the same
    /// document always yields the same order.
    pub fn sort_terms(&self, terms: Vec<Term>) -> Result<Vec<Term>, BackendError> {
        let mut keyed = terms
            .into_iter()
            .map(|term| Ok((self.sort_key(&term)?, term)))
            .collect::<Result<Vec<_>, BackendError>>()?;
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(keyed.into_iter().map(|(_, term)| term).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::store_from_trig;

    const DATA: &str = r#"
        @prefix ex: <http://example.org/> .
        ex:a ex:p ex:b .
        ex:g1 { ex:a ex:p ex:c . ex:a ex:p ex:b . }
        ex:g2 { ex:x ex:q "lit" . }
    "#;

    fn ex(local: &str) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(format!("http://example.org/{local}")))
    }

    #[test]
    fn named_scope_does_not_leak() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = store_from_trig(DATA)?;
        let view = GraphView::new(
            &store,
            GraphScope::Named(NamedNode::new_unchecked("http://example.org/g2")),
        );
        let p = NamedNode::new_unchecked("http://example.org/p");
        assert!(view.objects(&ex("a"), p.as_ref())?.is_empty());
        Ok(())
    }

    #[test]
    fn union_scope_deduplicates() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = store_from_trig(DATA)?;
        let view = GraphView::new(&store, GraphScope::Union);
        let p = NamedNode::new_unchecked("http://example.org/p");
        let objects = view.objects(&ex("a"), p.as_ref())?;
        assert_eq!(objects.len(), 2, "ex:b appears in two graphs but counts once");
        Ok(())
    }

    #[test]
    fn graph_names_are_sorted() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = store_from_trig(DATA)?;
        let names: Vec<String> = store
            .graph_names()?
            .into_iter()
            .map(|n| n.into_string())
            .collect();
        assert_eq!(names, vec!["http://example.org/g1", "http://example.org/g2"]);
        Ok(())
    }

    #[test]
    fn literal_subject_matches_nothing() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = store_from_trig(DATA)?;
        let view = GraphView::new(&store, GraphScope::Union);
        let lit = Term::Literal(oxigraph::model::Literal::new_simple_literal("lit"));
        assert!(view.triples_for_subject(&lit)?.is_empty());
        Ok(())
    }

    #[test]
    fn blank_nodes_key_by_content() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = store_from_trig(
            r#"
            @prefix ex: <http://example.org/> .
            ex:root ex:p [ ex:q [ ex:r 2 ] ] , [ ex:q [ ex:r 1 ] ] , ex:named .
            "#,
        )?;
        let view = GraphView::new(&store, GraphScope::Default);
        let p = NamedNode::new_unchecked("http://example.org/p");
        let sorted = view.sort_terms(view.objects(&ex("root"), p.as_ref())?)?;
        let keys = sorted
            .iter()
            .map(|term| view.sort_key(term))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        assert_eq!(keys[0], "<http://example.org/named>");
        assert!(keys[1].starts_with("[<http://example.org/q> [<http://example.org/r> \"1\""));
        assert!(keys[2].contains("\"2\""));
        Ok(())
    }
}
