use crate::named_nodes::SHACL;
use oxigraph::model::{NamedNode, Term};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Index of a shape in its [`ShapesModel`](crate::ShapesModel) table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeID(pub u64);

impl From<u64> for ShapeID {
    fn from(item: u64) -> Self {
        ShapeID(item)
    }
}

impl From<ShapeID> for u64 {
    fn from(id: ShapeID) -> Self {
        id.0
    }
}

impl fmt::Display for ShapeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Path {
    Simple(NamedNode),
    Inverse(Box<Path>),
    Sequence(Vec<Path>),
    Alternative(Vec<Path>),
    ZeroOrMore(Box<Path>),
    OneOrMore(Box<Path>),
    ZeroOrOne(Box<Path>),
}

impl Path {
    /// The predicate when this is a plain predicate path.
    pub fn as_predicate(&self) -> Option<&NamedNode> {
        match self {
            Path::Simple(p) => Some(p),
            _ => None,
        }
    }

    /// Renders the path in SPARQL property path syntax, used to substitute `$PATH`.
    pub fn to_sparql_path(&self) -> String {
        match self {
            Path::Simple(nn) => format!("<{}>", nn.as_str()),
            Path::Inverse(inner) => format!("^{}", inner.to_sparql_path()),
            // sequences and alternatives always come out parenthesized
            Path::Sequence(paths) => format!(
                "({})",
                paths
                    .iter()
                    .map(Path::to_sparql_path)
                    .collect::<Vec<_>>()
                    .join(" / ")
            ),
            Path::Alternative(paths) => format!(
                "({})",
                paths
                    .iter()
                    .map(Path::to_sparql_path)
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
            Path::ZeroOrMore(inner) => format!("{}*", inner.to_sparql_path()),
            Path::OneOrMore(inner) => format!("{}+", inner.to_sparql_path()),
            Path::ZeroOrOne(inner) => format!("{}?", inner.to_sparql_path()),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sparql_path())
    }
}

/// How a shape selects its focus nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Class(Term),
    Node(Term),
    SubjectsOf(NamedNode),
    ObjectsOf(NamedNode),
    /// The shape is itself a class and targets its own instances.
    ImplicitClass(Term),
    /// `sh:target [ sh:select "..." ]`, resolved by a [`SparqlDelegate`](crate::SparqlDelegate).
    Select { query: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Violation,
}

impl Severity {
    pub fn from_term(term: &Term) -> Option<Self> {
        let shacl = SHACL::new();
        if let Term::NamedNode(nn) = term {
            if *nn == shacl.info {
                Some(Severity::Info)
            } else if *nn == shacl.warning {
                Some(Severity::Warning)
            } else if *nn == shacl.violation {
                Some(Severity::Violation)
            } else {
                None
            }
        } else {
            None
        }
    }

    pub fn to_term(self) -> NamedNode {
        let shacl = SHACL::new();
        match self {
            Severity::Info => shacl.info.into_owned(),
            Severity::Warning => shacl.warning.into_owned(),
            Severity::Violation => shacl.violation.into_owned(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Violation => "Violation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Iri,
    BlankNode,
    Literal,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    pub fn from_term(term: &Term) -> Option<Self> {
        let sh = SHACL::new();
        let Term::NamedNode(nn) = term else {
            return None;
        };
        let nn = nn.as_ref();
        if nn == sh.iri {
            Some(NodeKind::Iri)
        } else if nn == sh.blank_node {
            Some(NodeKind::BlankNode)
        } else if nn == sh.literal {
            Some(NodeKind::Literal)
        } else if nn == sh.blank_node_or_iri {
            Some(NodeKind::BlankNodeOrIri)
        } else if nn == sh.blank_node_or_literal {
            Some(NodeKind::BlankNodeOrLiteral)
        } else if nn == sh.iri_or_literal {
            Some(NodeKind::IriOrLiteral)
        } else {
            None
        }
    }

    pub fn matches(self, term: &Term) -> bool {
        let is_iri = matches!(term, Term::NamedNode(_));
        let is_blank = matches!(term, Term::BlankNode(_));
        let is_literal = matches!(term, Term::Literal(_));
        match self {
            NodeKind::Iri => is_iri,
            NodeKind::BlankNode => is_blank,
            NodeKind::Literal => is_literal,
            NodeKind::BlankNodeOrIri => is_blank || is_iri,
            NodeKind::BlankNodeOrLiteral => is_blank || is_literal,
            NodeKind::IriOrLiteral => is_iri || is_literal,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Iri => "sh:IRI",
            NodeKind::BlankNode => "sh:BlankNode",
            NodeKind::Literal => "sh:Literal",
            NodeKind::BlankNodeOrIri => "sh:BlankNodeOrIRI",
            NodeKind::BlankNodeOrLiteral => "sh:BlankNodeOrLiteral",
            NodeKind::IriOrLiteral => "sh:IRIOrLiteral",
        };
        f.write_str(name)
    }
}

/// Removes duplicates while keeping the first occurrence of each item.
pub(crate) fn dedup<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(local: &str) -> Path {
        Path::Simple(NamedNode::new_unchecked(format!("http://example.org/{local}")))
    }

    #[test]
    fn sparql_path_rendering() {
        let path = Path::Sequence(vec![
            p("a"),
            Path::ZeroOrMore(Box::new(Path::Inverse(Box::new(p("b"))))),
        ]);
        assert_eq!(
            path.to_sparql_path(),
            "(<http://example.org/a> / ^<http://example.org/b>*)"
        );
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Violation);
        assert_eq!(Severity::default(), Severity::Violation);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        assert_eq!(dedup(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
