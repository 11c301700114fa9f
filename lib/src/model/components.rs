use crate::named_nodes::SHACL;
use crate::types::{NodeKind, ShapeID};
use oxigraph::model::{NamedNode, Term};
use regex::Regex;

/// A parsed constraint, one variant per supported SHACL constraint component.
///
/// Shape references are by [`ShapeID`] so mutually recursive shapes stay a flat table.
#[derive(Debug, Clone)]
pub enum Constraint {
    Class {
        class: Term,
    },
    Datatype {
        datatype: NamedNode,
    },
    NodeKind {
        kind: NodeKind,
    },
    MinCount {
        count: u64,
    },
    MaxCount {
        count: u64,
    },
    MinExclusive {
        value: Term,
    },
    MinInclusive {
        value: Term,
    },
    MaxExclusive {
        value: Term,
    },
    MaxInclusive {
        value: Term,
    },
    MinLength {
        length: u64,
    },
    MaxLength {
        length: u64,
    },
    Pattern {
        pattern: String,
        flags: Option<String>,
        regex: Regex,
    },
    LanguageIn {
        languages: Vec<String>,
    },
    UniqueLang,
    Equals {
        property: NamedNode,
    },
    Disjoint {
        property: NamedNode,
    },
    LessThan {
        property: NamedNode,
    },
    LessThanOrEquals {
        property: NamedNode,
    },
    Not {
        shape: ShapeID,
    },
    And {
        shapes: Vec<ShapeID>,
    },
    Or {
        shapes: Vec<ShapeID>,
    },
    Xone {
        shapes: Vec<ShapeID>,
    },
    Node {
        shape: ShapeID,
    },
    Property {
        shape: ShapeID,
    },
    QualifiedValueShape {
        shape: ShapeID,
        min_count: Option<u64>,
        max_count: Option<u64>,
        disjoint: bool,
        /// Qualified shapes of sibling property shapes that are declared earlier.
        /// A value conforming to one of them is claimed by that sibling.
        earlier_siblings: Vec<ShapeID>,
    },
    Closed {
        /// Predicates of the shape's `sh:property` paths plus `sh:ignoredProperties`.
        allowed: Vec<NamedNode>,
    },
    HasValue {
        value: Term,
    },
    In {
        values: Vec<Term>,
    },
    Sparql(SparqlConstraint),
}

/// An `sh:sparql` constraint; the query itself is opaque to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlConstraint {
    pub node: Term,
    /// Query with the `sh:prefixes` prologue already prepended.
    pub select: String,
    pub message: Option<String>,
    pub deactivated: bool,
}

/// Tag of a [`Constraint`], used as the result's source constraint component.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    Class,
    Datatype,
    NodeKind,
    MinCount,
    MaxCount,
    MinExclusive,
    MinInclusive,
    MaxExclusive,
    MaxInclusive,
    MinLength,
    MaxLength,
    Pattern,
    LanguageIn,
    UniqueLang,
    Equals,
    Disjoint,
    LessThan,
    LessThanOrEquals,
    Not,
    And,
    Or,
    Xone,
    Node,
    Property,
    QualifiedMinCount,
    QualifiedMaxCount,
    Closed,
    HasValue,
    In,
    Sparql,
}

impl ConstraintKind {
    pub fn local_name(self) -> &'static str {
        match self {
            ConstraintKind::Class => "Class",
            ConstraintKind::Datatype => "Datatype",
            ConstraintKind::NodeKind => "NodeKind",
            ConstraintKind::MinCount => "MinCount",
            ConstraintKind::MaxCount => "MaxCount",
            ConstraintKind::MinExclusive => "MinExclusive",
            ConstraintKind::MinInclusive => "MinInclusive",
            ConstraintKind::MaxExclusive => "MaxExclusive",
            ConstraintKind::MaxInclusive => "MaxInclusive",
            ConstraintKind::MinLength => "MinLength",
            ConstraintKind::MaxLength => "MaxLength",
            ConstraintKind::Pattern => "Pattern",
            ConstraintKind::LanguageIn => "LanguageIn",
            ConstraintKind::UniqueLang => "UniqueLang",
            ConstraintKind::Equals => "Equals",
            ConstraintKind::Disjoint => "Disjoint",
            ConstraintKind::LessThan => "LessThan",
            ConstraintKind::LessThanOrEquals => "LessThanOrEquals",
            ConstraintKind::Not => "Not",
            ConstraintKind::And => "And",
            ConstraintKind::Or => "Or",
            ConstraintKind::Xone => "Xone",
            ConstraintKind::Node => "Node",
            ConstraintKind::Property => "Property",
            ConstraintKind::QualifiedMinCount => "QualifiedMinCount",
            ConstraintKind::QualifiedMaxCount => "QualifiedMaxCount",
            ConstraintKind::Closed => "Closed",
            ConstraintKind::HasValue => "HasValue",
            ConstraintKind::In => "In",
            ConstraintKind::Sparql => "SPARQL",
        }
    }

    /// The `sh:...ConstraintComponent` IRI.
    pub fn iri(self) -> NamedNode {
        NamedNode::new_unchecked(SHACL::component(self.local_name()))
    }
}

impl Constraint {
    /// The kind reported for a failure of this constraint. Qualified value
    /// shapes report min or max separately, so this is their min kind.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Class { .. } => ConstraintKind::Class,
            Constraint::Datatype { .. } => ConstraintKind::Datatype,
            Constraint::NodeKind { .. } => ConstraintKind::NodeKind,
            Constraint::MinCount { .. } => ConstraintKind::MinCount,
            Constraint::MaxCount { .. } => ConstraintKind::MaxCount,
            Constraint::MinExclusive { .. } => ConstraintKind::MinExclusive,
            Constraint::MinInclusive { .. } => ConstraintKind::MinInclusive,
            Constraint::MaxExclusive { .. } => ConstraintKind::MaxExclusive,
            Constraint::MaxInclusive { .. } => ConstraintKind::MaxInclusive,
            Constraint::MinLength { .. } => ConstraintKind::MinLength,
            Constraint::MaxLength { .. } => ConstraintKind::MaxLength,
            Constraint::Pattern { .. } => ConstraintKind::Pattern,
            Constraint::LanguageIn { .. } => ConstraintKind::LanguageIn,
            Constraint::UniqueLang => ConstraintKind::UniqueLang,
            Constraint::Equals { .. } => ConstraintKind::Equals,
            Constraint::Disjoint { .. } => ConstraintKind::Disjoint,
            Constraint::LessThan { .. } => ConstraintKind::LessThan,
            Constraint::LessThanOrEquals { .. } => ConstraintKind::LessThanOrEquals,
            Constraint::Not { .. } => ConstraintKind::Not,
            Constraint::And { .. } => ConstraintKind::And,
            Constraint::Or { .. } => ConstraintKind::Or,
            Constraint::Xone { .. } => ConstraintKind::Xone,
            Constraint::Node { .. } => ConstraintKind::Node,
            Constraint::Property { .. } => ConstraintKind::Property,
            Constraint::QualifiedValueShape { .. } => ConstraintKind::QualifiedMinCount,
            Constraint::Closed { .. } => ConstraintKind::Closed,
            Constraint::HasValue { .. } => ConstraintKind::HasValue,
            Constraint::In { .. } => ConstraintKind::In,
            Constraint::Sparql(_) => ConstraintKind::Sparql,
        }
    }

    /// Shapes this constraint refers to, in declaration order.
    pub fn referenced_shapes(&self) -> Vec<ShapeID> {
        match self {
            Constraint::Not { shape }
            | Constraint::Node { shape }
            | Constraint::Property { shape }
            | Constraint::QualifiedValueShape { shape, .. } => vec![*shape],
            Constraint::And { shapes } | Constraint::Or { shapes } | Constraint::Xone { shapes } => {
                shapes.clone()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_iris() {
        assert_eq!(
            ConstraintKind::MinCount.iri().as_str(),
            "http://www.w3.org/ns/shacl#MinCountConstraintComponent"
        );
        assert_eq!(
            ConstraintKind::Sparql.iri().as_str(),
            "http://www.w3.org/ns/shacl#SPARQLConstraintComponent"
        );
    }

    #[test]
    fn logical_constraints_expose_children() {
        let c = Constraint::Or {
            shapes: vec![ShapeID(2), ShapeID(5)],
        };
        assert_eq!(c.referenced_shapes(), vec![ShapeID(2), ShapeID(5)]);
        assert_eq!(c.kind(), ConstraintKind::Or);
    }
}
