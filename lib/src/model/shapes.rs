use super::components::Constraint;
use crate::types::{Path, Severity, ShapeID, Target};
use oxigraph::model::{NamedNode, Term};

/// A node or property shape. Property shapes are the ones with a path.
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) id: ShapeID,
    pub(crate) term: Term,
    pub(crate) path: Option<Path>,
    pub(crate) targets: Vec<Target>,
    pub(crate) severity: Severity,
    pub(crate) deactivated: bool,
    pub(crate) message: Option<String>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) closed: bool,
    pub(crate) ignored_properties: Vec<NamedNode>,
}

impl Shape {
    pub fn id(&self) -> ShapeID {
        self.id
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn is_property_shape(&self) -> bool {
        self.path.is_some()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_deactivated(&self) -> bool {
        self.deactivated
    }

    /// Value of `sh:message`, which replaces generated messages in results.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn ignored_properties(&self) -> &[NamedNode] {
        &self.ignored_properties
    }

    /// Shapes reached from this one through `sh:property`.
    pub fn property_shapes(&self) -> impl Iterator<Item = ShapeID> + '_ {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::Property { shape } => Some(*shape),
            _ => None,
        })
    }
}
