//! In-memory shape model.
//!
//! A [`ShapesModel`] is built once per shapes graph and never mutated afterwards,
//! so one model can be shared by every worker validating data graphs in parallel.

pub mod components;
pub(crate) mod ids;
pub mod shapes;

pub use components::{Constraint, ConstraintKind, SparqlConstraint};
pub use shapes::Shape;

use crate::backend::GraphView;
use crate::error::Result;
use crate::parser;
use crate::types::ShapeID;
use ids::IDLookupTable;
use log::info;
use oxigraph::model::{NamedNode, Term};
use std::collections::HashMap;

pub struct ShapesModel {
    pub(crate) lookup: IDLookupTable<ShapeID>,
    /// Indexed by `ShapeID`; ids are assigned in lexicographic order of the shape term.
    pub(crate) shapes: Vec<Shape>,
    /// For each property shape, the shapes that reference it through `sh:property`.
    pub(crate) parents: HashMap<ShapeID, Vec<ShapeID>>,
    /// Named graph this model was read from. `None` for the default or union graph.
    pub(crate) association: Option<NamedNode>,
}

impl ShapesModel {
    /// Reads every shape described in `view`.
    ///
    /// Structural problems (undefined shape references, malformed lists,
    /// invalid patterns, ...) are reported here rather than during evaluation.
    pub fn from_view(view: &GraphView<'_>, association: Option<NamedNode>) -> Result<Self> {
        info!("Parsing shapes from {}", view.scope());
        let model = parser::run_parser(view, association)?;
        info!(
            "Parsed {} shape(s) from {} ({} with targets)",
            model.len(),
            view.scope(),
            model.shapes_targeting_anything().count()
        );
        Ok(model)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeID) -> Option<&Shape> {
        self.shapes.get(id.0 as usize)
    }

    pub fn shape_by_iri(&self, term: &Term) -> Option<&Shape> {
        self.lookup.get(term).and_then(|id| self.shape(id))
    }

    pub fn shape_term(&self, id: ShapeID) -> Option<&Term> {
        self.lookup.get_term(id)
    }

    /// Shapes with at least one target, in enumeration order.
    pub fn shapes_targeting_anything(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes.iter().filter(|s| !s.targets.is_empty())
    }

    pub fn parents_of(&self, id: ShapeID) -> &[ShapeID] {
        self.parents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn association(&self) -> Option<&NamedNode> {
        self.association.as_ref()
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
