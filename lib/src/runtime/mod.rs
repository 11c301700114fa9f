//! The recursive constraint evaluator.
//!
//! An [`Evaluator`] is bound to one shapes model and one data graph scope.
//! Constraints are dispatched by exhaustive match on [`Constraint`]; the
//! per-component logic lives in [`validators`].

pub(crate) mod class_index;
pub(crate) mod path;
pub(crate) mod targets;
pub(crate) mod validators;

use crate::backend::GraphView;
use crate::config::ValidationConfig;
use crate::error::BackendError;
use crate::model::{Constraint, ConstraintKind, Shape, ShapesModel};
use crate::report::ValidationResult;
use crate::sparql::SparqlDelegate;
use crate::trace::{TraceEvent, TraceSink};
use crate::types::{Severity, ShapeID};
use class_index::ClassIndex;
use log::{debug, error};
use oxigraph::model::{NamedNode, Term};
use std::sync::OnceLock;

/// Pairs of (shape, node) currently being evaluated on this call chain.
pub(crate) type VisitedStack = Vec<(ShapeID, Term)>;

/// What a constraint sees while it is checked.
pub(crate) struct FocusContext<'s> {
    pub(crate) shape: &'s Shape,
    pub(crate) focus: &'s Term,
    pub(crate) value_nodes: &'s [Term],
}

pub(crate) struct Evaluator<'a> {
    model: &'a ShapesModel,
    view: GraphView<'a>,
    config: &'a ValidationConfig,
    sparql: &'a dyn SparqlDelegate,
    trace: &'a dyn TraceSink,
    class_index: OnceLock<Result<ClassIndex, BackendError>>,
    graph: Option<NamedNode>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(
        model: &'a ShapesModel,
        view: GraphView<'a>,
        config: &'a ValidationConfig,
        sparql: &'a dyn SparqlDelegate,
        trace: &'a dyn TraceSink,
    ) -> Self {
        let graph = view.scope().graph_name().cloned();
        Evaluator {
            model,
            view,
            config,
            sparql,
            trace,
            class_index: OnceLock::new(),
            graph,
        }
    }

    pub(crate) fn view(&self) -> &GraphView<'a> {
        &self.view
    }

    pub(crate) fn model(&self) -> &'a ShapesModel {
        self.model
    }

    /// Built on first use; most shapes graphs never need it.
    pub(crate) fn class_index(&self) -> Result<&ClassIndex, BackendError> {
        match self
            .class_index
            .get_or_init(|| ClassIndex::build(&self.view))
        {
            Ok(index) => Ok(index),
            Err(e) => Err(e.clone()),
        }
    }

    /// Validates every focus node selected by the targets of `shape`.
    pub(crate) fn validate_shape(&self, shape: &Shape) -> Vec<ValidationResult> {
        if shape.deactivated {
            return Vec::new();
        }
        let focus_nodes = match self.focus_nodes(shape) {
            Ok(nodes) => nodes,
            Err(message) => return vec![self.anomaly(shape, &shape.term, message)],
        };
        debug!(
            "Shape {} selects {} focus node(s) in {}",
            shape.term,
            focus_nodes.len(),
            self.view.scope()
        );
        let mut results = Vec::new();
        for focus in &focus_nodes {
            let mut visited: VisitedStack = vec![(shape.id, focus.clone())];
            results.extend(self.evaluate(shape.id, focus, None, &mut visited));
        }
        results
    }

    /// Checks all constraints of `shape_id` for `focus`.
    ///
    /// `value_nodes` defaults to the focus node for node shapes and to the
    /// resolved path for property shapes.
    pub(crate) fn evaluate(
        &self,
        shape_id: ShapeID,
        focus: &Term,
        value_nodes: Option<Vec<Term>>,
        visited: &mut VisitedStack,
    ) -> Vec<ValidationResult> {
        let Some(shape) = self.model.shape(shape_id) else {
            return Vec::new();
        };
        if shape.deactivated {
            return Vec::new();
        }
        self.trace.record(TraceEvent::EnterShape {
            shape: shape.term.clone(),
            focus: focus.clone(),
            depth: visited.len(),
        });

        let value_nodes = match value_nodes {
            Some(nodes) => nodes,
            None => match self.value_nodes(shape, focus) {
                Ok(nodes) => nodes,
                Err(e) => {
                    return vec![self.anomaly(
                        shape,
                        focus,
                        format!("Failed to resolve value nodes: {}", e),
                    )]
                }
            },
        };
        let ctx = FocusContext {
            shape,
            focus,
            value_nodes: &value_nodes,
        };

        let mut results = Vec::new();
        for constraint in &shape.constraints {
            let produced = match self.check_constraint(&ctx, constraint, visited) {
                Ok(produced) => produced,
                Err(e) => vec![self.anomaly(
                    shape,
                    focus,
                    format!(
                        "Backend failure while checking {}: {}",
                        constraint.kind().local_name(),
                        e
                    ),
                )],
            };
            let violated = produced.iter().any(|r| r.severity() == Severity::Violation);
            for result in &produced {
                self.trace.record(TraceEvent::ConstraintFailed {
                    shape: result.source_shape().clone(),
                    component: result.source_constraint_component(),
                    focus: result.focus_node().clone(),
                    value: result.value().cloned(),
                });
            }
            results.extend(produced);
            if violated && self.config.stop_on_first_violation {
                break;
            }
        }
        results
    }

    fn value_nodes(&self, shape: &Shape, focus: &Term) -> Result<Vec<Term>, BackendError> {
        match &shape.path {
            Some(path) => {
                let values = path::resolve_path(&self.view, focus, path)?;
                if values.iter().any(Term::is_blank_node) {
                    self.view.sort_terms(values)
                } else {
                    Ok(values)
                }
            }
            None => Ok(vec![focus.clone()]),
        }
    }

    fn check_constraint(
        &self,
        ctx: &FocusContext<'_>,
        constraint: &Constraint,
        visited: &mut VisitedStack,
    ) -> Result<Vec<ValidationResult>, BackendError> {
        use validators::{
            cardinality, logical, other, property_pair, shape_based, sparql, string_based,
            value_range, value_type,
        };
        let results = match constraint {
            Constraint::Class { class } => value_type::class(self, ctx, class)?,
            Constraint::Datatype { datatype } => value_type::datatype(self, ctx, datatype),
            Constraint::NodeKind { kind } => value_type::node_kind(self, ctx, *kind),
            Constraint::MinCount { count } => cardinality::min_count(self, ctx, *count),
            Constraint::MaxCount { count } => cardinality::max_count(self, ctx, *count),
            Constraint::MinExclusive { value }
            | Constraint::MinInclusive { value }
            | Constraint::MaxExclusive { value }
            | Constraint::MaxInclusive { value } => {
                value_range::range(self, ctx, constraint.kind(), value)
            }
            Constraint::MinLength { length } => {
                string_based::length(self, ctx, ConstraintKind::MinLength, *length)
            }
            Constraint::MaxLength { length } => {
                string_based::length(self, ctx, ConstraintKind::MaxLength, *length)
            }
            Constraint::Pattern {
                pattern,
                flags,
                regex,
            } => string_based::pattern(self, ctx, pattern, flags.as_deref(), regex),
            Constraint::LanguageIn { languages } => {
                string_based::language_in(self, ctx, languages)
            }
            Constraint::UniqueLang => string_based::unique_lang(self, ctx),
            Constraint::Equals { property }
            | Constraint::Disjoint { property }
            | Constraint::LessThan { property }
            | Constraint::LessThanOrEquals { property } => {
                property_pair::compare(self, ctx, constraint.kind(), property)?
            }
            Constraint::Not { shape } => logical::not(self, ctx, *shape, visited),
            Constraint::And { shapes } => logical::and(self, ctx, shapes, visited),
            Constraint::Or { shapes } => logical::or(self, ctx, shapes, visited),
            Constraint::Xone { shapes } => logical::xone(self, ctx, shapes, visited),
            Constraint::Node { shape } => shape_based::node(self, ctx, *shape, visited),
            Constraint::Property { shape } => shape_based::property(self, ctx, *shape, visited),
            Constraint::QualifiedValueShape {
                shape,
                min_count,
                max_count,
                disjoint,
                earlier_siblings,
            } => shape_based::qualified(
                self,
                ctx,
                shape_based::Qualified {
                    shape: *shape,
                    min_count: *min_count,
                    max_count: *max_count,
                    disjoint: *disjoint,
                    earlier_siblings,
                },
                visited,
            ),
            Constraint::Closed { allowed } => other::closed(self, ctx, allowed)?,
            Constraint::HasValue { value } => other::has_value(self, ctx, value),
            Constraint::In { values } => other::in_list(self, ctx, values),
            Constraint::Sparql(sparql) => sparql::evaluate(self, ctx, sparql),
        };
        Ok(results)
    }

    /// Evaluates `shape_id` with `node` as focus, under the cycle guard.
    ///
    /// A pair that is already on the stack conforms vacuously.
    pub(crate) fn nested(
        &self,
        shape_id: ShapeID,
        node: &Term,
        visited: &mut VisitedStack,
    ) -> Vec<ValidationResult> {
        let Some(shape) = self.model.shape(shape_id) else {
            return Vec::new();
        };
        if visited.iter().any(|(s, n)| *s == shape_id && n == node) {
            debug!("Cycle on ({}, {}), treating as conforming", shape.term, node);
            self.trace.record(TraceEvent::CycleDetected {
                shape: shape.term.clone(),
                node: node.clone(),
            });
            return Vec::new();
        }
        if let Some(limit) = self.config.max_recursion_depth {
            if visited.len() >= limit {
                self.trace.record(TraceEvent::DepthLimitReached {
                    shape: shape.term.clone(),
                    node: node.clone(),
                    depth: visited.len(),
                });
                return vec![self.anomaly(
                    shape,
                    node,
                    format!(
                        "Maximum shape nesting depth of {} exceeded (see max_recursion_depth)",
                        limit
                    ),
                )];
            }
        }
        visited.push((shape_id, node.clone()));
        let results = self.evaluate(shape_id, node, None, visited);
        visited.pop();
        results
    }

    /// Whether `node` conforms to `shape_id`. Anomalies raised underneath are
    /// moved into `anomalies` so they still reach the report.
    pub(crate) fn nested_conforms(
        &self,
        shape_id: ShapeID,
        node: &Term,
        visited: &mut VisitedStack,
        anomalies: &mut Vec<ValidationResult>,
    ) -> bool {
        let results = self.nested(shape_id, node, visited);
        let conforms = !results.iter().any(|r| r.severity() == Severity::Violation);
        anomalies.extend(results.into_iter().filter(ValidationResult::is_anomaly));
        conforms
    }

    /// A result for a failed constraint of `ctx.shape`. `sh:message` on the
    /// shape replaces the generated message.
    pub(crate) fn failure(
        &self,
        ctx: &FocusContext<'_>,
        kind: ConstraintKind,
        value: Option<Term>,
        message: String,
    ) -> ValidationResult {
        let message = ctx.shape.message.clone().unwrap_or(message);
        ValidationResult::new(
            ctx.focus.clone(),
            ctx.shape.term.clone(),
            Some(kind),
            ctx.shape.severity,
            message,
        )
        .with_path(ctx.shape.path.clone())
        .with_value(value)
        .in_graph(self.graph.clone())
    }

    pub(crate) fn anomaly(&self, shape: &Shape, focus: &Term, message: String) -> ValidationResult {
        error!("Evaluation anomaly in {} at {}: {}", shape.term, focus, message);
        ValidationResult::new(
            focus.clone(),
            shape.term.clone(),
            None,
            Severity::Violation,
            message,
        )
        .with_path(shape.path.clone())
        .in_graph(self.graph.clone())
    }

    pub(crate) fn sparql(&self) -> &dyn SparqlDelegate {
        self.sparql
    }
}
