//! Maps shapes graphs to data graphs and drives per-graph evaluation.

use crate::backend::{GraphBackend, GraphScope, GraphView};
use crate::config::ValidationConfig;
use crate::error::ValidationError;
use crate::model::ShapesModel;
use crate::report::{ValidationReport, ValidationReportBuilder, ValidationResult};
use crate::runtime::Evaluator;
use crate::sparql::SparqlDelegate;
use crate::trace::TraceSink;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt;

/// How shapes are matched to data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Plain SHACL: all shapes against the union of all data graphs.
    #[default]
    Classic,
    /// SHACL-DS: shapes in named graph `G` validate only data graph `G`.
    Dataset,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Classic => f.write_str("SHACL"),
            ValidationMode::Dataset => f.write_str("SHACL-DS"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    ModeResolved,
    PerGraphEvaluating,
    Aggregated,
    Done,
}

/// A data graph together with the shapes that apply to it.
#[derive(Clone, Copy)]
pub struct TargetGraph<'m> {
    pub scope: &'m GraphScope,
    pub shapes: &'m ShapesModel,
}

/// Parsed shapes for one validation mode.
pub(crate) struct ShapeSet {
    pub(crate) mode: ValidationMode,
    /// Sorted by graph name in dataset mode; a single union model otherwise.
    pub(crate) models: Vec<(GraphScope, ShapesModel)>,
}

impl ShapeSet {
    pub(crate) fn load(
        backend: &dyn GraphBackend,
        mode: ValidationMode,
    ) -> Result<Self, ValidationError> {
        let mut models = Vec::new();
        match mode {
            ValidationMode::Classic => {
                let view = GraphView::new(backend, GraphScope::Union);
                models.push((GraphScope::Union, ShapesModel::from_view(&view, None)?));
            }
            ValidationMode::Dataset => {
                let names = backend.graph_names()?;
                let default_view = GraphView::new(backend, GraphScope::Default);
                if !default_view.triples(None, None, None)?.is_empty() {
                    warn!("Shapes in the default graph are ignored in SHACL-DS mode");
                }
                if names.is_empty() {
                    warn!("The shapes dataset has no named graphs; validation vacuously conforms");
                }
                for name in names {
                    let scope = GraphScope::Named(name.clone());
                    let view = GraphView::new(backend, scope.clone());
                    let model = ShapesModel::from_view(&view, Some(name))?;
                    models.push((scope, model));
                }
            }
        }
        Ok(ShapeSet { mode, models })
    }
}

pub(crate) struct Orchestrator<'a> {
    state: OrchestratorState,
    shapes: &'a ShapeSet,
    data: &'a dyn GraphBackend,
    config: &'a ValidationConfig,
    sparql: &'a dyn SparqlDelegate,
    trace: &'a dyn TraceSink,
}

impl<'a> Orchestrator<'a> {
    pub(crate) fn new(
        shapes: &'a ShapeSet,
        data: &'a dyn GraphBackend,
        config: &'a ValidationConfig,
        sparql: &'a dyn SparqlDelegate,
        trace: &'a dyn TraceSink,
    ) -> Self {
        Orchestrator {
            state: OrchestratorState::Idle,
            shapes,
            data,
            config,
            sparql,
            trace,
        }
    }

    pub(crate) fn state(&self) -> OrchestratorState {
        self.state
    }

    fn transition(&mut self, next: OrchestratorState) {
        debug!("Orchestrator: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Pairs each data graph with the shapes that validate it, in graph name order.
    ///
    /// In dataset mode a named shapes graph applies to the data graph with the
    /// same name; shapes graphs with no matching data graph select nothing.
    pub(crate) fn target_graphs(&self) -> Result<Vec<TargetGraph<'a>>, ValidationError> {
        let shapes: &'a ShapeSet = self.shapes;
        match shapes.mode {
            ValidationMode::Classic => Ok(shapes
                .models
                .iter()
                .map(|(scope, model)| TargetGraph {
                    scope,
                    shapes: model,
                })
                .collect()),
            ValidationMode::Dataset => {
                let data_graphs = self.data.graph_names()?;
                let mut targets = Vec::new();
                for (scope, model) in &shapes.models {
                    let matched = model
                        .association()
                        .is_some_and(|name| data_graphs.contains(name));
                    if matched {
                        targets.push(TargetGraph {
                            scope,
                            shapes: model,
                        });
                    } else {
                        info!("No data graph named {}, skipping its shapes", scope);
                    }
                }
                Ok(targets)
            }
        }
    }

    fn evaluate_graph(&self, target: TargetGraph<'_>) -> Vec<ValidationResult> {
        info!("Validating {}", target.scope);
        let view = GraphView::new(self.data, target.scope.clone());
        let evaluator = Evaluator::new(target.shapes, view, self.config, self.sparql, self.trace);
        let mut results = Vec::new();
        for shape in target.shapes.shapes_targeting_anything() {
            results.extend(evaluator.validate_shape(shape));
        }
        results
    }

    pub(crate) fn run(&mut self) -> Result<ValidationReport, ValidationError> {
        self.transition(OrchestratorState::ModeResolved);
        info!("Validating in {} mode", self.shapes.mode);
        let targets = self.target_graphs()?;

        self.transition(OrchestratorState::PerGraphEvaluating);
        let this: &Self = self;
        let per_graph: Vec<Vec<ValidationResult>> = if self.config.parallel {
            targets
                .par_iter()
                .map(|target| this.evaluate_graph(*target))
                .collect()
        } else {
            targets
                .iter()
                .map(|target| this.evaluate_graph(*target))
                .collect()
        };

        self.transition(OrchestratorState::Aggregated);
        let mut builder = ValidationReportBuilder::new(self.config.min_severity);
        for results in per_graph {
            builder.extend(results);
        }
        let report = builder.build();

        self.transition(OrchestratorState::Done);
        info!(
            "Validation finished: {} result(s), conforms = {}",
            report.results().len(),
            report.conforms()
        );
        Ok(report)
    }
}
