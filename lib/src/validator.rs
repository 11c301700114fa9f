use crate::backend::GraphBackend;
use crate::config::ValidationConfig;
use crate::error::ValidationError;
use crate::orchestrator::{Orchestrator, ShapeSet, TargetGraph, ValidationMode};
use crate::report::ValidationReport;
use crate::sparql::{OxigraphSparqlDelegate, SparqlDelegate, UnsupportedSparql};
use crate::trace::{NullTraceSink, TraceSink};
use oxigraph::store::Store;
use std::sync::Arc;

/// Assembles a [`Validator`].
///
/// ```no_run
/// # use shifty_ds::{ValidatorBuilder, ValidationMode};
/// # fn run(shapes: oxigraph::store::Store, data: oxigraph::store::Store) -> Result<(), shifty_ds::ValidationError> {
/// let validator = ValidatorBuilder::new()
///     .with_shapes_store(shapes)
///     .with_data_store(data)
///     .with_mode(ValidationMode::Dataset)
///     .build()?;
/// let report = validator.validate()?;
/// println!("conforms: {}", report.conforms());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ValidatorBuilder {
    shapes: Option<Arc<dyn GraphBackend>>,
    data: Option<Arc<dyn GraphBackend>>,
    mode: ValidationMode,
    config: ValidationConfig,
    sparql: Option<Arc<dyn SparqlDelegate>>,
    trace: Option<Arc<dyn TraceSink>>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shapes_backend(mut self, backend: Arc<dyn GraphBackend>) -> Self {
        self.shapes = Some(backend);
        self
    }

    pub fn with_data_backend(mut self, backend: Arc<dyn GraphBackend>) -> Self {
        self.data = Some(backend);
        self
    }

    pub fn with_shapes_store(self, store: Store) -> Self {
        self.with_shapes_backend(Arc::new(store))
    }

    /// Uses `store` for data and, unless a delegate was set explicitly, runs
    /// SPARQL constraints against it with oxigraph.
    pub fn with_data_store(mut self, store: Store) -> Self {
        if self.sparql.is_none() {
            self.sparql = Some(Arc::new(OxigraphSparqlDelegate::new(store.clone())));
        }
        self.with_data_backend(Arc::new(store))
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sparql_delegate(mut self, delegate: Arc<dyn SparqlDelegate>) -> Self {
        self.sparql = Some(delegate);
        self
    }

    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Parses the shapes. Structural errors in the shapes graph surface here.
    pub fn build(self) -> Result<Validator, ValidationError> {
        let shapes_backend = self.shapes.ok_or(ValidationError::Incomplete("shapes graph"))?;
        let data = self.data.ok_or(ValidationError::Incomplete("data graph"))?;
        let shapes = ShapeSet::load(shapes_backend.as_ref(), self.mode)?;
        Ok(Validator {
            shapes,
            data,
            config: self.config,
            sparql: self.sparql.unwrap_or_else(|| Arc::new(UnsupportedSparql)),
            trace: self.trace.unwrap_or_else(|| Arc::new(NullTraceSink)),
        })
    }
}

/// Parsed shapes bound to a data backend, ready to validate.
pub struct Validator {
    shapes: ShapeSet,
    data: Arc<dyn GraphBackend>,
    config: ValidationConfig,
    sparql: Arc<dyn SparqlDelegate>,
    trace: Arc<dyn TraceSink>,
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    pub fn mode(&self) -> ValidationMode {
        self.shapes.mode
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    fn orchestrator(&self) -> Orchestrator<'_> {
        Orchestrator::new(
            &self.shapes,
            self.data.as_ref(),
            &self.config,
            self.sparql.as_ref(),
            self.trace.as_ref(),
        )
    }

    /// The (data graph, shapes) pairs a call to [`validate`](Self::validate) evaluates.
    pub fn target_graphs(&self) -> Result<Vec<TargetGraph<'_>>, ValidationError> {
        self.orchestrator().target_graphs()
    }

    pub fn validate(&self) -> Result<ValidationReport, ValidationError> {
        self.orchestrator().run()
    }
}
