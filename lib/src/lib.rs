//! SHACL and SHACL-DS validation over oxigraph stores.
//!
//! In classic mode every shape validates the union of the data graphs. In
//! dataset mode a shape declared in the named shapes graph `G` validates only
//! the data graph named `G`, and shapes in the default graph are inert.

pub mod backend;
pub mod config;
pub mod error;
pub mod model;
pub mod named_nodes;
pub mod orchestrator;
mod parser;
pub mod report;
mod runtime;
pub mod sparql;
pub mod test_utils;
pub mod trace;
pub mod types;
pub mod validator;

pub use backend::{GraphBackend, GraphScope, GraphView};
pub use config::{ValidationConfig, DEFAULT_MAX_RECURSION_DEPTH};
pub use error::{BackendError, ShapeError, ValidationError};
pub use model::{Constraint, ConstraintKind, Shape, ShapesModel};
pub use orchestrator::{OrchestratorState, TargetGraph, ValidationMode};
pub use report::{ValidationReport, ValidationReportBuilder, ValidationResult};
pub use sparql::{OxigraphSparqlDelegate, SparqlDelegate, SparqlOutcome, SparqlRequest};
pub use trace::{MemoryTraceSink, NullTraceSink, TraceEvent, TraceSink};
pub use types::{NodeKind, Path, Severity, ShapeID, Target};
pub use validator::{Validator, ValidatorBuilder};
