//! Error types.
//!
//! Only problems with the shapes graph itself, or with the storage layer, are
//! surfaced as errors. Non-conforming data always ends up in the report.

use oxigraph::model::Term;
use thiserror::Error;

/// Result type for shapes-graph loading.
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Structural problems detected while building a [`ShapesModel`](crate::ShapesModel).
#[derive(Debug, Error)]
pub enum ShapeError {
    /// A shape references an IRI that is not described anywhere in the shapes graph
    #[error("Shape {referrer} references undefined shape {referenced}")]
    UndefinedShape { referrer: Term, referenced: Term },

    /// An RDF list (sh:in, sh:and, sh:ignoredProperties, ...) is not well formed
    #[error("Malformed RDF list for {predicate} on {shape}: {message}")]
    MalformedList {
        shape: Term,
        predicate: String,
        message: String,
    },

    #[error("Invalid property path on {shape}: {message}")]
    InvalidPath { shape: Term, message: String },

    /// Invalid constraint parameter, e.g. a non-integer sh:minCount
    #[error("Invalid constraint on shape {shape}: {message}")]
    InvalidConstraint { shape: Term, message: String },

    /// Invalid regex in sh:pattern
    #[error("Invalid regex pattern '{pattern}' on {shape}: {message}")]
    InvalidPattern {
        shape: Term,
        pattern: String,
        message: String,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failure reported by a [`GraphBackend`](crate::GraphBackend).
#[derive(Debug, Clone, Error)]
#[error("Graph backend error: {0}")]
pub struct BackendError(pub String);

impl From<oxigraph::store::StorageError> for BackendError {
    fn from(err: oxigraph::store::StorageError) -> Self {
        BackendError(err.to_string())
    }
}

/// Errors returned at the [`Validator`](crate::Validator) boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Shapes(#[from] ShapeError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Validator is missing its {0}")]
    Incomplete(&'static str),
}
