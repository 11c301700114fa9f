//! SPARQL-based constraints and targets.
//!
//! The evaluator never looks inside a query. It hands the query, the focus node
//! and the graph scope to a [`SparqlDelegate`] and turns the returned bindings
//! into results, which keeps the query engine swappable (and stubbable in tests).

use crate::backend::GraphScope;
use crate::types::{dedup, Path};
use log::debug;
use oxigraph::model::{GraphName, Term};
use oxigraph::sparql::{QueryResults, SparqlEvaluator, Variable};
use oxigraph::store::Store;

/// Input for one `sh:sparql` evaluation.
pub struct SparqlRequest<'a> {
    /// The `sh:select` text with its prefix prologue.
    pub query: &'a str,
    pub focus_node: &'a Term,
    pub value_nodes: &'a [Term],
    /// Path of the property shape; substituted for `$PATH`.
    pub path: Option<&'a Path>,
    pub scope: &'a GraphScope,
}

/// One solution of a constraint query, i.e. one violation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparqlBinding {
    pub value: Option<Term>,
    pub path: Option<Term>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparqlOutcome {
    pub conforms: bool,
    pub bindings: Vec<SparqlBinding>,
}

impl SparqlOutcome {
    pub fn from_bindings(bindings: Vec<SparqlBinding>) -> Self {
        Self {
            conforms: bindings.is_empty(),
            bindings,
        }
    }
}

/// Evaluates SPARQL constraints and targets on behalf of the core.
///
/// An `Err` is turned into a single Violation result by the evaluator.
pub trait SparqlDelegate: Send + Sync {
    fn evaluate(&self, request: &SparqlRequest<'_>) -> Result<SparqlOutcome, String>;

    /// Focus nodes selected by an `sh:target [ sh:select ... ]` query.
    fn select_targets(&self, query: &str, scope: &GraphScope) -> Result<Vec<Term>, String>;
}

/// Delegate used when no query engine was configured.
pub struct UnsupportedSparql;

impl SparqlDelegate for UnsupportedSparql {
    fn evaluate(&self, _request: &SparqlRequest<'_>) -> Result<SparqlOutcome, String> {
        Err("no SPARQL evaluator is configured for sh:sparql constraints".to_string())
    }

    fn select_targets(&self, _query: &str, _scope: &GraphScope) -> Result<Vec<Term>, String> {
        Err("no SPARQL evaluator is configured for sh:target queries".to_string())
    }
}

/// Runs queries with oxigraph against the store holding the data graphs.
#[derive(Clone)]
pub struct OxigraphSparqlDelegate {
    store: Store,
}

impl OxigraphSparqlDelegate {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn run(
        &self,
        query: &str,
        scope: &GraphScope,
        this: Option<&Term>,
    ) -> Result<Vec<oxigraph::sparql::QuerySolution>, String> {
        let mut prepared = SparqlEvaluator::new()
            .parse_query(query)
            .map_err(|e| format!("SPARQL parse error: {}", e))?;
        match scope {
            GraphScope::Default => prepared
                .dataset_mut()
                .set_default_graph(vec![GraphName::DefaultGraph]),
            GraphScope::Named(name) => prepared
                .dataset_mut()
                .set_default_graph(vec![GraphName::NamedNode(name.clone())]),
            GraphScope::Union => prepared.dataset_mut().set_default_graph_as_union(),
        }
        let mut bound = prepared.on_store(&self.store);
        if let Some(this) = this {
            bound = bound.substitute_variable(Variable::new_unchecked("this"), this.clone());
        }
        match bound.execute() {
            Ok(QueryResults::Solutions(solutions)) => solutions
                .map(|s| s.map_err(|e| format!("SPARQL evaluation error: {}", e)))
                .collect(),
            Ok(_) => Err("expected a SELECT query".to_string()),
            Err(e) => Err(format!("SPARQL evaluation error: {}", e)),
        }
    }
}

impl SparqlDelegate for OxigraphSparqlDelegate {
    fn evaluate(&self, request: &SparqlRequest<'_>) -> Result<SparqlOutcome, String> {
        let query = match request.path {
            Some(path) => request.query.replace("$PATH", &path.to_sparql_path()),
            None => request.query.to_string(),
        };
        debug!(
            "Running sh:sparql for {} in {}",
            request.focus_node, request.scope
        );
        let bindings = self
            .run(&query, request.scope, Some(request.focus_node))?
            .into_iter()
            .map(|solution| SparqlBinding {
                value: solution.get("value").cloned(),
                path: solution.get("path").cloned(),
                message: match solution.get("message") {
                    Some(Term::Literal(lit)) => Some(lit.value().to_string()),
                    _ => None,
                },
            })
            .collect();
        Ok(SparqlOutcome::from_bindings(bindings))
    }

    fn select_targets(&self, query: &str, scope: &GraphScope) -> Result<Vec<Term>, String> {
        let solutions = self.run(query, scope, None)?;
        Ok(dedup(solutions.into_iter().filter_map(|solution| {
            solution.get("this").cloned()
        })))
    }
}
