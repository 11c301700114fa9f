use crate::types::Severity;

/// Default bound on nested shape references. Evaluation recurses on the
/// thread stack, and rayon worker stacks are small.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

/// Knobs for a validation run. Passed explicitly to the orchestrator; nothing
/// here is process-global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Results below this severity are dropped from the report.
    pub min_severity: Severity,
    /// Stop checking a focus node's remaining constraints after its first violation.
    pub stop_on_first_violation: bool,
    /// Maximum nesting of shape references. Exceeding it yields an anomaly result
    /// even when the chain is acyclic. `None` relies on the cycle guard alone.
    pub max_recursion_depth: Option<usize>,
    /// Validate independent data graphs on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            stop_on_first_violation: false,
            max_recursion_depth: Some(DEFAULT_MAX_RECURSION_DEPTH),
            parallel: true,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn with_stop_on_first_violation(mut self, enabled: bool) -> Self {
        self.stop_on_first_violation = enabled;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: Option<usize>) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}
