//! Per-iteration statistics and the full trace of a Newton solve.

use serde::Serialize;

/// Statistics for a single Newton iteration.
#[derive(Debug, Clone, Serialize)]
pub struct IterationStats {
    pub iteration: usize,
    pub residual_norm: f64,
    pub step_norm: f64,
    /// Line search step size.
    pub alpha: f64,
    /// Levenberg regularization parameter.
    pub lambda: f64,
    /// Condition number estimate of the Jacobian.
    pub jacobian_cond: f64,
    pub converged: bool,
    /// Outcome of the iteration.
    pub status: String,
}

impl Default for IterationStats {
    fn default() -> Self {
        Self {
            iteration: 0,
            residual_norm: 0.0,
            step_norm: 0.0,
            alpha: 1.0,
            lambda: 0.0,
            jacobian_cond: 0.0,
            converged: false,
            status: String::new(),
        }
    }
}

/// Full record of a solver run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SolverTrace {
    pub iterations: Vec<IterationStats>,
    pub success: bool,
    pub total_iterations: usize,
    pub final_residual: f64,
    pub termination_reason: String,
}

impl SolverTrace {
    pub fn add_iteration(&mut self, stats: IterationStats) {
        self.final_residual = stats.residual_norm;
        self.iterations.push(stats);
        self.total_iterations = self.iterations.len();
    }
}
