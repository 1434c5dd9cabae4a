//! Damped Newton solver for square nonlinear systems F(x) = 0.
//!
//! Each step solves the Levenberg-regularized normal equations
//! `(J'J + lambda I) d = -J' r` by full-pivot LU, then applies Armijo
//! backtracking along `d`. The regularization absorbs the rank deficiency of
//! softmax-parameterized residuals, and `lambda` adapts to progress: down
//! after a residual reduction, up (with the step still accepted) otherwise.

use nalgebra::{DMatrix, DVector};

use crate::error::SolverError;
use crate::solver::diagnostics::{IterationStats, SolverTrace};
use crate::solver::finite_diff::jacobian;
use crate::solver::line_search::armijo_backtrack;

/// Newton solver configuration.
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    /// Convergence tolerance on the residual L2 norm.
    pub tol: f64,
    /// Maximum iterations.
    pub max_iters: usize,
    /// Finite-difference step size.
    pub fd_step: f64,
    /// Central (vs forward) differences.
    pub central_diff: bool,
    /// Initial Levenberg regularization.
    pub lambda_init: f64,
    /// Upper bound on the regularization.
    pub lambda_max: f64,
    /// Up/down factor for the regularization.
    pub lambda_factor: f64,
    /// Armijo sufficient-decrease parameter.
    pub armijo_c: f64,
    /// Backtracking shrink factor.
    pub armijo_rho: f64,
    /// Armijo search (else plain merit-decrease backtracking).
    pub use_line_search: bool,
    /// Print per-iteration progress.
    pub verbose: bool,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            max_iters: 50,
            fd_step: 1e-6,
            central_diff: true,
            lambda_init: 1e-6,
            lambda_max: 1e6,
            lambda_factor: 10.0,
            armijo_c: 1e-4,
            armijo_rho: 0.5,
            use_line_search: true,
            verbose: false,
        }
    }
}

/// Result of a Newton solve. A singular Jacobian or hitting the iteration
/// cap is reported here (with the best point found), not as an error.
#[derive(Debug, Clone)]
pub struct NewtonResult {
    pub x: DVector<f64>,
    pub trace: SolverTrace,
    pub converged: bool,
    pub iterations: usize,
    pub final_residual: f64,
}

/// Damped Newton driver.
pub struct NewtonSolver {
    config: NewtonConfig,
}

impl NewtonSolver {
    pub fn new(config: NewtonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut NewtonConfig {
        &mut self.config
    }

    /// Solve `F(x) = 0` starting from `x0`.
    pub fn solve<F>(&self, f: &F, x0: DVector<f64>) -> Result<NewtonResult, SolverError>
    where
        F: Fn(&DVector<f64>) -> DVector<f64> + Sync,
    {
        self.solve_with_callback(f, x0, |_, _| {})
    }

    /// Solve `F(x) = 0`, invoking `callback` after every iteration with the
    /// iteration stats and the current point. The callback may do arbitrary
    /// work (the telemetry sink blocks on file I/O here).
    pub fn solve_with_callback<F, C>(
        &self,
        f: &F,
        x0: DVector<f64>,
        mut callback: C,
    ) -> Result<NewtonResult, SolverError>
    where
        F: Fn(&DVector<f64>) -> DVector<f64> + Sync,
        C: FnMut(&IterationStats, &DVector<f64>),
    {
        let cfg = &self.config;
        let mut x = x0;
        let n = x.len();
        let mut lambda = cfg.lambda_init;
        let mut trace = SolverTrace::default();

        let mut r = f(&x);
        if r.len() != n {
            return Err(SolverError::DimensionMismatch {
                input: n,
                output: r.len(),
            });
        }
        let mut residual_norm = r.norm();

        for iter in 0..cfg.max_iters {
            let mut stats = IterationStats {
                iteration: iter,
                residual_norm,
                lambda,
                ..Default::default()
            };

            if residual_norm < cfg.tol {
                stats.converged = true;
                stats.status = "Converged".to_string();
                trace.add_iteration(stats.clone());
                callback(&stats, &x);

                trace.success = true;
                trace.termination_reason = "Converged: residual below tolerance".to_string();
                return Ok(NewtonResult {
                    x,
                    trace,
                    converged: true,
                    iterations: iter,
                    final_residual: residual_norm,
                });
            }

            let jac = jacobian(f, &x, cfg.fd_step, cfg.central_diff);
            stats.jacobian_cond = condition_number(&jac);

            // Levenberg-regularized normal equations, escalating lambda
            // until the system is solvable.
            let jtj = jac.transpose() * &jac;
            let jtr = jac.transpose() * &r;

            let mut direction = None;
            for _ in 0..10 {
                let a = &jtj + DMatrix::identity(n, n) * lambda;
                if let Some(d) = a.full_piv_lu().solve(&(-&jtr)) {
                    direction = Some(d);
                    break;
                }
                lambda *= cfg.lambda_factor;
            }

            let Some(d) = direction else {
                stats.status = "Failed: Jacobian singular".to_string();
                trace.add_iteration(stats.clone());
                callback(&stats, &x);

                trace.success = false;
                trace.termination_reason = "Failed: Jacobian singular".to_string();
                return Ok(NewtonResult {
                    x,
                    trace,
                    converged: false,
                    iterations: iter,
                    final_residual: residual_norm,
                });
            };

            stats.step_norm = d.norm();

            let mut alpha = 1.0;
            if cfg.use_line_search {
                let ls = armijo_backtrack(f, &x, &d, &jac, cfg.armijo_c, cfg.armijo_rho, 20);
                alpha = ls.alpha;
            }

            let x_new = &x + &d * alpha;
            let r_new = f(&x_new);
            let new_residual_norm = r_new.norm();

            if cfg.use_line_search {
                if new_residual_norm < residual_norm {
                    lambda = (lambda / cfg.lambda_factor).max(cfg.lambda_init);
                } else {
                    lambda = (lambda * cfg.lambda_factor).min(cfg.lambda_max);
                }
            }

            stats.alpha = alpha;
            stats.status = "Iteration complete".to_string();

            x = x_new;
            r = r_new;
            residual_norm = new_residual_norm;

            trace.add_iteration(stats.clone());
            callback(&stats, &x);

            if cfg.verbose {
                println!(
                    "iter {iter:3}: ||r|| = {residual_norm:.6e}, ||d|| = {:.6e}, alpha = {alpha:.4}, lambda = {lambda:.2e}",
                    stats.step_norm
                );
            }
        }

        trace.success = false;
        trace.termination_reason = "Max iterations reached".to_string();
        Ok(NewtonResult {
            x,
            trace,
            converged: false,
            iterations: cfg.max_iters,
            final_residual: residual_norm,
        })
    }
}

/// Condition number estimate from the singular values of `jac`.
fn condition_number(jac: &DMatrix<f64>) -> f64 {
    let singular_values = jac.clone().svd(false, false).singular_values;
    let max = singular_values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = singular_values.iter().cloned().fold(f64::INFINITY, f64::min);
    if min > 0.0 {
        max / min
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver(tol: f64, max_iters: usize) -> NewtonSolver {
        NewtonSolver::new(NewtonConfig {
            tol,
            max_iters,
            ..Default::default()
        })
    }

    #[test]
    fn converges_on_linear_system() {
        // F(x) = (x0 - 1, x1 - 2), root (1, 2).
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0] - 1.0, x[1] - 2.0]);

        let result = solver(1e-10, 10).solve(&f, DVector::zeros(2)).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 1.0).abs() < 1e-8);
        assert!((result.x[1] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn converges_on_rosenbrock_like_system() {
        // F(x, y) = (10(y - x^2), 1 - x), root (1, 1).
        let f = |x: &DVector<f64>| {
            DVector::from_vec(vec![10.0 * (x[1] - x[0] * x[0]), 1.0 - x[0]])
        };

        let result = solver(1e-10, 50)
            .solve(&f, DVector::from_vec(vec![-1.0, 1.0]))
            .unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 1.0).abs() < 1e-6);
        assert!((result.x[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn quadratic_converges_to_the_nearer_root() {
        // F(x) = x^2 - 4 from x = 1 reaches the positive root.
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] - 4.0]);

        let result = solver(1e-10, 50)
            .solve(&f, DVector::from_vec(vec![1.0]))
            .unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn reports_non_convergence_when_there_is_no_root() {
        // exp(x) never vanishes.
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0].exp()]);

        let result = solver(1e-10, 10)
            .solve(&f, DVector::from_vec(vec![0.0]))
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 10);
        assert_eq!(result.trace.iterations.len(), 10);
        assert!(!result.trace.success);
    }

    #[test]
    fn rejects_non_square_systems() {
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0], x[1], x[0] + x[1]]);

        let err = solver(1e-10, 10).solve(&f, DVector::zeros(2)).unwrap_err();
        assert!(matches!(
            err,
            SolverError::DimensionMismatch { input: 2, output: 3 }
        ));
    }

    #[test]
    fn trace_records_every_iteration_and_residual_decreases() {
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0] - 1.0, x[1] - 2.0]);

        let result = solver(1e-10, 10).solve(&f, DVector::zeros(2)).unwrap();

        assert!(!result.trace.iterations.is_empty());
        assert!(result.trace.success);
        let first = result.trace.iterations.first().unwrap().residual_norm;
        let last = result.trace.iterations.last().unwrap().residual_norm;
        assert!(last <= first);
    }

    #[test]
    fn callback_sees_every_iteration() {
        let f = |x: &DVector<f64>| DVector::from_vec(vec![x[0] - 1.0]);

        let mut seen = Vec::new();
        let result = solver(1e-12, 20)
            .solve_with_callback(&f, DVector::zeros(1), |stats, x| {
                seen.push((stats.iteration, x[0]));
            })
            .unwrap();

        assert_eq!(seen.len(), result.trace.iterations.len());
        assert!((seen.last().unwrap().1 - 1.0).abs() < 1e-10);
    }

    #[test]
    fn three_dimensional_linear_system() {
        let f = |x: &DVector<f64>| {
            DVector::from_vec(vec![x[0] - 1.0, x[1] - 2.0, x[2] - 3.0])
        };

        let result = solver(1e-10, 50)
            .solve(&f, DVector::from_element(3, 10.0))
            .unwrap();

        assert!(result.converged);
        for (i, target) in [1.0, 2.0, 3.0].iter().enumerate() {
            assert!((result.x[i] - target).abs() < 1e-8);
        }
    }
}
