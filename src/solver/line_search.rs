//! Backtracking line searches on the merit function ½‖F(x)‖².

use nalgebra::{DMatrix, DVector};

/// Outcome of a line search.
#[derive(Debug, Clone, Copy)]
pub struct LineSearchResult {
    /// Accepted step size (0 when the direction was not a descent
    /// direction).
    pub alpha: f64,
    /// Merit value at `x + alpha * d`.
    pub merit: f64,
    /// Residual evaluations spent.
    pub evaluations: usize,
    pub success: bool,
}

/// Merit function `phi(x) = 0.5 * ||F(x)||^2`.
pub fn merit<F>(f: &F, x: &DVector<f64>) -> f64
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    0.5 * f(x).norm_squared()
}

/// Armijo backtracking: accept the first `alpha` in {1, rho, rho², ...} with
///
/// ```text
/// phi(x + alpha d) <= phi(x) + c * alpha * F(x)' J d
/// ```
///
/// The directional derivative `F' J d` must be negative; otherwise the step
/// is reported as not a descent direction with `alpha = 0`, and the Newton
/// driver raises regularization instead.
pub fn armijo_backtrack<F>(
    f: &F,
    x: &DVector<f64>,
    d: &DVector<f64>,
    jac: &DMatrix<f64>,
    c: f64,
    rho: f64,
    max_iters: usize,
) -> LineSearchResult
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let r0 = f(x);
    let phi0 = 0.5 * r0.norm_squared();
    let mut evaluations = 1;

    let dphi0 = r0.dot(&(jac * d));
    if dphi0 >= 0.0 {
        return LineSearchResult {
            alpha: 0.0,
            merit: phi0,
            evaluations,
            success: false,
        };
    }

    let mut alpha = 1.0;
    for _ in 0..max_iters {
        let phi_new = 0.5 * f(&(x + d * alpha)).norm_squared();
        evaluations += 1;

        if phi_new <= phi0 + c * alpha * dphi0 {
            return LineSearchResult {
                alpha,
                merit: phi_new,
                evaluations,
                success: true,
            };
        }
        alpha *= rho;
    }

    let merit = 0.5 * f(&(x + d * alpha)).norm_squared();
    LineSearchResult {
        alpha,
        merit,
        evaluations: evaluations + 1,
        success: false,
    }
}

/// Plain backtracking fallback: accept the first step that lowers the merit
/// at all, with no slope condition.
pub fn simple_backtrack<F>(
    f: &F,
    x: &DVector<f64>,
    d: &DVector<f64>,
    rho: f64,
    max_iters: usize,
) -> LineSearchResult
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let phi0 = merit(f, x);
    let mut evaluations = 1;

    let mut alpha = 1.0;
    for _ in 0..max_iters {
        let phi_new = merit(f, &(x + d * alpha));
        evaluations += 1;

        if phi_new < phi0 {
            return LineSearchResult {
                alpha,
                merit: phi_new,
                evaluations,
                success: true,
            };
        }
        alpha *= rho;
    }

    let merit = merit(f, &(x + d * alpha));
    LineSearchResult {
        alpha,
        merit,
        evaluations: evaluations + 1,
        success: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::finite_diff::jacobian;

    fn residual(x: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![x[0] * x[0] - 1.0])
    }

    #[test]
    fn armijo_finds_a_descent_step() {
        let x = DVector::from_vec(vec![3.0]);
        let jac = jacobian(&residual, &x, 1e-6, true);
        let r = residual(&x);

        // Newton direction for the 1-d system.
        let d = DVector::from_vec(vec![-r[0] / jac[(0, 0)]]);

        let result = armijo_backtrack(&residual, &x, &d, &jac, 1e-4, 0.5, 20);
        assert!(result.success);
        assert!(result.alpha > 0.0 && result.alpha <= 1.0);
        assert!(result.merit < 0.5 * r.norm_squared());
    }

    #[test]
    fn ascent_direction_is_rejected() {
        let x = DVector::from_vec(vec![3.0]);
        let jac = jacobian(&residual, &x, 1e-6, true);
        let d = DVector::from_vec(vec![1.0]); // uphill

        let result = armijo_backtrack(&residual, &x, &d, &jac, 1e-4, 0.5, 20);
        assert!(!result.success);
        assert_eq!(result.alpha, 0.0);
    }

    #[test]
    fn simple_backtrack_only_needs_merit_decrease() {
        let x = DVector::from_vec(vec![3.0]);
        let d = DVector::from_vec(vec![-1.0]);

        let result = simple_backtrack(&residual, &x, &d, 0.5, 20);
        assert!(result.success);
        assert!(result.merit < merit(&residual, &x));
    }
}
