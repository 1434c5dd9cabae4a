//! Finite-difference Jacobians.
//!
//! Columns are mutually independent, so they are computed in parallel with
//! rayon. Each column of a central difference costs two residual
//! evaluations; for the QRE residual a single evaluation is itself a full
//! sweep of tree traversals, which is what makes the parallelism worthwhile.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Jacobian of `f` at `x` by finite differences.
///
/// Central differences (`(f(x+h) - f(x-h)) / 2h`, error O(h²)) by default;
/// forward differences (`(f(x+h) - f(x)) / h`, error O(h)) otherwise.
pub fn jacobian<F>(f: &F, x: &DVector<f64>, h: f64, central: bool) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64> + Sync,
{
    let f0 = f(x);
    jacobian_with_steps(f, x, &f0, |_| h, central)
}

/// Jacobian with per-coordinate step `h * max(1, |x_j|)`.
pub fn jacobian_adaptive<F>(f: &F, x: &DVector<f64>, base_h: f64) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64> + Sync,
{
    let f0 = f(x);
    jacobian_with_steps(f, x, &f0, |j| base_h * x[j].abs().max(1.0), true)
}

fn jacobian_with_steps<F, H>(
    f: &F,
    x: &DVector<f64>,
    f0: &DVector<f64>,
    step: H,
    central: bool,
) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64> + Sync,
    H: Fn(usize) -> f64 + Sync,
{
    let n = x.len();
    let m = f0.len();

    let columns: Vec<DVector<f64>> = (0..n)
        .into_par_iter()
        .map(|j| {
            let h = step(j);
            let mut x_plus = x.clone();
            x_plus[j] += h;
            let f_plus = f(&x_plus);

            if central {
                let mut x_minus = x.clone();
                x_minus[j] -= h;
                let f_minus = f(&x_minus);
                (f_plus - f_minus) / (2.0 * h)
            } else {
                (f_plus - f0) / h
            }
        })
        .collect();

    let mut jac = DMatrix::zeros(m, n);
    for (j, column) in columns.iter().enumerate() {
        jac.set_column(j, column);
    }
    jac
}
