//! β-continuation: chain Newton solves along an increasing rationality
//! schedule.
//!
//! The QRE at β ≈ 0.01 is near-uniform and trivial to find, and the fixed
//! point moves smoothly in β, so each solution sits inside the basin of
//! attraction of the next solve. Every stage warm-starts from the previous
//! one, including stages that stopped at the iteration cap.

use nalgebra::DVector;

use crate::error::SolverError;
use crate::poker::qre::QreResidual;
use crate::poker::tree::PokerGame;
use crate::solver::diagnostics::IterationStats;
use crate::solver::newton::{NewtonConfig, NewtonSolver};

/// Geometric β schedule: 0.01, then doubling from 0.05 while below the
/// target, always ending exactly at the target.
pub fn beta_schedule(target_beta: f64) -> Vec<f64> {
    let mut schedule = vec![0.01];

    let mut beta = 0.05;
    while beta < target_beta {
        schedule.push(beta);
        beta *= 2.0;
    }

    schedule.push(target_beta);
    schedule
}

/// Outcome of one β stage.
#[derive(Debug, Clone)]
pub struct BetaStage {
    pub beta: f64,
    pub converged: bool,
    pub iterations: usize,
    pub final_residual: f64,
}

/// Outcome of a full continuation run.
#[derive(Debug, Clone)]
pub struct ContinuationResult {
    /// Logit vector after the final stage.
    pub x: DVector<f64>,
    pub stages: Vec<BetaStage>,
    pub total_iterations: usize,
}

/// Solve the QRE fixed point for `game` by continuation up to
/// `target_beta`, starting from uniform logits.
///
/// `on_iteration` fires after every Newton iteration with the active β, the
/// iteration stats, and the current logits.
pub fn solve_continuation<C>(
    game: &dyn PokerGame,
    config: &NewtonConfig,
    target_beta: f64,
    mut on_iteration: C,
) -> Result<ContinuationResult, SolverError>
where
    C: FnMut(f64, &IterationStats, &DVector<f64>),
{
    let schedule = beta_schedule(target_beta);
    let mut qre = QreResidual::new(game, schedule[0]);
    let solver = NewtonSolver::new(config.clone());

    let mut x = DVector::zeros(qre.dim());
    let mut stages = Vec::with_capacity(schedule.len());
    let mut total_iterations = 0;

    for beta in schedule {
        qre.set_beta(beta);

        let residual_fn = |w: &DVector<f64>| qre.residual(w);
        let result = solver.solve_with_callback(&residual_fn, x, |stats, current| {
            on_iteration(beta, stats, current)
        })?;

        total_iterations += result.trace.total_iterations;
        stages.push(BetaStage {
            beta,
            converged: result.converged,
            iterations: result.iterations,
            final_residual: result.final_residual,
        });

        // Warm start for the next stage, converged or not.
        x = result.x;
    }

    Ok(ContinuationResult {
        x,
        stages,
        total_iterations,
    })
}
