//! Quantal response equilibrium solver for small extensive-form poker games.
//!
//! This library provides:
//! - [`poker`]: game trees, information sets, and the Kuhn/Leduc builders
//! - [`poker::Strategy`]: softmax strategies over unconstrained logits
//! - [`poker::QreResidual`]: the fixed-point residual `sigma - LogitBR_beta(sigma)`
//! - [`solver`]: a damped Newton driver with finite-difference Jacobians,
//!   the β-continuation scheme, and a CFR/CFR+ alternative
//! - [`telemetry`]: a polled JSON sink for live visualization
//!
//! # Example
//!
//! ```no_run
//! use quantal::poker::KuhnPoker;
//! use quantal::solver::{solve_continuation, NewtonConfig};
//!
//! let game = KuhnPoker::new();
//! let config = NewtonConfig::default();
//! let result = solve_continuation(&game, &config, 10.0, |_, _, _| {}).unwrap();
//! println!("solved in {} iterations", result.total_iterations);
//! ```

pub mod error;
pub mod poker;
pub mod solver;
pub mod telemetry;

pub use error::SolverError;
pub use poker::{build_game, KuhnPoker, LeducPoker, PokerGame, QreResidual, Strategy};
pub use solver::{CfrSolver, CfrVariant, NewtonConfig, NewtonSolver};
