//! Command-line QRE solver.
//!
//! Builds the requested game, runs Newton with β-continuation, streams
//! per-iteration telemetry to a JSON file, and prints the final strategy.

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use quantal::poker::{
    build_game, compute_all_expected_utilities, compute_ev, compute_exploitability,
    compute_tree_stats, PokerGame, QreResidual, Strategy,
};
use quantal::solver::{solve_continuation, NewtonConfig};
use quantal::telemetry::{IterationSnapshot, TelemetrySink};

#[derive(Parser)]
#[command(name = "quantal")]
#[command(about = "Newton-based QRE solver for Kuhn and Leduc poker")]
struct Args {
    /// Game to solve: kuhn or leduc.
    #[arg(long, default_value = "kuhn")]
    game: String,

    /// Target rationality parameter.
    #[arg(long, default_value_t = 10.0)]
    beta: f64,

    /// Residual tolerance for convergence.
    #[arg(long, default_value_t = 1e-8)]
    tol: f64,

    /// Maximum Newton iterations per beta.
    #[arg(long = "max-iters", default_value_t = 50)]
    max_iters: usize,

    /// Output JSON file for visualization.
    #[arg(long, default_value = "viz/solver_output.json")]
    output: PathBuf,

    /// Print iteration details.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let game = build_game(&args.game)?;
    println!("Game: {}", game.name());

    let stats = compute_tree_stats(game.root());
    println!("Tree nodes: {}", stats.total_nodes);
    println!("  - Chance: {}", stats.chance_nodes);
    println!("  - Player: {}", stats.player_nodes);
    println!("  - Terminal: {}", stats.terminal_nodes);

    let qre = QreResidual::new(game.as_ref(), args.beta);
    let index = qre.index();
    println!("Information sets: {}", index.num_info_sets());
    println!("Strategy dimensions: {}", index.total_dim());
    println!();

    let mut telemetry = TelemetrySink::new(&args.output)?;
    println!("Writing telemetry to: {}", args.output.display());
    println!();

    let config = NewtonConfig {
        tol: args.tol,
        max_iters: args.max_iters,
        verbose: args.verbose,
        ..Default::default()
    };

    let start = Instant::now();
    let mut telemetry_error: Option<quantal::SolverError> = None;

    let result = solve_continuation(game.as_ref(), &config, args.beta, |beta, stats, current| {
        let sigma = Strategy::from_logits(current, index);
        let exploit = compute_exploitability(game.root(), &sigma);
        let ev = compute_ev(game.root(), &sigma);
        let action_evs = compute_all_expected_utilities(game.as_ref(), &sigma, index);

        if args.verbose {
            println!(
                "  iter {}: residual={:.3e}, exploit={:.3e}",
                stats.iteration, stats.residual_norm, exploit
            );
        }

        let snapshot = IterationSnapshot::new(
            stats, beta, &sigma, index, &action_evs, game.name(), exploit, ev,
        );
        if let Err(e) = telemetry.log_iteration(snapshot.to_value()) {
            telemetry_error.get_or_insert(e);
        }
    })?;

    if let Some(e) = telemetry_error {
        return Err(e.into());
    }

    for stage in &result.stages {
        println!(
            "beta {:>7.2}: {} in {} iterations, residual = {:.3e}",
            stage.beta,
            if stage.converged { "converged" } else { "max iters" },
            stage.iterations,
            stage.final_residual
        );
    }

    let elapsed = start.elapsed();
    let final_sigma = Strategy::from_logits(&result.x, index);
    let final_exploit = compute_exploitability(game.root(), &final_sigma);
    let final_ev = compute_ev(game.root(), &final_sigma);

    println!();
    println!("Total iterations: {}", result.total_iterations);
    println!("Time: {} ms", elapsed.as_millis());
    println!("Final exploitability: {final_exploit:.6e}");
    println!("Expected value (P0): {final_ev:.6}");
    println!();

    println!("Final strategy:");
    for i in 0..index.num_info_sets() {
        let is = index.info_set(i);
        let probs = final_sigma.probs(&is.id);
        println!("{}:", is.id);
        for (action, p) in is.actions.iter().zip(&probs) {
            println!("  {}: {p:.4}", action.name());
        }
    }

    telemetry.finish(final_exploit, result.total_iterations)?;
    println!();
    println!("Visualization data written to: {}", args.output.display());

    Ok(())
}
