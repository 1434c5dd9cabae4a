//! Quantal response equilibrium residual.
//!
//! A β-QRE is a fixed point of the logit best response,
//!
//! ```text
//! sigma = LogitBR_beta(sigma),
//! LogitBR_beta(I, a) = exp(beta * EU(I, a)) / sum_b exp(beta * EU(I, b)),
//! ```
//!
//! so the residual `R(w) = sigma(w) - LogitBR_beta(sigma(w))` vanishes
//! exactly at the equilibrium. `w` are unconstrained logits; as β grows the
//! fixed point follows the logit path toward a Nash equilibrium, and as
//! β → 0 it collapses to uniform play.

use nalgebra::DVector;

use crate::poker::ev::compute_all_expected_utilities;
use crate::poker::strategy::{stable_softmax, Strategy};
use crate::poker::tree::PokerGame;
use crate::poker::types::InfoSetIndex;

/// The residual operator `R(w) = sigma(w) - LogitBR_beta(sigma(w))` over the
/// flat parameter layout of one game.
pub struct QreResidual<'a> {
    game: &'a dyn PokerGame,
    index: InfoSetIndex,
    beta: f64,
}

impl<'a> QreResidual<'a> {
    pub fn new(game: &'a dyn PokerGame, beta: f64) -> Self {
        let index = InfoSetIndex::build(game.info_sets());
        Self { game, index, beta }
    }

    /// Rationality parameter β.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn set_beta(&mut self, beta: f64) {
        self.beta = beta;
    }

    /// Dimension of the flat parameter vector.
    pub fn dim(&self) -> usize {
        self.index.total_dim()
    }

    pub fn index(&self) -> &InfoSetIndex {
        &self.index
    }

    pub fn game(&self) -> &dyn PokerGame {
        self.game
    }

    /// Logit best response to `sigma`, as a flat probability vector.
    ///
    /// Per information set, the β-scaled expected utilities go through a
    /// stable softmax; utilities are counterfactual (reach-weighted) and
    /// signed to the acting player.
    pub fn logit_best_response(&self, sigma: &Strategy) -> DVector<f64> {
        let all_eu = compute_all_expected_utilities(self.game, sigma, &self.index);

        let mut br = DVector::zeros(self.index.total_dim());
        for i in 0..self.index.num_info_sets() {
            let is = self.index.info_set(i);
            let start = self.index.start(i);

            let scaled: Vec<f64> = all_eu[&is.id].iter().map(|&eu| self.beta * eu).collect();
            let probs = stable_softmax(&scaled);
            for (a, &p) in probs.iter().enumerate() {
                br[start + a] = p;
            }
        }

        br
    }

    /// Evaluate the residual at the logit vector `w`.
    pub fn residual(&self, w: &DVector<f64>) -> DVector<f64> {
        let sigma = Strategy::from_logits(w, &self.index);
        let br = self.logit_best_response(&sigma);

        let mut sigma_flat = DVector::zeros(self.index.total_dim());
        for i in 0..self.index.num_info_sets() {
            let is = self.index.info_set(i);
            let start = self.index.start(i);
            let probs = sigma.probs(&is.id);
            for (a, &p) in probs.iter().enumerate() {
                sigma_flat[start + a] = p;
            }
        }

        sigma_flat - br
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::kuhn::KuhnPoker;

    fn entropy(probs: &[f64]) -> f64 {
        probs
            .iter()
            .filter(|&&p| p > 1e-12)
            .map(|&p| -p * p.ln())
            .sum()
    }

    #[test]
    fn residual_has_the_parameter_dimension() {
        let game = KuhnPoker::new();
        let qre = QreResidual::new(&game, 1.0);

        assert_eq!(qre.dim(), 24);
        let w = DVector::zeros(qre.dim());
        assert_eq!(qre.residual(&w).len(), qre.dim());
    }

    #[test]
    fn near_zero_beta_makes_uniform_a_near_fixed_point() {
        let game = KuhnPoker::new();
        let qre = QreResidual::new(&game, 1e-3);

        let w = DVector::zeros(qre.dim());
        let norm = qre.residual(&w).norm();
        assert!(norm < 0.1, "residual norm {norm}");
    }

    #[test]
    fn best_response_rows_are_distributions() {
        let game = KuhnPoker::new();
        let qre = QreResidual::new(&game, 2.5);
        let sigma = Strategy::uniform(qre.index());
        let br = qre.logit_best_response(&sigma);

        for i in 0..qre.index().num_info_sets() {
            let is = qre.index().info_set(i);
            let start = qre.index().start(i);
            let row: Vec<f64> = (0..is.actions.len()).map(|a| br[start + a]).collect();
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-10);
            assert!(row.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn entropy_of_best_response_shrinks_as_beta_grows() {
        let game = KuhnPoker::new();
        let mut previous: Option<Vec<f64>> = None;

        for beta in [0.1, 1.0, 10.0, 100.0] {
            let qre = QreResidual::new(&game, beta);
            let sigma = Strategy::uniform(qre.index());
            let br = qre.logit_best_response(&sigma);

            let entropies: Vec<f64> = (0..qre.index().num_info_sets())
                .map(|i| {
                    let is = qre.index().info_set(i);
                    let start = qre.index().start(i);
                    let row: Vec<f64> =
                        (0..is.actions.len()).map(|a| br[start + a]).collect();
                    entropy(&row)
                })
                .collect();

            if let Some(prev) = previous {
                for (h_now, h_prev) in entropies.iter().zip(&prev) {
                    assert!(*h_now <= h_prev + 1e-9, "entropy rose: {h_prev} -> {h_now}");
                }
            }
            previous = Some(entropies);
        }
    }
}
