//! Counterfactual regret minimization over the shared game tree.
//!
//! Per information set the solver accumulates regrets and reach-weighted
//! strategies; regret matching turns positive regret into the current
//! strategy, and the normalized cumulative strategy is the Nash
//! approximation. CFR+ additionally floors regrets at zero after every
//! iteration, which converges noticeably faster in practice.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::poker::strategy::Strategy;
use crate::poker::tree::{GameNode, PokerGame};
use crate::poker::types::{InfoSetId, InfoSetIndex, PlayerId, PLAYER_0, PLAYER_1};

/// CFR flavor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CfrVariant {
    Vanilla,
    /// Regret matching+ (regrets floored at zero each iteration).
    #[default]
    Plus,
}

/// Regret and strategy accumulators for one information set.
#[derive(Debug, Clone)]
pub struct InfoSetData {
    pub cumulative_regret: Vec<f64>,
    pub cumulative_strategy: Vec<f64>,
}

impl InfoSetData {
    fn new(num_actions: usize) -> Self {
        Self {
            cumulative_regret: vec![0.0; num_actions],
            cumulative_strategy: vec![0.0; num_actions],
        }
    }

    /// Regret matching: positive regrets normalized, uniform when no regret
    /// is positive.
    pub fn regret_matching_strategy(&self) -> Vec<f64> {
        let positive: Vec<f64> = self.cumulative_regret.iter().map(|&r| r.max(0.0)).collect();
        let sum: f64 = positive.iter().sum();

        if sum > 0.0 {
            positive.into_iter().map(|r| r / sum).collect()
        } else {
            let n = self.cumulative_regret.len();
            vec![1.0 / n as f64; n]
        }
    }

    /// Normalized cumulative strategy, the Nash approximation.
    pub fn average_strategy(&self) -> Vec<f64> {
        let sum: f64 = self.cumulative_strategy.iter().sum();

        if sum > 0.0 {
            self.cumulative_strategy.iter().map(|&s| s / sum).collect()
        } else {
            let n = self.cumulative_strategy.len();
            vec![1.0 / n as f64; n]
        }
    }
}

/// Progress snapshot passed to the iteration callback.
#[derive(Debug, Clone, Copy)]
pub struct CfrStats {
    pub iteration: usize,
    pub exploitability: f64,
    /// Mean absolute cumulative regret per parameter.
    pub avg_regret: f64,
    pub wall_time_ms: f64,
}

/// CFR solver over a built game tree.
pub struct CfrSolver<'a> {
    game: &'a dyn PokerGame,
    index: InfoSetIndex,
    data: BTreeMap<InfoSetId, InfoSetData>,
    variant: CfrVariant,
    iterations: usize,
}

impl<'a> CfrSolver<'a> {
    pub fn new(game: &'a dyn PokerGame, variant: CfrVariant) -> Self {
        let index = InfoSetIndex::build(game.info_sets());
        let data = index
            .all_info_sets()
            .iter()
            .map(|is| (is.id.clone(), InfoSetData::new(is.actions.len())))
            .collect();

        Self {
            game,
            index,
            data,
            variant,
            iterations: 0,
        }
    }

    /// Run `iterations` full iterations (both players traversed each).
    pub fn solve(&mut self, iterations: usize) {
        self.run(iterations, None);
    }

    /// Run `iterations` iterations, reporting progress every 10th and on the
    /// last one.
    pub fn solve_with_callback<C>(&mut self, iterations: usize, mut callback: C)
    where
        C: FnMut(&CfrStats),
    {
        self.run(iterations, Some(&mut callback));
    }

    fn run(&mut self, iterations: usize, mut callback: Option<&mut dyn FnMut(&CfrStats)>) {
        let start = Instant::now();
        let game = self.game;

        for iter in 0..iterations {
            self.iterations += 1;

            for traverser in [PLAYER_0, PLAYER_1] {
                self.cfr_recursive(game.root(), traverser, 1.0, 1.0, 1.0);
            }

            if self.variant == CfrVariant::Plus {
                for data in self.data.values_mut() {
                    for regret in &mut data.cumulative_regret {
                        if *regret < 0.0 {
                            *regret = 0.0;
                        }
                    }
                }
            }

            if let Some(callback) = callback.as_deref_mut() {
                if iter % 10 == 0 || iter == iterations - 1 {
                    let stats = CfrStats {
                        iteration: self.iterations,
                        exploitability: self.exploitability(),
                        avg_regret: self.average_absolute_regret(),
                        wall_time_ms: start.elapsed().as_secs_f64() * 1000.0,
                    };
                    callback(&stats);
                }
            }
        }
    }

    /// Current strategy from regret matching, encoded as logits.
    pub fn current_strategy(&self) -> Strategy {
        self.strategy_from(|data| data.regret_matching_strategy())
    }

    /// Average strategy, the Nash approximation.
    pub fn average_strategy(&self) -> Strategy {
        self.strategy_from(|data| data.average_strategy())
    }

    /// Exploitability of the current average strategy.
    pub fn exploitability(&self) -> f64 {
        let avg = self.average_strategy();
        crate::poker::ev::compute_exploitability(self.game.root(), &avg)
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Accumulated regret/strategy data, keyed by info set id.
    pub fn regret_data(&self) -> &BTreeMap<InfoSetId, InfoSetData> {
        &self.data
    }

    fn strategy_from<G>(&self, probs_of: G) -> Strategy
    where
        G: Fn(&InfoSetData) -> Vec<f64>,
    {
        let mut strategy = Strategy::default();

        for is in self.index.all_info_sets() {
            let probs = probs_of(&self.data[&is.id]);
            // Probabilities to logits; softmax inverts the log up to the
            // usual additive constant.
            let logits = probs.iter().map(|&p| p.max(1e-10).ln()).collect();
            strategy.set_logits(&is.id, logits, is.actions.clone());
        }

        strategy
    }

    fn average_absolute_regret(&self) -> f64 {
        let mut total = 0.0;
        let mut count = 0;
        for data in self.data.values() {
            total += data.cumulative_regret.iter().map(|r| r.abs()).sum::<f64>();
            count += data.cumulative_regret.len();
        }
        total / count.max(1) as f64
    }

    /// One traversal for `traverser`. Returns the node value signed to the
    /// traverser; regrets update only at the traverser's nodes, weighted by
    /// counterfactual reach (opponent times chance).
    fn cfr_recursive(
        &mut self,
        node: &GameNode,
        traverser: PlayerId,
        reach_p0: f64,
        reach_p1: f64,
        reach_chance: f64,
    ) -> f64 {
        match node {
            GameNode::Terminal { payoff } => {
                if traverser == PLAYER_1 {
                    -payoff
                } else {
                    *payoff
                }
            }

            GameNode::Chance { edges } => edges
                .iter()
                .map(|edge| {
                    edge.probability
                        * self.cfr_recursive(
                            &edge.child,
                            traverser,
                            reach_p0,
                            reach_p1,
                            reach_chance * edge.probability,
                        )
                })
                .sum(),

            GameNode::Player { player, info_set_id, children, .. } => {
                let strategy = self.data[info_set_id].regret_matching_strategy();

                let action_values: Vec<f64> = children
                    .iter()
                    .zip(&strategy)
                    .map(|(child, &p)| {
                        let (new_reach_p0, new_reach_p1) = if *player == PLAYER_0 {
                            (reach_p0 * p, reach_p1)
                        } else {
                            (reach_p0, reach_p1 * p)
                        };
                        self.cfr_recursive(child, traverser, new_reach_p0, new_reach_p1, reach_chance)
                    })
                    .collect();

                let node_value: f64 = strategy
                    .iter()
                    .zip(&action_values)
                    .map(|(&p, &v)| p * v)
                    .sum();

                let player_reach = if *player == PLAYER_0 { reach_p0 } else { reach_p1 };
                let cf_reach = if traverser == PLAYER_0 { reach_p1 } else { reach_p0 };

                let data = self.data.get_mut(info_set_id).expect("info set indexed at build");
                if *player == traverser {
                    for (a, &value) in action_values.iter().enumerate() {
                        data.cumulative_regret[a] += cf_reach * reach_chance * (value - node_value);
                    }
                }
                for (a, &p) in strategy.iter().enumerate() {
                    data.cumulative_strategy[a] += player_reach * p;
                }

                node_value
            }
        }
    }
}
