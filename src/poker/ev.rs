//! Expected value, best response, and exploitability over a game tree.
//!
//! Every recursion carries three reach factors: Player 0's, Player 1's, and
//! chance's. A terminal contributes `reach_p0 * reach_p1 * reach_chance *
//! payoff`, so the root call returns Player 0's expected payoff under the
//! profile.

use std::collections::BTreeMap;

use crate::poker::strategy::Strategy;
use crate::poker::tree::{GameNode, PokerGame};
use crate::poker::types::{Action, InfoSetId, InfoSetIndex, PlayerId, PLAYER_0, PLAYER_1};

/// Expected payoff to Player 0 when both players follow `sigma`.
pub fn compute_ev(root: &GameNode, sigma: &Strategy) -> f64 {
    ev_recursive(root, sigma, 1.0, 1.0, 1.0, None)
}

/// Expected payoff to Player 0 when both players follow `sigma`, except that
/// every node of `info_set_id` plays `action` with probability one.
pub fn compute_ev_with_override(
    root: &GameNode,
    sigma: &Strategy,
    info_set_id: &str,
    action: Action,
) -> f64 {
    ev_recursive(root, sigma, 1.0, 1.0, 1.0, Some((info_set_id, action)))
}

/// Counterfactual expected utility of playing `action` at `info_set_id`,
/// signed to the acting player.
///
/// This is the override EV: the reach-weighted payoff contribution of every
/// history passing through the overridden information set, with the
/// remainder of play following `sigma`. Payoffs are kept in Player 0's view,
/// so the value is negated when the acting player is Player 1.
pub fn expected_utility(
    root: &GameNode,
    sigma: &Strategy,
    info_set_id: &str,
    action: Action,
    acting_player: PlayerId,
) -> f64 {
    let ev = compute_ev_with_override(root, sigma, info_set_id, action);
    if acting_player == PLAYER_1 {
        -ev
    } else {
        ev
    }
}

/// Value `br_player` can achieve by playing a best response against
/// `sigma`, signed to `br_player`.
pub fn best_response_value(root: &GameNode, sigma: &Strategy, br_player: PlayerId) -> f64 {
    br_recursive(root, sigma, br_player, 1.0, 1.0)
}

/// Exploitability of a profile: the mean best-response gain of the two
/// players. Zero exactly at a Nash equilibrium, strictly positive otherwise.
pub fn compute_exploitability(root: &GameNode, sigma: &Strategy) -> f64 {
    let br0 = best_response_value(root, sigma, PLAYER_0);
    let br1 = best_response_value(root, sigma, PLAYER_1);
    (br0 + br1) / 2.0
}

/// Expected utility of every legal action at every information set, keyed by
/// id and aligned with each set's action order.
pub fn compute_all_expected_utilities(
    game: &dyn PokerGame,
    sigma: &Strategy,
    index: &InfoSetIndex,
) -> BTreeMap<InfoSetId, Vec<f64>> {
    let mut result = BTreeMap::new();

    for i in 0..index.num_info_sets() {
        let is = index.info_set(i);
        let utilities = is
            .actions
            .iter()
            .map(|&a| expected_utility(game.root(), sigma, &is.id, a, is.player))
            .collect();
        result.insert(is.id.clone(), utilities);
    }

    result
}

fn ev_recursive(
    node: &GameNode,
    sigma: &Strategy,
    reach_p0: f64,
    reach_p1: f64,
    reach_chance: f64,
    override_pair: Option<(&str, Action)>,
) -> f64 {
    match node {
        GameNode::Terminal { payoff } => reach_p0 * reach_p1 * reach_chance * payoff,

        GameNode::Chance { edges } => edges
            .iter()
            .map(|edge| {
                ev_recursive(
                    &edge.child,
                    sigma,
                    reach_p0,
                    reach_p1,
                    reach_chance * edge.probability,
                    override_pair,
                )
            })
            .sum(),

        GameNode::Player { player, info_set_id, actions, children } => {
            let action_probs = match override_pair {
                Some((id, forced)) if id == info_set_id => one_hot(actions, forced),
                _ => sigma.probs(info_set_id),
            };

            children
                .iter()
                .zip(&action_probs)
                .map(|(child, &p)| {
                    let (new_reach_p0, new_reach_p1) = if *player == PLAYER_0 {
                        (reach_p0 * p, reach_p1)
                    } else {
                        (reach_p0, reach_p1 * p)
                    };
                    ev_recursive(child, sigma, new_reach_p0, new_reach_p1, reach_chance, override_pair)
                })
                .sum()
        }
    }
}

fn one_hot(actions: &[Action], forced: Action) -> Vec<f64> {
    actions
        .iter()
        .map(|&a| if a == forced { 1.0 } else { 0.0 })
        .collect()
}

/// Best-response recursion: the responder maximizes at their own nodes; the
/// opponent's mixing and chance fold into the reach weight.
fn br_recursive(
    node: &GameNode,
    sigma: &Strategy,
    br_player: PlayerId,
    reach_opponent: f64,
    reach_chance: f64,
) -> f64 {
    match node {
        GameNode::Terminal { payoff } => {
            let signed = if br_player == PLAYER_1 { -payoff } else { *payoff };
            reach_opponent * reach_chance * signed
        }

        GameNode::Chance { edges } => edges
            .iter()
            .map(|edge| {
                br_recursive(
                    &edge.child,
                    sigma,
                    br_player,
                    reach_opponent,
                    reach_chance * edge.probability,
                )
            })
            .sum(),

        GameNode::Player { player, info_set_id, children, .. } => {
            if *player == br_player {
                children
                    .iter()
                    .map(|child| br_recursive(child, sigma, br_player, reach_opponent, reach_chance))
                    .fold(f64::NEG_INFINITY, f64::max)
            } else {
                let probs = sigma.probs(info_set_id);
                children
                    .iter()
                    .zip(&probs)
                    .map(|(child, &p)| {
                        br_recursive(child, sigma, br_player, reach_opponent * p, reach_chance)
                    })
                    .sum()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::kuhn::KuhnPoker;
    use crate::poker::types::InfoSetIndex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use nalgebra::DVector;

    fn kuhn() -> (KuhnPoker, InfoSetIndex) {
        let game = KuhnPoker::new();
        let index = InfoSetIndex::build(game.info_sets());
        (game, index)
    }

    #[test]
    fn uniform_ev_is_near_zero() {
        let (game, index) = kuhn();
        let sigma = Strategy::uniform(&index);
        let ev = compute_ev(game.root(), &sigma);
        assert!(ev.abs() < 0.2, "uniform EV {ev}");
    }

    #[test]
    fn best_response_never_loses_to_the_profile_value() {
        let (game, index) = kuhn();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..10 {
            let w = DVector::from_fn(index.total_dim(), |_, _| rng.gen_range(-2.0..2.0));
            let sigma = Strategy::from_logits(&w, &index);

            let ev = compute_ev(game.root(), &sigma);
            let br0 = best_response_value(game.root(), &sigma, PLAYER_0);
            let br1 = best_response_value(game.root(), &sigma, PLAYER_1);

            assert!(br0 >= ev - 1e-10);
            assert!(br1 >= -ev - 1e-10);
        }
    }

    #[test]
    fn exploitability_is_nonnegative() {
        let (game, index) = kuhn();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..10 {
            let w = DVector::from_fn(index.total_dim(), |_, _| rng.gen_range(-4.0..4.0));
            let sigma = Strategy::from_logits(&w, &index);
            assert!(compute_exploitability(game.root(), &sigma) >= -1e-12);
        }
    }

    #[test]
    fn exploitability_of_uniform_is_positive() {
        let (game, index) = kuhn();
        let sigma = Strategy::uniform(&index);
        assert!(compute_exploitability(game.root(), &sigma) > 0.0);
    }

    #[test]
    fn override_ev_sums_to_profile_ev() {
        // Mixing the override EVs of one info set with its own action
        // probabilities reproduces the plain EV.
        let (game, index) = kuhn();
        let mut rng = StdRng::seed_from_u64(9);
        let w = DVector::from_fn(index.total_dim(), |_, _| rng.gen_range(-1.0..1.0));
        let sigma = Strategy::from_logits(&w, &index);

        let is = index.info_set(0);
        let probs = sigma.probs(&is.id);
        let mixed: f64 = is
            .actions
            .iter()
            .zip(&probs)
            .map(|(&a, &p)| p * compute_ev_with_override(game.root(), &sigma, &is.id, a))
            .sum();

        let ev = compute_ev(game.root(), &sigma);
        assert!((mixed - ev).abs() < 1e-10, "mixed {mixed} vs ev {ev}");
    }

    #[test]
    fn expected_utility_is_signed_to_the_acting_player() {
        let (game, index) = kuhn();
        let sigma = Strategy::uniform(&index);

        // P1 holding K facing a bet: calling clearly beats folding.
        let call = expected_utility(game.root(), &sigma, "P1:K:b", Action::Call, PLAYER_1);
        let fold = expected_utility(game.root(), &sigma, "P1:K:b", Action::Fold, PLAYER_1);
        assert!(call > fold, "call {call} <= fold {fold}");
    }

    #[test]
    fn all_expected_utilities_cover_the_index() {
        let (game, index) = kuhn();
        let sigma = Strategy::uniform(&index);
        let all = compute_all_expected_utilities(&game, &sigma, &index);

        assert_eq!(all.len(), index.num_info_sets());
        for i in 0..index.num_info_sets() {
            let is = index.info_set(i);
            assert_eq!(all[&is.id].len(), is.actions.len());
        }
    }
}
