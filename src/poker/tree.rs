//! Game tree representation: recursive nodes with owned children.
//!
//! A tree is built once by a game constructor and is immutable afterwards,
//! so read-only traversals can be shared freely across threads.

use crate::error::SolverError;
use crate::poker::types::{Action, Card, InfoSet, InfoSetId, PlayerId};

/// Outcome label on a chance edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanceOutcome {
    /// Both private cards dealt at the root.
    PrivateDeal { p0: Card, p1: Card },
    /// A single public card dealt between rounds.
    PublicDeal { card: Card },
}

/// An edge out of a chance node: the dealt outcome, its probability, and the
/// subtree it leads to.
#[derive(Debug, Clone)]
pub struct ChanceEdge {
    pub outcome: ChanceOutcome,
    pub probability: f64,
    pub child: GameNode,
}

/// A node in the game tree.
///
/// Player nodes keep their children in the same order as `actions`, so the
/// i-th child is reached by playing `actions[i]`.
#[derive(Debug, Clone)]
pub enum GameNode {
    /// Nature deals cards.
    Chance { edges: Vec<ChanceEdge> },

    /// A player makes a decision.
    Player {
        player: PlayerId,
        info_set_id: InfoSetId,
        actions: Vec<Action>,
        children: Vec<GameNode>,
    },

    /// Game over. `payoff` is Player 0's signed chip gain; Player 1's payoff
    /// is its negation.
    Terminal { payoff: f64 },
}

impl GameNode {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameNode::Terminal { .. })
    }

    pub fn is_chance(&self) -> bool {
        matches!(self, GameNode::Chance { .. })
    }

    pub fn is_player(&self) -> bool {
        matches!(self, GameNode::Player { .. })
    }

    /// Child reached by the given action, if this is a player node offering
    /// that action.
    pub fn child_for_action(&self, action: Action) -> Option<&GameNode> {
        match self {
            GameNode::Player { actions, children, .. } => actions
                .iter()
                .position(|&a| a == action)
                .map(|i| &children[i]),
            _ => None,
        }
    }

    /// Preorder traversal over the subtree.
    pub fn visit<F: FnMut(&GameNode, usize)>(&self, visitor: &mut F) {
        self.visit_depth(visitor, 0);
    }

    fn visit_depth<F: FnMut(&GameNode, usize)>(&self, visitor: &mut F, depth: usize) {
        visitor(self, depth);
        match self {
            GameNode::Chance { edges } => {
                for edge in edges {
                    edge.child.visit_depth(visitor, depth + 1);
                }
            }
            GameNode::Player { children, .. } => {
                for child in children {
                    child.visit_depth(visitor, depth + 1);
                }
            }
            GameNode::Terminal { .. } => {}
        }
    }
}

/// Node counts and depth for a built tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub chance_nodes: usize,
    pub player_nodes: usize,
    pub terminal_nodes: usize,
    pub max_depth: usize,
}

/// Count nodes of each kind in the subtree.
pub fn compute_tree_stats(root: &GameNode) -> TreeStats {
    let mut stats = TreeStats::default();
    root.visit(&mut |node, depth| {
        stats.total_nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);
        match node {
            GameNode::Chance { .. } => stats.chance_nodes += 1,
            GameNode::Player { .. } => stats.player_nodes += 1,
            GameNode::Terminal { .. } => stats.terminal_nodes += 1,
        }
    });
    stats
}

/// A two-player zero-sum poker game with a fully built tree.
pub trait PokerGame: Send + Sync {
    /// Root of the game tree.
    fn root(&self) -> &GameNode;

    /// All information sets with their legal actions, sorted by id.
    fn info_sets(&self) -> Vec<InfoSet>;

    /// Display name.
    fn name(&self) -> &'static str;

    /// Number of cards in the deck.
    fn deck_size(&self) -> usize;
}

/// Build a game by name. Recognized names: `kuhn`, `leduc`.
pub fn build_game(name: &str) -> Result<Box<dyn PokerGame>, SolverError> {
    match name {
        "kuhn" => Ok(Box::new(crate::poker::kuhn::KuhnPoker::new())),
        "leduc" => Ok(Box::new(crate::poker::leduc::LeducPoker::new())),
        other => Err(SolverError::InvalidConfiguration(format!(
            "unknown game: {other}"
        ))),
    }
}

/// Collect the distinct information sets of a built tree, sorted by id.
///
/// Verifies along the way that every node sharing an id also shares the same
/// action list, which is what makes an information set well-defined.
pub(crate) fn collect_info_sets(root: &GameNode) -> Vec<InfoSet> {
    use std::collections::BTreeMap;

    let mut sets: BTreeMap<InfoSetId, InfoSet> = BTreeMap::new();
    root.visit(&mut |node, _| {
        if let GameNode::Player { player, info_set_id, actions, .. } = node {
            match sets.get(info_set_id) {
                Some(existing) => debug_assert_eq!(
                    &existing.actions, actions,
                    "conflicting action lists for {info_set_id}"
                ),
                None => {
                    sets.insert(
                        info_set_id.clone(),
                        InfoSet {
                            id: info_set_id.clone(),
                            player: *player,
                            actions: actions.clone(),
                        },
                    );
                }
            }
        }
    });
    sets.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::types::PLAYER_0;

    fn tiny_tree() -> GameNode {
        GameNode::Chance {
            edges: vec![
                ChanceEdge {
                    outcome: ChanceOutcome::PublicDeal { card: 0 },
                    probability: 0.5,
                    child: GameNode::Player {
                        player: PLAYER_0,
                        info_set_id: "P0:x".into(),
                        actions: vec![Action::Check, Action::Bet],
                        children: vec![
                            GameNode::Terminal { payoff: 1.0 },
                            GameNode::Terminal { payoff: -1.0 },
                        ],
                    },
                },
                ChanceEdge {
                    outcome: ChanceOutcome::PublicDeal { card: 1 },
                    probability: 0.5,
                    child: GameNode::Terminal { payoff: 0.0 },
                },
            ],
        }
    }

    #[test]
    fn stats_count_node_kinds() {
        let stats = compute_tree_stats(&tiny_tree());
        assert_eq!(stats.total_nodes, 5);
        assert_eq!(stats.chance_nodes, 1);
        assert_eq!(stats.player_nodes, 1);
        assert_eq!(stats.terminal_nodes, 3);
        assert_eq!(stats.max_depth, 2);
    }

    #[test]
    fn child_lookup_follows_action_order() {
        let tree = tiny_tree();
        let GameNode::Chance { edges } = &tree else {
            panic!("expected chance root")
        };
        let player = &edges[0].child;
        assert!(matches!(
            player.child_for_action(Action::Bet),
            Some(GameNode::Terminal { payoff }) if *payoff == -1.0
        ));
        assert!(player.child_for_action(Action::Fold).is_none());
    }

    #[test]
    fn build_game_rejects_unknown_names() {
        assert!(build_game("kuhn").is_ok());
        assert!(build_game("leduc").is_ok());
        assert!(matches!(
            build_game("omaha"),
            Err(SolverError::InvalidConfiguration(_))
        ));
    }
}
