//! Kuhn poker: 3 cards, one betting round, 1-chip antes and bets.
//!
//! Rules:
//! - Deck is J(0), Q(1), K(2); each player antes 1 and is dealt one card.
//! - Player 0 acts first: check or bet 1.
//!   - After a check, Player 1 can check (showdown, pot 2) or bet.
//!     - After check-bet, Player 0 can call (showdown, pot 4) or fold.
//!   - After a bet, Player 1 can call (showdown, pot 4) or fold.
//! - Higher card wins at showdown.
//!
//! Twelve information sets: each player holds one of three cards at one of
//! two decision points.

use crate::poker::tree::{collect_info_sets, ChanceEdge, ChanceOutcome, GameNode, PokerGame};
use crate::poker::types::{Action, Card, InfoSet, InfoSetId, PlayerId, PLAYER_0, PLAYER_1};

const NUM_CARDS: Card = 3;

/// Kuhn poker with its tree built at construction.
pub struct KuhnPoker {
    root: GameNode,
}

impl KuhnPoker {
    pub fn new() -> Self {
        Self { root: build_root() }
    }

    /// Card comparison: King > Queen > Jack.
    pub fn compare_cards(c1: Card, c2: Card) -> i32 {
        (c1 as i32 - c2 as i32).signum()
    }

    /// Display name of a card.
    pub fn card_name(card: Card) -> &'static str {
        match card {
            0 => "J",
            1 => "Q",
            2 => "K",
            _ => "?",
        }
    }

    /// Info set key: `P{player}:{card}:{history}`, e.g. `P1:K:b`.
    pub fn make_info_set_id(player: PlayerId, card: Card, history: &str) -> InfoSetId {
        format!("P{player}:{}:{history}", Self::card_name(card))
    }
}

impl Default for KuhnPoker {
    fn default() -> Self {
        Self::new()
    }
}

impl PokerGame for KuhnPoker {
    fn root(&self) -> &GameNode {
        &self.root
    }

    fn info_sets(&self) -> Vec<InfoSet> {
        collect_info_sets(&self.root)
    }

    fn name(&self) -> &'static str {
        "Kuhn Poker"
    }

    fn deck_size(&self) -> usize {
        NUM_CARDS as usize
    }
}

fn build_root() -> GameNode {
    // All 6 ordered deals of distinct cards, uniform probability.
    let deal_prob = 1.0 / 6.0;
    let mut edges = Vec::with_capacity(6);

    for p0_card in 0..NUM_CARDS {
        for p1_card in 0..NUM_CARDS {
            if p0_card == p1_card {
                continue;
            }
            edges.push(ChanceEdge {
                outcome: ChanceOutcome::PrivateDeal { p0: p0_card, p1: p1_card },
                probability: deal_prob,
                child: decision_node(
                    PLAYER_0,
                    vec![Action::Check, Action::Bet],
                    String::new(),
                    p0_card,
                    p1_card,
                    2,
                ),
            });
        }
    }

    GameNode::Chance { edges }
}

/// Build the decision node reached via `history`, offering `actions`, and
/// recursively build the subtree under each action.
fn decision_node(
    to_act: PlayerId,
    actions: Vec<Action>,
    history: String,
    p0_card: Card,
    p1_card: Card,
    pot: u32,
) -> GameNode {
    let card = if to_act == PLAYER_0 { p0_card } else { p1_card };
    let info_set_id = KuhnPoker::make_info_set_id(to_act, card, &history);

    let children = actions
        .iter()
        .map(|&action| {
            let new_history = format!("{history}{}", action.history_char());
            match (to_act, action) {
                // P0 checks: P1 chooses check or bet.
                (PLAYER_0, Action::Check) => decision_node(
                    PLAYER_1,
                    vec![Action::Check, Action::Bet],
                    new_history,
                    p0_card,
                    p1_card,
                    pot,
                ),
                // P0 bets 1: P1 must call or fold.
                (PLAYER_0, Action::Bet) => decision_node(
                    PLAYER_1,
                    vec![Action::Call, Action::Fold],
                    new_history,
                    p0_card,
                    p1_card,
                    pot + 1,
                ),
                // P0 calls after check-bet: showdown at pot 4.
                (PLAYER_0, Action::Call) => showdown(p0_card, p1_card, pot + 1),
                (PLAYER_0, Action::Fold) => fold_terminal(PLAYER_0),
                // P1 checks behind: showdown at pot 2.
                (PLAYER_1, Action::Check) => showdown(p0_card, p1_card, pot),
                // P1 bets after a check: P0 must call or fold.
                (PLAYER_1, Action::Bet) => decision_node(
                    PLAYER_0,
                    vec![Action::Call, Action::Fold],
                    new_history,
                    p0_card,
                    p1_card,
                    pot + 1,
                ),
                (PLAYER_1, Action::Call) => showdown(p0_card, p1_card, pot + 1),
                (PLAYER_1, Action::Fold) => fold_terminal(PLAYER_1),
                (p, a) => unreachable!("illegal Kuhn action {a:?} for player {p}"),
            }
        })
        .collect();

    GameNode::Player {
        player: to_act,
        info_set_id,
        actions,
        children,
    }
}

fn showdown(p0_card: Card, p1_card: Card, pot: u32) -> GameNode {
    let payoff = match KuhnPoker::compare_cards(p0_card, p1_card) {
        1 => pot as f64 / 2.0,
        -1 => -(pot as f64) / 2.0,
        _ => 0.0,
    };
    GameNode::Terminal { payoff }
}

/// Fold terminals pay out the folder's ante only, regardless of any bet that
/// preceded the fold.
fn fold_terminal(folder: PlayerId) -> GameNode {
    let payoff = if folder == PLAYER_0 { -1.0 } else { 1.0 };
    GameNode::Terminal { payoff }
}
