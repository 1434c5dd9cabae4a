//! Leduc poker: 6 cards (3 ranks, 2 suits), two betting rounds.
//!
//! Rules:
//! - Each player antes 1 and receives one private card.
//! - Round 1 uses a fixed bet of 2, round 2 a fixed bet of 4; each round
//!   allows one bet and at most two raises.
//! - Between rounds a public card is dealt from the four remaining cards.
//! - At showdown a pair with the public card beats everything else,
//!   otherwise the higher rank wins; equal ranks split.
//!
//! Suits never appear in information set keys: strategies are
//! suit-isomorphic, so only ranks are observable.
//!
//! Round boundaries: only the very first check of the hand passes the
//! action to the opponent. Any later check with nothing to call ends the
//! betting round on the spot, which in round 2 means an immediate showdown.

use crate::poker::tree::{collect_info_sets, ChanceEdge, ChanceOutcome, GameNode, PokerGame};
use crate::poker::types::{opponent, Action, Card, InfoSet, InfoSetId, PlayerId, PLAYER_0};

pub const ANTE: u32 = 1;
pub const SMALL_BET: u32 = 2;
pub const BIG_BET: u32 = 4;
pub const MAX_RAISES: u32 = 2;
const NUM_CARDS: Card = 6;

/// Leduc poker with its tree built at construction.
pub struct LeducPoker {
    root: GameNode,
}

impl LeducPoker {
    pub fn new() -> Self {
        Self { root: build_root() }
    }

    /// Card rank: 0=J, 1=Q, 2=K.
    pub fn card_rank(card: Card) -> u8 {
        card / 2
    }

    /// Card suit: 0 or 1.
    pub fn card_suit(card: Card) -> u8 {
        card % 2
    }

    fn rank_name(card: Card) -> &'static str {
        match Self::card_rank(card) {
            0 => "J",
            1 => "Q",
            2 => "K",
            _ => "?",
        }
    }

    /// Compare hands at showdown. Positive if Player 0 wins, negative if
    /// Player 1 wins, zero on a split.
    pub fn compare_hands(p0_card: Card, p1_card: Card, public_card: Card) -> i32 {
        let p0_rank = Self::card_rank(p0_card);
        let p1_rank = Self::card_rank(p1_card);
        let pub_rank = Self::card_rank(public_card);

        let p0_pair = p0_rank == pub_rank;
        let p1_pair = p1_rank == pub_rank;

        if p0_pair && !p1_pair {
            return 1;
        }
        if !p0_pair && p1_pair {
            return -1;
        }
        (p0_rank as i32 - p1_rank as i32).signum()
    }

    /// Info set key: `P{player}:{private_rank}:{public_rank_or_dash}:R{round}:{history}`.
    /// History uses one char per action with `|` marking the round boundary.
    pub fn make_info_set_id(
        player: PlayerId,
        private_card: Card,
        public_card: Option<Card>,
        history: &str,
        round: u8,
    ) -> InfoSetId {
        let private = Self::rank_name(private_card);
        let public = public_card.map_or("-", Self::rank_name);
        format!("P{player}:{private}:{public}:R{round}:{history}")
    }
}

impl Default for LeducPoker {
    fn default() -> Self {
        Self::new()
    }
}

impl PokerGame for LeducPoker {
    fn root(&self) -> &GameNode {
        &self.root
    }

    fn info_sets(&self) -> Vec<InfoSet> {
        collect_info_sets(&self.root)
    }

    fn name(&self) -> &'static str {
        "Leduc Poker"
    }

    fn deck_size(&self) -> usize {
        NUM_CARDS as usize
    }
}

fn build_root() -> GameNode {
    // All 30 ordered private deals, uniform probability.
    let deal_prob = 1.0 / 30.0;
    let mut edges = Vec::with_capacity(30);

    for p0_card in 0..NUM_CARDS {
        for p1_card in 0..NUM_CARDS {
            if p0_card == p1_card {
                continue;
            }
            edges.push(ChanceEdge {
                outcome: ChanceOutcome::PrivateDeal { p0: p0_card, p1: p1_card },
                probability: deal_prob,
                child: betting_node(
                    PLAYER_0,
                    vec![Action::Check, Action::Bet],
                    String::new(),
                    p0_card,
                    p1_card,
                    None,
                    2 * ANTE,
                    0,
                    MAX_RAISES,
                    1,
                    SMALL_BET,
                ),
            });
        }
    }

    GameNode::Chance { edges }
}

/// Build the betting decision reached via `history` and the subtree under
/// each of its legal actions.
#[allow(clippy::too_many_arguments)]
fn betting_node(
    to_act: PlayerId,
    actions: Vec<Action>,
    history: String,
    p0_card: Card,
    p1_card: Card,
    public_card: Option<Card>,
    pot: u32,
    to_call: u32,
    raises_left: u32,
    round: u8,
    bet_size: u32,
) -> GameNode {
    let card = if to_act == PLAYER_0 { p0_card } else { p1_card };
    let info_set_id = LeducPoker::make_info_set_id(to_act, card, public_card, &history, round);
    let opp = opponent(to_act);

    let children = actions
        .iter()
        .map(|&action| {
            let new_history = format!("{history}{}", action.history_char());
            match action {
                Action::Fold => fold_terminal(to_act, pot),

                Action::Check => {
                    debug_assert_eq!(to_call, 0, "check while facing a bet");
                    if history.is_empty() {
                        // Opening check of the hand: opponent acts.
                        betting_node(
                            opp,
                            vec![Action::Check, Action::Bet],
                            new_history,
                            p0_card,
                            p1_card,
                            public_card,
                            pot,
                            0,
                            raises_left,
                            round,
                            bet_size,
                        )
                    } else {
                        end_round(round, p0_card, p1_card, public_card, pot, new_history)
                    }
                }

                Action::Bet => {
                    let new_pot = pot + bet_size;
                    let opp_actions = if raises_left > 0 {
                        vec![Action::Fold, Action::Call, Action::Raise]
                    } else {
                        vec![Action::Fold, Action::Call]
                    };
                    betting_node(
                        opp,
                        opp_actions,
                        new_history,
                        p0_card,
                        p1_card,
                        public_card,
                        new_pot,
                        bet_size,
                        raises_left,
                        round,
                        bet_size,
                    )
                }

                Action::Call => {
                    end_round(round, p0_card, p1_card, public_card, pot + to_call, new_history)
                }

                Action::Raise => {
                    let new_pot = pot + to_call + bet_size;
                    let new_raises = raises_left - 1;
                    let opp_actions = if new_raises > 0 {
                        vec![Action::Fold, Action::Call, Action::Raise]
                    } else {
                        vec![Action::Fold, Action::Call]
                    };
                    betting_node(
                        opp,
                        opp_actions,
                        new_history,
                        p0_card,
                        p1_card,
                        public_card,
                        new_pot,
                        bet_size,
                        new_raises,
                        round,
                        bet_size,
                    )
                }
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

/// Close a betting round: deal the public card after round 1, show down
/// after round 2.
fn end_round(
    round: u8,
    p0_card: Card,
    p1_card: Card,
    public_card: Option<Card>,
    pot: u32,
    history: String,
) -> GameNode {
    if round == 1 {
        deal_public(p0_card, p1_card, pot, history)
    } else {
        showdown(p0_card, p1_card, public_card.expect("round 2 has a public card"), pot)
    }
}

fn deal_public(p0_card: Card, p1_card: Card, pot: u32, history: String) -> GameNode {
    let remaining: Vec<Card> = (0..NUM_CARDS)
        .filter(|&c| c != p0_card && c != p1_card)
        .collect();
    let deal_prob = 1.0 / remaining.len() as f64;

    let edges = remaining
        .into_iter()
        .map(|public| ChanceEdge {
            outcome: ChanceOutcome::PublicDeal { card: public },
            probability: deal_prob,
            child: betting_node(
                PLAYER_0,
                vec![Action::Check, Action::Bet],
                format!("{history}|"),
                p0_card,
                p1_card,
                Some(public),
                pot,
                0,
                MAX_RAISES,
                2,
                BIG_BET,
            ),
        })
        .collect();

    GameNode::Chance { edges }
}

fn showdown(p0_card: Card, p1_card: Card, public_card: Card, pot: u32) -> GameNode {
    let payoff = match LeducPoker::compare_hands(p0_card, p1_card, public_card) {
        1 => pot as f64 / 2.0,
        -1 => -(pot as f64) / 2.0,
        _ => 0.0,
    };
    GameNode::Terminal { payoff }
}

fn fold_terminal(folder: PlayerId, pot: u32) -> GameNode {
    let half = pot as f64 / 2.0;
    let payoff = if folder == PLAYER_0 { -half } else { half };
    GameNode::Terminal { payoff }
}
