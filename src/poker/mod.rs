//! Extensive-form poker games and the strategy machinery over them.

pub mod ev;
pub mod kuhn;
pub mod leduc;
pub mod qre;
pub mod strategy;
pub mod tree;
pub mod types;

pub use ev::{
    best_response_value, compute_all_expected_utilities, compute_ev, compute_ev_with_override,
    compute_exploitability, expected_utility,
};
pub use kuhn::KuhnPoker;
pub use leduc::LeducPoker;
pub use qre::QreResidual;
pub use strategy::{stable_softmax, Strategy};
pub use tree::{
    build_game, compute_tree_stats, ChanceEdge, ChanceOutcome, GameNode, PokerGame, TreeStats,
};
pub use types::{Action, Card, InfoSet, InfoSetId, InfoSetIndex, PlayerId, PLAYER_0, PLAYER_1};
