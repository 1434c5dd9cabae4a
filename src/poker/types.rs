//! Core identifiers: actions, cards, players, information sets, and the
//! flat parameter index used by the solvers.

use std::collections::BTreeMap;

/// A poker action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Pass, no bet.
    Check,
    /// Add chips to the pot.
    Bet,
    /// Match the outstanding bet.
    Call,
    /// Give up the hand.
    Fold,
    /// Increase the outstanding bet (Leduc only).
    Raise,
}

impl Action {
    /// Lowercase display name, used as the JSON key in telemetry.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Check => "check",
            Action::Bet => "bet",
            Action::Call => "call",
            Action::Fold => "fold",
            Action::Raise => "raise",
        }
    }

    /// One-character history encoding. Call is 'k' so it cannot be confused
    /// with 'c' for check.
    pub fn history_char(&self) -> char {
        match self {
            Action::Check => 'c',
            Action::Bet => 'b',
            Action::Call => 'k',
            Action::Fold => 'f',
            Action::Raise => 'r',
        }
    }
}

/// Card index. Meaning is game-specific: Kuhn uses 0=J, 1=Q, 2=K; Leduc uses
/// `rank * 2 + suit` over 3 ranks and 2 suits.
pub type Card = u8;

/// Acting player, 0 or 1. Chance is represented structurally by the node
/// type rather than by a sentinel value.
pub type PlayerId = usize;

pub const PLAYER_0: PlayerId = 0;
pub const PLAYER_1: PlayerId = 1;

/// The other player.
pub fn opponent(player: PlayerId) -> PlayerId {
    1 - player
}

/// Canonical string key identifying an information set from the acting
/// player's perspective, e.g. `P0:Q:cb` (Kuhn) or `P1:J:Q:R2:cc|b` (Leduc).
pub type InfoSetId = String;

/// An information set together with its acting player and ordered legal
/// actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoSet {
    pub id: InfoSetId,
    pub player: PlayerId,
    pub actions: Vec<Action>,
}

/// Immutable mapping between flat parameter positions and
/// (information set, action) pairs.
///
/// Flat positions are contiguous per information set, in the order the sets
/// are listed (sorted by id) and the order each set's legal actions were
/// emitted by the game builder. `total_dim` is the length of the strategy
/// parameter vector.
#[derive(Debug, Clone)]
pub struct InfoSetIndex {
    info_sets: Vec<InfoSet>,
    id_to_index: BTreeMap<InfoSetId, usize>,
    starts: Vec<usize>,
    flat_to_pair: Vec<(usize, usize)>,
    total_dim: usize,
}

impl InfoSetIndex {
    /// Build the index from a list of information sets. The list is sorted
    /// by id so the flat layout is deterministic across runs.
    pub fn build(mut info_sets: Vec<InfoSet>) -> Self {
        info_sets.sort_by(|a, b| a.id.cmp(&b.id));

        let mut id_to_index = BTreeMap::new();
        let mut starts = Vec::with_capacity(info_sets.len());
        let mut flat_to_pair = Vec::new();
        let mut flat = 0;

        for (i, is) in info_sets.iter().enumerate() {
            id_to_index.insert(is.id.clone(), i);
            starts.push(flat);
            for a in 0..is.actions.len() {
                flat_to_pair.push((i, a));
            }
            flat += is.actions.len();
        }

        Self {
            info_sets,
            id_to_index,
            starts,
            flat_to_pair,
            total_dim: flat,
        }
    }

    /// Total dimension of the flat strategy vector.
    pub fn total_dim(&self) -> usize {
        self.total_dim
    }

    /// Number of information sets.
    pub fn num_info_sets(&self) -> usize {
        self.info_sets.len()
    }

    /// Information set by index.
    pub fn info_set(&self, idx: usize) -> &InfoSet {
        &self.info_sets[idx]
    }

    /// Index of an information set by id.
    pub fn info_set_index(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    /// First flat position belonging to the given information set.
    pub fn start(&self, idx: usize) -> usize {
        self.starts[idx]
    }

    /// Map a flat position back to (info set index, action index).
    pub fn flat_to_pair(&self, flat: usize) -> (usize, usize) {
        self.flat_to_pair[flat]
    }

    /// Flat position of (info set id, action), if the pair is in the index.
    pub fn flat_index(&self, id: &str, action: Action) -> Option<usize> {
        let idx = self.info_set_index(id)?;
        let pos = self.info_sets[idx].actions.iter().position(|&a| a == action)?;
        Some(self.starts[idx] + pos)
    }

    /// All information sets, sorted by id.
    pub fn all_info_sets(&self) -> &[InfoSet] {
        &self.info_sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> InfoSetIndex {
        InfoSetIndex::build(vec![
            InfoSet {
                id: "P1:K:b".into(),
                player: PLAYER_1,
                actions: vec![Action::Call, Action::Fold],
            },
            InfoSet {
                id: "P0:Q:".into(),
                player: PLAYER_0,
                actions: vec![Action::Check, Action::Bet],
            },
            InfoSet {
                id: "P0:forced".into(),
                player: PLAYER_0,
                actions: vec![Action::Call],
            },
        ])
    }

    #[test]
    fn index_sorts_by_id_and_assigns_contiguous_positions() {
        let index = sample_index();

        assert_eq!(index.num_info_sets(), 3);
        assert_eq!(index.total_dim(), 5);
        // Sorted: "P0:Q:", "P0:forced", "P1:K:b"
        assert_eq!(index.info_set(0).id, "P0:Q:");
        assert_eq!(index.info_set(1).id, "P0:forced");
        assert_eq!(index.info_set(2).id, "P1:K:b");
        assert_eq!(index.start(0), 0);
        assert_eq!(index.start(1), 2);
        assert_eq!(index.start(2), 3);
    }

    #[test]
    fn flat_round_trip() {
        let index = sample_index();

        for flat in 0..index.total_dim() {
            let (i, a) = index.flat_to_pair(flat);
            let is = index.info_set(i);
            assert_eq!(index.flat_index(&is.id, is.actions[a]), Some(flat));
        }
    }

    #[test]
    fn single_action_info_set_is_indexed() {
        let index = sample_index();

        let idx = index.info_set_index("P0:forced").unwrap();
        assert_eq!(index.info_set(idx).actions.len(), 1);
        assert_eq!(index.flat_index("P0:forced", Action::Call), Some(2));
    }

    #[test]
    fn unknown_pairs_are_none() {
        let index = sample_index();

        assert_eq!(index.info_set_index("P0:missing"), None);
        assert_eq!(index.flat_index("P0:Q:", Action::Raise), None);
    }

    #[test]
    fn action_encoding() {
        assert_eq!(Action::Check.history_char(), 'c');
        assert_eq!(Action::Call.history_char(), 'k');
        assert_eq!(Action::Raise.name(), "raise");
    }
}
