//! Strategy profiles parameterized by unconstrained logits.
//!
//! Probabilities are derived on demand through a stable softmax, so any
//! finite logit vector yields a valid, strictly positive distribution at
//! every information set.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde_json::{json, Value};

use crate::poker::types::{Action, InfoSetId, InfoSetIndex};

/// Numerically stable softmax: shift by the maximum before exponentiating.
pub fn stable_softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&w| (w - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// A strategy profile: per-information-set logits plus the action order they
/// parameterize.
///
/// Lookups of an information set that is not in the profile indicate the
/// caller is using a stale or mismatched index and panic immediately.
#[derive(Debug, Clone, Default)]
pub struct Strategy {
    logits: BTreeMap<InfoSetId, Vec<f64>>,
    actions: BTreeMap<InfoSetId, Vec<Action>>,
}

impl Strategy {
    /// Slice a flat logit vector into per-info-set logits using the index
    /// layout.
    pub fn from_logits(w: &DVector<f64>, index: &InfoSetIndex) -> Self {
        let mut strategy = Strategy::default();

        for i in 0..index.num_info_sets() {
            let is = index.info_set(i);
            let start = index.start(i);
            let logits = w.as_slice()[start..start + is.actions.len()].to_vec();
            strategy.logits.insert(is.id.clone(), logits);
            strategy.actions.insert(is.id.clone(), is.actions.clone());
        }

        strategy
    }

    /// Uniform strategy: all logits zero.
    pub fn uniform(index: &InfoSetIndex) -> Self {
        Self::from_logits(&DVector::zeros(index.total_dim()), index)
    }

    /// Probability distribution over the legal actions of an information set.
    ///
    /// # Panics
    /// Panics if the information set is unknown.
    pub fn probs(&self, info_set_id: &str) -> Vec<f64> {
        let logits = self
            .logits
            .get(info_set_id)
            .unwrap_or_else(|| panic!("unknown information set: {info_set_id}"));
        stable_softmax(logits)
    }

    /// Probability of a single action at an information set.
    ///
    /// # Panics
    /// Panics if the information set is unknown or the action is not legal
    /// there.
    pub fn prob(&self, info_set_id: &str, action: Action) -> f64 {
        let actions = self
            .actions
            .get(info_set_id)
            .unwrap_or_else(|| panic!("unknown information set: {info_set_id}"));
        let pos = actions
            .iter()
            .position(|&a| a == action)
            .unwrap_or_else(|| panic!("action {action:?} not legal at {info_set_id}"));
        self.probs(info_set_id)[pos]
    }

    /// Raw logits of an information set.
    pub fn logits(&self, info_set_id: &str) -> &[f64] {
        self.logits
            .get(info_set_id)
            .unwrap_or_else(|| panic!("unknown information set: {info_set_id}"))
    }

    /// Overwrite the logits of one information set.
    pub fn set_logits(&mut self, info_set_id: &str, logits: Vec<f64>, actions: Vec<Action>) {
        self.logits.insert(info_set_id.to_string(), logits);
        self.actions.insert(info_set_id.to_string(), actions);
    }

    /// Flatten back into the index layout. Missing sets default to zero
    /// logits (uniform).
    pub fn to_flat_logits(&self, index: &InfoSetIndex) -> DVector<f64> {
        let mut w = DVector::zeros(index.total_dim());

        for i in 0..index.num_info_sets() {
            let is = index.info_set(i);
            let start = index.start(i);
            if let Some(logits) = self.logits.get(&is.id) {
                for (a, &logit) in logits.iter().enumerate() {
                    w[start + a] = logit;
                }
            }
        }

        w
    }

    /// Probability tables keyed by info set id and action name, for
    /// telemetry.
    pub fn to_json(&self) -> Value {
        let mut table = serde_json::Map::new();
        for (id, actions) in &self.actions {
            let probs = self.probs(id);
            let mut row = serde_json::Map::new();
            for (action, p) in actions.iter().zip(&probs) {
                row.insert(action.name().to_string(), json!(p));
            }
            table.insert(id.clone(), Value::Object(row));
        }
        Value::Object(table)
    }

    pub fn has_info_set(&self, info_set_id: &str) -> bool {
        self.logits.contains_key(info_set_id)
    }

    /// Number of information sets in the profile.
    pub fn len(&self) -> usize {
        self.logits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logits.is_empty()
    }

    /// Info set ids in sorted order.
    pub fn info_set_ids(&self) -> impl Iterator<Item = &InfoSetId> {
        self.logits.keys()
    }
}
