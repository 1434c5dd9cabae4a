//! File-based telemetry for live visualization.
//!
//! The sink rewrites a single JSON document after every solver iteration. A
//! browser (or anything else) polls the file; writes go to a temporary path
//! followed by a rename so a concurrent reader never sees truncated JSON.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::SolverError;
use crate::poker::strategy::Strategy;
use crate::poker::types::{InfoSetId, InfoSetIndex};
use crate::solver::diagnostics::IterationStats;

/// One Newton iteration as published to the telemetry file.
#[derive(Debug, Clone, Serialize)]
pub struct IterationSnapshot {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub iteration: usize,
    pub residual_norm: f64,
    pub step_norm: f64,
    pub alpha: f64,
    pub lambda: f64,
    pub beta: f64,
    pub game: String,
    /// Info set id -> action name -> probability.
    pub strategy: Value,
    /// Info set id -> action name -> expected utility.
    pub action_evs: Value,
    pub exploitability: f64,
    pub expected_value: f64,
}

impl IterationSnapshot {
    /// Assemble a snapshot from solver stats and the evaluated strategy
    /// state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stats: &IterationStats,
        beta: f64,
        sigma: &Strategy,
        index: &InfoSetIndex,
        action_evs: &BTreeMap<InfoSetId, Vec<f64>>,
        game_name: &str,
        exploitability: f64,
        expected_value: f64,
    ) -> Self {
        let mut evs = serde_json::Map::new();
        for i in 0..index.num_info_sets() {
            let is = index.info_set(i);
            let mut row = serde_json::Map::new();
            for (action, &eu) in is.actions.iter().zip(&action_evs[&is.id]) {
                row.insert(action.name().to_string(), json!(eu));
            }
            evs.insert(is.id.clone(), Value::Object(row));
        }

        Self {
            kind: "iteration",
            iteration: stats.iteration,
            residual_norm: stats.residual_norm,
            step_norm: stats.step_norm,
            alpha: stats.alpha,
            lambda: stats.lambda,
            beta,
            game: game_name.to_string(),
            strategy: sigma.to_json(),
            action_evs: Value::Object(evs),
            exploitability,
            expected_value,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("snapshot serializes")
    }
}

/// Append-only JSON sink polled by the visualization.
pub struct TelemetrySink {
    path: PathBuf,
    history: Vec<Value>,
    latest: Value,
    finished: bool,
}

impl TelemetrySink {
    /// Create the sink and publish an initial empty document.
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, SolverError> {
        let mut sink = Self {
            path: path.into(),
            history: Vec::new(),
            latest: Value::Null,
            finished: false,
        };
        if let Some(parent) = sink.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        sink.write_file()?;
        Ok(sink)
    }

    /// Record one iteration and republish the document.
    pub fn log_iteration(&mut self, snapshot: Value) -> Result<(), SolverError> {
        self.history.push(snapshot.clone());
        self.latest = snapshot;
        self.write_file()
    }

    /// Mark the run complete and republish.
    pub fn finish(
        &mut self,
        final_exploitability: f64,
        total_iterations: usize,
    ) -> Result<(), SolverError> {
        self.latest = json!({
            "type": "complete",
            "final_exploitability": final_exploitability,
            "total_iterations": total_iterations,
            "status": "done",
        });
        self.finished = true;
        self.write_file()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self) -> Result<(), SolverError> {
        let output = json!({
            "status": if self.finished { "complete" } else { "running" },
            "iteration_count": self.history.len(),
            "iterations": self.history,
            "latest": self.latest,
        });

        // Temp file + rename keeps the published document consistent for
        // concurrent readers.
        let body = serde_json::to_string_pretty(&output).map_err(io::Error::from)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, body)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
