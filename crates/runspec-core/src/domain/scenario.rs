//! Scenario, metric, and interactive-adapter specs.
//!
//! These are identity-only value objects: an identifier naming the
//! collaborator plus its arguments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::object_spec::Args;

/// Data source and loader parameters for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSpec {
    /// Scenario identifier (e.g. `mmlu`).
    pub identifier: String,

    /// Loader arguments.
    pub args: Args,
}

impl ScenarioSpec {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            args: Args::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Scoring strategy for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSpec {
    /// Metric identifier (e.g. `basic`).
    pub identifier: String,

    /// Metric arguments.
    pub args: Args,
}

/// Sub-metrics that compare outputs against each other and are undefined
/// for a single completion.
const MULTI_OUTPUT_METRICS: &[&str] = &["self_bleu"];

impl MetricSpec {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            args: Args::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Sub-metric name, when the metric is parameterized by one.
    pub fn sub_metric(&self) -> Option<&str> {
        self.args.get("name").and_then(Value::as_str)
    }

    /// Minimum `num_outputs` this metric is defined for.
    pub fn min_outputs(&self) -> u32 {
        match self.sub_metric() {
            Some(name) if MULTI_OUTPUT_METRICS.contains(&name) => 2,
            _ => 1,
        }
    }
}

/// Interlocutor loop attached to interactive runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveAdapterSpec {
    pub identifier: String,
    pub args: Args,
}

impl InteractiveAdapterSpec {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            args: Args::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}
