//! Compiled run definition and its name encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::adapter::AdapterSpec;
use super::digest;
use super::error::{Result, RunSpecError, Stage};
use super::scenario::{InteractiveAdapterSpec, MetricSpec, ScenarioSpec};

/// A fully-parameterized run, ready for an execution engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    /// `family[:key=value,...]`; unique key for result storage.
    pub name: String,
    pub scenario: ScenarioSpec,
    pub adapter_spec: AdapterSpec,
    pub metrics: Vec<MetricSpec>,
    pub interactive_adapter: Option<InteractiveAdapterSpec>,
}

impl RunSpec {
    /// Assemble and validate a run spec.
    ///
    /// Rejects an empty name, an empty metric list, an interactive adapter
    /// that disagrees with `adapter_spec.interactive`, and metrics that are
    /// undefined for the configured number of outputs.
    pub fn new(
        name: impl IntoRunName,
        scenario: ScenarioSpec,
        adapter_spec: AdapterSpec,
        metrics: Vec<MetricSpec>,
        interactive_adapter: Option<InteractiveAdapterSpec>,
    ) -> Result<Self> {
        let spec = Self {
            name: name.into_run_name()?,
            scenario,
            adapter_spec,
            metrics,
            interactive_adapter,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the run-level invariants.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RunSpecError::InvalidRunSpec(
                "name cannot be empty".to_string(),
            ));
        }
        if self.metrics.is_empty() {
            return Err(RunSpecError::InvalidRunSpec(format!(
                "run '{}' has no metrics",
                self.name
            )));
        }
        if self.interactive_adapter.is_some() != self.adapter_spec.interactive {
            return Err(RunSpecError::InvalidRunSpec(format!(
                "run '{}': interactive adapter must be present exactly when adapter_spec.interactive is set",
                self.name
            )));
        }
        self.adapter_spec.validate()?;
        self.check_metric_coherence()
    }

    fn check_metric_coherence(&self) -> Result<()> {
        let outputs = self.adapter_spec.num_outputs;
        for metric in &self.metrics {
            if outputs < metric.min_outputs() {
                return Err(RunSpecError::IncoherentMetricConfiguration {
                    run: self.name.clone(),
                    reason: format!(
                        "metric '{}' needs at least {} outputs but num_outputs is {}",
                        metric.sub_metric().unwrap_or(&metric.identifier),
                        metric.min_outputs(),
                        outputs
                    ),
                });
            }
        }
        Ok(())
    }

    /// Derive a child run that differs in its adapter along one axis.
    ///
    /// The child's name sets `key=value` on the parent's name; `self` is not
    /// modified.
    pub fn derive(&self, key: &str, value: &str, adapter_spec: AdapterSpec) -> Result<Self> {
        Self::new(
            set_name_arg(&self.name, key, value),
            self.scenario.clone(),
            adapter_spec,
            self.metrics.clone(),
            self.interactive_adapter.clone(),
        )
    }

    /// Content digest over the whole spec.
    pub fn digest(&self) -> Result<String> {
        digest::content_digest(self)
    }
}

/// Builder for run names: `family` or `family:k1=v1,k2=v2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunName {
    family: String,
    args: Vec<(String, String)>,
}

impl RunName {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.args.push((key.into(), value.to_string()));
        self
    }

    /// Append `key=value` only when `value` is present.
    pub fn opt_arg(self, key: impl Into<String>, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(value) => self.arg(key, value),
            None => self,
        }
    }
}

impl fmt::Display for RunName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.family)?;
        for (i, (key, value)) in self.args.iter().enumerate() {
            let sep = if i == 0 { ':' } else { ',' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

impl RunName {
    /// Render the name, rejecting keys or values that would alter its
    /// structure.
    pub fn render(&self) -> Result<String> {
        for (key, value) in &self.args {
            if let Err(reason) = check_name_part(key).and_then(|_| check_name_part(value)) {
                return Err(RunSpecError::invalid_argument(
                    Stage::constructor(&self.family),
                    key,
                    value,
                    reason,
                ));
            }
        }
        Ok(self.to_string())
    }
}

/// Anything `RunSpec::new` accepts as a name.
pub trait IntoRunName {
    fn into_run_name(self) -> Result<String>;
}

impl IntoRunName for RunName {
    fn into_run_name(self) -> Result<String> {
        self.render()
    }
}

impl IntoRunName for String {
    fn into_run_name(self) -> Result<String> {
        Ok(self)
    }
}

impl IntoRunName for &str {
    fn into_run_name(self) -> Result<String> {
        Ok(self.to_string())
    }
}

/// Characters that delimit the parts of an encoded run name.
const NAME_DELIMITERS: [char; 3] = [':', ',', '='];

/// A run-name key or value must not contain a delimiter; otherwise two
/// distinct argument sets could encode to the same name.
pub fn check_name_part(part: &str) -> std::result::Result<(), String> {
    match part.chars().find(|c| NAME_DELIMITERS.contains(c)) {
        Some(c) => Err(format!("'{}' cannot appear in a run name", c)),
        None => Ok(()),
    }
}

/// Set `key=value` on an encoded run name: substitute the value if `key` is
/// already encoded, otherwise append it.
pub fn set_name_arg(name: &str, key: &str, value: &str) -> String {
    let (family, encoded) = match name.split_once(':') {
        Some((family, encoded)) => (family, encoded),
        None => return format!("{}:{}={}", name, key, value),
    };

    let mut replaced = false;
    let parts: Vec<String> = encoded
        .split(',')
        .map(|part| match part.split_once('=') {
            Some((k, _)) if k == key && !replaced => {
                replaced = true;
                format!("{}={}", key, value)
            }
            _ => part.to_string(),
        })
        .collect();

    let mut out = format!("{}:{}", family, parts.join(","));
    if !replaced {
        out.push_str(&format!(",{}={}", key, value));
    }
    out
}

/// Encode an axis value for use in a run name (`/` is not allowed).
pub fn sanitize_name_value(value: &str) -> String {
    value.replace('/', "_")
}
