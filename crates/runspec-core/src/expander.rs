//! Expansion axes.
//!
//! An expander takes one run spec and a declared value (a preset name, a
//! single value, or a list) and yields one child per resolved value. Each
//! child replaces a single adapter field and records `key=value` in its name.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::domain::adapter::validate_model;
use crate::domain::run_spec::{check_name_part, sanitize_name_value};
use crate::domain::{AdapterSpecBuilder, Result, RunSpec, RunSpecError, Stage, DEFAULT_MODEL};

/// Models run by the `all` preset.
pub const ALL_MODELS: &[&str] = &[
    "openai/davinci",
    "openai/curie",
    "openai/babbage",
    "openai/ada",
    "openai/text-davinci-002",
    "openai/text-davinci-001",
    "openai/text-curie-001",
    "openai/text-babbage-001",
    "openai/text-ada-001",
    "openai/code-davinci-001",
    "openai/code-cushman-001",
    "ai21/j1-jumbo",
    "ai21/j1-grande",
    "ai21/j1-large",
    "cohere/xlarge",
    "cohere/large",
    "cohere/medium",
    "cohere/small",
    "huggingface/gpt2",
    "huggingface/gptj_6b",
    "together/gpt-j-6b",
    "together/gpt-neox-20b",
    "together/bloom",
    "together/opt-175b",
    "together/t0pp",
    "together/t5-11b",
    "together/ul2",
    "together/yalm",
];

/// Models run by the `code` preset.
pub const CODE_MODELS: &[&str] = &["openai/code-davinci-001", "openai/code-cushman-001"];

/// One step of the expansion pipeline.
pub trait RunExpander: Send + Sync {
    /// Argument key that declared this expander.
    fn key(&self) -> &str;

    /// The declared value, rendered for diagnostics.
    fn declared_value(&self) -> &str;

    /// Children of `parent`, in declaration order. `parent` is left untouched.
    fn expand(&self, parent: &RunSpec) -> Result<Vec<RunSpec>>;
}

/// Closed set of expansion axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpanderKind {
    Model,
    NumTrainTrials,
    MaxTrainInstances,
    NumOutputs,
    Stop,
}

impl ExpanderKind {
    pub const ALL: [ExpanderKind; 5] = [
        ExpanderKind::Model,
        ExpanderKind::NumTrainTrials,
        ExpanderKind::MaxTrainInstances,
        ExpanderKind::NumOutputs,
        ExpanderKind::Stop,
    ];

    /// Reserved argument key for this axis.
    pub fn key(&self) -> &'static str {
        match self {
            ExpanderKind::Model => "model",
            ExpanderKind::NumTrainTrials => "num_train_trials",
            ExpanderKind::MaxTrainInstances => "max_train_instances",
            ExpanderKind::NumOutputs => "num_outputs",
            ExpanderKind::Stop => "stop",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Preset names accepted in place of explicit values.
    pub fn presets(&self) -> &'static [&'static str] {
        match self {
            ExpanderKind::Model => &["default", "all", "code"],
            ExpanderKind::NumTrainTrials | ExpanderKind::NumOutputs => &["default"],
            ExpanderKind::MaxTrainInstances => &["zero", "one", "all"],
            ExpanderKind::Stop => &["hash", "newline"],
        }
    }

    /// Build the expander for a declared value.
    pub fn instantiate(&self, declared: &Value) -> Result<Box<dyn RunExpander>> {
        let rendered = render_declared(declared);
        let values = match self {
            ExpanderKind::Model => self.parse_models(declared)?,
            ExpanderKind::Stop => self.parse_stops(declared)?,
            ExpanderKind::NumTrainTrials => self.parse_counts(declared, AxisValue::NumTrainTrials)?,
            ExpanderKind::MaxTrainInstances => {
                self.parse_counts(declared, AxisValue::MaxTrainInstances)?
            }
            ExpanderKind::NumOutputs => self.parse_counts(declared, AxisValue::NumOutputs)?,
        };

        if values.is_empty() {
            return Err(RunSpecError::DegenerateExpansion {
                key: self.key().to_string(),
                value: rendered,
            });
        }

        let mut seen = HashSet::new();
        for value in &values {
            if !seen.insert(value.name_value()) {
                return Err(self.invalid(&rendered, format!("duplicate value '{}'", value)));
            }
        }

        Ok(Box::new(ReplaceValueExpander {
            kind: *self,
            declared: rendered,
            values,
        }))
    }

    fn invalid(&self, value: impl fmt::Display, reason: impl Into<String>) -> RunSpecError {
        RunSpecError::invalid_argument(Stage::expander(self.key()), self.key(), value, reason)
    }

    /// Accept a single item or a list of items.
    fn items<'a>(&self, declared: &'a Value) -> Vec<&'a Value> {
        match declared {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        }
    }

    fn parse_models(&self, declared: &Value) -> Result<Vec<AxisValue>> {
        if let Value::String(preset) = declared {
            let models: Option<&[&str]> = match preset.as_str() {
                "default" => Some(&[DEFAULT_MODEL]),
                "all" => Some(ALL_MODELS),
                "code" => Some(CODE_MODELS),
                _ => None,
            };
            if let Some(models) = models {
                return Ok(models
                    .iter()
                    .map(|m| AxisValue::Model(m.to_string()))
                    .collect());
            }
        }

        self.items(declared)
            .into_iter()
            .map(|item| {
                let model = item
                    .as_str()
                    .ok_or_else(|| self.invalid(item, "expected a model name"))?;
                validate_model(model).map_err(|reason| self.invalid(model, reason))?;
                check_name_part(model).map_err(|reason| self.invalid(model, reason))?;
                Ok(AxisValue::Model(model.to_string()))
            })
            .collect()
    }

    fn count_preset(&self, name: &str) -> Option<&'static [u32]> {
        match (self, name) {
            (ExpanderKind::NumTrainTrials, "default") => Some(&[5]),
            (ExpanderKind::NumOutputs, "default") => Some(&[10]),
            (ExpanderKind::MaxTrainInstances, "zero") => Some(&[0]),
            (ExpanderKind::MaxTrainInstances, "one") => Some(&[1]),
            (ExpanderKind::MaxTrainInstances, "all") => Some(&[0, 1, 2, 4, 8, 16]),
            _ => None,
        }
    }

    fn parse_counts(
        &self,
        declared: &Value,
        wrap: fn(u32) -> AxisValue,
    ) -> Result<Vec<AxisValue>> {
        if let Some(counts) = declared.as_str().and_then(|name| self.count_preset(name)) {
            return Ok(counts.iter().copied().map(wrap).collect());
        }

        self.items(declared)
            .into_iter()
            .map(|item| {
                let parsed = match item {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.trim().parse::<u64>().ok(),
                    _ => None,
                };
                let count = parsed
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| self.invalid(item, "expected a preset or a non-negative integer"))?;
                // Only the number of in-context examples may be zero.
                if count == 0 && *self != ExpanderKind::MaxTrainInstances {
                    return Err(self.invalid(item, "must be >= 1"));
                }
                Ok(wrap(count))
            })
            .collect()
    }

    fn parse_stops(&self, declared: &Value) -> Result<Vec<AxisValue>> {
        self.items(declared)
            .into_iter()
            .map(|item| {
                let preset = item.as_str().unwrap_or_default();
                let sequences = match preset {
                    "hash" => vec!["###".to_string()],
                    "newline" => vec!["\n".to_string()],
                    _ => {
                        return Err(self.invalid(
                            item,
                            format!("expected one of: {}", self.presets().join(", ")),
                        ))
                    }
                };
                Ok(AxisValue::Stops {
                    preset: preset.to_string(),
                    sequences,
                })
            })
            .collect()
    }
}

impl fmt::Display for ExpanderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn render_declared(declared: &Value) -> String {
    match declared {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One resolved value along an axis.
#[derive(Debug, Clone, PartialEq)]
enum AxisValue {
    Model(String),
    NumTrainTrials(u32),
    MaxTrainInstances(u32),
    NumOutputs(u32),
    Stops {
        preset: String,
        sequences: Vec<String>,
    },
}

impl AxisValue {
    /// Encoding of this value inside a run name.
    fn name_value(&self) -> String {
        match self {
            AxisValue::Model(model) => sanitize_name_value(model),
            AxisValue::NumTrainTrials(n)
            | AxisValue::MaxTrainInstances(n)
            | AxisValue::NumOutputs(n) => n.to_string(),
            AxisValue::Stops { preset, .. } => preset.clone(),
        }
    }

    fn apply(&self, builder: AdapterSpecBuilder) -> AdapterSpecBuilder {
        match self {
            AxisValue::Model(model) => builder.model(model.as_str()),
            AxisValue::NumTrainTrials(n) => builder.num_train_trials(*n),
            AxisValue::MaxTrainInstances(n) => builder.max_train_instances(*n),
            AxisValue::NumOutputs(n) => builder.num_outputs(*n),
            AxisValue::Stops { sequences, .. } => builder.stop_sequences(sequences.iter().cloned()),
        }
    }
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisValue::Model(model) => f.write_str(model),
            AxisValue::NumTrainTrials(n)
            | AxisValue::MaxTrainInstances(n)
            | AxisValue::NumOutputs(n) => write!(f, "{}", n),
            AxisValue::Stops { preset, .. } => f.write_str(preset),
        }
    }
}

/// Replaces one adapter field with each resolved value in turn.
struct ReplaceValueExpander {
    kind: ExpanderKind,
    declared: String,
    values: Vec<AxisValue>,
}

impl RunExpander for ReplaceValueExpander {
    fn key(&self) -> &str {
        self.kind.key()
    }

    fn declared_value(&self) -> &str {
        &self.declared
    }

    fn expand(&self, parent: &RunSpec) -> Result<Vec<RunSpec>> {
        self.values
            .iter()
            .map(|value| {
                let adapter_spec = value
                    .apply(parent.adapter_spec.to_builder())
                    .build()?;
                parent.derive(self.kind.key(), &value.name_value(), adapter_spec)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdaptationMethod, AdapterSpec, MetricSpec, ScenarioSpec};
    use serde_json::json;

    fn parent() -> RunSpec {
        let adapter_spec = AdapterSpec::builder(AdaptationMethod::MultipleChoice)
            .num_outputs(1)
            .build()
            .expect("adapter");
        RunSpec::new(
            "mmlu:subject=anatomy",
            ScenarioSpec::new("mmlu").with_arg("subject", "anatomy"),
            adapter_spec,
            vec![MetricSpec::new("basic")],
            None,
        )
        .expect("parent")
    }

    #[test]
    fn test_model_list_keeps_declared_order() {
        let expander = ExpanderKind::Model
            .instantiate(&json!(["openai/davinci", "ai21/j1-large"]))
            .expect("expander");
        let children = expander.expand(&parent()).expect("expand");
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "mmlu:subject=anatomy,model=openai_davinci",
                "mmlu:subject=anatomy,model=ai21_j1-large",
            ]
        );
        assert_eq!(children[1].adapter_spec.model, "ai21/j1-large");
    }

    #[test]
    fn test_model_presets() {
        let default = ExpanderKind::Model.instantiate(&json!("default")).expect("default");
        assert_eq!(default.expand(&parent()).expect("expand").len(), 1);

        let code = ExpanderKind::Model.instantiate(&json!("code")).expect("code");
        let children = code.expand(&parent()).expect("expand");
        assert_eq!(children[0].adapter_spec.model, "openai/code-davinci-001");
        assert_eq!(children.len(), CODE_MODELS.len());

        let all = ExpanderKind::Model.instantiate(&json!("all")).expect("all");
        assert_eq!(all.expand(&parent()).expect("expand").len(), ALL_MODELS.len());
    }

    #[test]
    fn test_single_model_string() {
        let expander = ExpanderKind::Model
            .instantiate(&json!("together/bloom"))
            .expect("expander");
        let children = expander.expand(&parent()).expect("expand");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "mmlu:subject=anatomy,model=together_bloom");
    }

    #[test]
    fn test_malformed_model_rejected_at_instantiation() {
        let err = ExpanderKind::Model
            .instantiate(&json!("davinci"))
            .err()
            .expect("bad model");
        match err {
            RunSpecError::InvalidArgument { stage, key, .. } => {
                assert_eq!(stage, Stage::expander("model"));
                assert_eq!(key, "model");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_list_is_degenerate() {
        let err = ExpanderKind::Model.instantiate(&json!([])).err().expect("empty");
        assert!(matches!(err, RunSpecError::DegenerateExpansion { .. }));
    }

    #[test]
    fn test_duplicate_values_rejected() {
        let err = ExpanderKind::NumOutputs
            .instantiate(&json!([2, "2"]))
            .err()
            .expect("duplicate");
        assert!(err.to_string().contains("duplicate value"));
    }

    #[test]
    fn test_max_train_instances_all_preset() {
        let expander = ExpanderKind::MaxTrainInstances
            .instantiate(&json!("all"))
            .expect("expander");
        let counts: Vec<u32> = expander
            .expand(&parent())
            .expect("expand")
            .iter()
            .map(|c| c.adapter_spec.max_train_instances)
            .collect();
        assert_eq!(counts, vec![0, 1, 2, 4, 8, 16]);
    }

    #[test]
    fn test_zero_outputs_rejected() {
        assert!(ExpanderKind::NumOutputs.instantiate(&json!(0)).is_err());
        assert!(ExpanderKind::MaxTrainInstances.instantiate(&json!(0)).is_ok());
    }

    #[test]
    fn test_stop_preset_names_the_run() {
        let expander = ExpanderKind::Stop.instantiate(&json!("hash")).expect("stop");
        let children = expander.expand(&parent()).expect("expand");
        assert_eq!(children[0].name, "mmlu:subject=anatomy,stop=hash");
        assert_eq!(children[0].adapter_spec.stop_sequences, vec!["###"]);
        assert!(ExpanderKind::Stop.instantiate(&json!("semicolon")).is_err());
    }

    #[test]
    fn test_expand_leaves_parent_untouched() {
        let parent = parent();
        let before = parent.clone();
        let expander = ExpanderKind::NumTrainTrials
            .instantiate(&json!("default"))
            .expect("expander");
        let children = expander.expand(&parent).expect("expand");
        assert_eq!(parent, before);
        assert_eq!(children[0].adapter_spec.num_train_trials, 5);
    }

    #[test]
    fn test_num_outputs_rechecks_metric_coherence() {
        let adapter_spec = AdapterSpec::builder(AdaptationMethod::Generation)
            .num_outputs(10)
            .build()
            .expect("adapter");
        let parent = RunSpec::new(
            "disinformation:capability=reiteration",
            ScenarioSpec::new("disinformation"),
            adapter_spec,
            vec![MetricSpec::new("disinformation").with_arg("name", "self_bleu")],
            None,
        )
        .expect("parent");
        let expander = ExpanderKind::NumOutputs.instantiate(&json!(1)).expect("expander");
        let err = expander.expand(&parent).expect_err("incoherent");
        assert!(matches!(
            err,
            RunSpecError::IncoherentMetricConfiguration { .. }
        ));
    }

    #[test]
    fn test_key_roundtrip() {
        for kind in ExpanderKind::ALL {
            assert_eq!(ExpanderKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ExpanderKind::from_key("subject"), None);
    }
}
