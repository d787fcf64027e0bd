//! Adapter specification: how instances become prompts and how completions
//! are interpreted.

use serde::{Deserialize, Serialize};

use super::error::{Result, RunSpecError};

/// Default model for every canonical run family.
pub const DEFAULT_MODEL: &str = "openai/davinci";

/// Adaptation method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationMethod {
    /// Free-form completion.
    Generation,

    /// Score each answer choice.
    MultipleChoice,

    /// Score the likelihood of the input text; no generation.
    LanguageModeling,

    /// Compare likelihoods of a minimal sentence pair.
    LanguageModelingMinimalPairs,
}

impl AdaptationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            AdaptationMethod::Generation => "generation",
            AdaptationMethod::MultipleChoice => "multiple_choice",
            AdaptationMethod::LanguageModeling => "language_modeling",
            AdaptationMethod::LanguageModelingMinimalPairs => "language_modeling_minimal_pairs",
        }
    }

    /// Whether the method only scores text and needs no generation budget.
    pub fn is_language_modeling(&self) -> bool {
        matches!(
            self,
            AdaptationMethod::LanguageModeling | AdaptationMethod::LanguageModelingMinimalPairs
        )
    }
}

/// Prompting strategy for a run.
///
/// Built through [`AdapterSpecBuilder`], which enforces the invariants:
/// `model` is `<provider>/<model-id>`, `num_train_trials >= 1`,
/// `num_outputs >= 1`, `temperature` finite and non-negative, and
/// `max_tokens == 0` only for language-modeling methods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdapterSpec {
    pub method: AdaptationMethod,
    pub model: String,
    pub instructions: String,
    pub input_prefix: String,
    pub output_prefix: String,
    pub instance_prefix: String,
    pub reference_prefix: String,
    pub max_train_instances: u32,

    /// `None` evaluates every instance the scenario provides.
    pub max_eval_instances: Option<u32>,
    pub num_train_trials: u32,
    pub num_outputs: u32,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stop_sequences: Vec<String>,
    pub interactive: bool,
}

impl AdapterSpec {
    /// Start a builder with the shared defaults for `method`.
    pub fn builder(method: AdaptationMethod) -> AdapterSpecBuilder {
        AdapterSpecBuilder {
            spec: AdapterSpec {
                method,
                model: DEFAULT_MODEL.to_string(),
                instructions: String::new(),
                input_prefix: String::new(),
                output_prefix: String::new(),
                instance_prefix: "\n".to_string(),
                reference_prefix: "A. ".to_string(),
                max_train_instances: 5,
                max_eval_instances: None,
                num_train_trials: 1,
                num_outputs: 5,
                temperature: 1.0,
                max_tokens: 100,
                stop_sequences: Vec::new(),
                interactive: false,
            },
        }
    }

    /// Reopen this spec for modification; the original is left untouched.
    pub fn to_builder(&self) -> AdapterSpecBuilder {
        AdapterSpecBuilder { spec: self.clone() }
    }

    /// Check field ranges and the model id.
    pub fn validate(&self) -> Result<()> {
        validate_model(&self.model).map_err(RunSpecError::InvalidAdapterSpec)?;
        if self.num_train_trials == 0 {
            return Err(RunSpecError::InvalidAdapterSpec(
                "num_train_trials must be >= 1".to_string(),
            ));
        }
        if self.num_outputs == 0 {
            return Err(RunSpecError::InvalidAdapterSpec(
                "num_outputs must be >= 1".to_string(),
            ));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(RunSpecError::InvalidAdapterSpec(format!(
                "temperature must be finite and >= 0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 && !self.method.is_language_modeling() {
            return Err(RunSpecError::InvalidAdapterSpec(format!(
                "max_tokens = 0 is only valid for language modeling, method is {}",
                self.method.name()
            )));
        }
        Ok(())
    }
}

/// Check that `model` has the form `<provider>/<model-id>`.
pub fn validate_model(model: &str) -> std::result::Result<(), String> {
    match model.split_once('/') {
        Some((provider, id)) if !provider.is_empty() && !id.is_empty() && !id.contains('/') => {
            Ok(())
        }
        _ => Err(format!(
            "model must have the form <provider>/<model-id>, got '{}'",
            model
        )),
    }
}

/// Builder for [`AdapterSpec`]. `build` validates.
#[derive(Debug, Clone)]
pub struct AdapterSpecBuilder {
    spec: AdapterSpec,
}

impl AdapterSpecBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.spec.model = model.into();
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.spec.instructions = instructions.into();
        self
    }

    pub fn input_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.spec.input_prefix = prefix.into();
        self
    }

    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.spec.output_prefix = prefix.into();
        self
    }

    pub fn instance_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.spec.instance_prefix = prefix.into();
        self
    }

    pub fn reference_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.spec.reference_prefix = prefix.into();
        self
    }

    pub fn max_train_instances(mut self, n: u32) -> Self {
        self.spec.max_train_instances = n;
        self
    }

    pub fn max_eval_instances(mut self, n: Option<u32>) -> Self {
        self.spec.max_eval_instances = n;
        self
    }

    pub fn num_train_trials(mut self, n: u32) -> Self {
        self.spec.num_train_trials = n;
        self
    }

    pub fn num_outputs(mut self, n: u32) -> Self {
        self.spec.num_outputs = n;
        self
    }

    pub fn temperature(mut self, t: f64) -> Self {
        self.spec.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.spec.max_tokens = n;
        self
    }

    pub fn stop_sequences<I, S>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.stop_sequences = stops.into_iter().map(Into::into).collect();
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.spec.interactive = interactive;
        self
    }

    pub fn build(self) -> Result<AdapterSpec> {
        self.spec.validate()?;
        Ok(self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let spec = AdapterSpec::builder(AdaptationMethod::Generation)
            .build()
            .expect("build");
        assert_eq!(spec.model, DEFAULT_MODEL);
        assert_eq!(spec.num_train_trials, 1);
        assert_eq!(spec.max_eval_instances, None);
        assert!(!spec.interactive);
    }

    #[test]
    fn test_model_requires_single_separator() {
        for bad in ["davinci", "openai/", "/davinci", "a/b/c"] {
            let result = AdapterSpec::builder(AdaptationMethod::Generation)
                .model(bad)
                .build();
            assert!(
                matches!(result, Err(RunSpecError::InvalidAdapterSpec(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_zero_max_tokens_only_for_language_modeling() {
        let lm = AdapterSpec::builder(AdaptationMethod::LanguageModeling)
            .max_tokens(0)
            .build();
        assert!(lm.is_ok());

        let pairs = AdapterSpec::builder(AdaptationMethod::LanguageModelingMinimalPairs)
            .max_tokens(0)
            .build();
        assert!(pairs.is_ok());

        let generation = AdapterSpec::builder(AdaptationMethod::Generation)
            .max_tokens(0)
            .build();
        assert!(matches!(
            generation,
            Err(RunSpecError::InvalidAdapterSpec(_))
        ));
    }

    #[test]
    fn test_rejects_zero_trials_and_outputs() {
        assert!(AdapterSpec::builder(AdaptationMethod::Generation)
            .num_train_trials(0)
            .build()
            .is_err());
        assert!(AdapterSpec::builder(AdaptationMethod::Generation)
            .num_outputs(0)
            .build()
            .is_err());
    }

    #[test]
    fn test_rejects_negative_temperature() {
        let result = AdapterSpec::builder(AdaptationMethod::Generation)
            .temperature(-0.5)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_to_builder_leaves_original_untouched() {
        let original = AdapterSpec::builder(AdaptationMethod::MultipleChoice)
            .build()
            .expect("build");
        let changed = original
            .to_builder()
            .model("ai21/j1-large")
            .build()
            .expect("rebuild");
        assert_eq!(original.model, DEFAULT_MODEL);
        assert_eq!(changed.model, "ai21/j1-large");
    }

    #[test]
    fn test_method_serde_snake_case() {
        let json = serde_json::to_string(&AdaptationMethod::LanguageModelingMinimalPairs)
            .expect("serialize");
        assert_eq!(json, r#""language_modeling_minimal_pairs""#);
    }
}
