//! Domain-level error taxonomy for run-spec compilation.

use std::fmt;

/// Compilation stage that rejected an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// A run family's canonical constructor.
    Constructor { family: String },

    /// An expansion axis.
    Expander { key: String },
}

impl Stage {
    pub fn constructor(family: impl Into<String>) -> Self {
        Stage::Constructor {
            family: family.into(),
        }
    }

    pub fn expander(key: impl Into<String>) -> Self {
        Stage::Expander { key: key.into() }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Constructor { family } => write!(f, "constructor '{}'", family),
            Stage::Expander { key } => write!(f, "expander '{}'", key),
        }
    }
}

/// Run-spec domain errors.
///
/// Every variant is a deterministic configuration error: nothing here is
/// transient, so callers should surface rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum RunSpecError {
    #[error("unknown run family: {name}")]
    UnknownRunFamily { name: String },

    #[error("invalid argument in {stage}: {key}={value}: {reason}")]
    InvalidArgument {
        stage: Stage,
        key: String,
        value: String,
        reason: String,
    },

    #[error("incoherent metric configuration for run '{run}': {reason}")]
    IncoherentMetricConfiguration { run: String, reason: String },

    #[error("expander '{key}' produced no run specs for value {value}")]
    DegenerateExpansion { key: String, value: String },

    #[error("duplicate registration in {registry} registry: {name}")]
    DuplicateRegistration { registry: &'static str, name: String },

    #[error("invalid adapter spec: {0}")]
    InvalidAdapterSpec(String),

    #[error("invalid run spec: {0}")]
    InvalidRunSpec(String),

    #[error("duplicate run name in compiled output: {0}")]
    DuplicateRunName(String),

    #[error("expansion produced {produced} run specs, limit is {limit}")]
    TooManyRunSpecs { limit: usize, produced: usize },

    #[error("malformed run entry: {0}")]
    MalformedRunEntry(String),

    #[error("value not representable in canonical JSON: {0}")]
    NonCanonicalValue(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A child produced by an expansion stage failed validation.
    #[error("{stage} produced an invalid run: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<RunSpecError>,
    },
}

impl RunSpecError {
    /// Shorthand for an argument rejected by `stage`.
    pub fn invalid_argument(
        stage: Stage,
        key: impl Into<String>,
        value: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        RunSpecError::InvalidArgument {
            stage,
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Attribute this error to the expander declared under `key`.
    ///
    /// Errors that already name their stage or axis pass through unchanged.
    pub fn in_expander(self, key: &str) -> Self {
        match self {
            RunSpecError::InvalidArgument { .. }
            | RunSpecError::DegenerateExpansion { .. }
            | RunSpecError::StageFailed { .. } => self,
            other => RunSpecError::StageFailed {
                stage: Stage::expander(key),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, past any stage attribution.
    pub fn root_cause(&self) -> &RunSpecError {
        match self {
            RunSpecError::StageFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for run-spec domain operations.
pub type Result<T> = std::result::Result<T, RunSpecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_family_display() {
        let err = RunSpecError::UnknownRunFamily {
            name: "not_a_real_family".to_string(),
        };
        assert!(err.to_string().contains("unknown run family"));
        assert!(err.to_string().contains("not_a_real_family"));
    }

    #[test]
    fn test_invalid_argument_names_stage_key_and_value() {
        let err = RunSpecError::invalid_argument(
            Stage::constructor("commonsense_qa"),
            "method",
            "bogus",
            "expected one of: mcqa, clm",
        );
        let msg = err.to_string();
        assert!(msg.contains("constructor 'commonsense_qa'"));
        assert!(msg.contains("method=bogus"));
        assert!(msg.contains("mcqa"));
    }

    #[test]
    fn test_expander_stage_display() {
        let err = RunSpecError::invalid_argument(
            Stage::expander("model"),
            "model",
            "davinci",
            "expected <provider>/<model-id>",
        );
        assert!(err.to_string().contains("expander 'model'"));
    }

    #[test]
    fn test_in_expander_wraps_validation_failures() {
        let err = RunSpecError::IncoherentMetricConfiguration {
            run: "disinformation:capability=reiteration,num_outputs=1".to_string(),
            reason: "self_bleu".to_string(),
        }
        .in_expander("num_outputs");
        match &err {
            RunSpecError::StageFailed { stage, .. } => {
                assert_eq!(*stage, Stage::expander("num_outputs"))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("expander 'num_outputs' produced"));
        assert!(matches!(
            err.root_cause(),
            RunSpecError::IncoherentMetricConfiguration { .. }
        ));
    }

    #[test]
    fn test_in_expander_keeps_staged_errors() {
        let err = RunSpecError::invalid_argument(Stage::expander("model"), "model", "x", "bad")
            .in_expander("stop");
        assert!(matches!(
            err,
            RunSpecError::InvalidArgument { stage: Stage::Expander { ref key }, .. } if key == "model"
        ));
    }

    #[test]
    fn test_degenerate_expansion_display() {
        let err = RunSpecError::DegenerateExpansion {
            key: "model".to_string(),
            value: "[]".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("model"));
        assert!(msg.contains("[]"));
    }
}
