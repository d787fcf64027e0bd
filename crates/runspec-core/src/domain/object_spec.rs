//! Caller-supplied run description: a family name plus ordered arguments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{Result, RunSpecError};

/// Ordered argument bag. Keys are unique; insertion order is kept.
pub type Args = Map<String, Value>;

/// Abstract description of a run, consumed by the compiler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectSpec {
    /// Run family name (e.g. `mmlu`).
    pub name: String,

    /// Arguments in caller order.
    #[serde(default)]
    pub args: Args,
}

impl ObjectSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Args::new(),
        }
    }

    /// Append an argument, replacing any previous value for `key` in place.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Parse a run entry such as `mmlu:subject=anatomy,model=openai/davinci`.
    ///
    /// Values are kept as strings; constructors and expanders parse them.
    /// Whitespace around the entry, keys, and values is trimmed.
    pub fn parse(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        let (name, rest) = match entry.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (entry, None),
        };
        if name.is_empty() {
            return Err(RunSpecError::MalformedRunEntry(format!(
                "'{}': missing run family name",
                entry
            )));
        }

        let mut spec = ObjectSpec::new(name);
        let Some(rest) = rest else {
            return Ok(spec);
        };
        if rest.trim().is_empty() {
            return Err(RunSpecError::MalformedRunEntry(format!(
                "'{}': ':' must be followed by key=value pairs",
                entry
            )));
        }

        for pair in rest.split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(RunSpecError::MalformedRunEntry(format!(
                    "'{}': expected key=value, got '{}'",
                    entry, pair
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(RunSpecError::MalformedRunEntry(format!(
                    "'{}': empty key in '{}'",
                    entry, pair
                )));
            }
            if spec.args.contains_key(key) {
                return Err(RunSpecError::MalformedRunEntry(format!(
                    "'{}': duplicate key '{}'",
                    entry, key
                )));
            }
            spec.args
                .insert(key.to_string(), Value::String(value.trim().to_string()));
        }
        Ok(spec)
    }
}
