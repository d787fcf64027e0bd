//! Typed extraction of constructor arguments.
//!
//! Each run family parses its plain arguments into a dedicated parameter
//! struct through [`RunArgs`]. Every extraction removes the key, so
//! [`RunArgs::finish`] can reject whatever the family did not ask for.

use serde_json::Value;

use crate::domain::{Args, Result, RunSpecError, Stage};

/// Plain (non-expander) arguments for one constructor call.
#[derive(Debug, Clone)]
pub struct RunArgs {
    family: String,
    args: Args,
}

impl RunArgs {
    pub fn new(family: impl Into<String>, args: Args) -> Self {
        Self {
            family: family.into(),
            args,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Error for an argument this family rejects.
    pub fn invalid(
        &self,
        key: &str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> RunSpecError {
        RunSpecError::invalid_argument(Stage::constructor(&self.family), key, value, reason)
    }

    fn missing(&self, key: &str) -> RunSpecError {
        self.invalid(key, "<missing>", "required argument")
    }

    fn scalar_text(&self, key: &str, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(self.invalid(key, other, "expected a scalar value")),
        }
    }

    fn uint(&self, key: &str, value: &Value) -> Result<u64> {
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(key, value, "expected a non-negative integer"))
    }

    fn uint32(&self, key: &str, value: &Value) -> Result<u32> {
        let n = self.uint(key, value)?;
        u32::try_from(n).map_err(|_| self.invalid(key, value, "integer out of range"))
    }

    fn boolean(&self, key: &str, value: &Value) -> Result<bool> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" => Ok(true),
                "false" | "f" => Ok(false),
                _ => Err(self.invalid(key, value, "expected true or false")),
            },
            other => Err(self.invalid(key, other, "expected true or false")),
        }
    }

    /// Remove and return the raw value for `key`.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.args.remove(key)
    }

    pub fn required_str(&mut self, key: &str) -> Result<String> {
        let value = self.take(key).ok_or_else(|| self.missing(key))?;
        self.scalar_text(key, &value)
    }

    pub fn str_or(&mut self, key: &str, default: &str) -> Result<String> {
        match self.take(key) {
            Some(value) => self.scalar_text(key, &value),
            None => Ok(default.to_string()),
        }
    }

    pub fn required_u32(&mut self, key: &str) -> Result<u32> {
        let value = self.take(key).ok_or_else(|| self.missing(key))?;
        self.uint32(key, &value)
    }

    pub fn u32_or(&mut self, key: &str, default: u32) -> Result<u32> {
        match self.take(key) {
            Some(value) => self.uint32(key, &value),
            None => Ok(default),
        }
    }

    pub fn u64_or(&mut self, key: &str, default: u64) -> Result<u64> {
        match self.take(key) {
            Some(value) => self.uint(key, &value),
            None => Ok(default),
        }
    }

    pub fn opt_u32(&mut self, key: &str) -> Result<Option<u32>> {
        match self.take(key) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => self.uint32(key, &value).map(Some),
        }
    }

    pub fn required_bool(&mut self, key: &str) -> Result<bool> {
        let value = self.take(key).ok_or_else(|| self.missing(key))?;
        self.boolean(key, &value)
    }

    pub fn bool_or(&mut self, key: &str, default: bool) -> Result<bool> {
        match self.take(key) {
            Some(value) => self.boolean(key, &value),
            None => Ok(default),
        }
    }

    /// Extract a string restricted to `choices`; `default` applies when absent.
    pub fn choice(&mut self, key: &str, choices: &[&str], default: Option<&str>) -> Result<String> {
        let value = match (self.take(key), default) {
            (Some(value), _) => self.scalar_text(key, &value)?,
            (None, Some(default)) => default.to_string(),
            (None, None) => return Err(self.missing(key)),
        };
        if choices.contains(&value.as_str()) {
            Ok(value)
        } else {
            Err(self.invalid(
                key,
                &value,
                format!("expected one of: {}", choices.join(", ")),
            ))
        }
    }

    /// Fail on any argument the family did not consume.
    pub fn finish(self) -> Result<()> {
        match self.args.iter().next() {
            Some((key, value)) => Err(self.invalid(key, value, "unknown argument")),
            None => Ok(()),
        }
    }

    /// Hand over every remaining argument, for families that pass them through.
    pub fn into_remaining(self) -> Args {
        self.args
    }
}
