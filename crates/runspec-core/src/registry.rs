//! Name-keyed registries for run families and expansion axes.
//!
//! Both are populated once and read-only afterwards. Registering a name
//! twice is rejected with [`RunSpecError::DuplicateRegistration`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::args::RunArgs;
use crate::domain::{Result, RunSpec, RunSpecError};
use crate::expander::{ExpanderKind, RunExpander};
use crate::families::RunFamily;

/// Canonical constructor: plain arguments in, one run spec out.
pub type ConstructorFn = Arc<dyn Fn(RunArgs) -> Result<RunSpec> + Send + Sync>;

/// Expander factory: declared value in, one pipeline stage out.
pub type ExpanderFactory = Arc<dyn Fn(&Value) -> Result<Box<dyn RunExpander>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ConstructorRegistry {
    constructors: BTreeMap<String, ConstructorFn>,
}

impl ConstructorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in run family.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for family in RunFamily::ALL {
            registry.register(family.name(), move |args| family.construct(args))?;
        }
        Ok(registry)
    }

    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn(RunArgs) -> Result<RunSpec> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            return Err(RunSpecError::DuplicateRegistration {
                registry: "constructor",
                name,
            });
        }
        self.constructors.insert(name, Arc::new(constructor));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ConstructorFn> {
        self.constructors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered family names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl std::fmt::Debug for ConstructorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

#[derive(Clone, Default)]
pub struct ExpanderRegistry {
    factories: BTreeMap<String, ExpanderFactory>,
}

impl ExpanderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in expansion axis.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for kind in ExpanderKind::ALL {
            registry.register(kind.key(), move |declared| kind.instantiate(declared))?;
        }
        Ok(registry)
    }

    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn(&Value) -> Result<Box<dyn RunExpander>> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.factories.contains_key(&key) {
            return Err(RunSpecError::DuplicateRegistration {
                registry: "expander",
                name: key,
            });
        }
        self.factories.insert(key, Arc::new(factory));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ExpanderFactory> {
        self.factories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Reserved argument keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for ExpanderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Args;

    #[test]
    fn test_builtin_registers_every_family() {
        let registry = ConstructorRegistry::builtin().expect("builtin");
        assert_eq!(registry.len(), RunFamily::ALL.len());
        assert!(registry.contains("mmlu"));
        assert!(!registry.contains("raft"));
    }

    #[test]
    fn test_duplicate_family_rejected() {
        let mut registry = ConstructorRegistry::builtin().expect("builtin");
        let err = registry
            .register("mmlu", |args| RunFamily::Simple1.construct(args))
            .expect_err("duplicate");
        match err {
            RunSpecError::DuplicateRegistration { registry, name } => {
                assert_eq!(registry, "constructor");
                assert_eq!(name, "mmlu");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_family_dispatches() {
        let mut registry = ConstructorRegistry::new();
        registry
            .register("debug", |args| RunFamily::Simple1.construct(args))
            .expect("register");
        let constructor = registry.get("debug").expect("registered");
        let spec = constructor(RunArgs::new("debug", Args::new())).expect("construct");
        assert_eq!(spec.name, "simple1");
    }

    #[test]
    fn test_duplicate_expander_rejected() {
        let mut registry = ExpanderRegistry::builtin().expect("builtin");
        let result = registry.register("model", |declared| ExpanderKind::Model.instantiate(declared));
        assert!(matches!(
            result,
            Err(RunSpecError::DuplicateRegistration { registry: "expander", .. })
        ));
    }

    #[test]
    fn test_expander_keys() {
        let registry = ExpanderRegistry::builtin().expect("builtin");
        let keys: Vec<&str> = registry.keys().collect();
        assert_eq!(
            keys,
            vec!["max_train_instances", "model", "num_outputs", "num_train_trials", "stop"]
        );
    }
}
