//! Run-spec compiler.
//!
//! `ObjectSpec` → canonical constructor → expansion pipeline → `Vec<RunSpec>`.
//!
//! Arguments whose key names an expansion axis become pipeline stages, in
//! the order they were declared; everything else goes to the family's
//! constructor. Stages are folded left to right as a flat-map, so two axes
//! of sizes `m` and `n` yield `m * n` run specs with the first axis as the
//! outer loop.

use std::collections::HashSet;
use std::time::Instant;

use tracing::debug;

use crate::args::RunArgs;
use crate::domain::{Args, ObjectSpec, Result, RunSpec, RunSpecError};
use crate::expander::RunExpander;
use crate::metrics::METRICS;
use crate::obs::{
    emit_compile_failed, emit_compile_finished, emit_compile_started, emit_expansion_applied,
    CompileSpan,
};
use crate::registry::{ConstructorRegistry, ExpanderRegistry};

/// Default cap on the number of run specs one compilation may produce.
pub const DEFAULT_MAX_RUN_SPECS: usize = 10_000;

/// Compiler limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Upper bound on run specs at any point of the expansion pipeline.
    pub max_run_specs: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_run_specs: DEFAULT_MAX_RUN_SPECS,
        }
    }
}

impl CompilerConfig {
    pub fn with_max_run_specs(mut self, max_run_specs: usize) -> Self {
        self.max_run_specs = max_run_specs;
        self
    }
}

/// Compiles run descriptions against a pair of registries.
#[derive(Debug, Clone)]
pub struct RunSpecCompiler {
    constructors: ConstructorRegistry,
    expanders: ExpanderRegistry,
    config: CompilerConfig,
}

impl RunSpecCompiler {
    pub fn new(
        constructors: ConstructorRegistry,
        expanders: ExpanderRegistry,
        config: CompilerConfig,
    ) -> Self {
        Self {
            constructors,
            expanders,
            config,
        }
    }

    /// Compiler over every built-in family and axis, with default config.
    pub fn with_builtins() -> Result<Self> {
        Ok(Self::new(
            ConstructorRegistry::builtin()?,
            ExpanderRegistry::builtin()?,
            CompilerConfig::default(),
        ))
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn constructors(&self) -> &ConstructorRegistry {
        &self.constructors
    }

    pub fn expanders(&self) -> &ExpanderRegistry {
        &self.expanders
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile one run description into at least one run spec.
    ///
    /// Fails without partial output on an unknown family, a rejected
    /// argument, an incoherent metric set, an empty expansion, or when the
    /// pipeline exceeds `max_run_specs`.
    pub fn compile(&self, spec: &ObjectSpec) -> Result<Vec<RunSpec>> {
        let _span = CompileSpan::enter(&spec.name);
        let started = Instant::now();

        match self.compile_inner(spec) {
            Ok(run_specs) => {
                METRICS.record_success(run_specs.len());
                emit_compile_finished(
                    &spec.name,
                    run_specs.len(),
                    started.elapsed().as_micros() as u64,
                );
                Ok(run_specs)
            }
            Err(e) => {
                METRICS.record_failure();
                emit_compile_failed(&spec.name, &e);
                Err(e)
            }
        }
    }

    fn compile_inner(&self, spec: &ObjectSpec) -> Result<Vec<RunSpec>> {
        let constructor =
            self.constructors
                .get(&spec.name)
                .ok_or_else(|| RunSpecError::UnknownRunFamily {
                    name: spec.name.clone(),
                })?;

        let mut stages: Vec<Box<dyn RunExpander>> = Vec::new();
        let mut plain = Args::new();
        for (key, value) in &spec.args {
            match self.expanders.get(key) {
                Some(factory) => stages.push(factory(value)?),
                None => {
                    plain.insert(key.clone(), value.clone());
                }
            }
        }
        emit_compile_started(&spec.name, spec.args.len(), stages.len());

        let seed = constructor(RunArgs::new(&spec.name, plain))?;
        debug!(run = %seed.name, "canonical run spec constructed");

        let mut run_specs = vec![seed];
        for stage in &stages {
            run_specs = self.apply_stage(stage.as_ref(), run_specs)?;
        }

        ensure_unique_names(&run_specs)?;
        Ok(run_specs)
    }

    /// One flat-map step: every parent, in order, replaced by its children.
    fn apply_stage(&self, stage: &dyn RunExpander, parents: Vec<RunSpec>) -> Result<Vec<RunSpec>> {
        let before = parents.len();
        let mut next = Vec::with_capacity(before);
        for parent in &parents {
            let children = stage
                .expand(parent)
                .map_err(|e| e.in_expander(stage.key()))?;
            if children.is_empty() {
                return Err(RunSpecError::DegenerateExpansion {
                    key: stage.key().to_string(),
                    value: stage.declared_value().to_string(),
                });
            }
            next.extend(children);
            if next.len() > self.config.max_run_specs {
                return Err(RunSpecError::TooManyRunSpecs {
                    limit: self.config.max_run_specs,
                    produced: next.len(),
                });
            }
        }
        emit_expansion_applied(stage.key(), stage.declared_value(), before, next.len());
        Ok(next)
    }
}

fn ensure_unique_names(run_specs: &[RunSpec]) -> Result<()> {
    let mut seen = HashSet::with_capacity(run_specs.len());
    for run_spec in run_specs {
        if !seen.insert(run_spec.name.as_str()) {
            return Err(RunSpecError::DuplicateRunName(run_spec.name.clone()));
        }
    }
    Ok(())
}

/// Compile `spec` with the built-in registries.
pub fn construct_run_specs(spec: &ObjectSpec) -> Result<Vec<RunSpec>> {
    RunSpecCompiler::with_builtins()?.compile(spec)
}
