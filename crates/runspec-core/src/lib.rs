//! Run-spec compiler library.
//!
//! Resolves an abstract run description (`ObjectSpec`) into concrete,
//! fully-parameterized run specs: a canonical constructor per run family,
//! then a pipeline of expansion axes folded over the result.

pub mod args;
pub mod compiler;
pub mod conf;
pub mod domain;
pub mod expander;
pub mod families;
pub mod metrics;
pub mod obs;
pub mod registry;
pub mod telemetry;
pub mod tokenizer;

pub use args::RunArgs;

pub use compiler::{construct_run_specs, CompilerConfig, RunSpecCompiler, DEFAULT_MAX_RUN_SPECS};

pub use conf::{
    efficiency_entries, filter_by_priority, parse_run_entries, RunEntry, TokenizerProvider,
    DEFAULT_PRIORITY, EFFICIENCY_FAMILY,
};

pub use domain::{
    AdaptationMethod, AdapterSpec, AdapterSpecBuilder, Args, InteractiveAdapterSpec, MetricSpec,
    IntoRunName, ObjectSpec, Result, RunName, RunSpec, RunSpecError, ScenarioSpec, Stage,
    DEFAULT_MODEL,
};

pub use expander::{ExpanderKind, RunExpander, ALL_MODELS, CODE_MODELS};
pub use families::{RunFamily, SIMPLE_METRIC_MAX_EVAL_INSTANCES};
pub use registry::{ConstructorFn, ConstructorRegistry, ExpanderFactory, ExpanderRegistry};
pub use tokenizer::{resolve_tokenizer_name, TokenizerCache, TokenizerError, TokenizerLoader};

pub use metrics::{MetricsSnapshot, METRICS};
pub use obs::{
    emit_compile_failed, emit_compile_finished, emit_compile_started, emit_expansion_applied,
    CompileSpan,
};
pub use telemetry::init_tracing;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
