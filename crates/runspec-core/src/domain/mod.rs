//! Domain models for run-spec compilation.
//!
//! - `ObjectSpec`: caller-supplied run description
//! - `ScenarioSpec`, `AdapterSpec`, `MetricSpec`: the three independent specs
//! - `RunSpec`: a compiled, fully-parameterized run

pub mod adapter;
pub mod digest;
pub mod error;
pub mod object_spec;
pub mod run_spec;
pub mod scenario;

pub use adapter::{AdaptationMethod, AdapterSpec, AdapterSpecBuilder, DEFAULT_MODEL};
pub use error::{Result, RunSpecError, Stage};
pub use object_spec::{Args, ObjectSpec};
pub use run_spec::{IntoRunName, RunName, RunSpec};
pub use scenario::{InteractiveAdapterSpec, MetricSpec, ScenarioSpec};
