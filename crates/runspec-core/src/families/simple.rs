//! Debugging family with a synthetic scenario.

use crate::args::RunArgs;
use crate::domain::{AdaptationMethod, Result, RunName, RunSpec, ScenarioSpec};

use super::common::{adapter, basic_metrics};

pub(crate) fn simple1(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;

    let scenario = ScenarioSpec::new("simple1")
        .with_arg("num_input_tokens", 5)
        .with_arg("vocab_size", 20)
        .with_arg("num_train_instances", 10)
        .with_arg("num_test_instances", 10);

    let adapter_spec = adapter(AdaptationMethod::Generation)
        .instructions("Please solve the following problem.")
        .max_train_instances(5)
        .max_eval_instances(Some(10))
        .num_outputs(3)
        .num_train_trials(3)
        .model("simple/model1")
        .temperature(1.0)
        .stop_sequences(["."])
        .build()?;

    RunSpec::new(
        RunName::new("simple1"),
        scenario,
        adapter_spec,
        basic_metrics(&[]),
        None,
    )
}
