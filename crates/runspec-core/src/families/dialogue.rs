//! Interactive dialogue families.
//!
//! All three share one adapter shape and attach a dialogue interlocutor; they
//! differ in scenario and default model.

use crate::args::RunArgs;
use crate::domain::run_spec::sanitize_name_value;
use crate::domain::{
    AdaptationMethod, InteractiveAdapterSpec, Result, RunName, RunSpec, ScenarioSpec,
};

use super::common::{adapter, basic_metrics};

const USER_NAME: &str = "Jen";
const AGENT_NAME: &str = "Bob";

struct DialogueParams {
    user_initiated: bool,
    annotation_stage: String,
    begin: u32,
    end: u32,
    batch: Option<u32>,
}

impl DialogueParams {
    fn parse(mut args: RunArgs) -> Result<Self> {
        let params = Self {
            user_initiated: args.required_bool("user_initiated")?,
            annotation_stage: args.required_str("annotation_stage")?,
            begin: args.required_u32("begin")?,
            end: args.required_u32("end")?,
            batch: args.opt_u32("batch")?,
        };
        if params.end < params.begin {
            return Err(args.invalid(
                "end",
                params.end,
                format!("must not be less than begin ({})", params.begin),
            ));
        }
        args.finish()?;
        Ok(params)
    }
}

fn dialogue_spec(family: &str, model: &str, args: RunArgs) -> Result<RunSpec> {
    let params = DialogueParams::parse(args)?;

    let scenario = ScenarioSpec::new(family)
        .with_arg("begin", params.begin)
        .with_arg("end", params.end);

    let adapter_spec = adapter(AdaptationMethod::Generation)
        .input_prefix("Prompt: ")
        .output_prefix("\n<div class=\"conversation\">\n")
        .num_train_trials(1)
        .max_train_instances(5)
        .model(model)
        .max_eval_instances(Some(100))
        .stop_sequences(["\"</span>", "</div>", "\"", "</span>"])
        .num_outputs(1)
        .max_tokens(50)
        .temperature(0.9)
        .interactive(true)
        .build()?;

    let name = RunName::new(family)
        .arg("annotation_stage", &params.annotation_stage)
        .arg("user_initiated", params.user_initiated)
        .arg("begin", params.begin)
        .arg("end", params.end)
        .arg("model", sanitize_name_value(&adapter_spec.model))
        .opt_arg("batch", params.batch);

    let interlocutor = InteractiveAdapterSpec::new("dialogue")
        .with_arg("user_initiated", params.user_initiated)
        .with_arg("user_name", USER_NAME)
        .with_arg("agent_name", AGENT_NAME);

    RunSpec::new(
        name,
        scenario,
        adapter_spec,
        basic_metrics(&["exact_match"]),
        Some(interlocutor),
    )
}

pub(crate) fn empathetic_dialogues(args: RunArgs) -> Result<RunSpec> {
    dialogue_spec("empatheticdialogues", "openai/text-davinci-002", args)
}

pub(crate) fn wizard_of_wikipedia(args: RunArgs) -> Result<RunSpec> {
    dialogue_spec("wizardofwikipedia", "ai21/j1-large", args)
}

pub(crate) fn commonsense_dialogues(args: RunArgs) -> Result<RunSpec> {
    dialogue_spec("commonsense_dialogues", "openai/text-davinci-002", args)
}
