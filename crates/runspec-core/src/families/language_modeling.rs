//! Perplexity-style families that score text rather than generate it.

use serde_json::Value;

use crate::args::RunArgs;
use crate::domain::{AdaptationMethod, Result, RunName, RunSpec, ScenarioSpec};

use super::common::{basic_metrics, language_modeling_adapter, SIMPLE_METRIC_MAX_EVAL_INSTANCES};

pub(crate) fn twitter_aae(mut args: RunArgs) -> Result<RunSpec> {
    let demographic = args.choice("demographic", &["aa", "white"], None)?;
    args.finish()?;

    let adapter_spec = language_modeling_adapter(AdaptationMethod::LanguageModeling)
        .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
        .num_train_trials(1)
        .build()?;

    RunSpec::new(
        RunName::new("twitter_aae").arg("demographic", &demographic),
        ScenarioSpec::new("twitter_aae").with_arg("demographic", demographic.as_str()),
        adapter_spec,
        basic_metrics(&[]),
        None,
    )
}

pub(crate) fn the_pile(mut args: RunArgs) -> Result<RunSpec> {
    let subset = args.required_str("subset")?;
    args.finish()?;

    let adapter_spec = language_modeling_adapter(AdaptationMethod::LanguageModeling)
        .max_eval_instances(None)
        .build()?;

    RunSpec::new(
        RunName::new("the_pile").arg("subset", &subset),
        ScenarioSpec::new("the_pile").with_arg("subset", subset.as_str()),
        adapter_spec,
        basic_metrics(&[]),
        None,
    )
}

pub(crate) fn wikitext_103(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    let adapter_spec = language_modeling_adapter(AdaptationMethod::LanguageModeling)
        .max_eval_instances(None)
        .build()?;

    RunSpec::new(
        RunName::new("wikitext_103"),
        ScenarioSpec::new("wikitext_103"),
        adapter_spec,
        basic_metrics(&[]),
        None,
    )
}

pub(crate) fn blimp(mut args: RunArgs) -> Result<RunSpec> {
    let phenomenon = args.required_str("phenomenon")?;
    args.finish()?;

    let adapter_spec = language_modeling_adapter(AdaptationMethod::LanguageModelingMinimalPairs)
        .max_eval_instances(None)
        .build()?;

    RunSpec::new(
        RunName::new("blimp").arg("phenomenon", &phenomenon),
        ScenarioSpec::new("blimp").with_arg("phenomenon", phenomenon.as_str()),
        adapter_spec,
        basic_metrics(&[]),
        None,
    )
}

fn name_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// ICE subsets are selected by free-form filters, so every argument is
/// handed to the scenario untouched and listed in the run name.
pub(crate) fn ice(args: RunArgs) -> Result<RunSpec> {
    let filters = args.into_remaining();

    let mut name = RunName::new("ice");
    for (key, value) in &filters {
        name = name.arg(key.as_str(), name_value(value));
    }

    let mut scenario = ScenarioSpec::new("ice");
    scenario.args = filters;

    let adapter_spec = language_modeling_adapter(AdaptationMethod::LanguageModeling)
        .reference_prefix("")
        .max_eval_instances(None)
        .build()?;

    RunSpec::new(name, scenario, adapter_spec, basic_metrics(&[]), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Args;
    use serde_json::json;

    fn run_args(family: &str, pairs: &[(&str, Value)]) -> RunArgs {
        let mut map = Args::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.clone());
        }
        RunArgs::new(family, map)
    }

    #[test]
    fn test_language_modeling_adapters_have_no_generation_budget() {
        let specs = [
            twitter_aae(run_args("twitter_aae", &[("demographic", json!("aa"))])),
            the_pile(run_args("the_pile", &[("subset", json!("ArXiv"))])),
            wikitext_103(run_args("wikitext_103", &[])),
            blimp(run_args("blimp", &[("phenomenon", json!("island_effects"))])),
            ice(run_args("ice", &[])),
        ];
        for spec in specs {
            let spec = spec.expect("construct");
            assert!(spec.adapter_spec.method.is_language_modeling(), "{}", spec.name);
            assert_eq!(spec.adapter_spec.max_tokens, 0);
            assert_eq!(spec.adapter_spec.max_train_instances, 0);
        }
    }

    #[test]
    fn test_twitter_aae_rejects_unknown_demographic() {
        assert!(twitter_aae(run_args("twitter_aae", &[("demographic", json!("hispanic"))])).is_err());
    }

    #[test]
    fn test_blimp_uses_minimal_pairs() {
        let spec = blimp(run_args("blimp", &[("phenomenon", json!("binding"))])).expect("blimp");
        assert_eq!(
            spec.adapter_spec.method,
            AdaptationMethod::LanguageModelingMinimalPairs
        );
        assert_eq!(spec.name, "blimp:phenomenon=binding");
    }

    #[test]
    fn test_ice_passes_arguments_through() {
        let spec = ice(run_args(
            "ice",
            &[("subset", json!("ea")), ("gender", json!("female"))],
        ))
        .expect("ice");
        assert_eq!(spec.name, "ice:subset=ea,gender=female");
        assert_eq!(spec.scenario.args["gender"], json!("female"));
        assert_eq!(spec.adapter_spec.reference_prefix, "");

        let bare = ice(run_args("ice", &[])).expect("bare ice");
        assert_eq!(bare.name, "ice");
    }
}
