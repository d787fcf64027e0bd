//! Metric sets and defaults shared by several run families.

use serde_json::json;

use crate::domain::{AdaptationMethod, AdapterSpec, AdapterSpecBuilder, MetricSpec};

/// Eval-instance cap for families scored only by simple metrics
/// (accuracy, F1).
pub const SIMPLE_METRIC_MAX_EVAL_INSTANCES: u32 = 1000;

pub(crate) fn adapter(method: AdaptationMethod) -> AdapterSpecBuilder {
    AdapterSpec::builder(method)
}

/// Language-modeling adapter used by every perplexity-style family.
pub(crate) fn language_modeling_adapter(method: AdaptationMethod) -> AdapterSpecBuilder {
    adapter(method)
        .max_train_instances(0)
        .num_outputs(1)
        .temperature(0.0)
        .max_tokens(0)
        .stop_sequences(["\n"])
}

pub(crate) fn basic_metrics(names: &[&str]) -> Vec<MetricSpec> {
    vec![MetricSpec::new("basic").with_arg("names", names.to_vec())]
}

pub(crate) fn commonsense_qa_metrics(n_choice: u32) -> Vec<MetricSpec> {
    vec![MetricSpec::new("commonsense_qa").with_arg("n_choice", n_choice)]
}

pub(crate) fn msmarco_metrics() -> Vec<MetricSpec> {
    vec![MetricSpec::new("msmarco")
        .with_arg("name", "mean_reciprocal_rank")
        .with_arg("topk_list", json!([10]))]
}

pub(crate) fn toxicity_metrics() -> Vec<MetricSpec> {
    vec![MetricSpec::new("toxicity")]
}

pub(crate) fn math_metrics() -> Vec<MetricSpec> {
    basic_metrics(&["math_equiv"])
}

pub(crate) fn srn_metrics() -> Vec<MetricSpec> {
    basic_metrics(&["iou_set_match", "exact_set_match"])
}

pub(crate) fn numeracy_metrics(relation_type: &str, run_solver: bool) -> Vec<MetricSpec> {
    let mut metrics = basic_metrics(&["match_upto_whitespace", "absolute_value_difference"]);
    // The solvers for degree-2 relations are slow, so they can be skipped.
    if !matches!(relation_type, "parabola" | "paraboloid") || run_solver {
        metrics.push(MetricSpec::new("numeracy_distance"));
    }
    metrics
}

pub(crate) fn copyright_metrics(normalize_by_prefix_length: bool) -> Vec<MetricSpec> {
    ["longest_common_prefix_length", "edit_distance"]
        .into_iter()
        .map(|name| {
            MetricSpec::new("copyright")
                .with_arg("normalize_by_prefix_length", normalize_by_prefix_length)
                .with_arg("name", name)
        })
        .collect()
}

pub(crate) fn disinformation_metrics() -> Vec<MetricSpec> {
    ["self_bleu", "monte_carlo_entropy"]
        .into_iter()
        .map(|name| MetricSpec::new("disinformation").with_arg("name", name))
        .collect()
}

pub(crate) fn code_metrics(dataset: &str) -> Vec<MetricSpec> {
    if dataset == "HumanEval" {
        basic_metrics(&["code_eval_acc", "pass"])
    } else {
        vec![MetricSpec::new("code_apps").with_arg("names", vec!["test_avg", "strict_acc"])]
    }
}
