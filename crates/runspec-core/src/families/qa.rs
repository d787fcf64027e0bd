//! Question answering, reading comprehension, and classification families.

use crate::args::RunArgs;
use crate::domain::{AdaptationMethod, AdapterSpecBuilder, Result, RunName, RunSpec, ScenarioSpec};

use super::common::{
    adapter, basic_metrics, commonsense_qa_metrics, msmarco_metrics,
    SIMPLE_METRIC_MAX_EVAL_INSTANCES,
};

/// Passage + short answer generation shared by boolq, imdb, and friends.
fn passage_generation(
    output_prefix: &str,
    max_tokens: u32,
    max_eval: Option<u32>,
) -> AdapterSpecBuilder {
    adapter(AdaptationMethod::Generation)
        .input_prefix("Passage: ")
        .output_prefix(output_prefix)
        .num_train_trials(1)
        .max_train_instances(5)
        .max_eval_instances(max_eval)
        .num_outputs(1)
        .max_tokens(max_tokens)
        .temperature(0.0)
        .stop_sequences(["\n"])
}

pub(crate) fn boolq(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    let adapter_spec =
        passage_generation("\nAnswer: ", 1, Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES)).build()?;
    RunSpec::new(
        RunName::new("boolq"),
        ScenarioSpec::new("boolq"),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

pub(crate) fn boolq_contrast_sets(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    // Only 340 perturbed questions exist, so evaluate all of them.
    let adapter_spec = passage_generation("\nAnswer: ", 1, None).build()?;
    RunSpec::new(
        RunName::new("boolq_contrast_sets"),
        ScenarioSpec::new("boolq_contrast_sets"),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

pub(crate) fn imdb(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    let adapter_spec =
        passage_generation("\nSentiment: ", 5, Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES)).build()?;
    RunSpec::new(
        RunName::new("imdb"),
        ScenarioSpec::new("imdb"),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

pub(crate) fn imdb_contrast_sets(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    let adapter_spec = passage_generation("Sentiment:", 10, None).build()?;
    RunSpec::new(
        RunName::new("imdb_contrast_sets"),
        ScenarioSpec::new("imdb_contrast_sets"),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

struct MmluParams {
    subject: String,
}

impl MmluParams {
    fn parse(mut args: RunArgs) -> Result<Self> {
        let subject = args.required_str("subject")?;
        args.finish()?;
        Ok(Self { subject })
    }
}

pub(crate) fn mmlu(args: RunArgs) -> Result<RunSpec> {
    let params = MmluParams::parse(args)?;

    let adapter_spec = adapter(AdaptationMethod::MultipleChoice)
        .instructions(format!(
            "The following are multiple choice questions (with answers) about {}.",
            params.subject.replace('_', " ")
        ))
        .input_prefix("Question: ")
        .output_prefix("\nAnswer: ")
        .max_train_instances(5)
        .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
        .num_outputs(10)
        .num_train_trials(1)
        .temperature(0.0)
        .stop_sequences(["\n"])
        .build()?;

    RunSpec::new(
        RunName::new("mmlu").arg("subject", &params.subject),
        ScenarioSpec::new("mmlu").with_arg("subject", params.subject.as_str()),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

struct MsmarcoParams {
    task: String,
    topk: u32,
    num_eval_queries: u32,
    num_train_queries: u32,
}

impl MsmarcoParams {
    fn parse(mut args: RunArgs) -> Result<Self> {
        let params = Self {
            task: args.required_str("task")?,
            topk: args.u32_or("topk", 30)?,
            num_eval_queries: args.u32_or("num_eval_queries", 500)?,
            num_train_queries: args.u32_or("num_train_queries", 1000)?,
        };
        args.finish()?;
        Ok(params)
    }
}

pub(crate) fn msmarco(args: RunArgs) -> Result<RunSpec> {
    let params = MsmarcoParams::parse(args)?;

    let scenario = ScenarioSpec::new("msmarco")
        .with_arg("task", params.task.as_str())
        .with_arg("topk", params.topk)
        .with_arg("num_eval_queries", params.num_eval_queries)
        .with_arg("num_train_queries", params.num_train_queries);

    let adapter_spec = adapter(AdaptationMethod::MultipleChoice)
        .input_prefix("Passage: ")
        .output_prefix("\nAnswer: ")
        .max_train_instances(4)
        .max_eval_instances(Some(200))
        .num_outputs(1)
        .num_train_trials(1)
        .temperature(0.0)
        .stop_sequences(["\n"])
        .build()?;

    let name = RunName::new("msmarco")
        .arg("task", &params.task)
        .arg("topk", params.topk)
        .arg("num_eval_queries", params.num_eval_queries)
        .arg("num_train_queries", params.num_train_queries);

    RunSpec::new(name, scenario, adapter_spec, msmarco_metrics(), None)
}

pub(crate) fn narrative_qa(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    let adapter_spec = adapter(AdaptationMethod::Generation)
        .input_prefix("Passage: ")
        .output_prefix("\nAnswer: ")
        .num_train_trials(1)
        .max_train_instances(5)
        .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
        .num_outputs(1)
        .max_tokens(100)
        .temperature(0.0)
        .stop_sequences(["\n"])
        .build()?;

    RunSpec::new(
        RunName::new("narrative_qa"),
        ScenarioSpec::new("narrative_qa"),
        adapter_spec,
        basic_metrics(&["exact_match", "f1_score", "rouge-l", "bleu_1", "bleu_4"]),
        None,
    )
}

const MULTI_CHOICE_QUESTION_ANSWERING_METHOD: &str = "mcqa";
const CAUSAL_LANGUAGE_MODELING_METHOD: &str = "clm";

struct CommonsenseQaParams {
    dataset: String,
    method: String,
}

impl CommonsenseQaParams {
    fn parse(mut args: RunArgs) -> Result<Self> {
        let dataset = args.choice(
            "dataset",
            &["hellaswag", "openbookqa", "commonsenseqa", "piqa", "siqa"],
            None,
        )?;
        let method = args.choice(
            "method",
            &[
                MULTI_CHOICE_QUESTION_ANSWERING_METHOD,
                CAUSAL_LANGUAGE_MODELING_METHOD,
            ],
            None,
        )?;
        args.finish()?;
        Ok(Self { dataset, method })
    }

    /// Answer choices per question in each dataset.
    fn n_choice(&self) -> u32 {
        match self.dataset.as_str() {
            "piqa" => 2,
            "siqa" => 3,
            "commonsenseqa" => 5,
            _ => 4,
        }
    }
}

/// One family, two structurally different adaptations: multiple-choice
/// scoring, or causal language modeling over every (question, choice) pair.
pub(crate) fn commonsense_qa(args: RunArgs) -> Result<RunSpec> {
    let params = CommonsenseQaParams::parse(args)?;

    let scenario = ScenarioSpec::new("commonsense_qa")
        .with_arg("dataset", params.dataset.as_str())
        .with_arg("method", params.method.as_str());
    let name = RunName::new("commonsense_qa")
        .arg("dataset", &params.dataset)
        .arg("method", &params.method);

    if params.method == MULTI_CHOICE_QUESTION_ANSWERING_METHOD {
        let adapter_spec = adapter(AdaptationMethod::MultipleChoice)
            .instructions(
                "The following are multiple choice questions (with answers) about common sense.",
            )
            .input_prefix("Question: ")
            .output_prefix("\nAnswer: ")
            .max_train_instances(5)
            .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
            .num_outputs(10)
            .num_train_trials(1)
            .temperature(0.0)
            .stop_sequences(["\n"])
            .build()?;
        RunSpec::new(name, scenario, adapter_spec, basic_metrics(&["exact_match"]), None)
    } else {
        let n_choice = params.n_choice();
        // Each question expands to n_choice scored continuations, each
        // scored twice (with and without the question as context).
        let adapter_spec = adapter(AdaptationMethod::LanguageModeling)
            .max_train_instances(0)
            .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES * n_choice * 2))
            .num_outputs(10)
            .max_tokens(0)
            .num_train_trials(1)
            .temperature(0.0)
            .stop_sequences(["\n"])
            .build()?;
        RunSpec::new(
            name,
            scenario,
            adapter_spec,
            commonsense_qa_metrics(n_choice),
            None,
        )
    }
}

struct TaskParams {
    task: String,
}

impl TaskParams {
    fn parse(mut args: RunArgs) -> Result<Self> {
        let task = args.required_str("task")?;
        args.finish()?;
        Ok(Self { task })
    }
}

pub(crate) fn lsat_qa(args: RunArgs) -> Result<RunSpec> {
    let params = TaskParams::parse(args)?;
    let adapter_spec = adapter(AdaptationMethod::MultipleChoice)
        .instructions("The following are multiple choice questions (with answers).")
        .input_prefix("Passage: ")
        .output_prefix("\nAnswer: ")
        .max_train_instances(2)
        .max_eval_instances(None)
        .num_outputs(1)
        .build()?;

    RunSpec::new(
        RunName::new("lsat_qa").arg("task", &params.task),
        ScenarioSpec::new("lsat_qa").with_arg("task", params.task.as_str()),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

pub(crate) fn quac(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    let adapter_spec = adapter(AdaptationMethod::Generation)
        .output_prefix("\nAnswer: ")
        .num_train_trials(1)
        .max_train_instances(5)
        .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
        .num_outputs(1)
        .max_tokens(100)
        .temperature(0.0)
        .stop_sequences(["\n"])
        .build()?;

    RunSpec::new(
        RunName::new("quac"),
        ScenarioSpec::new("quac"),
        adapter_spec,
        basic_metrics(&["exact_match", "f1_score"]),
        None,
    )
}

pub(crate) fn news_qa(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    let adapter_spec = passage_generation("\nAnswer: ", 50, Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
        .build()?;

    RunSpec::new(
        RunName::new("news_qa"),
        ScenarioSpec::new("news_qa"),
        adapter_spec,
        basic_metrics(&["exact_match", "f1_score"]),
        None,
    )
}

struct WikiParams {
    k: u32,
    subject: String,
}

impl WikiParams {
    fn parse(mut args: RunArgs) -> Result<Self> {
        let k = args.required_u32("k")?;
        if k == 0 {
            return Err(args.invalid("k", k, "must be >= 1"));
        }
        let subject = args.required_str("subject")?;
        args.finish()?;
        Ok(Self { k, subject })
    }
}

pub(crate) fn wiki(args: RunArgs) -> Result<RunSpec> {
    let params = WikiParams::parse(args)?;
    let adapter_spec = adapter(AdaptationMethod::Generation)
        .num_train_trials(1)
        .max_train_instances(5)
        .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
        .num_outputs(params.k)
        .temperature(1.0)
        .max_tokens(8)
        .stop_sequences(["\n"])
        .build()?;

    RunSpec::new(
        RunName::new("wiki")
            .arg("k", params.k)
            .arg("subject", &params.subject),
        ScenarioSpec::new("wiki").with_arg("subject", params.subject.as_str()),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

struct BabiQaParams {
    task: String,
}

impl BabiQaParams {
    fn parse(mut args: RunArgs) -> Result<Self> {
        let task = args.required_str("task")?;
        let valid = task == "all" || matches!(task.parse::<u32>(), Ok(1..=20));
        if !valid {
            return Err(args.invalid("task", &task, "expected a task number 1-20 or 'all'"));
        }
        args.finish()?;
        Ok(Self { task })
    }
}

pub(crate) fn babi_qa(args: RunArgs) -> Result<RunSpec> {
    let params = BabiQaParams::parse(args)?;
    // Task 19 answers are two words; every other task has one-word answers.
    let max_tokens = if params.task == "19" { 2 } else { 1 };
    let adapter_spec = passage_generation("\nAnswer: ", max_tokens, None).build()?;

    RunSpec::new(
        RunName::new("babi_qa").arg("task", &params.task),
        ScenarioSpec::new("babi_qa").with_arg("task", params.task.as_str()),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

pub(crate) fn truthful_qa(args: RunArgs) -> Result<RunSpec> {
    let params = TaskParams::parse(args)?;
    let adapter_spec = adapter(AdaptationMethod::MultipleChoice)
        .input_prefix("Question: ")
        .output_prefix("\nAnswer: ")
        .max_train_instances(5)
        .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
        .num_outputs(1)
        .num_train_trials(1)
        .max_tokens(5)
        .temperature(0.0)
        .stop_sequences(["\n"])
        .build()?;

    RunSpec::new(
        RunName::new("truthful_qa").arg("task", &params.task),
        ScenarioSpec::new("truthful_qa").with_arg("task", params.task.as_str()),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}

struct NaturalQaParams {
    mode: String,
}

impl NaturalQaParams {
    fn parse(mut args: RunArgs) -> Result<Self> {
        let mode = args.required_str("mode")?;
        args.finish()?;
        Ok(Self { mode })
    }
}

pub(crate) fn natural_qa(args: RunArgs) -> Result<RunSpec> {
    let params = NaturalQaParams::parse(args)?;
    let adapter_spec = adapter(AdaptationMethod::Generation)
        .output_prefix("\nAnswer: ")
        .num_train_trials(1)
        .max_train_instances(5)
        .max_eval_instances(Some(SIMPLE_METRIC_MAX_EVAL_INSTANCES))
        .num_outputs(1)
        .max_tokens(300)
        .temperature(0.0)
        .stop_sequences(["\n"])
        .build()?;

    RunSpec::new(
        RunName::new("natural_qa").arg("mode", &params.mode),
        ScenarioSpec::new("natural_qa").with_arg("mode", params.mode.as_str()),
        adapter_spec,
        basic_metrics(&["exact_match", "f1_score"]),
        None,
    )
}

pub(crate) fn legal_support(args: RunArgs) -> Result<RunSpec> {
    args.finish()?;
    let adapter_spec = adapter(AdaptationMethod::MultipleChoice)
        .instructions("Which statement best supports the passage?")
        .input_prefix("Passage: ")
        .output_prefix("\nAnswer: ")
        .temperature(0.0)
        .max_train_instances(3)
        .max_eval_instances(None)
        .num_outputs(10)
        .build()?;

    RunSpec::new(
        RunName::new("legal_support"),
        ScenarioSpec::new("legal_support"),
        adapter_spec,
        basic_metrics(&["exact_match"]),
        None,
    )
}
