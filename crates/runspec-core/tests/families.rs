//! Catalogue-wide checks over every registered run family.

use runspec_core::{
    AdaptationMethod, ConstructorRegistry, ObjectSpec, RunArgs, RunFamily, RunSpec,
    RunSpecCompiler, RunSpecError, Stage,
};

/// A valid entry for each family.
fn sample_entry(family: RunFamily) -> &'static str {
    match family {
        RunFamily::Simple1 => "simple1",
        RunFamily::Boolq => "boolq",
        RunFamily::BoolqContrastSets => "boolq_contrast_sets",
        RunFamily::Imdb => "imdb",
        RunFamily::ImdbContrastSets => "imdb_contrast_sets",
        RunFamily::Copyright => "copyright:pilot_study=false",
        RunFamily::Mmlu => "mmlu:subject=us_foreign_policy",
        RunFamily::Msmarco => "msmarco:task=trec",
        RunFamily::NarrativeQa => "narrative_qa",
        RunFamily::CommonsenseQa => "commonsense_qa:dataset=siqa,method=mcqa",
        RunFamily::LsatQa => "lsat_qa:task=all",
        RunFamily::Quac => "quac",
        RunFamily::Wiki => "wiki:k=5,subject=P19",
        RunFamily::BabiQa => "babi_qa:task=all",
        RunFamily::RealToxicityPrompts => "real_toxicity_prompts",
        RunFamily::SummarizationXsum => "summarization_xsum",
        RunFamily::SummarizationCnndm => "summarization_cnndm",
        RunFamily::TruthfulQa => "truthful_qa:task=mc_single",
        RunFamily::TwitterAae => "twitter_aae:demographic=white",
        RunFamily::Disinformation => "disinformation:capability=wedging",
        RunFamily::Gsm => "gsm",
        RunFamily::Math => "math:subject=number_theory,level=3",
        RunFamily::NaturalQa => "natural_qa:mode=openbook-longans",
        RunFamily::Numeracy => "numeracy:relation_type=plane,mode=example,seed=7",
        RunFamily::ThePile => "the_pile:subset=Enron Emails",
        RunFamily::SyntheticReasoning => "synthetic_reasoning:mode=induction",
        RunFamily::SyntheticReasoningNatural => "synthetic_reasoning_natural:difficulty=hard",
        RunFamily::NewsQa => "news_qa",
        RunFamily::Wikitext103 => "wikitext_103",
        RunFamily::Blimp => "blimp:phenomenon=quantifiers",
        RunFamily::Code => "code:dataset=HumanEval",
        RunFamily::EmpatheticDialogues => {
            "empatheticdialogues:user_initiated=true,annotation_stage=final,begin=0,end=50,batch=1"
        }
        RunFamily::WizardOfWikipedia => {
            "wizardofwikipedia:user_initiated=f,annotation_stage=pilot,begin=10,end=20"
        }
        RunFamily::CommonsenseDialogues => {
            "commonsense_dialogues:user_initiated=t,annotation_stage=inter_annotator,begin=0,end=1"
        }
        RunFamily::DyckLanguage => "dyck_language:num_parenthesis_pairs=2",
        RunFamily::LegalSupport => "legal_support",
        RunFamily::Ice => "ice:subset=can,gender=male",
    }
}

fn compile_one(entry: &str) -> RunSpec {
    let compiler = RunSpecCompiler::with_builtins().expect("builtins");
    let spec = ObjectSpec::parse(entry).expect("parse entry");
    let mut specs = compiler
        .compile(&spec)
        .unwrap_or_else(|e| panic!("{}: {}", entry, e));
    assert_eq!(specs.len(), 1, "{} should not expand", entry);
    specs.remove(0)
}

#[test]
fn test_every_family_builds_a_valid_canonical_spec() {
    for family in RunFamily::ALL {
        let spec = compile_one(sample_entry(family));
        assert!(
            spec.name.starts_with(family.name()),
            "{} does not start with {}",
            spec.name,
            family
        );
        assert!(!spec.metrics.is_empty(), "{} has no metrics", spec.name);
        spec.validate().expect("canonical spec is valid");
        assert_eq!(spec.adapter_spec.interactive, spec.interactive_adapter.is_some());
    }
}

#[test]
fn test_canonical_names_reparse_to_the_same_spec() {
    for family in RunFamily::ALL {
        // Dialogue names carry the model id, which is not a constructor argument.
        if matches!(
            family,
            RunFamily::EmpatheticDialogues
                | RunFamily::WizardOfWikipedia
                | RunFamily::CommonsenseDialogues
        ) {
            continue;
        }
        let spec = compile_one(sample_entry(family));
        let again = compile_one(&spec.name);
        assert_eq!(again, spec, "{} did not round-trip", spec.name);
    }
}

#[test]
fn test_adaptation_methods_all_exercised() {
    let methods: Vec<AdaptationMethod> = RunFamily::ALL
        .into_iter()
        .map(|f| compile_one(sample_entry(f)).adapter_spec.method)
        .collect();
    for method in [
        AdaptationMethod::Generation,
        AdaptationMethod::MultipleChoice,
        AdaptationMethod::LanguageModeling,
        AdaptationMethod::LanguageModelingMinimalPairs,
    ] {
        assert!(methods.contains(&method), "{:?} never used", method);
    }
}

#[test]
fn test_unknown_arguments_rejected_except_for_ice() {
    let registry = ConstructorRegistry::builtin().expect("builtin");
    for family in RunFamily::ALL {
        let mut spec = ObjectSpec::parse(sample_entry(family)).expect("parse");
        spec.args
            .insert("surprise".to_string(), serde_json::json!("value"));
        let constructor = registry.get(family.name()).expect("registered");
        let result = constructor(RunArgs::new(family.name(), spec.args));
        if family == RunFamily::Ice {
            let spec = result.expect("ice passes arguments through");
            assert!(spec.name.ends_with(",surprise=value"));
        } else {
            match result {
                Err(RunSpecError::InvalidArgument { key, reason, .. }) => {
                    assert_eq!(key, "surprise", "{}", family);
                    assert_eq!(reason, "unknown argument");
                }
                other => panic!("{}: expected unknown argument error, got {:?}", family, other),
            }
        }
    }
}

#[test]
fn test_interactive_families_carry_an_interlocutor() {
    for family in [
        RunFamily::EmpatheticDialogues,
        RunFamily::WizardOfWikipedia,
        RunFamily::CommonsenseDialogues,
    ] {
        let spec = compile_one(sample_entry(family));
        let interlocutor = spec.interactive_adapter.expect("interactive adapter");
        assert_eq!(interlocutor.identifier, "dialogue");
        assert_eq!(interlocutor.args["user_name"], "Jen");
    }
}

#[test]
fn test_name_delimiters_in_values_are_rejected() {
    let compiler = RunSpecCompiler::with_builtins().expect("builtins");

    let spec = ObjectSpec::new("ice").with_arg("subset", "can,gender=male");
    match compiler.compile(&spec) {
        Err(RunSpecError::InvalidArgument { stage, key, .. }) => {
            assert_eq!(stage, Stage::constructor("ice"));
            assert_eq!(key, "subset");
        }
        other => panic!("expected invalid argument, got {:?}", other),
    }

    let spec = ObjectSpec::new("ice")
        .with_arg("subset", "can")
        .with_arg("gender", "male");
    let specs = compiler.compile(&spec).expect("separate arguments");
    assert_eq!(specs[0].name, "ice:subset=can,gender=male");

    let spec = ObjectSpec::new("boolq").with_arg("model", "openai/davinci,x=1");
    match compiler.compile(&spec) {
        Err(RunSpecError::InvalidArgument { stage, key, .. }) => {
            assert_eq!(stage, Stage::expander("model"));
            assert_eq!(key, "model");
        }
        other => panic!("expected invalid argument, got {:?}", other),
    }
}

#[test]
fn test_dialogue_model_segment_matches_model_expander() {
    let compiler = RunSpecCompiler::with_builtins().expect("builtins");
    let entry = sample_entry(RunFamily::WizardOfWikipedia);
    let bare = compiler
        .compile(&ObjectSpec::parse(entry).expect("parse"))
        .expect("bare")
        .remove(0);
    assert!(bare.name.contains(",model=ai21_j1-large"));

    let mut spec = ObjectSpec::parse(entry).expect("parse");
    spec.args
        .insert("model".to_string(), serde_json::json!("ai21/j1-large"));
    let expanded = compiler.compile(&spec).expect("expanded").remove(0);
    assert_eq!(expanded.name, bare.name);
}
