//! Canonical run families.
//!
//! Every known family is a [`RunFamily`] variant. Each variant owns one
//! constructor that parses its arguments into a typed parameter struct and
//! builds exactly one canonical [`RunSpec`].

mod common;
mod dialogue;
mod generation;
mod language_modeling;
mod qa;
mod simple;

use crate::args::RunArgs;
use crate::domain::{Result, RunSpec};

pub use common::SIMPLE_METRIC_MAX_EVAL_INSTANCES;

/// Closed set of run families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunFamily {
    Simple1,
    Boolq,
    BoolqContrastSets,
    Imdb,
    ImdbContrastSets,
    Copyright,
    Mmlu,
    Msmarco,
    NarrativeQa,
    CommonsenseQa,
    LsatQa,
    Quac,
    Wiki,
    BabiQa,
    RealToxicityPrompts,
    SummarizationXsum,
    SummarizationCnndm,
    TruthfulQa,
    TwitterAae,
    Disinformation,
    Gsm,
    Math,
    NaturalQa,
    Numeracy,
    ThePile,
    SyntheticReasoning,
    SyntheticReasoningNatural,
    NewsQa,
    Wikitext103,
    Blimp,
    Code,
    EmpatheticDialogues,
    WizardOfWikipedia,
    CommonsenseDialogues,
    DyckLanguage,
    LegalSupport,
    Ice,
}

impl RunFamily {
    /// Every family, in registration order.
    pub const ALL: [RunFamily; 37] = [
        RunFamily::Simple1,
        RunFamily::Boolq,
        RunFamily::BoolqContrastSets,
        RunFamily::Imdb,
        RunFamily::ImdbContrastSets,
        RunFamily::Copyright,
        RunFamily::Mmlu,
        RunFamily::Msmarco,
        RunFamily::NarrativeQa,
        RunFamily::CommonsenseQa,
        RunFamily::LsatQa,
        RunFamily::Quac,
        RunFamily::Wiki,
        RunFamily::BabiQa,
        RunFamily::RealToxicityPrompts,
        RunFamily::SummarizationXsum,
        RunFamily::SummarizationCnndm,
        RunFamily::TruthfulQa,
        RunFamily::TwitterAae,
        RunFamily::Disinformation,
        RunFamily::Gsm,
        RunFamily::Math,
        RunFamily::NaturalQa,
        RunFamily::Numeracy,
        RunFamily::ThePile,
        RunFamily::SyntheticReasoning,
        RunFamily::SyntheticReasoningNatural,
        RunFamily::NewsQa,
        RunFamily::Wikitext103,
        RunFamily::Blimp,
        RunFamily::Code,
        RunFamily::EmpatheticDialogues,
        RunFamily::WizardOfWikipedia,
        RunFamily::CommonsenseDialogues,
        RunFamily::DyckLanguage,
        RunFamily::LegalSupport,
        RunFamily::Ice,
    ];

    /// Registry name, also the prefix of every run name in this family.
    pub fn name(&self) -> &'static str {
        match self {
            RunFamily::Simple1 => "simple1",
            RunFamily::Boolq => "boolq",
            RunFamily::BoolqContrastSets => "boolq_contrast_sets",
            RunFamily::Imdb => "imdb",
            RunFamily::ImdbContrastSets => "imdb_contrast_sets",
            RunFamily::Copyright => "copyright",
            RunFamily::Mmlu => "mmlu",
            RunFamily::Msmarco => "msmarco",
            RunFamily::NarrativeQa => "narrative_qa",
            RunFamily::CommonsenseQa => "commonsense_qa",
            RunFamily::LsatQa => "lsat_qa",
            RunFamily::Quac => "quac",
            RunFamily::Wiki => "wiki",
            RunFamily::BabiQa => "babi_qa",
            RunFamily::RealToxicityPrompts => "real_toxicity_prompts",
            RunFamily::SummarizationXsum => "summarization_xsum",
            RunFamily::SummarizationCnndm => "summarization_cnndm",
            RunFamily::TruthfulQa => "truthful_qa",
            RunFamily::TwitterAae => "twitter_aae",
            RunFamily::Disinformation => "disinformation",
            RunFamily::Gsm => "gsm",
            RunFamily::Math => "math",
            RunFamily::NaturalQa => "natural_qa",
            RunFamily::Numeracy => "numeracy",
            RunFamily::ThePile => "the_pile",
            RunFamily::SyntheticReasoning => "synthetic_reasoning",
            RunFamily::SyntheticReasoningNatural => "synthetic_reasoning_natural",
            RunFamily::NewsQa => "news_qa",
            RunFamily::Wikitext103 => "wikitext_103",
            RunFamily::Blimp => "blimp",
            RunFamily::Code => "code",
            RunFamily::EmpatheticDialogues => "empatheticdialogues",
            RunFamily::WizardOfWikipedia => "wizardofwikipedia",
            RunFamily::CommonsenseDialogues => "commonsense_dialogues",
            RunFamily::DyckLanguage => "dyck_language",
            RunFamily::LegalSupport => "legal_support",
            RunFamily::Ice => "ice",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.name() == name)
    }

    /// Build the canonical run spec for this family.
    pub fn construct(&self, args: RunArgs) -> Result<RunSpec> {
        match self {
            RunFamily::Simple1 => simple::simple1(args),
            RunFamily::Boolq => qa::boolq(args),
            RunFamily::BoolqContrastSets => qa::boolq_contrast_sets(args),
            RunFamily::Imdb => qa::imdb(args),
            RunFamily::ImdbContrastSets => qa::imdb_contrast_sets(args),
            RunFamily::Copyright => generation::copyright(args),
            RunFamily::Mmlu => qa::mmlu(args),
            RunFamily::Msmarco => qa::msmarco(args),
            RunFamily::NarrativeQa => qa::narrative_qa(args),
            RunFamily::CommonsenseQa => qa::commonsense_qa(args),
            RunFamily::LsatQa => qa::lsat_qa(args),
            RunFamily::Quac => qa::quac(args),
            RunFamily::Wiki => qa::wiki(args),
            RunFamily::BabiQa => qa::babi_qa(args),
            RunFamily::RealToxicityPrompts => generation::real_toxicity_prompts(args),
            RunFamily::SummarizationXsum => generation::summarization_xsum(args),
            RunFamily::SummarizationCnndm => generation::summarization_cnndm(args),
            RunFamily::TruthfulQa => qa::truthful_qa(args),
            RunFamily::TwitterAae => language_modeling::twitter_aae(args),
            RunFamily::Disinformation => generation::disinformation(args),
            RunFamily::Gsm => generation::gsm(args),
            RunFamily::Math => generation::math(args),
            RunFamily::NaturalQa => qa::natural_qa(args),
            RunFamily::Numeracy => generation::numeracy(args),
            RunFamily::ThePile => language_modeling::the_pile(args),
            RunFamily::SyntheticReasoning => generation::synthetic_reasoning(args),
            RunFamily::SyntheticReasoningNatural => generation::synthetic_reasoning_natural(args),
            RunFamily::NewsQa => qa::news_qa(args),
            RunFamily::Wikitext103 => language_modeling::wikitext_103(args),
            RunFamily::Blimp => language_modeling::blimp(args),
            RunFamily::Code => generation::code(args),
            RunFamily::EmpatheticDialogues => dialogue::empathetic_dialogues(args),
            RunFamily::WizardOfWikipedia => dialogue::wizard_of_wikipedia(args),
            RunFamily::CommonsenseDialogues => dialogue::commonsense_dialogues(args),
            RunFamily::DyckLanguage => generation::dyck_language(args),
            RunFamily::LegalSupport => qa::legal_support(args),
            RunFamily::Ice => language_modeling::ice(args),
        }
    }
}

impl std::fmt::Display for RunFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_family_names_unique() {
        let names: HashSet<_> = RunFamily::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), RunFamily::ALL.len());
    }

    #[test]
    fn test_from_name_roundtrip() {
        for family in RunFamily::ALL {
            assert_eq!(RunFamily::from_name(family.name()), Some(family));
        }
        assert_eq!(RunFamily::from_name("not_a_real_family"), None);
    }
}
