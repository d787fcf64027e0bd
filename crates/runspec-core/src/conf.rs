//! Run-entry configuration files.
//!
//! One entry per line, either quoted with a priority
//! (`"mmlu:subject=anatomy": {priority: 2}`) or bare (`simple1`, priority 1).
//! Blank lines and `#` comments are skipped.

use std::fmt;

use crate::domain::{ObjectSpec, Result, RunSpecError};

/// Priority given to entries that do not declare one.
pub const DEFAULT_PRIORITY: u32 = 1;

/// One run entry and its scheduling priority (1 is most important).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEntry {
    pub description: String,
    pub priority: u32,
}

impl RunEntry {
    pub fn new(description: impl Into<String>, priority: u32) -> Self {
        Self {
            description: description.into(),
            priority,
        }
    }

    pub fn object_spec(&self) -> Result<ObjectSpec> {
        ObjectSpec::parse(&self.description)
    }
}

impl fmt::Display for RunEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {{priority: {}}}", self.description, self.priority)
    }
}

fn malformed(line_no: usize, line: &str, reason: &str) -> RunSpecError {
    RunSpecError::MalformedRunEntry(format!("line {}: {}: '{}'", line_no, reason, line))
}

fn parse_priority(line_no: usize, line: &str, rest: &str) -> Result<u32> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(DEFAULT_PRIORITY);
    }
    let body = rest
        .strip_prefix(':')
        .map(str::trim)
        .and_then(|r| r.strip_prefix('{'))
        .and_then(|r| r.strip_suffix('}'))
        .ok_or_else(|| malformed(line_no, line, "expected ': {priority: N}'"))?;

    let value = body
        .trim()
        .strip_prefix("priority")
        .map(str::trim_start)
        .and_then(|r| r.strip_prefix(':'))
        .ok_or_else(|| malformed(line_no, line, "expected 'priority: N'"))?;

    match value.trim().parse::<u32>() {
        Ok(p) if p >= 1 => Ok(p),
        _ => Err(malformed(line_no, line, "priority must be a positive integer")),
    }
}

/// Parse the entries of a run-entry file, in file order.
pub fn parse_run_entries(text: &str) -> Result<Vec<RunEntry>> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let entry = match line.strip_prefix('"') {
            Some(quoted) => {
                let (description, rest) = quoted
                    .split_once('"')
                    .ok_or_else(|| malformed(line_no, line, "unterminated quote"))?;
                RunEntry::new(description.trim(), parse_priority(line_no, line, rest)?)
            }
            None => RunEntry::new(line, DEFAULT_PRIORITY),
        };
        if entry.description.is_empty() {
            return Err(malformed(line_no, line, "empty run entry"));
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Keep entries whose priority is at most `max_priority`.
pub fn filter_by_priority(entries: Vec<RunEntry>, max_priority: u32) -> Vec<RunEntry> {
    entries
        .into_iter()
        .filter(|e| e.priority <= max_priority)
        .collect()
}

/// Tokenizer providers covered by the synthetic efficiency sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerProvider {
    Ai21,
    OpenAi,
    Cohere,
    Opt,
    Yandex,
}

impl TokenizerProvider {
    pub const ALL: [TokenizerProvider; 5] = [
        TokenizerProvider::Ai21,
        TokenizerProvider::OpenAi,
        TokenizerProvider::Cohere,
        TokenizerProvider::Opt,
        TokenizerProvider::Yandex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TokenizerProvider::Ai21 => "ai21",
            TokenizerProvider::OpenAi => "openai",
            TokenizerProvider::Cohere => "cohere",
            TokenizerProvider::Opt => "opt",
            TokenizerProvider::Yandex => "yandex",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// `(model, tokenizer)` pair swept for this provider.
    pub fn model_and_tokenizer(&self) -> (&'static str, &'static str) {
        match self {
            TokenizerProvider::Ai21 => ("ai21_tokenizer", "ai21/j1"),
            TokenizerProvider::OpenAi => ("gpt2_tokenizer", "huggingface/gpt2"),
            TokenizerProvider::Cohere => ("cohere_tokenizer", "cohere/cohere"),
            TokenizerProvider::Opt => ("opt_tokenizer", "meta/opt"),
            TokenizerProvider::Yandex => ("together/yalm", "yandex/yalm"),
        }
    }
}

/// Family of generated efficiency entries. It is executed by an external
/// efficiency runner and is not registered with the compiler.
pub const EFFICIENCY_FAMILY: &str = "synthetic_efficiency";

pub const EFFICIENCY_PROMPT_TOKENS: [u32; 5] = [1, 256, 512, 1024, 1536];
pub const EFFICIENCY_OUTPUT_TOKENS: [u32; 7] = [1, 2, 4, 8, 16, 32, 64];

/// Synthetic efficiency entries for `provider`, prompt sizes outermost.
///
/// `random` (a date tag) makes repeated sweeps distinct run entries.
pub fn efficiency_entries(provider: TokenizerProvider, random: Option<&str>) -> Vec<RunEntry> {
    let (model, tokenizer) = provider.model_and_tokenizer();
    let random = random.map(|r| format!(",random={}", r)).unwrap_or_default();

    EFFICIENCY_PROMPT_TOKENS
        .iter()
        .flat_map(|prompt| {
            let random = random.clone();
            EFFICIENCY_OUTPUT_TOKENS.iter().map(move |output| {
                RunEntry::new(
                    format!(
                        "{}:model={},tokenizer={},num_prompt_tokens={},\
                         num_output_tokens={},num_train_trials=default{}",
                        EFFICIENCY_FAMILY, model, tokenizer, prompt, output, random
                    ),
                    DEFAULT_PRIORITY,
                )
            })
        })
        .collect()
}
