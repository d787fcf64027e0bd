//! `runspec` - run-spec compiler CLI
//!
//! ## Commands
//!
//! - `compile`: Resolve run entries into concrete run specs
//! - `families`: List run families and expansion axes
//! - `efficiency-conf`: Write a synthetic efficiency run-entry file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use runspec_core::{
    efficiency_entries, filter_by_priority, parse_run_entries, CompilerConfig,
    ConstructorRegistry, ExpanderKind, ExpanderRegistry, ObjectSpec, RunEntry, RunFamily,
    RunSpec, RunSpecCompiler, TokenizerProvider, DEFAULT_MAX_RUN_SPECS, EFFICIENCY_FAMILY,
    METRICS,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "runspec")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile benchmark run entries into run specs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true, env = "RUNSPEC_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile run entries (e.g. "mmlu:subject=anatomy,model=openai/davinci")
    Compile {
        /// Run entries to compile
        entries: Vec<String>,

        /// Run-entry file, one `"entry": {priority: N}` per line
        #[arg(short, long)]
        conf: Option<PathBuf>,

        /// Skip conf entries with a priority above this
        #[arg(long)]
        max_priority: Option<u32>,

        /// Print run names only, one per line
        #[arg(long)]
        names_only: bool,

        /// Fail an entry that expands to more run specs than this
        #[arg(long, env = "RUNSPEC_MAX_RUN_SPECS", default_value_t = DEFAULT_MAX_RUN_SPECS)]
        max_run_specs: usize,
    },

    /// List run families and expansion axes
    Families,

    /// Generate run entries sweeping prompt and output sizes for one tokenizer
    ///
    /// The entries use the `synthetic_efficiency` family, which is run by the
    /// efficiency runner. `runspec compile` rejects them.
    EfficiencyConf {
        /// Tokenizer provider
        #[arg(long, value_enum)]
        tokenizer_provider: ProviderArg,

        /// Where to write the run-entry file
        #[arg(long)]
        output_path: PathBuf,

        /// Omit the date tag that keeps repeated sweeps distinct
        #[arg(long)]
        no_random: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    #[value(name = "ai21")]
    Ai21,
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "cohere")]
    Cohere,
    #[value(name = "opt")]
    Opt,
    #[value(name = "yandex")]
    Yandex,
}

impl From<ProviderArg> for TokenizerProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Ai21 => TokenizerProvider::Ai21,
            ProviderArg::OpenAi => TokenizerProvider::OpenAi,
            ProviderArg::Cohere => TokenizerProvider::Cohere,
            ProviderArg::Opt => TokenizerProvider::Opt,
            ProviderArg::Yandex => TokenizerProvider::Yandex,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    runspec_core::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Compile {
            entries,
            conf,
            max_priority,
            names_only,
            max_run_specs,
        } => {
            cmd_compile(
                &entries,
                conf.as_deref(),
                max_priority,
                names_only,
                max_run_specs,
            )
            .await
        }
        Commands::Families => {
            print!("{}", render_families());
            Ok(())
        }
        Commands::EfficiencyConf {
            tokenizer_provider,
            output_path,
            no_random,
        } => cmd_efficiency_conf(tokenizer_provider.into(), &output_path, no_random).await,
    };

    METRICS.flush();
    result
}

/// Collect entries from the command line, then from the conf file.
async fn collect_entries(
    entries: &[String],
    conf: Option<&Path>,
    max_priority: Option<u32>,
) -> Result<Vec<String>> {
    let mut descriptions: Vec<String> = entries.to_vec();

    if let Some(path) = conf {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read run-entry file: {:?}", path))?;
        let mut parsed = parse_run_entries(&text)
            .with_context(|| format!("Invalid run-entry file: {:?}", path))?;
        if let Some(max) = max_priority {
            parsed = filter_by_priority(parsed, max);
        }
        descriptions.extend(parsed.into_iter().map(|e| e.description));
    }

    if descriptions.is_empty() {
        anyhow::bail!("No run entries given. Pass entries or --conf <FILE>.");
    }
    Ok(descriptions)
}

/// Compile every entry, in order.
fn compile_entries(compiler: &RunSpecCompiler, descriptions: &[String]) -> Result<Vec<RunSpec>> {
    let mut run_specs = Vec::new();
    for description in descriptions {
        let spec = ObjectSpec::parse(description)
            .with_context(|| format!("Invalid run entry: {}", description))?;
        if spec.name == EFFICIENCY_FAMILY {
            anyhow::bail!(
                "Run entry {} belongs to the {} family, which is executed by the efficiency \
                 runner and cannot be compiled here",
                description,
                EFFICIENCY_FAMILY
            );
        }
        let compiled = compiler
            .compile(&spec)
            .with_context(|| format!("Failed to compile run entry: {}", description))?;
        info!(entry = %description, run_specs = compiled.len(), "compiled run entry");
        run_specs.extend(compiled);
    }
    Ok(run_specs)
}

async fn cmd_compile(
    entries: &[String],
    conf: Option<&Path>,
    max_priority: Option<u32>,
    names_only: bool,
    max_run_specs: usize,
) -> Result<()> {
    let descriptions = collect_entries(entries, conf, max_priority).await?;
    let compiler = build_compiler(max_run_specs)?;
    let run_specs = compile_entries(&compiler, &descriptions)?;

    if names_only {
        for spec in &run_specs {
            println!("{}", spec.name);
        }
    } else {
        let json =
            serde_json::to_string_pretty(&run_specs).context("Failed to serialize run specs")?;
        println!("{}", json);
    }
    Ok(())
}

fn build_compiler(max_run_specs: usize) -> Result<RunSpecCompiler> {
    if max_run_specs == 0 {
        anyhow::bail!("--max-run-specs must be at least 1");
    }
    Ok(RunSpecCompiler::new(
        ConstructorRegistry::builtin().context("Failed to build constructor registry")?,
        ExpanderRegistry::builtin().context("Failed to build expander registry")?,
        CompilerConfig::default().with_max_run_specs(max_run_specs),
    ))
}

fn render_families() -> String {
    let mut out = String::from("Run families:\n");
    for family in RunFamily::ALL {
        out.push_str(&format!("  {}\n", family.name()));
    }
    out.push_str("\nExpansion axes:\n");
    for kind in ExpanderKind::ALL {
        out.push_str(&format!(
            "  {:<20} presets: {}\n",
            kind.key(),
            kind.presets().join(", ")
        ));
    }
    out
}

fn render_conf(entries: &[RunEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}

async fn cmd_efficiency_conf(
    provider: TokenizerProvider,
    output_path: &Path,
    no_random: bool,
) -> Result<()> {
    let date = chrono::Local::now().format("%m/%d/%Y").to_string();
    let random = (!no_random).then_some(date.as_str());
    let entries = efficiency_entries(provider, random);

    tokio::fs::write(output_path, render_conf(&entries))
        .await
        .with_context(|| format!("Failed to write run-entry file: {:?}", output_path))?;

    info!(
        provider = provider.name(),
        entries = entries.len(),
        path = %output_path.display(),
        "wrote efficiency run entries"
    );
    println!(
        "Wrote {} run entries for {} to {:?}",
        entries.len(),
        provider.name(),
        output_path
    );
    Ok(())
}
