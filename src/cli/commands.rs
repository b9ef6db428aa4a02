//! CLI command definitions for gt-forge.
//!
//! One command: augment a domain's task list with rewritten questions and
//! ground-truth action results, then save it next to the source tasks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::domain::{DomainModule, DomainRegistry};
use crate::llm::{LiteLlmClient, LlmProvider, OpenRouterProvider};
use crate::persist::save_tasks;
use crate::pipeline::{AugmentConfig, AugmentPipeline, TaskSelection};
use crate::rewriter::InstructionRewriter;

/// Ground-truth augmentation for tool-use benchmark tasks.
#[derive(Parser, Debug)]
#[command(name = "gt-forge")]
#[command(about = "Augment benchmark tasks with first-person questions and ground-truth action results")]
#[command(version)]
#[command(
    long_about = "gt-forge rewrites each task instruction into a first-person question and replays the task's ground-truth tool calls against a fresh copy of the domain data.\n\nThe augmented list is written to <data-root>/<domain>/tasks_singleturn.json.\n\nExample usage:\n  gt-forge --domain retail --task-indices 0 3 7"
)]
pub struct Cli {
    /// Domain name (airline, retail).
    #[arg(short, long)]
    pub domain: String,

    /// Specific task indices to process. Without it every task is processed
    /// except the domain's known-problematic ones.
    #[arg(short = 't', long, num_args = 1..)]
    pub task_indices: Option<Vec<usize>>,

    /// Root directory holding one sub-directory per domain.
    #[arg(long, env = "GT_FORGE_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// LLM model used to rewrite instructions.
    #[arg(short = 'm', long, env = "GT_FORGE_MODEL")]
    pub model: Option<String>,

    /// Seconds to wait between two processed tasks.
    #[arg(long, env = "GT_FORGE_DELAY_SECS")]
    pub delay_secs: Option<f64>,

    /// OpenRouter API key.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn augment_config(&self) -> anyhow::Result<AugmentConfig> {
        let mut config = AugmentConfig::from_env()?;
        if let Some(root) = &self.data_root {
            config.data_root = root.clone();
        }
        if let Some(model) = &self.model {
            config.rewriter.model = model.clone();
        }
        if let Some(secs) = self.delay_secs {
            config.task_delay = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid --delay-secs value: {}", secs))?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
///
/// The domain is resolved before any LLM client is built, so a bad domain
/// name is reported as such even when no credentials are configured.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = cli.augment_config()?;
    let (registry, module) = resolve_domain(&cli, &config)?;
    let llm = build_llm_client(cli.api_key.clone(), &config.rewriter.model)?;
    let path = augment_and_save(&cli, &config, &registry, &module, llm).await?;
    println!("Tasks saved to {}", path.display());
    Ok(())
}

/// Resolve the domain, augment the selected tasks and save the full list.
///
/// Nothing is written when resolution or any task fails.
pub async fn run_augment(
    cli: &Cli,
    config: &AugmentConfig,
    llm: Arc<dyn LlmProvider>,
) -> anyhow::Result<PathBuf> {
    let (registry, module) = resolve_domain(cli, config)?;
    augment_and_save(cli, config, &registry, &module, llm).await
}

fn resolve_domain(
    cli: &Cli,
    config: &AugmentConfig,
) -> anyhow::Result<(DomainRegistry, DomainModule)> {
    let registry = DomainRegistry::new(&config.data_root);
    let module = registry
        .resolve(&cli.domain)
        .with_context(|| format!("Failed to resolve domain '{}'", cli.domain))?;
    Ok((registry, module))
}

async fn augment_and_save(
    cli: &Cli,
    config: &AugmentConfig,
    registry: &DomainRegistry,
    module: &DomainModule,
    llm: Arc<dyn LlmProvider>,
) -> anyhow::Result<PathBuf> {
    let selection = TaskSelection::for_domain(module.domain(), cli.task_indices.as_deref());
    let rewriter = InstructionRewriter::with_config(llm, config.rewriter.clone());
    let pipeline = AugmentPipeline::new(rewriter, config.task_delay);

    let mut tasks = module.tasks().to_vec();
    let stats = pipeline
        .process_tasks(module, &mut tasks, &selection)
        .await
        .context("Augmentation run aborted")?;

    let path = save_tasks(&tasks, module.domain(), registry.data_root())
        .context("Failed to save augmented tasks")?;
    info!(
        processed = stats.processed,
        skipped = stats.skipped,
        path = %path.display(),
        "Augmentation complete"
    );
    Ok(path)
}

fn build_llm_client(api_key: Option<String>, model: &str) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let resolved_api_key = api_key.or_else(|| std::env::var("OPENROUTER_API_KEY").ok());

    if let Some(key) = resolved_api_key {
        if model.is_empty() {
            info!("Using OpenRouter with default model");
            Ok(Arc::new(OpenRouterProvider::new(key)))
        } else {
            info!(model = %model, "Using OpenRouter with specified API key");
            Ok(Arc::new(OpenRouterProvider::with_model(key, model.to_string())))
        }
    } else {
        info!("Using LiteLLM client from environment");
        Ok(Arc::new(LiteLlmClient::from_env().map_err(|e| {
            anyhow::anyhow!(
                "Failed to initialize LLM client: {}. Please provide --api-key or set OPENROUTER_API_KEY/LITELLM_API_BASE env var.",
                e
            )
        })?))
    }
}
