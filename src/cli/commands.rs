//! CLI commands implementation.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use crate::civitai::{parse_identifier, CivitaiClient, MetadataResolver};
use crate::config::{load_settings, Settings};
use crate::processor::{node_descriptor, NodeInputs, Processor, RETURN_NAMES};

#[derive(Parser)]
#[command(name = "civitai-processor")]
#[command(about = "Resolve Civitai model references and annotate them with an LLM")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "CIVITAI_PROCESSOR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Show the model and version ids found in a link or identifier
    Parse {
        /// Civitai link, model id or AIR identifier
        input: String,
    },

    /// Fetch model and version metadata
    Resolve {
        /// Civitai link, model id or AIR identifier
        input: String,
        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the full node: resolve, then annotate with the LLM
    Process {
        /// Civitai link, model id or AIR identifier
        input: String,
        /// Completion service token
        #[arg(short, long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
        token: String,
        /// Extra context for the model
        #[arg(short, long, default_value = "")]
        info: String,
        /// Custom system prompt
        #[arg(long, conflicts_with = "system_prompt_file")]
        system_prompt: Option<String>,
        /// Read the custom system prompt from a file
        #[arg(long)]
        system_prompt_file: Option<PathBuf>,
        /// Print the outputs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the node descriptor as JSON
    Describe,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input } => cmd_parse(&input),
        Commands::Resolve { input, json } => {
            let settings = load_settings(cli.config.as_deref())?;
            cmd_resolve(&settings, &input, json).await
        }
        Commands::Process {
            input,
            token,
            info,
            system_prompt,
            system_prompt_file,
            json,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            let system_prompt = match system_prompt_file {
                Some(path) => std::fs::read_to_string(&path).with_context(|| {
                    format!("Failed to read system prompt: {}", path.display())
                })?,
                None => system_prompt.unwrap_or_default(),
            };
            let inputs = NodeInputs::new(input, token)
                .with_additional_info(info)
                .with_system_prompt(system_prompt);
            cmd_process(&settings, &inputs, json).await
        }
        Commands::Describe => {
            println!("{}", serde_json::to_string_pretty(&node_descriptor())?);
            Ok(())
        }
    }
}

fn cmd_parse(input: &str) -> anyhow::Result<()> {
    let ids = parse_identifier(input);
    if ids.is_empty() {
        anyhow::bail!("No model or version id found in input");
    }

    let show = |id: Option<u64>| {
        id.map(|v| v.to_string())
            .unwrap_or_else(|| style("unknown").dim().to_string())
    };
    println!("{:<10} {}", style("model").bold(), show(ids.model_id));
    println!("{:<10} {}", style("version").bold(), show(ids.version_id));
    Ok(())
}

async fn cmd_resolve(settings: &Settings, input: &str, json: bool) -> anyhow::Result<()> {
    let client = CivitaiClient::new(settings.civitai.clone())?;
    let resolver = MetadataResolver::new(client);
    let bundle = resolver.resolve(input).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
        return Ok(());
    }

    println!("{} {}", style("AIR ID:").bold(), bundle.air_id);
    println!("{} {}", style("Model:").bold(), bundle.model_name);
    println!("{} {}", style("Version:").bold(), bundle.version_name);
    println!("{}", style("Trigger words:").bold());
    if bundle.trained_words.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for word in &bundle.trained_words {
        println!("  - {}", word);
    }
    println!("{}", style("Description:").bold());
    println!("{}", bundle.description);
    Ok(())
}

async fn cmd_process(settings: &Settings, inputs: &NodeInputs, json: bool) -> anyhow::Result<()> {
    let processor = Processor::from_settings(settings)?;
    let outputs = processor.process(inputs).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    for (name, value) in RETURN_NAMES.iter().zip(outputs.into_array()) {
        println!("{}", style(format!("{}:", name)).bold());
        println!("  {}", value);
    }
    Ok(())
}
