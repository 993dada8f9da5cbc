//! Levain CLI: the main entry point.
//!
//! Commands:
//! - `ask`    : Answer a single customer message
//! - `chat`   : Interactive conversation, history carried between questions
//! - `tools`  : Show the tool catalogue given to the model
//! - `config` : Print the default configuration file
//! - `doctor` : Check the configuration and endpoint health

use clap::{Parser, Subcommand};
use commands::prompt::Persona;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "levain",
    about = "Levain — a ReAct bakery assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ~/.levain/config.toml)
    #[arg(short, long, global = true, env = "LEVAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the reasoning turn budget
    #[arg(long, global = true)]
    max_turns: Option<usize>,

    /// Built-in assistant voice; overrides agent.system_prompt_file
    #[arg(long, global = true, value_enum)]
    persona: Option<Persona>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single message and exit
    Ask {
        /// The customer message
        #[arg(short, long)]
        message: String,

        /// Print the answer and run metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat with the assistant interactively
    Chat,

    /// List the available tools
    Tools {
        /// Print JSON-schema definitions instead of the prompt catalogue
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration
    Config,

    /// Diagnose configuration and endpoint health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = commands::Options {
        config_path: cli.config,
        max_turns: cli.max_turns,
        persona: cli.persona,
    };

    match cli.command {
        Commands::Ask { message, json } => commands::ask::run(&options, &message, json).await?,
        Commands::Chat => commands::chat::run(&options).await?,
        Commands::Tools { json } => commands::tools::run(&options, json)?,
        Commands::Config => commands::config_cmd::run(),
        Commands::Doctor => commands::doctor::run(&options).await?,
    }

    Ok(())
}
