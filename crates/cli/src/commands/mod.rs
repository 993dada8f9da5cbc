//! Subcommands and the setup they share.

pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod prompt;
pub mod tools;

use levain_agent::{ReactAgent, RunOutcome};
use levain_config::AppConfig;
use levain_core::error::ProviderError;
use levain_core::message::Transcript;
use levain_core::tool::ToolRegistry;
use levain_tools::{JsonlStore, bakery_registry};
use prompt::Persona;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Flags that apply to every subcommand.
pub struct Options {
    pub config_path: Option<PathBuf>,
    pub max_turns: Option<usize>,
    pub persona: Option<Persona>,
}

/// Load the config file, apply command-line overrides and validate.
pub fn load_config(options: &Options) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match &options.config_path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(max_turns) = options.max_turns {
        config.agent.max_turns = max_turns;
        config.validate()?;
    }
    Ok(config)
}

/// Build the bakery tool registry, persisting records under `tools.logs_dir`.
pub fn build_registry(config: &AppConfig) -> ToolRegistry {
    let store = Arc::new(JsonlStore::new(config.tools.logs_dir.clone()));
    bakery_registry(store)
}

fn print_api_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    LEVAIN_API_KEY=sk-...   (generic)");
    eprintln!("    OPENAI_API_KEY=sk-...   (for OpenAI direct)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}

/// Everything a conversation needs: the agent and its system prompt.
pub struct Session {
    pub agent: ReactAgent,
    pub system_prompt: String,
    pub run_timeout: Duration,
}

impl Session {
    pub fn from_config(
        config: &AppConfig,
        persona: Option<Persona>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let provider = levain_providers::build_from_config(config).inspect_err(|e| {
            if matches!(e, ProviderError::NotConfigured(_)) {
                print_api_key_help();
            }
        })?;
        let registry = build_registry(config);
        let system_prompt = prompt::build(config, &registry, persona)?;

        let mut agent = ReactAgent::new(
            Arc::new(provider),
            &config.model,
            config.temperature,
            Arc::new(registry),
        )
        .with_max_turns(config.agent.max_turns)
        .with_max_tokens(config.max_tokens);
        if let Some(top_p) = config.top_p {
            agent = agent.with_top_p(top_p);
        }

        Ok(Self {
            agent,
            system_prompt,
            run_timeout: Duration::from_secs(config.agent.run_timeout_secs),
        })
    }

    /// Run the agent over a transcript, bounded by the configured wall-clock timeout.
    pub async fn run(&self, transcript: Transcript) -> Result<RunOutcome, Box<dyn std::error::Error>> {
        let outcome = tokio::time::timeout(self.run_timeout, self.agent.run_transcript(transcript))
            .await
            .map_err(|_| format!("Run timed out after {}s", self.run_timeout.as_secs()))??;
        Ok(outcome)
    }
}
