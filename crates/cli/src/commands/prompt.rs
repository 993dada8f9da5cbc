//! System prompt assembly: persona, turn format, tool catalogue and
//! business context files.

use clap::ValueEnum;
use levain_config::AppConfig;
use levain_core::tool::ToolRegistry;
use std::path::Path;

/// Built-in assistant voices. Both enforce the same bakery policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Persona {
    /// Warm and conversational
    #[default]
    #[value(alias = "friendly_advisor")]
    FriendlyAdvisor,
    /// Precise, policy first, minimal wording
    #[value(alias = "strict_expert")]
    StrictExpert,
}

impl Persona {
    pub fn text(self) -> &'static str {
        match self {
            Self::FriendlyAdvisor => FRIENDLY_ADVISOR,
            Self::StrictExpert => STRICT_EXPERT,
        }
    }
}

const FRIENDLY_ADVISOR: &str = "\
You are the Friendly Advisor for Fleur de Pain bakery.

Voice: warm and welcoming. Use plain, conversational language and keep
replies short.

Always enforce these policies:
1. Fresh batches come out every 3 hours; nothing day-old is sold as fresh.
2. Custom cakes need at least 24 hours notice.
3. Pre-orders are taken over WhatsApp only.
4. Delivery, when available, comes in 2-hour windows.
5. Never invent prices or availability. Answer from the business
   information below, or ask for details.

If a customer asks something the business information does not cover,
log it with record_feedback and tell them the team will follow up.";

const STRICT_EXPERT: &str = "\
You are the Strict Expert for Fleur de Pain bakery.

Voice: precise and policy first. Minimal wording, facts only.

Policies (non-negotiable):
1. Fresh batches every 3 hours.
2. Custom cakes: 24 hours notice required.
3. Pre-orders: WhatsApp only.
4. Delivery: 2-hour windows.
5. No invented prices or availability.

Unknown questions: log with record_feedback, then state that the
information is not available.";

const TURN_FORMAT: &str = "\
Reply in exactly one of these two shapes.

To answer directly:
Thought: <your reasoning>
Answer: <your reply to the customer>

To use a tool:
Thought: <your reasoning>
Action: tool_name({\"param\": \"value\"})

After an Action, stop and wait. The tool result arrives as an
`Observation:` message; then continue with an Answer.";

/// Build the full system prompt for a config and tool registry.
///
/// An explicit `persona` wins over `agent.system_prompt_file`; with
/// neither, the friendly advisor is used.
pub fn build(
    config: &AppConfig,
    registry: &ToolRegistry,
    persona: Option<Persona>,
) -> Result<String, Box<dyn std::error::Error>> {
    let persona = match (persona, &config.agent.system_prompt_file) {
        (Some(persona), _) => persona.text().to_string(),
        (None, Some(path)) => read(path)?,
        (None, None) => Persona::default().text().to_string(),
    };

    let mut context = Vec::with_capacity(config.agent.context_files.len());
    for path in &config.agent.context_files {
        let label = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        context.push((label, read(path)?));
    }

    Ok(compose(&persona, &registry.describe(), &context))
}

fn read(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()).into())
}

/// Join the prompt sections. Context entries are `(label, contents)`.
pub fn compose(persona: &str, tool_catalogue: &str, context: &[(String, String)]) -> String {
    let mut prompt = format!("{}\n\n{TURN_FORMAT}\n\n{}", persona.trim(), tool_catalogue.trim_end());

    if !context.is_empty() {
        prompt.push_str("\n\nBUSINESS INFORMATION:\n");
        for (label, contents) in context {
            prompt.push_str(&format!("\n=== {label} ===\n{}\n", contents.trim()));
        }
    }
    prompt
}
