//! Tool trait and the registry that dispatches to it.
//!
//! Tools are the assistant's side-effecting capabilities: recording a
//! lead, logging a question, booking a pickup. The registry looks a tool
//! up by name, checks the arguments against the tool's declared
//! signature, runs it, and turns every failure into a [`ToolResult`]
//! with `status: error`. Dispatch never fails.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{debug, warn};

/// Outcome flag of a tool execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// The result of a tool execution.
///
/// Serializes flat: `{"status": "success", "message": "...", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub status: ToolStatus,

    pub message: String,

    /// Tool-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ToolResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Success,
            message: message.into(),
            fields: Map::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Attach a tool-specific field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

/// One declared keyword parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
        }
    }
}

/// A tool definition in JSON-schema form, for prompt rendering or export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name the model uses in `Action: <name>(...)`.
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// The keyword parameters this tool accepts.
    fn parameters(&self) -> &[ParamSpec];

    /// When the model should reach for this tool.
    fn usage(&self) -> Option<&str> {
        None
    }

    /// A complete sample call, e.g. `Action: name({"param": "value"})`.
    fn example(&self) -> Option<&str> {
        None
    }

    /// Execute the tool. Arguments have already passed the signature check.
    async fn execute(&self, arguments: Map<String, Value>) -> Result<ToolResult, ToolError>;

    /// Convert this tool into a JSON-schema definition.
    fn to_definition(&self) -> ToolDefinition {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in self.parameters() {
            properties.insert(
                param.name.to_string(),
                serde_json::json!({ "type": "string", "description": param.description }),
            );
            if param.required {
                required.push(Value::from(param.name));
            }
        }
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// Check arguments against a declared signature.
///
/// Returns a human-readable detail on mismatch.
fn check_signature(params: &[ParamSpec], arguments: &Map<String, Value>) -> Result<(), String> {
    let missing: Vec<&str> = params
        .iter()
        .filter(|p| p.required && !arguments.contains_key(p.name))
        .map(|p| p.name)
        .collect();
    let unexpected: Vec<&str> = arguments
        .keys()
        .filter(|k| !params.iter().any(|p| p.name == k.as_str()))
        .map(String::as_str)
        .collect();

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing required argument(s): {}", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        problems.push(format!("unexpected argument(s): {}", unexpected.join(", ")));
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Render the tool catalogue for the system prompt
/// 2. Look up and execute tools when the model emits an Action
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool by name. Every failure mode becomes an error result.
    pub async fn execute(&self, name: &str, arguments: &Map<String, Value>) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = name, "Unknown tool requested");
            return ToolResult::error(format!(
                "unknown tool {name}, available: {}",
                self.names().join(", ")
            ));
        };

        if let Err(detail) = check_signature(tool.parameters(), arguments) {
            warn!(tool = name, %detail, "Tool arguments rejected");
            return ToolResult::error(format!("invalid arguments for {name}: {detail}"));
        }

        debug!(tool = name, "Executing tool");
        match tool.execute(arguments.clone()).await {
            Ok(result) => result,
            Err(ToolError::InvalidArguments(detail)) => {
                warn!(tool = name, %detail, "Tool arguments rejected");
                ToolResult::error(format!("invalid arguments for {name}: {detail}"))
            }
            Err(e) => {
                warn!(tool = name, error = %e, "Tool execution failed");
                ToolResult::error(format!("tool execution error: {e}"))
            }
        }
    }

    /// Render the tool catalogue and the call format for a system prompt.
    pub fn describe(&self) -> String {
        let mut out = String::from("Available Tools:\n");
        for (i, tool) in self.tools.values().enumerate() {
            let signature: Vec<&str> = tool.parameters().iter().map(|p| p.name).collect();
            let _ = write!(
                out,
                "\n{}. {}({})\n   - Purpose: {}\n",
                i + 1,
                tool.name(),
                signature.join(", "),
                tool.description()
            );
            if let Some(usage) = tool.usage() {
                let _ = writeln!(out, "   - When to use: {usage}");
            }
            if !tool.parameters().is_empty() {
                out.push_str("   - Parameters:\n");
                for param in tool.parameters() {
                    let flag = if param.required { "" } else { ", optional" };
                    let _ = writeln!(
                        out,
                        "     * {} (str{flag}): {}",
                        param.name, param.description
                    );
                }
            }
        }
        out.push_str(
            "\nTool Call Format:\nAction: tool_name({\"param1\": \"value1\", \"param2\": \"value2\"})\n",
        );

        let examples: Vec<&str> = self.tools.values().filter_map(|t| t.example()).collect();
        if !examples.is_empty() {
            out.push_str("\nExamples:\n");
            for example in examples {
                let _ = writeln!(out, "{example}");
            }
        }
        out
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    const ECHO_PARAMS: &[ParamSpec] = &[
        ParamSpec::required("text", "Text to echo"),
        ParamSpec::optional("suffix", "Appended to the text"),
    ];

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> &[ParamSpec] {
            ECHO_PARAMS
        }
        fn usage(&self) -> Option<&str> {
            Some("You need to repeat something back")
        }
        fn example(&self) -> Option<&str> {
            Some(r#"Action: echo({"text": "hi"})"#)
        }
        async fn execute(&self, arguments: Map<String, Value>) -> Result<ToolResult, ToolError> {
            let text = arguments["text"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("'text' must be a string".into()))?;
            let suffix = arguments.get("suffix").and_then(Value::as_str).unwrap_or("");
            Ok(ToolResult::success(format!("{text}{suffix}")).with_field("length", text.len()))
        }
    }

    /// A tool whose backing store always fails.
    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> &[ParamSpec] {
            &[]
        }
        async fn execute(&self, _arguments: Map<String, Value>) -> Result<ToolResult, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "disk on fire".into(),
            })
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(BrokenTool));
        registry
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.names(), vec!["broken", "echo"]);
    }

    #[tokio::test]
    async fn execute_success_passes_through() {
        let result = registry()
            .execute("echo", &args(serde_json::json!({"text": "hello"})))
            .await;
        assert!(result.is_success());
        assert_eq!(result.message, "hello");
        assert_eq!(result.fields["length"], 5);
    }

    #[tokio::test]
    async fn execute_unknown_tool_is_data() {
        let result = registry().execute("nonexistent_tool", &Map::new()).await;
        assert_eq!(result.status, ToolStatus::Error);
        assert_eq!(
            result.message,
            "unknown tool nonexistent_tool, available: broken, echo"
        );
    }

    #[tokio::test]
    async fn execute_missing_argument_is_data() {
        let result = registry().execute("echo", &Map::new()).await;
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.message.starts_with("invalid arguments for echo:"));
        assert!(result.message.contains("text"));
    }

    #[tokio::test]
    async fn execute_extra_argument_is_data() {
        let result = registry()
            .execute("echo", &args(serde_json::json!({"text": "a", "volume": 11})))
            .await;
        assert!(result.message.contains("unexpected argument(s): volume"));
    }

    #[tokio::test]
    async fn tool_reported_invalid_arguments_map_to_same_message() {
        let result = registry()
            .execute("echo", &args(serde_json::json!({"text": 42})))
            .await;
        assert_eq!(
            result.message,
            "invalid arguments for echo: 'text' must be a string"
        );
    }

    #[tokio::test]
    async fn execution_failure_is_data() {
        let result = registry().execute("broken", &Map::new()).await;
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.message.starts_with("tool execution error:"));
        assert!(result.message.contains("disk on fire"));
    }

    #[test]
    fn tool_result_serializes_flat() {
        let result = ToolResult::success("ok").with_field("id", "abc");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "message": "ok", "id": "abc"})
        );
    }

    #[test]
    fn describe_lists_tools_and_format() {
        let text = registry().describe();
        assert!(text.contains("echo(text, suffix)"));
        assert!(text.contains("* suffix (str, optional)"));
        assert!(text.contains("Action: tool_name("));
    }

    #[test]
    fn describe_renders_usage_and_examples() {
        let text = registry().describe();
        assert!(text.contains("   - When to use: You need to repeat something back\n"));

        // BrokenTool has neither, so only one example is listed.
        let examples = text.split("\nExamples:\n").nth(1).unwrap();
        assert_eq!(examples, "Action: echo({\"text\": \"hi\"})\n");

        let broken = text.find("broken()").unwrap();
        let echo = text.find("echo(text, suffix)").unwrap();
        assert!(!text[broken..echo].contains("When to use"));
    }

    #[test]
    fn describe_without_examples_has_no_examples_section() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(BrokenTool));
        assert!(!registry.describe().contains("Examples:"));
    }

    #[test]
    fn definitions_mark_required_params() {
        let defs = registry().definitions();
        let echo = defs.iter().find(|d| d.name == "echo").unwrap();
        assert_eq!(echo.parameters["required"], serde_json::json!(["text"]));
    }
}
