//! `record_feedback`: log a question the assistant could not answer.

use crate::record::{parse_args, stamped};
use async_trait::async_trait;
use levain_core::error::ToolError;
use levain_core::store::RecordStore;
use levain_core::tool::{ParamSpec, Tool, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const LOG: &str = "feedback";

const PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "question",
    "The customer's question or feedback",
)];

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedbackArgs {
    question: String,
}

pub struct RecordFeedbackTool {
    store: Arc<dyn RecordStore>,
}

impl RecordFeedbackTool {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RecordFeedbackTool {
    fn name(&self) -> &str {
        "record_feedback"
    }

    fn description(&self) -> &str {
        "Log unknown questions or general feedback. Use when you cannot answer confidently from the business documents."
    }

    fn parameters(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn usage(&self) -> Option<&str> {
        Some("You cannot answer confidently from the business documents")
    }

    fn example(&self) -> Option<&str> {
        Some(r#"Action: record_feedback({"question": "Do you have gluten-free sourdough daily?"})"#)
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: FeedbackArgs = parse_args(arguments)?;
        self.store.append(LOG, stamped(self.name(), &args)?).await?;
        Ok(ToolResult::success(
            "Thank you! We've logged your question for our team to review.",
        ))
    }
}
