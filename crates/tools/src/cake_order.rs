//! `create_cake_order`: structured custom cake orders.
//!
//! Custom cakes need 24 hours' notice; that policy lives in the persona
//! prompt, not here. The tool only records what the model collected.

use crate::record::{parse_args, stamped};
use async_trait::async_trait;
use levain_core::error::ToolError;
use levain_core::store::RecordStore;
use levain_core::tool::{ParamSpec, Tool, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const LOG: &str = "cake_orders";

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("name", "Customer's full name"),
    ParamSpec::required("email", "Customer's email or WhatsApp"),
    ParamSpec::required("cake_size", "Size, e.g. \"8 inch\", \"serves 15\", \"medium\""),
    ParamSpec::required("flavor", "Cake flavor, e.g. \"chocolate\", \"red velvet\""),
    ParamSpec::required("pickup_date", "Pickup date, at least 24 hours from now"),
    ParamSpec::optional("custom_message", "Message or text to write on the cake"),
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CakeOrderArgs {
    name: String,
    email: String,
    cake_size: String,
    flavor: String,
    pickup_date: String,
    #[serde(default)]
    custom_message: String,
}

pub struct CakeOrderTool {
    store: Arc<dyn RecordStore>,
}

impl CakeOrderTool {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

/// Uppercase the first character, lowercase the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl Tool for CakeOrderTool {
    fn name(&self) -> &str {
        "create_cake_order"
    }

    fn description(&self) -> &str {
        "Create a structured custom cake order. Only for custom celebration cakes; requires 24-hour notice."
    }

    fn parameters(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn usage(&self) -> Option<&str> {
        Some("Customer specifically wants a CUSTOM CAKE (not general orders)")
    }

    fn example(&self) -> Option<&str> {
        Some(r#"Action: create_cake_order({"name": "Maria", "email": "maria@test.com", "cake_size": "serves 20", "flavor": "chocolate", "pickup_date": "2025-10-28", "custom_message": "Happy Birthday!"})"#)
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: CakeOrderArgs = parse_args(arguments)?;
        self.store.append(LOG, stamped(self.name(), &args)?).await?;
        Ok(ToolResult::success(format!(
            "Custom cake order received for {}! {} cake ({}) scheduled for {}. \
             Our team will reach out via {} to confirm details and pricing.",
            args.name,
            capitalize(&args.flavor),
            args.cake_size,
            args.pickup_date,
            args.email
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn order(extra: Option<(&str, &str)>) -> Map<String, Value> {
        let mut args = serde_json::json!({
            "name": "Maria",
            "email": "maria@test.com",
            "cake_size": "serves 20",
            "flavor": "chocolate",
            "pickup_date": "2025-10-28"
        })
        .as_object()
        .cloned()
        .unwrap();
        if let Some((k, v)) = extra {
            args.insert(k.into(), v.into());
        }
        args
    }

    #[tokio::test]
    async fn custom_message_defaults_to_empty() {
        let store = InMemoryStore::new();
        let tool = CakeOrderTool::new(Arc::new(store.clone()));

        let result = tool.execute(order(None)).await.unwrap();
        assert_eq!(
            result.message,
            "Custom cake order received for Maria! Chocolate cake (serves 20) scheduled for \
             2025-10-28. Our team will reach out via maria@test.com to confirm details and pricing."
        );
        assert_eq!(store.records(LOG).await[0]["custom_message"], "");
    }

    #[tokio::test]
    async fn keeps_custom_message() {
        let store = InMemoryStore::new();
        let tool = CakeOrderTool::new(Arc::new(store.clone()));

        tool.execute(order(Some(("custom_message", "Happy Birthday!"))))
            .await
            .unwrap();
        assert_eq!(store.records(LOG).await[0]["custom_message"], "Happy Birthday!");
    }

    #[test]
    fn capitalize_matches_title_case_of_first_word() {
        assert_eq!(capitalize("red VELVET"), "Red velvet");
        assert_eq!(capitalize(""), "");
    }
}
