//! `record_customer_interest`: general lead capture.

use crate::record::{parse_args, stamped};
use async_trait::async_trait;
use levain_core::error::ToolError;
use levain_core::store::RecordStore;
use levain_core::tool::{ParamSpec, Tool, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const LOG: &str = "leads";

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("email", "Customer's email address or WhatsApp number"),
    ParamSpec::required("name", "Customer's full name"),
    ParamSpec::required(
        "message",
        "Order intent or inquiry details: items, quantities, dates",
    ),
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LeadArgs {
    email: String,
    name: String,
    message: String,
}

pub struct CustomerInterestTool {
    store: Arc<dyn RecordStore>,
}

impl CustomerInterestTool {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CustomerInterestTool {
    fn name(&self) -> &str {
        "record_customer_interest"
    }

    fn description(&self) -> &str {
        "Store a potential customer lead when they want to order, need a quote, or express general interest."
    }

    fn parameters(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn usage(&self) -> Option<&str> {
        Some("Customer wants to order, needs a quote, or expresses general interest")
    }

    fn example(&self) -> Option<&str> {
        Some(r#"Action: record_customer_interest({"email": "ana@example.com", "name": "Ana Darwish", "message": "Interested in weekly bread delivery"})"#)
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: LeadArgs = parse_args(arguments)?;
        self.store.append(LOG, stamped(self.name(), &args)?).await?;
        Ok(ToolResult::success(format!(
            "Lead recorded for {}. Our team will reach out via {} soon!",
            args.name, args.email
        )))
    }
}
