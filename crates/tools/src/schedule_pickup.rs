//! `schedule_pickup`: book a pickup slot for bread and pastries.

use crate::record::{parse_args, stamped};
use async_trait::async_trait;
use levain_core::error::ToolError;
use levain_core::store::RecordStore;
use levain_core::tool::{ParamSpec, Tool, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const LOG: &str = "scheduled_pickups";

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("customer_name", "Customer's full name"),
    ParamSpec::required("items", "Items to pick up, e.g. \"2 sourdough loaves, 1 baguette\""),
    ParamSpec::required("pickup_date", "Date for pickup, e.g. \"2025-10-20\" or \"Saturday\""),
    ParamSpec::required("pickup_time", "Preferred time, e.g. \"3:00 PM\" or \"afternoon\""),
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PickupArgs {
    customer_name: String,
    items: String,
    pickup_date: String,
    pickup_time: String,
}

pub struct SchedulePickupTool {
    store: Arc<dyn RecordStore>,
}

impl SchedulePickupTool {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SchedulePickupTool {
    fn name(&self) -> &str {
        "schedule_pickup"
    }

    fn description(&self) -> &str {
        "Schedule a pickup appointment when a customer wants specific items at a specific time."
    }

    fn parameters(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn usage(&self) -> Option<&str> {
        Some("Customer wants to pick up specific items at a specific time")
    }

    fn example(&self) -> Option<&str> {
        Some(r#"Action: schedule_pickup({"customer_name": "John Smith", "items": "2 sourdough loaves", "pickup_date": "Saturday", "pickup_time": "3 PM"})"#)
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: PickupArgs = parse_args(arguments)?;
        self.store.append(LOG, stamped(self.name(), &args)?).await?;
        Ok(ToolResult::success(format!(
            "Pickup scheduled for {} on {} at {}. We'll have {} ready!",
            args.customer_name, args.pickup_date, args.pickup_time, args.items
        )))
    }
}
