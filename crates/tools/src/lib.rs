//! Bakery tool implementations for Levain.
//!
//! Four tools cover what the assistant may do beyond talking:
//! capture a lead, log an unanswered question, schedule a pickup, and
//! take a custom cake order. Every tool writes through an injected
//! [`RecordStore`], so the same registry runs against JSONL files in
//! production and an in-memory store in tests.

pub mod cake_order;
pub mod customer_interest;
mod record;
pub mod record_feedback;
pub mod schedule_pickup;
pub mod store;

use levain_core::store::RecordStore;
use levain_core::tool::ToolRegistry;
use std::sync::Arc;

pub use cake_order::CakeOrderTool;
pub use customer_interest::CustomerInterestTool;
pub use record_feedback::RecordFeedbackTool;
pub use schedule_pickup::SchedulePickupTool;
pub use store::{InMemoryStore, JsonlStore};

/// Create a registry with all four bakery tools sharing one store.
pub fn bakery_registry(store: Arc<dyn RecordStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CustomerInterestTool::new(store.clone())));
    registry.register(Box::new(RecordFeedbackTool::new(store.clone())));
    registry.register(Box::new(SchedulePickupTool::new(store.clone())));
    registry.register(Box::new(CakeOrderTool::new(store)));
    registry
}
