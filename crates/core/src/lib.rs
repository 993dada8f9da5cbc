//! # Levain Core
//!
//! Domain types, traits, and error definitions for the Levain ReAct
//! assistant. This crate has **zero framework dependencies**: it defines the
//! message model, the inference-endpoint contract, and the tool contract
//! that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the reasoning loop is a trait here:
//! - [`Provider`] is the inference endpoint
//! - [`Tool`] is a side-effecting capability invoked by name
//! - [`RecordStore`] is where tools put their durable records
//!
//! Implementations live in their respective crates, so the loop can be
//! exercised with scripted providers and in-memory tools.

pub mod error;
pub mod message;
pub mod provider;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, Transcript};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use store::RecordStore;
pub use tool::{ParamSpec, Tool, ToolRegistry, ToolResult, ToolStatus};
