//! Record store implementations.
//!
//! - [`JsonlStore`] appends one JSON object per line to `<dir>/<log>.jsonl`
//! - [`InMemoryStore`] keeps records in a Vec, for tests and dry runs

pub mod in_memory;
pub mod jsonl;

pub use in_memory::InMemoryStore;
pub use jsonl::JsonlStore;
