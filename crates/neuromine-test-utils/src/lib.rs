//! Shared testing utilities: a scripted LLM backend, an in-memory compound
//! store, and synthetic PMC article fixtures.

pub mod fixtures;
pub mod llm;
pub mod store;

pub use fixtures::{esearch_response, pmc_article};
pub use llm::MockLlmBackend;
pub use store::MemoryCompoundStore;

pub use pretty_assertions;
