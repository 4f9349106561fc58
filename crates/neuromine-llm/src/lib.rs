//! neuromine-llm: LLM backend abstraction and compound extraction.
//!
//! `backend` talks to OpenAI-style chat completion endpoints; `extraction`
//! owns the fixed extraction prompt and the tolerant parsing of whatever the
//! model sends back.

pub mod backend;
pub mod extraction;
pub mod audit;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use extraction::{parse_records, CompoundExtractor, CompoundFragment, ExtractionParams};
