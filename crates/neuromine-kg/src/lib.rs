//! neuromine-kg: builds and queries the compound collection.
//!
//! `classifier` turns the sentence table into compound evidence through the
//! LLM, `scoring` labels every compound, `search` filters the collection.

pub mod classifier;
pub mod scoring;
pub mod search;

pub use classifier::{Classifier, ClassifySummary};
pub use scoring::{Scorer, ScoreSummary};
pub use search::{search, search_store, SearchQuery, DEFAULT_LIMIT};
