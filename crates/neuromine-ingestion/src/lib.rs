//! neuromine-ingestion: getting article text into a sentence table.
//!
//! - Article discovery and download (PMC via NCBI E-utilities)
//! - PMC XML field extraction (title, abstract, body)
//! - Text normalisation, sentence splitting, keyword filtering
//! - Tabular (CSV) output consumed by the classifier

pub mod sources;
pub mod fetcher;
pub mod pmc_xml;
pub mod extractor;
pub mod tabular;
pub mod models;

pub use extractor::{filter_by_keywords, normalize, split_sentences, Extractor};
pub use fetcher::{FetchSettings, FetchSummary, Fetcher};
pub use models::{ArticleDocument, ExtractedRow};
