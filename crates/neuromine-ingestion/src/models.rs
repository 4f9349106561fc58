//! Data models for the ingestion pipeline.

use serde::{Deserialize, Serialize};

/// Delimiter placed between relevant sentences in the tabular output.
pub const SENTENCE_DELIMITER: &str = " | ";

/// Title used when a document has no `article-title` element.
pub const NO_TITLE: &str = "No Title";

/// Fields pulled out of one downloaded PMC document.
///
/// `None` means the element was absent; an element that exists but holds no
/// text is `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleDocument {
    /// External identifier (PMC id), also the file stem in the content store.
    pub identifier: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub body: Option<String>,
}

impl ArticleDocument {
    /// File name this document is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.xml", self.identifier)
    }
}

/// One row of the sentence table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRow {
    pub file: String,
    pub title: String,
    pub sentences: Vec<String>,
}

impl ExtractedRow {
    /// Relevant sentences joined with [`SENTENCE_DELIMITER`].
    pub fn sentence_blob(&self) -> String {
        self.sentences.join(SENTENCE_DELIMITER)
    }
}
