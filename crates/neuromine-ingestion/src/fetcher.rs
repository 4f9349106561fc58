//! Search-then-download job that fills the local content store.
//!
//! Pagination stops at the first failing page and keeps what it already
//! collected. Downloads fail one identifier at a time: the error is logged
//! and the loop moves on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use neuromine_common::{NeuromineError, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::sources::ArticleSource;

/// Parameters for one fetch run.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub query: String,
    pub max_results: usize,
    pub batch_size: usize,
    pub content_dir: PathBuf,
}

/// Identifiers gathered by paginated search.
#[derive(Debug)]
pub struct SearchOutcome {
    pub ids: Vec<String>,
    /// The error that stopped pagination early, if any.
    pub error: Option<NeuromineError>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchSummary {
    pub ids_found: usize,
    pub saved: usize,
    pub failed: Vec<(String, String)>,
    pub files_in_store: usize,
    pub search_error: Option<String>,
}

pub struct Fetcher {
    source: Arc<dyn ArticleSource>,
    settings: FetchSettings,
}

impl Fetcher {
    pub fn new(source: Arc<dyn ArticleSource>, settings: FetchSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Page through search results in `batch_size` steps up to `max_results`.
    pub async fn search(&self) -> SearchOutcome {
        let FetchSettings { query, max_results, batch_size, .. } = &self.settings;
        let batch_size = (*batch_size).max(1);

        let mut ids = Vec::new();
        let mut offset = 0;
        while offset < *max_results {
            match self.source.search_page(query, offset, batch_size).await {
                Ok(page) if page.is_empty() => break,
                Ok(page) => ids.extend(page),
                Err(e) => {
                    warn!(offset, collected = ids.len(), error = %e, "Search page failed, stopping pagination");
                    return SearchOutcome { ids, error: Some(e) };
                }
            }
            offset += batch_size;
        }
        SearchOutcome { ids, error: None }
    }

    /// Download one document into the content store as `<identifier>.xml`.
    pub async fn download(&self, identifier: &str) -> Result<PathBuf> {
        validate_identifier(identifier)?;
        let xml = self.source.fetch_document(identifier).await?;
        let path = self.settings.content_dir.join(format!("{identifier}.xml"));
        tokio::fs::write(&path, xml.as_bytes()).await?;
        Ok(path)
    }

    /// Search, then download every identifier until `max_results` are saved.
    pub async fn run(&self) -> Result<FetchSummary> {
        tokio::fs::create_dir_all(&self.settings.content_dir).await?;

        info!(query = %self.settings.query, "Fetching article ids");
        let outcome = self.search().await;
        info!(found = outcome.ids.len(), "Search finished");

        let mut summary = FetchSummary {
            ids_found: outcome.ids.len(),
            search_error: outcome.error.map(|e| e.to_string()),
            ..Default::default()
        };

        for id in &outcome.ids {
            match self.download(id).await {
                Ok(path) => {
                    summary.saved += 1;
                    info!(id = %id, path = %path.display(), "Saved");
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Download failed, skipping");
                    summary.failed.push((id.clone(), e.to_string()));
                }
            }
            if summary.saved >= self.settings.max_results {
                break;
            }
        }

        summary.files_in_store = count_files(&self.settings.content_dir)?;
        info!(
            saved = summary.saved,
            failed = summary.failed.len(),
            total = summary.files_in_store,
            "Download complete"
        );
        Ok(summary)
    }
}

/// Identifiers become file names, so anything path-like is refused.
fn validate_identifier(identifier: &str) -> Result<()> {
    let ok = !identifier.is_empty()
        && identifier.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !identifier.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(NeuromineError::Parse(format!("unusable article identifier: {identifier:?}")))
    }
}

fn count_files(dir: &Path) -> Result<usize> {
    let mut n = 0;
    for entry in std::fs::read_dir(dir)? {
        if entry?.file_type()?.is_file() {
            n += 1;
        }
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("11234567").is_ok());
        assert!(validate_identifier("PMC11234567").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("../etc/passwd").is_err());
        assert!(validate_identifier("a/b").is_err());
    }
}
