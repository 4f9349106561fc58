//! Keyword sentence extraction.
//!
//! normalize → split_sentences → filter_by_keywords, applied to the abstract
//! and body of every document in the content store.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use neuromine_common::Result;
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::models::{ArticleDocument, ExtractedRow, NO_TITLE};
use crate::pmc_xml::parse_article;
use crate::tabular;

/// Keywords used when the configuration does not override them.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "neuroprotection", "neuroprotective", "neurorescue", "neurorestoration",
    "neuroregeneration", "neuronal survival", "neurotrophic",
    "small molecule", "compound", "inhibitor", "activator",
];

fn citation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]").unwrap())
}

fn disallowed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.,;:!?()\-]").unwrap())
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strip bracketed citations and stray symbols, collapse whitespace.
pub fn normalize(raw: &str) -> String {
    let text = citation_regex().replace_all(raw, "");
    let text = disallowed_regex().replace_all(&text, "");
    whitespace_regex().replace_all(&text, " ").trim().to_string()
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split normalised text into sentences.
///
/// A sentence ends at whitespace that follows `.` or `?`, except after
/// `x.y.`-style abbreviations (`e.g.`, `i.e.`) and capitalised two-letter
/// tokens such as `Dr.`. This is a heuristic: `Fig.`, units, genus
/// abbreviations (`E. coli`) and initials are split or merged inconsistently.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let (pos, c) = chars[i];
        if !c.is_whitespace() {
            continue;
        }
        let prev = chars[i - 1].1;
        if prev != '.' && prev != '?' {
            continue;
        }
        if i >= 4 && is_word(chars[i - 4].1) && chars[i - 3].1 == '.' && is_word(chars[i - 2].1) {
            continue;
        }
        if i >= 3
            && chars[i - 3].1.is_ascii_uppercase()
            && chars[i - 2].1.is_ascii_lowercase()
            && prev == '.'
        {
            continue;
        }
        if pos > start {
            sentences.push(&text[start..pos]);
        }
        start = pos + c.len_utf8();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Sentences containing at least one keyword (case-sensitive substring).
pub fn filter_by_keywords<'a, K: AsRef<str>>(sentences: &[&'a str], keywords: &[K]) -> Vec<&'a str> {
    sentences
        .iter()
        .copied()
        .filter(|s| keywords.iter().any(|k| s.contains(k.as_ref())))
        .collect()
}

/// Build the table row for one parsed document.
pub fn process_document<K: AsRef<str>>(doc: &ArticleDocument, keywords: &[K]) -> ExtractedRow {
    let abstract_text = doc.abstract_text.as_deref().unwrap_or("");
    let body = doc.body.as_deref().unwrap_or("");

    let full_text = normalize(&format!("{abstract_text} {body}"));
    let sentences = split_sentences(&full_text);
    let relevant = filter_by_keywords(&sentences, keywords);

    ExtractedRow {
        file: doc.file_name(),
        title: doc.title.clone().unwrap_or_else(|| NO_TITLE.to_string()),
        sentences: relevant.into_iter().map(String::from).collect(),
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractSummary {
    pub documents: usize,
    pub skipped: Vec<(String, String)>,
    pub sentences: usize,
}

pub struct Extractor {
    keywords: Vec<String>,
}

impl Extractor {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn process_file(&self, path: &Path) -> Result<ExtractedRow> {
        let xml = std::fs::read_to_string(path)?;
        let identifier = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let doc = parse_article(&identifier, &xml)?;
        Ok(process_document(&doc, &self.keywords))
    }

    /// Rows for every `*.xml` file in `dir`, in file-name order.
    pub fn process_dir(&self, dir: &Path) -> Result<(Vec<ExtractedRow>, ExtractSummary)> {
        let mut rows = Vec::new();
        let mut summary = ExtractSummary::default();

        for path in xml_files(dir)? {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            match self.process_file(&path) {
                Ok(row) => {
                    info!(file = %name, sentences = row.sentences.len(), "Processed");
                    summary.documents += 1;
                    summary.sentences += row.sentences.len();
                    rows.push(row);
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "Could not process document, skipping");
                    summary.skipped.push((name, e.to_string()));
                }
            }
        }
        Ok((rows, summary))
    }

    /// Process the content store and write the sentence table.
    pub fn run(&self, content_dir: &Path, output: &Path) -> Result<ExtractSummary> {
        info!(dir = %content_dir.display(), keywords = self.keywords.len(), "Starting article processing");
        let (rows, summary) = self.process_dir(content_dir)?;
        tabular::write_rows(output, &rows)?;
        info!(
            rows = rows.len(),
            skipped = summary.skipped.len(),
            output = %output.display(),
            "Sentence table written"
        );
        Ok(summary)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}

fn xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_xml = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".xml"));
        if is_xml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_bracketed_citations() {
        assert_eq!(normalize("foo [1] bar [2,3]"), "foo bar");
    }

    #[test]
    fn test_normalize_strips_symbols_and_collapses_whitespace() {
        assert_eq!(
            normalize("  IC50 = 12 nM;\n\n  p < 0.05 ± significant!  "),
            "IC50 12 nM; p 0.05 significant!"
        );
    }

    #[test]
    fn test_normalize_keeps_allowed_punctuation() {
        assert_eq!(normalize("a.b,c;d:e!f?g(h)i-j"), "a.b,c;d:e!f?g(h)i-j");
    }

    #[test]
    fn test_split_on_period_and_question_mark() {
        let s = split_sentences("Neuroprotection is studied. Is it real? Yes.");
        assert_eq!(s, vec!["Neuroprotection is studied.", "Is it real?", "Yes."]);
    }

    #[test]
    fn test_split_keeps_common_abbreviations_together() {
        let s = split_sentences("Treated (e.g. in mice) cells survived. Dr. Smith disagreed.");
        assert_eq!(s, vec!["Treated (e.g. in mice) cells survived.", "Dr. Smith disagreed."]);
    }

    #[test]
    fn test_split_does_not_break_on_decimal_points() {
        let s = split_sentences("Dose was 0.5 mg. Survival rose.");
        assert_eq!(s, vec!["Dose was 0.5 mg.", "Survival rose."]);
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let sentences = ["Neuroprotection is studied.", "Unrelated sentence."];
        assert_eq!(filter_by_keywords(&sentences, &["Neuroprotection"]), vec!["Neuroprotection is studied."]);
        assert!(filter_by_keywords(&sentences, &["neuroprotection"]).is_empty());
    }

    #[test]
    fn test_filter_keeps_multi_keyword_sentence_once() {
        let sentences = ["A neuroprotective small molecule inhibitor."];
        let kept = filter_by_keywords(&sentences, &["neuroprotective", "small molecule", "inhibitor"]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_process_document_defaults_and_joins() {
        let doc = ArticleDocument {
            identifier: "77".to_string(),
            title: None,
            abstract_text: Some("The compound was neuroprotective [3].".to_string()),
            body: Some("Nothing here. An inhibitor helped.".to_string()),
        };
        let row = process_document(&doc, DEFAULT_KEYWORDS);
        assert_eq!(row.file, "77.xml");
        assert_eq!(row.title, NO_TITLE);
        assert_eq!(row.sentence_blob(), "The compound was neuroprotective . | An inhibitor helped.");
    }
}
