//! The sentence table: `file,title,sentences`.
//!
//! Data rows quote every field and escape embedded quotes (RFC 4180), so
//! titles containing commas or quotes survive a round trip. Older tables
//! written without escaping still load; rows they broke are skipped.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use neuromine_common::Result;
use serde::Deserialize;
use tracing::warn;

use crate::models::ExtractedRow;

pub const HEADER: &str = "file,title,sentences";

/// One row as read back by the classifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TabularRow {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sentences: String,
}

pub fn write_rows(path: &Path, rows: &[ExtractedRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    writeln!(file, "{HEADER}")?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    for row in rows {
        wtr.write_record([row.file.as_str(), row.title.as_str(), row.sentence_blob().as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read every well-formed row; malformed rows are logged with their
/// 1-based row number and skipped.
pub fn read_rows(path: &Path) -> Result<Vec<TabularRow>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<TabularRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!(row = idx + 1, error = %e, "Malformed table row, skipping"),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(file: &str, title: &str, sentences: &[&str]) -> ExtractedRow {
        ExtractedRow {
            file: file.to_string(),
            title: title.to_string(),
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_layout_matches_header_and_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_rows(&path, &[row("1.xml", "Plain", &["A compound.", "An inhibitor."])]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "file,title,sentences\n\"1.xml\",\"Plain\",\"A compound. | An inhibitor.\"\n");
    }

    #[test]
    fn test_title_with_delimiters_reads_back_intact() {
        // The unescaped layout split this title into two columns.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let tricky = row("2.xml", "Caffeine, \"the\" neuroprotective compound", &["Caffeine is a compound."]);
        write_rows(&path, &[tricky.clone()]).unwrap();

        let back = read_rows(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].title, tricky.title);
        assert_eq!(back[0].sentences, "Caffeine is a compound.");
    }

    #[test]
    fn test_unescaped_legacy_row_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(
            &path,
            "file,title,sentences\n1.xml,Good title,\"A compound.\"\n2.xml,Bad, title,\"An inhibitor.\"\n",
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].file, "1.xml");
    }
}
