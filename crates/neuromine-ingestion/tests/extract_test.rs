use neuromine_ingestion::tabular::read_rows;
use neuromine_ingestion::Extractor;
use neuromine_test_utils::pmc_article;
use neuromine_test_utils::pretty_assertions::assert_eq;

fn seed(dir: &std::path::Path) {
    let docs = [
        ("222.xml", pmc_article(Some("B, \"quoted\""), Some("An activator was found [4]. Nothing else."), None)),
        ("111.xml", pmc_article(None, None, Some("Dr. Smith tested a small molecule. Fig. 2 shows it."))),
        ("333.xml", pmc_article(Some("Unrelated"), Some("No keywords here."), Some("None at all."))),
    ];
    for (name, xml) in docs {
        std::fs::write(dir.join(name), xml).unwrap();
    }
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let first = dir.path().join("a.csv");
    let second = dir.path().join("b.csv");

    let extractor = Extractor::default();
    extractor.run(dir.path(), &first).unwrap();
    extractor.run(dir.path(), &second).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_rows_follow_file_order_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let out = dir.path().join("out.csv");

    let summary = Extractor::default().run(dir.path(), &out).unwrap();
    assert_eq!(summary.documents, 3);

    let rows = read_rows(&out).unwrap();
    let files: Vec<_> = rows.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(files, vec!["111.xml", "222.xml", "333.xml"]);

    assert_eq!(rows[0].title, "No Title");
    assert_eq!(rows[0].sentences, "Dr. Smith tested a small molecule.");
    assert_eq!(rows[1].title, "B, \"quoted\"");
    assert_eq!(rows[1].sentences, "An activator was found .");
    assert_eq!(rows[2].sentences, "");
}

#[test]
fn test_unparseable_document_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    std::fs::write(dir.path().join("000.xml"), "<article><body><p>compound</body>").unwrap();
    let out = dir.path().join("out.csv");

    let summary = Extractor::default().run(dir.path(), &out).unwrap();
    assert_eq!(summary.documents, 3);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].0, "000.xml");
}
