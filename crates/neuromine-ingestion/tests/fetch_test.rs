//! Fetcher against a local fake of the E-utilities endpoints.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use neuromine_common::sandbox::SandboxClient;
use neuromine_ingestion::sources::pmc::PmcClient;
use neuromine_ingestion::{FetchSettings, Fetcher};
use neuromine_test_utils::{esearch_response, pmc_article};

#[derive(Default)]
struct FakeEutils {
    /// retstart -> ids; a missing offset answers 500.
    pages: HashMap<usize, Vec<&'static str>>,
    broken_ids: HashSet<&'static str>,
    searches: Mutex<Vec<HashMap<String, String>>>,
}

type Params = Query<HashMap<String, String>>;

async fn esearch(State(fake): State<Arc<FakeEutils>>, Query(params): Params) -> (StatusCode, String) {
    let offset: usize = params.get("retstart").and_then(|s| s.parse().ok()).unwrap_or(0);
    fake.searches.lock().unwrap().push(params);
    match fake.pages.get(&offset) {
        Some(ids) => (StatusCode::OK, esearch_response(100, ids)),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "backend down".to_string()),
    }
}

async fn efetch(State(fake): State<Arc<FakeEutils>>, Query(params): Params) -> (StatusCode, String) {
    let id = params.get("id").cloned().unwrap_or_default();
    if fake.broken_ids.contains(id.as_str()) || params.get("rettype").map(String::as_str) != Some("full") {
        return (StatusCode::BAD_GATEWAY, String::new());
    }
    (StatusCode::OK, pmc_article(Some(&format!("Article {id}")), Some("A compound."), None))
}

async fn serve(fake: Arc<FakeEutils>) -> String {
    let app = Router::new()
        .route("/esearch.fcgi", get(esearch))
        .route("/efetch.fcgi", get(efetch))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn fetcher(base_url: &str, dir: &std::path::Path, max_results: usize, batch_size: usize) -> Fetcher {
    let client = SandboxClient::new(Duration::from_secs(5)).unwrap();
    let source = PmcClient::new(client, base_url, "pmc");
    Fetcher::new(
        Arc::new(source),
        FetchSettings {
            query: "neuroprotection".to_string(),
            max_results,
            batch_size,
            content_dir: dir.join("content"),
        },
    )
}

#[tokio::test]
async fn test_failing_page_keeps_collected_ids_and_failed_download_is_skipped() {
    let fake = Arc::new(FakeEutils {
        pages: HashMap::from([(0, vec!["1", "2"]), (2, vec!["3", "4"])]),
        broken_ids: HashSet::from(["3"]),
        ..Default::default()
    });
    let base = serve(fake.clone()).await;
    let dir = tempfile::tempdir().unwrap();

    let summary = fetcher(&base, dir.path(), 10, 2).run().await.unwrap();

    assert_eq!(summary.ids_found, 4);
    assert!(summary.search_error.is_some());
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "3");
    assert_eq!(summary.files_in_store, 3);

    let content = dir.path().join("content");
    assert!(content.join("1.xml").exists());
    assert!(!content.join("3.xml").exists());
    let body = std::fs::read_to_string(content.join("4.xml")).unwrap();
    assert!(body.contains("<article-title>Article 4</article-title>"));

    let searches = fake.searches.lock().unwrap();
    let offsets: Vec<_> = searches.iter().map(|p| p["retstart"].clone()).collect();
    assert_eq!(offsets, vec!["0", "2", "4"]);
    assert!(searches.iter().all(|p| p["db"] == "pmc" && p["retmax"] == "2" && p["term"] == "neuroprotection"));
}

#[tokio::test]
async fn test_empty_page_ends_pagination() {
    let fake = Arc::new(FakeEutils {
        pages: HashMap::from([(0, vec!["10", "11"]), (2, vec![])]),
        ..Default::default()
    });
    let base = serve(fake.clone()).await;
    let dir = tempfile::tempdir().unwrap();

    let summary = fetcher(&base, dir.path(), 10, 2).run().await.unwrap();
    assert_eq!(summary.search_error, None);
    assert_eq!(summary.saved, 2);
    assert_eq!(fake.searches.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_downloads_stop_at_max_results() {
    let fake = Arc::new(FakeEutils {
        pages: HashMap::from([(0, vec!["1", "2"]), (2, vec!["3", "4"])]),
        ..Default::default()
    });
    let base = serve(fake).await;
    let dir = tempfile::tempdir().unwrap();

    let summary = fetcher(&base, dir.path(), 3, 2).run().await.unwrap();
    assert_eq!(summary.ids_found, 4);
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.files_in_store, 3);
}

#[tokio::test]
#[ignore = "hits the live NCBI E-utilities API"]
async fn test_live_pmc_search() {
    use neuromine_ingestion::sources::pmc::{DEFAULT_BASE_URL, DEFAULT_DATABASE};
    use neuromine_ingestion::sources::ArticleSource;

    let client = SandboxClient::new(Duration::from_secs(30)).unwrap();
    let pmc = PmcClient::new(client, DEFAULT_BASE_URL, DEFAULT_DATABASE);
    let ids = pmc.search_page("neuroprotection", 0, 5).await.unwrap();
    assert!(!ids.is_empty());

    let xml = pmc.fetch_document(&ids[0]).await.unwrap();
    assert!(xml.contains("<article"));
}
