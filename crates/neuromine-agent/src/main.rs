//! Neuromine: literature mining for neuroprotective compounds.
//! Entry point for the `neuromine` binary.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use neuromine_common::sandbox::SandboxClient;
use neuromine_db::{CompoundRepository, Database};
use neuromine_ingestion::extractor::ExtractSummary;
use neuromine_ingestion::sources::pmc::PmcClient;
use neuromine_ingestion::{Extractor, FetchSettings, FetchSummary, Fetcher};
use neuromine_kg::{search_store, Classifier, ClassifySummary, ScoreSummary, Scorer, SearchQuery, DEFAULT_LIMIT};
use neuromine_llm::backend::{OllamaBackend, OpenAiBackend, OpenAiCompatibleBackend};
use neuromine_llm::{CompoundExtractor, ExtractionParams, LlmBackend};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{Config, LlmProvider, Secrets, DEFAULT_OLLAMA_URL};

#[derive(Parser)]
#[command(name = "neuromine")]
#[command(version, about = "Mine PMC articles for neuroprotective compounds", long_about = None)]
struct Cli {
    /// Path to the configuration file (default: ./neuromine.toml)
    #[arg(long, global = true, env = "NEUROMINE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search PMC and download matching full-text articles
    Fetch {
        /// Search term (overrides ingestion.query)
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Extract keyword sentences from downloaded articles into the sentence table
    Extract {
        /// Directory of article XML files (overrides ingestion.content_dir)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output CSV (overrides extraction.output_csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Send the sentence table through the LLM and store compound evidence
    Classify {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Assign a confidence label to every stored compound
    Score,
    /// Search the compound collection
    Search {
        /// Case-insensitive pattern over names and evidence text
        text: Option<String>,
        #[arg(long)]
        evidence_type: Option<String>,
        #[arg(long)]
        disease: Option<String>,
        /// Record label (High/Medium/Low) or per-evidence confidence score
        #[arg(long)]
        confidence: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// fetch, extract, classify and score in sequence
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("neuromine=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Neuromine {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(cli.config.as_deref())?;
    let secrets = Secrets::from_env();

    match cli.command {
        Commands::Fetch { query, max_results } => {
            fetch(&config, &secrets, query, max_results).await?;
        }
        Commands::Extract { input, output } => {
            let input = input.unwrap_or_else(|| config.ingestion.content_dir.clone());
            let output = output.unwrap_or_else(|| config.extraction.output_csv.clone());
            extract(&config, &input, &output)?;
        }
        Commands::Classify { input } => {
            // Credentials are checked before any work starts.
            let backend = build_backend(&config, &secrets)?;
            let input = input.unwrap_or_else(|| config.extraction.output_csv.clone());
            let db = open_database(&config).await?;
            classify(&config, backend, db, &input).await?;
        }
        Commands::Score => {
            let db = open_database(&config).await?;
            score(db).await?;
        }
        Commands::Search { text, evidence_type, disease, confidence, limit } => {
            let db = open_database(&config).await?;
            let store = CompoundRepository::new(db);
            let query = SearchQuery { text, evidence_type, disease, confidence, limit };
            let results = search_store(&store, &query).await?;
            info!(results = results.len(), "Search finished");
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Run => {
            let backend = build_backend(&config, &secrets)?;
            let db = open_database(&config).await?;

            fetch(&config, &secrets, None, None).await?;
            let csv = config.extraction.output_csv.clone();
            extract(&config, &config.ingestion.content_dir, &csv)?;
            classify(&config, backend, db.clone(), &csv).await?;
            score(db).await?;
        }
    }

    Ok(())
}

fn pmc_client(config: &Config, secrets: &Secrets) -> anyhow::Result<PmcClient> {
    let mut http = SandboxClient::new(Duration::from_secs(config.ingestion.timeout_secs))?;
    http.allow_url(&config.ingestion.base_url)?;

    let api_key = secrets.ncbi_api_key.as_ref().map(|k| k.expose_secret().to_string());
    Ok(PmcClient::new(http, &config.ingestion.base_url, &config.ingestion.database).with_api_key(api_key))
}

/// Download articles into the content store. A search that stopped early is
/// reported as an error once the collected identifiers have been downloaded.
async fn fetch(
    config: &Config,
    secrets: &Secrets,
    query: Option<String>,
    max_results: Option<usize>,
) -> anyhow::Result<FetchSummary> {
    let settings = FetchSettings {
        query: query.unwrap_or_else(|| config.ingestion.query.clone()),
        max_results: max_results.unwrap_or(config.ingestion.max_results),
        batch_size: config.ingestion.batch_size,
        content_dir: config.ingestion.content_dir.clone(),
    };
    let fetcher = Fetcher::new(Arc::new(pmc_client(config, secrets)?), settings);
    let summary = fetcher.run().await?;

    for (id, reason) in &summary.failed {
        warn!(id = %id, reason = %reason, "Not downloaded");
    }
    if let Some(err) = &summary.search_error {
        anyhow::bail!(
            "search stopped after {} identifiers ({} saved): {err}",
            summary.ids_found,
            summary.saved
        );
    }
    Ok(summary)
}

fn extract(config: &Config, input: &Path, output: &Path) -> anyhow::Result<ExtractSummary> {
    let extractor = Extractor::new(config.extraction.keywords.clone());
    let summary = extractor
        .run(input, output)
        .with_context(|| format!("extracting sentences from {}", input.display()))?;
    info!(
        documents = summary.documents,
        sentences = summary.sentences,
        skipped = summary.skipped.len(),
        "Extraction finished"
    );
    Ok(summary)
}

/// The configured LLM backend. Fails when the provider needs a key and none is set.
fn build_backend(config: &Config, secrets: &Secrets) -> anyhow::Result<Arc<dyn LlmBackend>> {
    let key = secrets
        .require_llm_key(config.llm.provider)?
        .map(|k: &SecretString| k.expose_secret().to_string());
    let model = config.llm.model.clone();

    let backend: Arc<dyn LlmBackend> = match config.llm.provider {
        LlmProvider::OpenAi => Arc::new(OpenAiBackend::new(key.unwrap_or_default(), model)),
        LlmProvider::OpenAiCompatible => {
            let base_url = config.llm.base_url.clone().unwrap_or_default();
            Arc::new(OpenAiCompatibleBackend::new(base_url, model, key))
        }
        LlmProvider::Ollama => {
            let base_url = config.llm.base_url.clone().unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            Arc::new(OllamaBackend::new(base_url, model))
        }
    };
    info!(provider = ?config.llm.provider, model = backend.model_id(), local = backend.is_local(), "LLM backend ready");
    Ok(backend)
}

async fn open_database(config: &Config) -> anyhow::Result<Arc<Database>> {
    let db = Database::open(&config.database.path)
        .await
        .with_context(|| format!("opening database at {}", config.database.path.display()))?;
    db.initialize().await?;
    Ok(Arc::new(db))
}

async fn classify(
    config: &Config,
    backend: Arc<dyn LlmBackend>,
    db: Arc<Database>,
    input: &Path,
) -> anyhow::Result<ClassifySummary> {
    let params = ExtractionParams {
        model: Some(config.llm.model.clone()),
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
    };
    let classifier = Classifier::new(
        CompoundExtractor::new(backend, params),
        Arc::new(CompoundRepository::new(db.clone())),
    );
    let summary = classifier.run(input).await?;
    db.create_compound_index().await?;
    Ok(summary)
}

async fn score(db: Arc<Database>) -> anyhow::Result<ScoreSummary> {
    let scorer = Scorer::new(Arc::new(CompoundRepository::new(db.clone())));
    let summary = scorer.run().await?;
    let stats = db.stats().await?;
    info!(labeled = summary.labeled(), compounds = stats.compounds, "Scoring complete");
    Ok(summary)
}
