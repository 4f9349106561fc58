//! Configuration loading for Neuromine.
//! Reads neuromine.toml from the current directory or the path in NEUROMINE_CONFIG.
//! Secrets never live in the file; they come from the environment.

use std::path::{Path, PathBuf};

use neuromine_common::NeuromineError;
use neuromine_ingestion::extractor::DEFAULT_KEYWORDS;
use neuromine_ingestion::sources::pmc::{DEFAULT_BASE_URL, DEFAULT_DATABASE};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const CONFIG_ENV: &str = "NEUROMINE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "neuromine.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url()     -> String { DEFAULT_BASE_URL.to_string() }
fn default_database()     -> String { DEFAULT_DATABASE.to_string() }
fn default_max_results()  -> usize { 1000 }
fn default_batch_size()   -> usize { 100 }
fn default_content_dir()  -> PathBuf { PathBuf::from("filtered_articles") }
fn default_timeout_secs() -> u64 { 30 }

fn default_query() -> String {
    "open access[filter] AND ((neuroprotection OR neuroprotective OR neurorescue \
     OR neurorestoration OR neuroregeneration OR 'neuronal survival' OR neurotrophic) \
     AND ('small molecule' OR compound OR inhibitor OR activator))"
        .to_string()
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            database: default_database(),
            query: default_query(),
            max_results: default_max_results(),
            batch_size: default_batch_size(),
            content_dir: default_content_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_output_csv")]
    pub output_csv: PathBuf,
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
fn default_output_csv() -> PathBuf { PathBuf::from("preprocessed_results.csv") }

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { keywords: default_keywords(), output_csv: default_output_csv() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    #[serde(rename = "ollama")]
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: LlmProvider,
    #[serde(default = "default_model")]
    pub model: String,
    /// Required for `openai_compatible`; defaults to the local Ollama port for `ollama`.
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_provider()    -> LlmProvider { LlmProvider::OpenAi }
fn default_model()       -> String { "gpt-3.5-turbo".to_string() }
fn default_max_tokens()  -> u32 { 1500 }
fn default_temperature() -> f32 { 0.3 }

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf { PathBuf::from("./data/neuromine.db") }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

impl Config {
    /// Load configuration from `explicit`, else NEUROMINE_CONFIG, else
    /// neuromine.toml. A missing default file yields the built-in defaults;
    /// a missing explicitly named file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, NeuromineError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let config = match named {
            Some(path) => Self::load_from(&path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load_from(Path::new(DEFAULT_CONFIG_PATH))?,
            None => {
                info!("No {DEFAULT_CONFIG_PATH} found, using built-in defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, NeuromineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NeuromineError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&content)
            .map_err(|e| NeuromineError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Self, NeuromineError> {
        toml::from_str(content).map_err(|e| NeuromineError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NeuromineError> {
        if self.ingestion.batch_size == 0 {
            return Err(NeuromineError::Config("ingestion.batch_size must be at least 1".into()));
        }
        if self.extraction.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(NeuromineError::Config("extraction.keywords must not be empty".into()));
        }
        if self.llm.provider == LlmProvider::OpenAiCompatible && self.llm.base_url.is_none() {
            return Err(NeuromineError::Config(
                "llm.base_url is required for the openai_compatible provider".into(),
            ));
        }
        Ok(())
    }
}

/// Secrets read from the environment (after `.env` has been loaded).
#[derive(Debug, Default)]
pub struct Secrets {
    pub llm_api_key: Option<SecretString>,
    pub ncbi_api_key: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            llm_api_key: var("NEUROMINE_LLM_API_KEY")
                .or_else(|| var("OPENAI_API_KEY"))
                .map(SecretString::from),
            ncbi_api_key: var("NCBI_API_KEY").map(SecretString::from),
        }
    }

    /// The LLM key when `provider` needs one. Fails for OpenAI without a key.
    pub fn require_llm_key(&self, provider: LlmProvider) -> Result<Option<&SecretString>, NeuromineError> {
        match (provider, &self.llm_api_key) {
            (LlmProvider::OpenAi, None) => Err(NeuromineError::Config(
                "no API key for the openai provider (set OPENAI_API_KEY or NEUROMINE_LLM_API_KEY)".into(),
            )),
            (LlmProvider::Ollama, _) => Ok(None),
            (_, key) => Ok(key.as_ref()),
        }
    }
}
