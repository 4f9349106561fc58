use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::NeuromineError;

/// Hosts every Neuromine process may reach without extra configuration.
const DEFAULT_ALLOWED_HOSTS: &[&str] = &[
    "eutils.ncbi.nlm.nih.gov", // E-utilities (esearch / efetch)
    "localhost",               // local mirrors and test servers
    "127.0.0.1",
];

/// An HTTP client capped to an allowlist of hosts.
///
/// A configured E-utilities mirror is added with [`SandboxClient::allow_url`]
/// at startup.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    pub fn new(timeout: Duration) -> Result<Self, NeuromineError> {
        let allowlist = DEFAULT_ALLOWED_HOSTS.iter().map(|d| d.to_string()).collect();

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("neuromine/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NeuromineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Allows the host of a configured base URL.
    pub fn allow_url(&mut self, url: &str) -> Result<(), NeuromineError> {
        let parsed = Url::parse(url)
            .map_err(|e| NeuromineError::Config(format!("Invalid URL {url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| NeuromineError::Config(format!("URL has no host: {url}")))?;
        self.allow_domain(host);
        Ok(())
    }

    /// Validates if a URL is permitted under the current policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else { return false };
        let Some(host) = parsed.host_str() else { return false };
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)))
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, NeuromineError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, NeuromineError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }

    fn check(&self, url: &str) -> Result<(), NeuromineError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(NeuromineError::Sandbox(format!("domain not in allowlist for URL {}", url)))
        }
    }
}
