//! PMC client over NCBI E-utilities.
//!
//! Endpoints used:
//!   esearch: {base}/esearch.fcgi  (XML id list, paginated with retstart/retmax)
//!   efetch:  {base}/efetch.fcgi   (full-text article XML)

use async_trait::async_trait;
use neuromine_common::sandbox::SandboxClient as Client;
use neuromine_common::{NeuromineError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, instrument};

use super::ArticleSource;

pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_DATABASE: &str = "pmc";

pub struct PmcClient {
    client: Client,
    base_url: String,
    database: String,
    api_key: Option<String>,
}

impl PmcClient {
    pub fn new(client: Client, base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            database: database.into(),
            api_key: None,
        }
    }

    /// NCBI API key, sent with every request when present.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    fn params(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut params = vec![("db", self.database.clone())];
        params.extend_from_slice(extra);
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    async fn get_text(&self, endpoint: &str, params: &[(&'static str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let body = self.client
            .get(&url)?
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl ArticleSource for PmcClient {
    #[instrument(skip(self))]
    async fn search_page(&self, query: &str, offset: usize, limit: usize) -> Result<Vec<String>> {
        let params = self.params(&[
            ("term", query.to_string()),
            ("retmax", limit.to_string()),
            ("retstart", offset.to_string()),
        ]);
        let xml = self.get_text("esearch.fcgi", &params).await?;
        let ids = parse_esearch_ids(&xml)?;
        debug!(count = ids.len(), "esearch page returned ids");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn fetch_document(&self, identifier: &str) -> Result<String> {
        let params = self.params(&[
            ("id", identifier.to_string()),
            ("rettype", "full".to_string()),
            ("retmode", "xml".to_string()),
        ]);
        self.get_text("efetch.fcgi", &params).await
    }
}

/// Collect the text of every `<Id>` element in an esearch response.
pub fn parse_esearch_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut ids = Vec::new();
    let mut in_id = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"Id" => in_id = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Id" => in_id = false,
            Ok(Event::Text(ref e)) if in_id => {
                let text = e.unescape().map_err(|err| NeuromineError::Xml(err.to_string()))?;
                if !text.is_empty() {
                    ids.push(text.into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NeuromineError::Xml(format!(
                    "esearch response at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_esearch_ids() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE eSearchResult PUBLIC "-//NLM//DTD esearch 20060628//EN" "https://eutils.ncbi.nlm.nih.gov/eutils/dtd/20060628/esearch.dtd">
<eSearchResult>
  <Count>1342</Count><RetMax>3</RetMax><RetStart>0</RetStart>
  <IdList>
    <Id>11234567</Id>
    <Id>11234568</Id>
    <Id>11234569</Id>
  </IdList>
  <QueryTranslation>neuroprotection[All Fields]</QueryTranslation>
</eSearchResult>"#;
        let ids = parse_esearch_ids(xml).unwrap();
        assert_eq!(ids, vec!["11234567", "11234568", "11234569"]);
    }

    #[test]
    fn test_parse_empty_id_list() {
        let xml = "<eSearchResult><Count>0</Count><IdList/></eSearchResult>";
        assert!(parse_esearch_ids(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_esearch_is_xml_error() {
        let err = parse_esearch_ids("<eSearchResult><IdList><Id>1</IdList>").unwrap_err();
        assert!(matches!(err, NeuromineError::Xml(_)));
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let client = Client::new(std::time::Duration::from_secs(5)).unwrap();
        let pmc = PmcClient::new(client, DEFAULT_BASE_URL, DEFAULT_DATABASE).with_api_key(Some(String::new()));
        assert!(pmc.params(&[]).iter().all(|(k, _)| *k != "api_key"));
    }
}
