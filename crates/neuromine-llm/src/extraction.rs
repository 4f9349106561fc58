//! Compound extraction: the fixed prompt, the call, and tolerant parsing.
//!
//! The model is asked for a JSON object (or an array of them) describing
//! each compound in a text block, or a sentinel object when the block holds
//! nothing relevant. Nothing the model returns is trusted: every field is
//! optional and a response that does not parse yields no records.

use std::sync::Arc;
use std::time::Instant;

use neuromine_common::{NeuromineError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::audit::CallAudit;
use crate::backend::{LlmBackend, LlmRequest, Message};

/// Marker text of the "nothing found" sentinel object.
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information";

const PROMPT_TEMPLATE: &str = r#"
Extract the following from the text below:
1. Compound name, chemical structure, and identifier (e.g. PubChem CID, CAS).
2. Description of the in-vitro or in-vivo evidence.
3. Disease targeted (optional).
4. Mechanism of action (optional).
5. References (DOI, article title).
6. Confidence score and manual validation status (optional).

If the text contains no relevant information, return exactly:
{"message": "No relevant information"}

Text: "{text}"

Answer with JSON only, one object per compound (use an array for several):
{
    "compound_name": "",
    "structure": "",
    "identifier": "",
    "evidence_description": "",
    "evidence_type": "",
    "disease_targeted": "",
    "mechanism_of_action": "",
    "references": "",
    "confidence_score": "",
    "manual_validation": ""
}
"#;

/// Build the extraction prompt for one text block.
pub fn build_prompt(text_block: &str) -> String {
    PROMPT_TEMPLATE.replacen("{text}", text_block, 1)
}

/// Sampling parameters for extraction calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionParams {
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self { model: None, max_tokens: 1500, temperature: 0.3 }
    }
}

/// One compound as reported by the model. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundFragment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub compound_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub structure: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub identifier: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub evidence_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub evidence_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub disease_targeted: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mechanism_of_action: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub references: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub confidence_score: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub manual_validation: Option<String>,
}

impl CompoundFragment {
    /// Trimmed compound name, or `None` when missing or blank.
    pub fn name(&self) -> Option<&str> {
        self.compound_name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Strings pass through, numbers and booleans are stringified, arrays of
/// scalars are joined with `"; "`. Objects and null count as absent.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn scalar(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items.iter().filter_map(scalar).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Some(v) => scalar(&v),
        None => None,
    })
}

/// Drop a surrounding markdown code fence (```json … ```), if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else { return trimmed };
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse model output into fragments, reporting malformed JSON as an error.
pub fn parse_fragments(raw: &str) -> Result<Vec<CompoundFragment>> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| NeuromineError::Parse(format!("model output is not JSON: {e}")))?;

    match value {
        Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        Value::Array(items) => {
            let mut fragments = Vec::with_capacity(items.len());
            for (idx, item) in items.into_iter().enumerate() {
                if !item.is_object() {
                    warn!(index = idx, "Ignoring non-object element in model output");
                    continue;
                }
                fragments.push(serde_json::from_value(item)?);
            }
            Ok(fragments)
        }
        other => Err(NeuromineError::Parse(format!(
            "expected a JSON object or array, got {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                _ => "a string",
            }
        ))),
    }
}

/// Fragments in `raw`; empty for no output, the sentinel, or unparseable text.
pub fn parse_records(raw: Option<&str>) -> Vec<CompoundFragment> {
    let Some(raw) = raw else { return Vec::new() };
    if raw.contains(NO_RELEVANT_INFORMATION) {
        return Vec::new();
    }
    match parse_fragments(raw) {
        Ok(fragments) => fragments,
        Err(e) => {
            warn!(error = %e, output = raw, "Could not parse model output, skipping");
            Vec::new()
        }
    }
}

/// Sends text blocks to an LLM with the extraction prompt.
pub struct CompoundExtractor {
    backend: Arc<dyn LlmBackend>,
    params: ExtractionParams,
}

impl CompoundExtractor {
    pub fn new(backend: Arc<dyn LlmBackend>, params: ExtractionParams) -> Self {
        Self { backend, params }
    }

    pub fn model_id(&self) -> &str {
        self.params.model.as_deref().unwrap_or_else(|| self.backend.model_id())
    }

    /// Raw model output for one block, or `None` if the call failed.
    pub async fn classify_block(&self, text_block: &str) -> Option<String> {
        let req = LlmRequest {
            messages: vec![Message::user(build_prompt(text_block))],
            model: self.params.model.clone(),
            max_tokens: Some(self.params.max_tokens),
            temperature: Some(self.params.temperature),
        };

        let started = Instant::now();
        match self.backend.complete(req).await {
            Ok(resp) => {
                let content = resp.content.trim().to_string();
                let audit = CallAudit::new(
                    resp.model,
                    resp.prompt_tokens,
                    resp.completion_tokens,
                    &content,
                    started.elapsed().as_millis() as u64,
                );
                debug!(?audit, "LLM call completed");
                Some(content)
            }
            Err(e) => {
                warn!(model = self.model_id(), error = %e, "LLM call failed, skipping block");
                None
            }
        }
    }
}
