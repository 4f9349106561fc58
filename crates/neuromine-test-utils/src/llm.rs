use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use neuromine_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};

/// Scripted LLM backend.
///
/// Rules are checked in insertion order: the first whose needle appears in
/// the prompt answers. Without a match the next queued reply is used, and
/// once that runs dry the fallback (the "nothing relevant" sentinel unless
/// overridden). Every prompt is recorded.
pub struct MockLlmBackend {
    rules: Vec<(String, Reply)>,
    queue: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    prompts: Mutex<Vec<String>>,
}

#[derive(Clone)]
enum Reply {
    Text(String),
    Fail,
}

impl MockLlmBackend {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            queue: Mutex::new(VecDeque::new()),
            fallback: Reply::Text(r#"{"message": "No relevant information"}"#.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer `reply` whenever the prompt contains `needle`.
    pub fn when(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Text(reply.to_string())));
        self
    }

    /// Fail the call whenever the prompt contains `needle`.
    pub fn fail_when(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Fail));
        self
    }

    /// Queue a reply for the next unmatched call.
    pub fn then(self, reply: &str) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(Reply::Text(reply.to_string()));
        self
    }

    pub fn otherwise(mut self, reply: &str) -> Self {
        self.fallback = Reply::Text(reply.to_string());
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Default for MockLlmBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmBackend for MockLlmBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let prompt: String = req
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt.clone());

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, r)| r.clone())
            .or_else(|| self.queue.lock().unwrap().pop_front())
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            Reply::Text(content) => Ok(LlmResponse {
                content,
                model: req.model.unwrap_or_else(|| "mock".to_string()),
                prompt_tokens: prompt.len() as u32 / 4,
                completion_tokens: 0,
            }),
            Reply::Fail => Err(LlmError::Unavailable("scripted failure".to_string())),
        }
    }

    fn model_id(&self) -> &str {
        "mock"
    }

    fn is_local(&self) -> bool {
        true
    }
}
