//! OpenAI-compatible chat completion backend.
//!
//! Uses a blocking HTTP client: the planner is single-threaded and waits on
//! every call anyway. Timeouts are configured on the client.

use engine_config::LlmConfig;
use engine_core::ChatContext;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::gateway::{LanguageModel, LlmError, TokenProbs, MAX_TOP_LOGPROBS};

/// Chat completion client bound to one model.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a ChatContext,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    logprobs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_logprobs: Option<usize>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    logprobs: Option<ChoiceLogprobs>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceLogprobs {
    #[serde(default)]
    content: Vec<TokenLogprob>,
}

#[derive(Debug, Deserialize)]
struct TokenLogprob {
    #[serde(default)]
    top_logprobs: Vec<TopLogprob>,
}

#[derive(Debug, Deserialize)]
struct TopLogprob {
    token: String,
    logprob: f64,
}

impl OpenAiBackend {
    pub fn new(
        api_base: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("rap-agent/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        })
    }

    /// Build from configuration, reading the key from `config.api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| LlmError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(
            &config.api_base,
            api_key,
            config.model.clone(),
            config.temperature,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn send(&self, request: &ChatRequest<'_>) -> Result<Choice, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| LlmError::Transport(format!("Chat completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("response has no choices".into()))
    }
}

impl LanguageModel for OpenAiBackend {
    fn complete(&self, context: &ChatContext) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: context,
            temperature: self.temperature,
            max_tokens: None,
            logprobs: false,
            top_logprobs: None,
        };
        let choice = self.send(&request)?;
        Ok(choice.message.content.unwrap_or_default())
    }

    fn probabilities(
        &self,
        context: &ChatContext,
        tokens: &[&str],
    ) -> Result<TokenProbs, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: context,
            temperature: self.temperature,
            max_tokens: Some(1),
            logprobs: true,
            top_logprobs: Some(tokens.len().min(MAX_TOP_LOGPROBS)),
        };
        let choice = self.send(&request)?;

        let top: Vec<(String, f64)> = choice
            .logprobs
            .and_then(|lp| lp.content.into_iter().next())
            .map(|first| {
                first
                    .top_logprobs
                    .into_iter()
                    .map(|t| (t.token, t.logprob))
                    .collect()
            })
            .unwrap_or_default();

        debug!(requested = tokens.len(), returned = top.len(), "Top log-probabilities");
        Ok(TokenProbs::from_top_logprobs(tokens, &top))
    }
}
