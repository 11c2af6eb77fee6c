//! Tracing decorator for verbose runs.

use engine_core::ChatContext;
use std::time::Instant;
use tracing::{info, warn};

use crate::gateway::{LanguageModel, LlmError, TokenProbs};

/// Logs every request and response passing through the wrapped backend.
#[derive(Debug, Clone)]
pub struct Logged<M> {
    inner: M,
}

impl<M: LanguageModel> Logged<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

fn last_message(context: &ChatContext) -> &str {
    context.last().map(|m| m.content.as_str()).unwrap_or("")
}

impl<M: LanguageModel> LanguageModel for Logged<M> {
    fn complete(&self, context: &ChatContext) -> Result<String, LlmError> {
        let start = Instant::now();
        let result = self.inner.complete(context);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => info!(
                messages = context.len(),
                elapsed_ms,
                prompt = last_message(context),
                response = response.as_str(),
                "LLM completion"
            ),
            Err(e) => warn!(messages = context.len(), elapsed_ms, error = %e, "LLM completion failed"),
        }
        result
    }

    fn probabilities(
        &self,
        context: &ChatContext,
        tokens: &[&str],
    ) -> Result<TokenProbs, LlmError> {
        let start = Instant::now();
        let result = self.inner.probabilities(context, tokens);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(probs) => {
                let values = probs.values();
                info!(
                    messages = context.len(),
                    elapsed_ms,
                    prompt = last_message(context),
                    ?tokens,
                    probs = ?values,
                    "LLM probabilities"
                )
            }
            Err(e) => warn!(messages = context.len(), elapsed_ms, error = %e, "LLM probabilities failed"),
        }
        result
    }
}
