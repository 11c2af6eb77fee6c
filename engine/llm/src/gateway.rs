//! The language model capability set.
//!
//! A backend answers two questions about a chat context: what the assistant
//! says next, and how likely each of a handful of answer tokens is.
//! Backends do not retry; callers parse the output and decide.

use engine_core::ChatContext;
use thiserror::Error;

/// Probability mass assigned to a requested token that is absent from the
/// backend's top-k list.
pub const MISSING_TOKEN_MASS: f64 = 1e-43;

/// Most top-k log-probabilities requested from a backend.
pub const MAX_TOP_LOGPROBS: usize = 5;

/// Errors raised by a language model backend.
///
/// These are transport-level failures. Malformed *content* (a missing
/// `<state>` tag, say) is not an error at this layer.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Operator I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown backend '{0}', expected one of scripted, openai, interactive")]
    UnknownBackend(String),

    #[error("Backend '{0}' is not compiled into this build")]
    BackendUnavailable(String),
}

/// A language model used as world model and as policy/value oracle.
pub trait LanguageModel {
    /// Next assistant message for `context`.
    fn complete(&self, context: &ChatContext) -> Result<String, LlmError>;

    /// Distribution over `tokens` for the next assistant token.
    ///
    /// The result holds exactly the requested tokens, in request order,
    /// and sums to 1.
    fn probabilities(&self, context: &ChatContext, tokens: &[&str])
        -> Result<TokenProbs, LlmError>;
}

impl<M: LanguageModel + ?Sized> LanguageModel for &M {
    fn complete(&self, context: &ChatContext) -> Result<String, LlmError> {
        (**self).complete(context)
    }

    fn probabilities(
        &self,
        context: &ChatContext,
        tokens: &[&str],
    ) -> Result<TokenProbs, LlmError> {
        (**self).probabilities(context, tokens)
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn complete(&self, context: &ChatContext) -> Result<String, LlmError> {
        (**self).complete(context)
    }

    fn probabilities(
        &self,
        context: &ChatContext,
        tokens: &[&str],
    ) -> Result<TokenProbs, LlmError> {
        (**self).probabilities(context, tokens)
    }
}

/// A normalized distribution over a fixed list of tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenProbs {
    entries: Vec<(String, f64)>,
}

impl TokenProbs {
    /// Equal mass on every token.
    pub fn uniform(tokens: &[&str]) -> Self {
        Self::from_weights(tokens, &vec![1.0; tokens.len()])
    }

    /// Normalize non-negative weights into a distribution.
    ///
    /// Falls back to uniform when the weights carry no usable mass.
    pub fn from_weights(tokens: &[&str], weights: &[f64]) -> Self {
        debug_assert_eq!(tokens.len(), weights.len());

        let total: f64 = weights.iter().filter(|w| w.is_finite()).sum();
        let entries = if total > 0.0 && total.is_finite() {
            tokens
                .iter()
                .zip(weights)
                .map(|(t, w)| {
                    let w = if w.is_finite() { *w } else { 0.0 };
                    (t.to_string(), w / total)
                })
                .collect()
        } else {
            let p = 1.0 / tokens.len().max(1) as f64;
            tokens.iter().map(|t| (t.to_string(), p)).collect()
        };

        Self { entries }
    }

    /// Build a distribution from a backend's top-k `(token, logprob)` list.
    ///
    /// Tokens match case-insensitively after trimming whitespace; several
    /// top-k entries matching one requested token add up. Requested tokens
    /// that never appear receive [`MISSING_TOKEN_MASS`] before renormalizing,
    /// so a top-k list with no matches yields a uniform distribution.
    pub fn from_top_logprobs(tokens: &[&str], top: &[(String, f64)]) -> Self {
        let weights: Vec<f64> = tokens
            .iter()
            .map(|wanted| {
                let wanted = wanted.trim().to_lowercase();
                let mass: f64 = top
                    .iter()
                    .filter(|(token, _)| token.trim().to_lowercase() == wanted)
                    .map(|(_, logprob)| logprob.exp())
                    .sum();
                if mass > 0.0 {
                    mass
                } else {
                    MISSING_TOKEN_MASS
                }
            })
            .collect();

        Self::from_weights(tokens, &weights)
    }

    /// Probability of `token`, or 0.0 when it was not requested.
    pub fn get(&self, token: &str) -> f64 {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    /// Probabilities in request order.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, p)| *p).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, p)| (t.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
