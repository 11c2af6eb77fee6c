//! Backend selection from configuration.

use engine_config::LlmConfig;
use std::str::FromStr;
use tracing::info;

use crate::gateway::{LanguageModel, LlmError};
use crate::interactive::InteractiveBackend;
use crate::scripted::ScriptedBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Scripted,
    OpenAi,
    Interactive,
}

impl FromStr for BackendKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scripted" | "random" => Ok(BackendKind::Scripted),
            "openai" | "real" => Ok(BackendKind::OpenAi),
            "interactive" => Ok(BackendKind::Interactive),
            _ => Err(LlmError::UnknownBackend(s.to_string())),
        }
    }
}

/// Build the backend named by `config.backend`.
pub fn build_backend(config: &LlmConfig) -> Result<Box<dyn LanguageModel>, LlmError> {
    let kind: BackendKind = config.backend.parse()?;
    info!(backend = ?kind, model = %config.model, "Building LLM backend");

    match kind {
        BackendKind::Scripted => Ok(Box::new(ScriptedBackend::new(config.seed))),
        BackendKind::Interactive => Ok(Box::new(InteractiveBackend::stdio(config.seed))),
        BackendKind::OpenAi => build_openai(config),
    }
}

#[cfg(feature = "openai")]
fn build_openai(config: &LlmConfig) -> Result<Box<dyn LanguageModel>, LlmError> {
    Ok(Box::new(crate::openai::OpenAiBackend::from_config(config)?))
}

#[cfg(not(feature = "openai"))]
fn build_openai(_config: &LlmConfig) -> Result<Box<dyn LanguageModel>, LlmError> {
    Err(LlmError::BackendUnavailable("openai".into()))
}
