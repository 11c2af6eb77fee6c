//! Language model gateway for the RAP planner.
//!
//! Every LLM-derived quantity the planner needs flows through two calls:
//!
//! - [`LanguageModel::complete`]: next assistant message for a chat context
//! - [`LanguageModel::probabilities`]: a normalized distribution over a small
//!   set of answer tokens (`yes`/`no`, action indices)
//!
//! # Backends
//!
//! - [`ScriptedBackend`]: seeded placeholders and random distributions (tests, dry runs)
//! - [`InteractiveBackend`]: an operator types the answers; empty input falls back to scripted
//! - `OpenAiBackend`: any OpenAI-compatible chat completion API (feature `openai`)
//!
//! # Decorators
//!
//! Backends are wrapped, never subclassed. [`RuleLookup`] resolves
//! `rule(<heading>)` requests against the game rules before a completion is
//! returned; [`Logged`] traces every call. The facade stacks them with
//! rules-lookup innermost:
//!
//! ```text
//! Logged ─▶ RuleLookup ─▶ backend
//! ```
//!
//! # Prompts
//!
//! [`PromptTemplates`] is loaded once from TOML; a [`PromptComposer`] binds it
//! to the current [`engine_core::Rules`] and renders a [`Template`] with slot
//! values into a [`engine_core::ChatContext`].

pub mod backend;
pub mod gateway;
pub mod interactive;
pub mod logging;
pub mod lookup;
pub mod prompts;
pub mod scripted;

#[cfg(feature = "openai")]
pub mod openai;

// Re-export main types
pub use backend::{build_backend, BackendKind};
pub use gateway::{LanguageModel, LlmError, TokenProbs, MAX_TOP_LOGPROBS, MISSING_TOKEN_MASS};
pub use interactive::InteractiveBackend;
pub use logging::Logged;
pub use lookup::{requested_rule, RuleLookup};
pub use prompts::{PromptComposer, PromptError, PromptTemplates, Template};
pub use scripted::ScriptedBackend;

#[cfg(feature = "openai")]
pub use openai::OpenAiBackend;
