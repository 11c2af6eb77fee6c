//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_backend() -> String {
    defaults::backend().into()
}
fn d_model() -> String {
    defaults::model().into()
}
fn d_api_base() -> String {
    defaults::api_base().into()
}
fn d_api_key_env() -> String {
    defaults::api_key_env().into()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}
fn d_request_timeout() -> u64 {
    defaults::request_timeout_secs()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_max_rule_lookups() -> u32 {
    defaults::max_rule_lookups()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_depth_limit() -> u32 {
    defaults::depth_limit()
}
fn d_exploration() -> f64 {
    defaults::exploration_constant()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Language model backend configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// One of `scripted`, `openai`, `interactive`
    #[serde(default = "d_backend")]
    pub backend: String,
    #[serde(default = "d_model")]
    pub model: String,
    /// Base URL of an OpenAI-compatible chat completion API
    #[serde(default = "d_api_base")]
    pub api_base: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
    #[serde(default = "d_request_timeout")]
    pub request_timeout_secs: u64,
    /// Seed for the scripted backend
    #[serde(default = "d_seed")]
    pub seed: u64,
    /// Maximum number of `rule(<heading>)` expansions per completion
    #[serde(default = "d_max_rule_lookups")]
    pub max_rule_lookups: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: defaults::backend().into(),
            model: defaults::model().into(),
            api_base: defaults::api_base().into(),
            api_key_env: defaults::api_key_env().into(),
            temperature: defaults::temperature(),
            request_timeout_secs: defaults::request_timeout_secs(),
            seed: defaults::seed(),
            max_rule_lookups: defaults::max_rule_lookups(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_depth_limit")]
    pub depth_limit: u32,
    #[serde(default = "d_exploration")]
    pub exploration_constant: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            depth_limit: defaults::depth_limit(),
            exploration_constant: defaults::exploration_constant(),
        }
    }
}

/// Prompt template location
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PromptsConfig {
    /// Path to a prompt template TOML. Built-in templates are used when unset.
    pub path: Option<String>,
}
