//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so the binary and the
//! library agree on every default without a runtime file.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    llm: LlmDefaults,
    mcts: MctsDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct LlmDefaults {
    backend: String,
    model: String,
    api_base: String,
    api_key_env: String,
    temperature: f64,
    request_timeout_secs: u64,
    seed: u64,
    max_rule_lookups: u32,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    depth_limit: u32,
    exploration_constant: f64,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// LLM
pub fn backend() -> &'static str {
    &DEFAULTS.llm.backend
}
pub fn model() -> &'static str {
    &DEFAULTS.llm.model
}
pub fn api_base() -> &'static str {
    &DEFAULTS.llm.api_base
}
pub fn api_key_env() -> &'static str {
    &DEFAULTS.llm.api_key_env
}
pub fn temperature() -> f64 {
    DEFAULTS.llm.temperature
}
pub fn request_timeout_secs() -> u64 {
    DEFAULTS.llm.request_timeout_secs
}
pub fn seed() -> u64 {
    DEFAULTS.llm.seed
}
pub fn max_rule_lookups() -> u32 {
    DEFAULTS.llm.max_rule_lookups
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn depth_limit() -> u32 {
    DEFAULTS.mcts.depth_limit
}
pub fn exploration_constant() -> f64 {
    DEFAULTS.mcts.exploration_constant
}
