//! Configuration for the rap-agent binary
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use llm::BackendKind;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_backend() -> String {
    CENTRAL_CONFIG.llm.backend.clone()
}

fn default_model() -> String {
    CENTRAL_CONFIG.llm.model.clone()
}

fn default_api_base() -> String {
    CENTRAL_CONFIG.llm.api_base.clone()
}

fn default_temperature() -> f64 {
    CENTRAL_CONFIG.llm.temperature
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.llm.seed
}

fn default_max_rule_lookups() -> u32 {
    CENTRAL_CONFIG.llm.max_rule_lookups
}

fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_depth_limit() -> u32 {
    CENTRAL_CONFIG.mcts.depth_limit
}

fn default_exploration_constant() -> f64 {
    CENTRAL_CONFIG.mcts.exploration_constant
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "rap-agent")]
#[command(about = "Reasoning-via-Planning agent - plans one game turn with MCTS over a language model")]
#[command(
    long_about = "Reads one turn (rules, observation, available actions) as JSON, plans with
Monte Carlo Tree Search using a language model as world model and scorer, and
prints the chosen action as JSON on stdout.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Language model backend (scripted, openai, interactive)
    #[arg(long, default_value_t = default_backend())]
    pub backend: String,

    /// Model identifier sent to the API
    #[arg(long, default_value_t = default_model())]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, default_value_t = default_api_base())]
    pub api_base: String,

    /// Sampling temperature for completions
    #[arg(long, default_value_t = default_temperature())]
    pub temperature: f64,

    /// Seed for the scripted backend
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Maximum rule expansions per completion
    #[arg(long, default_value_t = default_max_rule_lookups())]
    pub max_rule_lookups: u32,

    /// Number of MCTS simulations per turn
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    /// Transitions simulated below the root before a state is terminal
    #[arg(long, default_value_t = default_depth_limit())]
    pub depth_limit: u32,

    /// Weight of the UCT exploration term
    #[arg(long, default_value_t = default_exploration_constant())]
    pub exploration_constant: f64,

    /// Prompt template TOML (built-in templates when omitted)
    #[arg(long)]
    pub prompts: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Turn JSON file; read from stdin when omitted
    #[arg(long)]
    pub turn: Option<PathBuf>,

    /// Log every model call and the final search tree
    #[arg(long)]
    pub verbose: bool,
}

impl Config {
    /// Backend name and log level here, numeric ranges in
    /// [`CentralConfig::validate`].
    pub fn validate(&self) -> Result<()> {
        self.backend.parse::<BackendKind>()?;
        self.to_central().validate()?;

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Central config with the command-line values applied on top.
    pub fn to_central(&self) -> CentralConfig {
        let mut central = CENTRAL_CONFIG.clone();
        central.common.log_level = self.log_level.clone();
        central.llm.backend = self.backend.clone();
        central.llm.model = self.model.clone();
        central.llm.api_base = self.api_base.clone();
        central.llm.temperature = self.temperature;
        central.llm.seed = self.seed;
        central.llm.max_rule_lookups = self.max_rule_lookups;
        central.mcts.num_simulations = self.num_simulations;
        central.mcts.depth_limit = self.depth_limit;
        central.mcts.exploration_constant = self.exploration_constant;
        if let Some(path) = &self.prompts {
            central.prompts.path = Some(path.display().to_string());
        }
        central
    }
}
