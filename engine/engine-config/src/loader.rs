//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Files tried, in order, when `RAP_CONFIG` is unset or points nowhere.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["config.toml", "../config.toml"];

/// First config file that exists: `RAP_CONFIG`, then [`CONFIG_SEARCH_PATHS`].
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("RAP_CONFIG") {
        let explicit = PathBuf::from(explicit);
        if explicit.exists() {
            return Some(explicit);
        }
        warn!(path = %explicit.display(), "RAP_CONFIG does not exist, searching defaults");
    }

    CONFIG_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load the central configuration, then apply `RAP_*` environment overrides.
///
/// Without a config file every value comes from the embedded defaults.
pub fn load_config() -> CentralConfig {
    match find_config_file() {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            load_from_path(&path)
        }
        None => {
            debug!("No config.toml found, using built-in defaults");
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Load configuration from a specific path.
///
/// An unreadable or malformed file is logged and replaced by the defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str::<CentralConfig>(&content).map_err(|e| e.to_string()));

    let config = parsed.unwrap_or_else(|reason| {
        warn!(path = %path.display(), %reason, "Config file unusable, using defaults");
        CentralConfig::default()
    });
    apply_env_overrides(config)
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Optional string field
    ($config:expr, $section:ident . $field:ident, $key:expr, optional) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: RAP_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "RAP_COMMON_LOG_LEVEL");

    // LLM
    env_override!(config, llm.backend, "RAP_LLM_BACKEND");
    env_override!(config, llm.model, "RAP_LLM_MODEL");
    env_override!(config, llm.api_base, "RAP_LLM_API_BASE");
    env_override!(config, llm.api_key_env, "RAP_LLM_API_KEY_ENV");
    env_override!(config, llm.temperature, "RAP_LLM_TEMPERATURE", parse);
    env_override!(
        config,
        llm.request_timeout_secs,
        "RAP_LLM_REQUEST_TIMEOUT_SECS",
        parse
    );
    env_override!(config, llm.seed, "RAP_LLM_SEED", parse);
    env_override!(
        config,
        llm.max_rule_lookups,
        "RAP_LLM_MAX_RULE_LOOKUPS",
        parse
    );

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "RAP_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.depth_limit, "RAP_MCTS_DEPTH_LIMIT", parse);
    env_override!(
        config,
        mcts.exploration_constant,
        "RAP_MCTS_EXPLORATION_CONSTANT",
        parse
    );

    // Prompts
    env_override!(config, prompts.path, "RAP_PROMPTS_PATH", optional);

    config
}
