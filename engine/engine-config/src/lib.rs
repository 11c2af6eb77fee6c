//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic shared
//! by the planner library and the `rap-agent` binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`RAP_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! RAP_<SECTION>_<KEY>=value
//!
//! Examples:
//!     RAP_LLM_BACKEND=openai
//!     RAP_LLM_MODEL=gpt-4o
//!     RAP_MCTS_NUM_SIMULATIONS=20
//!     RAP_MCTS_DEPTH_LIMIT=3
//! ```

mod defaults;
mod loader;
mod structs;
mod validate;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
pub use validate::{ConfigError, MAX_RULE_LOOKUPS};
