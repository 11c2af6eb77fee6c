//! Range checks on a loaded configuration.
//!
//! Values from config.toml and `RAP_*` overrides are only parsed, not
//! checked, so every entry point validates before planning.

use crate::CentralConfig;
use thiserror::Error;

/// Highest accepted rules-lookup cap.
pub const MAX_RULE_LOOKUPS: u32 = 8;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("llm.model cannot be empty")]
    EmptyModel,

    #[error("llm.temperature must be a non-negative number, got {0}")]
    Temperature(f64),

    #[error("llm.max_rule_lookups must be at most {max}, got {got}")]
    RuleLookups { got: u32, max: u32 },

    #[error("mcts.num_simulations must be greater than 0")]
    NoSimulations,

    #[error("mcts.exploration_constant must be a non-negative number, got {0}")]
    Exploration(f64),
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl CentralConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if !non_negative(self.llm.temperature) {
            return Err(ConfigError::Temperature(self.llm.temperature));
        }
        if self.llm.max_rule_lookups > MAX_RULE_LOOKUPS {
            return Err(ConfigError::RuleLookups {
                got: self.llm.max_rule_lookups,
                max: MAX_RULE_LOOKUPS,
            });
        }
        if self.mcts.num_simulations == 0 {
            return Err(ConfigError::NoSimulations);
        }
        if !non_negative(self.mcts.exploration_constant) {
            return Err(ConfigError::Exploration(self.mcts.exploration_constant));
        }
        Ok(())
    }
}
