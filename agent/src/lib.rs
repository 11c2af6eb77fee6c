//! Reasoning-via-Planning agent.
//!
//! The language model plays two roles in the search:
//!
//! - as world model ([`LlmWorldModel`]): it lists actions, predicts what
//!   the other players do and describes the next observation
//! - as scorer ([`LlmScorer`]): it rates actions and estimates the chance
//!   of winning
//!
//! [`RapAgent`] wires both into the generic `mcts` planner once per turn and
//! implements the harness [`engine_core::Agent`] contract.
//!
//! ```text
//! take_action ─▶ RapAgent ─▶ MctsSearch ─┬─▶ LlmWorldModel ─┐
//!                                        └─▶ LlmScorer ─────┴─▶ Logged ─▶ RuleLookup ─▶ backend
//! ```

pub mod agent;
pub mod config;
pub mod memo;
pub mod scoring;
pub mod state;
pub mod world_model;

pub use agent::{plan, root_observation, search_config, AgentError, BackendFactory, PlanOutcome, RapAgent};
pub use memo::{CacheStats, Memo};
pub use scoring::{fast_reward, full_reward, LlmScorer};
pub use state::{PlanState, StateRef, FALLBACK_ACTION, NO_OTHERS_INFO, NO_STATE_INFO};
pub use world_model::LlmWorldModel;
