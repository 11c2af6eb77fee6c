//! Core types shared by the RAP agent and the game harness
//!
//! This crate provides the value types that cross the harness boundary:
//! - `Rules`, `Observation`, `AvailableActions`: per-turn input from the game
//! - `Action`: the agent's answer for a turn
//! - `ChatContext`: an alternating user/assistant transcript fed to a language model
//! - `Agent`: the per-turn contract the harness drives

pub mod agent;
pub mod chat;
pub mod types;

// Re-export main types for convenience
pub use agent::{Agent, Turn};
pub use chat::{ChatContext, Message, Role};
pub use types::{Action, AvailableActions, Observation, Rules};
