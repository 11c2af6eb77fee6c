//! The per-turn contract between the harness and an agent.

use serde::{Deserialize, Serialize};

use crate::types::{Action, AvailableActions, Observation, Rules};

/// An agent that picks one action per game turn.
///
/// Implementations must not panic or fail on ordinary game-play conditions.
/// On internal failure they return [`Action::none`].
pub trait Agent {
    fn take_action(
        &mut self,
        rules: &Rules,
        observation: &Observation,
        available_actions: &AvailableActions,
        verbose: bool,
    ) -> Action;
}

/// One turn's worth of harness input, as exchanged on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub rules: Rules,
    pub observation: Observation,
    pub available_actions: AvailableActions,
}

impl Turn {
    /// Drive `agent` through this turn.
    pub fn play<A: Agent + ?Sized>(&self, agent: &mut A, verbose: bool) -> Action {
        agent.take_action(
            &self.rules,
            &self.observation,
            &self.available_actions,
            verbose,
        )
    }
}
