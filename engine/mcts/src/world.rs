//! The world model the search plans over.
//!
//! A world model enumerates actions, predicts what the other players do and
//! applies a joint move. It is consulted lazily: a node's actions are only
//! requested when the node is expanded.

use std::error::Error;

pub trait WorldModel {
    type State: Clone;
    type Action: Clone;
    /// Prediction of the other players' move from a state.
    type Others;
    /// Failures the search cannot recover from (transport errors, say).
    /// Recoverable problems should be absorbed by the model itself.
    type Error: Error + Send + Sync + 'static;

    /// Legal actions at `state`, in a fixed order without duplicates.
    fn actions(&self, state: &Self::State) -> Result<Vec<Self::Action>, Self::Error>;

    /// What the other players are expected to do from `state`.
    fn others_actions(&self, state: &Self::State) -> Result<Self::Others, Self::Error>;

    /// State reached by playing `action` while the others play `others`.
    fn step(
        &self,
        state: &Self::State,
        action: &Self::Action,
        others: &Self::Others,
    ) -> Result<Self::State, Self::Error>;

    /// Game-specific terminal test. The search's depth limit applies on top.
    fn is_terminal(&self, _state: &Self::State) -> bool {
        false
    }
}
