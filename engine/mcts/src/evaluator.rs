//! Evaluator trait for scoring actions and transitions.
//!
//! The search asks for two numbers:
//!
//! - a *fast reward* per action, available as soon as a node is expanded and
//!   used to order children before they have been evaluated
//! - a *full reward* for one transition, computed once when the child is
//!   first reached and backed up to the root

use std::error::Error;

use crate::world::WorldModel;

pub trait Evaluator<W: WorldModel> {
    type Error: Error + Send + Sync + 'static;

    /// Fast reward of each of `actions` at `state`, index-aligned.
    fn fast_rewards(
        &self,
        state: &W::State,
        actions: &[W::Action],
    ) -> Result<Vec<f64>, Self::Error>;

    /// Full reward for playing `actions[index]` at `state` and landing in `next`.
    fn reward(
        &self,
        state: &W::State,
        actions: &[W::Action],
        index: usize,
        next: &W::State,
    ) -> Result<f64, Self::Error>;
}

/// Scores every action equally. Useful for exercising tree mechanics.
#[derive(Debug, Clone, Copy)]
pub struct ConstantEvaluator {
    pub fast: f64,
    pub full: f64,
}

impl ConstantEvaluator {
    pub fn new(fast: f64, full: f64) -> Self {
        Self { fast, full }
    }
}

impl<W: WorldModel> Evaluator<W> for ConstantEvaluator {
    type Error = std::convert::Infallible;

    fn fast_rewards(
        &self,
        _state: &W::State,
        actions: &[W::Action],
    ) -> Result<Vec<f64>, Self::Error> {
        Ok(vec![self.fast; actions.len()])
    }

    fn reward(
        &self,
        _state: &W::State,
        _actions: &[W::Action],
        _index: usize,
        _next: &W::State,
    ) -> Result<f64, Self::Error> {
        Ok(self.full)
    }
}
