//! Action and state scoring with the language model.
//!
//! Three signals feed the search:
//!
//! - intuition: the model's distribution over the numbered action list
//! - self-evaluation: P("yes") to "is this a good action?"
//! - win probability: P("yes") to "am I going to win?" on the resulting state
//!
//! They are combined linearly, see [`fast_reward`] and [`full_reward`].

use engine_core::Action;
use llm::{LanguageModel, LlmError, PromptComposer, Template};
use mcts::Evaluator;
use std::rc::Rc;
use tracing::trace;

use crate::memo::{CacheStats, Memo};
use crate::state::StateRef;
use crate::world_model::LlmWorldModel;

const YES_NO: [&str; 2] = ["yes", "no"];

/// Reward used to order children before they have been evaluated.
pub fn fast_reward(intuition: f64, self_eval: f64) -> f64 {
    intuition + self_eval
}

/// Reward backed up through the tree. The win probability is remapped from
/// [0, 1] onto [-1, 1].
pub fn full_reward(intuition: f64, self_eval: f64, win_probability: f64) -> f64 {
    intuition + self_eval + (2.0 * win_probability - 1.0)
}

/// Renders actions as the numbered list the model picks from.
pub fn numbered_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .enumerate()
        .map(|(i, action)| format!("{i}. {action}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct LlmScorer<'a, M: ?Sized> {
    model: &'a M,
    composer: &'a PromptComposer,
    intuitions: Memo<(StateRef, Vec<Action>), Vec<f64>>,
    self_evals: Memo<(StateRef, Action), f64>,
    wins: Memo<StateRef, f64>,
}

impl<'a, M: LanguageModel + ?Sized> LlmScorer<'a, M> {
    pub fn new(model: &'a M, composer: &'a PromptComposer) -> Self {
        Self {
            model,
            composer,
            intuitions: Memo::new(),
            self_evals: Memo::new(),
            wins: Memo::new(),
        }
    }

    /// Probability the model would pick each action, index-aligned.
    pub fn intuitions(&self, state: &StateRef, actions: &[Action]) -> Result<Vec<f64>, LlmError> {
        let key = (Rc::clone(state), actions.to_vec());
        self.intuitions.get_or_try_insert_with(key, || {
            let listing = numbered_actions(actions);
            let context = self.composer.compose(
                Template::ActionSelect,
                &[
                    ("observation", state.observation.as_str()),
                    ("actions", listing.as_str()),
                ],
            );

            let indices: Vec<String> = (0..actions.len()).map(|i| i.to_string()).collect();
            let tokens: Vec<&str> = indices.iter().map(String::as_str).collect();
            let probs = self.model.probabilities(&context, &tokens)?;
            Ok(probs.values())
        })
    }

    /// P("yes") that `action` is a good move at `state`.
    pub fn self_eval(&self, state: &StateRef, action: &Action) -> Result<f64, LlmError> {
        let key = (Rc::clone(state), action.clone());
        self.self_evals.get_or_try_insert_with(key, || {
            let action = action.to_string();
            let context = self.composer.compose(
                Template::SelfEval,
                &[
                    ("observation", state.observation.as_str()),
                    ("action", action.as_str()),
                ],
            );
            Ok(self.model.probabilities(&context, &YES_NO)?.get("yes"))
        })
    }

    /// P("yes") that the game is going to be won from `state`.
    pub fn win_probability(&self, state: &StateRef) -> Result<f64, LlmError> {
        self.wins.get_or_try_insert_with(Rc::clone(state), || {
            let context = self
                .composer
                .compose(Template::Goal, &[("observation", state.observation.as_str())]);
            Ok(self.model.probabilities(&context, &YES_NO)?.get("yes"))
        })
    }

    pub fn cache_stats(&self) -> [(&'static str, CacheStats); 3] {
        [
            ("intuition", self.intuitions.stats()),
            ("self_eval", self.self_evals.stats()),
            ("win", self.wins.stats()),
        ]
    }
}

impl<'a, 'w, M, W> Evaluator<LlmWorldModel<'w, W>> for LlmScorer<'a, M>
where
    M: LanguageModel + ?Sized,
    W: LanguageModel + ?Sized,
{
    type Error = LlmError;

    fn fast_rewards(&self, state: &StateRef, actions: &[Action]) -> Result<Vec<f64>, LlmError> {
        let intuitions = self.intuitions(state, actions)?;
        actions
            .iter()
            .zip(intuitions)
            .map(|(action, i)| Ok(fast_reward(i, self.self_eval(state, action)?)))
            .collect()
    }

    fn reward(
        &self,
        state: &StateRef,
        actions: &[Action],
        index: usize,
        next: &StateRef,
    ) -> Result<f64, LlmError> {
        let i = self.intuitions(state, actions)?[index];
        let s = self.self_eval(state, &actions[index])?;
        let w = self.win_probability(next)?;
        let reward = full_reward(i, s, w);
        trace!(depth = next.depth, intuition = i, self_eval = s, win = w, reward, "Scored transition");
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{ChatContext, Rules};
    use llm::{PromptTemplates, ScriptedBackend, TokenProbs};
    use std::cell::Cell;
    use std::sync::Arc;

    fn composer() -> PromptComposer {
        PromptComposer::new(
            Arc::new(PromptTemplates::builtin().unwrap()),
            Arc::new(Rules::new("Pit", "Corner a commodity")),
        )
    }

    fn root() -> StateRef {
        Rc::new(crate::state::PlanState::root(
            "you hold wheat",
            vec![Action::new("a"), Action::new("b")],
        ))
    }

    /// Fixed answers: intuition favours the first action, every self-eval is
    /// 0.75 and every win question is 0.25.
    struct Fixed {
        calls: Cell<usize>,
    }

    impl LanguageModel for Fixed {
        fn complete(&self, _context: &ChatContext) -> Result<String, LlmError> {
            Ok(String::new())
        }

        fn probabilities(&self, context: &ChatContext, tokens: &[&str]) -> Result<TokenProbs, LlmError> {
            self.calls.set(self.calls.get() + 1);
            let prompt = &context.last().unwrap().content;
            if prompt.contains("Am I going to win") {
                return Ok(TokenProbs::from_weights(tokens, &[0.25, 0.75]));
            }
            if prompt.contains("Is this a good action") {
                return Ok(TokenProbs::from_weights(tokens, &[0.75, 0.25]));
            }
            let weights: Vec<f64> = (0..tokens.len()).map(|i| (tokens.len() - i) as f64).collect();
            Ok(TokenProbs::from_weights(tokens, &weights))
        }
    }

    #[test]
    fn test_full_reward_identity() {
        for &(i, s, w) in &[(0.0, 0.0, 0.0), (0.3, 0.6, 0.9), (1.0, 1.0, 1.0), (0.5, 0.25, 0.5)] {
            let expected = i + s + 2.0 * w - 1.0;
            assert!((full_reward(i, s, w) - expected).abs() < 1e-9);
        }
        assert!((full_reward(0.5, 0.5, 0.0) - 0.0).abs() < 1e-9);
        assert!((fast_reward(0.25, 0.5) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_numbered_actions() {
        let actions = vec![Action::new("a"), Action::with_response("talk", "hello")];
        assert_eq!(numbered_actions(&actions), "0. a\n1. talk: hello");
        assert_eq!(numbered_actions(&[]), "");
    }

    #[test]
    fn test_intuitions_index_aligned() {
        let model = Fixed { calls: Cell::new(0) };
        let composer = composer();
        let scorer = LlmScorer::new(&model, &composer);
        let state = root();
        let actions = state.actions.clone().unwrap();

        let intuitions = scorer.intuitions(&state, &actions).unwrap();
        assert_eq!(intuitions.len(), 2);
        assert!((intuitions[0] - 2.0 / 3.0).abs() < 1e-9);
        assert!((intuitions[1] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_yes_probabilities() {
        let model = Fixed { calls: Cell::new(0) };
        let composer = composer();
        let scorer = LlmScorer::new(&model, &composer);
        let state = root();

        assert!((scorer.self_eval(&state, &Action::new("a")).unwrap() - 0.75).abs() < 1e-9);
        assert!((scorer.win_probability(&state).unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_scores_are_memoized() {
        let model = Fixed { calls: Cell::new(0) };
        let composer = composer();
        let scorer = LlmScorer::new(&model, &composer);
        let state = root();
        let actions = state.actions.clone().unwrap();

        let first = scorer.intuitions(&state, &actions).unwrap();
        let again = scorer.intuitions(&state, &actions).unwrap();
        assert_eq!(first, again);
        scorer.self_eval(&state, &actions[0]).unwrap();
        scorer.self_eval(&state, &actions[0]).unwrap();
        scorer.win_probability(&state).unwrap();
        scorer.win_probability(&state).unwrap();

        assert_eq!(model.calls.get(), 3);
        assert!(scorer.cache_stats().iter().all(|(_, stats)| stats.hits == 1));
    }

    #[test]
    fn test_evaluator_composes_rewards() {
        let model = Fixed { calls: Cell::new(0) };
        let composer = composer();
        let scorer = LlmScorer::new(&model, &composer);
        let state = root();
        let next = Rc::new(state.successor("after a"));
        let actions = state.actions.clone().unwrap();

        let fast = <LlmScorer<'_, Fixed> as Evaluator<LlmWorldModel<'_, Fixed>>>::fast_rewards(
            &scorer, &state, &actions,
        )
        .unwrap();
        assert!((fast[0] - (2.0 / 3.0 + 0.75)).abs() < 1e-9);
        assert!((fast[1] - (1.0 / 3.0 + 0.75)).abs() < 1e-9);

        let full = <LlmScorer<'_, Fixed> as Evaluator<LlmWorldModel<'_, Fixed>>>::reward(
            &scorer, &state, &actions, 1, &next,
        )
        .unwrap();
        assert!((full - full_reward(1.0 / 3.0, 0.75, 0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_scripted_scores_in_unit_range() {
        let model = ScriptedBackend::new(5);
        let composer = composer();
        let scorer = LlmScorer::new(&model, &composer);
        let state = root();
        let actions = state.actions.clone().unwrap();

        let total: f64 = scorer.intuitions(&state, &actions).unwrap().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        let s = scorer.self_eval(&state, &actions[1]).unwrap();
        assert!((0.0..=1.0).contains(&s));
    }
}
