//! The language model as world model.
//!
//! Actions, the other players' move and the next observation are all
//! predicted by prompting the model and reading a tagged section of its
//! answer. Unparseable answers never fail the search: they are replaced by
//! the sentinels in [`crate::state`].

use engine_core::Action;
use llm::{LanguageModel, LlmError, PromptComposer, Template};
use mcts::WorldModel;
use std::rc::Rc;
use tracing::{trace, warn};

use crate::memo::{CacheStats, Memo};
use crate::state::{
    extract_tag, PlanState, StateRef, FALLBACK_ACTION, NO_OTHERS_INFO, NO_STATE_INFO,
};

type StepKey = (StateRef, Action, String);

pub struct LlmWorldModel<'a, M: ?Sized> {
    model: &'a M,
    composer: &'a PromptComposer,
    depth_limit: u32,
    verbose: bool,
    actions: Memo<StateRef, Vec<Action>>,
    others: Memo<StateRef, String>,
    steps: Memo<StepKey, StateRef>,
}

impl<'a, M: LanguageModel + ?Sized> LlmWorldModel<'a, M> {
    pub fn new(model: &'a M, composer: &'a PromptComposer, depth_limit: u32) -> Self {
        Self {
            model,
            composer,
            depth_limit,
            verbose: false,
            actions: Memo::new(),
            others: Memo::new(),
            steps: Memo::new(),
        }
    }

    /// Builder pattern: report parse failures at warn level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The root state for a turn.
    pub fn initial(observation: impl Into<String>, actions: Vec<Action>) -> StateRef {
        Rc::new(PlanState::root(observation, actions))
    }

    /// Successors of `state`, one per action, in action order.
    pub fn children(&self, state: &StateRef) -> Result<Vec<StateRef>, LlmError> {
        let others = self.others_actions(state)?;
        self.actions(state)?
            .iter()
            .map(|action| self.step(state, action, &others))
            .collect()
    }

    pub fn cache_stats(&self) -> [(&'static str, CacheStats); 3] {
        [
            ("actions", self.actions.stats()),
            ("others", self.others.stats()),
            ("step", self.steps.stats()),
        ]
    }

    fn parse_failure(&self, tag: &str, response: &str) {
        if self.verbose {
            warn!(tag, response, "Model answer has no usable section, using fallback");
        }
    }
}

/// One action per non-empty line, trimmed, duplicates dropped.
fn parse_actions(section: &str) -> Vec<Action> {
    let mut actions: Vec<Action> = Vec::new();
    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let action = Action::new(line);
        if !actions.contains(&action) {
            actions.push(action);
        }
    }
    actions
}

impl<'a, M: LanguageModel + ?Sized> WorldModel for LlmWorldModel<'a, M> {
    type State = StateRef;
    type Action = Action;
    type Others = String;
    type Error = LlmError;

    fn actions(&self, state: &StateRef) -> Result<Vec<Action>, LlmError> {
        if let Some(actions) = &state.actions {
            return Ok(actions.clone());
        }

        self.actions.get_or_try_insert_with(Rc::clone(state), || {
            let context = self
                .composer
                .compose(Template::Actions, &[("observation", state.observation.as_str())]);
            let response = self.model.complete(&context)?;

            let actions = extract_tag(&response, "actions")
                .map(parse_actions)
                .unwrap_or_default();
            if actions.is_empty() {
                self.parse_failure("actions", &response);
                return Ok(vec![Action::new(FALLBACK_ACTION)]);
            }
            trace!(depth = state.depth, count = actions.len(), "Predicted actions");
            Ok(actions)
        })
    }

    fn others_actions(&self, state: &StateRef) -> Result<String, LlmError> {
        self.others.get_or_try_insert_with(Rc::clone(state), || {
            let context = self
                .composer
                .compose(Template::Others, &[("observation", state.observation.as_str())]);
            let response = self.model.complete(&context)?;

            Ok(match extract_tag(&response, "others") {
                Some(others) => others.to_string(),
                None => {
                    self.parse_failure("others", &response);
                    NO_OTHERS_INFO.to_string()
                }
            })
        })
    }

    fn step(&self, state: &StateRef, action: &Action, others: &String) -> Result<StateRef, LlmError> {
        let key = (Rc::clone(state), action.clone(), others.clone());
        self.steps.get_or_try_insert_with(key, || {
            let action = action.to_string();
            let context = self.composer.compose(
                Template::State,
                &[
                    ("observation", state.observation.as_str()),
                    ("action", action.as_str()),
                    ("others", others.as_str()),
                ],
            );
            let response = self.model.complete(&context)?;

            let observation = match extract_tag(&response, "state") {
                Some(observation) => observation,
                None => {
                    self.parse_failure("state", &response);
                    NO_STATE_INFO
                }
            };
            trace!(depth = state.depth + 1, action = %action, "Predicted next state");
            Ok(Rc::new(state.successor(observation)))
        })
    }

    fn is_terminal(&self, state: &StateRef) -> bool {
        state.depth >= self.depth_limit
    }
}
