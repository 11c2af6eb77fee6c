//! The per-turn agent.
//!
//! A [`RapAgent`] owns configuration only. Everything built for a turn (the
//! backend and its decorators, the prompt composer, world model, scorer,
//! caches and search tree) is dropped when the turn ends, so no model
//! output leaks from one turn into the next.

use engine_config::{CentralConfig, ConfigError, LlmConfig};
use engine_core::{Action, Agent, AvailableActions, Observation, Rules};
use llm::{
    build_backend, LanguageModel, LlmError, Logged, PromptComposer, PromptError, PromptTemplates,
    RuleLookup, Template,
};
use mcts::{MctsSearch, MctsTree, SearchError, SearchResult};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::scoring::LlmScorer;
use crate::state::StateRef;
use crate::world_model::LlmWorldModel;

/// Builds a fresh backend for each turn.
pub type BackendFactory = Box<dyn Fn(&LlmConfig) -> Result<Box<dyn LanguageModel>, LlmError>>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Prompt templates: {0}")]
    Prompt(#[from] PromptError),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
}

/// Planner settings from the `[mcts]` config section.
pub fn search_config(config: &engine_config::MctsConfig) -> mcts::MctsConfig {
    mcts::MctsConfig::default()
        .with_simulations(config.num_simulations)
        .with_depth_limit(config.depth_limit)
        .with_exploration(config.exploration_constant)
}

/// Text of the root state: the observation, the image handle if any, and
/// the turn instructions.
pub fn root_observation(observation: &Observation, available_actions: &AvailableActions) -> String {
    let mut parts = vec![observation.text.clone()];
    if let Some(image) = &observation.image {
        parts.push(format!("[image: {image}]"));
    }
    if !available_actions.instructions.is_empty() {
        parts.push(available_actions.instructions.clone());
    }
    parts.join("\n")
}

/// The chosen action together with the tree that produced it.
pub struct PlanOutcome {
    pub result: SearchResult<Action>,
    pub tree: MctsTree<StateRef, Action>,
}

/// Run one search from `root`, with fresh caches.
pub fn plan<M: LanguageModel + ?Sized>(
    model: &M,
    composer: &PromptComposer,
    config: mcts::MctsConfig,
    root: StateRef,
    verbose: bool,
) -> Result<PlanOutcome, SearchError> {
    let world = LlmWorldModel::new(model, composer, config.depth_limit).with_verbose(verbose);
    let scorer = LlmScorer::new(model, composer);

    let mut search = MctsSearch::new(&world, &scorer, config, root);
    let result = search.run()?;

    for (cache, stats) in world.cache_stats().iter().chain(scorer.cache_stats().iter()) {
        debug!(
            cache,
            entries = stats.entries,
            hits = stats.hits,
            misses = stats.misses,
            "Cache usage"
        );
    }

    Ok(PlanOutcome {
        result,
        tree: search.into_tree(),
    })
}

/// Reasoning-via-Planning agent.
pub struct RapAgent {
    llm: LlmConfig,
    search: mcts::MctsConfig,
    templates: Arc<PromptTemplates>,
    backend: BackendFactory,
}

impl RapAgent {
    pub fn new(config: &CentralConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let templates = PromptTemplates::load_or_builtin(config.prompts.path.as_deref().map(Path::new))?;
        Ok(Self {
            llm: config.llm.clone(),
            search: search_config(&config.mcts),
            templates: Arc::new(templates),
            backend: Box::new(build_backend),
        })
    }

    /// Builder pattern: replace the backend factory.
    pub fn with_backend<F>(mut self, factory: F) -> Self
    where
        F: Fn(&LlmConfig) -> Result<Box<dyn LanguageModel>, LlmError> + 'static,
    {
        self.backend = Box::new(factory);
        self
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    pub fn with_search_config(mut self, config: mcts::MctsConfig) -> Self {
        self.search = config;
        self
    }

    pub fn search_config(&self) -> &mcts::MctsConfig {
        &self.search
    }

    /// Plan one turn. Unlike [`Agent::take_action`] this reports failures.
    pub fn plan_turn(
        &self,
        rules: &Rules,
        observation: &Observation,
        available_actions: &AvailableActions,
        verbose: bool,
    ) -> Result<PlanOutcome, AgentError> {
        let composer = PromptComposer::new(Arc::clone(&self.templates), Arc::new(rules.clone()));
        let backend = (self.backend)(&self.llm)?;
        let model = decorate(backend, Arc::clone(composer.rules()), self.llm.max_rule_lookups, verbose);

        self.plan_with(&*model, &composer, observation, available_actions, verbose)
    }

    fn plan_with<M: LanguageModel + ?Sized>(
        &self,
        model: &M,
        composer: &PromptComposer,
        observation: &Observation,
        available_actions: &AvailableActions,
        verbose: bool,
    ) -> Result<PlanOutcome, AgentError> {
        let text = root_observation(observation, available_actions);
        let actions = root_actions(model, composer, &text, available_actions)?;
        debug!(num_actions = actions.len(), "Built root actions");

        let root = LlmWorldModel::<M>::initial(text, actions);
        let outcome = plan(model, composer, self.search.clone(), root, verbose)?;

        if verbose {
            log_tree(&outcome.tree);
        }
        Ok(outcome)
    }
}

/// Rule lookups innermost, so a verbose log shows one entry per resolved
/// completion.
fn decorate(
    backend: Box<dyn LanguageModel>,
    rules: Arc<Rules>,
    max_lookups: u32,
    verbose: bool,
) -> Box<dyn LanguageModel> {
    let model = RuleLookup::new(backend, rules, max_lookups);
    if verbose {
        Box::new(Logged::new(model))
    } else {
        Box::new(model)
    }
}

/// Predefined actions carry their description as payload. Each openended
/// action gets one completion as its response.
fn root_actions<M: LanguageModel + ?Sized>(
    model: &M,
    composer: &PromptComposer,
    observation: &str,
    available_actions: &AvailableActions,
) -> Result<Vec<Action>, LlmError> {
    let mut actions: Vec<Action> = available_actions
        .predefined
        .iter()
        .map(|(id, description)| Action::with_response(id, description))
        .collect();

    for (id, description) in &available_actions.openended {
        let context = composer.compose(
            Template::Openended,
            &[("observation", observation), ("prompt", description.as_str())],
        );
        let response = model.complete(&context)?;
        actions.push(Action::with_response(id, response.trim()));
    }

    Ok(actions)
}

fn log_tree(tree: &MctsTree<StateRef, Action>) {
    for (id, node) in tree.iter() {
        info!(
            node = id.0,
            parent = ?node.parent.is_some().then_some(node.parent.0),
            depth = node.depth,
            visits = node.visit_count,
            value = node.mean_value(),
            reward = ?node.reward,
            observation = %node.state.observation,
            sentinel = node.state.is_sentinel(),
            "Search tree node"
        );
    }
}

impl Agent for RapAgent {
    fn take_action(
        &mut self,
        rules: &Rules,
        observation: &Observation,
        available_actions: &AvailableActions,
        verbose: bool,
    ) -> Action {
        match self.plan_turn(rules, observation, available_actions, verbose) {
            Ok(outcome) => {
                let result = outcome.result;
                debug!(
                    action = %result.action,
                    simulations = result.simulations,
                    value = result.value,
                    policy = ?result.policy,
                    "Chose action"
                );
                result.action
            }
            Err(e) => {
                error!(error = %e, "Planning failed, returning the null action");
                Action::none()
            }
        }
    }
}
