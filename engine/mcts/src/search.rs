//! MCTS search implementation.
//!
//! Each simulation runs strictly in order:
//! 1. Selection: descend by UCT while the node is expanded and not terminal
//! 2. Expansion: ask the world model for the leaf's actions and successors,
//!    then pick one child by UCT
//! 3. Evaluation: full reward of the transition into that child (no
//!    rollout; the depth limit stands in for one)
//! 4. Backpropagation: add that reward to every node up to the root
//!
//! A leaf reached for the first time is scored before it is expanded, so
//! every transition's own reward is backed up exactly once.

use std::error::Error;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::MctsConfig;
use crate::evaluator::Evaluator;
use crate::node::NodeId;
use crate::tree::{MctsTree, TreeStats};
use crate::world::WorldModel;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("World model error: {0}")]
    World(Box<dyn Error + Send + Sync>),

    #[error("Evaluator error: {0}")]
    Evaluator(Box<dyn Error + Send + Sync>),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Simulation budget is zero")]
    NoSimulations,

    #[error("Evaluator returned {got} fast rewards for {expected} actions")]
    RewardCountMismatch { expected: usize, got: usize },
}

impl SearchError {
    fn world(e: impl Error + Send + Sync + 'static) -> Self {
        SearchError::World(Box::new(e))
    }

    fn evaluator(e: impl Error + Send + Sync + 'static) -> Self {
        SearchError::Evaluator(Box::new(e))
    }
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult<A> {
    /// Best action to take
    pub action: A,

    /// Position of `action` in the root's action list
    pub index: usize,

    /// Visit distribution over the root's actions
    pub policy: Vec<f64>,

    /// Mean backed-up value at the root
    pub value: f64,

    /// Number of simulations performed
    pub simulations: u32,

    pub stats: TreeStats,
}

/// MCTS search state.
pub struct MctsSearch<'a, W: WorldModel, E: Evaluator<W>> {
    tree: MctsTree<W::State, W::Action>,
    world: &'a W,
    evaluator: &'a E,
    config: MctsConfig,
}

impl<'a, W: WorldModel, E: Evaluator<W>> MctsSearch<'a, W, E> {
    /// Create a new MCTS search rooted at `root_state`.
    pub fn new(world: &'a W, evaluator: &'a E, config: MctsConfig, root_state: W::State) -> Self {
        let root_terminal = config.depth_limit == 0 || world.is_terminal(&root_state);
        Self {
            tree: MctsTree::new(root_state, root_terminal),
            world,
            evaluator,
            config,
        }
    }

    /// Run the search for the configured number of simulations.
    pub fn run(&mut self) -> Result<SearchResult<W::Action>, SearchError> {
        let root_id = self.tree.root();

        if self.tree.get(root_id).is_terminal {
            let actions = self
                .world
                .actions(&self.tree.get(root_id).state)
                .map_err(SearchError::world)?;
            let num_actions = actions.len();
            let action = actions.into_iter().next().ok_or(SearchError::NoLegalMoves)?;
            warn!(num_actions, "Root is terminal, returning the first available action");

            let mut policy = vec![0.0; num_actions];
            policy[0] = 1.0;
            return Ok(SearchResult {
                action,
                index: 0,
                policy,
                value: 0.0,
                simulations: 0,
                stats: self.tree.stats(),
            });
        }

        if self.config.num_simulations == 0 {
            return Err(SearchError::NoSimulations);
        }

        for _ in 0..self.config.num_simulations {
            self.simulate()?;
        }

        let best = self.tree.best_child().ok_or(SearchError::NoLegalMoves)?;
        let index = self.tree.get(best).index;
        let root = self.tree.get(root_id);
        let stats = self.tree.stats();

        debug!(
            simulations = root.visit_count,
            nodes = stats.total_nodes,
            max_depth = stats.max_depth,
            chosen = index,
            "MCTS search complete"
        );

        Ok(SearchResult {
            action: root.actions[index].clone(),
            index,
            policy: self.tree.root_policy(),
            value: stats.root_value,
            simulations: root.visit_count,
            stats,
        })
    }

    /// Run a single simulation (select -> expand -> evaluate -> backpropagate).
    fn simulate(&mut self) -> Result<(), SearchError> {
        let leaf_id = self.select();
        let leaf = self.tree.get(leaf_id);

        let target = if leaf.is_terminal || (!leaf.is_root() && leaf.reward.is_none()) {
            leaf_id
        } else {
            if self.expand(leaf_id)? == 0 && leaf_id == self.tree.root() {
                return Err(SearchError::NoLegalMoves);
            }
            self.tree
                .select_child(leaf_id, self.config.exploration_constant)
                .unwrap_or(leaf_id)
        };

        let reward = self.evaluate(target)?;
        self.tree.backpropagate(target, reward);

        trace!(
            leaf = leaf_id.0,
            target = target.0,
            depth = self.tree.get(target).depth,
            reward,
            "MCTS simulation complete"
        );
        Ok(())
    }

    /// Descend from the root to a terminal or unexpanded node.
    fn select(&self) -> NodeId {
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);
            if node.is_leaf() {
                return current;
            }
            match self
                .tree
                .select_child(current, self.config.exploration_constant)
            {
                Some(child_id) => current = child_id,
                None => return current,
            }
        }
    }

    /// Add one child per legal action. Returns the number of children.
    ///
    /// A node without actions is marked terminal instead.
    fn expand(&mut self, node_id: NodeId) -> Result<usize, SearchError> {
        let node = self.tree.get(node_id);
        debug_assert!(!node.is_terminal, "terminal nodes are never expanded");
        let state = node.state.clone();
        let depth = node.depth + 1;

        let actions = self.world.actions(&state).map_err(SearchError::world)?;
        if actions.is_empty() {
            self.tree.get_mut(node_id).is_terminal = true;
            return Ok(0);
        }

        let others = self
            .world
            .others_actions(&state)
            .map_err(SearchError::world)?;

        let mut successors = Vec::with_capacity(actions.len());
        for action in &actions {
            let next = self
                .world
                .step(&state, action, &others)
                .map_err(SearchError::world)?;
            let terminal = self.is_terminal(depth, &next);
            successors.push((next, terminal));
        }

        let fast = self
            .evaluator
            .fast_rewards(&state, &actions)
            .map_err(SearchError::evaluator)?;
        if fast.len() != actions.len() {
            return Err(SearchError::RewardCountMismatch {
                expected: actions.len(),
                got: fast.len(),
            });
        }

        let children = successors
            .into_iter()
            .zip(fast)
            .map(|((next, terminal), f)| (next, terminal, f));
        Ok(self.tree.expand(node_id, actions, children).len())
    }

    /// Full reward of the transition into `node_id`, computed once.
    fn evaluate(&mut self, node_id: NodeId) -> Result<f64, SearchError> {
        let node = self.tree.get(node_id);
        if let Some(reward) = node.reward {
            return Ok(reward);
        }
        if node.is_root() {
            return Ok(0.0);
        }

        let parent = self.tree.get(node.parent);
        let reward = self
            .evaluator
            .reward(&parent.state, &parent.actions, node.index, &node.state)
            .map_err(SearchError::evaluator)?;

        self.tree.get_mut(node_id).reward = Some(reward);
        Ok(reward)
    }

    fn is_terminal(&self, depth: u32, state: &W::State) -> bool {
        depth >= self.config.depth_limit || self.world.is_terminal(state)
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree<W::State, W::Action> {
        &self.tree
    }

    pub fn into_tree(self) -> MctsTree<W::State, W::Action> {
        self.tree
    }
}

/// Convenience function to run a single MCTS search.
pub fn run_mcts<W: WorldModel, E: Evaluator<W>>(
    world: &W,
    evaluator: &E,
    config: MctsConfig,
    root_state: W::State,
) -> Result<SearchResult<W::Action>, SearchError> {
    MctsSearch::new(world, evaluator, config, root_state).run()
}
