//! Depth-limited Monte Carlo Tree Search over an abstract world model.
//!
//! The search knows nothing about games or language models. It drives a
//! [`WorldModel`] (actions, others' move, transitions) and an [`Evaluator`]
//! (fast and full rewards), both supplied by the caller.
//!
//! # Overview
//!
//! Each simulation consists of four phases:
//!
//! 1. **Selection**: traverse the tree by UCT, `Q + c * sqrt(ln N / n)`.
//!    While a parent has been visited at most once its children are ranked
//!    by fast reward instead.
//! 2. **Expansion**: when reaching a non-terminal leaf, add one child per
//!    action, each scored with a fast reward
//! 3. **Evaluation**: compute the full reward of one fresh transition
//! 4. **Backpropagation**: add that reward to every node from the evaluated
//!    node up to the root
//!
//! After the budget is spent the root child with the most visits is played,
//! ties broken by higher value sum, then by lower action index.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{run_mcts, MctsConfig};
//!
//! let config = MctsConfig::default().with_simulations(10).with_depth_limit(2);
//! let result = run_mcts(&world, &evaluator, config, root_state)?;
//!
//! println!("Best action: {:?}", result.action);
//! println!("Policy: {:?}", result.policy);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      MctsSearch                      │
//! ├──────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌────────────┐  ┌────────────────┐  │
//! │  │  MctsTree  │  │ WorldModel │  │   Evaluator    │  │
//! │  │  (arena)   │  │ (dynamics) │  │   (rewards)    │  │
//! │  └─────┬──────┘  └─────┬──────┘  └───────┬────────┘  │
//! │        ▼               ▼                 ▼           │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │  select → expand → evaluate → backpropagate    │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod tree;
pub mod world;

// Re-export main types
pub use config::MctsConfig;
pub use evaluator::{ConstantEvaluator, Evaluator};
pub use node::{MctsNode, NodeId};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult};
pub use tree::{MctsTree, TreeStats};
pub use world::WorldModel;
