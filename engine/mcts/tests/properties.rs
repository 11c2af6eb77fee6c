//! Property-based tests for the search.
//!
//! The world is a synthetic tree whose shape and scores are pseudo-random
//! functions of `(seed, path)`, so every case is reproducible.

use mcts::{Evaluator, MctsConfig, MctsSearch, WorldModel};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::convert::Infallible;
use std::hash::{Hash, Hasher};

type Path = Vec<u8>;

fn rng_for(seed: u64, path: &[u8], salt: &str) -> ChaCha8Rng {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    path.hash(&mut hasher);
    salt.hash(&mut hasher);
    ChaCha8Rng::seed_from_u64(hasher.finish())
}

/// Synthetic world: 1..=max_branching actions per state.
struct RandomTree {
    seed: u64,
    max_branching: u8,
    expanded_depths: RefCell<Vec<usize>>,
}

impl RandomTree {
    fn new(seed: u64, max_branching: u8) -> Self {
        Self {
            seed,
            max_branching,
            expanded_depths: RefCell::new(Vec::new()),
        }
    }
}

impl WorldModel for RandomTree {
    type State = Path;
    type Action = u8;
    type Others = u8;
    type Error = Infallible;

    fn actions(&self, state: &Path) -> Result<Vec<u8>, Infallible> {
        self.expanded_depths.borrow_mut().push(state.len());
        let n = rng_for(self.seed, state, "branching").gen_range(1..=self.max_branching);
        Ok((0..n).collect())
    }

    fn others_actions(&self, state: &Path) -> Result<u8, Infallible> {
        Ok(rng_for(self.seed, state, "others").gen())
    }

    fn step(&self, state: &Path, action: &u8, others: &u8) -> Result<Path, Infallible> {
        let mut next = state.clone();
        next.push(action.wrapping_add(*others));
        Ok(next)
    }
}

/// Scores in the shape the planner uses: intuition is a distribution over
/// actions, self-evaluation and win probability lie in [0, 1].
struct RandomScores {
    seed: u64,
}

impl RandomScores {
    fn intuitions(&self, state: &Path, n: usize) -> Vec<f64> {
        let mut rng = rng_for(self.seed, state, "intuition");
        let weights: Vec<f64> = (0..n).map(|_| rng.gen_range(0.01..1.0)).collect();
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }

    fn self_eval(&self, state: &Path, action: u8) -> f64 {
        let mut path = state.clone();
        path.push(action);
        rng_for(self.seed, &path, "self_eval").gen_range(0.0..=1.0)
    }

    fn win_probability(&self, state: &Path) -> f64 {
        rng_for(self.seed, state, "win").gen_range(0.0..=1.0)
    }
}

impl Evaluator<RandomTree> for RandomScores {
    type Error = Infallible;

    fn fast_rewards(&self, state: &Path, actions: &[u8]) -> Result<Vec<f64>, Infallible> {
        let intuitions = self.intuitions(state, actions.len());
        Ok(actions
            .iter()
            .zip(intuitions)
            .map(|(a, i)| i + self.self_eval(state, *a))
            .collect())
    }

    fn reward(&self, state: &Path, actions: &[u8], index: usize, next: &Path) -> Result<f64, Infallible> {
        let i = self.intuitions(state, actions.len())[index];
        let s = self.self_eval(state, actions[index]);
        let w = self.win_probability(next);
        Ok(i + s + (2.0 * w - 1.0))
    }
}

/// Same number of actions everywhere.
struct FixedBranching(u8);

impl WorldModel for FixedBranching {
    type State = Path;
    type Action = u8;
    type Others = ();
    type Error = Infallible;

    fn actions(&self, _state: &Path) -> Result<Vec<u8>, Infallible> {
        Ok((0..self.0).collect())
    }

    fn others_actions(&self, _state: &Path) -> Result<(), Infallible> {
        Ok(())
    }

    fn step(&self, state: &Path, action: &u8, _others: &()) -> Result<Path, Infallible> {
        let mut next = state.clone();
        next.push(*action);
        Ok(next)
    }
}

/// Uniform intuition, certain "yes" on every yes/no question.
struct AlwaysYes;

impl Evaluator<FixedBranching> for AlwaysYes {
    type Error = Infallible;

    fn fast_rewards(&self, _state: &Path, actions: &[u8]) -> Result<Vec<f64>, Infallible> {
        let i = 1.0 / actions.len() as f64;
        Ok(vec![i + 1.0; actions.len()])
    }

    fn reward(&self, _state: &Path, actions: &[u8], _index: usize, _next: &Path) -> Result<f64, Infallible> {
        let i = 1.0 / actions.len() as f64;
        Ok(i + 1.0 + (2.0 * 1.0 - 1.0))
    }
}

fn arb_config() -> impl Strategy<Value = MctsConfig> {
    (1u32..60, 1u32..4, 0.0f64..2.0).prop_map(|(sims, depth, c)| {
        MctsConfig::default()
            .with_simulations(sims)
            .with_depth_limit(depth)
            .with_exploration(c)
    })
}

proptest! {
    /// Visits never go negative and backed-up value stays inside the reward range.
    #[test]
    fn prop_values_bounded_by_visits(
        seed in any::<u64>(),
        branching in 1u8..5,
        config in arb_config(),
    ) {
        let world = RandomTree::new(seed, branching);
        let scores = RandomScores { seed };
        let mut search = MctsSearch::new(&world, &scores, config, Vec::new());
        search.run().unwrap();

        for (_, node) in search.tree().iter() {
            let visits = node.visit_count as f64;
            prop_assert!(
                node.value_sum <= 3.0 * visits + 1e-9,
                "value {} exceeds 3 * visits {}",
                node.value_sum,
                visits
            );
            prop_assert!(
                node.value_sum >= -visits - 1e-9,
                "value {} below -visits {}",
                node.value_sum,
                visits
            );
        }
    }

    /// Nodes at or past the depth limit are terminal and never expanded.
    #[test]
    fn prop_depth_limit_respected(
        seed in any::<u64>(),
        branching in 1u8..5,
        config in arb_config(),
    ) {
        let depth_limit = config.depth_limit;
        let world = RandomTree::new(seed, branching);
        let scores = RandomScores { seed };
        let mut search = MctsSearch::new(&world, &scores, config, Vec::new());
        search.run().unwrap();

        for depth in world.expanded_depths.borrow().iter() {
            prop_assert!((*depth as u32) < depth_limit);
        }
        for (_, node) in search.tree().iter() {
            prop_assert!(node.depth <= depth_limit);
            if node.depth >= depth_limit {
                prop_assert!(node.is_terminal);
                prop_assert!(node.children.is_empty());
            }
        }
    }

    /// With uniform intuition and certain "yes" answers every action scores
    /// the same, so the lowest index is played.
    #[test]
    fn prop_equal_scores_pick_lowest_index(
        branching in 1u8..6,
        config in arb_config(),
    ) {
        let world = FixedBranching(branching);
        let result = mcts::run_mcts(&world, &AlwaysYes, config, Vec::new()).unwrap();

        prop_assert_eq!(result.index, 0);
        prop_assert_eq!(result.action, 0);
        for pair in result.policy.windows(2) {
            prop_assert!(pair[0] >= pair[1], "visits increase with index: {:?}", result.policy);
        }
    }

    /// Identical inputs give identical searches.
    #[test]
    fn prop_deterministic(
        seed in any::<u64>(),
        branching in 1u8..5,
        config in arb_config(),
    ) {
        let scores = RandomScores { seed };
        let a = mcts::run_mcts(&RandomTree::new(seed, branching), &scores, config.clone(), Vec::new()).unwrap();
        let b = mcts::run_mcts(&RandomTree::new(seed, branching), &scores, config, Vec::new()).unwrap();

        prop_assert_eq!(a.index, b.index);
        prop_assert_eq!(a.policy, b.policy);
        prop_assert_eq!(a.simulations, b.simulations);
    }
}

#[test]
fn test_every_simulation_reaches_the_root() {
    let world = RandomTree::new(3, 3);
    let scores = RandomScores { seed: 3 };
    let config = MctsConfig::default().with_simulations(25);

    let result = mcts::run_mcts(&world, &scores, config, Vec::new()).unwrap();
    assert_eq!(result.simulations, 25);
    assert_eq!(result.stats.root_visits, 25);
}
