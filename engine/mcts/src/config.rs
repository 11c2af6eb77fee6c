//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of simulations to run per search.
    pub num_simulations: u32,

    /// Nodes at this depth or deeper are terminal. The root is depth 0,
    /// so a limit of 0 makes the root itself terminal.
    pub depth_limit: u32,

    /// Weight of the exploration term in the UCT score.
    /// 1.0 gives the plain `sqrt(ln N / n)` bonus.
    pub exploration_constant: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 10,
            depth_limit: 2,
            exploration_constant: 1.0,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 20,
            depth_limit: 2,
            exploration_constant: 1.0,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set depth limit.
    pub fn with_depth_limit(mut self, depth: u32) -> Self {
        self.depth_limit = depth;
        self
    }

    /// Builder pattern: set exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 10);
        assert_eq!(config.depth_limit, 2);
        assert!((config.exploration_constant - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_simulations(100)
            .with_depth_limit(3)
            .with_exploration(std::f64::consts::SQRT_2);

        assert_eq!(config.num_simulations, 100);
        assert_eq!(config.depth_limit, 3);
        assert!((config.exploration_constant - 1.414).abs() < 1e-3);
    }
}
