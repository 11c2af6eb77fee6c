//! MCTS tree node representation.
//!
//! Each node holds the state reached by taking an action from its parent.
//! Nodes store visit statistics used for UCT selection and the final pick.

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode<S, A> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Position of this node's action in the parent's action list
    pub index: usize,

    pub state: S,

    /// Transitions from the root. Root is 0.
    pub depth: u32,

    pub is_terminal: bool,

    /// Number of times a simulation passed through this node
    pub visit_count: u32,

    /// Sum of rewards backed up through this node.
    /// Q = value_sum / visit_count
    pub value_sum: f64,

    /// Cheap score assigned by the parent's expansion
    pub fast_reward: f64,

    /// Full reward of the transition into this node, once evaluated
    pub reward: Option<f64>,

    /// Actions available here. Filled on expansion; `children[i]` was
    /// produced by `actions[i]`.
    pub actions: Vec<A>,

    /// Empty until the node is expanded.
    pub children: Vec<NodeId>,
}

impl<S, A> MctsNode<S, A> {
    pub fn new_root(state: S, is_terminal: bool) -> Self {
        Self {
            parent: NodeId::NONE,
            index: 0,
            state,
            depth: 0,
            is_terminal,
            visit_count: 0,
            value_sum: 0.0,
            fast_reward: 0.0,
            reward: None,
            actions: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn new_child(
        parent: NodeId,
        index: usize,
        state: S,
        depth: u32,
        is_terminal: bool,
        fast_reward: f64,
    ) -> Self {
        Self {
            parent,
            index,
            state,
            depth,
            is_terminal,
            visit_count: 0,
            value_sum: 0.0,
            fast_reward,
            reward: None,
            actions: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Mean backed-up value. Falls back to the fast reward until visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            self.fast_reward
        } else {
            self.value_sum / self.visit_count as f64
        }
    }

    /// UCT score for child selection.
    /// UCT = Q + c * sqrt(ln N_parent / max(1, n))
    ///
    /// While the parent has been visited at most once, the exploration term
    /// carries no information and the fast reward is used as the score.
    #[inline]
    pub fn uct_score(&self, parent_visits: u32, c: f64) -> f64 {
        if parent_visits <= 1 {
            return self.fast_reward;
        }
        let n = self.visit_count.max(1) as f64;
        self.mean_value() + c * ((parent_visits as f64).ln() / n).sqrt()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Check if this is a leaf node (not expanded or terminal).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || !self.is_expanded()
    }
}
