//! MCTS tree structure with arena allocation.
//!
//! Nodes live in a contiguous Vec and reference each other by NodeId, so
//! parent links never form ownership cycles. The tree is dropped with the
//! search that built it.

use std::cmp::Ordering;

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct MctsTree<S, A> {
    nodes: Vec<MctsNode<S, A>>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl<S, A> MctsTree<S, A> {
    pub fn new(root_state: S, root_terminal: bool) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_state, root_terminal)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<S, A> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<S, A> {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode<S, A>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in allocation order (root first, parents before children).
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MctsNode<S, A>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Record the actions of `parent_id`, one child per action, in order.
    ///
    /// `children` yields `(state, is_terminal, fast_reward)` aligned with
    /// `actions`. Returns the new child IDs.
    pub fn expand<I>(&mut self, parent_id: NodeId, actions: Vec<A>, children: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = (S, bool, f64)>,
    {
        let depth = self.get(parent_id).depth + 1;
        let ids: Vec<NodeId> = children
            .into_iter()
            .enumerate()
            .map(|(index, (state, is_terminal, fast))| {
                self.allocate(MctsNode::new_child(
                    parent_id,
                    index,
                    state,
                    depth,
                    is_terminal,
                    fast,
                ))
            })
            .collect();
        debug_assert_eq!(ids.len(), actions.len());

        let parent = self.get_mut(parent_id);
        parent.actions = actions;
        parent.children = ids.clone();
        ids
    }

    /// Select the child with the highest UCT score.
    /// Equal scores go to the lowest action index.
    pub fn select_child(&self, node_id: NodeId, c: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.visit_count;

        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &node.children {
            let score = self.get(child_id).uct_score(parent_visits, c);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Add `reward` to every node from `leaf_id` up to the root, inclusive.
    pub fn backpropagate(&mut self, leaf_id: NodeId, reward: f64) {
        let mut current_id = leaf_id;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.value_sum += reward;
            current_id = node.parent;
        }
    }

    /// Root child to play: most visits, then highest value sum, then lowest
    /// action index. None if the root has no children.
    pub fn best_child(&self) -> Option<NodeId> {
        let root = self.get(self.root);
        let mut best: Option<NodeId> = None;

        for &child_id in &root.children {
            let better = match best {
                None => true,
                Some(best_id) => {
                    let (child, incumbent) = (self.get(child_id), self.get(best_id));
                    match child.visit_count.cmp(&incumbent.visit_count) {
                        Ordering::Greater => true,
                        Ordering::Less => false,
                        Ordering::Equal => child.value_sum > incumbent.value_sum,
                    }
                }
            };
            if better {
                best = Some(child_id);
            }
        }
        best
    }

    /// Visit distribution over the root's actions, index-aligned.
    pub fn root_policy(&self) -> Vec<f64> {
        let root = self.get(self.root);
        let visits: Vec<f64> = root
            .children
            .iter()
            .map(|id| self.get(*id).visit_count as f64)
            .collect();

        let total: f64 = visits.iter().sum();
        if total > 0.0 {
            visits.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; visits.len()]
        }
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            expanded_nodes: self.nodes.iter().filter(|n| n.is_expanded()).count(),
            root_visits: root.visit_count,
            root_value: if root.visit_count == 0 {
                0.0
            } else {
                root.mean_value()
            },
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
        }
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub expanded_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_children() -> (MctsTree<&'static str, char>, NodeId, NodeId) {
        let mut tree = MctsTree::new("root", false);
        let ids = tree.expand(
            tree.root(),
            vec!['a', 'b'],
            vec![("after a", false, 0.5), ("after b", false, 0.5)],
        );
        (tree, ids[0], ids[1])
    }

    #[test]
    fn test_new_tree() {
        let tree: MctsTree<u32, u8> = MctsTree::new(7, false);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.state, 7);
    }

    #[test]
    fn test_expand() {
        let (tree, a, b) = two_children();

        assert_eq!(tree.len(), 3);
        let root = tree.get(tree.root());
        assert_eq!(root.actions, vec!['a', 'b']);
        assert_eq!(root.children, vec![a, b]);

        let child = tree.get(b);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.index, 1);
        assert_eq!(child.depth, 1);
        assert_eq!(child.state, "after b");
    }

    #[test]
    fn test_backpropagate_adds_same_reward() {
        let (mut tree, a, _) = two_children();
        let grandchild = tree.expand(a, vec!['x'], vec![("after x", true, 0.1)])[0];

        tree.backpropagate(grandchild, 1.25);

        for id in [grandchild, a, tree.root()] {
            assert_eq!(tree.get(id).visit_count, 1);
            assert!((tree.get(id).value_sum - 1.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_select_child_prefers_fast_reward_on_first_pass() {
        let mut tree = MctsTree::new("root", false);
        let ids = tree.expand(
            tree.root(),
            vec!['a', 'b'],
            vec![("a", false, 0.3), ("b", false, 0.7)],
        );
        assert_eq!(tree.select_child(tree.root(), 1.0), Some(ids[1]));
    }

    #[test]
    fn test_select_child_tie_goes_to_lowest_index() {
        let (tree, a, _) = two_children();
        assert_eq!(tree.select_child(tree.root(), 1.0), Some(a));
    }

    #[test]
    fn test_select_child_explores_unvisited() {
        let (mut tree, a, b) = two_children();
        tree.backpropagate(a, 1.0);
        tree.backpropagate(a, 1.0);

        // Root visited twice: a has Q=1 with bonus sqrt(ln 2 / 2),
        // b has Q=0.5 (fast) with bonus sqrt(ln 2).
        let a_score = 1.0 + ((2f64).ln() / 2.0).sqrt();
        let b_score = 0.5 + (2f64).ln().sqrt();
        let expected = if b_score > a_score { b } else { a };
        assert_eq!(tree.select_child(tree.root(), 1.0), Some(expected));
    }

    #[test]
    fn test_best_child_tie_breaks() {
        let (mut tree, a, b) = two_children();
        assert_eq!(tree.best_child(), Some(a));

        // Equal visits, higher value wins
        tree.backpropagate(a, 0.5);
        tree.backpropagate(b, 0.9);
        assert_eq!(tree.best_child(), Some(b));

        // More visits beats higher value
        tree.backpropagate(a, 0.0);
        assert_eq!(tree.best_child(), Some(a));
    }

    #[test]
    fn test_best_child_empty_root() {
        let tree: MctsTree<(), u8> = MctsTree::new((), false);
        assert_eq!(tree.best_child(), None);
    }

    #[test]
    fn test_root_policy() {
        let (mut tree, a, b) = two_children();
        assert_eq!(tree.root_policy(), vec![0.0, 0.0]);

        for _ in 0..3 {
            tree.backpropagate(a, 1.0);
        }
        tree.backpropagate(b, 1.0);

        let policy = tree.root_policy();
        assert!((policy[0] - 0.75).abs() < 1e-12);
        assert!((policy[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_tree_stats() {
        let (mut tree, a, _) = two_children();
        tree.backpropagate(a, 2.0);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.expanded_nodes, 1);
        assert_eq!(stats.root_visits, 1);
        assert!((stats.root_value - 2.0).abs() < 1e-12);
        assert_eq!(stats.max_depth, 1);
    }
}
