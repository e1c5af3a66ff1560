use serde::{Deserialize, Serialize};
use std::fmt;

/// A terminal node holding the value predicted for every row that reaches it.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LeafNode {
    pub prediction: f64,
    /// Training rows that reached this leaf.
    pub n_obs: usize,
    pub impurity: f64,
}

/// A split on `feature_index`, rows with `value < threshold` go left.
///
/// Children are referenced by their position in the owning tree's node list.
/// Children are always stored before their parent, and each node has exactly
/// one parent, so the nodes form a single rooted hierarchy with no cycles.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct InternalNode {
    pub feature_index: usize,
    pub threshold: f64,
    pub gain: f64,
    pub n_obs: usize,
    pub impurity: f64,
    pub left_child: usize,
    pub right_child: usize,
}

impl InternalNode {
    /// Child a value is routed to. NaN never compares below the threshold, so it goes right.
    #[inline]
    pub fn get_child_idx(&self, v: f64) -> usize {
        if v < self.threshold {
            self.left_child
        } else {
            self.right_child
        }
    }
}

/// A node of a binary decision tree.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub enum Node {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl Node {
    pub fn leaf(prediction: f64, n_obs: usize, impurity: f64) -> Self {
        Node::Leaf(LeafNode {
            prediction,
            n_obs,
            impurity,
        })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn n_obs(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.n_obs,
            Node::Internal(node) => node.n_obs,
        }
    }

    pub fn impurity(&self) -> f64 {
        match self {
            Node::Leaf(leaf) => leaf.impurity,
            Node::Internal(node) => node.impurity,
        }
    }

    /// Ids of the two children, `None` for a leaf.
    pub fn children(&self) -> Option<(usize, usize)> {
        match self {
            Node::Leaf(_) => None,
            Node::Internal(node) => Some((node.left_child, node.right_child)),
        }
    }
}

impl fmt::Display for LeafNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "leaf={},n_obs={}", self.prediction, self.n_obs)
    }
}

impl fmt::Display for InternalNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} < {}] gain={},n_obs={}",
            self.feature_index, self.threshold, self.gain, self.n_obs
        )
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => write!(f, "{}", leaf),
            Node::Internal(node) => write!(f, "{}", node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split() -> InternalNode {
        InternalNode {
            feature_index: 1,
            threshold: 2.5,
            gain: 0.4,
            n_obs: 6,
            impurity: 0.6,
            left_child: 0,
            right_child: 1,
        }
    }

    #[test]
    fn test_get_child_idx() {
        let node = split();
        assert_eq!(node.get_child_idx(1.0), 0);
        assert_eq!(node.get_child_idx(2.5), 1);
        assert_eq!(node.get_child_idx(f64::NAN), 1);
        assert_eq!(node.get_child_idx(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_node_accessors() {
        let leaf = Node::leaf(3., 4, 0.);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.n_obs(), 4);
        assert_eq!(leaf.children(), None);
        let internal = Node::Internal(split());
        assert!(!internal.is_leaf());
        assert_eq!(internal.impurity(), 0.6);
        assert_eq!(internal.children(), Some((0, 1)));
    }

    #[test]
    fn test_node_display() {
        assert_eq!(format!("{}", Node::leaf(2., 3, 0.)), "leaf=2,n_obs=3");
        assert!(format!("{}", Node::Internal(split())).starts_with("[1 < 2.5]"));
    }
}
