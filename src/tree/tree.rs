use crate::config::{ImportanceMethod, TreeConfig};
use crate::criterion::{Criterion, LabelStats, Targets};
use crate::data::DataFrame;
use crate::errors::TreeError;
use crate::node::{InternalNode, LeafNode, Node};
use crate::sampler::{AllFeatures, RandomFeatures, Sampler};
use crate::splitter::{MidpointSplitter, SplitInfo, Splitter};
use hashbrown::HashMap;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A fitted binary decision tree.
///
/// Nodes are stored children first, so the root is the last node.
/// The tree is grown once by [`DecisionTree::fit`] and is read only afterwards.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DecisionTree {
    pub config: TreeConfig,
    pub nodes: Vec<Node>,
    /// Width of the rows the tree was trained on, label included.
    pub n_cols: usize,
    pub label_index: usize,
}

impl DecisionTree {
    /// Grow a tree on every row of `data`.
    ///
    /// * `data` - Training rows, the label column is taken from the frame.
    /// * `config` - Tree configuration, validated before any work is done.
    pub fn fit(data: &DataFrame, config: TreeConfig) -> Result<Self, TreeError> {
        config.validate_parameters()?;
        if data.length() == 0 {
            return Err(TreeError::InsufficientData(
                "cannot fit a tree on an empty data frame".to_string(),
            ));
        }
        let targets = Targets::for_task(config.task, data.labels())?;
        let criterion = config.criterion();
        let splitter = MidpointSplitter::new(criterion, config.min_obs, config.max_prop);
        let sampler: Box<dyn Sampler> = match config.mtry {
            Some(mtry) => Box::new(RandomFeatures::new(mtry)),
            None => Box::new(AllFeatures),
        };
        let features = data.feature_indices();

        let mut builder = TreeBuilder {
            data,
            targets: &targets,
            criterion,
            splitter: &splitter,
            sampler: sampler.as_ref(),
            features: &features,
            config: &config,
            rng: StdRng::seed_from_u64(config.seed),
            n_leaves: 1,
        };
        let index: Vec<usize> = (0..data.length()).collect();
        let nodes = builder.grow(index).ok_or_else(|| {
            TreeError::InsufficientData("tree construction did not produce a root node".to_string())
        })?;

        let tree = DecisionTree {
            n_cols: data.width(),
            label_index: data.label_index(),
            config,
            nodes,
        };
        debug!(
            "Fitted {} tree on {} rows: size {}, height {}, leaves {}",
            tree.config.task,
            data.length(),
            tree.size(),
            tree.height(),
            tree.n_leaves()
        );
        Ok(tree)
    }

    /// Id of the root node.
    pub fn root_idx(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[self.root_idx()]
    }

    /// Total number of nodes, leaves and internal nodes alike.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf, the root being at depth 0.
    pub fn height(&self) -> usize {
        // Children come before their parent, one forward pass is enough.
        let mut heights = vec![0; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some((left, right)) = node.children() {
                heights[i] = 1 + heights[left].max(heights[right]);
            }
        }
        heights.last().copied().unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Leaves, left to right.
    pub fn leaves(&self) -> Vec<&LeafNode> {
        let mut leaves = Vec::new();
        self.walk(|node, _| {
            if let Node::Leaf(leaf) = node {
                leaves.push(leaf);
            }
        });
        leaves
    }

    /// Visit every internal node in depth first order, left subtree first.
    pub fn for_each_split<F>(&self, mut f: F)
    where
        F: FnMut(&InternalNode),
    {
        self.walk(|node, _| {
            if let Node::Internal(split) = node {
                f(split);
            }
        });
    }

    // Pre-order walk from the root with an explicit stack, passing each node's depth.
    fn walk<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a Node, usize),
    {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![(self.root_idx(), 0)];
        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            f(node, depth);
            if let Some((left, right)) = node.children() {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
    }

    /// Check that the nodes form a single tree rooted at the last node,
    /// and that every split reads a feature column of the training width.
    pub fn validate_structure(&self) -> Result<(), TreeError> {
        if self.nodes.is_empty() {
            return Err(TreeError::UnableToRead("tree has no nodes".to_string()));
        }
        let mut parents = vec![0usize; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Internal(split) = node {
                if split.left_child >= i || split.right_child >= i || split.left_child == split.right_child {
                    return Err(TreeError::UnableToRead(format!(
                        "node {} has invalid children {} and {}",
                        i, split.left_child, split.right_child
                    )));
                }
                if split.feature_index >= self.n_cols || split.feature_index == self.label_index {
                    return Err(TreeError::UnableToRead(format!(
                        "node {} splits on invalid column {}",
                        i, split.feature_index
                    )));
                }
                parents[split.left_child] += 1;
                parents[split.right_child] += 1;
            }
        }
        let root = self.root_idx();
        if parents[root] != 0 || parents[..root].iter().any(|&p| p != 1) {
            return Err(TreeError::UnableToRead(
                "nodes do not form a single rooted tree".to_string(),
            ));
        }
        Ok(())
    }

    /// Feature importance keyed by column index. Features the tree never
    /// splits on are absent from the map.
    pub fn feature_importance(&self, method: ImportanceMethod) -> HashMap<usize, f64> {
        let mut stats: HashMap<usize, (f64, usize)> = HashMap::new();
        self.for_each_split(|node: &InternalNode| {
            let v = match method {
                ImportanceMethod::Weight => 1.0,
                ImportanceMethod::Gain | ImportanceMethod::TotalGain => node.gain,
                ImportanceMethod::Cover => node.n_obs as f64,
            };
            let entry = stats.entry(node.feature_index).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        });
        let average = matches!(method, ImportanceMethod::Gain);
        stats
            .into_iter()
            .map(|(k, (v, c))| if average { (k, v / c as f64) } else { (k, v) })
            .collect()
    }
}

impl Display for DecisionTree {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut r = String::new();
        self.walk(|node, depth| {
            r.push_str(&format!("{}{}\n", "      ".repeat(depth), node));
        });
        write!(f, "{}", r)
    }
}

// Pending work while growing a tree. `Join` links the two most recently
// finished subtrees under a new internal node.
enum Step {
    Grow {
        index: Vec<usize>,
        depth: usize,
    },
    Join {
        split: SplitInfo,
        n_obs: usize,
        impurity: f64,
    },
}

// State for growing one tree. The generator and the leaf count are
// advanced in depth first order, left subtree first.
struct TreeBuilder<'a> {
    data: &'a DataFrame,
    targets: &'a Targets,
    criterion: Criterion,
    splitter: &'a MidpointSplitter,
    sampler: &'a dyn Sampler,
    features: &'a [usize],
    config: &'a TreeConfig,
    rng: StdRng,
    n_leaves: usize,
}

impl<'a> TreeBuilder<'a> {
    fn leaf(&self, stats: &LabelStats, impurity: f64) -> Node {
        Node::leaf(self.targets.prediction(stats), stats.n, impurity)
    }

    fn should_stop(&self, index: &[usize], depth: usize, impurity: f64) -> bool {
        if self.config.max_height.map_or(false, |h| depth >= h) {
            return true;
        }
        if index.len() <= self.config.min_obs {
            return true;
        }
        // A split turns one leaf into two.
        if self.config.max_leaves.map_or(false, |m| self.n_leaves >= m) {
            return true;
        }
        impurity <= 0.0 || self.targets.is_pure(index)
    }

    fn find_split(&mut self, index: &[usize], depth: usize, impurity: f64) -> Option<SplitInfo> {
        if self.should_stop(index, depth, impurity) {
            return None;
        }
        let features = self.sampler.sample(&mut self.rng, self.features);
        self.splitter.best_split(self.data, self.targets, index, &features)
    }

    // Grows the tree with an explicit work stack, so the depth of the tree
    // is bounded by memory rather than by the thread's stack.
    fn grow(&mut self, index: Vec<usize>) -> Option<Vec<Node>> {
        let mut nodes: Vec<Node> = Vec::new();
        // Ids of finished subtrees not yet linked to a parent.
        let mut finished: Vec<usize> = Vec::new();
        let mut steps = vec![Step::Grow { index, depth: 0 }];

        while let Some(step) = steps.pop() {
            match step {
                Step::Grow { index, depth } => {
                    let stats = self.targets.stats(&index);
                    let impurity = self.criterion.impurity(&stats);
                    match self.find_split(&index, depth, impurity) {
                        None => {
                            finished.push(nodes.len());
                            nodes.push(self.leaf(&stats, impurity));
                        }
                        Some(split) => {
                            self.n_leaves += 1;
                            let (left_index, right_index) = split.partition(self.data, &index);
                            steps.push(Step::Join {
                                split,
                                n_obs: index.len(),
                                impurity,
                            });
                            // Popped first, so the left subtree is grown first.
                            steps.push(Step::Grow {
                                index: right_index,
                                depth: depth + 1,
                            });
                            steps.push(Step::Grow {
                                index: left_index,
                                depth: depth + 1,
                            });
                        }
                    }
                }
                Step::Join { split, n_obs, impurity } => {
                    let right_child = finished.pop()?;
                    let left_child = finished.pop()?;
                    finished.push(nodes.len());
                    nodes.push(Node::Internal(InternalNode {
                        feature_index: split.feature,
                        threshold: split.threshold,
                        gain: split.gain,
                        n_obs,
                        impurity,
                        left_child,
                        right_child,
                    }));
                }
            }
        }
        Some(nodes)
    }
}
