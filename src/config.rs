//! Tree Configuration
//!
//! Defines the task kinds and the configuration a [`DecisionTree`](crate::tree::DecisionTree)
//! is built under, along with the validation applied before any training work starts.
use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MIN_OBS, DEFAULT_SEED};
use crate::criterion::Criterion;
use crate::errors::TreeError;
use crate::utils::{items_to_strings, parse_limit, validate_float_parameter, validate_limit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of target being learned.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum Task {
    /// Leaves predict the majority class label.
    #[default]
    Classification,
    /// Leaves predict the mean label value.
    Regression,
}

impl FromStr for Task {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classification" => Ok(Task::Classification),
            "regression" => Ok(Task::Regression),
            _ => Err(TreeError::ParseString(
                s.to_string(),
                "Task".to_string(),
                items_to_strings(vec!["classification", "regression"]),
            )),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Classification => write!(f, "classification"),
            Task::Regression => write!(f, "regression"),
        }
    }
}

/// Method to calculate variable importance.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub enum ImportanceMethod {
    /// The number of times a feature is used to split the data.
    Weight,
    /// The average split gain across all splits the feature is used in.
    Gain,
    /// The total gain across all splits the feature is used in.
    TotalGain,
    /// The total number of training rows routed through splits on the feature.
    Cover,
}

fn default_criterion() -> Option<Criterion> {
    None
}
fn default_max_height() -> Option<usize> {
    Some(DEFAULT_MAX_DEPTH)
}
fn default_min_obs() -> usize {
    DEFAULT_MIN_OBS
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Configuration for growing a single [`DecisionTree`](crate::tree::DecisionTree).
///
/// Every limit is an `Option`, where `None` means unlimited. When read from
/// JSON, a negative integer is accepted for any limit and also means unlimited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Classification or regression.
    #[serde(default)]
    pub task: Task,
    /// Impurity criterion, defaults to the task's criterion when `None`.
    #[serde(default = "default_criterion")]
    pub criterion: Option<Criterion>,
    /// Number of features sampled as split candidates at each node.
    #[serde(default, deserialize_with = "parse_limit")]
    pub mtry: Option<usize>,
    /// Maximum depth of any leaf, the root being at depth 0.
    #[serde(default = "default_max_height", deserialize_with = "parse_limit")]
    pub max_height: Option<usize>,
    /// Maximum number of leaves in the tree.
    #[serde(default, deserialize_with = "parse_limit")]
    pub max_leaves: Option<usize>,
    /// Nodes holding this many rows or fewer become leaves, and no split
    /// may leave a child with fewer rows than this.
    #[serde(default = "default_min_obs")]
    pub min_obs: usize,
    /// Largest fraction of a node's rows that one child may receive.
    #[serde(default)]
    pub max_prop: Option<f64>,
    /// Seed for the feature sampling generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            task: Task::Classification,
            criterion: default_criterion(),
            mtry: None,
            max_height: default_max_height(),
            max_leaves: None,
            min_obs: default_min_obs(),
            max_prop: None,
            seed: default_seed(),
        }
    }
}

impl TreeConfig {
    /// Default configuration for `task`.
    pub fn new(task: Task) -> Self {
        TreeConfig {
            task,
            ..Default::default()
        }
    }

    /// The criterion in effect, after resolving the task default.
    pub fn criterion(&self) -> Criterion {
        self.criterion.unwrap_or_else(|| Criterion::default_for(self.task))
    }

    pub fn validate_parameters(&self) -> Result<(), TreeError> {
        let criterion = self.criterion();
        if !criterion.supports(self.task) {
            return Err(TreeError::InvalidConfig(format!(
                "criterion {} cannot be used for {}",
                criterion, self.task
            )));
        }
        validate_limit(self.mtry, "mtry")?;
        validate_limit(self.max_leaves, "max_leaves")?;
        if let Some(max_prop) = self.max_prop {
            validate_float_parameter(max_prop, f64::MIN_POSITIVE, 1.0, "max_prop")?;
        }
        Ok(())
    }

    // Set methods for parameters

    /// Set the task.
    pub fn set_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    /// Set the impurity criterion, `None` uses the task default.
    pub fn set_criterion(mut self, criterion: Option<Criterion>) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the number of features sampled at each node, `None` considers all.
    pub fn set_mtry(mut self, mtry: Option<usize>) -> Self {
        self.mtry = mtry;
        self
    }

    /// Set the maximum height, `None` is unlimited.
    pub fn set_max_height(mut self, max_height: Option<usize>) -> Self {
        self.max_height = max_height;
        self
    }

    /// Set the maximum number of leaves, `None` is unlimited.
    pub fn set_max_leaves(mut self, max_leaves: Option<usize>) -> Self {
        self.max_leaves = max_leaves;
        self
    }

    /// Set the minimum number of rows needed to keep a node splittable.
    pub fn set_min_obs(mut self, min_obs: usize) -> Self {
        self.min_obs = min_obs;
        self
    }

    /// Set the largest fraction of rows one child may receive, `None` is unlimited.
    pub fn set_max_prop(mut self, max_prop: Option<f64>) -> Self {
        self.max_prop = max_prop;
        self
    }

    /// Set the seed.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
