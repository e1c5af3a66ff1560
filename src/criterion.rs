//! Criterion
//!
//! Impurity measures over the labels that reach a node, and the
//! gain of a split measured with them.
use crate::config::Task;
use crate::errors::TreeError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Impurity criterion used to score candidate splits.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// `1 - sum(p_c^2)` over class proportions.
    Gini,
    /// `-sum(p_c * log2(p_c))` over class proportions.
    Entropy,
    /// Variance of the label values, for regression.
    Variance,
}

impl FromStr for Criterion {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gini" | "gini_impurity" => Ok(Criterion::Gini),
            "entropy" => Ok(Criterion::Entropy),
            "variance" | "mse" | "mean_squared_error" => Ok(Criterion::Variance),
            _ => Err(TreeError::ParseString(
                s.to_string(),
                "Criterion".to_string(),
                items_to_strings(vec!["gini_impurity", "entropy", "variance"]),
            )),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Criterion::Gini => "gini_impurity",
            Criterion::Entropy => "entropy",
            Criterion::Variance => "variance",
        };
        write!(f, "{name}")
    }
}

impl Criterion {
    /// The criterion used when none is given for a task.
    pub fn default_for(task: Task) -> Self {
        match task {
            Task::Classification => Criterion::Gini,
            Task::Regression => Criterion::Variance,
        }
    }

    /// Whether this criterion can score splits for `task`.
    pub fn supports(&self, task: Task) -> bool {
        match self {
            Criterion::Gini | Criterion::Entropy => task == Task::Classification,
            Criterion::Variance => task == Task::Regression,
        }
    }

    /// Impurity of the label distribution summarised by `stats`.
    /// An empty distribution has impurity `0`.
    #[inline]
    pub fn impurity(&self, stats: &LabelStats) -> f64 {
        if stats.n == 0 {
            return 0.0;
        }
        match self {
            Criterion::Gini => gini_impurity(&stats.counts, stats.n),
            Criterion::Entropy => entropy(&stats.counts, stats.n),
            Criterion::Variance => variance(stats.n, stats.sum, stats.sum_sq),
        }
    }

    /// Impurity of a plain multiset of labels.
    pub fn impurity_of_labels(&self, labels: &[f64]) -> Result<f64, TreeError> {
        let targets = match self {
            Criterion::Variance => Targets::regression(labels.to_vec())?,
            _ => Targets::classification(labels.to_vec())?,
        };
        let index: Vec<usize> = (0..labels.len()).collect();
        Ok(self.impurity(&targets.stats(&index)))
    }
}

pub fn gini_impurity(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let total = n as f64;
    let correct = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>();
    (1.0 - correct).max(0.0)
}

pub fn entropy(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let total = n as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>()
}

pub fn variance(n: usize, sum: f64, sum_sq: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let total = n as f64;
    let mean = sum / total;
    (sum_sq / total - mean * mean).max(0.0)
}

/// Parent impurity minus the row-count weighted impurity of the two children.
#[inline]
pub fn gain(parent_impurity: f64, n_left: usize, left_impurity: f64, n_right: usize, right_impurity: f64) -> f64 {
    let n = n_left + n_right;
    if n == 0 {
        return 0.0;
    }
    let total = n as f64;
    parent_impurity - ((n_left as f64 / total) * left_impurity + (n_right as f64 / total) * right_impurity)
}

/// Training labels prepared for one tree.
///
/// For classification every row also carries a dense class id,
/// ids are assigned in ascending label order.
#[derive(Debug, Clone)]
pub struct Targets {
    values: Vec<f64>,
    class_ids: Vec<usize>,
    classes: Vec<f64>,
}

// Treat -0.0 and 0.0 as the same class.
#[inline]
fn canonical(v: f64) -> f64 {
    v + 0.0
}

impl Targets {
    pub fn classification(labels: Vec<f64>) -> Result<Self, TreeError> {
        if labels.iter().any(|v| v.is_nan()) {
            return Err(TreeError::InsufficientData(
                "classification labels must not be NaN".to_string(),
            ));
        }
        let mut classes: Vec<f64> = labels.iter().map(|&v| canonical(v)).collect();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();
        let class_ids = labels
            .iter()
            .map(|&v| {
                classes
                    .binary_search_by(|c| c.total_cmp(&canonical(v)))
                    .map_err(|_| TreeError::InsufficientData(format!("label {} could not be encoded", v)))
            })
            .collect::<Result<Vec<usize>, TreeError>>()?;
        Ok(Targets {
            values: labels,
            class_ids,
            classes,
        })
    }

    pub fn regression(labels: Vec<f64>) -> Result<Self, TreeError> {
        if let Some(v) = labels.iter().find(|v| !v.is_finite()) {
            return Err(TreeError::InsufficientData(format!(
                "regression labels must be finite, found {}",
                v
            )));
        }
        Ok(Targets {
            values: labels,
            class_ids: Vec::new(),
            classes: Vec::new(),
        })
    }

    pub fn for_task(task: Task, labels: Vec<f64>) -> Result<Self, TreeError> {
        match task {
            Task::Classification => Targets::classification(labels),
            Task::Regression => Targets::regression(labels),
        }
    }

    pub fn is_classification(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Distinct class labels in ascending order, empty for regression.
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    #[inline]
    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }

    pub fn empty_stats(&self) -> LabelStats {
        LabelStats {
            n: 0,
            sum: 0.0,
            sum_sq: 0.0,
            counts: vec![0; self.classes.len()],
        }
    }

    pub fn stats(&self, index: &[usize]) -> LabelStats {
        let mut stats = self.empty_stats();
        for &i in index {
            stats.add(self, i);
        }
        stats
    }

    /// True when every row in `index` carries the same label.
    pub fn is_pure(&self, index: &[usize]) -> bool {
        match index.split_first() {
            None => true,
            Some((&first, rest)) => {
                if self.is_classification() {
                    rest.iter().all(|&i| self.class_ids[i] == self.class_ids[first])
                } else {
                    rest.iter().all(|&i| self.values[i] == self.values[first])
                }
            }
        }
    }

    /// Majority class (smallest label on ties) for classification,
    /// mean label for regression.
    pub fn prediction(&self, stats: &LabelStats) -> f64 {
        if self.is_classification() {
            let mut best = 0;
            for (class, &count) in stats.counts.iter().enumerate() {
                if count > stats.counts[best] {
                    best = class;
                }
            }
            self.classes[best]
        } else if stats.n == 0 {
            0.0
        } else {
            stats.sum / stats.n as f64
        }
    }
}

/// Running summary of the labels of a set of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStats {
    pub n: usize,
    pub sum: f64,
    pub sum_sq: f64,
    /// Rows per class id, empty for regression.
    pub counts: Vec<usize>,
}

impl LabelStats {
    #[inline]
    pub fn add(&mut self, targets: &Targets, i: usize) {
        let v = targets.values[i];
        self.n += 1;
        self.sum += v;
        self.sum_sq += v * v;
        if let Some(&c) = targets.class_ids.get(i) {
            self.counts[c] += 1;
        }
    }

    #[inline]
    pub fn remove(&mut self, targets: &Targets, i: usize) {
        let v = targets.values[i];
        self.n -= 1;
        self.sum -= v;
        self.sum_sq -= v * v;
        if let Some(&c) = targets.class_ids.get(i) {
            self.counts[c] -= 1;
        }
    }
}
