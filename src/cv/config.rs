use crate::config::{Task, TreeConfig};
use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MIN_OBS};
use crate::criterion::Criterion;
use crate::metric::Metric;
use crate::utils::{fmt_vec_output, mean_std, parse_limit};
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_max_depth() -> Option<usize> {
    Some(DEFAULT_MAX_DEPTH)
}
fn default_min_obs() -> usize {
    DEFAULT_MIN_OBS
}

/// One candidate configuration evaluated by cross-validation.
///
/// Limits follow [`TreeConfig`]: `None` is unlimited, and negative
/// integers read from JSON are unlimited too.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterSet {
    #[serde(default = "default_max_depth", deserialize_with = "parse_limit")]
    pub max_depth: Option<usize>,
    #[serde(default = "default_min_obs")]
    pub min_obs: usize,
    /// `None` uses the task's default criterion.
    #[serde(default)]
    pub criterion: Option<Criterion>,
    #[serde(default, deserialize_with = "parse_limit")]
    pub max_leaves: Option<usize>,
    #[serde(default)]
    pub max_prop: Option<f64>,
    #[serde(default, deserialize_with = "parse_limit")]
    pub mtry: Option<usize>,
}

impl Default for HyperparameterSet {
    fn default() -> Self {
        HyperparameterSet {
            max_depth: default_max_depth(),
            min_obs: default_min_obs(),
            criterion: None,
            max_leaves: None,
            max_prop: None,
            mtry: None,
        }
    }
}

impl HyperparameterSet {
    /// * `max_depth` - Maximum tree height, `None` is unlimited.
    /// * `min_obs` - Nodes with this many rows or fewer become leaves.
    /// * `criterion` - Impurity criterion, `None` uses the task default.
    pub fn new(max_depth: Option<usize>, min_obs: usize, criterion: Option<Criterion>) -> Self {
        HyperparameterSet {
            max_depth,
            min_obs,
            criterion,
            ..Default::default()
        }
    }

    /// The tree configuration used to train one fold.
    pub fn to_tree_config(&self, task: Task, seed: u64) -> TreeConfig {
        TreeConfig::new(task)
            .set_criterion(self.criterion)
            .set_max_height(self.max_depth)
            .set_min_obs(self.min_obs)
            .set_max_leaves(self.max_leaves)
            .set_max_prop(self.max_prop)
            .set_mtry(self.mtry)
            .set_seed(seed)
    }

    pub fn set_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn set_min_obs(mut self, min_obs: usize) -> Self {
        self.min_obs = min_obs;
        self
    }

    pub fn set_criterion(mut self, criterion: Option<Criterion>) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn set_max_leaves(mut self, max_leaves: Option<usize>) -> Self {
        self.max_leaves = max_leaves;
        self
    }

    pub fn set_max_prop(mut self, max_prop: Option<f64>) -> Self {
        self.max_prop = max_prop;
        self
    }

    pub fn set_mtry(mut self, mtry: Option<usize>) -> Self {
        self.mtry = mtry;
        self
    }
}

impl fmt::Display for HyperparameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = |v: Option<usize>| v.map_or("unlimited".to_string(), |v| v.to_string());
        write!(
            f,
            "max_depth={}, min_obs={}, criterion={}, max_leaves={}, max_prop={}, mtry={}",
            limit(self.max_depth),
            self.min_obs,
            self.criterion.map_or("default".to_string(), |c| c.to_string()),
            limit(self.max_leaves),
            self.max_prop.map_or("unlimited".to_string(), |p| p.to_string()),
            limit(self.mtry)
        )
    }
}

/// Fold scores of one hyperparameter set.
///
/// Scores are in units of `metric`. Classification folds are scored with
/// accuracy by default, regression folds with R², so regression fold scores
/// are not accuracies unless a metric is set explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CVResult {
    pub params: HyperparameterSet,
    pub metric: Metric,
    /// One score per fold, in fold order.
    pub fold_scores: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation of the fold scores.
    pub std: f64,
    /// Wall clock time of the whole cross-validation call.
    pub cv_time_ms: f64,
}

impl CVResult {
    pub fn new(params: HyperparameterSet, metric: Metric, fold_scores: Vec<f64>, cv_time_ms: f64) -> Self {
        let (mean, std) = mean_std(&fold_scores);
        CVResult {
            params,
            metric,
            fold_scores,
            mean,
            std,
            cv_time_ms,
        }
    }
}

impl fmt::Display for CVResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mean={:.4} std={:.4} folds=[{}] time={:.1}ms ({})",
            self.metric,
            self.mean,
            self.std,
            fmt_vec_output(&self.fold_scores),
            self.cv_time_ms,
            self.params
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_tree_config() {
        let params = HyperparameterSet::new(Some(3), 2, Some(Criterion::Entropy)).set_mtry(Some(2));
        let cfg = params.to_tree_config(Task::Classification, 45);
        assert_eq!(cfg.max_height, Some(3));
        assert_eq!(cfg.min_obs, 2);
        assert_eq!(cfg.criterion(), Criterion::Entropy);
        assert_eq!(cfg.mtry, Some(2));
        assert_eq!(cfg.seed, 45);
        assert!(cfg.validate_parameters().is_ok());

        let cfg = HyperparameterSet::default().to_tree_config(Task::Regression, 0);
        assert_eq!(cfg.criterion(), Criterion::Variance);
    }

    #[test]
    fn test_params_from_json() {
        let json = r#"{"max_depth": -1, "min_obs": 4, "criterion": "Gini", "max_leaves": -1}"#;
        let params: HyperparameterSet = serde_json::from_str(json).unwrap();
        assert_eq!(params.max_depth, None);
        assert_eq!(params.max_leaves, None);
        assert_eq!(params.min_obs, 4);
        assert_eq!(params.criterion, Some(Criterion::Gini));
        let params: HyperparameterSet = serde_json::from_str("{}").unwrap();
        assert_eq!(params, HyperparameterSet::default());
    }

    #[test]
    fn test_cv_result() {
        let result = CVResult::new(HyperparameterSet::default(), Metric::Accuracy, vec![0.5, 1.0], 12.0);
        assert_eq!(result.mean, 0.75);
        assert_eq!(result.std, 0.25);
        let s = format!("{}", result);
        assert!(s.starts_with("Accuracy mean=0.7500 std=0.2500 folds=[0.5000, 1.0000] time=12.0ms"));

        let empty = CVResult::new(HyperparameterSet::default(), Metric::Accuracy, vec![], 0.0);
        assert_eq!((empty.mean, empty.std), (0.0, 0.0));
    }
}
