use super::config::{CVResult, HyperparameterSet};
use super::fold::{create_k_folds, Fold};
use crate::config::Task;
use crate::constants::{DEFAULT_K_FOLDS, DEFAULT_SEED};
use crate::data::DataFrame;
use crate::errors::TreeError;
use crate::metric::{is_comparison_better, Metric};
use crate::tree::tree::DecisionTree;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// k-fold cross-validation of decision tree hyperparameters.
///
/// Folds are drawn once, from a shuffle seeded with `seed`, and reused by
/// every evaluation. Fold `i` trains its tree with seed `seed + i`, so scores
/// do not depend on the number of threads or the order folds finish in.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    folds: Vec<Fold>,
    k_folds: usize,
    seed: u64,
    task: Task,
    metric: Metric,
    num_threads: Option<usize>,
}

// Slot written by exactly one fold task.
type FoldSlot = Option<Result<f64, String>>;

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("fold task panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("fold task panicked: {}", s)
    } else {
        "fold task panicked".to_string()
    }
}

impl CrossValidator {
    /// Create a validator, drawing the folds immediately.
    ///
    /// * `data` - The full dataset, split into folds here.
    /// * `k_folds` - Number of folds, must be greater than 1 and no more than the number of rows.
    /// * `seed` - Seed for the row shuffle, and the base seed of every fold's tree.
    /// * `task` - Classification or regression.
    pub fn new(data: &DataFrame, k_folds: usize, seed: u64, task: Task) -> Result<Self, TreeError> {
        let folds = create_k_folds(data, k_folds, seed)?;
        Ok(CrossValidator {
            folds,
            k_folds,
            seed,
            task,
            metric: Metric::default_for(task),
            num_threads: None,
        })
    }

    /// A validator with 4 folds and seed 42.
    pub fn with_defaults(data: &DataFrame, task: Task) -> Result<Self, TreeError> {
        CrossValidator::new(data, DEFAULT_K_FOLDS, DEFAULT_SEED, task)
    }

    /// Set the number of threads used to train folds, `None` uses every available
    /// core. The pool never has more threads than folds.
    pub fn set_num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Set the metric folds are scored with.
    pub fn set_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn k_folds(&self) -> usize {
        self.k_folds
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn num_threads(&self) -> Option<usize> {
        self.num_threads
    }

    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    fn thread_pool(&self) -> Result<ThreadPool, TreeError> {
        let n_threads_available = std::thread::available_parallelism().map_or(1, |n| n.get());
        let num_threads = self.num_threads.unwrap_or(n_threads_available).clamp(1, self.k_folds);
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| TreeError::InvalidConfig(format!("unable to build thread pool: {}", e)))
    }

    // Train on one fold's training rows and score its validation rows.
    fn score_fold(&self, fold_idx: usize, params: &HyperparameterSet) -> Result<f64, TreeError> {
        let fold = &self.folds[fold_idx];
        let config = params.to_tree_config(self.task, self.seed.wrapping_add(fold_idx as u64));
        let tree = DecisionTree::fit(&fold.train, config)?;
        let yhat = tree.predict(&fold.validation, false)?;
        let score = self.metric.calculate(&fold.validation.labels(), &yhat);
        debug!(
            "Fold {} of {}: {} = {:.4}, tree size {}, height {}",
            fold_idx,
            self.k_folds,
            self.metric,
            score,
            tree.size(),
            tree.height()
        );
        Ok(score)
    }

    /// Score one hyperparameter set on every fold.
    ///
    /// Folds train in parallel. A fold that fails does not stop the others,
    /// the call fails with [`TreeError::FoldTaskFailure`] once all folds are done.
    pub fn validate_single_hyperparameter(&self, params: &HyperparameterSet) -> Result<CVResult, TreeError> {
        let start = Instant::now();
        params.to_tree_config(self.task, self.seed).validate_parameters()?;
        let pool = self.thread_pool()?;

        let mut slots: Vec<FoldSlot> = vec![None; self.k_folds];
        pool.install(|| {
            slots.par_iter_mut().enumerate().for_each(|(fold_idx, slot)| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.score_fold(fold_idx, params)));
                *slot = Some(match outcome {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(payload) => Err(panic_message(payload)),
                });
            });
        });

        let mut fold_scores = Vec::with_capacity(self.k_folds);
        let mut failures: Vec<(usize, String)> = Vec::new();
        for (fold_idx, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(score)) => fold_scores.push(score),
                Some(Err(reason)) => {
                    warn!("Fold {} of {} failed: {}", fold_idx, self.k_folds, reason);
                    failures.push((fold_idx, reason));
                }
                None => failures.push((fold_idx, "fold task did not run".to_string())),
            }
        }
        if let Some((fold, reason)) = failures.first() {
            return Err(TreeError::FoldTaskFailure {
                n_failed: failures.len(),
                n_folds: self.k_folds,
                fold: *fold,
                reason: reason.clone(),
            });
        }

        let result = CVResult::new(
            params.clone(),
            self.metric,
            fold_scores,
            start.elapsed().as_secs_f64() * 1000.0,
        );
        info!("{}-fold cross-validation: {}", self.k_folds, result);
        Ok(result)
    }

    /// Score the default hyperparameters with a given maximum depth.
    pub fn validate_depth(&self, max_depth: Option<usize>) -> Result<CVResult, TreeError> {
        self.validate_single_hyperparameter(&HyperparameterSet::default().set_max_depth(max_depth))
    }

    /// Score the default hyperparameters at each of the given depths, in order.
    pub fn validate_depths(&self, depths: &[Option<usize>]) -> Result<Vec<CVResult>, TreeError> {
        let grid: Vec<HyperparameterSet> = depths
            .iter()
            .map(|d| HyperparameterSet::default().set_max_depth(*d))
            .collect();
        self.grid_search_cv(&grid)
    }

    /// Score every hyperparameter set in `param_grid`, in order.
    /// Each set is cross-validated in parallel, the sets themselves one at a time.
    pub fn grid_search_cv(&self, param_grid: &[HyperparameterSet]) -> Result<Vec<CVResult>, TreeError> {
        param_grid
            .iter()
            .map(|params| self.validate_single_hyperparameter(params))
            .collect()
    }

    /// The parameters with the best mean score, the earliest result wins ties.
    /// `None` when `results` is empty.
    pub fn get_best_params(&self, results: &[CVResult]) -> Option<HyperparameterSet> {
        let mut best = results.first()?;
        for result in results.iter().skip(1) {
            if is_comparison_better(best.mean, result.mean, result.metric.maximize()) {
                best = result;
            }
        }
        info!(
            "Best hyperparameters found: {} with {} {:.4}",
            best.params, best.metric, best.mean
        );
        Some(best.params.clone())
    }
}
