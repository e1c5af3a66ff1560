use crate::config::Task;
use crate::errors::TreeError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type MetricFn = fn(&[f64], &[f64]) -> f64;

/// Compare to metric values, determining if b is better.
/// If one of them is NaN favor the non NaN value.
/// If both are NaN, consider the first value to be better.
pub fn is_comparison_better(value: f64, comparison: f64, maximize: bool) -> bool {
    match (value.is_nan(), comparison.is_nan()) {
        // Both nan, comparison is not better,
        // Or comparison is nan, also not better
        (true, true) | (false, true) => false,
        // comparison is not Nan, it's better
        (true, false) => true,
        // Perform numerical comparison.
        (false, false) => {
            if maximize {
                value < comparison
            } else {
                value > comparison
            }
        }
    }
}

/// Score computed on each validation fold.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Fraction of rows predicted exactly.
    Accuracy,
    /// Coefficient of determination.
    RSquared,
    RootMeanSquaredError,
}

impl FromStr for Metric {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Accuracy" => Ok(Metric::Accuracy),
            "RSquared" => Ok(Metric::RSquared),
            "RootMeanSquaredError" => Ok(Metric::RootMeanSquaredError),
            _ => Err(TreeError::ParseString(
                s.to_string(),
                "Metric".to_string(),
                items_to_strings(vec!["Accuracy", "RSquared", "RootMeanSquaredError"]),
            )),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Accuracy => "Accuracy",
            Metric::RSquared => "RSquared",
            Metric::RootMeanSquaredError => "RootMeanSquaredError",
        };
        write!(f, "{name}")
    }
}

impl Metric {
    /// The metric cross-validation scores folds with when none is set.
    /// Accuracy for classification, R² for regression.
    pub fn default_for(task: Task) -> Self {
        match task {
            Task::Classification => Metric::Accuracy,
            Task::Regression => Metric::RSquared,
        }
    }

    pub fn maximize(&self) -> bool {
        match self {
            Metric::Accuracy | Metric::RSquared => true,
            Metric::RootMeanSquaredError => false,
        }
    }

    pub fn callable(&self) -> MetricFn {
        match self {
            Metric::Accuracy => accuracy,
            Metric::RSquared => r_squared,
            Metric::RootMeanSquaredError => root_mean_squared_error,
        }
    }

    pub fn calculate(&self, y: &[f64], yhat: &[f64]) -> f64 {
        (self.callable())(y, yhat)
    }
}

/// Fraction of predictions equal to the label, `0` when there are no rows.
pub fn accuracy(y: &[f64], yhat: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let correct = y.iter().zip(yhat).filter(|(y_, yhat_)| *y_ == *yhat_).count();
    correct as f64 / y.len() as f64
}

/// `1 - SS_res / SS_tot`. Constant labels score `1` when predicted exactly and `0` otherwise.
pub fn r_squared(y: &[f64], yhat: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let y_mean = y.iter().sum::<f64>() / y.len() as f64;
    let ss_tot: f64 = y.iter().map(|y_| (y_ - y_mean) * (y_ - y_mean)).sum();
    let ss_res: f64 = y.iter().zip(yhat).map(|(y_, yhat_)| (y_ - yhat_) * (y_ - yhat_)).sum();
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

pub fn root_mean_squared_error(y: &[f64], yhat: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let mse = y
        .iter()
        .zip(yhat)
        .map(|(y_, yhat_)| (y_ - yhat_) * (y_ - yhat_))
        .sum::<f64>()
        / y.len() as f64;
    mse.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::precision_round;

    #[test]
    fn test_accuracy() {
        let y = vec![0., 1., 1., 2.];
        let yhat = vec![0., 1., 2., 2.];
        assert_eq!(accuracy(&y, &yhat), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_r_squared() {
        let y = vec![1., 2., 3., 4.];
        assert_eq!(r_squared(&y, &y), 1.0);
        let mean = vec![2.5; 4];
        assert_eq!(r_squared(&y, &mean), 0.0);
        let yhat = vec![1.5, 2., 3., 3.5];
        assert_eq!(precision_round(r_squared(&y, &yhat), 4), 0.9);
        assert_eq!(r_squared(&[2., 2.], &[2., 2.]), 1.0);
        assert_eq!(r_squared(&[2., 2.], &[1., 2.]), 0.0);
    }

    #[test]
    fn test_root_mean_squared_error() {
        let y = vec![1., 2., 3., 4.];
        let yhat = vec![1., 2., 3., 6.];
        assert_eq!(root_mean_squared_error(&y, &yhat), 1.0);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("RSquared".parse::<Metric>().unwrap(), Metric::RSquared);
        assert!("AUC".parse::<Metric>().is_err());
        assert_eq!(Metric::default_for(Task::Classification), Metric::Accuracy);
        assert!(!Metric::RootMeanSquaredError.maximize());
    }

    #[test]
    fn test_is_comparison_better() {
        assert!(is_comparison_better(0.5, 0.6, true));
        assert!(!is_comparison_better(0.5, 0.5, true));
        assert!(is_comparison_better(0.5, 0.4, false));
        assert!(is_comparison_better(f64::NAN, 0.4, true));
        assert!(!is_comparison_better(0.4, f64::NAN, true));
    }
}
