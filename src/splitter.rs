//! Splitter
//!
//! Exhaustive search for the best `(feature, threshold)` split of a node.
use crate::constants::GAIN_EPSILON;
use crate::criterion::{gain, Criterion, Targets};
use crate::data::DataFrame;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The best split found for a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitInfo {
    pub feature: usize,
    pub threshold: f64,
    pub gain: f64,
    pub n_left: usize,
    pub n_right: usize,
}

impl SplitInfo {
    /// Route rows left when `value < threshold`, right otherwise.
    /// Relative row order is preserved on both sides.
    pub fn partition(&self, data: &DataFrame, index: &[usize]) -> (Vec<usize>, Vec<usize>) {
        let mut left = Vec::with_capacity(self.n_left);
        let mut right = Vec::with_capacity(self.n_right);
        for &i in index {
            if data.get(i, self.feature) < self.threshold {
                left.push(i);
            } else {
                right.push(i);
            }
        }
        (left, right)
    }
}

pub trait Splitter {
    /// Find the split with the largest positive gain over `index`, scanning
    /// `features` in the order given. `None` when no candidate improves on the parent.
    fn best_split(&self, data: &DataFrame, targets: &Targets, index: &[usize], features: &[usize])
        -> Option<SplitInfo>;
}

/// Scores every midpoint between consecutive distinct values of each feature.
pub struct MidpointSplitter {
    criterion: Criterion,
    min_child_obs: usize,
    max_prop: Option<f64>,
}

impl MidpointSplitter {
    pub fn new(criterion: Criterion, min_child_obs: usize, max_prop: Option<f64>) -> Self {
        MidpointSplitter {
            criterion,
            min_child_obs,
            max_prop,
        }
    }

    #[inline]
    fn admissible(&self, n_left: usize, n_right: usize) -> bool {
        if n_left == 0 || n_right == 0 || n_left < self.min_child_obs || n_right < self.min_child_obs {
            return false;
        }
        match self.max_prop {
            Some(max_prop) => {
                let n = (n_left + n_right) as f64;
                n_left as f64 / n <= max_prop && n_right as f64 / n <= max_prop
            }
            None => true,
        }
    }
}

impl Splitter for MidpointSplitter {
    fn best_split(
        &self,
        data: &DataFrame,
        targets: &Targets,
        index: &[usize],
        features: &[usize],
    ) -> Option<SplitInfo> {
        let n = index.len();
        if n < 2 {
            return None;
        }
        let parent = targets.stats(index);
        let parent_impurity = self.criterion.impurity(&parent);

        let mut best: Option<SplitInfo> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);
        for &feature in features {
            sorted.clear();
            sorted.extend(index.iter().map(|&i| (data.get(i, feature), i)));
            // Stable, so rows sharing a value keep their order.
            sorted.sort_by(|a, b| nan_last(a.0, b.0));

            let mut left = targets.empty_stats();
            let mut right = parent.clone();
            for k in 0..n - 1 {
                let (value, row) = sorted[k];
                left.add(targets, row);
                right.remove(targets, row);

                let next = sorted[k + 1].0;
                if value == next || next.is_nan() {
                    continue;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                if !self.admissible(n_left, n_right) {
                    continue;
                }
                let split_gain = gain(
                    parent_impurity,
                    n_left,
                    self.criterion.impurity(&left),
                    n_right,
                    self.criterion.impurity(&right),
                );
                if split_gain <= GAIN_EPSILON {
                    continue;
                }
                // Strictly greater, so the first candidate in scan order wins ties.
                if best.map_or(true, |b| split_gain > b.gain) {
                    best = Some(SplitInfo {
                        feature,
                        threshold: midpoint(value, next),
                        gain: split_gain,
                        n_left,
                        n_right,
                    });
                }
            }
        }
        best
    }
}

// Total order with every NaN after every number.
#[inline]
fn nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}

/// A threshold `t` with `a < t <= b`, the midpoint unless rounding pushes it onto `a`.
#[inline]
pub fn midpoint(a: f64, b: f64) -> f64 {
    let m = a + (b - a) / 2.0;
    if m > a && m <= b {
        m
    } else {
        b
    }
}

/// Midpoints between consecutive distinct sorted values, ascending.
pub fn candidate_thresholds(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.windows(2).map(|w| midpoint(w[0], w[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LabelColumn;

    fn frame(rows: &[Vec<f64>]) -> DataFrame {
        DataFrame::from_rows(rows, LabelColumn::Last).unwrap()
    }

    #[test]
    fn test_candidate_thresholds() {
        assert_eq!(candidate_thresholds(&[3., 1., 2., 2., 1.]), vec![1.5, 2.5]);
        assert!(candidate_thresholds(&[4., 4.]).is_empty());
        assert!(candidate_thresholds(&[]).is_empty());
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint(1.0, 2.0), 1.5);
        let a = 1.0_f64;
        let b = f64::from_bits(a.to_bits() + 1);
        assert_eq!(midpoint(a, b), b);
    }

    #[test]
    fn test_best_split_separable() {
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![(i % 3) as f64, i as f64, if i < 5 { 0. } else { 1. }])
            .collect();
        let data = frame(&rows);
        let targets = Targets::classification(data.labels()).unwrap();
        let index: Vec<usize> = (0..10).collect();
        let splitter = MidpointSplitter::new(Criterion::Gini, 1, None);
        let split = splitter
            .best_split(&data, &targets, &index, &data.feature_indices())
            .unwrap();
        assert_eq!(split.feature, 1);
        assert_eq!(split.threshold, 4.5);
        assert_eq!(split.gain, 0.5);
        assert_eq!((split.n_left, split.n_right), (5, 5));
        let (left, right) = split.partition(&data, &index);
        assert_eq!(left, vec![0, 1, 2, 3, 4]);
        assert_eq!(right, vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_ties_go_to_first_feature() {
        // Features 0 and 1 are identical, both separate perfectly.
        let rows: Vec<Vec<f64>> = (0..6)
            .map(|i| vec![i as f64, i as f64, if i < 3 { 0. } else { 1. }])
            .collect();
        let data = frame(&rows);
        let targets = Targets::classification(data.labels()).unwrap();
        let index: Vec<usize> = (0..6).collect();
        let splitter = MidpointSplitter::new(Criterion::Entropy, 1, None);
        let split = splitter.best_split(&data, &targets, &index, &[0, 1]).unwrap();
        assert_eq!(split.feature, 0);
        let split = splitter.best_split(&data, &targets, &index, &[1, 0]).unwrap();
        assert_eq!(split.feature, 1);
    }

    #[test]
    fn test_no_improving_split() {
        // Labels alternate, and the only feature is constant.
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![1.0, (i % 2) as f64]).collect();
        let data = frame(&rows);
        let targets = Targets::classification(data.labels()).unwrap();
        let index: Vec<usize> = (0..6).collect();
        let splitter = MidpointSplitter::new(Criterion::Gini, 1, None);
        assert!(splitter.best_split(&data, &targets, &index, &[0]).is_none());
        assert!(splitter.best_split(&data, &targets, &[0], &[0]).is_none());
    }

    #[test]
    fn test_max_prop_excludes_lopsided_splits() {
        // The best split isolates the single outlier row.
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![i as f64, if i == 9 { 1. } else { 0. }])
            .collect();
        let data = frame(&rows);
        let targets = Targets::classification(data.labels()).unwrap();
        let index: Vec<usize> = (0..10).collect();
        let unrestricted = MidpointSplitter::new(Criterion::Gini, 1, None)
            .best_split(&data, &targets, &index, &[0])
            .unwrap();
        assert_eq!(unrestricted.n_left, 9);
        let restricted = MidpointSplitter::new(Criterion::Gini, 1, Some(0.7))
            .best_split(&data, &targets, &index, &[0])
            .unwrap();
        assert!(restricted.n_left <= 7 && restricted.n_right <= 7);
    }

    #[test]
    fn test_min_child_obs() {
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![i as f64, if i == 9 { 1. } else { 0. }])
            .collect();
        let data = frame(&rows);
        let targets = Targets::classification(data.labels()).unwrap();
        let index: Vec<usize> = (0..10).collect();
        let split = MidpointSplitter::new(Criterion::Gini, 3, None)
            .best_split(&data, &targets, &index, &[0])
            .unwrap();
        assert!(split.n_left >= 3 && split.n_right >= 3);
    }

    #[test]
    fn test_regression_split() {
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|i| vec![i as f64, if i < 4 { 1.0 } else { 10.0 }])
            .collect();
        let data = frame(&rows);
        let targets = Targets::regression(data.labels()).unwrap();
        let index: Vec<usize> = (0..8).collect();
        let split = MidpointSplitter::new(Criterion::Variance, 1, None)
            .best_split(&data, &targets, &index, &[0])
            .unwrap();
        assert_eq!(split.threshold, 3.5);
        assert_eq!(split.gain, 20.25);
    }

    #[test]
    fn test_nan_values_route_right() {
        let rows = vec![
            vec![1.0, 0.],
            vec![2.0, 0.],
            vec![f64::NAN, 1.],
            vec![5.0, 1.],
        ];
        let data = frame(&rows);
        let targets = Targets::classification(data.labels()).unwrap();
        let index: Vec<usize> = (0..4).collect();
        let split = MidpointSplitter::new(Criterion::Gini, 1, None)
            .best_split(&data, &targets, &index, &[0])
            .unwrap();
        let (left, right) = split.partition(&data, &index);
        assert_eq!(left.len(), split.n_left);
        assert_eq!(right, vec![2, 3]);
    }
}
