use crate::data::DataFrame;
use crate::errors::TreeError;
use serde::{Deserialize, Serialize};

/// One train/validation pair of a k-fold partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fold {
    pub train: DataFrame,
    pub validation: DataFrame,
    /// Rows of the source frame held out in this fold, in shuffled order.
    pub validation_index: Vec<usize>,
}

/// Sizes of `k` contiguous folds over `n` rows, the first `n % k` get one extra row.
pub fn fold_sizes(n: usize, k: usize) -> Vec<usize> {
    let base = n / k;
    let extra = n % k;
    (0..k).map(|i| if i < extra { base + 1 } else { base }).collect()
}

pub(crate) fn validate_folds(rows: usize, k: usize) -> Result<(), TreeError> {
    if k <= 1 {
        return Err(TreeError::InvalidConfig(format!(
            "k_folds must be greater than 1, but {} provided.",
            k
        )));
    }
    if rows < k {
        return Err(TreeError::InvalidConfig(format!(
            "{} rows cannot be split into {} folds.",
            rows, k
        )));
    }
    Ok(())
}

/// Shuffle the rows of `data` with `seed` and slice them into `k` folds.
///
/// Each fold validates on its own slice and trains on every other
/// slice, keeping the shuffled row order.
pub fn create_k_folds(data: &DataFrame, k: usize, seed: u64) -> Result<Vec<Fold>, TreeError> {
    validate_folds(data.length(), k)?;
    let shuffled = data.shuffled_index(seed);

    let mut bounds = Vec::with_capacity(k);
    let mut start = 0;
    for size in fold_sizes(shuffled.len(), k) {
        bounds.push((start, start + size));
        start += size;
    }

    let folds = bounds
        .iter()
        .map(|&(start, stop)| {
            let validation_index = shuffled[start..stop].to_vec();
            let train_index: Vec<usize> = shuffled[..start].iter().chain(&shuffled[stop..]).copied().collect();
            Fold {
                train: data.subset(&train_index),
                validation: data.subset(&validation_index),
                validation_index,
            }
        })
        .collect();
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LabelColumn;

    fn indexed_frame(n: usize) -> DataFrame {
        // Feature column holds the row id so folds can be traced back.
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, (i % 2) as f64]).collect();
        DataFrame::from_rows(&rows, LabelColumn::Last).unwrap()
    }

    #[test]
    fn test_fold_sizes() {
        assert_eq!(fold_sizes(100, 4), vec![25, 25, 25, 25]);
        assert_eq!(fold_sizes(10, 3), vec![4, 3, 3]);
        assert_eq!(fold_sizes(7, 7), vec![1; 7]);
    }

    #[test]
    fn test_create_k_folds() {
        let data = indexed_frame(100);
        let folds = create_k_folds(&data, 4, 42).unwrap();
        assert_eq!(folds.len(), 4);
        for fold in folds.iter() {
            assert_eq!(fold.validation.length(), 25);
            assert_eq!(fold.train.length(), 75);
            let ids: Vec<usize> = fold.validation.col(0).iter().map(|v| *v as usize).collect();
            assert_eq!(ids, fold.validation_index);
        }
        assert_eq!(folds, create_k_folds(&data, 4, 42).unwrap());
        assert_ne!(folds, create_k_folds(&data, 4, 43).unwrap());
    }

    #[test]
    fn test_folds_partition_rows() {
        let data = indexed_frame(23);
        let folds = create_k_folds(&data, 5, 3).unwrap();
        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.validation_index.clone()).collect();
        seen.sort();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
        for fold in folds.iter() {
            let mut all: Vec<usize> = fold.train.col(0).iter().map(|v| *v as usize).collect();
            assert!(all.iter().all(|i| !fold.validation_index.contains(i)));
            all.extend(fold.validation_index.iter());
            all.sort();
            assert_eq!(all, (0..23).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_train_keeps_shuffled_order() {
        let data = indexed_frame(12);
        let shuffled = data.shuffled_index(9);
        let folds = create_k_folds(&data, 3, 9).unwrap();
        let train: Vec<usize> = folds[1].train.col(0).iter().map(|v| *v as usize).collect();
        let expected: Vec<usize> = shuffled[..4].iter().chain(&shuffled[8..]).copied().collect();
        assert_eq!(train, expected);
    }

    #[test]
    fn test_invalid_folds() {
        let data = indexed_frame(3);
        assert!(matches!(create_k_folds(&data, 1, 0), Err(TreeError::InvalidConfig(_))));
        assert!(matches!(create_k_folds(&data, 4, 0), Err(TreeError::InvalidConfig(_))));
        assert!(create_k_folds(&data, 3, 0).is_ok());
    }
}
