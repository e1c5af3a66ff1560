use super::tree::DecisionTree;
use crate::data::DataFrame;
use crate::errors::TreeError;
use crate::node::Node;
use rayon::prelude::*;

impl DecisionTree {
    /// Predict a single row, laid out like the training rows.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node_idx = self.root_idx();
        loop {
            match &self.nodes[node_idx] {
                Node::Leaf(leaf) => return leaf.prediction,
                Node::Internal(split) => node_idx = split.get_child_idx(row[split.feature_index]),
            }
        }
    }

    fn predict_single_threaded(&self, data: &DataFrame) -> Vec<f64> {
        (0..data.length()).map(|i| self.predict_row(data.row(i))).collect()
    }

    fn predict_parallel(&self, data: &DataFrame) -> Vec<f64> {
        (0..data.length())
            .into_par_iter()
            .map(|i| self.predict_row(data.row(i)))
            .collect()
    }

    /// One prediction per row of `data`, in row order.
    ///
    /// * `data` - Rows with the same width as the training frame.
    /// * `parallel` - Predict rows on the global rayon pool.
    pub fn predict(&self, data: &DataFrame, parallel: bool) -> Result<Vec<f64>, TreeError> {
        if data.width() != self.n_cols {
            return Err(TreeError::DimensionMismatch {
                expected: self.n_cols,
                found: data.width(),
            });
        }
        if parallel {
            Ok(self.predict_parallel(data))
        } else {
            Ok(self.predict_single_threaded(data))
        }
    }
}
