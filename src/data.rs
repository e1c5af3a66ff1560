//! Data
//!
//! The tabular container consumed by tree construction and cross-validation.
use crate::errors::TreeError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which column of a [`DataFrame`] holds the label.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LabelColumn {
    /// The final column of every row.
    #[default]
    Last,
    /// An explicit column index.
    Index(usize),
}

/// A row major matrix of `f64` values that owns its data,
/// with one column designated as the label.
///
/// Every row has the same width, and the label column is fixed
/// when the frame is created. Feature indices refer to column
/// positions within a row, so they skip over the label column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    /// The raw data in row-major order.
    pub data: Vec<f64>,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns, label included.
    pub cols: usize,
    label_index: usize,
}

impl DataFrame {
    /// Create a new DataFrame from row-major values.
    ///
    /// * `data` - Values laid out row after row.
    /// * `rows` - Number of rows.
    /// * `cols` - Number of columns, including the label column.
    /// * `label` - The position of the label column.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize, label: LabelColumn) -> Result<Self, TreeError> {
        if cols == 0 {
            return Err(TreeError::InsufficientData(
                "a DataFrame needs at least a label column".to_string(),
            ));
        }
        if data.len() != rows * cols {
            return Err(TreeError::InsufficientData(format!(
                "{} values cannot fill {} rows of width {}",
                data.len(),
                rows,
                cols
            )));
        }
        let label_index = match label {
            LabelColumn::Last => cols - 1,
            LabelColumn::Index(j) if j < cols => j,
            LabelColumn::Index(j) => {
                return Err(TreeError::InvalidConfig(format!(
                    "label column {} is out of range for rows of width {}",
                    j, cols
                )))
            }
        };
        Ok(DataFrame {
            data,
            rows,
            cols,
            label_index,
        })
    }

    /// Create a DataFrame from a slice of rows, all of which must share one width.
    pub fn from_rows(rows: &[Vec<f64>], label: LabelColumn) -> Result<Self, TreeError> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(TreeError::DimensionMismatch {
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        DataFrame::new(data, rows.len(), cols, label)
    }

    /// Get a single reference to an item in the frame.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    /// Get a row of the data, label included.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Number of rows.
    pub fn length(&self) -> usize {
        self.rows
    }

    /// Number of columns, label included.
    pub fn width(&self) -> usize {
        self.cols
    }

    pub fn label_index(&self) -> usize {
        self.label_index
    }

    #[inline]
    pub fn label(&self, i: usize) -> f64 {
        self.get(i, self.label_index)
    }

    /// The label column, in row order.
    pub fn labels(&self) -> Vec<f64> {
        self.col(self.label_index)
    }

    /// Get an entire column as a vector.
    pub fn col(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, j)).collect()
    }

    /// Column indices of every feature, in ascending order.
    pub fn feature_indices(&self) -> Vec<usize> {
        (0..self.cols).filter(|&j| j != self.label_index).collect()
    }

    pub fn n_features(&self) -> usize {
        self.cols - 1
    }

    /// Copy the given rows, in the given order, into a new frame
    /// with the same width and label column.
    pub fn subset(&self, index: &[usize]) -> DataFrame {
        let mut data = Vec::with_capacity(index.len() * self.cols);
        for &i in index {
            data.extend_from_slice(self.row(i));
        }
        DataFrame {
            data,
            rows: index.len(),
            cols: self.cols,
            label_index: self.label_index,
        }
    }

    /// A permutation of all row indices, fully determined by `seed`.
    pub fn shuffled_index(&self, seed: u64) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut index: Vec<usize> = (0..self.rows).collect();
        index.shuffle(&mut rng);
        index
    }
}

impl fmt::Display for DataFrame {
    // This trait requires `fmt` with this exact signature.
    /// Format a DataFrame.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut val = String::new();
        for i in 0..self.rows {
            for j in 0..self.cols {
                val.push_str(self.get(i, j).to_string().as_str());
                if j == (self.cols - 1) {
                    val.push('\n');
                } else {
                    val.push(' ');
                }
            }
        }
        write!(f, "{}", val)
    }
}
