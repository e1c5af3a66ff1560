//! Errors
//!
//! Custom error types used throughout the `treecv` crate.
use thiserror::Error;

/// Errors that can occur while building trees or cross-validating them.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A configuration value is out of range, or inconsistent with the task.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// The dataset cannot support the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    /// Row width does not match the width the tree was trained on.
    #[error("Expected rows of width {expected}, but rows of width {found} were provided.")]
    DimensionMismatch { expected: usize, found: usize },
    /// One or more fold tasks failed, reported once every fold has finished.
    #[error("{n_failed} of {n_folds} fold tasks failed, first failure in fold {fold}: {reason}")]
    FoldTaskFailure {
        n_failed: usize,
        n_folds: usize,
        fold: usize,
        reason: String,
    },
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}
