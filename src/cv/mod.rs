// public modules
pub mod config;
pub mod fold;
pub mod validator;

pub use config::{CVResult, HyperparameterSet};
pub use fold::{create_k_folds, Fold};
pub use validator::CrossValidator;
