// Modules
pub mod config;
pub mod constants;
pub mod criterion;
pub mod cv;
pub mod data;
pub mod errors;
pub mod metric;
pub mod node;
pub mod sampler;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use config::{ImportanceMethod, Task, TreeConfig};
pub use crate::criterion::Criterion;
pub use cv::{CVResult, CrossValidator, HyperparameterSet};
pub use data::{DataFrame, LabelColumn};
pub use errors::TreeError;
pub use metric::Metric;
pub use tree::tree::DecisionTree;
pub use tree::TreeIO;
