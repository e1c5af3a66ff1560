pub mod predict;
pub mod tree;

use crate::errors::TreeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// IO
pub trait TreeIO: Serialize + DeserializeOwned + Sized {
    /// Save a tree as a json object to a file.
    ///
    /// * `path` - Path to save the tree.
    fn save_tree<P: AsRef<Path>>(&self, path: P) -> Result<(), TreeError> {
        fs::write(path, self.json_dump()?).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Dump a tree as a json object
    fn json_dump(&self) -> Result<String, TreeError> {
        serde_json::to_string(self).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Load a tree from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, TreeError> {
        let model = serde_json::from_str::<Self>(json_str).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        model.check_loaded()?;
        Ok(model)
    }

    /// Load a tree from a path to a json tree object.
    ///
    /// * `path` - Path to load the tree from.
    fn load_tree<P: AsRef<Path>>(path: P) -> Result<Self, TreeError> {
        let json_str = fs::read_to_string(path).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }

    /// Reject a deserialized model that is not internally consistent.
    fn check_loaded(&self) -> Result<(), TreeError>;
}

impl TreeIO for tree::DecisionTree {
    fn check_loaded(&self) -> Result<(), TreeError> {
        self.validate_structure()
    }
}
