//! Quantized Inference Engine
//!
//! The model runtime as seen from an application: load a model by
//! identifier from a storage location, run it on named input tensors,
//! and read back the named output tensors the model owns.
//!
//! Two backends are provided:
//! - [`TractBackend`] runs ONNX graphs with tract-onnx
//! - [`MockBackend`] returns fixed scores, for development and tests

mod memory;
mod mock;
mod tract;

pub use memory::{FixedMemory, MemoryStats, SystemMemory};
pub use mock::{MockBackend, MockModel};
pub use tract::{TractBackend, TractModel};

pub use dl_tensor::TensorMap;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an inference backend
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Model '{identifier}' not found in {location}")]
    ModelNotFound {
        identifier: String,
        location: String,
    },
    #[error("Missing input tensor '{0}'")]
    MissingInput(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Where a model is stored on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelLocation {
    /// Dedicated model partition in flash
    #[default]
    FlashPartition,
    /// Removable SD card
    SdCard,
}

impl ModelLocation {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelLocation::FlashPartition => "flash_partition",
            ModelLocation::SdCard => "sd_card",
        }
    }
}

/// Host directories standing in for device storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Contents of the model flash partition
    pub partition_dir: PathBuf,
    /// Mount point of the SD card
    pub sdcard_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            partition_dir: PathBuf::from("partitions/model"),
            sdcard_dir: PathBuf::from("sdcard"),
        }
    }
}

impl StorageConfig {
    /// Directory backing a storage location
    pub fn root(&self, location: ModelLocation) -> &PathBuf {
        match location {
            ModelLocation::FlashPartition => &self.partition_dir,
            ModelLocation::SdCard => &self.sdcard_dir,
        }
    }

    /// Path of the model file `<root>/<identifier>.onnx`
    pub fn resolve(&self, identifier: &str, location: ModelLocation) -> PathBuf {
        self.root(location).join(format!("{}.onnx", identifier))
    }
}

/// A loaded model.
///
/// Dropping the handle releases the model and every output tensor it owns.
pub trait Model {
    /// Run the graph once on the named inputs
    fn run(&mut self, inputs: &TensorMap<'_>) -> Result<(), EngineError>;

    /// Outputs of the last run, borrowed from the model
    fn outputs(&self) -> TensorMap<'_>;

    /// Exponent the graph expects for a named input, if the model declares one
    fn input_exponent(&self, _name: &str) -> Option<i32> {
        None
    }
}

/// Loads models from device storage
pub trait InferenceBackend {
    type Model: Model;

    fn load_model(
        &self,
        identifier: &str,
        location: ModelLocation,
    ) -> Result<Self::Model, EngineError>;
}
