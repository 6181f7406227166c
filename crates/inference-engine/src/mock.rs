//! Mock backend with fixed output scores

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dl_tensor::{MemoryRegion, Shape, TensorDescriptor, TensorMap};
use tracing::{debug, info};

use crate::{EngineError, InferenceBackend, Model, ModelLocation};

/// Name of the single output produced by the mock model
pub const MOCK_OUTPUT_NAME: &str = "output";

/// Backend whose models always produce the same quantized scores
#[derive(Debug, Clone)]
pub struct MockBackend {
    input_name: String,
    scores: Option<Vec<i8>>,
    output_exponent: i32,
    input_exponent: Option<i32>,
    load_error: Option<String>,
    released: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Models will output `scores` as a 1×N int8 tensor with `exponent`
    pub fn new(scores: Vec<i8>, exponent: i32) -> Self {
        info!("Creating mock inference backend");
        Self {
            input_name: "input".to_string(),
            scores: Some(scores),
            output_exponent: exponent,
            input_exponent: None,
            load_error: None,
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Models run successfully but produce no outputs
    pub fn empty_output() -> Self {
        Self {
            scores: None,
            ..Self::new(Vec::new(), 0)
        }
    }

    /// Every load attempt fails with `reason`
    pub fn failing(reason: &str) -> Self {
        Self {
            load_error: Some(reason.to_string()),
            ..Self::new(Vec::new(), 0)
        }
    }

    /// Name of the input the model graph declares
    pub fn with_input_name(mut self, name: &str) -> Self {
        self.input_name = name.to_string();
        self
    }

    /// Declare the exponent the model expects on its input
    pub fn with_input_exponent(mut self, exponent: i32) -> Self {
        self.input_exponent = Some(exponent);
        self
    }

    /// Number of models from this backend that have been dropped
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl InferenceBackend for MockBackend {
    type Model = MockModel;

    fn load_model(
        &self,
        identifier: &str,
        location: ModelLocation,
    ) -> Result<MockModel, EngineError> {
        if let Some(reason) = &self.load_error {
            return Err(EngineError::ModelLoadError(reason.clone()));
        }

        debug!("Mock mode: loading '{}' from {}", identifier, location.as_str());
        Ok(MockModel {
            input_name: self.input_name.clone(),
            scores: self.scores.clone(),
            output_exponent: self.output_exponent,
            input_exponent: self.input_exponent,
            outputs: BTreeMap::new(),
            runs: 0,
            released: Arc::clone(&self.released),
        })
    }
}

/// Model handle issued by [`MockBackend`]
#[derive(Debug)]
pub struct MockModel {
    input_name: String,
    scores: Option<Vec<i8>>,
    output_exponent: i32,
    input_exponent: Option<i32>,
    outputs: BTreeMap<String, TensorDescriptor<'static>>,
    runs: usize,
    released: Arc<AtomicUsize>,
}

impl MockModel {
    /// Number of completed runs
    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl Model for MockModel {
    fn run(&mut self, inputs: &TensorMap<'_>) -> Result<(), EngineError> {
        if !inputs.contains_key(&self.input_name) {
            return Err(EngineError::MissingInput(self.input_name.clone()));
        }

        self.outputs.clear();
        if let Some(scores) = &self.scores {
            let shape = Shape::new(vec![1, scores.len()])
                .map_err(|e| EngineError::Inference(e.to_string()))?;
            let tensor = TensorDescriptor::copied(
                shape,
                scores,
                self.output_exponent,
                MemoryRegion::Internal,
            )
            .map_err(|e| EngineError::Inference(e.to_string()))?;
            self.outputs.insert(MOCK_OUTPUT_NAME.to_string(), tensor);
        }

        self.runs += 1;
        Ok(())
    }

    fn outputs(&self) -> TensorMap<'_> {
        self.outputs
            .iter()
            .map(|(name, tensor)| (name.clone(), tensor.view()))
            .collect()
    }

    fn input_exponent(&self, name: &str) -> Option<i32> {
        if name == self.input_name {
            self.input_exponent
        } else {
            None
        }
    }
}

impl Drop for MockModel {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
