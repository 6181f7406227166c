//! ONNX backend built on tract
//!
//! The graph runs in floating point. Quantized inputs are dequantized on the
//! way in, and every output is requantized to int8 with the tightest
//! exponent that fits its range, so callers see the same fixed-point
//! contract as on the device.

use std::collections::BTreeMap;

use dl_tensor::{fit_exponent, quantize, MemoryRegion, Shape, TensorDescriptor, TensorMap};
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::{EngineError, InferenceBackend, Model, ModelLocation, StorageConfig};

type Plan = TypedRunnableModel<TypedModel>;

/// Backend loading ONNX models from the configured storage directories
#[derive(Debug, Clone)]
pub struct TractBackend {
    storage: StorageConfig,
    input_shape: Vec<usize>,
}

impl TractBackend {
    /// Create a backend whose models take a single input of `input_shape`
    pub fn new(storage: StorageConfig, input_shape: &[usize]) -> Self {
        info!(
            "Creating tract backend (partition: {}, sdcard: {})",
            storage.partition_dir.display(),
            storage.sdcard_dir.display()
        );
        Self {
            storage,
            input_shape: input_shape.to_vec(),
        }
    }
}

impl InferenceBackend for TractBackend {
    type Model = TractModel;

    fn load_model(
        &self,
        identifier: &str,
        location: ModelLocation,
    ) -> Result<TractModel, EngineError> {
        let path = self.storage.resolve(identifier, location);
        if !path.is_file() {
            return Err(EngineError::ModelNotFound {
                identifier: identifier.to_string(),
                location: self.storage.root(location).display().to_string(),
            });
        }

        info!("Loading model '{}' from {}", identifier, path.display());
        let input_fact =
            InferenceFact::dt_shape(f32::datum_type(), self.input_shape.iter().copied());

        let plan: Plan = tract_onnx::onnx()
            .model_for_path(&path)
            .and_then(|model| model.with_input_fact(0, input_fact))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                debug!("Model {} rejected by tract: {:?}", path.display(), e);
                EngineError::ModelLoadError(e.to_string())
            })?;

        let graph = plan.model();
        let input_name = graph
            .input_outlets()
            .map_err(|e| EngineError::ModelLoadError(e.to_string()))?
            .first()
            .map(|outlet| graph.node(outlet.node).name.clone())
            .ok_or_else(|| EngineError::ModelLoadError("graph declares no inputs".to_string()))?;
        let output_names = graph
            .output_outlets()
            .map_err(|e| EngineError::ModelLoadError(e.to_string()))?
            .iter()
            .map(|outlet| match graph.outlet_label(*outlet) {
                Some(label) => label.to_string(),
                None => graph.node(outlet.node).name.clone(),
            })
            .collect::<Vec<_>>();

        debug!("Model inputs: [{}], outputs: {:?}", input_name, output_names);

        Ok(TractModel {
            plan,
            input_name,
            input_shape: self.input_shape.clone(),
            output_names,
            outputs: BTreeMap::new(),
        })
    }
}

/// Optimized, runnable ONNX graph
pub struct TractModel {
    plan: Plan,
    input_name: String,
    input_shape: Vec<usize>,
    output_names: Vec<String>,
    outputs: BTreeMap<String, TensorDescriptor<'static>>,
}

impl TractModel {
    /// Name of the graph input
    pub fn input_name(&self) -> &str {
        &self.input_name
    }
}

impl Model for TractModel {
    fn run(&mut self, inputs: &TensorMap<'_>) -> Result<(), EngineError> {
        let input = inputs
            .get(&self.input_name)
            .ok_or_else(|| EngineError::MissingInput(self.input_name.clone()))?;

        if input.shape().dims() != self.input_shape.as_slice() {
            return Err(EngineError::InvalidInputShape {
                expected: format!("{:?}", self.input_shape),
                actual: input.shape().to_string(),
            });
        }

        let array = tract_ndarray::ArrayD::from_shape_vec(
            tract_ndarray::IxDyn(&self.input_shape),
            input.dequantize(),
        )
        .map_err(|e| EngineError::InvalidInputShape {
            expected: format!("{:?}", self.input_shape),
            actual: e.to_string(),
        })?;

        let result = self
            .plan
            .run(tvec!(array.into_tensor().into()))
            .map_err(|e| EngineError::Inference(e.to_string()))?;

        self.outputs.clear();
        for (name, value) in self.output_names.iter().zip(result.iter()) {
            let view = value
                .to_array_view::<f32>()
                .map_err(|e| EngineError::Inference(e.to_string()))?;
            let real: Vec<f32> = view.iter().copied().collect();

            let dims = if view.shape().is_empty() {
                vec![1]
            } else {
                view.shape().to_vec()
            };
            let exponent = fit_exponent(&real, 8);
            let tensor = Shape::new(dims)
                .and_then(|shape| {
                    TensorDescriptor::owned(shape, quantize(&real, exponent), exponent, MemoryRegion::Internal)
                })
                .map_err(|e| EngineError::Inference(e.to_string()))?;

            debug!(
                "Output '{}': shape {}, exponent {}",
                name,
                tensor.shape(),
                exponent
            );
            self.outputs.insert(name.clone(), tensor);
        }

        Ok(())
    }

    fn outputs(&self) -> TensorMap<'_> {
        self.outputs
            .iter()
            .map(|(name, tensor)| (name.clone(), tensor.view()))
            .collect()
    }
}
