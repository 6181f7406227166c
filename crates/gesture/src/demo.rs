//! One-shot demo routine: load, prepare, infer, report

use std::time::Instant;

use dl_tensor::{MemoryRegion, TensorMap};
use inference_engine::{InferenceBackend, MemoryStats, Model, ModelLocation};

use crate::events::{DemoEvent, EventSink, MemoryPhase};
use crate::input::{prepare_input, INPUT_DIMS, INPUT_EXPONENT, INPUT_NAME, TEST_IMAGE};
use crate::labels::GESTURE_LABELS;
use crate::report::{report_confidences, ConfidenceReport};
use crate::DemoError;

/// Everything the routine needs to know about the model and its input
#[derive(Debug, Clone)]
pub struct DemoSettings<'a> {
    /// Model name in storage
    pub model_identifier: &'a str,
    pub location: ModelLocation,
    /// Must match the graph's declared input name
    pub input_name: &'a str,
    /// Pre-quantized input pixels
    pub input: &'a [i8],
    pub input_dims: &'a [usize],
    /// Exponent the input was quantized with
    pub input_exponent: i32,
    pub region: MemoryRegion,
    /// Refuse to run when the model declares a different input exponent
    pub check_input_exponent: bool,
}

impl DemoSettings<'static> {
    /// The deployed model on the embedded test image
    pub fn embedded() -> Self {
        Self {
            model_identifier: "model",
            location: ModelLocation::FlashPartition,
            input_name: INPUT_NAME,
            input: &TEST_IMAGE,
            input_dims: &INPUT_DIMS,
            input_exponent: INPUT_EXPONENT,
            region: MemoryRegion::External,
            check_input_exponent: false,
        }
    }
}

/// How a demo run ended
#[derive(Debug, Clone, PartialEq)]
pub enum DemoOutcome {
    Completed(ConfidenceReport),
    Aborted(DemoError),
}

impl DemoOutcome {
    pub fn report(&self) -> Option<&ConfidenceReport> {
        match self {
            DemoOutcome::Completed(report) => Some(report),
            DemoOutcome::Aborted(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DemoError> {
        match self {
            DemoOutcome::Completed(_) => None,
            DemoOutcome::Aborted(e) => Some(e),
        }
    }
}

/// Run the demo once.
///
/// The model handle and the input tensor are owned here and released on
/// every path; output tensors are only ever borrowed from the model.
pub fn run_demo<B, M, S>(
    backend: &B,
    memory: &M,
    settings: &DemoSettings<'_>,
    sink: &mut S,
) -> DemoOutcome
where
    B: InferenceBackend,
    M: MemoryStats,
    S: EventSink,
{
    sink.emit(DemoEvent::Started);

    let load_start = Instant::now();
    let mut model = match backend.load_model(settings.model_identifier, settings.location) {
        Ok(model) => model,
        Err(e) => return abort(sink, DemoError::ModelLoad(e.to_string())),
    };
    sink.emit(DemoEvent::ModelLoaded {
        elapsed_ms: elapsed_ms(load_start),
    });

    let input = match prepare_input(
        settings.input,
        settings.input_dims,
        settings.input_exponent,
        settings.region,
    ) {
        Ok(input) => input,
        Err(e) => return abort(sink, DemoError::InputPreparation(e.to_string())),
    };

    if settings.check_input_exponent {
        if let Some(expected) = model.input_exponent(settings.input_name) {
            if expected != settings.input_exponent {
                return abort(
                    sink,
                    DemoError::ExponentMismatch {
                        configured: settings.input_exponent,
                        expected,
                    },
                );
            }
        }
    }

    let mut inputs = TensorMap::new();
    inputs.insert(settings.input_name.to_string(), input.view());

    sink.emit(DemoEvent::InferenceStarting);
    sink.emit(DemoEvent::FreeMemory {
        phase: MemoryPhase::BeforeInference,
        bytes: memory.free_bytes(settings.region),
    });

    let inference_start = Instant::now();
    if let Err(e) = model.run(&inputs) {
        return abort(sink, DemoError::Inference(e.to_string()));
    }
    sink.emit(DemoEvent::InferenceFinished {
        elapsed_ms: elapsed_ms(inference_start),
    });
    sink.emit(DemoEvent::FreeMemory {
        phase: MemoryPhase::AfterInference,
        bytes: memory.free_bytes(settings.region),
    });

    let outcome = {
        let outputs = model.outputs();
        // The model has exactly one output
        match outputs.values().next() {
            Some(output) => match report_confidences(Some(output), &GESTURE_LABELS, sink) {
                Ok(report) => DemoOutcome::Completed(report),
                Err(e) => DemoOutcome::Aborted(e),
            },
            None => {
                sink.emit(DemoEvent::Failed(DemoError::EmptyOutput));
                DemoOutcome::Aborted(DemoError::EmptyOutput)
            }
        }
    };

    drop(inputs);
    drop(input);
    drop(model);

    sink.emit(DemoEvent::Finished);
    outcome
}

fn abort<S: EventSink>(sink: &mut S, error: DemoError) -> DemoOutcome {
    sink.emit(DemoEvent::Failed(error.clone()));
    DemoOutcome::Aborted(error)
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
