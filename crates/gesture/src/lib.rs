//! Hand-Gesture Recognition Demo
//!
//! One-shot classification of a pre-quantized 96×96 grayscale image:
//! - Wrap the embedded image as the model input tensor
//! - Load the model from storage and run it once
//! - Dequantize the class scores and report softmax confidences

pub mod config;
pub mod demo;
pub mod events;
pub mod image_prep;
pub mod input;
pub mod labels;
pub mod report;
pub mod softmax;

pub use config::{BackendKind, DemoConfig};
pub use demo::{run_demo, DemoOutcome, DemoSettings};
pub use events::{DemoEvent, EventSink, MemoryPhase, TracingSink};
pub use input::{prepare_input, INPUT_DIMS, INPUT_EXPONENT, INPUT_NAME, TEST_IMAGE};
pub use labels::{Gesture, GESTURE_LABELS, NUM_CLASSES};
pub use report::{compute_confidences, report_confidences, ClassConfidence, ConfidenceReport};
pub use softmax::softmax;

use thiserror::Error;

/// Reasons a demo run ends early
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DemoError {
    #[error("Model could not be created: {0}")]
    ModelLoad(String),

    #[error("Failed to prepare input data: {0}")]
    InputPreparation(String),

    #[error("Input exponent {configured} does not match the model's expected exponent {expected}")]
    ExponentMismatch { configured: i32, expected: i32 },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model returned no output")]
    EmptyOutput,

    #[error("Invalid output tensor")]
    MissingOutput,

    #[error("Unexpected output size: {actual} (expected {expected})")]
    MalformedOutput { expected: usize, actual: usize },
}
