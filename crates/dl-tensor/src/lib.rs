//! Quantized Tensor Descriptors
//!
//! Fixed-point tensors as exchanged with the on-device inference engine.
//! Every element is a signed integer and the whole tensor shares one
//! power-of-two exponent: `real = stored * 2^exponent`.

mod error;
mod quant;
mod tensor;

pub use error::TensorError;
pub use quant::{dequantize, fit_exponent, quantize, scale};
pub use tensor::{
    ElementType, MemoryRegion, Shape, TensorData, TensorDescriptor, TensorMap, TensorView,
};
