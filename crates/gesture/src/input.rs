//! Input tensor preparation and the embedded test image

use dl_tensor::{MemoryRegion, Shape, TensorDescriptor, TensorError};

/// Input slot name declared by the model graph
pub const INPUT_NAME: &str = "input";

/// Input image edge length in pixels
pub const IMAGE_SIZE: usize = 96;

/// Input shape: batch, channel, height, width
pub const INPUT_DIMS: [usize; 4] = [1, 1, IMAGE_SIZE, IMAGE_SIZE];

/// Number of input elements
pub const INPUT_LEN: usize = IMAGE_SIZE * IMAGE_SIZE;

/// Exponent the test image was quantized with (scale 1/128)
pub const INPUT_EXPONENT: i32 = -7;

/// Pre-quantized 96×96 grayscale test image
pub static TEST_IMAGE: [i8; INPUT_LEN] = as_signed(include_bytes!("../assets/test_image.i8"));

const fn as_signed(raw: &[u8; INPUT_LEN]) -> [i8; INPUT_LEN] {
    let mut out = [0i8; INPUT_LEN];
    let mut i = 0;
    while i < INPUT_LEN {
        out[i] = raw[i] as i8;
        i += 1;
    }
    out
}

/// Wrap an already-quantized buffer as the model input, without copying.
///
/// The exponent is taken on trust: a value that differs from the one the
/// buffer was quantized with yields wrong confidences, not an error.
pub fn prepare_input<'a>(
    buffer: &'a [i8],
    dims: &[usize],
    exponent: i32,
    region: MemoryRegion,
) -> Result<TensorDescriptor<'a>, TensorError> {
    let shape = Shape::new(dims.to_vec())?;
    TensorDescriptor::borrowed(shape, buffer, exponent, region)
}
