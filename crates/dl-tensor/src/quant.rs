//! Power-of-two quantization arithmetic

/// Real value of one quantization step for `exponent`
pub fn scale(exponent: i32) -> f32 {
    2f32.powi(exponent)
}

/// Convert stored integers back to real values
pub fn dequantize<T>(values: &[T], exponent: i32) -> Vec<f32>
where
    T: Copy + Into<f32>,
{
    let scale = scale(exponent);
    values.iter().map(|&v| v.into() * scale).collect()
}

/// Smallest exponent that keeps every value inside a signed `bits`-wide integer.
///
/// All-zero or non-finite input falls back to `-(bits - 1)`, which maps
/// the range [-1, 1) onto the full integer range.
pub fn fit_exponent(values: &[f32], bits: u32) -> i32 {
    let fallback = -(bits as i32 - 1);
    let q_max = ((1i64 << (bits - 1)) - 1) as f32;

    let max_abs = values
        .iter()
        .map(|v| v.abs())
        .fold(0.0f32, f32::max);

    if max_abs == 0.0 || !max_abs.is_finite() {
        return fallback;
    }

    let mut exponent = (max_abs / q_max).log2().ceil() as i32;
    // log2/ceil can land one step low due to rounding
    while max_abs / scale(exponent) > q_max {
        exponent += 1;
    }
    exponent
}

/// Quantize real values to int8 with round-to-nearest and saturation
pub fn quantize(values: &[f32], exponent: i32) -> Vec<i8> {
    let scale = scale(exponent);
    values
        .iter()
        .map(|&v| (v / scale).round().clamp(i8::MIN as f32, i8::MAX as f32) as i8)
        .collect()
}
