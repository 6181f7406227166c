//! Numerically stable softmax

/// Map scores to a probability distribution.
///
/// The maximum is subtracted before exponentiating so large scores cannot
/// overflow `exp`.
pub fn softmax(values: &[f32]) -> Vec<f32> {
    let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let exps: Vec<f32> = values.iter().map(|&v| (v - max_val).exp()).collect();
    let sum: f32 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}
