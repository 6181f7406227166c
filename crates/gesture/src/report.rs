//! Confidence computation and reporting

use dl_tensor::TensorView;
use serde::Serialize;

use crate::events::{DemoEvent, EventSink};
use crate::labels::{Gesture, NUM_CLASSES};
use crate::softmax::softmax;
use crate::DemoError;

/// Probability assigned to one gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassConfidence {
    pub gesture: Gesture,
    pub label: &'static str,
    /// Probability (0.0 to 1.0)
    pub confidence: f32,
}

impl ClassConfidence {
    pub fn percent(&self) -> f32 {
        self.confidence * 100.0
    }
}

/// Confidences for every class, in label-table order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceReport {
    pub classes: Vec<ClassConfidence>,
}

impl ConfidenceReport {
    /// Most likely gesture
    pub fn best(&self) -> Option<&ClassConfidence> {
        self.classes
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }

    /// Sum of all probabilities
    pub fn total(&self) -> f32 {
        self.classes.iter().map(|c| c.confidence).sum()
    }
}

/// Dequantize the class scores and apply softmax.
///
/// Nothing is computed unless the output is present and holds exactly one
/// score per class.
pub fn compute_confidences(
    output: Option<&TensorView<'_>>,
    labels: &[&'static str; NUM_CLASSES],
) -> Result<ConfidenceReport, DemoError> {
    let output = output.ok_or(DemoError::MissingOutput)?;

    if output.element_count() != NUM_CLASSES {
        return Err(DemoError::MalformedOutput {
            expected: NUM_CLASSES,
            actual: output.element_count(),
        });
    }

    let probs = softmax(&output.dequantize());

    let classes = Gesture::ALL
        .iter()
        .zip(labels.iter())
        .zip(probs)
        .map(|((&gesture, &label), confidence)| ClassConfidence {
            gesture,
            label,
            confidence,
        })
        .collect();

    Ok(ConfidenceReport { classes })
}

/// Compute confidences and emit one line per class, or a single error line
pub fn report_confidences<S: EventSink>(
    output: Option<&TensorView<'_>>,
    labels: &[&'static str; NUM_CLASSES],
    sink: &mut S,
) -> Result<ConfidenceReport, DemoError> {
    match compute_confidences(output, labels) {
        Ok(report) => {
            sink.emit(DemoEvent::ResultsHeader);
            for class in &report.classes {
                sink.emit(DemoEvent::ClassConfidence {
                    label: class.label,
                    percent: class.percent(),
                });
            }
            Ok(report)
        }
        Err(e) => {
            sink.emit(DemoEvent::Failed(e.clone()));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::GESTURE_LABELS;
    use dl_tensor::{MemoryRegion, Shape, TensorDescriptor};

    fn scores(values: &[i8], exponent: i32) -> TensorDescriptor<'static> {
        let shape = Shape::new(vec![1, values.len()]).unwrap();
        TensorDescriptor::copied(shape, values, exponent, MemoryRegion::Internal).unwrap()
    }

    #[test]
    fn test_reference_scores() {
        let output = scores(&[10, -5, 3, 0, 0, 0, 0, 0], -7);
        let report = compute_confidences(Some(&output.view()), &GESTURE_LABELS).unwrap();

        assert_eq!(report.classes.len(), 8);
        assert_eq!(report.best().unwrap().gesture, Gesture::Palm);

        let lowest = report
            .classes
            .iter()
            .min_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .unwrap();
        assert_eq!(lowest.label, "l");

        let total_percent: f32 = report.classes.iter().map(|c| c.percent()).sum();
        assert!((total_percent - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_reference_values() {
        let output = scores(&[10, -5, 3, 0, 0, 0, 0, 0], -7);
        let report = compute_confidences(Some(&output.view()), &GESTURE_LABELS).unwrap();

        let real = [0.078125f32, -0.0390625, 0.0234375, 0.0, 0.0, 0.0, 0.0, 0.0];
        let denom: f32 = real.iter().map(|v| v.exp()).sum();
        for (class, v) in report.classes.iter().zip(real) {
            assert!((class.confidence - v.exp() / denom).abs() < 1e-6);
        }
    }

    #[test]
    fn test_order_follows_labels() {
        let output = scores(&[0, 0, 0, 0, 0, 0, 0, 90], -4);
        let report = compute_confidences(Some(&output.view()), &GESTURE_LABELS).unwrap();
        let labels: Vec<&str> = report.classes.iter().map(|c| c.label).collect();
        assert_eq!(labels, GESTURE_LABELS.to_vec());
        assert_eq!(report.best().unwrap().gesture, Gesture::Down);
    }

    #[test]
    fn test_wrong_size_emits_only_error() {
        let output = scores(&[1, 2, 3], -7);
        let mut events: Vec<DemoEvent> = Vec::new();
        let err = report_confidences(Some(&output.view()), &GESTURE_LABELS, &mut events).unwrap_err();

        assert_eq!(err, DemoError::MalformedOutput { expected: 8, actual: 3 });
        assert_eq!(events, vec![DemoEvent::Failed(err)]);
    }

    #[test]
    fn test_missing_output_emits_one_error() {
        let mut events: Vec<DemoEvent> = Vec::new();
        let err = report_confidences(None, &GESTURE_LABELS, &mut events).unwrap_err();

        assert_eq!(err, DemoError::MissingOutput);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
    }

    #[test]
    fn test_success_emits_header_and_classes() {
        let output = scores(&[10, -5, 3, 0, 0, 0, 0, 0], -7);
        let mut events: Vec<DemoEvent> = Vec::new();
        report_confidences(Some(&output.view()), &GESTURE_LABELS, &mut events).unwrap();

        assert_eq!(events.len(), 1 + NUM_CLASSES);
        assert_eq!(events[0], DemoEvent::ResultsHeader);
        assert!(matches!(events[1], DemoEvent::ClassConfidence { label: "palm", .. }));
        assert!(!events.iter().any(DemoEvent::is_error));
    }
}
