pub mod runtime;

use anyhow::Result;
use image::DynamicImage;

use crate::models::{Detection, DigitTensor};

/// Capability of the external region detector: locate marked regions on a
/// sheet image. No ordering is assumed on the returned detections.
pub trait Detector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// Capability of the external handwritten-digit classifier: score one
/// normalized tensor over the digits 0-9.
pub trait DigitClassifier {
    fn classify(&self, tensor: &DigitTensor) -> Result<[f32; 10]>;
}

/// Reduce a classifier score vector to one predicted decimal character.
/// Ties resolve to the lowest digit. No confidence threshold is applied;
/// every classification is accepted, including on a blank tensor.
pub fn predict_digit<C: DigitClassifier>(classifier: &C, tensor: &DigitTensor) -> Result<char> {
    let scores = classifier.classify(tensor)?;
    let mut best = 0usize;
    for (index, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = index;
        }
    }
    Ok((b'0' + best as u8) as char)
}
