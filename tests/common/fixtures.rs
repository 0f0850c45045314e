use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::Result;
use image::{DynamicImage, Rgb, RgbImage};
use marksheet::models::Detection;
use marksheet::{Detector, DigitClassifier, DigitTensor};

/// Detector stub replaying a fixed detection list.
pub struct FixedDetector {
    pub detections: Vec<Detection>,
}

impl FixedDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Detector for FixedDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

pub fn detection(class: &str, bbox: (i32, i32, i32, i32)) -> Detection {
    Detection {
        class_name: class.to_string(),
        bbox,
        confidence: 0.9,
    }
}

/// Classifier stub always scoring one digit highest.
pub struct ConstClassifier(pub u8);

impl DigitClassifier for ConstClassifier {
    fn classify(&self, _tensor: &DigitTensor) -> Result<[f32; 10]> {
        let mut scores = [0.0; 10];
        scores[self.0 as usize] = 1.0;
        Ok(scores)
    }
}

/// Classifier stub replaying scripted predictions in call order, cycling
/// when exhausted.
pub struct SequenceClassifier {
    digits: RefCell<VecDeque<u8>>,
}

impl SequenceClassifier {
    pub fn new(digits: &[u8]) -> Self {
        Self {
            digits: RefCell::new(digits.iter().copied().collect()),
        }
    }
}

impl DigitClassifier for SequenceClassifier {
    fn classify(&self, _tensor: &DigitTensor) -> Result<[f32; 10]> {
        let mut digits = self.digits.borrow_mut();
        let digit = digits.pop_front().unwrap_or(0);
        digits.push_back(digit);
        let mut scores = [0.0; 10];
        scores[digit as usize] = 1.0;
        Ok(scores)
    }
}

/// Classifier keyed on how much of the tensor is bright: a wide ink blob
/// reads as 5, a narrow one as 2. Lets tests tell segmented digits apart
/// without a trained model.
pub struct IntensityClassifier;

impl DigitClassifier for IntensityClassifier {
    fn classify(&self, tensor: &DigitTensor) -> Result<[f32; 10]> {
        let mean = tensor.pixels().iter().sum::<f32>() / tensor.pixels().len() as f32;
        let digit = if mean > 0.6 { 5 } else { 2 };
        let mut scores = [0.0; 10];
        scores[digit] = 1.0;
        Ok(scores)
    }
}

/// White sheet with black or gray blocks at the given
/// `(x, y, width, height, gray_level)` positions.
pub fn sheet_with_blocks(
    width: u32,
    height: u32,
    blocks: &[(u32, u32, u32, u32, u8)],
) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for &(x, y, w, h, level) in blocks {
        for yy in y..(y + h).min(height) {
            for xx in x..(x + w).min(width) {
                img.put_pixel(xx, yy, Rgb([level, level, level]));
            }
        }
    }
    DynamicImage::ImageRgb8(img)
}

pub fn white_sheet(width: u32, height: u32) -> DynamicImage {
    sheet_with_blocks(width, height, &[])
}
