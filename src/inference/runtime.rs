use std::fs;
use std::path::Path;

use anyhow::{Result, anyhow, bail};
use image::DynamicImage;
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;

use super::{Detector, DigitClassifier};
use crate::models::{Detection, DigitTensor};

/// Region detector backed by an exported `.rten` model.
///
/// The model takes an NCHW float RGB image in `[0, 1]` and emits
/// post-processed rows `[x1, y1, x2, y2, confidence, class_id]`. A sidecar
/// labels file (one class name per line) maps `class_id` back to the class
/// names the pipeline routes on. Rows whose class id has no label are
/// dropped.
pub struct RtenDetector {
    model: Model,
    class_names: Vec<String>,
}

impl RtenDetector {
    pub fn load(model_path: &Path, labels_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            bail!("detector model not found: {}", model_path.display());
        }
        if !labels_path.exists() {
            bail!("detector labels not found: {}", labels_path.display());
        }

        let model = Model::load_file(model_path)
            .map_err(|e| anyhow!("failed to load detector model {}: {e}", model_path.display()))?;
        let class_names: Vec<String> = fs::read_to_string(labels_path)?
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        if class_names.is_empty() {
            bail!("detector labels file {} is empty", labels_path.display());
        }

        Ok(Self { model, class_names })
    }
}

impl Detector for RtenDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut input = NdTensor::<f32, 4>::zeros([1, 3, height as usize, width as usize]);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            for channel in 0..3 {
                input[[0, channel, y as usize, x as usize]] = pixel[channel] as f32 / 255.0;
            }
        }

        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow!("detector inference failed: {e}"))?;
        let rows: NdTensor<f32, 2> = output
            .try_into()
            .map_err(|_| anyhow!("detector output is not an (N, 6) tensor"))?;
        if rows.size(1) < 6 {
            bail!(
                "detector output rows have {} columns, expected at least 6",
                rows.size(1)
            );
        }

        let mut detections = Vec::new();
        for row in 0..rows.size(0) {
            let class_id = rows[[row, 5]] as usize;
            let Some(class_name) = self.class_names.get(class_id) else {
                continue;
            };
            detections.push(Detection {
                class_name: class_name.clone(),
                bbox: (
                    rows[[row, 0]] as i32,
                    rows[[row, 1]] as i32,
                    rows[[row, 2]] as i32,
                    rows[[row, 3]] as i32,
                ),
                confidence: rows[[row, 4]],
            });
        }
        Ok(detections)
    }
}

/// Handwritten-digit classifier backed by an exported `.rten` model taking
/// a `(1, 28, 28, 1)` batch and producing a length-10 score vector.
pub struct RtenDigitClassifier {
    model: Model,
}

impl RtenDigitClassifier {
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            bail!("classifier model not found: {}", model_path.display());
        }
        let model = Model::load_file(model_path).map_err(|e| {
            anyhow!(
                "failed to load classifier model {}: {e}",
                model_path.display()
            )
        })?;
        Ok(Self { model })
    }
}

impl DigitClassifier for RtenDigitClassifier {
    fn classify(&self, tensor: &DigitTensor) -> Result<[f32; 10]> {
        let mut input = NdTensor::<f32, 4>::zeros(DigitTensor::batch_shape());
        for (index, value) in tensor.pixels().iter().enumerate() {
            input[[0, index / DigitTensor::SIDE, index % DigitTensor::SIDE, 0]] = *value;
        }

        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow!("classifier inference failed: {e}"))?;
        let scores: NdTensor<f32, 2> = output
            .try_into()
            .map_err(|_| anyhow!("classifier output is not a (1, 10) tensor"))?;
        if scores.size(1) != 10 {
            bail!(
                "classifier produced {} classes, expected 10",
                scores.size(1)
            );
        }

        let mut distribution = [0.0f32; 10];
        for (digit, score) in distribution.iter_mut().enumerate() {
            *score = scores[[0, digit]];
        }
        Ok(distribution)
    }
}
