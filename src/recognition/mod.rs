pub mod clip;
pub mod contours;
pub mod digit;
pub mod identifier;
pub mod preprocessing;

use std::path::PathBuf;

use anyhow::Result;
use image::DynamicImage;
use serde_json::Value;

use crate::annotate::AnnotationRenderer;
use crate::inference::{Detector, DigitClassifier, predict_digit};
use crate::models::{
    DetectionRecord, ExamResult, ExcelData, ProgrammeVerification, RegionKind, StudentRecord,
};

/// End-to-end answer-sheet pipeline: detect marked regions, recognize their
/// contents, fold them into a student record, and persist an annotated copy
/// of the sheet.
///
/// The detector and classifier capabilities are injected, so tests can
/// substitute deterministic models. Processing is fully sequential; one
/// invocation builds its own record and output image and shares nothing
/// with other invocations.
pub struct ExamPipeline<'a, D, C> {
    detector: &'a D,
    classifier: &'a C,
    renderer: AnnotationRenderer,
    verbose: bool,
}

impl<'a, D: Detector, C: DigitClassifier> ExamPipeline<'a, D, C> {
    pub fn new(detector: &'a D, classifier: &'a C, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            detector,
            classifier,
            renderer: AnnotationRenderer::new(output_dir),
            verbose: false,
        }
    }

    /// Print per-step progress to stderr. Stdout stays reserved for the
    /// result document.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Process one sheet image.
    pub fn process(&self, image: &DynamicImage, metadata: Value) -> Result<ExamResult> {
        let raw_detections = self.detector.detect(image)?;
        if self.verbose {
            eprintln!("Detector reported {} regions", raw_detections.len());
        }

        let mut student = StudentRecord::new();
        let mut records = Vec::with_capacity(raw_detections.len());

        for detection in &raw_detections {
            let clamped = clip::clamp_bbox(detection.bbox, image.width(), image.height());
            let mut recognized = String::new();

            match clip::clip_region(image, &clamped) {
                Some(crop) => {
                    if let Some(kind) = RegionKind::parse(&detection.class_name) {
                        recognized = self.recognize(kind, &crop)?;
                        student.apply(kind, &recognized);
                        if self.verbose {
                            eprintln!("  {}: '{}'", detection.class_name, recognized);
                        }
                    } else if self.verbose {
                        eprintln!("  {}: untracked class, skipped", detection.class_name);
                    }
                }
                None => {
                    if self.verbose {
                        eprintln!("  {}: empty crop, skipped", detection.class_name);
                    }
                }
            }

            // skipped and untracked detections still land in the list so
            // the annotated image shows every reported region
            records.push(DetectionRecord {
                class: detection.class_name.clone(),
                coordinates: clamped.coordinates(),
                confidence: detection.confidence,
                recognized_value: recognized,
            });
        }

        student.reconcile_total_marks();

        let processed_image_path = self.renderer.render(image, &records)?;
        if self.verbose {
            eprintln!("Annotated image written to {}", processed_image_path.display());
        }

        let programme = metadata
            .get("programme")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(ExamResult {
            processed_image_path: processed_image_path.display().to_string(),
            detections: records,
            excel_data: ExcelData {
                metadata,
                students: vec![student],
            },
            programme_verification: ProgrammeVerification {
                matches: true,
                detected: programme.clone(),
                selected: programme,
            },
        })
    }

    fn recognize(&self, kind: RegionKind, crop: &DynamicImage) -> Result<String> {
        match kind {
            RegionKind::Usn => identifier::read_identifier(crop, self.classifier),
            RegionKind::TotalMarks | RegionKind::Question { .. } => {
                let tensor = digit::normalize_digit(crop);
                Ok(predict_digit(self.classifier, &tensor)?.to_string())
            }
        }
    }
}
