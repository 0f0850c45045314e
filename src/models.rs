use std::collections::BTreeMap;

use image::GrayImage;
use serde::Serialize;

/// One region reported by the external object detector.
#[derive(Debug, Clone)]
pub struct Detection {
    pub class_name: String,
    /// Raw `(x1, y1, x2, y2)` pixel coordinates, possibly outside the image.
    pub bbox: (i32, i32, i32, i32),
    pub confidence: f32,
}

/// Question subpart letter, `a` through `e`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Subpart {
    A,
    B,
    C,
    D,
    E,
}

impl Subpart {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Self::A),
            'b' => Some(Self::B),
            'c' => Some(Self::C),
            'd' => Some(Self::D),
            'e' => Some(Self::E),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
        }
    }
}

/// Region class resolved once per detection from the detector's class name.
///
/// Class names follow the detector's label set: `"usn"`, `"totalMarks"`, or
/// `"<question><subpart>"` where the question number is `1`-`10` and the
/// subpart is `a`-`e`. Anything else is not tracked by the student record
/// (though such detections are still drawn on the annotated image).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Usn,
    TotalMarks,
    Question { number: u8, subpart: Subpart },
}

impl RegionKind {
    pub fn parse(class_name: &str) -> Option<Self> {
        match class_name {
            "usn" => Some(Self::Usn),
            "totalMarks" => Some(Self::TotalMarks),
            other => {
                if other.len() < 2 || !other.is_ascii() {
                    return None;
                }
                let (number_part, subpart_part) = other.split_at(other.len() - 1);
                let subpart = Subpart::from_char(subpart_part.chars().next()?)?;
                let number: u8 = number_part.parse().ok()?;
                if (1..=10).contains(&number) {
                    Some(Self::Question { number, subpart })
                } else {
                    None
                }
            }
        }
    }
}

/// Canonical 28x28 single-channel classifier input: `f32` values in
/// `[0, 1]`, digit bright on a dark background. Produced only by the digit
/// normalizer and the identifier segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitTensor {
    pixels: Vec<f32>,
}

impl DigitTensor {
    pub const SIDE: usize = 28;

    /// All-zero tensor, substituted when a digit crop has no foreground
    /// contour. The classifier still runs on it.
    pub fn zeros() -> Self {
        Self {
            pixels: vec![0.0; Self::SIDE * Self::SIDE],
        }
    }

    /// Build from an 8-bit grayscale image already in classifier polarity
    /// (bright digit on dark). The image must be 28x28.
    pub fn from_gray(image: &GrayImage) -> Self {
        debug_assert_eq!(
            (image.width() as usize, image.height() as usize),
            (Self::SIDE, Self::SIDE)
        );
        Self {
            pixels: image.pixels().map(|p| p[0] as f32 / 255.0).collect(),
        }
    }

    /// Row-major pixel values.
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// The `(1, 28, 28, 1)` batch layout the classifier expects.
    pub fn batch_shape() -> [usize; 4] {
        [1, Self::SIDE, Self::SIDE, 1]
    }
}

/// Recognized contents of one answer sheet. Created empty, mutated in place
/// as detections are classified, finalized once by the total-marks
/// reconciliation. Never reused across images.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRecord {
    pub usn: String,
    pub total_marks: String,
    pub questions: BTreeMap<String, BTreeMap<String, String>>,
}

impl StudentRecord {
    /// All 50 question leaves exist (as empty strings) before any detection
    /// is folded in; key absence is never valid.
    pub fn new() -> Self {
        let mut questions = BTreeMap::new();
        for number in 1..=10u8 {
            let mut subparts = BTreeMap::new();
            for subpart in ["a", "b", "c", "d", "e"] {
                subparts.insert(subpart.to_string(), String::new());
            }
            questions.insert(format!("q{number}"), subparts);
        }
        Self {
            usn: String::new(),
            total_marks: String::new(),
            questions,
        }
    }

    /// Fold one recognized value into the record.
    pub fn apply(&mut self, kind: RegionKind, value: &str) {
        match kind {
            RegionKind::Usn => self.usn = value.to_string(),
            RegionKind::TotalMarks => self.total_marks = value.to_string(),
            RegionKind::Question { number, subpart } => {
                if let Some(subparts) = self.questions.get_mut(&format!("q{number}")) {
                    subparts.insert(subpart.as_str().to_string(), value.to_string());
                }
            }
        }
    }

    /// Fallback applied once, after every detection has been consumed: when
    /// no total-marks cell was classified, the total is the sum of every
    /// question leaf that parses as a non-negative integer. A value the
    /// classifier produced for the total-marks cell is never overridden.
    pub fn reconcile_total_marks(&mut self) {
        if !self.total_marks.is_empty() {
            return;
        }
        let total: u64 = self
            .questions
            .values()
            .flat_map(|subparts| subparts.values())
            .filter_map(|value| value.parse::<u64>().ok())
            .sum();
        self.total_marks = total.to_string();
    }
}

impl Default for StudentRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of the final detection list: the clamped box plus whatever the
/// pipeline recognized inside it ("" for skipped or untracked regions).
#[derive(Debug, Clone, Serialize)]
pub struct DetectionRecord {
    pub class: String,
    pub coordinates: [i32; 4],
    pub confidence: f32,
    pub recognized_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExcelData {
    /// Caller-supplied metadata, passed through unvalidated.
    pub metadata: serde_json::Value,
    /// Always exactly one student per invocation.
    pub students: Vec<StudentRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgrammeVerification {
    #[serde(rename = "match")]
    pub matches: bool,
    pub detected: String,
    pub selected: String,
}

/// The pipeline's final output, emitted as a single JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct ExamResult {
    pub processed_image_path: String,
    pub detections: Vec<DetectionRecord>,
    pub excel_data: ExcelData,
    pub programme_verification: ProgrammeVerification,
}
