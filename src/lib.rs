pub mod annotate;
pub mod inference;
pub mod models;
pub mod recognition;

pub use inference::{Detector, DigitClassifier};
pub use models::{
    Detection, DetectionRecord, DigitTensor, ExamResult, RegionKind, StudentRecord, Subpart,
};
pub use recognition::ExamPipeline;
