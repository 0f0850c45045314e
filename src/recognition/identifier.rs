use anyhow::Result;
use image::{DynamicImage, GrayImage, imageops};

use super::{contours, preprocessing};
use crate::inference::{DigitClassifier, predict_digit};
use crate::models::DigitTensor;

/// Contour boxes narrower or shorter than this are noise specks and thin
/// artifacts, not digits.
const MIN_DIGIT_WIDTH: u32 = 3;
const MIN_DIGIT_HEIGHT: u32 = 8;
const BOX_PADDING: u32 = 1;

/// Shared front half of identifier processing: grayscale, full-range
/// contrast stretch, sharpen. Digit crops are taken from this image.
fn prepare(crop: &DynamicImage) -> GrayImage {
    let gray = preprocessing::to_grayscale(crop);
    let stretched = preprocessing::stretch_to_full_range(&gray);
    preprocessing::sharpen(&stretched)
}

/// Per-digit bounding boxes of the prepared image, in left-to-right
/// reading order.
///
/// The image is binarized ink-as-white and dilated with a 2x2 element so a
/// digit's strokes hold together as one blob. Contours are traced with
/// their full hierarchy, so a digit with an enclosed hole can contribute a
/// second, inner box; no de-duplication or overlap merging is performed.
/// Sorting by ascending x is the contract that turns the unordered contour
/// set into a character sequence.
fn boxes_of(prepared: &GrayImage) -> Vec<contours::ContourBox> {
    let binary = preprocessing::binarize_otsu_inverted(prepared);
    let dilated = preprocessing::dilate_2x2(&binary);

    let (width, height) = dilated.dimensions();
    let mut boxes: Vec<_> = contours::all_contour_boxes(&dilated)
        .into_iter()
        .filter(|b| b.width > MIN_DIGIT_WIDTH && b.height > MIN_DIGIT_HEIGHT)
        .map(|b| b.padded(BOX_PADDING, width, height))
        .collect();
    boxes.sort_by_key(|b| b.x);
    boxes
}

/// Per-digit bounding boxes of an identifier crop, in reading order.
pub fn digit_boxes(crop: &DynamicImage) -> Vec<contours::ContourBox> {
    boxes_of(&prepare(crop))
}

/// Split a multi-digit identifier crop into per-digit tensors in reading
/// order.
///
/// Each digit is cropped from the sharpened grayscale image (not the
/// dilated mask), resized straight to 28x28, inverted, and scaled to
/// `[0, 1]`. Unlike single-digit normalization there is no canvas
/// centering and no largest-contour re-isolation; the crop is used
/// directly.
pub fn segment_identifier(crop: &DynamicImage) -> Vec<DigitTensor> {
    let prepared = prepare(crop);

    boxes_of(&prepared)
        .iter()
        .map(|b| {
            let digit = imageops::crop_imm(&prepared, b.x, b.y, b.width, b.height).to_image();
            let resized = imageops::resize(
                &digit,
                DigitTensor::SIDE as u32,
                DigitTensor::SIDE as u32,
                imageops::FilterType::Triangle,
            );
            let inverted = preprocessing::invert(&resized);
            DigitTensor::from_gray(&inverted)
        })
        .collect()
}

/// Read the identifier string: classify each segmented digit independently
/// and concatenate the predictions in reading order. A crop with zero
/// qualifying contours yields an empty string, not an error.
pub fn read_identifier<C: DigitClassifier>(
    crop: &DynamicImage,
    classifier: &C,
) -> Result<String> {
    let mut identifier = String::new();
    for tensor in segment_identifier(crop) {
        identifier.push(predict_digit(classifier, &tensor)?);
    }
    Ok(identifier)
}
