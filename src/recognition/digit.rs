use image::{DynamicImage, GrayImage, Luma, imageops};

use super::{contours, preprocessing};
use crate::models::DigitTensor;

const CANVAS_SIDE: u32 = DigitTensor::SIDE as u32;
const GLYPH_SIDE: u32 = 18;

/// Normalize a crop believed to contain one handwritten digit into the
/// canonical classifier tensor.
///
/// The digit is isolated as the largest foreground contour of the Otsu
/// binarization, scaled to 18x18, centered on a 28x28 canvas with a 5px
/// margin, contrast-stretched, sharpened, and inverted to bright-on-dark.
///
/// A crop with no foreground contour yields an all-zero tensor; the
/// classifier still runs on it.
pub fn normalize_digit(crop: &DynamicImage) -> DigitTensor {
    let gray = preprocessing::to_grayscale(crop);
    let binary = preprocessing::binarize_otsu(&gray);

    let boxes = contours::outer_contour_boxes(&binary);
    let Some(largest) = boxes.iter().max_by(|a, b| a.area.total_cmp(&b.area)) else {
        return DigitTensor::zeros();
    };

    let digit = imageops::crop_imm(&binary, largest.x, largest.y, largest.width, largest.height)
        .to_image();
    let resized = imageops::resize(&digit, GLYPH_SIDE, GLYPH_SIDE, imageops::FilterType::Triangle);

    let mut canvas = GrayImage::from_pixel(CANVAS_SIDE, CANVAS_SIDE, Luma([255u8]));
    let offset = (CANVAS_SIDE - GLYPH_SIDE) / 2;
    imageops::overlay(&mut canvas, &resized, offset.into(), offset.into());

    let stretched = preprocessing::stretch_to_full_range(&canvas);
    let sharpened = preprocessing::sharpen(&stretched);
    let inverted = preprocessing::invert(&sharpened);
    DigitTensor::from_gray(&inverted)
}
