use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, stretch_contrast, threshold};

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Stretch pixel intensities to cover the full `[0, 255]` range.
/// A uniform image maps to all zeros.
pub fn stretch_to_full_range(img: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in img.pixels() {
        min = min.min(pixel[0]);
        max = max.max(pixel[0]);
    }
    if min >= max {
        return GrayImage::from_pixel(img.width(), img.height(), Luma([0u8]));
    }
    stretch_contrast(img, min, max, 0u8, 255u8)
}

/// Binarize with an automatically chosen global threshold (Otsu), pixels
/// above the threshold becoming white.
pub fn binarize_otsu(img: &GrayImage) -> GrayImage {
    threshold(img, otsu_level(img), ThresholdType::Binary)
}

/// Otsu binarization with inverted polarity: pixels at or below the
/// threshold become white. Used where dark ink must come out as the
/// foreground directly.
pub fn binarize_otsu_inverted(img: &GrayImage) -> GrayImage {
    threshold(img, otsu_level(img), ThresholdType::BinaryInverted)
}

/// 3x3 sharpening kernel: center weight 5, edge-adjacent neighbors -1,
/// corners 0. Border pixels are copied through unchanged.
pub fn sharpen(img: &GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut sharpened = img.clone();
    if width < 3 || height < 3 {
        return sharpened;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = img.get_pixel(x, y)[0] as f32;
            let top = img.get_pixel(x, y - 1)[0] as f32;
            let bottom = img.get_pixel(x, y + 1)[0] as f32;
            let left = img.get_pixel(x - 1, y)[0] as f32;
            let right = img.get_pixel(x + 1, y)[0] as f32;

            let value = 5.0 * center - (top + bottom + left + right);
            sharpened.put_pixel(x, y, Luma([value.clamp(0.0, 255.0) as u8]));
        }
    }

    sharpened
}

/// Invert so ink becomes bright on dark.
pub fn invert(img: &GrayImage) -> GrayImage {
    let mut inverted = img.clone();
    image::imageops::invert(&mut inverted);
    inverted
}

/// Binary dilation with a 2x2 structuring element anchored at the top-left,
/// one iteration. Bridges small gaps inside a digit's strokes.
pub fn dilate_2x2(img: &GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut dilated = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut value = 0u8;
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let sx = x + dx;
                let sy = y + dy;
                if sx < width && sy < height {
                    value = value.max(img.get_pixel(sx, sy)[0]);
                }
            }
            dilated.put_pixel(x, y, Luma([value]));
        }
    }

    dilated
}
