use image::DynamicImage;

/// A detector bounding box clamped into image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl ClampedBox {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn coordinates(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// Clamp a raw detector box into `[0, width-1] x [0, height-1]`.
pub fn clamp_bbox(bbox: (i32, i32, i32, i32), width: u32, height: u32) -> ClampedBox {
    let (x1, y1, x2, y2) = bbox;
    ClampedBox {
        x1: x1.max(0),
        y1: y1.max(0),
        x2: x2.min(width as i32 - 1),
        y2: y2.min(height as i32 - 1),
    }
}

/// Extract the clamped pixel window. The right and bottom edges are
/// exclusive. Returns None when the window has no area, in which case the
/// caller must skip classification for this detection.
pub fn clip_region(image: &DynamicImage, clamped: &ClampedBox) -> Option<DynamicImage> {
    if clamped.is_empty() {
        return None;
    }
    Some(image.crop_imm(
        clamped.x1 as u32,
        clamped.y1 as u32,
        clamped.width() as u32,
        clamped.height() as u32,
    ))
}
