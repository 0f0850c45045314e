use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};

/// Axis-aligned bounding box of one traced contour.
#[derive(Debug, Clone, Copy)]
pub struct ContourBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Polygon area enclosed by the traced boundary (shoelace formula).
    pub area: f64,
}

impl ContourBox {
    fn from_contour(contour: &Contour<i32>) -> Option<Self> {
        if contour.points.is_empty() {
            return None;
        }

        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for point in &contour.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        let mut doubled_area = 0i64;
        for (i, point) in contour.points.iter().enumerate() {
            let next = &contour.points[(i + 1) % contour.points.len()];
            doubled_area +=
                point.x as i64 * next.y as i64 - next.x as i64 * point.y as i64;
        }

        Some(Self {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
            area: doubled_area.unsigned_abs() as f64 / 2.0,
        })
    }

    /// Pad by `padding` on every side, clamped to the given image bounds.
    pub fn padded(&self, padding: u32, bound_width: u32, bound_height: u32) -> Self {
        let x = self.x.saturating_sub(padding);
        let y = self.y.saturating_sub(padding);
        Self {
            x,
            y,
            width: (self.width + 2 * padding).min(bound_width - x),
            height: (self.height + 2 * padding).min(bound_height - y),
            area: self.area,
        }
    }
}

/// Bounding boxes of the outer borders of foreground blobs (blob
/// exteriors only, holes ignored).
pub fn outer_contour_boxes(binary: &GrayImage) -> Vec<ContourBox> {
    find_contours::<i32>(binary)
        .iter()
        .filter(|contour| contour.border_type == BorderType::Outer)
        .filter_map(ContourBox::from_contour)
        .collect()
}

/// Bounding boxes of every contour in the full hierarchy, holes included.
/// A digit with an enclosed hole ("0", "8") contributes one box per border.
pub fn all_contour_boxes(binary: &GrayImage) -> Vec<ContourBox> {
    find_contours::<i32>(binary)
        .iter()
        .filter_map(ContourBox::from_contour)
        .collect()
}
