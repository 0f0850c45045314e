use std::path::PathBuf;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::models::DetectionRecord;

const USN_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TOTAL_MARKS_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const DEFAULT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

const BOX_THICKNESS: i32 = 2;
const LABEL_SCALE: f32 = 16.0;

/// Draws detection boxes and recognized values onto a copy of the source
/// image and persists it under a fixed output directory.
pub struct AnnotationRenderer {
    output_dir: PathBuf,
    font: Option<FontVec>,
}

impl AnnotationRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            font: load_system_font(),
        }
    }

    /// Render every detection entry, recognized or not, and write the
    /// annotated image. The filename is derived from the running process so
    /// concurrent invocations never collide. A write failure is fatal to
    /// the whole pipeline invocation.
    pub fn render(&self, image: &DynamicImage, detections: &[DetectionRecord]) -> Result<PathBuf> {
        let mut canvas = image.to_rgb8();

        for detection in detections {
            let color = color_for_class(&detection.class);
            draw_box(&mut canvas, detection.coordinates, color);

            if let Some(font) = &self.font {
                let label = format!("{}: {}", detection.class, detection.recognized_value);
                let x = detection.coordinates[0];
                let y = (detection.coordinates[1] - 10).max(0);
                draw_text_mut(
                    &mut canvas,
                    color,
                    x,
                    y,
                    PxScale::from(LABEL_SCALE),
                    font,
                    &label,
                );
            }
        }

        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                self.output_dir.display()
            )
        })?;
        let path = self
            .output_dir
            .join(format!("processed_{}.jpg", std::process::id()));
        canvas
            .save(&path)
            .with_context(|| format!("failed to write annotated image {}", path.display()))?;
        Ok(path)
    }
}

fn color_for_class(class: &str) -> Rgb<u8> {
    match class {
        "usn" => USN_COLOR,
        "totalMarks" => TOTAL_MARKS_COLOR,
        _ => DEFAULT_COLOR,
    }
}

fn draw_box(canvas: &mut RgbImage, coordinates: [i32; 4], color: Rgb<u8>) {
    let [x1, y1, x2, y2] = coordinates;
    let width = (x2 - x1).max(1) as u32;
    let height = (y2 - y1).max(1) as u32;

    // nested 1px rectangles for line thickness
    for inset in 0..BOX_THICKNESS {
        let w = width.saturating_sub(2 * inset as u32);
        let h = height.saturating_sub(2 * inset as u32);
        if w == 0 || h == 0 {
            break;
        }
        draw_hollow_rect_mut(canvas, Rect::at(x1 + inset, y1 + inset).of_size(w, h), color);
    }
}

/// Try common system font locations; labels are skipped when none loads.
fn load_system_font() -> Option<FontVec> {
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Helvetica.ttc",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(data) {
                return Some(font);
            }
        }
    }
    None
}
