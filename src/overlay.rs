//! Overlay rendering.
//!
//! `OverlayState` is the render sink: it holds the latest `AnalysisResult` and
//! turns it into viewport-space `OverlayItem`s (outline plus label) in
//! detection order. `draw_overlay` rasterises those items for debugging and
//! for headless runs.

use image::{Rgba, RgbaImage};
use std::path::PathBuf;

use crate::detect::Detection;
use crate::geometry::{BoundingBox, CoordinateMapper, ViewportSize};
use crate::pipeline::AnalysisResult;

/// Labels sit this many pixels above the box's top edge.
pub const LABEL_OFFSET_PX: f32 = 10.0;

pub const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const BOX_THICKNESS: u32 = 8;

/// `"<class>: <confidence as percent, one decimal>%"`.
pub fn format_label(detection: &Detection) -> String {
    format!(
        "{}: {:.1}%",
        detection.class_name(),
        detection.confidence() * 100.0
    )
}

/// Multi-line result summary shown next to the preview.
pub fn summarize(detections: &[Detection]) -> String {
    if detections.is_empty() {
        return "No waste detected.".to_string();
    }
    let mut summary = String::from("=== DETECTION RESULTS ===\n");
    summary.push_str(&format!("Objects: {}\n\n", detections.len()));
    for detection in detections {
        summary.push_str(&format!(
            "• {} ({:.1}%)\n",
            detection.class_name(),
            detection.confidence() * 100.0
        ));
    }
    summary
}

/// One rectangle and its label, in viewport pixels.
///
/// `draw_overlay` rasterises only `rect`; the display layer draws `label` at
/// `label_anchor`.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayItem {
    pub rect: BoundingBox,
    pub label: String,
    /// Baseline-left position of the label text.
    pub label_anchor: (f32, f32),
}

/// PNG file kept in sync with the overlay.
#[derive(Debug)]
struct OverlayOutput {
    path: PathBuf,
    viewport: ViewportSize,
}

#[derive(Debug, Default)]
pub struct OverlayState {
    current: Option<AnalysisResult>,
    output: Option<OverlayOutput>,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite `path` as a viewport-sized PNG every time the overlay changes.
    pub fn with_output(mut self, path: impl Into<PathBuf>, viewport: ViewportSize) -> Self {
        self.output = Some(OverlayOutput {
            path: path.into(),
            viewport,
        });
        self
    }

    /// Replace the displayed result.
    pub fn apply(&mut self, result: AnalysisResult) {
        self.current = Some(result);
        self.persist();
    }

    /// Clear the overlay: no detections, 1x1 unrotated context.
    pub fn reset(&mut self) {
        self.current = Some(AnalysisResult::empty());
        self.persist();
    }

    fn persist(&self) {
        let Some(output) = &self.output else {
            return;
        };
        let width = output.viewport.width.round() as u32;
        let height = output.viewport.height.round() as u32;
        let canvas = draw_overlay(&self.items(output.viewport), width, height);
        match canvas.save(&output.path) {
            Ok(()) => log::debug!("overlay written to {}", output.path.display()),
            Err(e) => log::warn!("failed to write overlay {}: {}", output.path.display(), e),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.current.as_ref()
    }

    /// Items to draw for `viewport`, in detection order.
    pub fn items(&self, viewport: ViewportSize) -> Vec<OverlayItem> {
        let Some(result) = &self.current else {
            return Vec::new();
        };
        if result.detections().is_empty() {
            return Vec::new();
        }
        let mapper = CoordinateMapper::for_context(result.context(), viewport);
        result
            .detections()
            .iter()
            .map(|detection| {
                let rect = mapper.map(detection.bbox());
                OverlayItem {
                    rect,
                    label: format_label(detection),
                    label_anchor: (rect.left, rect.top - LABEL_OFFSET_PX),
                }
            })
            .collect()
    }
}

/// Draw item outlines on a transparent `width`x`height` canvas.
///
/// Labels are not rasterised; text rendering belongs to the display layer.
pub fn draw_overlay(items: &[OverlayItem], width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    for item in items {
        if let Some(px) = clamp_box(&item.rect, width, height) {
            draw_rect(&mut canvas, px, BOX_COLOR, BOX_THICKNESS);
        }
    }
    canvas
}

fn clamp_box(rect: &BoundingBox, width: u32, height: u32) -> Option<[u32; 4]> {
    if width == 0 || height == 0 {
        return None;
    }
    if rect.right < 0.0 || rect.bottom < 0.0 || rect.left >= width as f32 || rect.top >= height as f32
    {
        return None;
    }
    let clamp = |v: f32, max: u32| -> u32 { v.max(0.0).min((max - 1) as f32) as u32 };
    let x0 = clamp(rect.left, width);
    let y0 = clamp(rect.top, height);
    let x1 = clamp(rect.right, width);
    let y1 = clamp(rect.bottom, height);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some([x0, y0, x1, y1])
}

fn draw_rect(img: &mut RgbaImage, bbox_px: [u32; 4], color: Rgba<u8>, thickness: u32) {
    let [x0, y0, x1, y1] = bbox_px;
    for t in 0..thickness {
        let xx0 = x0.saturating_add(t);
        let yy0 = y0.saturating_add(t);
        let xx1 = x1.saturating_sub(t);
        let yy1 = y1.saturating_sub(t);
        if xx0 > xx1 || yy0 > yy1 {
            break;
        }
        for x in xx0..=xx1 {
            img.put_pixel(x, yy0, color);
            img.put_pixel(x, yy1, color);
        }
        for y in yy0..=yy1 {
            img.put_pixel(xx0, y, color);
            img.put_pixel(xx1, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Rotation;
    use crate::normalize::FrameContext;

    fn detection(class: &str, confidence: f32, bbox: BoundingBox) -> Detection {
        Detection::new(class, confidence, bbox)
    }

    #[test]
    fn label_has_one_decimal() {
        let d = detection("Sampah B3", 0.8765, BoundingBox::default());
        assert_eq!(format_label(&d), "Sampah B3: 87.7%");
    }

    #[test]
    fn summary_for_empty_list() {
        assert_eq!(summarize(&[]), "No waste detected.");
    }

    #[test]
    fn summary_lists_every_detection() {
        let detections = vec![
            detection("Sampah Organik", 0.5, BoundingBox::default()),
            detection("Sampah B3", 0.25, BoundingBox::default()),
        ];
        let summary = summarize(&detections);
        assert!(summary.contains("Objects: 2"));
        assert!(summary.contains("• Sampah Organik (50.0%)"));
        assert!(summary.contains("• Sampah B3 (25.0%)"));
    }

    #[test]
    fn items_follow_detection_order_and_anchor_above() {
        let mut state = OverlayState::new();
        let context = FrameContext::new(100, 200, Rotation::Deg0);
        state.apply(AnalysisResult::new(
            vec![
                detection("a", 0.9, BoundingBox::new(0.0, 0.0, 100.0, 200.0)),
                detection("b", 0.1, BoundingBox::new(0.0, 0.0, 50.0, 50.0)),
            ],
            context,
        ));
        let items = state.items(ViewportSize::new(400.0, 400.0));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].rect, BoundingBox::new(100.0, 0.0, 300.0, 400.0));
        assert_eq!(items[0].label_anchor, (100.0, -10.0));
        assert_eq!(items[1].label, "b: 10.0%");
    }

    #[test]
    fn reset_clears_items() {
        let mut state = OverlayState::new();
        state.apply(AnalysisResult::new(
            vec![detection("a", 0.9, BoundingBox::new(1.0, 1.0, 2.0, 2.0))],
            FrameContext::new(10, 10, Rotation::Deg0),
        ));
        state.reset();
        assert!(state.items(ViewportSize::new(10.0, 10.0)).is_empty());
        let result = state.result().expect("reset result");
        assert_eq!(*result.context(), FrameContext::default());
    }

    #[test]
    fn output_file_is_cleared_on_reset() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("overlay.png");
        let mut state = OverlayState::new().with_output(&path, ViewportSize::new(40.0, 40.0));
        state.apply(AnalysisResult::new(
            vec![detection("a", 0.9, BoundingBox::new(0.0, 0.0, 20.0, 20.0))],
            FrameContext::new(40, 40, Rotation::Deg0),
        ));
        let drawn = image::open(&path).expect("overlay png").to_rgba8();
        assert_eq!(drawn.dimensions(), (40, 40));
        assert_eq!(*drawn.get_pixel(0, 0), BOX_COLOR);

        state.reset();
        let cleared = image::open(&path).expect("overlay png").to_rgba8();
        assert!(cleared.pixels().all(|px| px[3] == 0));
    }

    #[test]
    fn outlines_are_drawn_and_clamped() {
        let items = vec![OverlayItem {
            rect: BoundingBox::new(-5.0, 2.0, 30.0, 40.0),
            label: String::new(),
            label_anchor: (0.0, 0.0),
        }];
        let canvas = draw_overlay(&items, 20, 20);
        assert_eq!(*canvas.get_pixel(0, 10), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(19, 19), BOX_COLOR);
        assert_eq!(canvas.get_pixel(10, 11)[3], 0);
    }
}
