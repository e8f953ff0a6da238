//! Detection-space to viewport-space box mapping.
//!
//! Boxes come back from the detection service against the un-rotated source
//! frame. `CoordinateMapper` applies the sensor rotation, then a uniform
//! fit-to-viewport scale and a centring offset, so overlays line up with a
//! letterboxed preview of any aspect ratio.

use crate::frame::Rotation;
use crate::normalize::FrameContext;

/// Axis-aligned rectangle. Which coordinate space it lives in is up to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box from a centre point and a size.
    pub fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(
            x - width / 2.0,
            y - height / 2.0,
            x + width / 2.0,
            y + height / 2.0,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// On-screen preview size in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Rotate a box expressed against a `width`x`height` frame.
pub fn rotate_box(bbox: &BoundingBox, width: f32, height: f32, rotation: Rotation) -> BoundingBox {
    let b = bbox;
    match rotation {
        Rotation::Deg0 => *b,
        Rotation::Deg90 => BoundingBox::new(height - b.bottom, b.left, height - b.top, b.right),
        Rotation::Deg180 => BoundingBox::new(
            width - b.right,
            height - b.bottom,
            width - b.left,
            height - b.top,
        ),
        Rotation::Deg270 => BoundingBox::new(b.top, width - b.right, b.bottom, width - b.left),
    }
}

/// Maps boxes from one source frame into one viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    source_width: f32,
    source_height: f32,
    rotation: Rotation,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl CoordinateMapper {
    /// `source_width`/`source_height` are the un-rotated frame dimensions.
    pub fn new(
        source_width: f32,
        source_height: f32,
        rotation: Rotation,
        viewport: ViewportSize,
    ) -> Self {
        let (effective_width, effective_height) = if rotation.swaps_axes() {
            (source_height, source_width)
        } else {
            (source_width, source_height)
        };

        // Degenerate sources map without scaling.
        let (scale, offset_x, offset_y) = if effective_width > 0.0 && effective_height > 0.0 {
            let scale =
                (viewport.width / effective_width).min(viewport.height / effective_height);
            (
                scale,
                (viewport.width - effective_width * scale) / 2.0,
                (viewport.height - effective_height * scale) / 2.0,
            )
        } else {
            (1.0, 0.0, 0.0)
        };

        Self {
            source_width,
            source_height,
            rotation,
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Mapper for boxes returned for the frame described by `context`.
    pub fn for_context(context: &FrameContext, viewport: ViewportSize) -> Self {
        let (width, height) = context.source_dimensions();
        Self::new(width as f32, height as f32, context.rotation(), viewport)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    pub fn map(&self, bbox: &BoundingBox) -> BoundingBox {
        let rotated = rotate_box(bbox, self.source_width, self.source_height, self.rotation);
        BoundingBox::new(
            rotated.left * self.scale + self.offset_x,
            rotated.top * self.scale + self.offset_y,
            rotated.right * self.scale + self.offset_x,
            rotated.bottom * self.scale + self.offset_y,
        )
    }
}

/// One-shot mapping with raw sensor degrees. Unsupported degrees map as 0°.
pub fn map_box(
    bbox: &BoundingBox,
    source_width: f32,
    source_height: f32,
    rotation_degrees: i32,
    viewport_width: f32,
    viewport_height: f32,
) -> BoundingBox {
    CoordinateMapper::new(
        source_width,
        source_height,
        Rotation::from_degrees(rotation_degrees),
        ViewportSize::new(viewport_width, viewport_height),
    )
    .map(bbox)
}
