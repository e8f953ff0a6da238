use anyhow::Result;
use image::Rgb;

use crate::convert::strategy::{ensure_dimensions, ConversionStrategy};
use crate::frame::{PlanarImage, RasterImage};

/// Last resort: luma only, replicated into all three channels.
///
/// Pixels whose luma offset falls outside the Y buffer stay black.
#[derive(Default)]
pub struct GrayscaleStrategy;

impl GrayscaleStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ConversionStrategy for GrayscaleStrategy {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn convert(&self, frame: &PlanarImage) -> Result<RasterImage> {
        ensure_dimensions(frame)?;
        let mut image = RasterImage::new(frame.width, frame.height);
        for row in 0..frame.height {
            for col in 0..frame.width {
                if let Some(gray) = frame.y.sample(row as usize, col as usize) {
                    image.put_pixel(col, row, Rgb([gray, gray, gray]));
                }
            }
        }
        Ok(image)
    }
}
