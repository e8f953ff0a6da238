use anyhow::{anyhow, Result};
use image::Rgb;

use crate::convert::strategy::{ensure_dimensions, ConversionStrategy};
use crate::frame::{PlanarImage, RasterImage};

const NEUTRAL_CHROMA: i32 = 128;

/// Per-pixel BT.601 conversion straight from the strided planes.
///
/// Chroma samples outside the U or V buffer fall back to neutral gray.
/// A luma sample outside the Y buffer fails the conversion.
#[derive(Default)]
pub struct DirectRgbStrategy;

impl DirectRgbStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ConversionStrategy for DirectRgbStrategy {
    fn name(&self) -> &'static str {
        "direct-rgb"
    }

    fn convert(&self, frame: &PlanarImage) -> Result<RasterImage> {
        ensure_dimensions(frame)?;
        let mut image = RasterImage::new(frame.width, frame.height);
        for row in 0..frame.height {
            for col in 0..frame.width {
                let (r, c) = (row as usize, col as usize);
                let y = frame
                    .y
                    .sample(r, c)
                    .ok_or_else(|| anyhow!("luma sample out of range at ({}, {})", r, c))?
                    as i32;
                let (u, v) = match (frame.u.sample(r / 2, c / 2), frame.v.sample(r / 2, c / 2)) {
                    (Some(u), Some(v)) => (u as i32, v as i32),
                    _ => (NEUTRAL_CHROMA, NEUTRAL_CHROMA),
                };
                image.put_pixel(col, row, Rgb(yuv_to_rgb(y, u, v)));
            }
        }
        Ok(image)
    }
}

fn yuv_to_rgb(y: i32, u: i32, v: i32) -> [u8; 3] {
    let u = (u - NEUTRAL_CHROMA) as f64;
    let v = (v - NEUTRAL_CHROMA) as f64;
    let y = y as f64;
    [
        truncate_to_u8(y + 1.402 * v),
        truncate_to_u8(y - 0.344 * u - 0.714 * v),
        truncate_to_u8(y + 1.772 * u),
    ]
}

fn truncate_to_u8(value: f64) -> u8 {
    (value as i32).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Plane;

    #[test]
    fn missing_chroma_is_neutral() -> Result<()> {
        let frame = PlanarImage::new(
            2,
            2,
            Plane::new(vec![50, 60, 70, 80], 2, 1),
            Plane::new(Vec::new(), 1, 1),
            Plane::new(Vec::new(), 1, 1),
        );
        let image = DirectRgbStrategy::new().convert(&frame)?;
        assert_eq!(image.get_pixel(0, 0).0, [50, 50, 50]);
        assert_eq!(image.get_pixel(1, 1).0, [80, 80, 80]);
        Ok(())
    }

    #[test]
    fn saturated_red_clamps() {
        assert_eq!(yuv_to_rgb(200, 128, 255), [255, 109, 200]);
        assert_eq!(yuv_to_rgb(0, 255, 128), [0, 0, 225]);
    }

    #[test]
    fn short_luma_fails() {
        let frame = PlanarImage::new(
            2,
            2,
            Plane::new(vec![1, 2, 3], 2, 1),
            Plane::new(vec![128], 1, 1),
            Plane::new(vec![128], 1, 1),
        );
        assert!(DirectRgbStrategy::new().convert(&frame).is_err());
    }
}
