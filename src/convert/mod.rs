//! YUV 4:2:0 to RGB conversion.
//!
//! `PixelConverter` holds an ordered list of strategies and returns the first
//! raster any of them produces:
//! 1. `InterleaveJpegStrategy`: NV21 repack, JPEG encode at quality 85, decode.
//! 2. `DirectRgbStrategy`: per-pixel BT.601 math on the strided planes.
//! 3. `GrayscaleStrategy`: luma only.
//!
//! Conversion never fails loudly. A frame no strategy can handle is reported
//! as `None`, which callers treat as a skipped tick.

pub mod strategies;
mod strategy;
mod yuv;

pub use strategies::{DirectRgbStrategy, GrayscaleStrategy, InterleaveJpegStrategy};
pub use strategy::ConversionStrategy;

use crate::frame::{PlanarImage, RasterImage};

/// A raster together with the strategy that produced it.
#[derive(Debug)]
pub struct Conversion {
    pub image: RasterImage,
    pub strategy: &'static str,
}

/// Ordered fallback chain of conversion strategies.
pub struct PixelConverter {
    strategies: Vec<Box<dyn ConversionStrategy>>,
}

impl PixelConverter {
    /// Standard three-tier chain.
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(InterleaveJpegStrategy::new()),
            Box::new(DirectRgbStrategy::new()),
            Box::new(GrayscaleStrategy::new()),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ConversionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Strategy names in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn convert(&self, frame: &PlanarImage) -> Option<RasterImage> {
        self.convert_labeled(frame).map(|conversion| conversion.image)
    }

    /// Like `convert`, but also reports which strategy succeeded.
    pub fn convert_labeled(&self, frame: &PlanarImage) -> Option<Conversion> {
        log::debug!(
            "frame {}x{}, Y stride: row={} pixel={}, UV stride: row={} pixel={}",
            frame.width,
            frame.height,
            frame.y.row_stride,
            frame.y.pixel_stride,
            frame.u.row_stride,
            frame.u.pixel_stride
        );
        for strategy in &self.strategies {
            match strategy.convert(frame) {
                Ok(image) => {
                    log::debug!(
                        "converted using {}: {}x{}",
                        strategy.name(),
                        image.width(),
                        image.height()
                    );
                    return Some(Conversion {
                        image,
                        strategy: strategy.name(),
                    });
                }
                Err(err) => {
                    log::warn!("{} conversion failed: {:#}", strategy.name(), err);
                }
            }
        }
        log::error!("all conversion strategies failed");
        None
    }
}

impl Default for PixelConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Plane;
    use anyhow::{anyhow, Result};

    struct Failing;

    impl ConversionStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn convert(&self, _frame: &PlanarImage) -> Result<RasterImage> {
            Err(anyhow!("always fails"))
        }
    }

    fn gray_frame(width: u32, height: u32) -> PlanarImage {
        let cw = width.div_ceil(2) as usize;
        let ch = height.div_ceil(2) as usize;
        PlanarImage::new(
            width,
            height,
            Plane::new(vec![100; (width * height) as usize], width as usize, 1),
            Plane::new(vec![128; cw * ch], cw, 1),
            Plane::new(vec![128; cw * ch], cw, 1),
        )
    }

    #[test]
    fn default_chain_order() {
        assert_eq!(
            PixelConverter::new().strategy_names(),
            vec!["nv21-jpeg", "direct-rgb", "grayscale"]
        );
    }

    #[test]
    fn well_formed_frame_uses_primary_strategy() {
        let conversion = PixelConverter::new()
            .convert_labeled(&gray_frame(16, 8))
            .expect("conversion");
        assert_eq!(conversion.strategy, "nv21-jpeg");
        assert_eq!(conversion.image.dimensions(), (16, 8));
    }

    #[test]
    fn short_chroma_falls_back_to_direct() {
        let mut frame = gray_frame(8, 8);
        frame.v.data.truncate(3);
        let conversion = PixelConverter::new()
            .convert_labeled(&frame)
            .expect("conversion");
        assert_eq!(conversion.strategy, "direct-rgb");
        assert_eq!(conversion.image.get_pixel(0, 0).0, [100, 100, 100]);
    }

    #[test]
    fn short_luma_falls_back_to_grayscale() {
        let mut frame = gray_frame(8, 8);
        frame.y.data.truncate(60);
        let conversion = PixelConverter::new()
            .convert_labeled(&frame)
            .expect("conversion");
        assert_eq!(conversion.strategy, "grayscale");
        assert_eq!(conversion.image.get_pixel(7, 7).0, [0, 0, 0]);
    }

    #[test]
    fn empty_frame_yields_none() {
        assert!(PixelConverter::new().convert(&gray_frame(0, 0)).is_none());
    }

    #[test]
    fn oversized_declaration_yields_none() {
        let mut frame = gray_frame(4, 4);
        frame.width = 200_000;
        frame.height = 200_000;
        assert!(PixelConverter::new().convert(&frame).is_none());
    }

    #[test]
    fn custom_chain_skips_failures() {
        let converter = PixelConverter::with_strategies(vec![
            Box::new(Failing),
            Box::new(GrayscaleStrategy::new()),
        ]);
        let conversion = converter
            .convert_labeled(&gray_frame(4, 4))
            .expect("conversion");
        assert_eq!(conversion.strategy, "grayscale");
    }
}
