//! Inference-image normalisation.
//!
//! Rotates the converted raster upright, then resizes it to fit a fixed square
//! edge while keeping the aspect ratio. The `FrameContext` returned alongside
//! the image records exactly what was sent for inference; overlay mapping
//! depends on it.

use anyhow::{anyhow, Result};
use image::imageops::{self, FilterType};

use crate::frame::{RasterImage, Rotation};

/// Square edge length of the inference input.
pub const DEFAULT_INPUT_SIZE: u32 = 416;

/// Dimensions and rotation of the image that was actually sent for inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameContext {
    inference_width: u32,
    inference_height: u32,
    rotation: Rotation,
}

impl FrameContext {
    pub(crate) fn new(inference_width: u32, inference_height: u32, rotation: Rotation) -> Self {
        Self {
            inference_width,
            inference_height,
            rotation,
        }
    }

    pub fn inference_width(&self) -> u32 {
        self.inference_width
    }

    pub fn inference_height(&self) -> u32 {
        self.inference_height
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Inference dimensions with the rotation undone, i.e. the frame that
    /// detection boxes are expressed against.
    pub fn source_dimensions(&self) -> (u32, u32) {
        if self.rotation.swaps_axes() {
            (self.inference_height, self.inference_width)
        } else {
            (self.inference_width, self.inference_height)
        }
    }
}

impl Default for FrameContext {
    /// The 1x1, unrotated context used when the overlay is reset.
    fn default() -> Self {
        Self::new(1, 1, Rotation::Deg0)
    }
}

/// Inference image plus the context describing it.
#[derive(Debug)]
pub struct NormalizedFrame {
    pub image: RasterImage,
    pub context: FrameContext,
}

pub struct FrameNormalizer {
    input_size: u32,
    filter: FilterType,
}

impl FrameNormalizer {
    pub fn new(input_size: u32) -> Self {
        Self {
            input_size,
            filter: FilterType::CatmullRom,
        }
    }

    pub fn normalize(&self, image: RasterImage, rotation: Rotation) -> Result<NormalizedFrame> {
        if image.width() == 0 || image.height() == 0 {
            return Err(anyhow!(
                "cannot normalise an empty {}x{} image",
                image.width(),
                image.height()
            ));
        }
        if self.input_size == 0 {
            return Err(anyhow!("inference input size must be greater than zero"));
        }

        let rotated = match rotation {
            Rotation::Deg0 => image,
            Rotation::Deg90 => imageops::rotate90(&image),
            Rotation::Deg180 => imageops::rotate180(&image),
            Rotation::Deg270 => imageops::rotate270(&image),
        };
        let (width, height) =
            target_dimensions(rotated.width(), rotated.height(), self.input_size);
        let resized = imageops::resize(&rotated, width, height, self.filter);

        log::debug!(
            "normalised {}x{} (rotation {}°) to {}x{}",
            rotated.width(),
            rotated.height(),
            rotation.degrees(),
            width,
            height
        );
        Ok(NormalizedFrame {
            image: resized,
            context: FrameContext::new(width, height, rotation),
        })
    }
}

impl Default for FrameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}

/// Fit `width`x`height` into a square of edge `size`, keeping the aspect ratio.
/// The shorter side is truncated and never drops below one pixel.
pub fn target_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    let aspect = width as f32 / height as f32;
    if width > height {
        (size, ((size as f32 / aspect) as u32).max(1))
    } else {
        (((size as f32 * aspect) as u32).max(1), size)
    }
}
