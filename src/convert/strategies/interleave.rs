use anyhow::{anyhow, Result};

use crate::codec::{decode_jpeg, encode_jpeg, CONVERSION_JPEG_QUALITY};
use crate::convert::strategy::{ensure_dimensions, ConversionStrategy};
use crate::convert::yuv::{nv21_to_rgb, pack_nv21};
use crate::frame::{PlanarImage, RasterImage};

/// Repack to NV21, push through a JPEG encode at fixed quality and decode the
/// result. The JPEG codec absorbs colour-space handling; stride quirks are
/// absorbed by the repack.
pub struct InterleaveJpegStrategy {
    quality: u8,
}

impl InterleaveJpegStrategy {
    pub fn new() -> Self {
        Self::with_quality(CONVERSION_JPEG_QUALITY)
    }

    pub fn with_quality(quality: u8) -> Self {
        Self { quality }
    }
}

impl Default for InterleaveJpegStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionStrategy for InterleaveJpegStrategy {
    fn name(&self) -> &'static str {
        "nv21-jpeg"
    }

    fn convert(&self, frame: &PlanarImage) -> Result<RasterImage> {
        ensure_dimensions(frame)?;
        let nv21 = pack_nv21(frame)?;
        let rgb = nv21_to_rgb(&nv21, frame.width, frame.height)?;
        let packed = RasterImage::from_raw(frame.width, frame.height, rgb)
            .ok_or_else(|| anyhow!("rgb buffer does not match frame dimensions"))?;
        let jpeg = encode_jpeg(&packed, self.quality)?;
        let decoded = decode_jpeg(&jpeg)?;
        if decoded.dimensions() != (frame.width, frame.height) {
            return Err(anyhow!(
                "jpeg decode produced {}x{}, expected {}x{}",
                decoded.width(),
                decoded.height(),
                frame.width,
                frame.height
            ));
        }
        Ok(decoded)
    }
}
