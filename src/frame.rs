//! Camera frame types.
//!
//! - `PlanarImage`: YUV 4:2:0 frame as delivered by the sensor, one `Plane` per
//!   component, each with its own row and pixel stride.
//! - `RasterImage`: decoded RGB buffer produced by the converter.
//! - `Rotation`: clockwise sensor rotation reported alongside each frame.
//!
//! Plane data is never assumed to be tightly packed. Every read goes through
//! `Plane::sample`, which applies the plane's strides and bounds-checks the
//! resulting offset.

use anyhow::{anyhow, Result};
use image::RgbImage;

/// Decoded RGB pixel buffer.
pub type RasterImage = RgbImage;

/// One component plane of a planar YUV frame.
#[derive(Clone, Debug)]
pub struct Plane {
    pub data: Vec<u8>,
    /// Bytes to advance one row.
    pub row_stride: usize,
    /// Bytes between successive samples in a row.
    pub pixel_stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// Byte offset of the sample at (`row`, `col`), or `None` on overflow.
    pub fn offset(&self, row: usize, col: usize) -> Option<usize> {
        row.checked_mul(self.row_stride)?
            .checked_add(col.checked_mul(self.pixel_stride)?)
    }

    /// Sample at (`row`, `col`), or `None` when the offset falls outside the buffer.
    pub fn sample(&self, row: usize, col: usize) -> Option<u8> {
        self.offset(row, col)
            .and_then(|index| self.data.get(index).copied())
    }
}

/// YUV 4:2:0 frame with independently strided planes.
///
/// U and V are sub-sampled by two in both axes; odd dimensions round up.
#[derive(Clone, Debug)]
pub struct PlanarImage {
    pub width: u32,
    pub height: u32,
    pub y: Plane,
    pub u: Plane,
    pub v: Plane,
}

impl PlanarImage {
    pub fn new(width: u32, height: u32, y: Plane, u: Plane, v: Plane) -> Self {
        Self {
            width,
            height,
            y,
            u,
            v,
        }
    }

    /// Build a frame from tightly packed I420 bytes (Y, then U, then V).
    pub fn from_i420(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let expected = i420_frame_len(width, height)?;
        if bytes.len() != expected {
            return Err(anyhow!(
                "I420 frame length mismatch: expected {}, got {}",
                expected,
                bytes.len()
            ));
        }
        let w = width as usize;
        let luma_len = w * height as usize;
        let cw = chroma_len(width);
        let chroma_plane = cw * chroma_len(height);

        let (y, rest) = bytes.split_at(luma_len);
        let (u, v) = rest.split_at(chroma_plane);
        Ok(Self::new(
            width,
            height,
            Plane::new(y.to_vec(), w, 1),
            Plane::new(u.to_vec(), cw, 1),
            Plane::new(v.to_vec(), cw, 1),
        ))
    }

    /// Width of the U/V planes in samples.
    pub fn chroma_width(&self) -> u32 {
        chroma_len(self.width) as u32
    }

    /// Height of the U/V planes in samples.
    pub fn chroma_height(&self) -> u32 {
        chroma_len(self.height) as u32
    }
}

/// Byte length of one tightly packed I420 frame.
pub fn i420_frame_len(width: u32, height: u32) -> Result<usize> {
    let luma = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| anyhow!("I420 frame dimensions overflow"))?;
    let chroma = chroma_len(width)
        .checked_mul(chroma_len(height))
        .and_then(|v| v.checked_mul(2))
        .ok_or_else(|| anyhow!("I420 frame dimensions overflow"))?;
    luma.checked_add(chroma)
        .ok_or_else(|| anyhow!("I420 frame dimensions overflow"))
}

pub(crate) fn chroma_len(len: u32) -> usize {
    (len as usize).div_ceil(2)
}

/// Clockwise rotation of the sensor image relative to the display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Map sensor degrees to a rotation. Anything outside {0, 90, 180, 270}
    /// is treated as no rotation.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            0 => Rotation::Deg0,
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            270 => Rotation::Deg270,
            other => {
                log::debug!("unsupported rotation {}°, using 0°", other);
                Rotation::Deg0
            }
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True when the rotation exchanges width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }
}
