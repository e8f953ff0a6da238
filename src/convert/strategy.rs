use anyhow::{anyhow, Result};

use crate::frame::{PlanarImage, RasterImage};

/// One way of turning a planar YUV frame into an RGB raster.
///
/// Strategies are tried in order by `PixelConverter`; an error from one
/// strategy only means the next one gets a turn.
pub trait ConversionStrategy: Send + Sync {
    /// Strategy identifier for logs.
    fn name(&self) -> &'static str;

    /// Convert a frame. Implementations must not panic on malformed planes.
    fn convert(&self, frame: &PlanarImage) -> Result<RasterImage>;
}

/// Reject frames whose declared size the luma plane cannot plausibly back.
///
/// Runs before any output buffer is allocated. The luma plane must reach the
/// last sample of the first row and the first sample of the last row, and
/// rows must not overlap, which bounds `width * height` by the buffer length.
/// A short final row is still accepted.
pub(crate) fn ensure_dimensions(frame: &PlanarImage) -> Result<()> {
    if frame.width == 0 || frame.height == 0 {
        return Err(anyhow!(
            "frame has empty dimensions {}x{}",
            frame.width,
            frame.height
        ));
    }
    let w = frame.width as usize;
    let h = frame.height as usize;
    let y = &frame.y;
    if w > 1 && y.pixel_stride == 0 {
        return Err(anyhow!("luma pixel stride is zero"));
    }
    if h > 1 {
        let min_row_stride = (w - 1)
            .checked_mul(y.pixel_stride)
            .and_then(|span| span.checked_add(1))
            .ok_or_else(|| anyhow!("luma row span overflows"))?;
        if y.row_stride < min_row_stride {
            return Err(anyhow!(
                "luma row stride {} is shorter than a {}-pixel row",
                y.row_stride,
                w
            ));
        }
    }
    let backed = |offset: Option<usize>| offset.is_some_and(|at| at < y.data.len());
    if !backed(y.offset(0, w - 1)) || !backed(y.offset(h - 1, 0)) {
        return Err(anyhow!(
            "luma plane of {} bytes cannot back a {}x{} frame",
            y.data.len(),
            frame.width,
            frame.height
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Plane;

    fn frame(width: u32, height: u32, luma: Plane) -> PlanarImage {
        PlanarImage::new(
            width,
            height,
            luma,
            Plane::new(Vec::new(), 1, 1),
            Plane::new(Vec::new(), 1, 1),
        )
    }

    #[test]
    fn huge_declared_size_over_tiny_plane_is_rejected() {
        let frame = frame(100_000, 100_000, Plane::new(vec![0; 16], 4, 1));
        assert!(ensure_dimensions(&frame).is_err());
    }

    #[test]
    fn overlapping_rows_are_rejected() {
        let frame = frame(4, 4, Plane::new(vec![0; 16], 1, 1));
        assert!(ensure_dimensions(&frame).is_err());
    }

    #[test]
    fn short_last_row_is_accepted() {
        let frame = frame(4, 2, Plane::new(vec![0; 5], 4, 1));
        assert!(ensure_dimensions(&frame).is_ok());
    }

    #[test]
    fn padded_rows_are_accepted() {
        let frame = frame(3, 3, Plane::new(vec![0; 8 * 3], 8, 2));
        assert!(ensure_dimensions(&frame).is_ok());
    }
}
