//! Synthetic camera (`stub://`).
//!
//! Frames mimic what a phone camera hands over: luma rows padded past the
//! visible width and semi-planar chroma, where the U and V planes are two
//! views into one interleaved buffer with a pixel stride of 2.

use anyhow::Result;

use super::source::{CameraConfig, CapturedFrame, SourceStats};
use crate::frame::{chroma_len, PlanarImage, Plane};

/// Row alignment of the synthetic sensor, in bytes.
const ROW_ALIGNMENT: usize = 64;

pub struct SyntheticSource {
    config: CameraConfig,
    frame_count: u64,
    scene_state: u8,
}

impl SyntheticSource {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            scene_state: 0,
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        log::info!(
            "CameraSource: connected to {} (synthetic, {}x{}, {}°)",
            self.config.uri,
            self.config.width,
            self.config.height,
            self.config.rotation.degrees()
        );
        Ok(())
    }

    pub fn next_frame(&mut self) -> Result<CapturedFrame> {
        self.frame_count += 1;
        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }
        Ok(CapturedFrame {
            image: self.generate_frame(),
            rotation: self.config.rotation,
        })
    }

    fn generate_frame(&self) -> PlanarImage {
        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let shift = self.frame_count.wrapping_add(self.scene_state as u64);

        let luma_stride = aligned(width);
        let mut luma = vec![0u8; luma_stride * height];
        for row in 0..height {
            for col in 0..width {
                luma[row * luma_stride + col] = ((row + col) as u64 + shift) as u8;
            }
        }

        let cw = chroma_len(self.config.width);
        let ch = chroma_len(self.config.height);
        let chroma_stride = aligned(cw * 2);
        let mut chroma = vec![128u8; chroma_stride * ch];
        for row in 0..ch {
            for col in 0..cw {
                let at = row * chroma_stride + col * 2;
                chroma[at] = (96 + (col % 64)) as u8;
                chroma[at + 1] = (160 - (row % 64)) as u8;
            }
        }
        let v_data = chroma[1..].to_vec();

        PlanarImage::new(
            self.config.width,
            self.config.height,
            Plane::new(luma, luma_stride, 1),
            Plane::new(chroma, chroma_stride, 2),
            Plane::new(v_data, chroma_stride, 2),
        )
    }

    pub fn is_healthy(&self) -> bool {
        true
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            uri: self.config.uri.clone(),
        }
    }
}

fn aligned(len: usize) -> usize {
    len.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT + ROW_ALIGNMENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Rotation;

    fn source(width: u32, height: u32) -> SyntheticSource {
        SyntheticSource::new(CameraConfig {
            uri: "stub://test".to_string(),
            width,
            height,
            rotation: Rotation::Deg270,
        })
    }

    #[test]
    fn rows_are_padded() -> Result<()> {
        let mut source = source(100, 60);
        let frame = source.next_frame()?;
        assert_eq!(frame.rotation, Rotation::Deg270);
        assert!(frame.image.y.row_stride > 100);
        assert_eq!(frame.image.u.pixel_stride, 2);
        assert_eq!(frame.image.v.pixel_stride, 2);
        Ok(())
    }

    #[test]
    fn chroma_planes_share_one_interleaved_buffer() -> Result<()> {
        let mut source = source(7, 5);
        let frame = source.next_frame()?.image;
        assert_eq!(frame.u.data[1..], frame.v.data[..]);
        let last_row = frame.chroma_height() as usize - 1;
        let last_col = frame.chroma_width() as usize - 1;
        assert!(frame.u.sample(last_row, last_col).is_some());
        assert!(frame.v.sample(last_row, last_col).is_some());
        Ok(())
    }

    #[test]
    fn frames_change_over_time() -> Result<()> {
        let mut source = source(16, 16);
        let first = source.next_frame()?.image;
        let second = source.next_frame()?.image;
        assert_ne!(first.y.data, second.y.data);
        assert_eq!(source.stats().frames_captured, 2);
        Ok(())
    }
}
