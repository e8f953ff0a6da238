//! Raw I420 file source.
//!
//! Reads consecutive tightly packed I420 frames of the configured size from a
//! local file (for example the output of
//! `ffmpeg -i clip.mp4 -pix_fmt yuv420p -f rawvideo clip.yuv`).
//!
//! The file source MUST NOT fetch remote URLs or write frames back to disk.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};

use super::source::{CameraConfig, CapturedFrame, SourceStats};
use crate::frame::{i420_frame_len, PlanarImage};

pub struct RawFileSource {
    config: CameraConfig,
    reader: Option<BufReader<File>>,
    frame_count: u64,
    exhausted: bool,
}

impl RawFileSource {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            reader: None,
            frame_count: 0,
            exhausted: false,
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        let file = File::open(&self.config.uri)
            .with_context(|| format!("failed to open raw frame file {}", self.config.uri))?;
        self.reader = Some(BufReader::new(file));
        self.exhausted = false;
        log::info!(
            "CameraSource: reading {}x{} I420 frames from {}",
            self.config.width,
            self.config.height,
            self.config.uri
        );
        Ok(())
    }

    /// Next frame, or `None` at end of file. A trailing partial frame is an error.
    pub fn next_frame(&mut self) -> Result<Option<CapturedFrame>> {
        let frame_len = i420_frame_len(self.config.width, self.config.height)?;
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| anyhow!("raw frame file not connected"))?;

        let mut buffer = vec![0u8; frame_len];
        let mut filled = 0;
        while filled < frame_len {
            match reader.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to read {}", self.config.uri))
                }
            }
        }
        if filled == 0 {
            self.exhausted = true;
            return Ok(None);
        }
        if filled < frame_len {
            self.exhausted = true;
            return Err(anyhow!(
                "truncated frame in {}: expected {} bytes, got {}",
                self.config.uri,
                frame_len,
                filled
            ));
        }

        self.frame_count += 1;
        let image = PlanarImage::from_i420(self.config.width, self.config.height, &buffer)?;
        Ok(Some(CapturedFrame {
            image,
            rotation: self.config.rotation,
        }))
    }

    pub fn is_healthy(&self) -> bool {
        self.reader.is_some() && !self.exhausted
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            uri: self.config.uri.clone(),
        }
    }
}
