use anyhow::{anyhow, Result};

use super::file::RawFileSource;
use super::synthetic::SyntheticSource;
use crate::frame::{PlanarImage, Rotation};

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// `stub://<name>` for the synthetic camera, otherwise a local file path.
    pub uri: String,
    pub width: u32,
    pub height: u32,
    /// Sensor rotation reported with every frame.
    pub rotation: Rotation,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            uri: "stub://camera".to_string(),
            width: 640,
            height: 480,
            rotation: Rotation::Deg90,
        }
    }
}

/// One frame as handed over by a source.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub image: PlanarImage,
    pub rotation: Rotation,
}

/// Statistics for a camera source.
#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub uri: String,
}

/// Camera source. Dispatches to the synthetic camera for `stub://` URIs and
/// to the raw file reader for local paths.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticSource),
    File(RawFileSource),
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(anyhow!(
                "camera dimensions must be non-zero, got {}x{}",
                config.width,
                config.height
            ));
        }
        if config.uri.starts_with("stub://") {
            return Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticSource::new(config)),
            });
        }
        if !is_local_file_path(&config.uri) {
            return Err(anyhow!(
                "camera source must be stub:// or a local file path, got '{}'",
                config.uri
            ));
        }
        Ok(Self {
            backend: CameraBackend::File(RawFileSource::new(config)),
        })
    }

    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            CameraBackend::File(source) => source.connect(),
        }
    }

    /// Next frame, or `None` once the source is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<CapturedFrame>> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame().map(Some),
            CameraBackend::File(source) => source.next_frame(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_healthy(),
            CameraBackend::File(source) => source.is_healthy(),
        }
    }

    pub fn stats(&self) -> SourceStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            CameraBackend::File(source) => source.stats(),
        }
    }
}

fn is_local_file_path(path: &str) -> bool {
    !path.trim().is_empty() && !path.contains("://")
}
