use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::detect::client::DetectionClient;
use crate::detect::result::Detection;
use crate::geometry::BoundingBox;

/// Stub client for tests and offline runs. Returns the same detections for
/// every image and counts calls.
pub struct StubDetectionClient {
    detections: Vec<Detection>,
    calls: AtomicU64,
}

impl StubDetectionClient {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            calls: AtomicU64::new(0),
        }
    }

    /// A single mid-frame "organik" detection sized for a 416-edge input.
    pub fn sample() -> Self {
        Self::new(vec![Detection::new(
            "Sampah Organik",
            0.87,
            BoundingBox::from_center(208.0, 156.0, 120.0, 90.0),
        )])
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StubDetectionClient {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl DetectionClient for StubDetectionClient {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&self, _encoded_image: &str) -> Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }
}
