use anyhow::Result;

use super::result::Detection;

/// Detection client trait.
///
/// `detect` is called from a short-lived network thread, never from the UI
/// loop, so implementations may block for as long as their transport allows.
pub trait DetectionClient: Send + Sync {
    /// Client identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a base64-encoded JPEG.
    ///
    /// Boxes in the result are in the pixel space of the submitted image.
    fn detect(&self, encoded_image: &str) -> Result<Vec<Detection>>;
}
