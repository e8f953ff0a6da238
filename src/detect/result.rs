use crate::geometry::BoundingBox;

/// One detected object. The box is in raw-detection-space.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    class_name: String,
    confidence: f32,
    bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Confidence in 0..=1.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}
