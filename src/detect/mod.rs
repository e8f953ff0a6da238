//! Remote object detection.
//!
//! - `DetectionClient`: the seam between the pipeline and whatever runs inference.
//! - `HttpDetectionClient`: JSON-over-HTTPS workflow client.
//! - `StubDetectionClient`: canned results for tests and offline runs.
//! - `wire`: request body and response parsing for the workflow API.

mod classes;
mod client;
pub mod clients;
mod result;
pub mod wire;

pub use classes::readable_class_name;
pub use client::DetectionClient;
pub use clients::{HttpDetectionClient, StubDetectionClient};
pub use result::Detection;
