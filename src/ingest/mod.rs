//! Frame sources.
//!
//! Sources produce `CapturedFrame`s: a planar YUV 4:2:0 frame plus the sensor
//! rotation reported with it.
//! - Synthetic camera (`stub://...`): padded, semi-planar frames for tests and demos
//! - Raw I420 files: consecutive tightly packed frames of a known size
//!
//! Sources never convert or retain frames; ownership passes to the caller on
//! every `next_frame`.

pub mod file;
mod source;
pub mod synthetic;

pub use file::RawFileSource;
pub use source::{CameraConfig, CameraSource, CapturedFrame, SourceStats};
pub use synthetic::SyntheticSource;
