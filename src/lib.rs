//! Waste Scan
//!
//! Camera-driven waste classification. Live YUV frames are converted to RGB,
//! rotated upright and fitted into the square inference size, uploaded to a
//! remote object-detection workflow, and the returned boxes are mapped back
//! onto the preview viewport with their readable class labels.
//!
//! # Module Structure
//!
//! - `frame`: Planar YUV frames, raster images and sensor rotation
//! - `convert`: YUV 4:2:0 to RGB with ordered fallback strategies
//! - `normalize`: Rotation and letterbox-free fit to the inference size
//! - `geometry`: Bounding boxes and inference-to-viewport mapping
//! - `codec`: JPEG and base64 helpers
//! - `detect`: Detection client trait, wire format and class remapping
//! - `pipeline`: Single-flight, throttled analysis of incoming frames
//! - `overlay`: Render sink for the latest result
//! - `ingest`: Frame sources (synthetic camera, raw I420 files)
//! - `config`, `ui`: Runtime configuration and terminal status output

pub mod codec;
pub mod config;
pub mod convert;
pub mod detect;
pub mod frame;
pub mod geometry;
pub mod ingest;
pub mod normalize;
pub mod overlay;
pub mod pipeline;
pub mod ui;

pub use convert::{ConversionStrategy, PixelConverter};
pub use detect::{Detection, DetectionClient};
pub use frame::{PlanarImage, Plane, RasterImage, Rotation};
pub use geometry::{map_box, BoundingBox, CoordinateMapper, ViewportSize};
pub use normalize::{FrameContext, FrameNormalizer, NormalizedFrame};
pub use pipeline::{AnalysisGate, AnalysisResult, Analyzer, FrameOutcome, UiEvent};
