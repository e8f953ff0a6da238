//! Frame analysis loop.
//!
//! The capture thread hands every frame to `Analyzer::on_frame`. Frames are
//! dropped, never queued, while a detection cycle is in flight or before the
//! minimum interval since the last analysed frame has elapsed. Accepted frames
//! are converted and normalised on the capture thread; the network call runs on
//! its own thread and reports back through a channel that the UI loop drains.
//!
//! The in-flight flag is owned by a `GatePermit`. Dropping the permit releases
//! the gate, so every exit path (conversion failure, normalisation failure,
//! network success or error) frees it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::codec::{encode_for_upload, UPLOAD_JPEG_QUALITY};
use crate::convert::PixelConverter;
use crate::detect::{Detection, DetectionClient};
use crate::frame::{PlanarImage, Rotation};
use crate::normalize::{FrameContext, FrameNormalizer};

pub const DEFAULT_ANALYSIS_INTERVAL: Duration = Duration::from_millis(1500);

const NEVER: u64 = u64::MAX;

/// Detections paired with the context of the frame they were computed for.
///
/// Only the pipeline builds these, from the context produced for the same
/// frame that was uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    detections: Vec<Detection>,
    context: FrameContext,
}

impl AnalysisResult {
    pub(crate) fn new(detections: Vec<Detection>, context: FrameContext) -> Self {
        Self {
            detections,
            context,
        }
    }

    /// No detections, 1x1 unrotated context.
    pub fn empty() -> Self {
        Self::new(Vec::new(), FrameContext::default())
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn context(&self) -> &FrameContext {
        &self.context
    }
}

/// Events for the UI loop.
#[derive(Debug)]
pub enum UiEvent {
    /// A frame was accepted and is being uploaded.
    Analyzing,
    Completed(AnalysisResult),
    /// The detection call failed; the message is suitable for display.
    Failed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateRejection {
    /// Less than the minimum interval since the last analysed frame.
    TooSoon,
    /// A detection cycle is still in flight.
    InFlight,
}

/// Single-flight gate with a minimum interval between analysed frames.
#[derive(Debug)]
pub struct AnalysisGate {
    in_flight: AtomicBool,
    /// Milliseconds since `epoch` of the last accepted frame, or `NEVER`.
    last_analyzed_ms: AtomicU64,
    min_interval: Duration,
    epoch: Instant,
}

impl AnalysisGate {
    pub fn new(min_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicBool::new(false),
            last_analyzed_ms: AtomicU64::new(NEVER),
            min_interval,
            epoch: Instant::now(),
        })
    }

    /// Try to start a detection cycle at `now`.
    pub fn try_acquire(self: &Arc<Self>, now: Instant) -> Result<GatePermit, GateRejection> {
        let now_ms = now.saturating_duration_since(self.epoch).as_millis() as u64;
        let last = self.last_analyzed_ms.load(Ordering::SeqCst);
        if last != NEVER
            && Duration::from_millis(now_ms.saturating_sub(last)) < self.min_interval
        {
            return Err(GateRejection::TooSoon);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GateRejection::InFlight);
        }
        self.last_analyzed_ms.store(now_ms, Ordering::SeqCst);
        Ok(GatePermit {
            gate: Arc::clone(self),
        })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Held for the lifetime of one detection cycle.
#[derive(Debug)]
pub struct GatePermit {
    gate: Arc<AnalysisGate>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::SeqCst);
    }
}

/// What happened to a frame handed to `Analyzer::on_frame`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Dropped by the gate.
    Dropped(GateRejection),
    /// Accepted but no image could be produced; the gate was released.
    Skipped,
    /// Uploaded; the result arrives as a `UiEvent`.
    Dispatched,
}

pub struct Analyzer {
    converter: PixelConverter,
    normalizer: FrameNormalizer,
    client: Arc<dyn DetectionClient>,
    gate: Arc<AnalysisGate>,
    events: Sender<UiEvent>,
    upload_quality: u8,
}

impl Analyzer {
    pub fn new(
        client: Arc<dyn DetectionClient>,
        gate: Arc<AnalysisGate>,
        events: Sender<UiEvent>,
    ) -> Self {
        Self {
            converter: PixelConverter::new(),
            normalizer: FrameNormalizer::default(),
            client,
            gate,
            events,
            upload_quality: UPLOAD_JPEG_QUALITY,
        }
    }

    pub fn with_normalizer(mut self, normalizer: FrameNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_upload_quality(mut self, quality: u8) -> Self {
        self.upload_quality = quality;
        self
    }

    pub fn gate(&self) -> &Arc<AnalysisGate> {
        &self.gate
    }

    pub fn on_frame(&self, frame: &PlanarImage, rotation: Rotation, now: Instant) -> FrameOutcome {
        let permit = match self.gate.try_acquire(now) {
            Ok(permit) => permit,
            Err(rejection) => return FrameOutcome::Dropped(rejection),
        };

        let Some(image) = self.converter.convert(frame) else {
            log::debug!("frame skipped: no conversion strategy succeeded");
            return FrameOutcome::Skipped;
        };
        let normalized = match self.normalizer.normalize(image, rotation) {
            Ok(normalized) => normalized,
            Err(err) => {
                log::warn!("frame skipped: {:#}", err);
                return FrameOutcome::Skipped;
            }
        };
        let encoded = match encode_for_upload(&normalized.image, self.upload_quality) {
            Ok(encoded) => encoded,
            Err(err) => {
                log::warn!("frame skipped: {:#}", err);
                return FrameOutcome::Skipped;
            }
        };

        self.send(UiEvent::Analyzing);

        let context = normalized.context;
        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let spawned = std::thread::Builder::new()
            .name("detect".to_string())
            .spawn(move || {
                let outcome = client.detect(&encoded);
                let event = match outcome {
                    Ok(detections) => {
                        log::info!(
                            "{} detection(s) from {} client",
                            detections.len(),
                            client.name()
                        );
                        UiEvent::Completed(AnalysisResult::new(detections, context))
                    }
                    Err(err) => {
                        log::warn!("detection failed: {:#}", err);
                        UiEvent::Failed(format!("{:#}", err))
                    }
                };
                drop(permit);
                if events.send(event).is_err() {
                    log::debug!("ui loop gone; dropping detection result");
                }
            });

        match spawned {
            Ok(_) => FrameOutcome::Dispatched,
            Err(err) => {
                log::error!("failed to spawn detection thread: {}", err);
                self.send(UiEvent::Failed(format!("failed to start detection: {}", err)));
                FrameOutcome::Skipped
            }
        }
    }

    fn send(&self, event: UiEvent) {
        if self.events.send(event).is_err() {
            log::debug!("ui loop gone; dropping event");
        }
    }
}
