use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use waste_scan::detect::{DetectionClient, StubDetectionClient};
use waste_scan::frame::i420_frame_len;
use waste_scan::pipeline::{AnalysisGate, Analyzer, FrameOutcome, GateRejection, UiEvent};
use waste_scan::{BoundingBox, Detection, PlanarImage, Plane, Rotation};

const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client that blocks every call until the test releases it.
struct BlockingClient {
    release: Mutex<Receiver<()>>,
    calls: AtomicU64,
}

impl DetectionClient for BlockingClient {
    fn name(&self) -> &'static str {
        "blocking"
    }

    fn detect(&self, _encoded_image: &str) -> Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let release = self.release.lock().map_err(|_| anyhow!("poisoned"))?;
        release
            .recv_timeout(EVENT_TIMEOUT)
            .map_err(|_| anyhow!("never released"))?;
        Ok(Vec::new())
    }
}

struct FailingClient;

impl DetectionClient for FailingClient {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn detect(&self, _encoded_image: &str) -> Result<Vec<Detection>> {
        Err(anyhow!("HTTP error: 503 | No response body"))
    }
}

fn frame(width: u32, height: u32) -> PlanarImage {
    let len = i420_frame_len(width, height).expect("frame length");
    PlanarImage::from_i420(width, height, &vec![128u8; len]).expect("frame")
}

fn empty_frame() -> PlanarImage {
    PlanarImage::new(
        0,
        0,
        Plane::new(Vec::new(), 0, 1),
        Plane::new(Vec::new(), 0, 1),
        Plane::new(Vec::new(), 0, 1),
    )
}

fn next_event(events: &Receiver<UiEvent>) -> UiEvent {
    events.recv_timeout(EVENT_TIMEOUT).expect("ui event")
}

#[test]
fn rapid_frames_start_at_most_one_extra_cycle() {
    let (release_tx, release_rx) = mpsc::channel();
    let client = Arc::new(BlockingClient {
        release: Mutex::new(release_rx),
        calls: AtomicU64::new(0),
    });
    let (events_tx, events) = mpsc::channel();
    let analyzer = Analyzer::new(client.clone(), AnalysisGate::new(Duration::ZERO), events_tx);
    let image = frame(32, 24);

    assert_eq!(
        analyzer.on_frame(&image, Rotation::Deg0, Instant::now()),
        FrameOutcome::Dispatched
    );
    assert!(matches!(next_event(&events), UiEvent::Analyzing));

    for _ in 0..20 {
        assert_eq!(
            analyzer.on_frame(&image, Rotation::Deg0, Instant::now()),
            FrameOutcome::Dropped(GateRejection::InFlight)
        );
    }

    release_tx.send(()).expect("release first call");
    assert!(matches!(next_event(&events), UiEvent::Completed(_)));
    assert!(!analyzer.gate().is_in_flight());

    let mut dispatched = 0;
    for _ in 0..20 {
        if analyzer.on_frame(&image, Rotation::Deg0, Instant::now()) == FrameOutcome::Dispatched {
            dispatched += 1;
        }
    }
    assert_eq!(dispatched, 1);
    assert!(matches!(next_event(&events), UiEvent::Analyzing));

    release_tx.send(()).expect("release second call");
    assert!(matches!(next_event(&events), UiEvent::Completed(_)));
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn throttle_applies_between_completed_cycles() {
    let client = Arc::new(StubDetectionClient::default());
    let (events_tx, events) = mpsc::channel();
    let analyzer = Analyzer::new(
        client.clone(),
        AnalysisGate::new(Duration::from_millis(1500)),
        events_tx,
    );
    let image = frame(16, 16);
    let start = Instant::now();

    assert_eq!(
        analyzer.on_frame(&image, Rotation::Deg0, start),
        FrameOutcome::Dispatched
    );
    assert!(matches!(next_event(&events), UiEvent::Analyzing));
    assert!(matches!(next_event(&events), UiEvent::Completed(_)));

    assert_eq!(
        analyzer.on_frame(&image, Rotation::Deg0, start + Duration::from_millis(200)),
        FrameOutcome::Dropped(GateRejection::TooSoon)
    );
    assert_eq!(
        analyzer.on_frame(&image, Rotation::Deg0, start + Duration::from_millis(1500)),
        FrameOutcome::Dispatched
    );
    assert!(matches!(next_event(&events), UiEvent::Analyzing));
    assert!(matches!(next_event(&events), UiEvent::Completed(_)));
    assert_eq!(client.calls(), 2);
}

#[test]
fn failed_detection_releases_gate() {
    let (events_tx, events) = mpsc::channel();
    let analyzer = Analyzer::new(
        Arc::new(FailingClient),
        AnalysisGate::new(Duration::ZERO),
        events_tx,
    );
    let image = frame(8, 8);

    assert_eq!(
        analyzer.on_frame(&image, Rotation::Deg0, Instant::now()),
        FrameOutcome::Dispatched
    );
    assert!(matches!(next_event(&events), UiEvent::Analyzing));
    match next_event(&events) {
        UiEvent::Failed(message) => assert_eq!(message, "HTTP error: 503 | No response body"),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!analyzer.gate().is_in_flight());
    assert_eq!(
        analyzer.on_frame(&image, Rotation::Deg0, Instant::now()),
        FrameOutcome::Dispatched
    );
}

#[test]
fn unconvertible_frame_is_skipped_and_releases_gate() {
    let client = Arc::new(StubDetectionClient::default());
    let (events_tx, events) = mpsc::channel();
    let analyzer = Analyzer::new(client.clone(), AnalysisGate::new(Duration::ZERO), events_tx);

    assert_eq!(
        analyzer.on_frame(&empty_frame(), Rotation::Deg0, Instant::now()),
        FrameOutcome::Skipped
    );
    assert!(!analyzer.gate().is_in_flight());
    assert!(events.try_recv().is_err());
    assert_eq!(client.calls(), 0);

    assert_eq!(
        analyzer.on_frame(&frame(4, 4), Rotation::Deg0, Instant::now()),
        FrameOutcome::Dispatched
    );
}

#[test]
fn result_carries_context_of_uploaded_frame() {
    let detection = Detection::new("Sampah B3", 0.9, BoundingBox::new(10.0, 20.0, 30.0, 40.0));
    let client = Arc::new(StubDetectionClient::new(vec![detection.clone()]));
    let (events_tx, events) = mpsc::channel();
    let analyzer = Analyzer::new(client, AnalysisGate::new(Duration::ZERO), events_tx);

    assert_eq!(
        analyzer.on_frame(&frame(64, 48), Rotation::Deg90, Instant::now()),
        FrameOutcome::Dispatched
    );
    assert!(matches!(next_event(&events), UiEvent::Analyzing));
    let UiEvent::Completed(result) = next_event(&events) else {
        panic!("expected completed result");
    };
    assert_eq!(result.detections(), &[detection]);
    let context = result.context();
    assert_eq!(
        (context.inference_width(), context.inference_height()),
        (312, 416)
    );
    assert_eq!(context.rotation(), Rotation::Deg90);
    assert_eq!(context.source_dimensions(), (416, 312));
}
