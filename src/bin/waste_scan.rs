//! waste_scan - live waste detection from a camera feed
//!
//! This binary:
//! 1. Pulls frames from a camera source (synthetic `stub://` camera or a raw I420 file)
//! 2. Hands every frame to the analyzer, which drops frames while a request is
//!    in flight or the minimum interval has not elapsed
//! 3. Uploads accepted frames to the detection workflow
//! 4. Maps returned boxes onto the preview viewport and reports them

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use waste_scan::config::AppConfig;
use waste_scan::detect::{DetectionClient, HttpDetectionClient, StubDetectionClient};
use waste_scan::ingest::{CameraConfig, CameraSource};
use waste_scan::normalize::FrameNormalizer;
use waste_scan::overlay::{summarize, OverlayState};
use waste_scan::pipeline::{AnalysisGate, Analyzer, FrameOutcome, UiEvent};
use waste_scan::ui::{self, ProgressGuard, Ui};
use waste_scan::Rotation;

#[derive(Parser, Debug)]
#[command(
    name = "waste_scan",
    about = "Classify waste in a camera feed with a remote detection workflow"
)]
struct Args {
    /// Camera source: stub://<name> or a local raw I420 file
    #[arg(long, env = "WASTE_SCAN_SOURCE", default_value = "stub://camera")]
    source: String,
    /// Frame width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// Frame height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Clockwise sensor rotation in degrees (0, 90, 180, 270)
    #[arg(long, default_value_t = 90)]
    rotation: i32,
    /// Frames per second pulled from the source
    #[arg(long, default_value_t = 10)]
    fps: u32,
    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    frames: Option<u64>,
    /// Answer every request with a canned detection instead of calling the API
    #[arg(long)]
    stub_detections: bool,
    /// Write the latest overlay as a PNG to this path
    #[arg(long, value_name = "PATH")]
    overlay_out: Option<PathBuf>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }
    let ui = Ui::from_args(Some(&args.ui), std::io::stderr().is_terminal());
    let config = AppConfig::load()?;

    let client: Arc<dyn DetectionClient> = if args.stub_detections {
        Arc::new(StubDetectionClient::sample())
    } else {
        let client = HttpDetectionClient::new(&config.api)?;
        log::info!("detection api: {}", client.url());
        Arc::new(client)
    };

    let mut source = CameraSource::new(CameraConfig {
        uri: args.source.clone(),
        width: args.width,
        height: args.height,
        rotation: Rotation::from_degrees(args.rotation),
    })?;
    source.connect()?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })
        .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;
    }

    let (events_tx, events_rx) = mpsc::channel();
    let analyzer = Analyzer::new(client, AnalysisGate::new(config.analysis.interval), events_tx)
        .with_normalizer(FrameNormalizer::new(config.analysis.input_size))
        .with_upload_quality(config.analysis.upload_quality);

    let frame_period = Duration::from_secs_f64(1.0 / args.fps as f64);
    let frame_limit = args.frames;
    let capture_running = Arc::clone(&running);
    let capture = thread::Builder::new()
        .name("capture".to_string())
        .spawn(move || -> Result<()> {
            let mut captured = 0u64;
            let mut last_health_log = Instant::now();
            while capture_running.load(Ordering::SeqCst) {
                if frame_limit.is_some_and(|limit| captured >= limit) {
                    break;
                }
                let tick = Instant::now();
                let Some(frame) = source.next_frame()? else {
                    log::info!("camera source exhausted");
                    break;
                };
                captured += 1;
                match analyzer.on_frame(&frame.image, frame.rotation, tick) {
                    FrameOutcome::Dispatched => log::debug!("frame {} dispatched", captured),
                    FrameOutcome::Skipped => log::debug!("frame {} skipped", captured),
                    FrameOutcome::Dropped(reason) => {
                        log::trace!("frame {} dropped: {:?}", captured, reason)
                    }
                }
                if last_health_log.elapsed() >= Duration::from_secs(5) {
                    let stats = source.stats();
                    log::info!(
                        "camera health={} frames={} source={}",
                        source.is_healthy(),
                        stats.frames_captured,
                        stats.uri
                    );
                    last_health_log = Instant::now();
                }
                if let Some(rest) = frame_period.checked_sub(tick.elapsed()) {
                    thread::sleep(rest);
                }
            }
            Ok(())
        })?;

    ui.status(ui::STATUS_IDLE);
    let mut overlay = OverlayState::new();
    if let Some(path) = &args.overlay_out {
        overlay = overlay.with_output(path.clone(), config.viewport);
    }
    let mut progress: Option<ProgressGuard> = None;
    let mut analyses = 0u64;
    loop {
        match events_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(UiEvent::Analyzing) => {
                ui.status(ui::STATUS_ANALYZING);
                progress = Some(ui.progress("Detecting waste"));
            }
            Ok(UiEvent::Completed(result)) => {
                progress = None;
                analyses += 1;
                ui.result(&summarize(result.detections()));
                overlay.apply(result);
                for item in overlay.items(config.viewport) {
                    log::info!(
                        "{} at ({:.0}, {:.0})-({:.0}, {:.0})",
                        item.label,
                        item.rect.left,
                        item.rect.top,
                        item.rect.right,
                        item.rect.bottom
                    );
                }
                ui.status(ui::STATUS_IDLE);
            }
            Ok(UiEvent::Failed(message)) => {
                progress = None;
                log::error!("analysis failed: {}", message);
                overlay.reset();
                ui.status(ui::STATUS_RETRYING);
            }
            Err(RecvTimeoutError::Timeout) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    drop(progress);

    running.store(false, Ordering::SeqCst);
    match capture.join() {
        Ok(result) => result?,
        Err(_) => return Err(anyhow!("capture thread panicked")),
    }
    log::info!("waste_scan stopped after {} analysed frame(s)", analyses);
    Ok(())
}
