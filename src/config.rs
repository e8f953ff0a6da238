use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::codec::UPLOAD_JPEG_QUALITY;
use crate::detect::clients::DEFAULT_API_URL;
use crate::geometry::ViewportSize;
use crate::normalize::DEFAULT_INPUT_SIZE;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;
const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_INTERVAL_MS: u64 = 1500;
const DEFAULT_VIEWPORT_WIDTH: f32 = 1080.0;
const DEFAULT_VIEWPORT_HEIGHT: f32 = 1920.0;

#[derive(Debug, Deserialize, Default)]
struct AppConfigFile {
    api: Option<ApiConfigFile>,
    analysis: Option<AnalysisConfigFile>,
    viewport: Option<ViewportConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiConfigFile {
    url: Option<String>,
    key: Option<String>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    write_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct AnalysisConfigFile {
    input_size: Option<u32>,
    interval_ms: Option<u64>,
    upload_quality: Option<u8>,
}

#[derive(Debug, Deserialize, Default)]
struct ViewportConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub analysis: AnalysisSettings,
    pub viewport: ViewportSize,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl ApiSettings {
    /// Settings for `url` and `api_key` with the standard 30/60/60 s timeouts.
    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Square edge of the inference image.
    pub input_size: u32,
    /// Minimum time between analysed frames.
    pub interval: Duration,
    /// JPEG quality of uploaded frames.
    pub upload_quality: u8,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            upload_quality: UPLOAD_JPEG_QUALITY,
        }
    }
}

impl AppConfig {
    /// Load from the JSON file named by `WASTE_SCAN_CONFIG` (if any), then
    /// apply environment overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("WASTE_SCAN_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AppConfigFile) -> Self {
        let api_file = file.api.unwrap_or_default();
        let defaults = ApiSettings::new(DEFAULT_API_URL, "");
        let api = ApiSettings {
            url: api_file.url.unwrap_or(defaults.url),
            api_key: api_file.key.unwrap_or(defaults.api_key),
            connect_timeout: api_file
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            read_timeout: api_file
                .read_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.read_timeout),
            write_timeout: api_file
                .write_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.write_timeout),
        };

        let analysis_defaults = AnalysisSettings::default();
        let analysis = match file.analysis {
            Some(analysis) => AnalysisSettings {
                input_size: analysis.input_size.unwrap_or(analysis_defaults.input_size),
                interval: analysis
                    .interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(analysis_defaults.interval),
                upload_quality: analysis
                    .upload_quality
                    .unwrap_or(analysis_defaults.upload_quality),
            },
            None => analysis_defaults,
        };

        let viewport = ViewportSize::new(
            file.viewport
                .as_ref()
                .and_then(|viewport| viewport.width)
                .unwrap_or(DEFAULT_VIEWPORT_WIDTH),
            file.viewport
                .as_ref()
                .and_then(|viewport| viewport.height)
                .unwrap_or(DEFAULT_VIEWPORT_HEIGHT),
        );

        Self {
            api,
            analysis,
            viewport,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("WASTE_SCAN_API_URL") {
            if !url.trim().is_empty() {
                self.api.url = url;
            }
        }
        if let Ok(key) = std::env::var("WASTE_SCAN_API_KEY") {
            if !key.trim().is_empty() {
                self.api.api_key = key;
            }
        }
        if let Ok(interval) = std::env::var("WASTE_SCAN_INTERVAL_MS") {
            let millis: u64 = interval.parse().map_err(|_| {
                anyhow!("WASTE_SCAN_INTERVAL_MS must be an integer number of milliseconds")
            })?;
            self.analysis.interval = Duration::from_millis(millis);
        }
        if let Ok(size) = std::env::var("WASTE_SCAN_INPUT_SIZE") {
            self.analysis.input_size = size
                .parse()
                .map_err(|_| anyhow!("WASTE_SCAN_INPUT_SIZE must be a positive integer"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.api.url.trim().is_empty() {
            return Err(anyhow!("api url must not be empty"));
        }
        if self.analysis.input_size == 0 {
            return Err(anyhow!("analysis input size must be greater than zero"));
        }
        if !(1..=100).contains(&self.analysis.upload_quality) {
            return Err(anyhow!("upload quality must be between 1 and 100"));
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(anyhow!("viewport dimensions must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<AppConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
