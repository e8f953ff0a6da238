//! HTTP workflow client.
//!
//! Posts the encoded frame as JSON and parses the prediction list out of the
//! reply. Every failure comes back as an error carrying a user-presentable
//! message:
//! - transport failures: `connection failed: ...`
//! - non-2xx replies: `HTTP error: <status> | <body>`
//! - empty or unparsable bodies: `empty response body` / `failed to process response: ...`

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::config::ApiSettings;
use crate::detect::client::DetectionClient;
use crate::detect::result::Detection;
use crate::detect::wire::{parse_response, InferenceRequest};

pub const DEFAULT_API_URL: &str =
    "https://serverless.roboflow.com/infer/workflows/cohya/detect-count-and-visualize-2";

pub struct HttpDetectionClient {
    agent: ureq::Agent,
    url: String,
    api_key: String,
}

impl HttpDetectionClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let url = Url::parse(&settings.url).context("parse detection api url")?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "unsupported detection api scheme '{}'; expected http(s)",
                url.scheme()
            ));
        }
        if settings.api_key.trim().is_empty() {
            return Err(anyhow!("detection api key must be set"));
        }
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(settings.connect_timeout)
            .timeout_read(settings.read_timeout)
            .timeout_write(settings.write_timeout)
            .build();
        Ok(Self {
            agent,
            url: settings.url.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DetectionClient for HttpDetectionClient {
    fn name(&self) -> &'static str {
        "http"
    }

    fn detect(&self, encoded_image: &str) -> Result<Vec<Detection>> {
        let body = serde_json::to_string(&InferenceRequest::new(&self.api_key, encoded_image))
            .context("failed to build request")?;

        let response = match self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let error_body = response
                    .into_string()
                    .ok()
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| "No response body".to_string());
                return Err(anyhow!("HTTP error: {} | {}", code, error_body));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(anyhow!("connection failed: {}", transport));
            }
        };

        let text = response
            .into_string()
            .map_err(|e| anyhow!("failed to process response: {}", e))?;
        if text.trim().is_empty() {
            return Err(anyhow!("empty response body"));
        }
        log::debug!("full response: {}", text);

        parse_response(&text).map_err(|e| anyhow!("failed to process response: {:#}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_scheme() {
        let settings = ApiSettings::new("ftp://example.com/infer", "key");
        assert!(HttpDetectionClient::new(&settings).is_err());
    }

    #[test]
    fn requires_api_key() {
        let settings = ApiSettings::new(DEFAULT_API_URL, "  ");
        assert!(HttpDetectionClient::new(&settings).is_err());
    }

    #[test]
    fn accepts_https_endpoint() -> Result<()> {
        let client = HttpDetectionClient::new(&ApiSettings::new(DEFAULT_API_URL, "key"))?;
        assert_eq!(client.url(), DEFAULT_API_URL);
        assert_eq!(client.name(), "http");
        Ok(())
    }
}
