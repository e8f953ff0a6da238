//! Workflow API wire format.
//!
//! Request: `{ "api_key": ..., "inputs": { "image": { "type": "base64", "value": ... } } }`.
//!
//! Response: an `outputs` array. Each output's `predictions` is either the list
//! of predictions itself or an object wrapping it under another `predictions`
//! key. Predictions carry a centre/size box in image pixels.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::classes::readable_class_name;
use super::result::Detection;
use crate::geometry::BoundingBox;

#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    pub api_key: &'a str,
    pub inputs: InferenceInputs<'a>,
}

#[derive(Debug, Serialize)]
pub struct InferenceInputs<'a> {
    pub image: ImageInput<'a>,
}

#[derive(Debug, Serialize)]
pub struct ImageInput<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: &'a str,
}

impl<'a> InferenceRequest<'a> {
    pub fn new(api_key: &'a str, encoded_image: &'a str) -> Self {
        Self {
            api_key,
            inputs: InferenceInputs {
                image: ImageInput {
                    kind: "base64",
                    value: encoded_image,
                },
            },
        }
    }
}

/// One prediction as sent by the service.
///
/// Fields are read leniently: absent or `null` values take their defaults,
/// numbers may arrive as strings, and a non-string class is stringified.
#[derive(Debug, Deserialize)]
pub struct RawPrediction {
    #[serde(rename = "class", default = "unknown_class", deserialize_with = "lenient_class")]
    pub class: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub width: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: f64,
}

fn unknown_class() -> String {
    "Unknown".to_string()
}

fn lenient_class<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(class) => class,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => unknown_class(),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.unwrap_or(0.0))
}

impl RawPrediction {
    /// Convert to a `Detection`, dropping boxes whose width or height is not
    /// positive (NaN included).
    pub fn into_detection(self) -> Option<Detection> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let bbox = BoundingBox::from_center(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        );
        Some(Detection::new(
            readable_class_name(&self.class),
            self.confidence as f32,
            bbox,
        ))
    }
}

/// Parse a workflow response body into detections, in response order.
///
/// A body without an `outputs` array yields no detections. Outputs whose
/// `predictions` field has neither supported shape are skipped.
pub fn parse_response(body: &str) -> Result<Vec<Detection>> {
    let root: Value = serde_json::from_str(body).context("response is not valid json")?;
    let root = root
        .as_object()
        .ok_or_else(|| anyhow!("response is not a json object"))?;

    let Some(outputs) = root.get("outputs").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut detections = Vec::new();
    for (index, output) in outputs.iter().enumerate() {
        let output = output
            .as_object()
            .ok_or_else(|| anyhow!("output {} is not a json object", index))?;
        let predictions = match output.get("predictions") {
            Some(Value::Array(list)) => list,
            Some(Value::Object(nested)) if nested.contains_key("predictions") => nested
                .get("predictions")
                .and_then(Value::as_array)
                .ok_or_else(|| anyhow!("output {} nested predictions is not an array", index))?,
            _ => continue,
        };
        for prediction in predictions {
            let raw: RawPrediction = serde_json::from_value(prediction.clone())
                .with_context(|| format!("invalid prediction in output {}", index))?;
            if let Some(detection) = raw.into_detection() {
                detections.push(detection);
            }
        }
    }
    Ok(detections)
}
