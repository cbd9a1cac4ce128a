use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::satellite::{ImageryError, ImageryRequest, ImagerySource, SatelliteData};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;
const NDVI_KEYS: [&str; 3] = ["ndvi_mean", "ndvi", "mean_ndvi"];
const IMAGE_COUNT_KEYS: [&str; 2] = ["image_count", "count"];

/// NDVI statistics service reached over plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpImagerySource {
    client: Client,
    endpoint: String,
}

impl HttpImagerySource {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, ImageryError> {
        let client = Client::builder()
            .user_agent(concat!("ghost-hunter/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn try_fetch(&self, request: &ImageryRequest) -> Result<SatelliteData, ImageryError> {
        let query = [
            ("lat", request.latitude.to_string()),
            ("lon", request.longitude.to_string()),
            ("from", request.window.date_from.to_string()),
            ("to", request.window.date_to.to_string()),
            ("buffer", request.buffer_meters.to_string()),
        ];
        let response = self.client.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

pub fn decode_response(status: StatusCode, body: &str) -> Result<SatelliteData, ImageryError> {
    if !status.is_success() {
        let preview: String = body.chars().take(180).collect();
        return Err(ImageryError::Status {
            status: status.as_u16(),
            preview,
        });
    }
    let value: Value =
        serde_json::from_str(body).map_err(|e| ImageryError::Decode(e.to_string()))?;
    parse_satellite_payload(&value)
}

/// Folds any collaborator error into a record with no reading.
pub fn normalize_fetch(
    endpoint: &str,
    result: Result<SatelliteData, ImageryError>,
) -> SatelliteData {
    match result {
        Ok(data) => data,
        Err(error) => {
            warn!(endpoint = %endpoint, "imagery fetch failed: {error}");
            SatelliteData::failed(error.to_string())
        }
    }
}

#[async_trait]
impl ImagerySource for HttpImagerySource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, request: &ImageryRequest) -> SatelliteData {
        debug!(endpoint = %self.endpoint, ?request, "requesting NDVI statistics");
        normalize_fetch(&self.endpoint, self.try_fetch(request).await)
    }
}

pub fn parse_satellite_payload(value: &Value) -> Result<SatelliteData, ImageryError> {
    let object = value
        .as_object()
        .ok_or_else(|| ImageryError::Decode("expected a JSON object".to_string()))?;

    let image_count = first_number(object, &IMAGE_COUNT_KEYS).map(|n| n.max(0.0) as u64);
    if image_count == Some(0) {
        return Err(ImageryError::NoImages);
    }
    let error = object_get_case_insensitive(object, "error")
        .and_then(Value::as_str)
        .map(str::to_string);
    let meta = object_get_case_insensitive(object, "meta")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(SatelliteData {
        ndvi_mean: first_number(object, &NDVI_KEYS),
        image_count,
        meta,
        error,
    })
}

fn first_number(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| object_get_case_insensitive(object, key))
        .find_map(to_f64)
}

fn object_get_case_insensitive<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
