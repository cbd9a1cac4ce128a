pub mod http;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Best-effort record returned by an imagery collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SatelliteData {
    #[serde(default)]
    pub ndvi_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SatelliteData {
    pub fn reading(ndvi_mean: f64) -> Self {
        Self {
            ndvi_mean: Some(ndvi_mean),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageryError {
    #[error("imagery request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("imagery service returned {status}: {preview}")]
    Status { status: u16, preview: String },
    #[error("invalid imagery response: {0}")]
    Decode(String),
    #[error("No satellite images found for this location/date range.")]
    NoImages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl ObservationWindow {
    /// Window of `days` ending on `today`, long enough for a median composite.
    /// Saturates at the earliest representable date.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let days = i64::from(days.max(1));
        Self {
            date_from: today
                .checked_sub_signed(Duration::days(days))
                .unwrap_or(NaiveDate::MIN),
            date_to: today,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageryRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub window: ObservationWindow,
    pub buffer_meters: u32,
}

#[async_trait]
pub trait ImagerySource: Send + Sync {
    fn name(&self) -> &str;
    /// Never fails: collaborator errors land in `SatelliteData::error` with no NDVI.
    async fn fetch(&self, request: &ImageryRequest) -> SatelliteData;
}

/// Serves one fixed reading. Used offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticImagerySource {
    pub reading: SatelliteData,
}

impl StaticImagerySource {
    pub fn new(reading: SatelliteData) -> Self {
        Self { reading }
    }
}

#[async_trait]
impl ImagerySource for StaticImagerySource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, _request: &ImageryRequest) -> SatelliteData {
        self.reading.clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        ImageryRequest, ImagerySource, ObservationWindow, SatelliteData, StaticImagerySource,
    };

    #[test]
    fn trailing_window_ends_today() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date");
        let window = ObservationWindow::trailing(today, 91);
        assert_eq!(window.date_to, today);
        assert_eq!(
            window.date_from,
            NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date")
        );
        assert_eq!(
            ObservationWindow::trailing(today, 0).date_from,
            today.pred_opt().expect("valid date")
        );
    }

    #[test]
    fn oversized_window_saturates() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
        let window = ObservationWindow::trailing(today, u32::MAX);
        assert_eq!(window.date_from, NaiveDate::MIN);
        assert_eq!(window.date_to, today);
    }

    #[test]
    fn failed_record_has_no_reading() {
        let data = SatelliteData::failed("quota exceeded");
        assert!(data.ndvi_mean.is_none());
        assert_eq!(data.error.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn static_source_returns_its_reading() {
        let source = StaticImagerySource::new(SatelliteData::reading(0.33));
        let request = ImageryRequest {
            latitude: 6.5,
            longitude: 3.4,
            window: ObservationWindow::trailing(
                NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
                30,
            ),
            buffer_meters: 500,
        };
        let data = tokio_test::block_on(source.fetch(&request));
        assert_eq!(data.ndvi_mean, Some(0.33));
        assert_eq!(source.name(), "static");
    }
}
