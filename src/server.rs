use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::analysis::engine::DecisionEngine;
use crate::analysis::AnalysisReport;
use crate::config::Config;
use crate::satellite::http::HttpImagerySource;
use crate::satellite::{ImageryRequest, ImagerySource, ObservationWindow};

#[derive(Clone)]
pub struct ApiState {
    config: Arc<Config>,
    engine: DecisionEngine,
    source: Arc<dyn ImagerySource>,
}

impl ApiState {
    pub fn new(config: Config, source: Arc<dyn ImagerySource>) -> Self {
        Self {
            engine: DecisionEngine::from_config(&config.analysis),
            config: Arc::new(config),
            source,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRequest {
    pub project_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub project_type: String,
    #[serde(default)]
    pub contract_date: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub project_id: String,
    pub location: Location,
    pub satellite_analysis: AnalysisReport,
}

#[derive(Debug, Serialize)]
struct RootResponse {
    status: &'static str,
    module: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let source = HttpImagerySource::new(&config.imagery.endpoint, config.imagery.timeout_secs)
        .context("failed building imagery client")?;
    info!(endpoint = %source.endpoint(), "using HTTP imagery source");
    let app = build_router(ApiState::new(config, Arc::new(source)));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed binding {bind}"))?;
    info!("Ghost Hunter API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: ApiState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/verify", post(verify))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin.trim() == "*") {
        return layer.allow_origin(Any);
    }
    let parsed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("ignoring invalid CORS origin {origin}: {err}");
                None
            }
        })
        .collect::<Vec<_>>();
    layer.allow_origin(AllowOrigin::list(parsed))
}

async fn index() -> Json<RootResponse> {
    Json(RootResponse {
        status: "System Operational",
        module: "Infrastructure Verification",
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn verify(
    State(state): State<ApiState>,
    Json(request): Json<ProjectRequest>,
) -> std::result::Result<Json<VerifyResponse>, ApiError> {
    validate_request(&request)?;

    let window = ObservationWindow::trailing(
        Utc::now().date_naive(),
        state.config.imagery.window_days,
    );
    info!(
        project_id = %request.project_id,
        source = state.source.name(),
        "fetching satellite data"
    );
    let data = state
        .source
        .fetch(&ImageryRequest {
            latitude: request.latitude,
            longitude: request.longitude,
            window,
            buffer_meters: state.config.imagery.buffer_meters,
        })
        .await;
    if let Some(error) = &data.error {
        warn!(project_id = %request.project_id, "satellite data unavailable: {error}");
    }

    let report = state.engine.analyze(&request.project_type, &data);
    Ok(Json(VerifyResponse {
        project_id: request.project_id,
        location: Location {
            lat: request.latitude,
            lon: request.longitude,
        },
        satellite_analysis: report,
    }))
}

fn validate_request(request: &ProjectRequest) -> std::result::Result<(), ApiError> {
    if request.project_id.trim().is_empty() {
        return Err(ApiError::bad_request("project_id cannot be empty"));
    }
    if !(-90.0..=90.0).contains(&request.latitude) {
        return Err(ApiError::bad_request(format!(
            "latitude {} outside [-90, 90]",
            request.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&request.longitude) {
        return Err(ApiError::bad_request(format!(
            "longitude {} outside [-180, 180]",
            request.longitude
        )));
    }
    Ok(())
}
