//! HTTP service exposing isochrone computation over a loaded street graph

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    error_handling::HandleErrorLayer,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use tower::{BoxError, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use walkshed_core::algo::{ClipBoundary, IsochroneRequest, bulk_isochrones, records_to_geojson};
use walkshed_core::{CoordinateSystem, QueryPoint, StreetGraph, WalkshedConfig};

use crate::config::HttpConfig;

/// Loaded network shared by all requests
pub struct AppState {
    pub graph: StreetGraph,
    pub clip: Option<ClipBoundary>,
    pub isochrones: WalkshedConfig,
    summary: NetworkSummary,
}

impl AppState {
    pub fn new(
        graph: StreetGraph,
        clip: Option<ClipBoundary>,
        isochrones: WalkshedConfig,
    ) -> Self {
        let (components, largest_component) = graph.component_summary();
        let summary = NetworkSummary {
            nodes: graph.node_count(),
            arcs: graph.edge_count(),
            components,
            largest_component,
            coordinate_system: graph.coordinate_system(),
            clip_boundary: clip.is_some(),
        };
        Self {
            graph,
            clip,
            isochrones,
            summary,
        }
    }

    /// Server defaults overridden by whatever the request body sets
    fn request_for(&self, body: &IsochronesBody) -> Result<IsochroneRequest, ApiError> {
        let mut config = self.isochrones.clone();
        if let Some(budgets) = &body.budgets {
            config.budgets_minutes.clone_from(budgets);
        }
        if let Some(speed) = body.speed_m_per_min {
            config.speed_m_per_min = speed;
        }
        let clip = if body.clip { self.clip.clone() } else { None };
        Ok(config.request(clip)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkSummary {
    pub nodes: usize,
    pub arcs: usize,
    pub components: usize,
    pub largest_component: usize,
    pub coordinate_system: CoordinateSystem,
    pub clip_boundary: bool,
}

#[derive(Debug, Deserialize)]
pub struct PointBody {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct IsochronesBody {
    pub points: Vec<PointBody>,
    #[serde(default)]
    pub budgets: Option<Vec<f64>>,
    #[serde(default)]
    pub speed_m_per_min: Option<f64>,
    /// Clip to the configured boundary, when one is loaded
    #[serde(default = "default_clip")]
    pub clip: bool,
}

fn default_clip() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<walkshed_core::Error> for ApiError {
    fn from(e: walkshed_core::Error) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(error) => (StatusCode::BAD_REQUEST, error),
            ApiError::Internal(error) => {
                tracing::error!("{error}");
                (StatusCode::INTERNAL_SERVER_ERROR, error)
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Builds the router with tracing, CORS, request timeout and a cap on
/// concurrently running requests.
pub fn router(state: Arc<AppState>, http: &HttpConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/network", get(network))
        .route("/isochrones", post(isochrones))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(http.request_timeout_secs))
                .concurrency_limit(http.max_concurrent_requests),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ErrorBody>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorBody {
                error: "Request took too long".to_string(),
            }),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: format!("Unhandled internal error: {err}"),
            }),
        )
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn network(State(state): State<Arc<AppState>>) -> Json<NetworkSummary> {
    Json(state.summary.clone())
}

async fn isochrones(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IsochronesBody>,
) -> Result<Json<FeatureCollection>, ApiError> {
    if body.points.is_empty() {
        return Err(ApiError::BadRequest("No points given".to_string()));
    }
    let request = state.request_for(&body)?;
    let points: Vec<QueryPoint> = body
        .points
        .into_iter()
        .map(|p| QueryPoint::new(p.id, p.x, p.y))
        .collect();
    tracing::info!(
        "Computing {} isochrones for {} points",
        points.len() * request.budgets.len(),
        points.len()
    );

    let worker_state = Arc::clone(&state);
    let collection = tokio::task::spawn_blocking(move || {
        let records = bulk_isochrones(&worker_state.graph, &points, &request);
        records_to_geojson(&records)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Isochrone worker failed: {e}")))?
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(collection))
}
