use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    ArtisanMapError,
    config::MapViewConfig,
    feed::{LocationWeatherFeed, ModeCell},
    models::FeatureSummary,
    presentation::{PresentationMode, RenderConfig},
    render::{FeatureRenderer, SnapshotRenderer},
};

/// Shared state behind the `/api` routes.
///
/// `refresh` holds the feed lock for a whole fetch cycle. Mode changes go
/// through `mode` and `snapshot` so they never wait on it.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<Mutex<LocationWeatherFeed<SnapshotRenderer>>>,
    pub mode: ModeCell,
    pub snapshot: SnapshotRenderer,
    pub view: MapViewConfig,
}

impl AppState {
    /// `snapshot` must be the renderer the feed was built with
    pub fn new(
        feed: LocationWeatherFeed<SnapshotRenderer>,
        snapshot: SnapshotRenderer,
        view: MapViewConfig,
    ) -> Self {
        Self {
            mode: feed.mode_cell(),
            feed: Arc::new(Mutex::new(feed)),
            snapshot,
            view,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiSummary {
    pub summary: FeatureSummary,
    pub panel: Vec<String>,
}

impl From<&FeatureSummary> for ApiSummary {
    fn from(summary: &FeatureSummary) -> Self {
        Self {
            summary: summary.clone(),
            panel: summary.panel_lines(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiConfig {
    pub mode: PresentationMode,
    pub render: RenderConfig,
    pub view: MapViewConfig,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/features", get(get_features))
        .route("/summary", get(get_summary))
        .route("/config", get(get_config))
        .route("/mode/{mode}", put(set_mode))
        .route("/refresh", post(refresh))
        .with_state(state)
}

async fn get_features(State(state): State<AppState>) -> Json<Value> {
    Json(state.snapshot.snapshot().features)
}

async fn get_summary(State(state): State<AppState>) -> Json<ApiSummary> {
    Json(ApiSummary::from(&state.snapshot.snapshot().summary))
}

async fn get_config(State(state): State<AppState>) -> Json<ApiConfig> {
    let render = state.snapshot.snapshot().config;
    Json(ApiConfig {
        mode: render.mode(),
        render,
        view: state.view.clone(),
    })
}

async fn set_mode(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<Json<ApiConfig>, StatusCode> {
    let mode: PresentationMode = mode.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut renderer = state.snapshot.clone();
    let render = state
        .mode
        .switch(mode, |config| renderer.apply_config(config))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(ApiConfig {
        mode,
        render,
        view: state.view.clone(),
    }))
}

async fn refresh(State(state): State<AppState>) -> Result<Json<ApiSummary>, StatusCode> {
    let mut feed = state.feed.lock().await;
    match feed.refresh().await {
        Ok(features) => Ok(Json(ApiSummary::from(&features.summary))),
        Err(ArtisanMapError::Cancelled) => Err(StatusCode::SERVICE_UNAVAILABLE),
        Err(err) => {
            tracing::error!("Refresh failed: {}", err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
