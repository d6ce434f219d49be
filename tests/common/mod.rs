//! Local stand-ins for the location backend and Open-Meteo

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use artisan_map::config::{BackendConfig, WeatherConfig};
use artisan_map::{
    LocationWeatherFeed, OpenMeteoClient, RpcLocationSource, SnapshotRenderer, WeatherEnricher,
};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{Value, json};

#[derive(Clone, Default)]
pub struct Counters {
    pub backend_calls: Arc<AtomicUsize>,
    pub weather_calls: Arc<AtomicUsize>,
}

impl Counters {
    pub fn backend(&self) -> usize {
        self.backend_calls.load(Ordering::SeqCst)
    }

    pub fn weather(&self) -> usize {
        self.weather_calls.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct StubState {
    rows: Value,
    counters: Counters,
}

async fn rpc(State(state): State<StubState>) -> Json<Value> {
    state.counters.backend_calls.fetch_add(1, Ordering::SeqCst);
    Json(state.rows.clone())
}

/// 20°C / 1 mm below 26.3°N, 22°C / 2 mm above, HTTP 400 outside -90..90
async fn forecast(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.counters.weather_calls.fetch_add(1, Ordering::SeqCst);
    let lat: f64 = params
        .get("latitude")
        .and_then(|l| l.parse().ok())
        .unwrap_or(f64::NAN);

    if !(-90.0..=90.0).contains(&lat) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": true, "reason": "Latitude must be in range of -90 to 90°."})),
        )
            .into_response();
    }

    let (temperature, precipitation) = match lat {
        l if l < 26.3 => (20.0, 1.0),
        _ => (22.0, 2.0),
    };
    Json(json!({
        "latitude": lat,
        "current": {
            "time": "2026-10-17T06:00",
            "temperature_2m": temperature,
            "precipitation": precipitation
        }
    }))
    .into_response()
}

/// Spawn a server answering both the RPC and the forecast endpoints
pub async fn spawn_stub(rows: Value) -> (String, Counters) {
    let counters = Counters::default();
    let state = StubState {
        rows,
        counters: counters.clone(),
    };
    let app = Router::new()
        .route("/rest/v1/rpc/get_artisan_locations", post(rpc))
        .route("/v1/forecast", get(forecast))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    (format!("http://{addr}"), counters)
}

pub fn three_artisans() -> Value {
    json!([
        {"id": 1, "name": "Sualkuchi Weavers", "category": "Silk weaving", "cluster": "Kamrup", "latitude": 26.1, "longitude": 91.57},
        {"id": 2, "name": "Sarthebari Bell Metal", "category": "Bell metal", "cluster": "Barpeta", "latitude": 26.5, "longitude": 91.2},
        {"id": 3, "name": "Misplaced Row", "category": "Pottery", "cluster": "Dhubri", "latitude": 123.0, "longitude": 90.0}
    ])
}

pub fn feed_against(base: &str, renderer: SnapshotRenderer) -> LocationWeatherFeed<SnapshotRenderer> {
    let source = RpcLocationSource::new(&BackendConfig {
        base_url: base.to_string(),
        api_key: Some("anon-key".to_string()),
        ..BackendConfig::default()
    })
    .unwrap();
    let weather = OpenMeteoClient::new(&WeatherConfig {
        base_url: format!("{base}/v1"),
        timeout_seconds: 5,
        max_concurrent_requests: None,
    })
    .unwrap();

    LocationWeatherFeed::new(
        Arc::new(source),
        WeatherEnricher::new(Arc::new(weather)),
        renderer,
    )
}
