use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{info, instrument};

use super::{LocationSource, parse_locations};
use crate::config::BackendConfig;
use crate::models::LocationRecord;
use crate::{ArtisanMapError, Result};

/// Calls a PostgREST remote procedure (`/rest/v1/rpc/{procedure}`)
pub struct RpcLocationSource {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl RpcLocationSource {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("artisan-map/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArtisanMapError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/rest/v1/rpc/{}",
                config.base_url.trim_end_matches('/'),
                config.procedure
            ),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LocationSource for RpcLocationSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_locations(&self) -> Result<Vec<LocationRecord>> {
        let mut request = self.client.post(&self.endpoint).json(&json!({}));

        if let Some(api_key) = &self.api_key {
            request = request
                .header("apikey", api_key)
                .header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ArtisanMapError::location_source(format!("RPC request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ArtisanMapError::location_source(format!("Failed to read RPC response: {e}"))
        })?;

        if !status.is_success() {
            return match status.as_u16() {
                401 | 403 => Err(ArtisanMapError::location_source(
                    "Backend rejected the API key",
                )),
                404 => Err(ArtisanMapError::location_source(format!(
                    "Remote procedure not found at {}",
                    self.endpoint
                ))),
                _ => Err(ArtisanMapError::location_source(format!(
                    "Backend error {status}: {body}"
                ))),
            };
        }

        let rows = parse_locations(&body)?;
        info!("Fetched {} artisan locations", rows.len());
        Ok(rows)
    }
}
