//! Location sources
//!
//! A location source returns the artisan rows for one fetch cycle. Any error
//! or an empty list aborts that cycle.

use async_trait::async_trait;

use crate::Result;
use crate::models::LocationRecord;

pub mod file;
pub mod rpc;

pub use file::FileLocationSource;
pub use rpc::RpcLocationSource;

#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn fetch_locations(&self) -> Result<Vec<LocationRecord>>;
}

/// Parse the JSON array shape shared by the backend procedure and files
pub fn parse_locations(body: &str) -> Result<Vec<LocationRecord>> {
    Ok(serde_json::from_str(body)?)
}
