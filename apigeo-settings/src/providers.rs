//! Configuration of the provider that answers territory searches.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;

/// Which provider to search with, and how it is set up.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerritoryProviderConfig {
    /// Query the `geo.api.gouv.fr` HTTP API.
    GeoApi(GeoApiConfig),
    /// Match against a fixed list of names. Only allowed in debug mode.
    Fixed(FixedConfig),
    /// Never return anything.
    Null,
}

/// Settings for the remote geocoding API.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoApiConfig {
    /// The root of the API. Territory paths are joined to it, so it should
    /// end with a `/`.
    pub base_url: String,

    /// The most territories kept from a single response.
    pub max_results: usize,

    /// How long to wait for a connection to the API to be established.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,

    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for GeoApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geo.api.gouv.fr/".to_string(),
            max_results: 10,
            connect_timeout: Duration::from_secs(5),
            user_agent: concat!("apigeo/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Settings for the offline provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedConfig {
    /// Territory names to match queries against.
    pub names: Vec<String>,
}
