//! A territory provider that queries the `geo.api.gouv.fr` HTTP API.

use anyhow::Context;
use apigeo_settings::providers::GeoApiConfig;
use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Url,
};

use crate::{SearchError, SearchRequest, SearchResponse, SetupError, Territory, TerritoryProvider};

/// A provider that searches territories with the geo API.
pub struct GeoApiProvider {
    /// The HTTP client to query the API with.
    client: reqwest::Client,
    /// The root of the API. Always ends with a `/`.
    base_url: Url,
    /// The most territories kept from a single response.
    max_results: usize,
}

impl GeoApiProvider {
    /// Create a provider from its configuration.
    ///
    /// # Errors
    /// If the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &GeoApiConfig) -> Result<Self, SetupError> {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)
            .context(format!("Parsing geo API URL: {}", config.base_url))
            .map_err(SetupError::InvalidConfiguration)?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Unable to create the Reqwest client")
            .map_err(SetupError::Network)?;

        Ok(Self {
            client,
            base_url,
            max_results: config.max_results,
        })
    }

    /// Create a boxed provider from its configuration.
    ///
    /// # Errors
    /// See [`GeoApiProvider::new`].
    pub fn new_boxed(config: &GeoApiConfig) -> Result<Box<Self>, SetupError> {
        Self::new(config).map(Box::new)
    }

    /// The URL searched for `request`.
    ///
    /// # Errors
    /// If the territory path cannot be joined to the base URL.
    pub fn request_url(&self, request: &SearchRequest) -> Result<Url, SearchError> {
        let mut url = self
            .base_url
            .join(&request.territory_type.path_segment())
            .context("Building search URL")
            .map_err(SearchError::Internal)?;
        url.query_pairs_mut()
            .append_pair("nom", &request.query)
            .append_pair("fields", request.territory_type.result_field().as_str())
            .append_pair("boost", "population");
        Ok(url)
    }
}

#[async_trait]
impl TerritoryProvider for GeoApiProvider {
    fn name(&self) -> String {
        format!("GeoApiProvider({})", self.base_url)
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let url = self.request_url(&request)?;
        tracing::info!(r#type = "apigeo.search.geo_api", %url, "Searching territories");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .context(format!("Searching territories: {}", url))
            .map_err(SearchError::Network)?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                %url,
                "Geo API answered with an error status"
            );
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.contains("application/json"));
        if !is_json {
            tracing::debug!(%url, "Geo API response is not JSON, ignoring it");
            return Ok(SearchResponse::default());
        }

        let body = response
            .bytes()
            .await
            .context("Reading geo API response")
            .map_err(SearchError::Network)?;
        let territories = match serde_json::from_slice::<Vec<Territory>>(&body) {
            Ok(territories) => territories,
            Err(error) => {
                tracing::warn!(%error, %url, "Geo API response is not a list of territories");
                vec![]
            }
        };

        Ok(SearchResponse::new(territories).truncated(self.max_results))
    }
}
