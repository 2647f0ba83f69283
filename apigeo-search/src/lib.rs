#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Territory search backends for the apigeo widget.
//!
//! A [`TerritoryProvider`] turns a [`SearchRequest`] (a territory type and the
//! text typed so far) into an ordered list of [`Territory`] records. The
//! production provider is [`GeoApiProvider`], which queries
//! `geo.api.gouv.fr`. Providers are usually built from configuration with
//! [`make_provider`].

mod domain;
mod maker;
mod providers;

use async_trait::async_trait;
use fake::{
    faker::address::en::{CityName, StateName},
    Fake, Faker,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::domain::{ResultField, TerritoryType};
pub use crate::maker::make_provider;
pub use crate::providers::{FixedProvider, GeoApiProvider};

/// The most territories a result list holds.
pub const MAX_RESULTS: usize = 10;

/// A request for territories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchRequest {
    /// The kind of territory to look for.
    pub territory_type: TerritoryType,

    /// The text typed by the user, unmodified.
    pub query: String,
}

impl SearchRequest {
    /// Build a request for `query` among territories of `territory_type`.
    pub fn new<S: Into<String>>(territory_type: TerritoryType, query: S) -> Self {
        Self {
            territory_type,
            query: query.into(),
        }
    }
}

/// The territories matching a request, best match first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResponse {
    /// The matching territories.
    pub territories: Vec<Territory>,
}

impl SearchResponse {
    /// Create a new response containing the given territories.
    pub fn new(territories: Vec<Territory>) -> Self {
        Self { territories }
    }

    /// Keep at most the first `max` territories.
    #[must_use]
    pub fn truncated(mut self, max: usize) -> Self {
        self.territories.truncate(max);
        self
    }
}

/// A named administrative unit, as returned by the geo API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Territory {
    /// The name to display to the user.
    pub nom: String,

    /// The INSEE code, unique among territories of the same type.
    pub code: String,

    /// The département a commune belongs to, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departement: Option<ParentTerritory>,

    /// The région a département or région belongs to, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<ParentTerritory>,
}

/// The name and code of the unit a territory belongs to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ParentTerritory {
    /// The parent's name.
    pub nom: String,
    /// The parent's INSEE code.
    pub code: String,
}

impl fake::Dummy<Faker> for Territory {
    fn dummy_with_rng<R: rand::Rng + ?Sized>(_config: &Faker, rng: &mut R) -> Self {
        let departement = rng.gen_bool(0.8).then(|| ParentTerritory {
            nom: StateName().fake_with_rng(rng),
            code: format!("{:02}", rng.gen_range(1..96)),
        });
        Self {
            nom: CityName().fake_with_rng(rng),
            code: format!("{:05}", rng.gen_range(1000..96000)),
            departement,
            region: None,
        }
    }
}

/// A backend that can find territories for a query.
#[async_trait]
pub trait TerritoryProvider: Send + Sync {
    /// An operator-visible name for this provider.
    fn name(&self) -> String;

    /// Find the territories matching `request`.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError>;

    /// Return if this provider is null and can be ignored.
    fn is_null(&self) -> bool {
        false
    }
}

/// A provider that never finds anything.
pub struct NullProvider;

#[async_trait]
impl TerritoryProvider for NullProvider {
    fn name(&self) -> String {
        "NullProvider".into()
    }

    fn is_null(&self) -> bool {
        true
    }

    async fn search(&self, _request: SearchRequest) -> Result<SearchResponse, SearchError> {
        Ok(SearchResponse::default())
    }
}

/// Errors that may occur while setting up a provider.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum SetupError {
    #[error("This territory provider cannot be used with the current configuration")]
    InvalidConfiguration(#[source] anyhow::Error),

    #[error("There was a network error while setting up this territory provider")]
    Network(#[source] anyhow::Error),
}

/// Errors that may occur while searching for territories.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum SearchError {
    #[error("There was a network error while searching territories: {0}")]
    Network(#[source] anyhow::Error),

    #[error("There was an internal error in the territory provider: {0}")]
    Internal(#[source] anyhow::Error),
}
