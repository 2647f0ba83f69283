//! Tools to build providers from configuration.

use anyhow::Result;
use apigeo_settings::{providers::TerritoryProviderConfig, Settings};

use crate::{FixedProvider, GeoApiProvider, NullProvider, TerritoryProvider};

/// Build the provider described by `config`.
///
/// # Errors
/// If the provider refuses the configuration, or cannot set up its client.
pub fn make_provider(
    settings: &Settings,
    config: &TerritoryProviderConfig,
) -> Result<Box<dyn TerritoryProvider>> {
    let provider: Box<dyn TerritoryProvider> = match config {
        TerritoryProviderConfig::GeoApi(geo_api_config) => {
            GeoApiProvider::new_boxed(geo_api_config)?
        }
        TerritoryProviderConfig::Fixed(fixed_config) => {
            FixedProvider::new_boxed(settings, fixed_config)?
        }
        TerritoryProviderConfig::Null => Box::new(NullProvider),
    };
    tracing::debug!(provider = %provider.name(), "Built territory provider");
    Ok(provider)
}
