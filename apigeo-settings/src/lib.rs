#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # apigeo settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `APIGEO_ENV`. The
//!    settings for that environment are then loaded from `config/${env}.yaml`, if
//!    it exists. The default environment is "development". A "production"
//!    environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use for
//!    local configuration if desired.
//! 4. Environment variables that begin with `APIGEO_` and have a separator for
//!    `__`. For example, `Settings::search::debounce` can be controlled from the
//!    environment variable `APIGEO_SEARCH__DEBOUNCE_MS`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.

mod logging;
pub mod providers;

pub use logging::{DirectiveWrapper, LogFormat, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use providers::TerritoryProviderConfig;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;

/// Top level settings object for apigeo.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment apigeo is running in. Should only be set with the
    /// `APIGEO_ENV` environment variable.
    pub env: String,

    /// Enable development-only features, such as the fixed offline provider.
    /// This should not be set to true in production environments.
    pub debug: bool,

    /// Settings for the search widget.
    pub search: SearchSettings,

    /// The provider that answers territory searches.
    pub provider: TerritoryProviderConfig,

    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Settings for the search widget.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchSettings {
    /// The territory type the widget starts with, by its French plural name,
    /// such as `communes` or `régions`.
    pub territory_type: String,

    /// How long input has to stay unchanged before a query is sent.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "debounce_ms")]
    pub debounce: Duration,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let mut s = Config::new();

        // Start off with the base config.
        s.merge(File::with_name("./config/base"))?;

        // Merge in an environment specific config.
        let apigeo_env = std::env::var("APIGEO_ENV").unwrap_or_else(|_| "development".to_string());
        s.set("env", apigeo_env.as_str())?;
        s.merge(File::with_name(&format!("config/{}", s.get::<String>("env")?)).required(false))?;

        // Add a local configuration file that is `.gitignore`ed.
        s.merge(File::with_name("config/local").required(false))?;

        // Add environment variables that start with "APIGEO_" and have "__" to
        // separate levels. For example, `APIGEO_SEARCH__DEBOUNCE_MS` maps to
        // `Settings::search::debounce`.
        s.merge(Environment::with_prefix("APIGEO").separator("__"))?;

        s.try_into()
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` is applied to the loaded settings before they are returned.
    ///
    /// # Panics
    /// If the base or test configuration cannot be loaded.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let mut s = Config::new();

        // Start off with the base config.
        s.merge(File::with_name("../config/base"))
            .expect("Could not load base settings");

        // Merge in test specific config.
        s.set("env", "test").expect("Could not set env for tests");
        s.merge(File::with_name("../config/test"))
            .expect("Could not load test settings");

        // Add a local configuration file that is `.gitignore`ed.
        s.merge(File::with_name("../config/local_test").required(false))
            .expect("Could not load local settings for tests");

        let mut settings = s.try_into().expect("Could not convert settings");
        changer(&mut settings);
        settings
    }
}
