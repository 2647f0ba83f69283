//! A territory provider that matches queries against a fixed list of names.
//!
//! It is meant to be used in development and testing, without network access.

use anyhow::anyhow;
use apigeo_settings::{providers::FixedConfig, Settings};
use async_trait::async_trait;
use deunicode::deunicode;

use crate::{
    SearchError, SearchRequest, SearchResponse, SetupError, Territory, TerritoryProvider,
    MAX_RESULTS,
};

/// A provider that finds the configured names starting with the query,
/// ignoring case and accents.
pub struct FixedProvider {
    /// Territories in configuration order.
    territories: Vec<Territory>,
}

impl FixedProvider {
    /// Create a FixedProvider from settings.
    ///
    /// # Errors
    /// If `settings.debug` is false.
    pub fn new_boxed(settings: &Settings, config: &FixedConfig) -> Result<Box<Self>, SetupError> {
        if !settings.debug {
            return Err(SetupError::InvalidConfiguration(anyhow!(
                "FixedProvider can only be used in debug mode",
            )));
        }
        Ok(Box::new(Self::from_names(&config.names)))
    }

    /// Build a provider over `names`. Codes are assigned by position.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let territories = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Territory {
                nom: name.as_ref().to_string(),
                code: format!("{:05}", idx + 1),
                departement: None,
                region: None,
            })
            .collect();
        Self { territories }
    }
}

/// Lowercase and strip accents, so that "ile" finds "Île-de-France".
fn fold(s: &str) -> String {
    deunicode(s).to_lowercase()
}

#[async_trait]
impl TerritoryProvider for FixedProvider {
    fn name(&self) -> String {
        format!("FixedProvider({} territories)", self.territories.len())
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let query = fold(request.query.trim());
        let territories = self
            .territories
            .iter()
            .filter(|territory| fold(&territory.nom).starts_with(&query))
            .take(MAX_RESULTS)
            .cloned()
            .collect();
        Ok(SearchResponse::new(territories))
    }
}

#[cfg(test)]
mod tests {
    use super::FixedProvider;
    use crate::{SearchRequest, SetupError, TerritoryProvider, TerritoryType};
    use apigeo_settings::{providers::FixedConfig, Settings};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn matches_ignore_case_and_accents() {
        let provider =
            FixedProvider::from_names(&["Île-de-France", "Bretagne", "Normandie", "Occitanie"]);
        let response = provider
            .search(SearchRequest::new(TerritoryType::Regions, "ILE"))
            .await
            .expect("fixed search cannot fail");
        let names: Vec<&str> = response.territories.iter().map(|t| t.nom.as_str()).collect();
        assert_eq!(names, vec!["Île-de-France"]);
        assert_eq!(response.territories[0].code, "00001");
    }

    #[tokio::test]
    async fn results_are_capped() {
        let names: Vec<String> = (0..25).map(|i| format!("Saint-{}", i)).collect();
        let provider = FixedProvider::from_names(&names);
        let response = provider
            .search(SearchRequest::new(TerritoryType::Communes, "saint"))
            .await
            .expect("fixed search cannot fail");
        assert_eq!(response.territories.len(), 10);
    }

    #[test]
    fn refused_outside_debug_mode() {
        let settings = Settings::load_for_tests(|settings| settings.debug = false);
        let result = FixedProvider::new_boxed(&settings, &FixedConfig::default());
        assert!(matches!(result, Err(SetupError::InvalidConfiguration(_))));
    }
}
