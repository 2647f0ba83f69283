//! Datatypes to better represent the domain of French administrative territories.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The kind of administrative unit being searched for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerritoryType {
    /// Communes, the smallest units.
    #[serde(rename = "communes")]
    Communes,
    /// Départements, which group communes.
    #[serde(rename = "départements", alias = "departements")]
    Departements,
    /// Régions, which group départements.
    #[serde(rename = "régions", alias = "regions")]
    Regions,
}

impl TerritoryType {
    /// The French plural name, as the parent component names it.
    pub fn name(&self) -> &'static str {
        match self {
            TerritoryType::Communes => "communes",
            TerritoryType::Departements => "départements",
            TerritoryType::Regions => "régions",
        }
    }

    /// The path segment of the geo API endpoint serving this type.
    ///
    /// The API paths are unaccented, so the `é` of the name is replaced.
    pub fn path_segment(&self) -> String {
        self.name().replacen('é', "e", 1)
    }

    /// The parent unit requested alongside each result.
    pub fn result_field(&self) -> ResultField {
        match self {
            TerritoryType::Communes => ResultField::Departement,
            TerritoryType::Departements | TerritoryType::Regions => ResultField::Region,
        }
    }
}

impl fmt::Display for TerritoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TerritoryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "communes" => Ok(TerritoryType::Communes),
            "départements" | "departements" => Ok(TerritoryType::Departements),
            "régions" | "regions" => Ok(TerritoryType::Regions),
            other => Err(anyhow!("unknown territory type: {:?}", other)),
        }
    }
}

/// The `fields` value of a search request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultField {
    /// Ask for the parent département of each commune.
    Departement,
    /// Ask for the parent région.
    Region,
}

impl ResultField {
    /// The value as the API expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultField::Departement => "departement",
            ResultField::Region => "region",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ResultField, TerritoryType};
    use pretty_assertions::assert_eq;

    #[test]
    fn communes_query_departements() {
        let t: TerritoryType = "communes".parse().expect("valid type");
        assert_eq!(t.path_segment(), "communes");
        assert_eq!(t.result_field(), ResultField::Departement);
        assert_eq!(t.result_field().as_str(), "departement");
    }

    #[test]
    fn accents_are_stripped_from_paths() {
        let regions: TerritoryType = "régions".parse().expect("valid type");
        assert_eq!(regions, TerritoryType::Regions);
        assert_eq!(regions.path_segment(), "regions");
        assert_eq!(regions.result_field().as_str(), "region");

        let departements: TerritoryType = "départements".parse().expect("valid type");
        assert_eq!(departements.path_segment(), "departements");
        assert_eq!(departements.result_field(), ResultField::Region);
    }

    #[test]
    fn unaccented_names_are_accepted() {
        assert_eq!(
            "departements".parse::<TerritoryType>().ok(),
            Some(TerritoryType::Departements)
        );
        assert_eq!(
            "Regions".parse::<TerritoryType>().ok(),
            Some(TerritoryType::Regions)
        );
        assert!("cantons".parse::<TerritoryType>().is_err());
    }

    #[test]
    fn display_uses_french_name() {
        assert_eq!(TerritoryType::Departements.to_string(), "départements");
    }
}
