//! # Catalog
//!
//! Static term and country lists the selectors draw from. The built-in catalog
//! is embedded at compile time and parsed once.

use std::sync::OnceLock;

use serde::Deserialize;
use shared::dto::trends::{Geo, Term};

use crate::core::error::{ExploreError, Result};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

static BUILTIN: OnceLock<std::result::Result<Catalog, ExploreError>> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Catalog {
    terms: Vec<Term>,
    countries: Vec<Geo>,
}

impl Catalog {
    /// Parse a catalog document. Both lists must be non-empty.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| ExploreError::Config(format!("invalid catalog: {}", e)))?;
        if catalog.terms.is_empty() || catalog.countries.is_empty() {
            return Err(ExploreError::Config(
                "catalog needs at least one term and one country".to_string(),
            ));
        }
        Ok(catalog)
    }

    /// The embedded catalog.
    pub fn builtin() -> Result<&'static Catalog> {
        BUILTIN
            .get_or_init(|| Catalog::from_json(BUILTIN_CATALOG))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn countries(&self) -> &[Geo] {
        &self.countries
    }

    pub fn term_by_entity(&self, entity: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.entity == entity)
    }

    /// Case-insensitive match on name or alias.
    pub fn term_by_name(&self, name: &str) -> Option<&Term> {
        let name = name.trim();
        self.terms.iter().find(|t| {
            t.name.eq_ignore_ascii_case(name)
                || t.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(name))
        })
    }

    pub fn country_by_iso(&self, iso: &str) -> Option<&Geo> {
        self.countries.iter().find(|c| c.iso.eq_ignore_ascii_case(iso.trim()))
    }

    /// First listed country.
    pub fn default_geo(&self) -> &Geo {
        &self.countries[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.terms().len() > 10);
        assert_eq!(catalog.default_geo().iso, "US");
    }

    #[test]
    fn test_lookups() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.term_by_entity("/m/0cycc").unwrap().name, "Influenza");
        assert_eq!(catalog.term_by_name("flu").unwrap().name, "Influenza");
        assert_eq!(catalog.term_by_name("skin RASH").unwrap().name, "Skin rash");
        assert_eq!(catalog.country_by_iso("au").unwrap().name, "Australia");
        assert!(catalog.term_by_entity("/m/unknown").is_none());
    }

    #[test]
    fn test_empty_catalog_is_config_error() {
        let err = Catalog::from_json(r#"{"terms":[],"countries":[]}"#).unwrap_err();
        assert!(matches!(err, ExploreError::Config(_)));
    }
}
