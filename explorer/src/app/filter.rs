//! # Filter State
//!
//! Pending vs. confirmed term/geo selection. Edits are staged as pending and
//! only reach a pipeline run through [`FilterState::confirm`].

use shared::dto::trends::{Filter, Geo, Term};

use crate::catalog::Catalog;
use crate::core::error::{ExploreError, Result};

/// Original selector limit.
pub const DEFAULT_MAX_TERMS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pending_terms: Vec<Term>,
    pending_geo: Geo,
    confirmed_terms: Vec<Term>,
    confirmed_geo: Geo,
    /// Whether the confirm/cancel controls are shown
    affordance_visible: bool,
    max_terms: usize,
}

impl FilterState {
    pub fn new(geo: Geo, max_terms: usize) -> Self {
        Self {
            pending_terms: Vec::new(),
            pending_geo: geo.clone(),
            confirmed_terms: Vec::new(),
            confirmed_geo: geo,
            affordance_visible: false,
            max_terms,
        }
    }

    /// Stage a new term selection.
    pub fn select_terms(&mut self, terms: Vec<Term>) -> Result<()> {
        if terms.len() > self.max_terms {
            return Err(ExploreError::Validation(format!(
                "at most {} terms can be compared, got {}",
                self.max_terms,
                terms.len()
            )));
        }
        self.pending_terms = terms;
        self.affordance_visible = true;
        Ok(())
    }

    /// Stage a new region.
    pub fn select_geo(&mut self, geo: Geo) {
        self.pending_geo = geo;
        self.affordance_visible = true;
    }

    /// Stage terms by catalog entity id, keeping the given order.
    pub fn select_terms_by_entity(&mut self, catalog: &Catalog, entities: &[&str]) -> Result<()> {
        let terms = entities
            .iter()
            .map(|entity| {
                catalog
                    .term_by_entity(entity)
                    .cloned()
                    .ok_or_else(|| ExploreError::Validation(format!("unknown term {}", entity)))
            })
            .collect::<Result<Vec<_>>>()?;
        self.select_terms(terms)
    }

    /// Stage a region by catalog ISO code.
    pub fn select_geo_by_iso(&mut self, catalog: &Catalog, iso: &str) -> Result<()> {
        let geo = catalog
            .country_by_iso(iso)
            .cloned()
            .ok_or_else(|| ExploreError::Validation(format!("unknown region {}", iso)))?;
        self.select_geo(geo);
        Ok(())
    }

    /// Revert pending edits to the last confirmed selection.
    pub fn cancel(&mut self) {
        self.pending_terms = self.confirmed_terms.clone();
        self.pending_geo = self.confirmed_geo.clone();
        self.affordance_visible = false;
    }

    /// Promote pending to confirmed and return the filter for the new run.
    ///
    /// An empty term list is rejected and leaves both selections untouched.
    pub fn confirm(&mut self) -> Result<Filter> {
        if self.pending_terms.is_empty() {
            return Err(ExploreError::Validation(
                "select at least one term before confirming".to_string(),
            ));
        }
        self.confirmed_terms = self.pending_terms.clone();
        self.confirmed_geo = self.pending_geo.clone();
        self.affordance_visible = false;
        Ok(self.confirmed())
    }

    /// Replace both selections with `filter`, as when opening a curated view.
    pub fn load(&mut self, filter: &Filter) -> Result<()> {
        if filter.terms.is_empty() || filter.terms.len() > self.max_terms {
            return Err(ExploreError::Validation(format!(
                "curated filter must have 1..={} terms, got {}",
                self.max_terms,
                filter.terms.len()
            )));
        }
        self.pending_terms = filter.terms.clone();
        self.pending_geo = filter.geo.clone();
        self.confirmed_terms = filter.terms.clone();
        self.confirmed_geo = filter.geo.clone();
        self.affordance_visible = false;
        Ok(())
    }

    pub fn pending(&self) -> Filter {
        Filter {
            terms: self.pending_terms.clone(),
            geo: self.pending_geo.clone(),
        }
    }

    pub fn confirmed(&self) -> Filter {
        Filter {
            terms: self.confirmed_terms.clone(),
            geo: self.confirmed_geo.clone(),
        }
    }

    pub fn affordance_visible(&self) -> bool {
        self.affordance_visible
    }

    pub fn max_terms(&self) -> usize {
        self.max_terms
    }
}
