//! # Trends Data Transfer Objects
//!
//! Catalog entities, filters and the series/top-query payloads returned by the
//! trends API.

use serde::{Deserialize, Serialize};

/// A searchable entity (disease, symptom) from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Opaque knowledge-graph id used by the trends API
    pub entity: String,
    /// Display name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Term {
    pub fn new(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            name: name.into(),
            alias: None,
        }
    }
}

/// A geographic region from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    pub iso: String,
    pub name: String,
}

impl Geo {
    pub fn new(iso: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            iso: iso.into(),
            name: name.into(),
        }
    }
}

/// Terms plus region. Term order is significant and preserved end-to-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub terms: Vec<Term>,
    pub geo: Geo,
}

/// Single dated observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// One term's series as handed to the chart collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSeries {
    pub term: String,
    pub points: Vec<SeriesPoint>,
}

/// Raw interest series for every term of a filter, in term order.
pub type RawGraph = Vec<TermSeries>;

/// One line of the graph response (no term label on the wire).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLine {
    pub points: Vec<SeriesPoint>,
}

/// Response of `GET /api/trends/graph`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    pub lines: Vec<GraphLine>,
}

impl GraphResponse {
    /// Label each line with the term at the same index.
    ///
    /// Lines beyond the term list are dropped; callers check the line count first.
    pub fn into_term_series(self, terms: &[Term]) -> RawGraph {
        self.lines
            .into_iter()
            .zip(terms)
            .map(|(line, term)| TermSeries {
                term: term.name.clone(),
                points: line.points,
            })
            .collect()
    }
}

/// A related query surfaced for a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopQuery {
    pub title: String,
    pub value: f64,
}

/// Top queries for one term. The API omits `item` when it has nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopQueries {
    #[serde(default)]
    pub item: Vec<TopQuery>,
}

impl TopQueries {
    pub fn is_empty(&self) -> bool {
        self.item.is_empty()
    }
}

/// Average interest of one term over the filter window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermAverage {
    pub term: String,
    pub value: f64,
}

/// Response of `GET /api/trends/averages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAverages {
    pub averages: Vec<TermAverage>,
}
