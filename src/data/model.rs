use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use super::rank;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while turning a source file into a [`BumpDataset`].
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("dataset contains no observations")]
    EmptyDataset,
}

// ---------------------------------------------------------------------------
// Observation – one row of the rank table
// ---------------------------------------------------------------------------

/// A country's rank in one Olympic year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i64,
    /// 1 is best.
    #[serde(rename = "Rank")]
    pub rank: i64,
    #[serde(rename = "TotalPoints")]
    pub total_points: f64,
}

impl Observation {
    pub fn new(country: impl Into<String>, year: i64, rank: i64, total_points: f64) -> Self {
        Self {
            country: country.into(),
            year,
            rank,
            total_points,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived aggregates
// ---------------------------------------------------------------------------

/// Mean rank of one country over every year it appears in.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCountry {
    pub country: String,
    pub avg_rank: f64,
}

/// All observations of one country, ordered by year ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    pub country: String,
    pub points: Vec<Observation>,
}

impl CountrySeries {
    /// The latest-year observation, where the series label is anchored.
    pub fn latest(&self) -> Option<&Observation> {
        self.points.last()
    }
}

// ---------------------------------------------------------------------------
// BumpDataset – the cached, filtered dataset
// ---------------------------------------------------------------------------

/// The loaded rank table restricted to the qualifying countries.
///
/// Built once per load and never mutated; UI toggles filter this copy in
/// memory instead of re-reading the source.
#[derive(Debug, Clone)]
pub struct BumpDataset {
    /// Observations of qualifying countries, in source order.
    pub observations: Vec<Observation>,
    /// Qualifying countries in first-seen order.
    pub countries: Vec<String>,
    /// Distinct years across every loaded row (before filtering), ascending.
    pub years: Vec<i64>,
    /// Largest rank among the qualifying observations.
    pub max_rank: i64,
}

impl BumpDataset {
    /// Select the `top_n` best countries by mean rank and keep only their rows.
    pub fn from_observations(rows: Vec<Observation>, top_n: usize) -> Result<Self, DataError> {
        if rows.is_empty() {
            return Err(DataError::EmptyDataset);
        }

        let mut years: Vec<i64> = rows.iter().map(|o| o.year).collect();
        years.sort_unstable();
        years.dedup();

        let qualifying = rank::qualifying_countries(&rows, top_n);
        let observations = rank::retain_countries(rows, &qualifying);

        let countries: Vec<String> = {
            let mut seen = HashSet::new();
            observations
                .iter()
                .filter(|o| seen.insert(o.country.as_str()))
                .map(|o| o.country.clone())
                .collect()
        };

        let max_rank = observations.iter().map(|o| o.rank).max().unwrap_or(1);

        Ok(BumpDataset {
            observations,
            countries,
            years,
            max_rank,
        })
    }

    /// Number of qualifying observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Whether `country` belongs to the qualifying set.
    pub fn contains(&self, country: &str) -> bool {
        self.countries.iter().any(|c| c == country)
    }

    /// Group observations by country for every country accepted by `keep`.
    ///
    /// Series come out in qualifying order and each is sorted by year.
    pub fn series<F>(&self, keep: F) -> Vec<CountrySeries>
    where
        F: Fn(&str) -> bool,
    {
        self.countries
            .iter()
            .filter(|c| keep(c))
            .filter_map(|c| self.series_for(c))
            .collect()
    }

    /// The series of a single country, if it qualifies.
    pub fn series_for(&self, country: &str) -> Option<CountrySeries> {
        let mut points: Vec<Observation> = self
            .observations
            .iter()
            .filter(|o| o.country == country)
            .cloned()
            .collect();
        if points.is_empty() {
            return None;
        }
        points.sort_by_key(|o| o.year);
        Some(CountrySeries {
            country: country.to_string(),
            points,
        })
    }
}
