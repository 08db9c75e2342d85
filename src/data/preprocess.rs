use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::loader::coerce_integer;
use super::model::DataError;

// ---------------------------------------------------------------------------
// Raw medal rows → per-year rank table
// ---------------------------------------------------------------------------

/// First Olympic year kept in the rank table.
pub const DEFAULT_MIN_YEAR: i64 = 2012;

/// Cell spellings read as a missing value, as CSV tooling conventionally does.
const MISSING_CELLS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    /// Any other non-missing entry, such as "No medal".  Worth nothing.
    Other,
}

impl Medal {
    /// Parse a medal cell.  `None` means the cell is missing and the row is dropped.
    pub fn parse(s: &str) -> Option<Medal> {
        let s = s.trim();
        if MISSING_CELLS.contains(&s) {
            return None;
        }
        Some(match s {
            "Gold" => Medal::Gold,
            "Silver" => Medal::Silver,
            "Bronze" => Medal::Bronze,
            _ => Medal::Other,
        })
    }

    pub fn points(self) -> i64 {
        match self {
            Medal::Gold => 3,
            Medal::Silver => 2,
            Medal::Bronze => 1,
            Medal::Other => 0,
        }
    }
}

/// One athlete-event result from the raw results table.
#[derive(Debug, Clone, PartialEq)]
pub struct MedalRow {
    pub year: i64,
    pub team: String,
    pub medal: Option<Medal>,
}

/// One row of the rank table written for the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRow {
    #[serde(rename = "Year")]
    pub year: i64,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "TotalPoints")]
    pub total_points: i64,
    #[serde(rename = "Rank")]
    pub rank: i64,
}

/// Sum medal points per (year, team) and dense-rank teams within each year.
///
/// Rows with a missing medal cell or before `min_year` are dropped.  A team
/// whose entries are all [`Medal::Other`] still gets a row, with 0 points.
/// Output is sorted by year, then rank, then country.
pub fn rank_by_year(rows: &[MedalRow], min_year: i64) -> Vec<RankRow> {
    let mut totals: BTreeMap<i64, BTreeMap<&str, i64>> = BTreeMap::new();
    for row in rows {
        let Some(medal) = row.medal else {
            continue;
        };
        if row.year < min_year {
            continue;
        }
        *totals
            .entry(row.year)
            .or_default()
            .entry(row.team.as_str())
            .or_default() += medal.points();
    }

    let mut out = Vec::new();
    for (year, teams) in totals {
        let mut distinct: Vec<i64> = teams.values().copied().collect();
        distinct.sort_unstable_by(|a, b| b.cmp(a));
        distinct.dedup();

        let mut ranked: Vec<RankRow> = teams
            .into_iter()
            .map(|(team, points)| RankRow {
                year,
                country: team.to_string(),
                total_points: points,
                rank: dense_rank(&distinct, points),
            })
            .collect();
        ranked.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.country.cmp(&b.country)));
        out.extend(ranked);
    }
    out
}

/// 1-based position of `points` among distinct totals sorted descending.
fn dense_rank(distinct_desc: &[i64], points: i64) -> i64 {
    distinct_desc
        .iter()
        .position(|&p| p == points)
        .map_or(distinct_desc.len() as i64 + 1, |i| i as i64 + 1)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Read `Year`, `Team` and `Medal` from a raw results CSV.  Other columns are ignored.
pub fn read_medal_rows(path: &Path) -> Result<Vec<MedalRow>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    parse_medal_rows(reader)
}

pub fn parse_medal_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<MedalRow>> {
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let column = |name: &str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };
    let year_idx = column("Year")?;
    let team_idx = column("Team")?;
    let medal_idx = column("Medal")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        rows.push(MedalRow {
            year: coerce_integer(cell(year_idx), row_no, "Year")?,
            team: cell(team_idx).to_string(),
            medal: Medal::parse(cell(medal_idx)),
        });
    }
    Ok(rows)
}

/// Write the rank table as CSV with a header row.
pub fn write_rank_table(path: &Path, rows: &[RankRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("writing rank row")?;
    }
    writer.flush().context("flushing rank table")?;
    Ok(())
}
