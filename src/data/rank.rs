use std::collections::{HashMap, HashSet};

use super::model::{Observation, RankedCountry};

// ---------------------------------------------------------------------------
// Top-N selection by mean rank
// ---------------------------------------------------------------------------

/// Mean rank per country, in the order countries are first seen.
pub fn average_ranks(observations: &[Observation]) -> Vec<RankedCountry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, f64, usize)> = Vec::new();

    for o in observations {
        match index.get(o.country.as_str()) {
            Some(&i) => {
                totals[i].1 += o.rank as f64;
                totals[i].2 += 1;
            }
            None => {
                index.insert(o.country.as_str(), totals.len());
                totals.push((o.country.as_str(), o.rank as f64, 1));
            }
        }
    }

    totals
        .into_iter()
        .map(|(country, sum, count)| RankedCountry {
            country: country.to_string(),
            avg_rank: sum / count as f64,
        })
        .collect()
}

/// Countries with the `top_n` lowest mean ranks, best first.
///
/// The sort is stable, so equal means keep first-seen order.
pub fn qualifying_countries(observations: &[Observation], top_n: usize) -> Vec<String> {
    let mut ranked = average_ranks(observations);
    ranked.sort_by(|a, b| a.avg_rank.total_cmp(&b.avg_rank));
    ranked.truncate(top_n);
    ranked.into_iter().map(|r| r.country).collect()
}

/// Drop every observation whose country is not in `countries`.
pub fn retain_countries(observations: Vec<Observation>, countries: &[String]) -> Vec<Observation> {
    let keep: HashSet<&str> = countries.iter().map(String::as_str).collect();
    observations
        .into_iter()
        .filter(|o| keep.contains(o.country.as_str()))
        .collect()
}
