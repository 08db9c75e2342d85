use std::path::PathBuf;

use anyhow::{Context, Result};
use olympic_bump::data::preprocess::{self, DEFAULT_MIN_YEAR};

const DEFAULT_OUTPUT: &str = "bump_data_decade.csv";

/// Turn a raw per-athlete results CSV into the rank table the chart reads.
///
/// Usage: `preprocess INPUT.csv [OUTPUT.csv]`
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .context("usage: preprocess INPUT.csv [OUTPUT.csv]")?;
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let rows = preprocess::read_medal_rows(&input)?;
    log::info!("Read {} result rows from {}", rows.len(), input.display());

    let ranked = preprocess::rank_by_year(&rows, DEFAULT_MIN_YEAR);
    preprocess::write_rank_table(&output, &ranked)?;

    println!("Wrote {} ranked rows to {}", ranked.len(), output.display());
    Ok(())
}
