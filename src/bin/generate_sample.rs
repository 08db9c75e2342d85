use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use olympic_bump::data::preprocess::{self, RankRow};
use parquet::arrow::ArrowWriter;

const GAMES: [i64; 4] = [2012, 2016, 2020, 2024];

/// (country, baseline medal points per games)
const COUNTRIES: [(&str, f64); 12] = [
    ("United States", 250.0),
    ("China", 210.0),
    ("Great Britain", 150.0),
    ("Russia", 140.0),
    ("Japan", 110.0),
    ("Australia", 100.0),
    ("Germany", 95.0),
    ("France", 90.0),
    ("Netherlands", 70.0),
    ("Italy", 65.0),
    ("Canada", 50.0),
    ("Brazil", 45.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Noisy points per country and games, dense-ranked within each games.
fn generate(rng: &mut SimpleRng) -> Vec<RankRow> {
    let mut rows = Vec::new();
    for &year in &GAMES {
        let mut points: Vec<(&str, i64)> = COUNTRIES
            .iter()
            .map(|&(country, base)| {
                let p = rng.gauss(base, base * 0.15).max(1.0).round() as i64;
                (country, p)
            })
            .collect();
        points.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut rank = 0;
        let mut previous = None;
        for (country, p) in points {
            if previous != Some(p) {
                rank += 1;
                previous = Some(p);
            }
            rows.push(RankRow {
                year,
                country: country.to_string(),
                total_points: p,
                rank,
            });
        }
    }
    rows
}

fn write_parquet(path: &Path, rows: &[RankRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Year", DataType::Int64, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("TotalPoints", DataType::Float64, false),
        Field::new("Rank", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.country.as_str()))),
            Arc::new(Float64Array::from_iter_values(
                rows.iter().map(|r| r.total_points as f64),
            )),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.rank))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = Path::new("sample_bump.csv");
    preprocess::write_rank_table(csv_path, &rows)?;
    let parquet_path = Path::new("sample_bump.parquet");
    write_parquet(parquet_path, &rows)?;

    println!(
        "Wrote {} rows ({} countries × {} games) to {} and {}",
        rows.len(),
        COUNTRIES.len(),
        GAMES.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
