use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use icefeed::series::Month;

const FIRST_YEAR: i64 = 1979;
const LAST_YEAR: i64 = 2024;

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

/// Arctic-like seasonal cycle: maximum in March, minimum in September,
/// shrinking slowly over the years.
fn extent(year: i64, month: Month, rng: &mut SimpleRng) -> f64 {
    let phase = 2.0 * std::f64::consts::PI * (month.number() as f64 - 3.0) / 12.0;
    let seasonal = 11.0 + 4.5 * phase.cos();
    let trend = 0.05 * (year - FIRST_YEAR) as f64 * (1.0 - 0.5 * phase.cos());
    let value = seasonal - trend + rng.gauss(0.0, 0.25);
    (value * 100.0).round() / 100.0
}

/// Cells deliberately left empty, like the real record's data gap.
fn is_gap(year: i64, month: Month) -> bool {
    matches!(
        (year, month),
        (1987, Month::Dec) | (1988, Month::Jan) | (LAST_YEAR, Month::Dec)
    )
}

/// The one cell written as text in the CSV output.
fn is_garbled(year: i64, month: Month) -> bool {
    (year, month) == (1995, Month::Jun)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let years: Vec<i64> = (FIRST_YEAR..=LAST_YEAR).collect();
    let table: Vec<Vec<Option<f64>>> = years
        .iter()
        .map(|&year| {
            Month::ALL
                .iter()
                .map(|&month| {
                    let value = extent(year, month, &mut rng);
                    (!is_gap(year, month)).then_some(value)
                })
                .collect()
        })
        .collect();

    // ---- Wide CSV ----
    let wide_csv = "sea_ice_wide.csv";
    let mut writer = csv::Writer::from_path(wide_csv).context("creating wide CSV")?;
    let mut header = vec!["Year".to_string()];
    header.extend(Month::ALL.iter().map(|m| m.column()));
    writer.write_record(&header)?;
    for (year, row) in years.iter().zip(&table) {
        let mut record = vec![year.to_string()];
        for (month, cell) in Month::ALL.iter().zip(row) {
            record.push(match cell {
                _ if is_garbled(*year, *month) => "bad".to_string(),
                Some(v) => v.to_string(),
                None => String::new(),
            });
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // ---- Long CSV ----
    let long_csv = "sea_ice_long.csv";
    let mut writer = csv::Writer::from_path(long_csv).context("creating long CSV")?;
    writer.write_record(["Date", "Value"])?;
    for (year, row) in years.iter().zip(&table) {
        for (month, cell) in Month::ALL.iter().zip(row) {
            let date = format!("{year}{:02}", month.number());
            let value = cell.map(|v| v.to_string()).unwrap_or_default();
            writer.write_record([date, value])?;
        }
    }
    writer.flush()?;

    // ---- Wide Parquet ----
    let mut fields = vec![Field::new("Year", DataType::Int64, false)];
    fields.extend(
        Month::ALL
            .iter()
            .map(|m| Field::new(m.column(), DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![Arc::new(Int64Array::from(years.clone()))];
    for (i, _) in Month::ALL.iter().enumerate() {
        let values: Vec<Option<f64>> = table.iter().map(|row| row[i]).collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let wide_parquet = "sea_ice_wide.parquet";
    let file = std::fs::File::create(wide_parquet).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} years of monthly extent to {wide_csv}, {long_csv} and {wide_parquet}",
        years.len()
    );
    Ok(())
}
