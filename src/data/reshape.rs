//! Conversions between the long (`Date`, `Value`) and wide (`Year`,
//! `Jan_Value` … `Dec_Value`) sea-ice layouts.

use std::collections::HashMap;

use crate::error::DataError;
use crate::series::spec::Month;

use super::model::{CellValue, Dataset};

/// Split a `YYYYMM` date column into integer year and month columns appended
/// to the schema. Dates that cannot be read give missing cells.
pub fn split_date_column(
    dataset: Dataset,
    date_column: &str,
    year_column: &str,
    month_column: &str,
) -> Result<Dataset, DataError> {
    let pos = dataset
        .column_index(date_column)
        .ok_or_else(|| DataError::UnknownColumn(date_column.to_string()))?;

    let (years, months): (Vec<CellValue>, Vec<CellValue>) = dataset
        .rows()
        .map(|row| match row.at(pos).and_then(parse_yyyymm) {
            Some((y, m)) => (CellValue::Integer(y), CellValue::Integer(m)),
            None => (CellValue::Missing, CellValue::Missing),
        })
        .unzip();

    dataset
        .with_column(year_column, years)?
        .with_column(month_column, months)
}

fn parse_yyyymm(cell: &CellValue) -> Option<(i64, i64)> {
    let text = match cell {
        CellValue::Integer(i) => i.to_string(),
        CellValue::Text(s) => s.trim().to_string(),
        _ => return None,
    };
    if text.len() < 5 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (year, month) = text.split_at(4);
    let year: i64 = year.parse().ok()?;
    let month: i64 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// Pivot a long table (one row per key and month) into the wide layout:
/// `key_column` followed by one `<Mon>_Value` column per month.
///
/// Output rows follow the first appearance of each key. Rows whose key or
/// month cannot be read are skipped; a later duplicate overwrites the earlier
/// cell.
pub fn pivot_months(
    dataset: &Dataset,
    key_column: &str,
    month_column: &str,
    value_column: &str,
) -> Result<Dataset, DataError> {
    let lookup = |name: &str| {
        dataset
            .column_index(name)
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    };
    let key_pos = lookup(key_column)?;
    let month_pos = lookup(month_column)?;
    let value_pos = lookup(value_column)?;

    let mut order: HashMap<u64, usize> = HashMap::new();
    let mut rows: Vec<Vec<CellValue>> = Vec::new();

    for row in dataset.rows() {
        let Some(key) = row.at(key_pos).and_then(CellValue::as_f64) else {
            continue;
        };
        let Some(month) = row
            .at(month_pos)
            .and_then(CellValue::as_f64)
            .and_then(whole_month)
        else {
            continue;
        };
        let slot = *order.entry(key.to_bits()).or_insert_with(|| {
            let key_cell = row.at(key_pos).cloned().unwrap_or(CellValue::Missing);
            let mut cells = vec![CellValue::Missing; Month::ALL.len() + 1];
            cells[0] = key_cell;
            rows.push(cells);
            rows.len() - 1
        });
        rows[slot][month.number() as usize] =
            row.at(value_pos).cloned().unwrap_or(CellValue::Missing);
    }

    let mut columns = vec![key_column.to_string()];
    columns.extend(Month::ALL.iter().map(|m| m.column()));
    Dataset::new(columns, rows)
}

/// Only integral month numbers name a month.
fn whole_month(m: f64) -> Option<Month> {
    if m.fract() != 0.0 || !(1.0..=12.0).contains(&m) {
        return None;
    }
    Month::from_number(m as u32)
}
