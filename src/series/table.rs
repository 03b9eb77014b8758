use crate::config::{ErrorPolicy, ValidationMode};
use crate::data::filter::complete_case_indices;
use crate::data::model::{CellValue, Dataset};
use crate::error::SeriesError;

use super::spec::SeriesSpec;

// ---------------------------------------------------------------------------
// Built series
// ---------------------------------------------------------------------------

/// A single (key, value) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub key: f64,
    pub value: f64,
}

/// One extracted series. `keys`, `values` and `rows` are index-aligned;
/// `rows` holds the source row of each point.
#[derive(Debug, Clone)]
pub struct SeriesData {
    pub spec: SeriesSpec,
    pub keys: Vec<f64>,
    pub values: Vec<f64>,
    pub rows: Vec<usize>,
}

impl SeriesData {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.keys
            .iter()
            .zip(&self.values)
            .map(|(&key, &value)| Point { key, value })
    }
}

/// Result of a table build: the series that survived plus the recoverable
/// problems met on the way.
#[derive(Debug, Clone)]
pub struct SeriesTable {
    pub key_column: String,
    pub mode: ValidationMode,
    pub series: Vec<SeriesData>,
    pub warnings: Vec<SeriesError>,
    /// Rows in the source dataset.
    pub rows_total: usize,
    /// Rows left after the strict-mode filter (all rows in tolerant mode).
    pub rows_kept: usize,
}

impl SeriesTable {
    pub fn get(&self, name: &str) -> Option<&SeriesData> {
        self.series.iter().find(|s| s.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.series.iter().map(SeriesData::name).collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Turns a [`Dataset`] plus series specifications into per-series point
/// sequences.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    key_column: String,
    mode: ValidationMode,
    policy: ErrorPolicy,
}

impl TableBuilder {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            mode: ValidationMode::default(),
            policy: ErrorPolicy::default(),
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the table.
    ///
    /// Fails with [`SeriesError::Schema`] when the key column is absent.
    /// Missing series columns and length mismatches exclude the affected
    /// series and are collected in [`SeriesTable::warnings`], or returned as
    /// the error under [`ErrorPolicy::FailFast`].
    ///
    /// In strict mode a non-numeric text cell survives the complete-case
    /// filter, so its series no longer pairs up and the whole series is
    /// excluded. The strict [`FeedDriver`](crate::feed::FeedDriver) only skips
    /// that one point, so the two can disagree on such input.
    pub fn build(&self, dataset: &Dataset, specs: &[SeriesSpec]) -> Result<SeriesTable, SeriesError> {
        let key_pos = dataset
            .column_index(&self.key_column)
            .ok_or_else(|| SeriesError::Schema {
                column: self.key_column.clone(),
            })?;

        let mut warnings = Vec::new();
        let mut present: Vec<(&SeriesSpec, usize)> = Vec::with_capacity(specs.len());
        for spec in specs {
            match dataset.column_index(&spec.column) {
                Some(pos) => present.push((spec, pos)),
                None => {
                    let err = SeriesError::MissingSeriesColumn {
                        series: spec.name.clone(),
                        column: spec.column.clone(),
                    };
                    self.recover(err, &mut warnings)?;
                }
            }
        }

        let rows: Vec<usize> = match self.mode {
            ValidationMode::Strict => {
                let mut required: Vec<&str> = vec![self.key_column.as_str()];
                required.extend(present.iter().map(|(spec, _)| spec.column.as_str()));
                complete_case_indices(dataset, &required)
            }
            ValidationMode::Tolerant => (0..dataset.len()).collect(),
        };

        let mut series = Vec::with_capacity(present.len());
        for (spec, value_pos) in present {
            let extracted = match self.mode {
                ValidationMode::Strict => extract_columns(dataset, &rows, key_pos, value_pos, spec),
                ValidationMode::Tolerant => extract_pairs(dataset, &rows, key_pos, value_pos, spec),
            };
            match check_lengths(extracted) {
                Ok(data) => series.push(data),
                Err(err) => self.recover(err, &mut warnings)?,
            }
        }

        log::info!(
            "Built {} of {} series over {} of {} rows ({:?} mode)",
            series.len(),
            specs.len(),
            rows.len(),
            dataset.len(),
            self.mode
        );

        Ok(SeriesTable {
            key_column: self.key_column.clone(),
            mode: self.mode,
            series,
            warnings,
            rows_total: dataset.len(),
            rows_kept: rows.len(),
        })
    }

    fn recover(&self, err: SeriesError, warnings: &mut Vec<SeriesError>) -> Result<(), SeriesError> {
        if self.policy == ErrorPolicy::FailFast {
            return Err(err);
        }
        log::warn!("Skipping series: {err}");
        warnings.push(err);
        Ok(())
    }
}

/// Extraction as read by key and value columns independently; the key
/// sequence and the value sequence each keep only their numeric cells.
struct Extracted<'a> {
    spec: &'a SeriesSpec,
    keys: Vec<(usize, f64)>,
    values: Vec<(usize, f64)>,
}

fn numeric_cells(dataset: &Dataset, rows: &[usize], pos: usize) -> Vec<(usize, f64)> {
    rows.iter()
        .filter_map(|&i| {
            let value = dataset.row(i)?.at(pos).and_then(CellValue::as_f64)?;
            Some((i, value))
        })
        .collect()
}

/// Strict mode: rows are already complete, so key and value columns are read
/// whole and must line up.
fn extract_columns<'a>(
    dataset: &Dataset,
    rows: &[usize],
    key_pos: usize,
    value_pos: usize,
    spec: &'a SeriesSpec,
) -> Extracted<'a> {
    Extracted {
        spec,
        keys: numeric_cells(dataset, rows, key_pos),
        values: numeric_cells(dataset, rows, value_pos),
    }
}

/// Tolerant mode: each row contributes a point only if both cells coerce.
fn extract_pairs<'a>(
    dataset: &Dataset,
    rows: &[usize],
    key_pos: usize,
    value_pos: usize,
    spec: &'a SeriesSpec,
) -> Extracted<'a> {
    let mut keys = Vec::new();
    let mut values = Vec::new();
    for &i in rows {
        let Some(row) = dataset.row(i) else { continue };
        let key = row.at(key_pos).and_then(CellValue::as_f64);
        let value = row.at(value_pos).and_then(CellValue::as_f64);
        if let (Some(key), Some(value)) = (key, value) {
            keys.push((i, key));
            values.push((i, value));
        }
    }
    Extracted { spec, keys, values }
}

/// A series is emitted only when its key and value sequences pair up row by
/// row.
fn check_lengths(extracted: Extracted<'_>) -> Result<SeriesData, SeriesError> {
    let aligned = extracted.keys.len() == extracted.values.len()
        && extracted
            .keys
            .iter()
            .zip(&extracted.values)
            .all(|((kr, _), (vr, _))| kr == vr);
    if !aligned {
        return Err(SeriesError::LengthMismatch {
            series: extracted.spec.name.clone(),
            keys: extracted.keys.len(),
            values: extracted.values.len(),
        });
    }

    let rows = extracted.keys.iter().map(|(r, _)| *r).collect();
    let keys = extracted.keys.into_iter().map(|(_, k)| k).collect();
    let values = extracted.values.into_iter().map(|(_, v)| v).collect();
    Ok(SeriesData {
        spec: extracted.spec.clone(),
        keys,
        values,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["Year".into(), "Jan_Value".into(), "Feb_Value".into()],
            vec![
                vec![1979i64.into(), 15.4.into(), 16.1.into()],
                vec![1980i64.into(), CellValue::Missing, 16.0.into()],
                vec![1981i64.into(), 15.0.into(), 15.9.into()],
            ],
        )
        .unwrap()
    }

    fn specs(columns: &[&str]) -> Vec<SeriesSpec> {
        columns.iter().map(|c| SeriesSpec::new(*c)).collect()
    }

    #[test]
    fn missing_key_column_is_a_schema_error() {
        let err = TableBuilder::new("Date")
            .build(&dataset(), &specs(&["Jan_Value"]))
            .unwrap_err();
        assert_eq!(err, SeriesError::Schema { column: "Date".into() });
    }

    #[test]
    fn missing_series_column_is_skipped() {
        let ds = Dataset::new(
            vec!["Year".into(), "Jan_Value".into()],
            vec![vec![1979i64.into(), 15.4.into()]],
        )
        .unwrap();
        let table = TableBuilder::new("Year")
            .build(&ds, &specs(&["Jan_Value", "Missing_Value"]))
            .unwrap();

        assert_eq!(table.names(), ["Jan_Value"]);
        assert_eq!(
            table.warnings,
            vec![SeriesError::MissingSeriesColumn {
                series: "Missing_Value".into(),
                column: "Missing_Value".into(),
            }]
        );
    }

    #[test]
    fn strict_mode_drops_incomplete_rows_for_every_series() {
        let table = TableBuilder::new("Year")
            .with_mode(ValidationMode::Strict)
            .build(&dataset(), &specs(&["Jan_Value", "Feb_Value"]))
            .unwrap();

        assert_eq!(table.rows_kept, 2);
        for series in &table.series {
            assert_eq!(series.keys, vec![1979.0, 1981.0]);
            assert_eq!(series.rows, vec![0, 2]);
        }
        assert_eq!(table.get("Feb_Value").unwrap().values, vec![16.1, 15.9]);
    }

    #[test]
    fn tolerant_mode_keeps_series_independent() {
        let table = TableBuilder::new("Year")
            .with_mode(ValidationMode::Tolerant)
            .build(&dataset(), &specs(&["Jan_Value", "Feb_Value"]))
            .unwrap();

        assert_eq!(table.get("Jan_Value").unwrap().keys, vec![1979.0, 1981.0]);
        assert_eq!(
            table.get("Feb_Value").unwrap().keys,
            vec![1979.0, 1980.0, 1981.0]
        );
    }

    #[test]
    fn built_series_have_aligned_lengths() {
        for mode in [ValidationMode::Strict, ValidationMode::Tolerant] {
            let table = TableBuilder::new("Year")
                .with_mode(mode)
                .build(&dataset(), &specs(&["Jan_Value", "Feb_Value"]))
                .unwrap();
            for series in &table.series {
                assert_eq!(series.keys.len(), series.values.len());
                assert_eq!(series.keys.len(), series.rows.len());
            }
        }
    }

    #[test]
    fn non_numeric_cell_in_strict_mode_is_a_length_mismatch() {
        let ds = Dataset::new(
            vec!["Year".into(), "Jan_Value".into(), "Feb_Value".into()],
            vec![
                vec![1979i64.into(), "bad".into(), 16.1.into()],
                vec![1980i64.into(), 15.1.into(), 16.0.into()],
            ],
        )
        .unwrap();
        let table = TableBuilder::new("Year")
            .with_mode(ValidationMode::Strict)
            .build(&ds, &specs(&["Jan_Value", "Feb_Value"]))
            .unwrap();

        assert_eq!(table.names(), ["Feb_Value"]);
        assert_eq!(
            table.warnings,
            vec![SeriesError::LengthMismatch {
                series: "Jan_Value".into(),
                keys: 2,
                values: 1,
            }]
        );
    }

    #[test]
    fn fail_fast_escalates_missing_column() {
        let err = TableBuilder::new("Year")
            .with_policy(ErrorPolicy::FailFast)
            .build(&dataset(), &specs(&["Jan_Value", "Missing_Value"]))
            .unwrap_err();
        assert!(matches!(err, SeriesError::MissingSeriesColumn { .. }));
    }

    #[test]
    fn fail_fast_escalates_length_mismatch() {
        let ds = Dataset::new(
            vec!["Year".into(), "Jan_Value".into(), "Feb_Value".into()],
            vec![
                vec![1979i64.into(), 15.4.into(), 16.1.into()],
                vec![1980i64.into(), 15.1.into(), "bad".into()],
            ],
        )
        .unwrap();
        let err = TableBuilder::new("Year")
            .with_mode(ValidationMode::Strict)
            .with_policy(ErrorPolicy::FailFast)
            .build(&ds, &specs(&["Jan_Value", "Feb_Value"]))
            .unwrap_err();
        assert_eq!(
            err,
            SeriesError::LengthMismatch {
                series: "Feb_Value".into(),
                keys: 2,
                values: 1,
            }
        );
    }

    #[test]
    fn series_names_differ_from_columns() {
        let spec = SeriesSpec::new("Jan_Value").named("January");
        let table = TableBuilder::new("Year").build(&dataset(), &[spec]).unwrap();
        assert_eq!(table.names(), ["January"]);
        assert_eq!(table.get("January").unwrap().points().count(), 2);
    }
}
