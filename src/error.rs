//! Error taxonomy for dataset construction, series building and feeding.
//!
//! Structural problems (missing key column, missing series column, length
//! mismatch) are found while building; per-point problems (invalid values,
//! rejected appends) while feeding. Only [`SeriesError::Schema`] is always
//! fatal; the rest degrade the output unless the run uses
//! [`ErrorPolicy::FailFast`](crate::config::ErrorPolicy::FailFast).

use thiserror::Error;

/// Violations of the uniform-schema invariant of a [`Dataset`](crate::data::model::Dataset).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("column '{0}' not found")]
    UnknownColumn(String),
}

/// Why a single (key, value) pair was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointIssue {
    MissingKey,
    MissingValue,
    NonNumericKey,
    NonNumericValue,
}

impl std::fmt::Display for PointIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PointIssue::MissingKey => "key is missing",
            PointIssue::MissingValue => "value is missing",
            PointIssue::NonNumericKey => "key is not numeric",
            PointIssue::NonNumericValue => "value is not numeric",
        };
        f.write_str(text)
    }
}

/// A destination refused a point.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppendError {
    #[error("non-finite point ({key}, {value})")]
    NonFinite { key: f64, value: f64 },

    #[error("key {key} is behind the last admitted key {last}")]
    OutOfOrder { key: f64, last: f64 },

    #[error("destination is closed")]
    Closed,
}

/// Errors raised while building series tables or feeding destinations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// The key column is not part of the dataset schema.
    #[error("key column '{column}' not found in dataset")]
    Schema { column: String },

    #[error("column '{column}' for series '{series}' not found in dataset")]
    MissingSeriesColumn { series: String, column: String },

    #[error("series '{series}' has {keys} keys but {values} values")]
    LengthMismatch {
        series: String,
        keys: usize,
        values: usize,
    },

    #[error("series '{series}', row {row}: {issue}")]
    InvalidPoint {
        series: String,
        row: usize,
        issue: PointIssue,
    },

    #[error("series '{series}', row {row}: destination rejected point: {source}")]
    DestinationAppend {
        series: String,
        row: usize,
        #[source]
        source: AppendError,
    },
}

impl SeriesError {
    /// Name of the series the error belongs to, if any.
    pub fn series(&self) -> Option<&str> {
        match self {
            SeriesError::Schema { .. } => None,
            SeriesError::MissingSeriesColumn { series, .. }
            | SeriesError::LengthMismatch { series, .. }
            | SeriesError::InvalidPoint { series, .. }
            | SeriesError::DestinationAppend { series, .. } => Some(series),
        }
    }
}
