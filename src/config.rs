use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::assign_display;
use crate::data::filter::rows_where;
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::data::reshape::{pivot_months, split_date_column};
use crate::series::spec::{DisplayAttributes, Month, SeriesPreset, SeriesSpec};

/// Month column added when a long file is split.
const MONTH_COLUMN: &str = "Month";

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Row-filtering policy of the table builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Drop rows missing any required value before extraction.
    Strict,
    /// Decide per series and row.
    #[default]
    Tolerant,
}

/// Whether recoverable structural and destination errors abort the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    #[default]
    BestEffort,
    FailFast,
}

// ---------------------------------------------------------------------------
// Input layout
// ---------------------------------------------------------------------------

/// Shape of the input file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLayout {
    /// One row per key, one column per series.
    #[default]
    Wide,
    /// One row per `YYYYMM` date and value, pivoted to the wide layout on load.
    Long(LongLayout),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongLayout {
    pub date_column: String,
    pub value_column: String,
    /// Keep a single month, for a one-line chart per month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
}

impl Default for LongLayout {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            value_column: "Value".to_string(),
            month: None,
        }
    }
}

// ---------------------------------------------------------------------------
// FeedConfig
// ---------------------------------------------------------------------------

/// One configured series. `column` defaults to `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

/// Run configuration, read from JSON. Every field has a sea-ice default.
///
/// ```json
/// {
///   "key_column": "Year",
///   "preset": { "season": "Winter" },
///   "display": { "Dec_Value": { "color": [0, 0, 0], "thickness": 3.0 } },
///   "pacing_ms": 10,
///   "mode": "tolerant",
///   "layout": { "long": { "date_column": "Date", "value_column": "Value" } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub key_column: String,
    /// Explicit series; when empty the preset decides.
    pub series: Vec<SeriesEntry>,
    pub preset: SeriesPreset,
    pub display: BTreeMap<String, DisplayAttributes>,
    /// Pause between admitted points, in milliseconds. Zero disables pacing.
    pub pacing_ms: u64,
    pub mode: ValidationMode,
    pub policy: ErrorPolicy,
    /// Live destinations reject keys smaller than their last key.
    pub progressive_x: bool,
    pub layout: DataLayout,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            key_column: "Year".to_string(),
            series: Vec::new(),
            preset: SeriesPreset::AllMonths,
            display: BTreeMap::new(),
            pacing_ms: 0,
            mode: ValidationMode::Tolerant,
            policy: ErrorPolicy::BestEffort,
            progressive_x: false,
            layout: DataLayout::Wide,
        }
    }
}

impl FeedConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn pacing(&self) -> Option<Duration> {
        (self.pacing_ms > 0).then(|| Duration::from_millis(self.pacing_ms))
    }

    /// Load `path` and bring it into the wide layout the series read from.
    pub fn load_dataset(&self, path: &Path) -> Result<Dataset> {
        let dataset = load_file(path)?;
        self.reshape(dataset)
            .with_context(|| format!("reshaping {}", path.display()))
    }

    /// Split and pivot a long dataset; wide datasets pass through.
    pub fn reshape(&self, dataset: Dataset) -> Result<Dataset> {
        let DataLayout::Long(long) = &self.layout else {
            return Ok(dataset);
        };
        let mut split =
            split_date_column(dataset, &long.date_column, &self.key_column, MONTH_COLUMN)?;
        if let Some(month) = long.month {
            split = rows_where(&split, MONTH_COLUMN, f64::from(month.number()));
        }
        let wide = pivot_months(&split, &self.key_column, MONTH_COLUMN, &long.value_column)?;
        log::info!(
            "Pivoted {} long rows into {} {} rows",
            split.len(),
            wide.len(),
            self.key_column
        );
        Ok(wide)
    }

    /// Series specifications in configured order, display attributes
    /// resolved by series name and column.
    pub fn series_specs(&self) -> Vec<SeriesSpec> {
        let single_month = match &self.layout {
            DataLayout::Long(LongLayout {
                month: Some(month), ..
            }) => Some(*month),
            _ => None,
        };
        let entries: Vec<(String, String)> = if !self.series.is_empty() {
            self.series
                .iter()
                .map(|e| {
                    let column = e.column.clone().unwrap_or_else(|| e.name.clone());
                    (e.name.clone(), column)
                })
                .collect()
        } else if let Some(month) = single_month {
            vec![(month.column(), month.column())]
        } else {
            self.preset
                .columns()
                .into_iter()
                .map(|c| (c.clone(), c))
                .collect()
        };

        let display = assign_display(&entries, &self.display);

        entries
            .into_iter()
            .map(|(name, column)| {
                let attrs = display.get(&name).copied().unwrap_or_default();
                SeriesSpec::new(column).named(name).with_display(attrs)
            })
            .collect()
    }
}
