//! Series specifications and the table builder that extracts them from a
//! dataset.

pub mod spec;
pub mod table;

pub use spec::{DisplayAttributes, Month, Season, SeriesPreset, SeriesSpec};
pub use table::{Point, SeriesData, SeriesTable, TableBuilder};
