/// Data layer: core types, loading, filtering and reshaping.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ reshape   │  long (Date, Value) → wide (Year, Jan_Value, …)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  complete cases / row selection
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod reshape;
