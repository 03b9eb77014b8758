use std::collections::HashMap;
use std::fmt;

use crate::error::DataError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a tabular dataset
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Missing => write!(f, "<missing>"),
        }
    }
}

impl CellValue {
    /// A float NaN counts as missing, the way dataframes treat it.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric coercion used for points: integers, finite floats, and text
    /// that parses as a finite float. Bools are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

// ---------------------------------------------------------------------------
// Dataset – rows over a uniform schema
// ---------------------------------------------------------------------------

/// An ordered sequence of rows sharing one schema. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset, checking that every row matches the schema width and
    /// that column names are unique.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, DataError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(DataError::DuplicateColumn(name.clone()));
            }
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(DataError::RaggedRow {
                    row,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
        }
        Ok(Dataset {
            columns,
            index,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Iterate rows in input order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            dataset: self,
            cells,
        })
    }

    pub fn row(&self, i: usize) -> Option<Row<'_>> {
        self.rows.get(i).map(|cells| Row {
            dataset: self,
            cells,
        })
    }

    /// Keep only the rows at `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        Dataset {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows,
        }
    }

    /// Append a derived column. `values` must hold one cell per row.
    pub fn with_column(
        mut self,
        name: &str,
        values: Vec<CellValue>,
    ) -> Result<Dataset, DataError> {
        if self.has_column(name) {
            return Err(DataError::DuplicateColumn(name.to_string()));
        }
        if values.len() != self.rows.len() {
            return Err(DataError::RaggedRow {
                row: values.len().min(self.rows.len()),
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        self.index.insert(name.to_string(), self.columns.len());
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(self)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    dataset: &'a Dataset,
    cells: &'a [CellValue],
}

impl<'a> Row<'a> {
    /// Cell by column name; `None` when the column is not in the schema.
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        self.dataset
            .column_index(column)
            .and_then(|i| self.cells.get(i))
    }

    /// Cell by column position.
    pub fn at(&self, index: usize) -> Option<&'a CellValue> {
        self.cells.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion() {
        assert_eq!(CellValue::Integer(1979).as_f64(), Some(1979.0));
        assert_eq!(CellValue::Float(15.4).as_f64(), Some(15.4));
        assert_eq!(CellValue::from(" 14.2 ").as_f64(), Some(14.2));
        assert_eq!(CellValue::from("bad").as_f64(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::from("inf").as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
        assert_eq!(CellValue::Missing.as_f64(), None);
    }

    #[test]
    fn nan_is_missing() {
        assert!(CellValue::Float(f64::NAN).is_missing());
        assert!(CellValue::Missing.is_missing());
        assert!(!CellValue::from("").is_missing());
    }

    #[test]
    fn rejects_ragged_rows_and_duplicates() {
        let err = Dataset::new(
            vec!["Year".into(), "Jan_Value".into()],
            vec![vec![1979i64.into()]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DataError::RaggedRow {
                row: 0,
                expected: 2,
                found: 1
            }
        );

        let err = Dataset::new(vec!["Year".into(), "Year".into()], vec![]).unwrap_err();
        assert_eq!(err, DataError::DuplicateColumn("Year".into()));
    }

    #[test]
    fn row_lookup_by_name() {
        let ds = Dataset::new(
            vec!["Year".into(), "Jan_Value".into()],
            vec![vec![1979i64.into(), 15.4.into()]],
        )
        .unwrap();
        let row = ds.row(0).unwrap();
        assert_eq!(row.get("Jan_Value"), Some(&CellValue::Float(15.4)));
        assert_eq!(row.get("Feb_Value"), None);
        assert!(ds.has_column("Year"));
        assert_eq!(ds.column_index("Jan_Value"), Some(1));
    }

    #[test]
    fn with_column_appends_cells() {
        let ds = Dataset::new(vec!["Date".into()], vec![vec![197901i64.into()]])
            .unwrap()
            .with_column("Year", vec![1979i64.into()])
            .unwrap();
        assert_eq!(ds.columns(), ["Date".to_string(), "Year".to_string()]);
        assert_eq!(ds.row(0).unwrap().get("Year"), Some(&CellValue::Integer(1979)));
    }
}
