use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

/// Return indices of rows with a non-missing cell in every listed column.
///
/// A column absent from the schema imposes no constraint; callers decide
/// separately what an absent column means.
pub fn complete_case_indices(dataset: &Dataset, columns: &[&str]) -> Vec<usize> {
    let positions: Vec<usize> = columns
        .iter()
        .filter_map(|col| dataset.column_index(col))
        .collect();

    let keep: Vec<usize> = dataset
        .rows()
        .enumerate()
        .filter(|(_, row)| {
            positions
                .iter()
                .all(|&i| row.at(i).is_some_and(|cell| !cell.is_missing()))
        })
        .map(|(i, _)| i)
        .collect();
    log::debug!(
        "Complete-case filter kept {} of {} rows",
        keep.len(),
        dataset.len()
    );
    keep
}

/// Rows whose `column` coerces to `value`. An absent column selects nothing.
pub fn rows_where(dataset: &Dataset, column: &str, value: f64) -> Dataset {
    let Some(pos) = dataset.column_index(column) else {
        return dataset.select_rows(&[]);
    };
    let keep: Vec<usize> = dataset
        .rows()
        .enumerate()
        .filter(|(_, row)| row.at(pos).and_then(CellValue::as_f64) == Some(value))
        .map(|(i, _)| i)
        .collect();
    dataset.select_rows(&keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["Year".into(), "Jan_Value".into(), "Feb_Value".into()],
            vec![
                vec![1979i64.into(), 15.4.into(), 16.1.into()],
                vec![1980i64.into(), CellValue::Missing, 16.0.into()],
                vec![1981i64.into(), 15.0.into(), f64::NAN.into()],
                vec![1982i64.into(), 15.2.into(), "bad".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn keeps_exactly_the_complete_rows() {
        let ds = sample();
        let cols = ["Year", "Jan_Value", "Feb_Value"];
        let kept = complete_case_indices(&ds, &cols);
        assert_eq!(kept, vec![0, 3]);

        // every kept row is complete, every complete row is kept
        for (i, row) in ds.rows().enumerate() {
            let complete = cols
                .iter()
                .all(|c| row.get(c).is_some_and(|v| !v.is_missing()));
            assert_eq!(complete, kept.contains(&i), "row {i}");
        }
    }

    #[test]
    fn absent_columns_do_not_filter() {
        let ds = sample();
        assert_eq!(complete_case_indices(&ds, &["Year", "Missing_Value"]).len(), 4);
    }

    #[test]
    fn complete_rows_keep_their_order() {
        assert_eq!(complete_case_indices(&sample(), &["Jan_Value"]), vec![0, 2, 3]);
    }

    #[test]
    fn rows_where_matches_numeric_value() {
        let ds = rows_where(&sample(), "Year", 1980.0);
        assert_eq!(ds.len(), 1);
        assert!(rows_where(&sample(), "Month", 1.0).is_empty());
    }
}
