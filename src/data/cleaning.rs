use std::collections::HashSet;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Duplicate removal
// ---------------------------------------------------------------------------

/// Drop rows equal to an earlier row across all columns, keeping the first
/// occurrence in place. Returns the number of rows removed.
pub fn remove_duplicates(table: &mut Table) -> usize {
    let before = table.row_count();
    let keep: Vec<bool> = {
        let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(before);
        let keep: Vec<bool> = (0..before)
            .map(|idx| table.row(idx).is_some_and(|row| seen.insert(row)))
            .collect();
        keep
    };
    table.retain_rows(&keep);
    before - table.row_count()
}

// ---------------------------------------------------------------------------
// Mean imputation
// ---------------------------------------------------------------------------

/// What [`fill_missing_with_mean`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    /// `(column, cells filled, mean used)` for every numeric column that had gaps.
    pub filled: Vec<(String, usize, f64)>,
    /// Numeric columns with no present value, left as they were.
    pub skipped: Vec<String>,
}

impl FillReport {
    pub fn cells_filled(&self) -> usize {
        self.filled.iter().map(|(_, n, _)| n).sum()
    }
}

/// Replace missing cells of every numeric column with the mean of that
/// column's present values. Text and boolean columns are not touched.
pub fn fill_missing_with_mean(table: &mut Table) -> FillReport {
    let mut report = FillReport::default();

    for column in table.columns_mut() {
        if !column.kind.is_numeric() {
            continue;
        }
        let missing = column.null_count();
        if missing == 0 {
            continue;
        }

        let present: Vec<f64> = column.values.iter().filter_map(CellValue::as_f64).collect();
        if present.is_empty() {
            log::debug!("No values to average in '{}', leaving it empty", column.name);
            report.skipped.push(column.name.clone());
            continue;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;

        for value in column.values.iter_mut().filter(|v| v.is_null()) {
            *value = CellValue::Float(mean);
        }
        report.filled.push((column.name.clone(), missing, mean));
    }

    report
}
