use super::model::Table;

/// One numeric column prepared for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    /// One entry per row; `None` where the cell is missing.
    pub values: Vec<Option<f64>>,
}

/// The first `limit` numeric columns of `table`, over all rows.
///
/// Fewer numeric columns simply give fewer series.
pub fn chart_series(table: &Table, limit: usize) -> Vec<ChartSeries> {
    table
        .numeric_columns()
        .take(limit)
        .map(|column| ChartSeries {
            name: column.name.clone(),
            values: column.values.iter().map(|v| v.as_f64()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnType};

    fn table(kinds: &[(&str, ColumnType)]) -> Table {
        Table::new(
            kinds
                .iter()
                .map(|(name, kind)| {
                    let values = match kind {
                        ColumnType::Integer => vec![CellValue::Integer(1), CellValue::Integer(2)],
                        ColumnType::Float => vec![CellValue::Float(0.5), CellValue::Null],
                        ColumnType::Boolean => vec![CellValue::Bool(true), CellValue::Bool(false)],
                        ColumnType::Text => {
                            vec![CellValue::Text("x".into()), CellValue::Text("y".into())]
                        }
                    };
                    Column::new(*name, *kind, values)
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn takes_first_two_numeric_columns() {
        let t = table(&[
            ("label", ColumnType::Text),
            ("a", ColumnType::Integer),
            ("flag", ColumnType::Boolean),
            ("b", ColumnType::Float),
            ("c", ColumnType::Integer),
        ]);
        let series = chart_series(&t, 2);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "a");
        assert_eq!(series[0].values, vec![Some(1.0), Some(2.0)]);
        assert_eq!(series[1].name, "b");
        assert_eq!(series[1].values, vec![Some(0.5), None]);
    }

    #[test]
    fn fewer_numeric_columns_give_fewer_series() {
        let one = table(&[("label", ColumnType::Text), ("a", ColumnType::Integer)]);
        assert_eq!(chart_series(&one, 2).len(), 1);

        let none = table(&[("label", ColumnType::Text)]);
        assert!(chart_series(&none, 2).is_empty());
    }
}
