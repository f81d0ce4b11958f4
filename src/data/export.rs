use std::fmt;
use std::path::Path;

use rust_xlsxwriter::Workbook;

use super::model::{CellValue, Table};
use crate::error::ExportError;

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLUMNS: usize = 16_384;

// ---------------------------------------------------------------------------
// Export format & buffer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Xlsx => XLSX_MIME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Xlsx => write!(f, "Excel"),
        }
    }
}

/// A serialized table waiting to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBuffer {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `report.ods` → `report.csv`; names without an extension get one appended.
pub fn output_file_name(original: &str, format: ExportFormat) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original);
    format!("{stem}.{}", format.extension())
}

/// Serialize `table` (header + every row, no index column) for download.
pub fn export_table(
    table: &Table,
    original_name: &str,
    format: ExportFormat,
) -> Result<ExportBuffer, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(table)?,
        ExportFormat::Xlsx => write_xlsx(table)?,
    };
    let buffer = ExportBuffer {
        file_name: output_file_name(original_name, format),
        mime_type: format.mime_type(),
        bytes,
    };
    log::info!(
        "Converted {original_name} to {} ({} bytes)",
        buffer.file_name,
        buffer.bytes.len()
    );
    Ok(buffer)
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for idx in 0..table.row_count() {
        let row = table.row(idx).unwrap_or_default();
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::CsvBuffer(e.to_string()))
}

fn write_xlsx(table: &Table) -> Result<Vec<u8>, ExportError> {
    if table.row_count() + 1 > XLSX_MAX_ROWS || table.column_count() > XLSX_MAX_COLUMNS {
        return Err(ExportError::TooLarge {
            rows: table.row_count(),
            columns: table.column_count(),
        });
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    // Bounds were checked above, so the narrowing casts cannot truncate.
    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = col_idx as u16;
        sheet.write_string(0, col, &column.name)?;
        for (row_idx, value) in column.values.iter().enumerate() {
            let row = row_idx as u32 + 1;
            match value {
                CellValue::Null => {}
                CellValue::Integer(i) => {
                    sheet.write_number(row, col, *i as f64)?;
                }
                CellValue::Float(f) => {
                    sheet.write_number(row, col, *f)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(row, col, *b)?;
                }
                CellValue::Text(s) => {
                    sheet.write_string(row, col, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_file, UploadedFile};
    use crate::data::model::{Column, ColumnType};

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                "name",
                ColumnType::Text,
                vec![
                    CellValue::Text("a, b".into()),
                    CellValue::Text("c".into()),
                    CellValue::Null,
                ],
            ),
            Column::new(
                "score",
                ColumnType::Float,
                vec![CellValue::Float(10.0), CellValue::Float(15.5), CellValue::Null],
            ),
            Column::new(
                "count",
                ColumnType::Integer,
                vec![
                    CellValue::Integer(1),
                    CellValue::Integer(2),
                    CellValue::Integer(3),
                ],
            ),
            Column::new(
                "ok",
                ColumnType::Boolean,
                vec![CellValue::Bool(true), CellValue::Bool(false), CellValue::Bool(true)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn csv_name_and_mime() {
        let buffer = export_table(&sample(), "data.xlsx", ExportFormat::Csv).unwrap();
        assert_eq!(buffer.file_name, "data.csv");
        assert_eq!(buffer.mime_type, "text/csv");
    }

    #[test]
    fn xlsx_name_and_mime() {
        let buffer = export_table(&sample(), "Quarterly.Report.ODS", ExportFormat::Xlsx).unwrap();
        assert_eq!(buffer.file_name, "Quarterly.Report.xlsx");
        assert_eq!(buffer.mime_type, XLSX_MIME);
        // OOXML packages are zip archives.
        assert_eq!(&buffer.bytes[..2], b"PK");
    }

    #[test]
    fn name_without_extension_gets_one() {
        assert_eq!(output_file_name("export", ExportFormat::Csv), "export.csv");
    }

    #[test]
    fn csv_text_layout() {
        let buffer = export_table(&sample(), "d.csv", ExportFormat::Csv).unwrap();
        let text = String::from_utf8(buffer.bytes).unwrap();
        assert_eq!(
            text,
            "name,score,count,ok\n\"a, b\",10.0,1,True\nc,15.5,2,False\n,,3,True\n"
        );
    }

    #[test]
    fn csv_round_trip_preserves_table() {
        let table = sample();
        let buffer = export_table(&table, "d.csv", ExportFormat::Csv).unwrap();
        let reloaded = load_file(&UploadedFile::new(buffer.file_name, buffer.bytes)).unwrap();
        assert_eq!(reloaded, table);
    }

    #[test]
    fn xlsx_round_trip_preserves_shape_and_values() {
        let table = sample();
        let buffer = export_table(&table, "d.csv", ExportFormat::Xlsx).unwrap();
        let reloaded = load_file(&UploadedFile::new(buffer.file_name, buffer.bytes)).unwrap();
        assert_eq!(reloaded.column_names(), table.column_names());
        assert_eq!(reloaded.row_count(), table.row_count());
        assert_eq!(reloaded.column("score"), table.column("score"));
        assert_eq!(reloaded.column("count"), table.column("count"));
        assert_eq!(reloaded.column("ok"), table.column("ok"));
    }

    #[test]
    fn zero_column_table_exports_blank_rows() {
        let empty: [&str; 0] = [];
        let projected = sample().select(&empty).unwrap();
        let buffer = export_table(&projected, "d.csv", ExportFormat::Csv).unwrap();
        assert_eq!(projected.row_count(), 3);
        assert!(!buffer.bytes.is_empty());
    }
}
