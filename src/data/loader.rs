use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, ExcelDateTime, Ods, Reader, Xlsx};
use chrono::NaiveTime;

use super::model::{format_float, CellValue, Column, ColumnType, Table};
use crate::error::LoadError;

/// Cells treated as missing when they appear verbatim in a file.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_MARKERS: &[&str] = &["true", "True", "TRUE"];
const FALSE_MARKERS: &[&str] = &["false", "False", "FALSE"];

// ---------------------------------------------------------------------------
// Uploaded file
// ---------------------------------------------------------------------------

/// A file handed to the app by the open dialog or by drag and drop.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lower-cased extension including the leading dot, or `""`.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

/// Input formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Ods,
}

impl FileFormat {
    /// Pick the reader for an extension as returned by [`UploadedFile::extension`].
    pub fn from_extension(ext: &str) -> Result<Self, LoadError> {
        match ext {
            ".csv" => Ok(FileFormat::Csv),
            ".xlsx" => Ok(FileFormat::Xlsx),
            ".ods" => Ok(FileFormat::Ods),
            other => Err(LoadError::UnsupportedExtension(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one uploaded file into a table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – comma separated, header row first
/// * `.xlsx` – first worksheet of an OOXML workbook
/// * `.ods`  – first worksheet of an OpenDocument spreadsheet
pub fn load_file(file: &UploadedFile) -> Result<Table, LoadError> {
    match FileFormat::from_extension(&file.extension())? {
        FileFormat::Csv => load_csv(&file.bytes),
        FileFormat::Xlsx => load_xlsx(&file.bytes),
        FileFormat::Ods => load_ods(&file.bytes),
    }
}

/// Load every file independently, in order. A failure never stops the
/// files after it.
pub fn load_batch(files: &[UploadedFile]) -> Vec<Result<Table, LoadError>> {
    files
        .iter()
        .map(|file| {
            let result = load_file(file);
            match &result {
                Ok(table) => log::info!(
                    "Loaded {} ({} rows x {} columns)",
                    file.name,
                    table.row_count(),
                    table.column_count()
                ),
                Err(e) => log::warn!("Failed to load {}: {e}", file.name),
            }
            result
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Rows shorter than the header are padded with missing cells; longer rows
/// are an error.
fn load_csv(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(LoadError::NoColumns);
    }

    let width = headers.len();
    let mut cells: Vec<Vec<RawCell>> = (0..width).map(|_| Vec::new()).collect();

    for result in reader.records() {
        let record = result?;
        if record.len() > width {
            return Err(LoadError::RaggedRow {
                line: record.position().map_or(0, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx).map_or(RawCell::Empty, RawCell::from_text));
        }
    }

    build_table(headers, cells)
}

// ---------------------------------------------------------------------------
// Spreadsheet loaders
// ---------------------------------------------------------------------------

fn load_xlsx(bytes: &[u8]) -> Result<Table, LoadError> {
    let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| spreadsheet_error("OOXML", e))?;
    load_first_sheet(workbook, "OOXML")
}

fn load_ods(bytes: &[u8]) -> Result<Table, LoadError> {
    let workbook: Ods<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| spreadsheet_error("OpenDocument", e))?;
    load_first_sheet(workbook, "OpenDocument")
}

fn spreadsheet_error(engine: &'static str, e: impl std::fmt::Display) -> LoadError {
    LoadError::Spreadsheet {
        engine,
        message: e.to_string(),
    }
}

/// Read the first worksheet; its first row is the header.
fn load_first_sheet<'a, R>(mut workbook: R, engine: &'static str) -> Result<Table, LoadError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)?
        .map_err(|e| spreadsheet_error(engine, e))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(LoadError::NoColumns)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| RawCell::from_sheet(cell).header_text())
        .collect();

    let width = headers.len();
    let mut cells: Vec<Vec<RawCell>> = (0..width).map(|_| Vec::new()).collect();
    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).map_or(RawCell::Empty, RawCell::from_sheet));
        }
    }

    build_table(headers, cells)
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// A cell as read from the file, before its column's type is known.
#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Date, time or duration, already rendered as text. Never numeric.
    Date(String),
}

impl RawCell {
    fn from_text(s: &str) -> RawCell {
        if NULL_MARKERS.contains(&s) {
            RawCell::Empty
        } else {
            RawCell::Text(s.to_string())
        }
    }

    fn from_sheet(cell: &Data) -> RawCell {
        match cell {
            Data::Int(i) => RawCell::Int(*i),
            Data::Float(f) => RawCell::Float(*f),
            Data::Bool(b) => RawCell::Bool(*b),
            Data::String(s) => RawCell::from_text(s),
            Data::DateTime(dt) => RawCell::Date(excel_date_text(dt)),
            Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Date(s.clone()),
            Data::Error(_) | Data::Empty => RawCell::Empty,
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            RawCell::Int(i) => Some(*i),
            RawCell::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(*f as i64),
            RawCell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            RawCell::Int(i) => Some(*i as f64),
            RawCell::Float(f) => Some(*f),
            // `inf`, `NAN` and friends stay text; only the null markers are missing.
            RawCell::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            RawCell::Bool(b) => Some(*b),
            RawCell::Text(s) if TRUE_MARKERS.contains(&s.as_str()) => Some(true),
            RawCell::Text(s) if FALSE_MARKERS.contains(&s.as_str()) => Some(false),
            _ => None,
        }
    }

    fn into_text(self) -> CellValue {
        match self {
            RawCell::Empty => CellValue::Null,
            RawCell::Text(s) => CellValue::Text(s),
            RawCell::Int(i) => CellValue::Text(i.to_string()),
            RawCell::Float(f) => CellValue::Text(f.to_string()),
            RawCell::Bool(b) => CellValue::Text(CellValue::Bool(b).to_string()),
            RawCell::Date(s) => CellValue::Text(s),
        }
    }

    fn header_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Int(i) => i.to_string(),
            RawCell::Float(f) => match self.as_integer() {
                Some(i) => i.to_string(),
                None => format_float(*f),
            },
            RawCell::Bool(b) => CellValue::Bool(*b).to_string(),
            RawCell::Date(s) => s.clone(),
        }
    }
}

/// Dates at midnight print as `2024-01-01`, other instants with their time.
/// Durations use chrono's ISO 8601 form.
fn excel_date_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        if let Some(d) = dt.as_duration() {
            return d.to_string();
        }
    }
    match dt.as_datetime() {
        Some(t) if t.time() == NaiveTime::MIN => t.date().to_string(),
        Some(t) => t.to_string(),
        None => dt.to_string(),
    }
}

/// Decide a column's type from its cells and convert them.
///
/// Priority: Integer (no gaps) → Float → Boolean → Text.  A column with no
/// present cells at all is Float.
fn infer_column(name: String, cells: Vec<RawCell>) -> Column {
    let has_missing = cells.iter().any(RawCell::is_empty);
    let present = || cells.iter().filter(|c| !c.is_empty());

    if present().all(|c| c.as_number().is_some()) {
        if !has_missing && present().all(|c| c.as_integer().is_some()) {
            let values = cells
                .iter()
                .map(|c| c.as_integer().map_or(CellValue::Null, CellValue::Integer))
                .collect();
            return Column::new(name, ColumnType::Integer, values);
        }
        let values = cells
            .iter()
            .map(|c| c.as_number().map_or(CellValue::Null, CellValue::Float))
            .collect();
        return Column::new(name, ColumnType::Float, values);
    }

    if present().all(|c| c.as_bool().is_some()) {
        let values = cells
            .iter()
            .map(|c| c.as_bool().map_or(CellValue::Null, CellValue::Bool))
            .collect();
        return Column::new(name, ColumnType::Boolean, values);
    }

    let values = cells.into_iter().map(RawCell::into_text).collect();
    Column::new(name, ColumnType::Text, values)
}

/// Blank headers become `Unnamed: <idx>`; repeats get `.1`, `.2`, ….
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut used = HashSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                h
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while !used.insert(name.clone()) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

fn build_table(headers: Vec<String>, cells: Vec<Vec<RawCell>>) -> Result<Table, LoadError> {
    let columns = normalize_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Ok(Table::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_file(name: &str, body: &str) -> UploadedFile {
        UploadedFile::new(name, body.as_bytes().to_vec())
    }

    fn xlsx_bytes() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "city").unwrap();
        sheet.write_string(0, 1, "population").unwrap();
        sheet.write_string(0, 2, "area").unwrap();
        sheet.write_string(1, 0, "Lyon").unwrap();
        sheet.write_number(1, 1, 522_000.0).unwrap();
        sheet.write_number(1, 2, 47.87).unwrap();
        sheet.write_string(2, 0, "Nice").unwrap();
        sheet.write_number(2, 1, 342_000.0).unwrap();
        sheet.write_string(3, 0, "Metz").unwrap();
        sheet.write_number(3, 1, 118_000.0).unwrap();
        sheet.write_number(3, 2, 41.94).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn csv_counts_and_types() {
        let table = load_file(&csv_file(
            "data.csv",
            "name,val,score,active\na,1,1.5,true\nb,2,,False\na,1,3,TRUE\n",
        ))
        .unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 4);

        let kinds: Vec<_> = table.columns().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnType::Text,
                ColumnType::Integer,
                ColumnType::Float,
                ColumnType::Boolean
            ]
        );
        assert_eq!(table.column("score").unwrap().values[1], CellValue::Null);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let table = load_file(&csv_file("REPORT.CSV", "a\n1\n")).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn unsupported_file_does_not_block_siblings() {
        let files = vec![
            csv_file("notes.txt", "hello"),
            csv_file("data.csv", "name,val\na,1\nb,2\n"),
        ];
        let results = load_batch(&files);
        assert!(matches!(
            &results[0],
            Err(LoadError::UnsupportedExtension(ext)) if ext == ".txt"
        ));
        assert_eq!(results[1].as_ref().unwrap().row_count(), 2);
    }

    #[test]
    fn null_markers_make_integer_columns_float() {
        let table = load_file(&csv_file("d.csv", "score\n10\nNA\n20\n")).unwrap();
        let score = table.column("score").unwrap();
        assert_eq!(score.kind, ColumnType::Float);
        assert_eq!(
            score.values,
            vec![CellValue::Float(10.0), CellValue::Null, CellValue::Float(20.0)]
        );
    }

    #[test]
    fn entirely_missing_column_is_float() {
        let table = load_file(&csv_file("d.csv", "a,b\n1,\n2,\n")).unwrap();
        let b = table.column("b").unwrap();
        assert_eq!(b.kind, ColumnType::Float);
        assert_eq!(b.null_count(), 2);
    }

    #[test]
    fn mixed_column_keeps_original_text() {
        let table = load_file(&csv_file("d.csv", "code\n007\nX1\n1.50\n")).unwrap();
        let code = table.column("code").unwrap();
        assert_eq!(code.kind, ColumnType::Text);
        assert_eq!(code.values[0], CellValue::Text("007".into()));
        assert_eq!(code.values[2], CellValue::Text("1.50".into()));
    }

    #[test]
    fn headers_are_normalized() {
        let table = load_file(&csv_file("d.csv", "a,,a,a\n1,2,3,4\n")).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["a", "Unnamed: 1", "a.1", "a.2"]
        );
    }

    #[test]
    fn short_rows_are_padded_long_rows_fail() {
        let table = load_file(&csv_file("d.csv", "a,b\n1\n2,3\n")).unwrap();
        assert_eq!(table.column("b").unwrap().values[0], CellValue::Null);

        let err = load_file(&csv_file("d.csv", "a,b\n1,2,3\n")).unwrap_err();
        assert!(matches!(err, LoadError::RaggedRow { expected: 2, found: 3, .. }));
    }

    #[test]
    fn empty_and_undecodable_csv_fail() {
        assert!(matches!(
            load_file(&csv_file("d.csv", "")).unwrap_err(),
            LoadError::NoColumns
        ));

        let bad = UploadedFile::new("d.csv", b"a,b\n\xff\xfe,1\n".to_vec());
        assert!(matches!(load_file(&bad).unwrap_err(), LoadError::Csv(_)));
    }

    #[test]
    fn xlsx_first_sheet_is_loaded() {
        let table = load_file(&UploadedFile::new("cities.xlsx", xlsx_bytes())).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_names(), vec!["city", "population", "area"]);
        assert_eq!(table.column("population").unwrap().kind, ColumnType::Integer);
        let area = table.column("area").unwrap();
        assert_eq!(area.kind, ColumnType::Float);
        assert_eq!(area.values[1], CellValue::Null);
    }

    #[test]
    fn xlsx_dates_load_as_text() {
        let date_format = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "when").unwrap();
        sheet.write_string(0, 1, "amount").unwrap();
        for (row, day) in [(1u32, 1u8), (2, 2)] {
            let date = rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 1, day).unwrap();
            sheet.write_datetime_with_format(row, 0, &date, &date_format).unwrap();
            sheet.write_number(row, 1, 12.5 * row as f64).unwrap();
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load_file(&UploadedFile::new("orders.xlsx", bytes)).unwrap();
        let when = table.column("when").unwrap();
        assert_eq!(when.kind, ColumnType::Text);
        assert_eq!(
            when.values,
            vec![
                CellValue::Text("2024-01-01".into()),
                CellValue::Text("2024-01-02".into())
            ]
        );
        let numeric: Vec<_> = table.numeric_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(numeric, vec!["amount"]);
    }

    #[test]
    fn ods_first_sheet_is_loaded() {
        let bytes = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/cities.ods"));
        let table = load_file(&UploadedFile::new("cities.ods", bytes.to_vec())).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 4);
        assert_eq!(
            table.column_names(),
            vec!["city", "population", "area", "opened"]
        );

        let kinds: Vec<_> = table.columns().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnType::Text,
                ColumnType::Integer,
                ColumnType::Float,
                ColumnType::Text
            ]
        );
        assert_eq!(table.column("area").unwrap().values[1], CellValue::Null);
        assert_eq!(
            table.column("opened").unwrap().values[0],
            CellValue::Text("2024-01-01".into())
        );
    }

    #[test]
    fn non_finite_spellings_stay_text() {
        let table = load_file(&csv_file("d.csv", "x\n1.5\nNAN\ninf\n")).unwrap();
        let x = table.column("x").unwrap();
        assert_eq!(x.kind, ColumnType::Text);
        assert_eq!(x.values[1], CellValue::Text("NAN".into()));

        let table = load_file(&csv_file("d.csv", "x\n1.5\nNaN\n2.5\n")).unwrap();
        let x = table.column("x").unwrap();
        assert_eq!(x.kind, ColumnType::Float);
        assert_eq!(x.values[1], CellValue::Null);
    }

    #[test]
    fn corrupt_spreadsheets_name_their_engine() {
        let err = load_file(&UploadedFile::new("x.xlsx", b"not a zip".to_vec())).unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet { engine: "OOXML", .. }));

        let err = load_file(&UploadedFile::new("x.ods", b"not a zip".to_vec())).unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet { engine: "OpenDocument", .. }));
    }
}
