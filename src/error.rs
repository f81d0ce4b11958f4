use thiserror::Error;

/// Failure to turn an uploaded file into a [`Table`](crate::data::model::Table).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file type: {0}")]
    UnsupportedExtension(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{engine} reader error: {message}")]
    Spreadsheet {
        engine: &'static str,
        message: String,
    },

    #[error("expected {expected} fields in line {line}, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("workbook contains no worksheets")]
    NoWorksheet,

    #[error("no columns to parse from file")]
    NoColumns,

    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{0}' selected more than once")]
    DuplicateColumn(String),

    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    CsvBuffer(String),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("table is too large for a worksheet ({rows} rows, {columns} columns)")]
    TooLarge { rows: usize, columns: usize },
}

/// Rejected command on a file session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cleaning is not enabled for '{0}'")]
    CleaningDisabled(String),

    #[error("nothing to download for '{0}': convert the file first")]
    NothingToDownload(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
