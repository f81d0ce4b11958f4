use std::fmt;

use crate::data::cleaning::{fill_missing_with_mean, remove_duplicates};
use crate::data::export::{export_table, ExportBuffer, ExportFormat};
use crate::data::loader::{load_batch, UploadedFile};
use crate::data::model::Table;
use crate::error::{SessionError, TableError};

// ---------------------------------------------------------------------------
// Pipeline stage & commands
// ---------------------------------------------------------------------------

/// Where a file is in `Loaded → Cleaned* → Selected → Visualized? →
/// Converted → Downloaded`. Ordered along the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Loaded,
    Cleaned,
    Selected,
    Visualized,
    Converted,
    Downloaded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Loaded => "loaded",
            Stage::Cleaned => "cleaned",
            Stage::Selected => "columns selected",
            Stage::Visualized => "visualized",
            Stage::Converted => "converted",
            Stage::Downloaded => "downloaded",
        };
        write!(f, "{label}")
    }
}

/// A discrete user action on one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetCleaning(bool),
    RemoveDuplicates,
    FillMissing,
    Select(Vec<String>),
    SetVisualize(bool),
    Convert(ExportFormat),
    TakeExport,
}

/// Result of a command that the UI shows to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Message(String),
    Download(ExportBuffer),
}

// ---------------------------------------------------------------------------
// FileSession – one uploaded file's pipeline state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileSession {
    pub name: String,
    /// Size of the upload in bytes.
    pub size: usize,
    /// Working table: the loaded data after any cleaning, all columns.
    table: Table,
    selection: Vec<String>,
    pub cleaning_enabled: bool,
    pub visualize: bool,
    pub format: ExportFormat,
    export: Option<ExportBuffer>,
    stage: Stage,
}

impl FileSession {
    pub fn new(name: impl Into<String>, size: usize, table: Table) -> Self {
        let selection = table.column_names();
        Self {
            name: name.into(),
            size,
            table,
            selection,
            cleaning_enabled: false,
            visualize: false,
            format: ExportFormat::default(),
            export: None,
            stage: Stage::Loaded,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }

    /// The working table with every column, as cleaning sees it.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// The working table narrowed to the current selection.
    pub fn selected_table(&self) -> Result<Table, TableError> {
        self.table.select(&self.selection)
    }

    pub fn export(&self) -> Option<&ExportBuffer> {
        self.export.as_ref()
    }

    pub fn apply(&mut self, command: Command) -> Result<Outcome, SessionError> {
        log::debug!("{}: {command:?}", self.name);
        match command {
            Command::SetCleaning(enabled) => {
                self.cleaning_enabled = enabled;
                let state = if enabled { "enabled" } else { "disabled" };
                Ok(Outcome::Message(format!("Cleaning {state}")))
            }
            Command::RemoveDuplicates => {
                self.require_cleaning()?;
                let removed = remove_duplicates(&mut self.table);
                self.after_edit(Stage::Cleaned);
                Ok(Outcome::Message(format!(
                    "Duplicates removed ({removed} rows dropped)"
                )))
            }
            Command::FillMissing => {
                self.require_cleaning()?;
                let report = fill_missing_with_mean(&mut self.table);
                self.after_edit(Stage::Cleaned);
                let mut message = format!(
                    "Missing values filled ({} cells)",
                    report.cells_filled()
                );
                if !report.skipped.is_empty() {
                    message.push_str(&format!(
                        "; no values to average in: {}",
                        report.skipped.join(", ")
                    ));
                }
                Ok(Outcome::Message(message))
            }
            Command::Select(names) => {
                self.table.select(&names)?;
                let count = names.len();
                self.selection = names;
                self.after_edit(Stage::Selected);
                Ok(Outcome::Message(format!("{count} columns selected")))
            }
            Command::SetVisualize(on) => {
                self.visualize = on;
                if on && self.stage < Stage::Visualized {
                    self.stage = Stage::Visualized;
                }
                Ok(Outcome::Message(if on {
                    "Visualization shown".to_string()
                } else {
                    "Visualization hidden".to_string()
                }))
            }
            Command::Convert(format) => {
                self.format = format;
                let buffer = export_table(&self.selected_table()?, &self.name, format)?;
                let message = format!("Ready to download {}", buffer.file_name);
                self.export = Some(buffer);
                self.stage = Stage::Converted;
                Ok(Outcome::Message(message))
            }
            Command::TakeExport => {
                let buffer = self
                    .export
                    .take()
                    .ok_or_else(|| SessionError::NothingToDownload(self.name.clone()))?;
                self.stage = Stage::Downloaded;
                Ok(Outcome::Download(buffer))
            }
        }
    }

    fn require_cleaning(&self) -> Result<(), SessionError> {
        if self.cleaning_enabled {
            Ok(())
        } else {
            Err(SessionError::CleaningDisabled(self.name.clone()))
        }
    }

    /// The data changed, so any prepared download is stale.
    fn after_edit(&mut self, stage: Stage) {
        self.export = None;
        self.stage = stage;
    }
}

// ---------------------------------------------------------------------------
// Session store & batch report
// ---------------------------------------------------------------------------

/// How one file of a batch fared.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub name: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn loaded(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.loaded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Banner text: only claims full success when every file loaded.
    pub fn summary(&self) -> String {
        let total = self.files.len();
        if self.all_succeeded() {
            format!("All {total} files processed successfully!")
        } else {
            format!(
                "{} of {total} files loaded, {} failed",
                self.loaded(),
                self.failed()
            )
        }
    }
}

/// Sessions in upload order, keyed by file name.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<FileSession>,
}

impl SessionStore {
    /// Load a batch of uploads. Each file succeeds or fails on its own; a
    /// file whose name is already present replaces the old session.
    pub fn ingest(&mut self, files: Vec<UploadedFile>) -> BatchReport {
        let results = load_batch(&files);
        let mut report = BatchReport::default();

        for (file, result) in files.into_iter().zip(results) {
            match result {
                Ok(table) => {
                    let session = FileSession::new(file.name.clone(), file.size(), table);
                    match self.position(&file.name) {
                        Some(idx) => self.sessions[idx] = session,
                        None => self.sessions.push(session),
                    }
                    report.files.push(FileOutcome {
                        name: file.name,
                        error: None,
                    });
                }
                Err(e) => report.files.push(FileOutcome {
                    name: file.name,
                    error: Some(e.to_string()),
                }),
            }
        }

        report
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FileSession> {
        self.sessions.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FileSession> {
        self.sessions.iter_mut().find(|s| s.name == name)
    }

    pub fn sessions(&self) -> &[FileSession] {
        &self.sessions
    }

    pub fn remove(&mut self, name: &str) -> Option<FileSession> {
        self.position(name).map(|idx| self.sessions.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
