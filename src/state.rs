use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::data::export::ExportBuffer;
use crate::data::loader::UploadedFile;
use crate::session::{BatchReport, Command, Outcome, SessionStore};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A message shown inline under a file.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// One pipeline per uploaded file.
    pub store: SessionStore,

    /// Outcome of the most recent upload, drives the banner.
    pub last_batch: Option<BatchReport>,

    /// Latest message per file name.
    pub notices: BTreeMap<String, Notice>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: SessionStore::default(),
            last_batch: None,
            notices: BTreeMap::new(),
            status_message: None,
        }
    }

    /// Load a batch of uploads and record a notice per failed file.
    pub fn ingest(&mut self, files: Vec<UploadedFile>) {
        if files.is_empty() {
            return;
        }
        let report = self.store.ingest(files);
        for outcome in &report.files {
            match &outcome.error {
                Some(err) => {
                    self.notices.insert(
                        outcome.name.clone(),
                        Notice::Error(format!("Error processing `{}`: {err}", outcome.name)),
                    );
                }
                None => {
                    self.notices.remove(&outcome.name);
                }
            }
        }
        self.last_batch = Some(report);
    }

    /// Apply `command` to the named file. A download hands the buffer back;
    /// everything else becomes a notice.
    pub fn run(&mut self, file: &str, command: Command) -> Option<ExportBuffer> {
        let Some(session) = self.store.get_mut(file) else {
            log::warn!("Command for unknown file {file}");
            return None;
        };
        match session.apply(command) {
            Ok(Outcome::Message(msg)) => {
                self.notices.insert(file.to_string(), Notice::Info(msg));
                None
            }
            Ok(Outcome::Download(buffer)) => {
                self.notices.insert(
                    file.to_string(),
                    Notice::Info(format!("Saved {}", buffer.file_name)),
                );
                Some(buffer)
            }
            Err(e) => {
                log::warn!("{file}: {e}");
                self.notices.insert(file.to_string(), Notice::Error(e.to_string()));
                None
            }
        }
    }

    /// Drop a file's session and its messages.
    pub fn close_file(&mut self, file: &str) {
        self.store.remove(file);
        self.notices.remove(file);
        if let Some(batch) = &mut self.last_batch {
            batch.files.retain(|f| f.name != file);
        }
    }

    /// Files of the latest batch that failed to load, with their errors.
    pub fn failed_files(&self) -> Vec<(&str, &Notice)> {
        self.notices
            .iter()
            .filter(|(name, notice)| {
                matches!(notice, Notice::Error(_)) && self.store.get(name).is_none()
            })
            .map(|(name, notice)| (name.as_str(), notice))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::export::ExportFormat;

    fn upload(name: &str, body: &str) -> UploadedFile {
        UploadedFile::new(name, body.as_bytes().to_vec())
    }

    #[test]
    fn failed_uploads_get_a_notice() {
        let mut state = AppState::default();
        state.ingest(vec![upload("a.txt", "x"), upload("b.csv", "x\n1\n")]);

        let failed = state.failed_files();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "a.txt");
        assert_eq!(state.store.len(), 1);
        assert!(!state.last_batch.as_ref().unwrap().all_succeeded());
    }

    #[test]
    fn rejected_command_becomes_error_notice() {
        let mut state = AppState::default();
        state.ingest(vec![upload("b.csv", "x\n1\n1\n")]);

        assert!(state.run("b.csv", Command::FillMissing).is_none());
        assert!(matches!(state.notices.get("b.csv"), Some(Notice::Error(_))));
        // A loaded file with an error notice is not a failed upload.
        assert!(state.failed_files().is_empty());
    }

    #[test]
    fn download_returns_buffer_once() {
        let mut state = AppState::default();
        state.ingest(vec![upload("b.csv", "x\n1\n")]);

        assert!(state
            .run("b.csv", Command::Convert(ExportFormat::Csv))
            .is_none());
        let buffer = state.run("b.csv", Command::TakeExport).unwrap();
        assert_eq!(buffer.file_name, "b.csv");
        assert!(state.run("b.csv", Command::TakeExport).is_none());
    }

    #[test]
    fn closing_forgets_the_file() {
        let mut state = AppState::default();
        state.ingest(vec![upload("b.csv", "x\n1\n")]);
        state.close_file("b.csv");
        assert!(state.store.is_empty());
        assert!(state.last_batch.as_ref().unwrap().files.is_empty());
        assert!(state.run("b.csv", Command::FillMissing).is_none());
    }
}
