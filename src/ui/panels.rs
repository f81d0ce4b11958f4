use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, DroppedFile, RichText, Ui};

use crate::data::loader::UploadedFile;
use crate::state::{AppState, Notice};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.store.is_empty(), egui::Button::new("Close all"))
                .clicked()
            {
                let names: Vec<String> =
                    state.store.sessions().iter().map(|s| s.name.clone()).collect();
                for name in names {
                    state.close_file(&name);
                }
                state.last_batch = None;
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("{} files loaded", state.store.len()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Header & upload area
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(8.0);
        ui.heading(RichText::new("🚀 Data Sweeper").size(30.0).strong());
        ui.label("Effortlessly transform, clean, and visualize your data.");
        ui.add_space(8.0);
    });
}

pub fn upload_area(ui: &mut Ui, state: &mut AppState) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new("📂 Upload your data files").size(20.0).strong());
            ui.label("Supports CSV, Excel (XLSX), and ODS file formats.");
            if ui.button("Choose files…").clicked() {
                open_file_dialog(state);
            }
            ui.weak("…or drop them onto this window.");
        });
    });

    for (name, notice) in state.failed_files() {
        if let Notice::Error(msg) = notice {
            ui.label(RichText::new(format!("⚠ {msg}")).color(Color32::RED))
                .on_hover_text(name);
        }
    }
}

/// Aggregate result of the latest upload.
pub fn banner(ui: &mut Ui, state: &AppState) {
    let Some(report) = &state.last_batch else {
        return;
    };
    if report.files.is_empty() {
        return;
    }
    let (icon, color) = if report.all_succeeded() {
        ("✅", Color32::from_rgb(39, 174, 96))
    } else {
        ("⚠", Color32::from_rgb(230, 126, 34))
    };
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!("{icon} {}", report.summary()))
                .size(16.0)
                .color(color),
        );
    });
}

// ---------------------------------------------------------------------------
// File dialog & drag and drop
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let picked = rfd::FileDialog::new()
        .set_title("Open data files")
        .add_filter("Supported files", &["csv", "xlsx", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("OpenDocument", &["ods"])
        .pick_files();

    if let Some(paths) = picked {
        let files = read_paths(state, paths);
        state.ingest(files);
    }
}

/// Turn files dropped on the window into uploads.
pub fn accept_dropped_files(state: &mut AppState, dropped: Vec<DroppedFile>) {
    let mut files = Vec::new();
    let mut paths = Vec::new();
    for file in dropped {
        match (file.bytes, file.path) {
            (Some(bytes), path) => {
                let name = if file.name.is_empty() {
                    path.as_deref().map(display_name).unwrap_or_default()
                } else {
                    file.name
                };
                files.push(UploadedFile::new(name, bytes.to_vec()));
            }
            (None, Some(path)) => paths.push(path),
            (None, None) => log::warn!("Dropped file {} has no content", file.name),
        }
    }
    files.extend(read_paths(state, paths));
    state.ingest(files);
}

/// Read each path; unreadable files are reported in the status bar.
fn read_paths(state: &mut AppState, paths: Vec<PathBuf>) -> Vec<UploadedFile> {
    let mut files = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();
    for path in paths {
        match read_upload(&path) {
            Ok(file) => files.push(file),
            Err(e) => {
                log::error!("{e:#}");
                errors.push(format!("{e:#}"));
            }
        }
    }
    state.status_message = (!errors.is_empty()).then(|| errors.join("; "));
    files
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(UploadedFile::new(display_name(path), bytes))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
