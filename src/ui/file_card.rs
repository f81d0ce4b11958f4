use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};

use crate::data::chart::chart_series;
use crate::data::export::{ExportBuffer, ExportFormat};
use crate::data::model::{CellValue, Table};
use crate::session::{Command, FileSession};
use crate::state::{AppState, Notice};
use crate::ui::chart;

/// What the user asked for while the card was drawn. Applied after
/// rendering, once the session is no longer borrowed.
#[derive(Default)]
struct CardActions {
    commands: Vec<Command>,
    format: Option<ExportFormat>,
    download: bool,
    close: bool,
}

// ---------------------------------------------------------------------------
// Per-file card
// ---------------------------------------------------------------------------

/// Render one file's pipeline: details, preview, cleaning, column
/// selection, chart and conversion.
pub fn file_card(ui: &mut Ui, state: &mut AppState, name: &str) {
    let Some(session) = state.store.get(name) else {
        return;
    };
    let mut actions = CardActions::default();
    let notice = state.notices.get(name);

    egui::CollapsingHeader::new(RichText::new(format!("📄 {name}")).size(18.0).strong())
        .id_salt(name)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            details(ui, session, &mut actions);

            ui.add_space(4.0);
            ui.strong("🔍 Data preview");
            preview_grid(ui, name, &session.table().head(state.config.preview_rows));

            ui.add_space(6.0);
            cleaning_section(ui, session, &mut actions);

            ui.add_space(6.0);
            column_section(ui, session, &mut actions);

            ui.add_space(6.0);
            visualization_section(ui, session, state.config.chart_columns, &mut actions);

            ui.add_space(6.0);
            conversion_section(ui, session, &mut actions);

            if let Some(notice) = notice {
                ui.add_space(4.0);
                match notice {
                    Notice::Info(msg) => {
                        ui.label(RichText::new(format!("✔ {msg}")).color(Color32::DARK_GREEN));
                    }
                    Notice::Error(msg) => {
                        ui.label(RichText::new(format!("⚠ {msg}")).color(Color32::RED));
                    }
                }
            }
        });

    apply_actions(state, name, actions);
}

fn details(ui: &mut Ui, session: &FileSession, actions: &mut CardActions) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "Size: {:.2} KB · {} rows × {} columns · {}",
            session.size_kb(),
            session.table().row_count(),
            session.table().column_count(),
            session.stage()
        ));
        if ui.small_button("✖ Remove").clicked() {
            actions.close = true;
        }
    });
}

fn cleaning_section(ui: &mut Ui, session: &FileSession, actions: &mut CardActions) {
    ui.strong("🧹 Data cleaning options");
    let mut enabled = session.cleaning_enabled;
    if ui
        .checkbox(&mut enabled, format!("Enable cleaning for `{}`", session.name))
        .changed()
    {
        actions.commands.push(Command::SetCleaning(enabled));
    }
    if !session.cleaning_enabled {
        return;
    }
    ui.columns(2, |cols: &mut [Ui]| {
        if cols[0].button("🗑 Remove duplicates").clicked() {
            actions.commands.push(Command::RemoveDuplicates);
        }
        if cols[1].button("🛠 Fill missing values").clicked() {
            actions.commands.push(Command::FillMissing);
        }
    });
}

fn column_section(ui: &mut Ui, session: &FileSession, actions: &mut CardActions) {
    let all = session.table().column_names();
    let selected = session.selection();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("🎯 Choose columns to keep");
        ui.weak(format!("({}/{})", selected.len(), all.len()));
        if ui.small_button("All").clicked() {
            actions.commands.push(Command::Select(all.clone()));
        }
        if ui.small_button("None").clicked() {
            actions.commands.push(Command::Select(Vec::new()));
        }
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (idx, column) in session.table().columns().iter().enumerate() {
            let mut checked = selected.contains(&column.name);
            let label = format!("{} ({})", column.name, column.kind);
            if ui.checkbox(&mut checked, label).changed() {
                // Keep the table's column order whatever the click order.
                let next: Vec<String> = all
                    .iter()
                    .enumerate()
                    .filter(|(i, c)| if *i == idx { checked } else { selected.contains(*c) })
                    .map(|(_, c)| c.clone())
                    .collect();
                actions.commands.push(Command::Select(next));
            }
        }
    });
}

fn visualization_section(
    ui: &mut Ui,
    session: &FileSession,
    chart_columns: usize,
    actions: &mut CardActions,
) {
    ui.strong("📊 Data visualization");
    let mut visualize = session.visualize;
    if ui
        .checkbox(&mut visualize, format!("Show visualization for `{}`", session.name))
        .changed()
    {
        actions.commands.push(Command::SetVisualize(visualize));
    }
    if !session.visualize {
        return;
    }
    match session.selected_table() {
        Ok(table) => chart::bar_chart(ui, &session.name, &chart_series(&table, chart_columns)),
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
    }
}

fn conversion_section(ui: &mut Ui, session: &FileSession, actions: &mut CardActions) {
    ui.strong("🔄 Convert file format");
    let mut format = session.format;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Convert `{}` to:", session.name));
        for option in [ExportFormat::Csv, ExportFormat::Xlsx] {
            ui.radio_value(&mut format, option, option.to_string());
        }
    });
    if format != session.format {
        actions.format = Some(format);
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.button(format!("📥 Convert `{}`", session.name)).clicked() {
            actions.commands.push(Command::Convert(format));
        }
        if let Some(buffer) = session.export() {
            if ui
                .button(format!("📩 Download {}", buffer.file_name))
                .on_hover_text(buffer.mime_type)
                .clicked()
            {
                actions.download = true;
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Preview grid
// ---------------------------------------------------------------------------

fn preview_grid(ui: &mut Ui, id: &str, table: &Table) {
    if table.column_count() == 0 {
        ui.weak("No columns.");
        return;
    }
    ui.push_id(("preview", id), |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(GridColumn::auto().at_least(60.0), table.column_count())
                .header(20.0, |mut header| {
                    for column in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&column.name).on_hover_text(column.kind.to_string());
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.row_count(), |mut row| {
                        let idx = row.index();
                        for column in table.columns() {
                            row.col(|ui: &mut Ui| match &column.values[idx] {
                                CellValue::Null => {
                                    ui.weak("NaN");
                                }
                                value => {
                                    ui.label(value.to_string());
                                }
                            });
                        }
                    });
                });
        });
    });
}

// ---------------------------------------------------------------------------
// Applying actions
// ---------------------------------------------------------------------------

fn apply_actions(state: &mut AppState, name: &str, actions: CardActions) {
    if let (Some(format), Some(session)) = (actions.format, state.store.get_mut(name)) {
        session.format = format;
    }
    for command in actions.commands {
        state.run(name, command);
    }
    if actions.download {
        save_download(state, name);
    }
    if actions.close {
        state.close_file(name);
    }
}

/// Ask where to save, then hand the buffer out and write it.
fn save_download(state: &mut AppState, name: &str) {
    let Some(buffer) = state.store.get(name).and_then(FileSession::export) else {
        return;
    };
    let extension = Path::new(&buffer.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let target = rfd::FileDialog::new()
        .set_title("Save converted file")
        .set_file_name(&buffer.file_name)
        .add_filter(extension.to_uppercase(), &[extension.as_str()])
        .save_file();

    let Some(path) = target else {
        return;
    };
    if let Some(buffer) = state.run(name, Command::TakeExport) {
        if let Err(e) = write_download(&path, &buffer) {
            log::error!("{e:#}");
            state
                .notices
                .insert(name.to_string(), Notice::Error(format!("{e:#}")));
        }
    }
}

fn write_download(path: &Path, buffer: &ExportBuffer) -> Result<()> {
    std::fs::write(path, &buffer.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Saved {} ({}, {} bytes)",
        path.display(),
        buffer.mime_type,
        buffer.bytes.len()
    );
    Ok(())
}
