use eframe::egui::{self, ScrollArea, Ui};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{file_card, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataSweeperApp {
    pub state: AppState,
}

impl DataSweeperApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for DataSweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Files dropped onto the window ----
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            panels::accept_dropped_files(&mut self.state, dropped);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: batch banner ----
        egui::TopBottomPanel::bottom("banner").show(ctx, |ui| {
            panels::banner(ui, &self.state);
        });

        // ---- Central panel: upload area and one card per file ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    panels::header(ui);
                    panels::upload_area(ui, &mut self.state);
                    ui.add_space(10.0);

                    let names: Vec<String> = self
                        .state
                        .store
                        .sessions()
                        .iter()
                        .map(|s| s.name.clone())
                        .collect();
                    for name in names {
                        ui.separator();
                        file_card::file_card(ui, &mut self.state, &name);
                    }
                });
        });
    }
}
