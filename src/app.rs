use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HurdleboardApp {
    pub state: AppState,
}

impl HurdleboardApp {
    /// Read the config file and open the configured dataset, if any.
    pub fn new() -> Self {
        Self {
            state: AppState::from_config_file(),
        }
    }
}

impl Default for HurdleboardApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for HurdleboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: split-difference chart ----
        egui::TopBottomPanel::bottom("split_chart_panel")
            .default_height(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::split_chart(ui, &self.state);
            });

        // ---- Central panel: filtered table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::results_table(ui, &mut self.state);
        });
    }
}
