use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Filtered table (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered rows. Clicking a row selects it as the reference for
/// the split chart; clicking it again deselects.
pub fn results_table(ui: &mut Ui, state: &mut AppState) {
    if state.cache.dataset().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view runs  (File → Open…)");
        });
        return;
    }
    if state.visible_indices.is_empty() {
        ui.label("No rows match the current filters.");
        return;
    }

    let mut clicked: Option<usize> = None;
    {
        let dataset = state.cache.dataset().unwrap();
        let header = dataset.header();

        TableBuilder::new(ui)
            .striped(true)
            .sense(egui::Sense::click())
            .column(Column::auto().at_least(110.0))
            .columns(Column::auto().at_least(60.0), header.len() - 1)
            .header(20.0, |mut row| {
                for title in &header {
                    row.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for &idx in &state.visible_indices {
                    let rec = &dataset.records[idx];
                    body.row(18.0, |mut row| {
                        row.set_selected(state.selected_row == Some(idx));
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.name);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.competition);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(rec.year.to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.2}", rec.total_time));
                        });
                        for &split in &rec.splits {
                            row.col(|ui: &mut Ui| {
                                ui.label(format!("{split:.2}"));
                            });
                        }
                        if row.response().clicked() {
                            clicked = Some(idx);
                        }
                    });
                }
            });
    }

    if let Some(idx) = clicked {
        state.toggle_row_selection(idx);
    }
}
