use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::export::ExportFormat;
use crate::state::{AppState, StatusLevel};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filteroptionen");
    ui.separator();

    if state.cache.dataset().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone the facet values so we can mutate state inside the loop.
    let (names, competitions, years) = {
        let ds = state.cache.dataset().unwrap();
        (ds.unique_names(), ds.unique_competitions(), ds.unique_years())
    };

    let mut changed = false;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= facet(ui, "Athlet", &names, &mut state.filters.names, |v| v.clone());
            changed |= facet(
                ui,
                "Wettkampf",
                &competitions,
                &mut state.filters.competitions,
                |v| v.clone(),
            );
            changed |= facet(ui, "Jahr", &years, &mut state.filters.years, |v| {
                v.to_string()
            });

            ui.separator();
            ui.strong("Zeit (Sekunden)");
            changed |= time_edit(ui, "Min", &mut state.filters.min_time_text);
            changed |= time_edit(ui, "Max", &mut state.filters.max_time_text);
        });

    if changed {
        state.refilter();
    }
}

/// One collapsible multi-select facet with All/None shortcuts.
/// Returns whether the selection changed.
fn facet<T: Ord + Clone>(
    ui: &mut Ui,
    title: &str,
    all_values: &BTreeSet<T>,
    selected: &mut BTreeSet<T>,
    label: impl Fn(&T) -> String,
) -> bool {
    let mut changed = false;
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = all_values.clone();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for val in all_values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, label(val)).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed
}

fn time_edit(ui: &mut Ui, label: &str, text: &mut String) -> bool {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        ui.add(egui::TextEdit::singleline(text).desired_width(80.0))
            .changed()
    })
    .inner
}

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
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.menu_button("Export", |ui: &mut Ui| {
            for format in ExportFormat::ALL {
                if ui.button(format.label()).clicked() {
                    export_dialog(state, format);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if let Some(ds) = state.cache.dataset() {
            ui.label(format!(
                "{} runs loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            ui.separator();
        }

        if let Some(msg) = &state.status {
            let color = match msg.level {
                StatusLevel::Info => Color32::LIGHT_GREEN,
                StatusLevel::Warning => Color32::YELLOW,
                StatusLevel::Error => Color32::RED,
            };
            ui.label(RichText::new(&msg.text).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open timing data")
        .add_filter(
            "Supported files",
            &["xlsx", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(path);
    }
}

fn export_dialog(state: &mut AppState, format: ExportFormat) {
    let file = rfd::FileDialog::new()
        .set_title(&format!("Export filtered data as {}", format.label()))
        .set_file_name(&format!("filtered_data.{}", format.extension()))
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        state.export(format, &path);
    }
}
