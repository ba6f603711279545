use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::{DatasetCache, LoadResult};
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – dataset picker and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel of the EDA page.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, result: &LoadResult) {
    ui.heading("Dataset");
    ui.separator();

    if result.is_empty() {
        ui.label("No datasets loaded.");
        return;
    }

    let current = state.selected_dataset.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("dataset")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for name in result.names() {
                if ui.selectable_label(current == name, name).clicked() {
                    if let Some(ds) = result.get(name) {
                        state.select_dataset(ds);
                    }
                }
            }
        });

    let Some(dataset) = state.selected_dataset.as_deref().and_then(|n| result.get(n)) else {
        return;
    };

    ui.add_space(8.0);
    ui.heading("Filters");
    ui.separator();

    let unique = dataset.unique_values();
    let columns: Vec<String> = state.filters.keys().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Campaign start window ----
            if dataset.column_index(crate::analytics::summary::CAMPAIGN_START).is_some() {
                let mut enabled = state.date_window.is_some();
                if ui.checkbox(&mut enabled, "Limit campaign start dates").changed() {
                    if enabled {
                        state.enable_date_window(dataset);
                    } else {
                        state.disable_date_window(dataset);
                    }
                }
                if let Some((mut from, mut to)) = state.date_window {
                    let mut changed = false;
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("From");
                        changed |= ui.add(DatePickerButton::new(&mut from).id_salt("start_from")).changed();
                    });
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("To");
                        changed |= ui.add(DatePickerButton::new(&mut to).id_salt("start_to")).changed();
                    });
                    if changed {
                        state.date_window = Some((from, to));
                        state.refilter(dataset);
                    }
                }
                ui.separator();
            }

            // ---- Per-column filter widgets (collapsible) ----
            for col in &columns {
                let Some(all_values) = unique.get(col) else {
                    continue;
                };

                let n_selected = state.filters.get(col).map(|s| s.len()).unwrap_or(0);
                let n_total = all_values.len();
                let header_text = format!("{col}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dataset, col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dataset, col);
                            }
                        });

                        for val in all_values {
                            let mut checked = state
                                .filters
                                .get(col)
                                .is_some_and(|s| s.contains(val));
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(dataset, col, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / page switcher.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, result: Option<&LoadResult>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let selected = result.zip(state.selected_dataset.as_deref()).and_then(|(r, n)| r.get(n));
            if ui
                .add_enabled(selected.is_some(), egui::Button::new("Export dataset to Parquet…"))
                .clicked()
            {
                if let Some(ds) = selected {
                    export_dialog(state, ds);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        for page in Page::ALL {
            if ui.selectable_label(state.page == page, page.title()).clicked() {
                state.page = page;
            }
        }

        ui.separator();

        if let Some(r) = result {
            ui.label(format!("{} datasets loaded", r.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Load failure
// ---------------------------------------------------------------------------

/// Explain a failed load. Returns true when the user asks to retry.
pub fn load_error(ui: &mut Ui, error: Option<&str>, cache: &DatasetCache) -> bool {
    let mut retry = false;
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("Datasets could not be loaded");
        if let Some(e) = error {
            ui.label(RichText::new(e).color(Color32::RED));
        }
        ui.label(format!("Data directory: {}", cache.data_dir().display()));
        ui.label(format!("Store: {}", cache.db_path().display()));
        retry = ui.button("Retry").clicked();
    });
    retry
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

fn export_dialog(state: &mut AppState, dataset: &crate::data::Dataset) {
    let file = rfd::FileDialog::new()
        .set_title("Export dataset")
        .set_file_name(format!("{}.parquet", dataset.name))
        .add_filter("Parquet", &["parquet", "pq"])
        .save_file();

    if let Some(path) = file {
        match crate::export::write_parquet(dataset, &path) {
            Ok(()) => {
                log::info!("Exported '{}' to {}", dataset.name, path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export dataset: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
