use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Dataset;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable table of the given rows. `indices` selects and orders the rows.
pub fn dataset_table(ui: &mut Ui, id: &str, dataset: &Dataset, indices: &[usize], max_rows: usize) {
    if dataset.columns.is_empty() {
        ui.label("Dataset has no columns.");
        return;
    }

    let shown = &indices[..indices.len().min(max_rows)];

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(320.0)
                .columns(Column::auto().resizable(true), dataset.columns.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for name in &dataset.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, shown.len(), |mut row| {
                        let record = &dataset.rows[shown[row.index()]];
                        for cell in record {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                });
        });
    });

    if indices.len() > shown.len() {
        ui.small(format!("Showing {} of {} rows", shown.len(), indices.len()));
    }
}

/// Two-column table of label/value pairs.
pub fn pairs_table(ui: &mut Ui, id: &str, headers: (&str, &str), rows: &[(String, String)]) {
    egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        ui.strong(headers.0);
        ui.strong(headers.1);
        ui.end_row();
        for (label, value) in rows {
            ui.label(label);
            ui.label(value);
            ui.end_row();
        }
    });
}
