use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analytics::summary::{self, CAMPAIGN_START};
use crate::analytics::{outbound::CAMPAIGN_GROUP, top_n_by_sum};
use crate::data::model::Dataset;
use crate::data::{LoadReport, LoadResult};
use crate::state::AppState;
use crate::ui::{plot, table};

const PREVIEW_ROWS: usize = 500;
const TOP_N: usize = 10;
const RAW_TABLES: &[&str] = &["tenants"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Exploratory view of the selected dataset.
pub fn page(ui: &mut Ui, state: &mut AppState, result: &LoadResult) {
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Exploratory Data Analysis");
        load_report(ui, &result.report);
        ui.separator();

        let Some(dataset) = state.selected_dataset.as_deref().and_then(|n| result.get(n)) else {
            ui.label("Select a dataset in the side panel.");
            return;
        };

        let (view, total) = page_view(result, dataset, &state.visible_indices);

        ui.heading(&dataset.name);
        ui.label(format!("{} of {} rows after filters", view.len(), total));
        let all: Vec<usize> = (0..view.len()).collect();
        table::dataset_table(ui, "preview", &view, &all, PREVIEW_ROWS);

        ui.add_space(8.0);
        describe_section(ui, &view);

        ui.add_space(8.0);
        match dataset.name.as_str() {
            "outbound" => outbound_section(ui, state, &view),
            "market" => market_section(ui, &view),
            "tenants" => tenants_section(ui, &view),
            _ => {}
        }
    });
}

/// The rows the page shows, and the row count they are drawn from.
///
/// Tables in `RAW_TABLES` are shown as read; their identifiers and
/// source types are free text that normalization would null.
fn page_view(result: &LoadResult, dataset: &Dataset, visible: &[usize]) -> (Dataset, usize) {
    if RAW_TABLES.contains(&dataset.name.as_str()) {
        if let Some(raw) = result.raw(&dataset.name) {
            return (raw.clone(), raw.len());
        }
    }
    let view = dataset.select_rows(visible);
    let view = if dataset.name == "outbound" {
        summary::with_campaign_length(&view)
    } else {
        view
    };
    (view, dataset.len())
}

// ---------------------------------------------------------------------------
// Shared sections
// ---------------------------------------------------------------------------

fn load_report(ui: &mut Ui, report: &LoadReport) {
    egui::CollapsingHeader::new("Load report")
        .id_salt("load_report")
        .default_open(!report.failures.is_empty())
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Copy as JSON").clicked() {
                match report.to_json() {
                    Ok(json) => ui.ctx().copy_text(json),
                    Err(e) => log::error!("Failed to serialize load report: {e}"),
                }
            }
            for name in &report.created {
                ui.label(RichText::new(format!("Stored '{name}'")).color(Color32::GREEN));
            }
            for name in &report.skipped_existing {
                ui.label(format!("Table '{name}' already exists, skipped"));
            }
            for failure in &report.failures {
                ui.label(
                    RichText::new(format!("Error loading {}: {}", failure.file.display(), failure.reason))
                        .color(Color32::RED),
                );
            }
        });
}

fn describe_section(ui: &mut Ui, view: &Dataset) {
    egui::CollapsingHeader::new("Descriptive statistics")
        .id_salt("describe")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("describe_grid").striped(true).show(ui, |ui: &mut Ui| {
                for h in ["column", "count", "mean", "std", "min", "max"] {
                    ui.strong(h);
                }
                ui.end_row();
                for s in summary::describe(view) {
                    ui.label(&s.column);
                    ui.label(s.count.to_string());
                    ui.label(format!("{:.2}", s.mean));
                    ui.label(s.std.map(|v| format!("{v:.2}")).unwrap_or_default());
                    ui.label(format!("{:.2}", s.min));
                    ui.label(format!("{:.2}", s.max));
                    ui.end_row();
                }
            });
        });

    egui::CollapsingHeader::new("Unique values per column")
        .id_salt("unique_counts")
        .show(ui, |ui: &mut Ui| {
            let rows: Vec<(String, String)> = summary::unique_counts(view)
                .into_iter()
                .map(|(c, n)| (c, n.to_string()))
                .collect();
            table::pairs_table(ui, "unique_grid", ("Column", "Unique values"), &rows);
        });
}

// ---------------------------------------------------------------------------
// Per-dataset sections
// ---------------------------------------------------------------------------

fn outbound_section(ui: &mut Ui, state: &mut AppState, view: &Dataset) {
    let metrics: Vec<String> = summary::describe(view)
        .into_iter()
        .map(|s| s.column)
        .filter(|c| c != summary::CAMPAIGN_LENGTH)
        .collect();

    let current = state.metric.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("metric")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for m in &metrics {
                if ui.selectable_label(&current == m, m).clicked() {
                    state.metric = Some(m.clone());
                }
            }
        });

    let Some(metric) = state.metric.as_deref() else {
        return;
    };

    ui.label(RichText::new(format!("{metric} per campaign group")).strong());
    let per_group = top_n_by_sum(view, CAMPAIGN_GROUP, metric, usize::MAX);
    plot::bar_chart(ui, "metric_by_group", metric, &per_group, Color32::LIGHT_BLUE);
    plot::x_axis_key(ui, per_group.iter().map(|(g, _)| g.as_str()));

    ui.label(RichText::new(format!("{metric} by campaign start month")).strong());
    let by_month: Vec<(String, f64)> = summary::sum_by_month(view, CAMPAIGN_START, metric)
        .into_iter()
        .map(|(m, v)| (month_name(m).to_string(), v))
        .collect();
    plot::bar_chart(ui, "metric_by_month", metric, &by_month, Color32::LIGHT_GREEN);
    plot::x_axis_key(ui, by_month.iter().map(|(m, _)| m.as_str()));
}

fn market_section(ui: &mut Ui, view: &Dataset) {
    ui.label(RichText::new("TOTAL_GMV by GMV category").strong());
    let by_category: Vec<(String, f64)> = crate::analytics::group_sum(view, "GMV_CATEGORY", "TOTAL_GMV")
        .into_iter()
        .collect();
    plot::bar_chart(ui, "gmv_by_category", "TOTAL_GMV", &by_category, Color32::GOLD);
    plot::x_axis_key(ui, by_category.iter().map(|(c, _)| c.as_str()));

    for (column, color) in [("PLATFORM", Color32::LIGHT_BLUE), ("COUNTRY", Color32::LIGHT_RED)] {
        ui.label(RichText::new(format!("Top {TOP_N} {} by TOTAL_GMV", column.to_lowercase())).strong());
        let top = top_n_by_sum(view, column, "TOTAL_GMV", TOP_N);
        plot::bar_chart(ui, &format!("top_{column}"), "TOTAL_GMV", &top, color);
        plot::x_axis_key(ui, top.iter().map(|(c, _)| c.as_str()));
    }
}

fn tenants_section(ui: &mut Ui, view: &Dataset) {
    ui.label(RichText::new(format!("Top {TOP_N} tenants by data sources")).strong());
    let mut counts = summary::distinct_per_group(view, "TENANT_ID", "DATASOURCE_ID");
    counts.truncate(TOP_N);
    let bars: Vec<(String, f64)> = counts.into_iter().map(|(t, n)| (t, n as f64)).collect();
    plot::bar_chart(ui, "tenant_sources", "DATASOURCE_ID", &bars, Color32::LIGHT_BLUE);
    plot::x_axis_key(ui, bars.iter().map(|(t, _)| t.as_str()));
}

fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .copied()
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use crate::data::normalize::{normalize, NormalizeOptions};

    fn loaded(raw: Dataset) -> LoadResult {
        let mut result = LoadResult::default();
        result
            .datasets
            .insert(raw.name.clone(), normalize(&raw, &NormalizeOptions::default()));
        result.raw.insert(raw.name.clone(), raw);
        result
    }

    #[test]
    fn tenants_are_shown_as_read() {
        let text = |s: &str| Value::Text(s.into());
        let result = loaded(Dataset::new(
            "tenants",
            vec!["TENANT_ID".into(), "DATASOURCE_TYPE".into()],
            vec![vec![text("t-01"), text("shopify")], vec![text("t-02"), text("google")]],
        ));
        let normalized = result.get("tenants").unwrap();

        let (view, total) = page_view(&result, normalized, &[0]);
        assert_eq!(total, 2);
        assert_eq!(view.rows[1], vec![text("t-02"), text("google")]);
    }

    #[test]
    fn other_tables_use_normalized_visible_rows() {
        let result = loaded(Dataset::new(
            "market",
            vec!["TOTAL_GMV".into()],
            vec![vec![Value::Text("$1,000".into())], vec![Value::Text("$2,000".into())]],
        ));
        let normalized = result.get("market").unwrap();

        let (view, total) = page_view(&result, normalized, &[1]);
        assert_eq!(total, 2);
        assert_eq!(view.rows, vec![vec![Value::Integer(2000)]]);
    }
}
