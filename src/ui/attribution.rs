use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analytics::attribution::{self, AttributionMetric, StackedSeries};
use crate::color::ColorMap;
use crate::data::LoadResult;
use crate::state::AppState;
use crate::ui::{plot, table};

/// Attribution tables are read unnormalized: their free-text columns
/// (STORE, ATTRIBUTION_SOURCE, PAGEREFERRER) would not survive coercion.
pub fn page(ui: &mut Ui, state: &mut AppState, result: &LoadResult) {
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Attribution Model");
        ui.separator();

        // ---- Orders per month per store ----
        ui.label(RichText::new("Orders per month per store").strong());
        match result.raw("orders_month_store") {
            Some(orders) => {
                let series = attribution::orders_per_month_store(orders);
                let stores = series_names(&series);
                plot::stacked_bar_chart(ui, "orders_store", &series, &ColorMap::new(stores));
            }
            None => missing(ui, "orders_month_store"),
        }
        ui.separator();

        let Some(model) = result.raw("attribution_model_90") else {
            missing(ui, "attribution_model_90");
            return;
        };
        let colors = ColorMap::for_sources(attribution::sources(model));

        // ---- Share of attributed orders ----
        ui.label(RichText::new("Share of attributed orders by source").strong());
        let shares = attribution::source_shares(model);
        egui::Grid::new("source_shares").striped(true).show(ui, |ui: &mut Ui| {
            ui.strong("Source");
            ui.strong("Orders");
            ui.strong("Share");
            ui.end_row();
            for s in &shares {
                ui.label(RichText::new(&s.source).color(colors.color_for(&s.source)));
                ui.label(format!("{:.0}", s.orders));
                ui.label(format!("{:.1}%", s.pct));
                ui.end_row();
            }
        });
        ui.separator();

        // ---- Monthly attributed orders / revenue ----
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new("Monthly attribution by source").strong());
            ui.radio_value(&mut state.attribution_metric, AttributionMetric::Orders, "Orders");
            ui.radio_value(&mut state.attribution_metric, AttributionMetric::Revenue, "Revenue");
        });
        let monthly = attribution::monthly_by_source(model, state.attribution_metric);
        plot::stacked_bar_chart(ui, "monthly_source", &monthly, &colors);
        ui.separator();

        // ---- Page referrers ----
        egui::CollapsingHeader::new(RichText::new("Contribution by page referrer").strong())
            .id_salt("referrers")
            .show(ui, |ui: &mut Ui| {
                let rows: Vec<(String, String)> = attribution::referrer_contribution(model)
                    .into_iter()
                    .map(|r| {
                        let value = match state.attribution_metric {
                            AttributionMetric::Orders => format!("{:.0}", r.orders),
                            AttributionMetric::Revenue => format!("${:.2}", r.revenue),
                        };
                        (r.referrer, value)
                    })
                    .collect();
                let header = match state.attribution_metric {
                    AttributionMetric::Orders => "Orders",
                    AttributionMetric::Revenue => "Revenue",
                };
                table::pairs_table(ui, "referrer_grid", ("Referrer", header), &rows);
            });
        ui.separator();

        // ---- Customer journey ----
        let Some(cjm) = result.raw("attribution_cjm") else {
            missing(ui, "attribution_cjm");
            return;
        };

        let cjm_sources = attribution::sources(cjm);
        let journey_colors = ColorMap::for_sources(cjm_sources.iter().cloned());

        ui.label(RichText::new("Distinct orders by touchpoint step and source").strong());
        let by_step: StackedSeries = attribution::touchpoint_orders(cjm)
            .into_iter()
            .map(|(step, by_source)| {
                let layers: BTreeMap<String, f64> = by_source.into_iter().map(|(s, n)| (s, n as f64)).collect();
                (format!("{step:02}"), layers)
            })
            .collect();
        plot::stacked_bar_chart(ui, "touchpoints", &by_step, &journey_colors);
        ui.separator();

        if !state
            .funnel_source
            .as_ref()
            .is_some_and(|s| cjm_sources.contains(s))
        {
            state.funnel_source = cjm_sources.first().cloned();
        }
        let current = state.funnel_source.clone().unwrap_or_default();
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new("Touchpoint funnel for").strong());
            egui::ComboBox::from_id_salt("funnel_source")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for s in &cjm_sources {
                        if ui.selectable_label(&current == s, s).clicked() {
                            state.funnel_source = Some(s.clone());
                        }
                    }
                });
        });
        if let Some(source) = state.funnel_source.as_deref() {
            let funnel: Vec<(String, f64)> = attribution::touchpoint_funnel(cjm, source)
                .into_iter()
                .map(|(step, n)| (format!("Step {step}"), n as f64))
                .collect();
            plot::bar_chart(ui, "touchpoint_funnel", source, &funnel, journey_colors.color_for(source));
            plot::x_axis_key(ui, funnel.iter().map(|(s, _)| s.as_str()));
        }
    });
}

fn series_names(series: &StackedSeries) -> Vec<String> {
    let mut names: Vec<String> = series.values().flat_map(|s| s.keys().cloned()).collect();
    names.sort();
    names.dedup();
    names
}

fn missing(ui: &mut Ui, table: &str) {
    ui.label(RichText::new(format!("The {table} dataset is not loaded.")).color(Color32::RED));
}
