use std::collections::BTreeSet;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::analytics::attribution::StackedSeries;
use crate::color::ColorMap;

const PLOT_HEIGHT: f32 = 260.0;
const BAR_WIDTH: f64 = 0.7;

// ---------------------------------------------------------------------------
// Single-series bars
// ---------------------------------------------------------------------------

/// One bar per category, in the order given. Category names show on hover.
pub fn bar_chart(ui: &mut Ui, id: &str, series: &str, categories: &[(String, f64)], color: Color32) {
    if categories.is_empty() {
        ui.label("Nothing to plot.");
        return;
    }

    let bars: Vec<Bar> = categories
        .iter()
        .enumerate()
        .map(|(i, (name, y))| Bar::new(i as f64, *y).name(name).width(BAR_WIDTH))
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(series).color(color));
        });
}

/// Bars split into a highlighted and a muted series, keeping their order.
pub fn highlighted_bar_chart(
    ui: &mut Ui,
    id: &str,
    names: (&str, &str),
    categories: &[(String, f64, bool)],
    colors: (Color32, Color32),
) {
    if categories.is_empty() {
        ui.label("Nothing to plot.");
        return;
    }

    let (mut hot, mut rest) = (Vec::new(), Vec::new());
    for (i, (name, y, highlighted)) in categories.iter().enumerate() {
        let bar = Bar::new(i as f64, *y).name(name).width(BAR_WIDTH);
        if *highlighted {
            hot.push(bar);
        } else {
            rest.push(bar);
        }
    }

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(hot).name(names.0).color(colors.0));
            plot_ui.bar_chart(BarChart::new(rest).name(names.1).color(colors.1));
        });
}

// ---------------------------------------------------------------------------
// Stacked bars
// ---------------------------------------------------------------------------

/// Stacked bars: one stack per x label, one layer per series.
pub fn stacked_bar_chart(ui: &mut Ui, id: &str, data: &StackedSeries, colors: &ColorMap) {
    if data.is_empty() {
        ui.label("Nothing to plot.");
        return;
    }

    let series: BTreeSet<&str> = data.values().flat_map(|s| s.keys().map(String::as_str)).collect();

    let mut charts: Vec<BarChart> = Vec::with_capacity(series.len());
    for name in series {
        let bars: Vec<Bar> = data
            .iter()
            .enumerate()
            .map(|(i, (x, layers))| {
                let y = layers.get(name).copied().unwrap_or(0.0);
                Bar::new(i as f64, y).name(format!("{x} · {name}")).width(BAR_WIDTH)
            })
            .collect();

        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(name)
            .color(colors.color_for(name))
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });

    x_axis_key(ui, data.keys().map(String::as_str));
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// A single line through `(x, y)` points.
pub fn line_chart(ui: &mut Ui, id: &str, series: &str, points: &[(f64, f64)], color: Color32) {
    if points.is_empty() {
        ui.label("Nothing to plot.");
        return;
    }

    let pts: PlotPoints = points.iter().map(|&(x, y)| [x, y]).collect();
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(pts).name(series).color(color).width(2.0));
        });
}

/// Labels for bar positions 0, 1, 2, ... under a categorical chart.
pub fn x_axis_key<'a>(ui: &mut Ui, labels: impl Iterator<Item = &'a str>) {
    let key: Vec<String> = labels.enumerate().map(|(i, l)| format!("{i}: {l}")).collect();
    ui.small(key.join("   "));
}
