use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analytics::outbound::{self, NEW_ARR, PARETO_THRESHOLD};
use crate::data::LoadResult;
use crate::ui::{plot, table};

const SEGMENT_ROWS: usize = 15;

/// Outbound sizing: ARR concentration, market potential and ICP funnel.
pub fn page(ui: &mut Ui, result: &LoadResult) {
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Outbound Sizing Analysis");
        ui.separator();

        let Some(campaigns) = result.get("outbound") else {
            ui.label(RichText::new("The outbound dataset is not loaded.").color(Color32::RED));
            return;
        };

        // ---- ARR concentration ----
        ui.label(RichText::new(format!("{NEW_ARR} by campaign")).strong());
        let pareto = outbound::arr_pareto(campaigns);
        let bars: Vec<(String, f64, bool)> = pareto
            .entries
            .iter()
            .map(|e| (e.campaign.clone(), e.arr.unwrap_or(0.0), e.top))
            .collect();
        plot::highlighted_bar_chart(
            ui,
            "arr_pareto",
            ("Top 80%", "Other"),
            &bars,
            (Color32::from_rgb(0x1F, 0x4E, 0xD8), Color32::LIGHT_GRAY),
        );
        plot::x_axis_key(ui, bars.iter().map(|(c, _, _)| c.as_str()));
        ui.label(format!(
            "{:.0}% of campaigns ({}) account for {:.0}% of total new ARR (${:.0}).",
            pareto.top_share_pct,
            pareto.top_count,
            PARETO_THRESHOLD * 100.0,
            pareto.total
        ));
        ui.separator();

        // ---- Addressable market ----
        ui.label(RichText::new("Potential new ARR by GMV category and country").strong());
        let Some(market) = result.get("market") else {
            ui.label(RichText::new("The market dataset is not loaded.").color(Color32::RED));
            return;
        };
        let tam = outbound::tam_potential(market);
        ui.label(format!("Total potential ARR from the addressable market: ${:.0}", tam.total));
        ui.label(format!(
            "United States: ${:.0} ({:.0}% of the opportunity)",
            tam.us_total, tam.us_share_pct
        ));

        let mut segments: Vec<(&(String, String), &f64)> = tam.by_segment.iter().collect();
        segments.sort_by(|a, b| b.1.total_cmp(a.1));
        let rows: Vec<(String, String)> = segments
            .into_iter()
            .take(SEGMENT_ROWS)
            .map(|((category, country), arr)| (format!("{category} / {country}"), format!("${arr:.0}")))
            .collect();
        egui::CollapsingHeader::new("Largest segments")
            .id_salt("tam_segments")
            .show(ui, |ui: &mut Ui| {
                table::pairs_table(ui, "segments_grid", ("Segment", "Potential ARR"), &rows);
            });
        ui.separator();

        // ---- Funnel and ICP conversion ----
        ui.label(RichText::new("Outbound campaign funnel").strong());
        let funnel: Vec<(String, f64)> = outbound::outreach_funnel(campaigns)
            .into_iter()
            .map(|s| (s.label.to_string(), s.count))
            .collect();
        plot::bar_chart(ui, "funnel", "Count", &funnel, Color32::LIGHT_BLUE);
        plot::x_axis_key(ui, funnel.iter().map(|(s, _)| s.as_str()));

        match outbound::contribution_pct(campaigns, &tam) {
            Some(pct) => ui.label(format!("Outbound campaigns contribute {pct:.2}% of the addressable market.")),
            None => ui.label("No addressable market to compare against."),
        };

        let rates = outbound::icp_rates(campaigns);
        let fmt = |r: Option<f64>| r.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".into());
        table::pairs_table(
            ui,
            "icp_rates",
            ("ICP rate", "Mean"),
            &[
                ("Click-through".into(), fmt(rates.click_through)),
                ("Reply".into(), fmt(rates.reply)),
                ("Positive reply".into(), fmt(rates.positive_reply)),
            ],
        );
        if rates.companies_touched > 0.0 {
            ui.label(format!(
                "ICP companies are {:.2}% of companies reached.",
                rates.icp_touched / rates.companies_touched * 100.0
            ));
        }

        let issues = outbound::limitations(&rates);
        if issues.is_empty() {
            ui.label("Outbound is performing well with respect to ICP conversion rates.");
        } else {
            ui.label(RichText::new("Outbound is facing the following limitations:").strong());
            for issue in issues {
                ui.label(format!("• {issue}"));
            }
        }
    });
}
