use eframe::egui;

use crate::data::DatasetCache;
use crate::state::{AppState, Page};
use crate::ui::{attribution, eda, outbound, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CampaignLensApp {
    cache: DatasetCache,
    pub state: AppState,
    /// Set when the load failed; cleared by the retry button.
    load_error: Option<String>,
}

impl CampaignLensApp {
    pub fn new(cache: DatasetCache) -> Self {
        Self {
            cache,
            state: AppState::default(),
            load_error: None,
        }
    }
}

impl eframe::App for CampaignLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let loaded = if self.load_error.is_some() {
            None
        } else {
            match self.cache.get() {
                Ok(result) => Some(result),
                Err(e) => {
                    log::error!("Failed to load datasets: {e:#}");
                    self.load_error = Some(e.to_string());
                    None
                }
            }
        };

        // ---- Top panel: navigation and menu ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, loaded);
        });

        let Some(result) = loaded else {
            egui::CentralPanel::default().show(ctx, |ui| {
                if panels::load_error(ui, self.load_error.as_deref(), &self.cache) {
                    self.load_error = None;
                }
            });
            return;
        };

        // ---- Left side panel: dataset picker and filters ----
        if self.state.page == Page::Eda {
            self.state.ensure_selection(result);
            egui::SidePanel::left("filter_panel")
                .default_width(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state, result);
                });
        }

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Eda => eda::page(ui, &mut self.state, result),
            Page::OutboundSizing => outbound::page(ui, result),
            Page::Attribution => attribution::page(ui, &mut self.state, result),
        });
    }
}
