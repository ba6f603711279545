use campaign_lens::app::CampaignLensApp;
use campaign_lens::config::DashboardConfig;
use clap::Parser;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::parse();
    log::info!(
        "Reading CSV files from {} into {}",
        config.data_dir.display(),
        config.db_path.display()
    );
    let cache = config.dataset_cache();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Campaign Lens – Marketing Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(CampaignLensApp::new(cache)))),
    )
}
