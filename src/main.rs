mod engine;
mod logutil;
mod model;
mod ui;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = ui::settings_io::load_settings();
    log::info!("model endpoint: {} ({})", settings.llm.base_url, settings.llm.model);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Detective AI: The Noir Files")
            .with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Noir Files",
        options,
        Box::new(|_cc| {
            Ok(Box::new(ui::app::NoirApp::new(settings)))
        }),
    )
}
