use eframe::egui;

use rootlens::app::RootlensApp;

fn main() {
    env_logger::init();

    let endpoint = std::env::var("ROOTLENS_API")
        .unwrap_or_else(|_| String::from("http://127.0.0.1:8080"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rootlens — AI Ancestry Reader",
        options,
        Box::new(move |_cc| Ok(Box::new(RootlensApp::new(endpoint)))),
    )
    .expect("failed to start Rootlens");
}
