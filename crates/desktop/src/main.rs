//! SakhiChat Desktop — application entry.

mod app;

use anyhow::Context;
use eframe::egui;
use sakhi::widget::{ChatController, HttpChatService, Labels, TranscriptBuffer};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    app::install_logger();

    let (config, path) = sakhi::config::load_config(None)?;
    log::debug!("using config {}", path.display());
    let labels = Labels::from_config(&config.widget).context("invalid widget labels")?;
    let service = HttpChatService::from_config(&config).context("building chat client")?;
    let endpoint = service.endpoint().to_string();
    let controller = ChatController::new(
        String::new(),
        TranscriptBuffer::new(),
        labels,
        Arc::new(service),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([400.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "SakhiChat",
        options,
        Box::new(move |_cc| Box::new(app::SakhiApp::new(controller, handle, endpoint))),
    )
    .map_err(|e| anyhow::anyhow!("desktop window failed: {}", e))
}
