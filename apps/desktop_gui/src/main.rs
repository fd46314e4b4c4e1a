use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Result};
use backend_bridge::{
    commands::BackendCommand,
    runtime::{self, WorkerConfig},
};
use clap::Parser;
use client_core::config::{load_settings, normalize_backend_url};
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use ui::SlidegenApp;

#[derive(Parser, Debug)]
#[command(name = "slidegen-gui")]
struct Args {
    /// Overrides the configured backend address.
    #[arg(long)]
    backend_url: Option<String>,
    /// Directory generated.pptx is saved into.
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(url) = &args.backend_url {
        settings.backend_url = normalize_backend_url(url)?;
    }
    if let Some(dir) = args.download_dir {
        settings.download_dir = dir;
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    runtime::launch(
        cmd_rx,
        ui_tx,
        WorkerConfig {
            backend_url: settings.backend_url.clone(),
            download_dir: settings.download_dir.clone(),
        },
    );

    let default_provider = settings.default_provider;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Slidegen")
            .with_inner_size([960.0, 860.0])
            .with_min_inner_size([560.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Slidegen",
        options,
        Box::new(move |_cc| Ok(Box::new(SlidegenApp::new(cmd_tx, ui_rx, default_provider)))),
    )
    .map_err(|err| anyhow!("desktop window failed: {err}"))
}
