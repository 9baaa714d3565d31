mod app;
mod error;
mod legend;
mod network;
mod selection;
mod session;
mod simulation;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Partner/staff dataset (JSON). The embedded sample is used when omitted.
    #[arg(long)]
    data: Option<PathBuf>,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width.max(480.0), args.height.max(360.0)]),
        ..Default::default()
    };

    eframe::run_native(
        "Partner Network",
        options,
        Box::new(move |cc| Ok(Box::new(app::NetworkApp::new(cc, args.data.clone())))),
    )
}
