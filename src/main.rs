mod app;
mod chain;
mod flow;
mod util;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui::vec2;
use tracing_subscriber::EnvFilter;

use app::{TxFlowApp, VisualizerConfig};
use chain::DataSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Focal address to visualize.
    #[arg(long)]
    address: String,

    /// Transaction history: a JSON file, or a directory of `<address>.json` files.
    #[arg(long)]
    data: PathBuf,

    /// Captured risk stream: an SSE file, or a directory of `<address>.sse` files.
    #[arg(long)]
    risk: Option<PathBuf>,

    #[arg(long, default_value_t = 800.0)]
    width: f32,

    #[arg(long, default_value_t = 600.0)]
    height: f32,

    #[arg(long, default_value_t = 0.1)]
    zoom_min: f32,

    #[arg(long, default_value_t = 5.0)]
    zoom_max: f32,

    /// Start with the drift simulation paused.
    #[arg(long)]
    no_physics: bool,

    /// Seed the drift simulation for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("txflow=info")),
        )
        .init();

    let args = Args::parse();
    let config = VisualizerConfig {
        canvas: vec2(args.width.max(1.0), args.height.max(1.0)),
        zoom_min: args.zoom_min,
        zoom_max: args.zoom_max,
        live_physics: !args.no_physics,
        physics_seed: args.seed,
    };
    let source = DataSource::new(args.data, args.risk);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([config.canvas.x + 640.0, config.canvas.y + 80.0]),
        ..Default::default()
    };

    eframe::run_native(
        "txflow",
        options,
        Box::new(move |cc| {
            Ok(Box::new(TxFlowApp::new(
                cc,
                source,
                args.address,
                config,
            )))
        }),
    )
}
