mod app;
mod config;
mod error;
mod hierarchy;
mod pack;
mod scene;
mod style;
mod util;
mod zoom;

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::VisualConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Hierarchy JSON file (`name`, `size`, `children`).
    data: PathBuf,

    /// TOML file overriding the visual defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,circle_zoom={level}")));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let config = VisualConfig::load(args.config.as_deref())?;
    tracing::info!(data = %args.data.display(), "starting");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([config.layout_width as f32, config.layout_height as f32]),
        ..Default::default()
    };

    eframe::run_native(
        "circle-zoom",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::CircleZoomApp::new(
                cc,
                args.data.clone(),
                config.clone(),
            )))
        }),
    )
    .map_err(|error| anyhow!("{error}"))
}
