mod app;
mod color;
mod state;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use app::KinaseExplorerApp;
use eframe::egui;
use kinase_explorer::{ExplorerConfig, MutationExplorer};
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    // Optional first argument: path to a JSON config file.
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ExplorerConfig::resolve(config_path.as_deref()).context("resolving configuration")?;

    let explorer = MutationExplorer::load(&config).with_context(|| {
        format!(
            "loading catalogs {} and {}",
            config.residue_source.display(),
            config.variant_source.display()
        )
    })?;
    let banner = config.existing_banner().map(Path::to_path_buf);
    let state = AppState::new(Arc::new(explorer), banner);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Kinase Mutation Explorer",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the banner png/jpeg.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(KinaseExplorerApp::new(state)))
        }),
    )
    .map_err(|e| anyhow!("running the explorer window: {e}"))
}
