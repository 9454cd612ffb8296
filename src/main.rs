mod config; // layered TOML + environment configuration
mod graphics; // macroquad scene camera, point batches, indicator, HUD
mod input; // platform input snapshot
mod viewer; // frame loop

use anyhow::Context;
use macroquad::Window;
use terrain_points::PointCloud;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

use crate::config::{DEFAULT_CONFIG_PATH, load_viewer_config};
use crate::graphics::window_conf;
use crate::viewer::Viewer;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Terrain Cloud starting");

    // Rasters are decoded and indexed before the window opens.
    let viewer = match setup() {
        Ok(viewer) => viewer,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return Err(e);
        }
    };

    let conf = window_conf(viewer.config());
    Window::from_config(conf, viewer.run());

    info!("Terrain Cloud exited");
    Ok(())
}

fn setup() -> anyhow::Result<Viewer> {
    let config = load_viewer_config(DEFAULT_CONFIG_PATH)?;
    let cloud = PointCloud::load(&config.data.heightmap, &config.data.color)
        .context("failed to load the terrain rasters")?;
    Viewer::new(config, cloud)
}
