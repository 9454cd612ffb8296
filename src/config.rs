use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use terrain_camera::{CameraSettings, CameraState, IndicatorSettings};
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "TERRAIN_CLOUD";

/// Everything the viewer can be configured with. Every field has a default,
/// so an empty (or missing) file yields the stock viewer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub data: DataConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub indicator: IndicatorSettings,
    pub normalize: NormalizeConfig,
    pub frame: FrameConfig,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Terrain Cloud".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Raster whose red channel is the terrain height.
    pub heightmap: PathBuf,
    /// Raster providing the point colors.
    pub color: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::from("images/nyTerrain.png"),
            color: PathBuf::from("images/ndvi_nyState.png"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial camera position `[x, y, z]`.
    pub initial: [f32; 3],
    #[serde(flatten)]
    pub controls: CameraSettings,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial: [2300.0, -1850.0, 150.0],
            controls: CameraSettings::default(),
        }
    }
}

impl CameraConfig {
    pub fn initial_state(&self) -> CameraState {
        let [x, y, z] = self.initial;
        CameraState::new(x, y, z)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// On-screen point size in pixels.
    pub point_size: f32,
    /// The viewport covers `screen / view_divisor` world units.
    pub view_divisor: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub clear_color: [f32; 3],
    pub show_hud: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            point_size: 4.0,
            view_divisor: 9.0,
            fov_y: 50.0,
            z_near: 0.1,
            z_far: 1000.0,
            clear_color: [0.05, 0.06, 0.08],
            show_hud: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Height of the tallest visible point after normalization.
    pub scale: f32,
    pub epsilon: f32,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            scale: terrain_points::normalize::DEFAULT_SCALE,
            epsilon: terrain_points::normalize::DEFAULT_EPSILON,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    /// Target frames per second.
    pub tick_rate: f32,
    /// Seconds between frame statistics log lines.
    pub stats_interval: f32,
    /// Wheel delta reported by the platform for one notch.
    pub wheel_units_per_notch: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            stats_interval: 5.0,
            wheel_units_per_notch: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Use the uniform grid; otherwise every frame scans the whole cloud.
    pub use_grid: bool,
    /// Grid cell edge in world units.
    pub cell_size: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            use_grid: true,
            cell_size: 32.0,
        }
    }
}

impl ViewerConfig {
    /// Viewport extent `(width, height)` in world units.
    pub fn view_extent(&self) -> (f32, f32) {
        (
            self.window.width as f32 / self.render.view_divisor,
            self.window.height as f32 / self.render.view_divisor,
        )
    }

    /// Rejects values the viewer cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            bail!(
                "window size must be non-zero, got {}x{}",
                self.window.width,
                self.window.height
            );
        }
        self.camera
            .controls
            .validate()
            .context("invalid camera settings")?;

        let positive = [
            ("render.point_size", self.render.point_size),
            ("render.view_divisor", self.render.view_divisor),
            ("render.fov_y", self.render.fov_y),
            ("render.z_near", self.render.z_near),
            ("normalize.scale", self.normalize.scale),
            ("normalize.epsilon", self.normalize.epsilon),
            ("frame.tick_rate", self.frame.tick_rate),
            ("frame.stats_interval", self.frame.stats_interval),
            ("frame.wheel_units_per_notch", self.frame.wheel_units_per_notch),
            ("index.cell_size", self.index.cell_size),
            ("indicator.anchor_divisor", self.indicator.anchor_divisor),
            ("indicator.scale_exponent", self.indicator.scale_exponent),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                bail!("{name} must be positive and finite, got {value}");
            }
        }
        if self.render.fov_y >= 180.0 {
            bail!("render.fov_y must be below 180 degrees, got {}", self.render.fov_y);
        }
        if !(self.render.z_far > self.render.z_near) {
            bail!(
                "render.z_far ({}) must be greater than render.z_near ({})",
                self.render.z_far,
                self.render.z_near
            );
        }
        Ok(())
    }
}

/// Layers the optional TOML file at `path` under `TERRAIN_CLOUD__SECTION__KEY`
/// environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    info!("Attempting to load configuration from {}", path.display());

    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration");
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

/// Loads, deserializes and validates the viewer configuration.
pub fn load_viewer_config(path: impl AsRef<Path>) -> anyhow::Result<ViewerConfig> {
    let path = path.as_ref();
    let viewer: ViewerConfig = load_config(path)?
        .try_deserialize()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    viewer.validate()?;
    info!(
        heightmap = %viewer.data.heightmap.display(),
        color = %viewer.data.color.display(),
        grid = viewer.index.use_grid,
        "Viewer configuration ready"
    );
    Ok(viewer)
}
