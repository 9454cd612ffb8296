use std::time::{Duration, Instant};

use anyhow::Context;
use macroquad::prelude::{Color, clear_background, next_frame, prevent_quit, set_camera};
use spin_sleep::SpinSleeper;
use terrain_camera::{CameraController, CameraState, Indicator, InputState, ScreenSize};
use terrain_points::{
    GridIndex, HeightNormalizer, HeightRange, LinearScan, PointCloud, Viewport, ViewportFilter,
    VisibleSet,
};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::graphics::{IndicatorMesh, PointBatcher, SceneCamera, draw_hud, point_world_size};
use crate::input::{self, WheelAccumulator};

/// Owns the cloud and all per-frame state of the interactive viewer.
pub struct Viewer {
    config: ViewerConfig,
    cloud: PointCloud,
    filter: Box<dyn ViewportFilter>,
    visible: VisibleSet,
    normalizer: HeightNormalizer,
    controller: CameraController,
    screen: ScreenSize,
    camera: CameraState,
}

impl Viewer {
    /// Builds the viewer, including the spatial index when enabled.
    pub fn new(config: ViewerConfig, cloud: PointCloud) -> anyhow::Result<Self> {
        let screen = ScreenSize::new(config.window.width as f32, config.window.height as f32)
            .context("invalid window size")?;
        let controller = CameraController::new(config.camera.controls, screen)
            .context("invalid camera settings")?;
        let normalizer = HeightNormalizer::new(config.normalize.scale, config.normalize.epsilon)
            .context("invalid normalization settings")?;

        let filter: Box<dyn ViewportFilter> = if config.index.use_grid {
            Box::new(
                GridIndex::build(&cloud, config.index.cell_size)
                    .context("failed to build the grid index")?,
            )
        } else {
            info!("Grid index disabled, scanning the full cloud every frame");
            Box::new(LinearScan)
        };

        let camera = config.camera.initial_state();
        info!(%camera, points = cloud.len(), bounds = %cloud.bounds(), "Viewer ready");

        Ok(Self {
            config,
            cloud,
            filter,
            visible: VisibleSet::new(),
            normalizer,
            controller,
            screen,
            camera,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    /// Viewport centered on the camera.
    pub fn viewport(&self) -> Viewport {
        let (width, height) = self.config.view_extent();
        Viewport::centered(self.camera.x, self.camera.y, width, height)
    }

    /// Moves the camera, then selects and normalizes the visible points.
    pub fn step(&mut self, input: &InputState) -> Option<HeightRange> {
        self.controller.update(&mut self.camera, input);
        let viewport = self.viewport();
        self.filter.select(&self.cloud, &viewport, &mut self.visible);
        self.normalizer.normalize(&mut self.visible)
    }

    pub fn indicator(&self, input: &InputState) -> Indicator {
        Indicator::compute(&self.camera, input, self.screen, &self.config.indicator)
    }

    /// Quad edge in world units so points cover the configured pixel size
    /// at the height band's distance from the camera.
    pub fn point_size(&self) -> f32 {
        let render = &self.config.render;
        let distance = (self.camera.z - self.normalizer.scale() / 2.0).max(render.z_near);
        point_world_size(render.point_size, distance, render.fov_y, self.screen.height)
    }

    /// Runs the frame loop until the window is closed or Escape is pressed.
    pub async fn run(mut self) {
        prevent_quit();

        let pacer = FramePacer::new(self.config.frame.tick_rate);
        let mut stats = FrameStats::new(Duration::from_secs_f32(self.config.frame.stats_interval));
        let mut wheel = WheelAccumulator::new(self.config.frame.wheel_units_per_notch);
        let mut batcher = PointBatcher::new();
        let mut indicator_mesh = IndicatorMesh::new();
        let aspect = self.screen.width / self.screen.height;
        let [r, g, b] = self.config.render.clear_color;
        let background = Color::new(r, g, b, 1.0);
        let mut last_busy = Duration::ZERO;

        info!(
            tick_rate = self.config.frame.tick_rate,
            period = ?pacer.period(),
            "Frame loop starting"
        );

        loop {
            let tick_start = Instant::now();

            let input = input::poll(&mut wheel);
            if input.quit {
                info!(camera = %self.camera(), "Quit requested");
                break;
            }
            self.step(&input);
            let indicator = self.indicator(&input);

            clear_background(background);
            set_camera(&SceneCamera::new(&self.camera, aspect, &self.config.render));
            batcher.rebuild(&self.visible, self.point_size());
            batcher.draw();
            indicator_mesh.update(&indicator);
            indicator_mesh.draw();
            if self.config.render.show_hud {
                draw_hud(&self.camera, batcher.primitive_count(), last_busy);
            }

            next_frame().await;

            let busy = tick_start.elapsed();
            let overran = match pacer.pace(busy) {
                Pace::Slept(_) => false,
                Pace::Overrun(by) => {
                    debug!(?busy, ?by, "Frame overran its budget");
                    true
                }
            };
            last_busy = busy;

            if let Some(report) = stats.record(tick_start.elapsed(), busy, overran) {
                debug!(
                    fps = report.fps,
                    avg_busy = ?report.avg_busy,
                    overruns = report.overruns,
                    visible = self.visible().len(),
                    camera = %self.camera(),
                    "Frame statistics"
                );
            }
        }

        info!("Viewer shut down");
    }
}

/// Outcome of pacing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Slept for the remainder of the period.
    Slept(Duration),
    /// The frame took longer than the period by this much.
    Overrun(Duration),
}

/// Keeps frames at a fixed rate by sleeping out the rest of each period.
pub struct FramePacer {
    period: Duration,
    sleeper: SpinSleeper,
}

impl FramePacer {
    pub fn new(tick_rate: f32) -> Self {
        Self {
            period: Duration::from_secs_f32(1.0 / tick_rate),
            sleeper: SpinSleeper::new(10_000),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left in the period after `busy`, or the overrun.
    pub fn budget(&self, busy: Duration) -> Pace {
        match self.period.checked_sub(busy) {
            Some(remaining) => Pace::Slept(remaining),
            None => Pace::Overrun(busy - self.period),
        }
    }

    pub fn pace(&self, busy: Duration) -> Pace {
        let pace = self.budget(busy);
        if let Pace::Slept(remaining) = pace {
            if !remaining.is_zero() {
                self.sleeper.sleep(remaining);
            }
        }
        pace
    }
}

/// Aggregate over one statistics interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsReport {
    pub fps: f32,
    pub avg_busy: Duration,
    pub overruns: u32,
}

/// Accumulates frame timings and emits a report once per interval.
#[derive(Debug, Clone)]
pub struct FrameStats {
    interval: Duration,
    elapsed: Duration,
    busy: Duration,
    frames: u32,
    overruns: u32,
}

impl FrameStats {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            busy: Duration::ZERO,
            frames: 0,
            overruns: 0,
        }
    }

    /// Records one frame. `frame` is the full tick including pacing, `busy`
    /// the part spent working.
    pub fn record(&mut self, frame: Duration, busy: Duration, overran: bool) -> Option<StatsReport> {
        self.elapsed += frame;
        self.busy += busy;
        self.frames += 1;
        if overran {
            self.overruns += 1;
        }
        if self.elapsed < self.interval {
            return None;
        }

        let report = StatsReport {
            fps: self.frames as f32 / self.elapsed.as_secs_f32(),
            avg_busy: self.busy / self.frames,
            overruns: self.overruns,
        };
        *self = Self::new(self.interval);
        Some(report)
    }
}
