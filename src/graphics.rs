use std::time::Duration;

use macroquad::camera::Camera;
use macroquad::texture::RenderPass;
use macroquad::models::{Mesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use terrain_camera::{CameraState, Indicator, depth_cue_alpha};
use terrain_points::VisibleSet;

use crate::config::{RenderConfig, ViewerConfig};

/// Points per mesh. Four vertices and six indices each keeps a batch well
/// inside macroquad's per draw call vertex and index capacity.
pub const POINTS_PER_MESH: usize = 512;

// Function to configure the macroquad window
pub fn window_conf(config: &ViewerConfig) -> Conf {
    Conf {
        window_title: config.window.title.clone(),
        window_width: config.window.width as i32,
        window_height: config.window.height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

/// Perspective camera translated to the camera position, then rotated.
///
/// With zero rotation it sits at `(x, y, z)` looking down -Z with +Y up.
#[derive(Debug, Clone, Copy)]
pub struct SceneCamera {
    view: Mat4,
    projection: Mat4,
}

impl SceneCamera {
    pub fn new(camera: &CameraState, aspect: f32, render: &RenderConfig) -> Self {
        let view = Mat4::from_translation(vec3(-camera.x, -camera.y, -camera.z))
            * Mat4::from_rotation_x(camera.rotation_x.to_radians())
            * Mat4::from_rotation_y(camera.rotation_y.to_radians());
        let projection = Mat4::perspective_rh_gl(
            render.fov_y.to_radians(),
            aspect,
            render.z_near,
            render.z_far,
        );
        Self { view, projection }
    }
}

impl Camera for SceneCamera {
    fn matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    fn depth_enabled(&self) -> bool {
        true
    }

    fn render_pass(&self) -> Option<RenderPass> {
        None
    }

    fn viewport(&self) -> Option<(i32, i32, i32, i32)> {
        None
    }
}

/// World-space edge of a quad covering `point_size` pixels at `distance`.
pub fn point_world_size(point_size: f32, distance: f32, fov_y_deg: f32, screen_height: f32) -> f32 {
    let visible_height = 2.0 * distance * (fov_y_deg.to_radians() / 2.0).tan();
    point_size * visible_height / screen_height
}

/// Packs the visible points into camera-facing quads, one per point.
///
/// Meshes and their buffers are kept between frames and refilled in place.
#[derive(Default)]
pub struct PointBatcher {
    meshes: Vec<Mesh>,
    used: usize,
    points: usize,
}

impl PointBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the batches for `visible`, with quads `size` world units wide.
    pub fn rebuild(&mut self, visible: &VisibleSet, size: f32) {
        let half = size / 2.0;
        self.used = 0;
        self.points = 0;

        for (chunk_points, chunk_colors) in visible
            .points()
            .chunks(POINTS_PER_MESH)
            .zip(visible.colors().chunks(POINTS_PER_MESH))
        {
            if self.used == self.meshes.len() {
                self.meshes.push(Mesh {
                    vertices: Vec::with_capacity(POINTS_PER_MESH * 4),
                    indices: Vec::with_capacity(POINTS_PER_MESH * 6),
                    texture: None,
                });
            }
            let mesh = &mut self.meshes[self.used];
            mesh.vertices.clear();
            mesh.indices.clear();

            for (p, c) in chunk_points.iter().zip(chunk_colors) {
                let color = Color::new(c.r, c.g, c.b, depth_cue_alpha(p.height));
                let base = mesh.vertices.len() as u16;
                mesh.vertices.extend([
                    Vertex::new(p.x - half, p.y - half, p.height, 0.0, 0.0, color),
                    Vertex::new(p.x + half, p.y - half, p.height, 1.0, 0.0, color),
                    Vertex::new(p.x + half, p.y + half, p.height, 1.0, 1.0, color),
                    Vertex::new(p.x - half, p.y + half, p.height, 0.0, 1.0, color),
                ]);
                mesh.indices
                    .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
            }
            self.points += chunk_points.len();
            self.used += 1;
        }
    }

    /// Meshes filled by the last [`PointBatcher::rebuild`].
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes[..self.used]
    }

    /// Point primitives in the current batches.
    pub fn primitive_count(&self) -> usize {
        self.points
    }

    pub fn draw(&self) {
        for mesh in self.meshes() {
            draw_mesh(mesh);
        }
    }
}

/// Single-triangle mesh for the heading indicator.
pub struct IndicatorMesh {
    mesh: Mesh,
}

impl IndicatorMesh {
    pub fn new() -> Self {
        Self {
            mesh: Mesh {
                vertices: Vec::with_capacity(3),
                indices: vec![0, 1, 2],
                texture: None,
            },
        }
    }

    pub fn update(&mut self, indicator: &Indicator) {
        let [r, g, b, a] = indicator.color;
        let color = Color::new(r, g, b, a);
        self.mesh.vertices.clear();
        for [x, y, z] in [indicator.tip, indicator.left, indicator.right] {
            self.mesh.vertices.push(Vertex::new(x, y, z, 0.0, 0.0, color));
        }
    }

    pub fn draw(&self) {
        draw_mesh(&self.mesh);
    }
}

/// Screen-space overlay, drawn after the scene.
pub fn draw_hud(camera: &CameraState, visible: usize, frame_time: Duration) {
    set_default_camera();
    draw_text(&format!("Camera: {}", camera), 10.0, 20.0, 20.0, WHITE);
    draw_text(&format!("Visible points: {}", visible), 10.0, 40.0, 20.0, WHITE);
    draw_text(
        &format!("Frame: {:.2} ms", frame_time.as_secs_f64() * 1000.0),
        10.0,
        60.0,
        20.0,
        WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_points::{Color as PointColor, Point};

    const EPSILON: f32 = 1e-4;

    /// Normalized device coordinates of a world point.
    fn project(scene: &SceneCamera, point: Vec3) -> Vec3 {
        scene.matrix().project_point3(point)
    }

    fn visible_with(n: usize) -> VisibleSet {
        let mut visible = VisibleSet::new();
        for i in 0..n {
            visible.push(
                Point::new(i as f32, -(i as f32), (i % 16) as f32),
                PointColor::new(0.2, 0.4, 0.6),
            );
        }
        visible
    }

    #[test]
    fn test_camera_centers_point_below_it() {
        let camera = CameraState::new(2300.0, -1850.0, 150.0);
        let scene = SceneCamera::new(&camera, 16.0 / 9.0, &RenderConfig::default());

        let center = project(&scene, vec3(2300.0, -1850.0, 0.0));
        assert!(center.x.abs() < EPSILON);
        assert!(center.y.abs() < EPSILON);
        assert!(center.z > -1.0 && center.z < 1.0);

        // +Y is up on screen, +X to the right
        let above = project(&scene, vec3(2300.0, -1840.0, 0.0));
        assert!(above.y > 0.0);
        let right = project(&scene, vec3(2310.0, -1850.0, 0.0));
        assert!(right.x > 0.0);

        // Taller points are closer to the camera
        let low = project(&scene, vec3(2300.0, -1850.0, 0.0));
        let high = project(&scene, vec3(2300.0, -1850.0, 15.0));
        assert!(high.z < low.z);
    }

    #[test]
    fn test_camera_draws_to_screen_with_depth() {
        let scene = SceneCamera::new(&CameraState::default(), 1.0, &RenderConfig::default());
        assert!(scene.depth_enabled());
        assert!(scene.render_pass().is_none());
        assert!(scene.viewport().is_none());
    }

    #[test]
    fn test_camera_far_plane_clips() {
        let camera = CameraState::new(0.0, 0.0, 150.0);
        let scene = SceneCamera::new(&camera, 1.0, &RenderConfig::default());
        // 1150 units away, past the far plane
        let beyond = project(&scene, vec3(0.0, 0.0, -1000.0));
        assert!(beyond.z > 1.0);
    }

    #[test]
    fn test_rotation_is_applied() {
        let mut camera = CameraState::new(0.0, 0.0, 150.0);
        let render = RenderConfig::default();
        let flat = project(&SceneCamera::new(&camera, 1.0, &render), vec3(0.0, 10.0, 0.0));
        camera.rotation_x = 30.0;
        let tilted = project(&SceneCamera::new(&camera, 1.0, &render), vec3(0.0, 10.0, 0.0));
        assert!((flat.y - tilted.y).abs() > EPSILON);
    }

    #[test]
    fn test_point_world_size() {
        // At distance d the view spans 2 d tan(fov / 2) world units vertically
        let size = point_world_size(4.0, 142.5, 50.0, 900.0);
        let expected = 4.0 * 2.0 * 142.5 * 25f32.to_radians().tan() / 900.0;
        assert!((size - expected).abs() < EPSILON);
        assert!(point_world_size(4.0, 300.0, 50.0, 900.0) > size);
    }

    #[test]
    fn test_empty_set_emits_nothing() {
        let mut batcher = PointBatcher::new();
        batcher.rebuild(&VisibleSet::new(), 1.0);
        assert_eq!(batcher.primitive_count(), 0);
        assert!(batcher.meshes().is_empty());
    }

    #[test]
    fn test_batches_split_and_cover_all_points() {
        let visible = visible_with(POINTS_PER_MESH * 2 + 7);
        let mut batcher = PointBatcher::new();
        batcher.rebuild(&visible, 2.0);

        assert_eq!(batcher.primitive_count(), visible.len());
        assert_eq!(batcher.meshes().len(), 3);
        assert_eq!(batcher.meshes()[2].vertices.len(), 7 * 4);
        for mesh in batcher.meshes() {
            assert_eq!(mesh.indices.len() * 4, mesh.vertices.len() * 6);
            assert!(mesh.vertices.len() <= u16::MAX as usize);
            let max_index = mesh.indices.iter().copied().max().unwrap() as usize;
            assert!(max_index < mesh.vertices.len());
        }

        // The first quad surrounds the first point at its height
        let first = &batcher.meshes()[0].vertices[..4];
        for v in first {
            assert!((v.position.x - 0.0).abs() <= 1.0 + EPSILON);
            assert!((v.position.y - 0.0).abs() <= 1.0 + EPSILON);
            assert_eq!(v.position.z, 0.0);
        }
    }

    #[test]
    fn test_batches_are_reused() {
        let mut batcher = PointBatcher::new();
        batcher.rebuild(&visible_with(POINTS_PER_MESH * 3), 1.0);
        assert_eq!(batcher.meshes().len(), 3);

        batcher.rebuild(&visible_with(10), 1.0);
        assert_eq!(batcher.meshes().len(), 1);
        assert_eq!(batcher.primitive_count(), 10);
        assert_eq!(batcher.meshes()[0].vertices.len(), 40);
        // Spare meshes stay allocated for later frames
        assert_eq!(batcher.meshes.len(), 3);
    }
}
