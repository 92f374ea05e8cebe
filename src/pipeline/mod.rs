//! Render pipeline
//!
//! A fixed sequence of stage slots folded over a running triangle list each
//! frame. Each slot's behaviour is chosen by an explicit mode enum, so a
//! toggle only ever touches its own slot.
//!
//! Order: cull -> light -> project (view, near/far clip, divide) -> clip the
//! four side planes in normalized space -> draw -> wireframe overlay -> debug.
//! Cull and light work on mesh-owned state and emit nothing; project rebuilds
//! the list from the mesh.

mod stats;

pub use stats::*;

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::rasterizer::{
    filled_triangle, textured_triangle, wireframe_triangle, Color, Framebuffer, Texture, Triangle,
    Vec3,
};
use crate::scene::{Camera, Mesh};

/// Two-state toggle for a stage slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn flip(self) -> Switch {
        match self {
            Switch::On => Switch::Off,
            Switch::Off => Switch::On,
        }
    }

    pub fn is_on(self) -> bool {
        self == Switch::On
    }

    fn label(self) -> &'static str {
        match self {
            Switch::On => "on",
            Switch::Off => "off",
        }
    }
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on { Switch::On } else { Switch::Off }
    }
}

/// What the draw slot does with the clipped triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    /// Perspective-correct texture, shaded by luminance
    Textured,
    /// Solid fill, shaded by luminance
    Filled,
    /// Outlines only
    Wireframe,
    /// Nothing drawn
    Disabled,
}

impl DrawMode {
    /// Textured -> Filled -> Wireframe -> Textured; Disabled re-enters at Textured
    pub fn next(self) -> DrawMode {
        match self {
            DrawMode::Textured => DrawMode::Filled,
            DrawMode::Filled => DrawMode::Wireframe,
            DrawMode::Wireframe | DrawMode::Disabled => DrawMode::Textured,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DrawMode::Textured => "textured",
            DrawMode::Filled => "filled",
            DrawMode::Wireframe => "wireframe",
            DrawMode::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Cull,
    Light,
    Project,
    Clip,
    Draw,
    Wireframe,
    Debug,
}

pub const STAGE_ORDER: [Stage; 7] = [
    Stage::Cull,
    Stage::Light,
    Stage::Project,
    Stage::Clip,
    Stage::Draw,
    Stage::Wireframe,
    Stage::Debug,
];

/// Fixed inputs for the stages
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub background: Color,
    /// Normalised when the pipeline is built
    pub light_direction: Vec3,
    pub ambient_floor: f64,
    pub fill_color: Color,
    pub wire_color: Color,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            background: Color::NAVY,
            light_direction: Vec3::new(0.5, 0.5, -1.0),
            ambient_floor: 0.1,
            fill_color: Color::WHITE,
            wire_color: Color::GREEN,
        }
    }
}

/// Everything a frame reads or writes, borrowed from the application
pub struct Frame<'a> {
    pub camera: &'a Camera,
    pub mesh: Option<&'a mut Mesh>,
    pub texture: Option<&'a Texture>,
    pub fb: &'a mut Framebuffer,
}

pub struct RenderPipeline {
    settings: PipelineSettings,
    cull: Switch,
    shading: Switch,
    draw: DrawMode,
    wireframe: Switch,
    debug: Switch,
    timer: FrameTimer,
    stats: FrameStats,
}

impl RenderPipeline {
    pub fn new(mut settings: PipelineSettings) -> Self {
        settings.light_direction = settings.light_direction.normalize();
        Self {
            settings,
            cull: Switch::On,
            shading: Switch::On,
            draw: DrawMode::Textured,
            wireframe: Switch::Off,
            debug: Switch::On,
            timer: FrameTimer::new(),
            stats: FrameStats::default(),
        }
    }

    #[cfg(test)]
    pub fn draw_mode(&self) -> DrawMode {
        self.draw
    }

    #[cfg(test)]
    pub fn culling(&self) -> Switch {
        self.cull
    }

    #[cfg(test)]
    pub fn shading(&self) -> Switch {
        self.shading
    }

    #[cfg(test)]
    pub fn wireframe(&self) -> Switch {
        self.wireframe
    }

    pub fn debug(&self) -> Switch {
        self.debug
    }

    #[cfg(test)]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        self.draw = mode;
        info!("Draw mode: {}", mode.label());
    }

    pub fn set_debug(&mut self, debug: Switch) {
        self.debug = debug;
    }

    pub fn toggle_texture(&mut self) {
        self.set_draw_mode(self.draw.next());
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = self.wireframe.flip();
        info!("Wireframe overlay: {}", self.wireframe.label());
    }

    pub fn toggle_culling(&mut self) {
        self.cull = self.cull.flip();
        info!("Back-face culling: {}", self.cull.label());
    }

    pub fn toggle_shading(&mut self) {
        self.shading = self.shading.flip();
        info!("Shading: {}", self.shading.label());
    }

    pub fn toggle_debug(&mut self) {
        self.debug = self.debug.flip();
    }

    fn modes(&self) -> String {
        format!(
            "draw {} | cull {} | light {} | wire {}",
            self.draw.label(),
            self.cull.label(),
            self.shading.label(),
            self.wireframe.label()
        )
    }

    /// Clear the framebuffer and fold the triangle list through every stage
    pub fn render(&mut self, elapsed: f64, mut frame: Frame<'_>) -> &FrameStats {
        self.timer.push(elapsed);
        frame.fb.clear(self.settings.background);

        let mut tris = Vec::new();
        for stage in STAGE_ORDER {
            tris = self.run_stage(stage, tris, &mut frame);
        }

        &self.stats
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        tris: Vec<Triangle>,
        frame: &mut Frame<'_>,
    ) -> Vec<Triangle> {
        match stage {
            Stage::Cull => {
                if let Some(mesh) = frame.mesh.as_deref_mut() {
                    match self.cull {
                        Switch::On => mesh.cull(frame.camera),
                        Switch::Off => mesh.show_all(),
                    }
                }
                Vec::new()
            }
            Stage::Light => {
                if let (Switch::On, Some(mesh)) = (self.shading, frame.mesh.as_deref_mut()) {
                    mesh.illuminate(self.settings.light_direction, self.settings.ambient_floor);
                }
                Vec::new()
            }
            Stage::Project => {
                let start = Instant::now();
                let projected = match frame.mesh.as_deref() {
                    Some(mesh) => mesh
                        .visible_triangles(self.shading.is_on())
                        .flat_map(|t| frame.camera.project_2d(&t))
                        .collect(),
                    None => Vec::new(),
                };
                self.stats.projection_ms = start.elapsed().as_secs_f64() * 1000.0;
                projected
            }
            Stage::Clip => {
                let start = Instant::now();
                let clipped: Vec<Triangle> = tris
                    .iter()
                    .flat_map(|t| frame.camera.frustum_clip(t))
                    .collect();
                self.stats.clipping_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.stats.triangles = clipped.len();
                clipped
            }
            Stage::Draw => {
                let start = Instant::now();
                let fb = &mut *frame.fb;
                match self.draw {
                    DrawMode::Textured => {
                        if let Some(texture) = frame.texture {
                            tris.iter().for_each(|t| textured_triangle(fb, t, texture));
                        }
                    }
                    DrawMode::Filled => {
                        tris.iter().for_each(|t| filled_triangle(fb, t, self.settings.fill_color));
                    }
                    DrawMode::Wireframe => {
                        let color = self.settings.wire_color;
                        tris.iter().for_each(|t| wireframe_triangle(fb, t, color));
                    }
                    DrawMode::Disabled => {}
                }
                self.stats.draw_ms = start.elapsed().as_secs_f64() * 1000.0;
                tris
            }
            Stage::Wireframe => {
                if self.wireframe.is_on() && self.draw != DrawMode::Wireframe {
                    let fb = &mut *frame.fb;
                    tris.iter().for_each(|t| wireframe_triangle(fb, t, self.settings.wire_color));
                }
                tris
            }
            Stage::Debug => {
                if self.debug.is_on() {
                    self.stats.fps = self.timer.fps();
                    self.stats.modes = self.modes();
                }
                tris
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::TexCoord;
    use crate::scene::{Face, MeshData, Transformable};

    const SIZE: usize = 64;

    fn camera() -> Camera {
        Camera::new(1.0, 90.0, 0.1, 1000.0)
    }

    fn cube() -> Mesh {
        let mut mesh = Mesh::new(MeshData::unit_cube()).unwrap();
        mesh.translate(Vec3::new(-0.5, -0.5, 3.0));
        mesh
    }

    fn checker() -> Texture {
        Texture::checkerboard(8, 8, 2, Color::WHITE, Color::new(255, 0, 0))
    }

    fn render(
        pipeline: &mut RenderPipeline,
        cam: &Camera,
        mesh: Option<&mut Mesh>,
        tex: Option<&Texture>,
        fb: &mut Framebuffer,
    ) -> FrameStats {
        pipeline
            .render(1.0 / 60.0, Frame { camera: cam, mesh, texture: tex, fb })
            .clone()
    }

    #[test]
    fn test_cube_renders_textured() {
        let cam = camera();
        let mut mesh = cube();
        let tex = checker();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());

        let stats = render(&mut pipeline, &cam, Some(&mut mesh), Some(&tex), &mut fb);

        // Camera looks straight at the south face only
        assert_eq!(mesh.visible().len(), 2);
        assert_eq!(stats.triangles, 2);
        assert!(fb.covered_pixels() > 0);
        // Centre of the screen is covered by the cube
        assert!(fb.depth_at(SIZE / 2, SIZE / 2) > 0.0);
        assert_ne!(fb.get_pixel(SIZE / 2, SIZE / 2), Color::NAVY);
        // Corners are background
        assert_eq!(fb.get_pixel(0, 0), Color::NAVY);
    }

    #[test]
    fn test_cube_offset_shows_three_faces() {
        let cam = camera();
        let mut mesh = Mesh::new(MeshData::unit_cube()).unwrap();
        mesh.translate(Vec3::new(1.0, 1.0, 5.0));
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        pipeline.set_draw_mode(DrawMode::Filled);

        render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);

        assert_eq!(mesh.visible().len(), 6);
        for &i in mesh.visible() {
            assert!(mesh.luminance(i).unwrap() >= 0.1);
        }
        assert!(fb.covered_pixels() > 0);
    }

    #[test]
    fn test_behind_near_plane_draws_nothing() {
        let cam = camera();
        let data = MeshData {
            verts: vec![
                Vec3::new(-1.0, -1.0, -2.0),
                Vec3::new(-1.0, 1.0, 0.05),
                Vec3::new(1.0, 1.0, -0.5),
            ],
            uvs: vec![],
            faces: vec![Face::new([0, 1, 2]), Face::new([0, 2, 1])],
        };
        let mut mesh = Mesh::new(data).unwrap();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        pipeline.toggle_culling();
        pipeline.set_draw_mode(DrawMode::Filled);

        let stats = render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);

        assert_eq!(mesh.visible().len(), 2);
        assert_eq!(stats.triangles, 0);
        assert_eq!(fb.covered_pixels(), 0);
        assert!(fb.pixels.chunks_exact(4).all(|p| p == Color::NAVY.to_bytes()));
    }

    #[test]
    fn test_no_mesh_is_empty_frame() {
        let cam = camera();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        let stats = render(&mut pipeline, &cam, None, None, &mut fb);
        assert_eq!(stats.triangles, 0);
        assert_eq!(fb.covered_pixels(), 0);
    }

    #[test]
    fn test_textured_without_texture_skips_draw() {
        let cam = camera();
        let mut mesh = cube();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        let stats = render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);
        assert_eq!(stats.triangles, 2);
        assert_eq!(fb.covered_pixels(), 0);
    }

    #[test]
    fn test_culling_off_projects_everything() {
        let cam = camera();
        let mut mesh = cube();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        pipeline.toggle_culling();
        let stats = render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);
        assert_eq!(mesh.visible().len(), 12);
        assert!(stats.triangles >= 10);

        pipeline.toggle_culling();
        let stats = render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);
        assert_eq!(mesh.visible().len(), 2);
        assert_eq!(stats.triangles, 2);
    }

    #[test]
    fn test_shading_toggle_changes_brightness() {
        let cam = camera();
        let mut mesh = cube();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        pipeline.set_draw_mode(DrawMode::Filled);

        render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);
        let lit = fb.get_pixel(SIZE / 2, SIZE / 2);
        // South face: light . (0,0,-1) = 1/sqrt(1.5)
        let expected = Color::WHITE.shade(1.0 / 1.5f64.sqrt());
        assert_eq!(lit, expected);

        pipeline.toggle_shading();
        render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);
        assert_eq!(fb.get_pixel(SIZE / 2, SIZE / 2), Color::WHITE);
    }

    #[test]
    fn test_draw_modes() {
        let cam = camera();
        let mut mesh = cube();
        let tex = checker();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());

        pipeline.set_draw_mode(DrawMode::Wireframe);
        render(&mut pipeline, &cam, Some(&mut mesh), Some(&tex), &mut fb);
        assert_eq!(fb.covered_pixels(), 0);
        assert!(fb.pixels.chunks_exact(4).any(|p| p == Color::GREEN.to_bytes()));

        pipeline.set_draw_mode(DrawMode::Disabled);
        let stats = render(&mut pipeline, &cam, Some(&mut mesh), Some(&tex), &mut fb);
        assert_eq!(stats.triangles, 2);
        assert!(fb.pixels.chunks_exact(4).all(|p| p == Color::NAVY.to_bytes()));
    }

    #[test]
    fn test_wireframe_overlay_on_fill() {
        let cam = camera();
        let mut mesh = cube();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        pipeline.set_draw_mode(DrawMode::Filled);
        pipeline.toggle_wireframe();
        render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);
        assert!(fb.covered_pixels() > 0);
        assert!(fb.pixels.chunks_exact(4).any(|p| p == Color::GREEN.to_bytes()));
    }

    #[test]
    fn test_toggles_are_independent_and_reversible() {
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        assert_eq!(pipeline.draw_mode(), DrawMode::Textured);

        pipeline.toggle_texture();
        assert_eq!(pipeline.draw_mode(), DrawMode::Filled);
        pipeline.toggle_texture();
        assert_eq!(pipeline.draw_mode(), DrawMode::Wireframe);
        pipeline.toggle_texture();
        assert_eq!(pipeline.draw_mode(), DrawMode::Textured);

        pipeline.toggle_wireframe();
        pipeline.toggle_wireframe();
        assert_eq!(pipeline.wireframe(), Switch::Off);

        pipeline.toggle_culling();
        assert_eq!(pipeline.culling(), Switch::Off);
        assert_eq!(pipeline.shading(), Switch::On);
        assert_eq!(pipeline.draw_mode(), DrawMode::Textured);
        assert_eq!(pipeline.wireframe(), Switch::Off);

        pipeline.toggle_shading();
        pipeline.toggle_shading();
        assert_eq!(pipeline.shading(), Switch::On);
        assert_eq!(pipeline.culling(), Switch::Off);

        pipeline.set_draw_mode(DrawMode::Disabled);
        pipeline.toggle_texture();
        assert_eq!(pipeline.draw_mode(), DrawMode::Textured);
    }

    #[test]
    fn test_debug_stats() {
        let cam = camera();
        let mut mesh = cube();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        let stats = render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);
        assert!((stats.fps - 60.0).abs() < 1e-6);
        assert!(stats.modes.contains("draw textured"));
    }

    #[test]
    fn test_clipped_at_screen_edge() {
        // A triangle far larger than the view is cut at the side planes
        let cam = camera();
        let data = MeshData {
            verts: vec![
                Vec3::new(-20.0, -20.0, 4.0),
                Vec3::new(-20.0, 20.0, 4.0),
                Vec3::new(20.0, 20.0, 4.0),
            ],
            uvs: vec![TexCoord::new(0.0, 0.0)],
            faces: vec![Face::with_uvs([0, 1, 2], [0, 0, 0])],
        };
        let mut mesh = Mesh::new(data).unwrap();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let mut pipeline = RenderPipeline::new(PipelineSettings::default());
        pipeline.set_draw_mode(DrawMode::Filled);
        let stats = render(&mut pipeline, &cam, Some(&mut mesh), None, &mut fb);
        assert!(stats.triangles >= 1);
        // Half the screen, cut along the diagonal
        assert!(fb.covered_pixels() > SIZE * SIZE / 4);
        assert!(fb.covered_pixels() < SIZE * SIZE);
    }
}
