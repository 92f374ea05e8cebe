//! Application context
//!
//! Owns everything a frame touches: camera, mesh, texture, pipeline and
//! framebuffer. The main loop hands it a canvas and an input snapshot once
//! per frame; nothing lives in globals.

use std::f64::consts::PI;
use tracing::{info, warn};

use crate::canvas::{aspect_ratio, Canvas};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::input::{Controls, InputState, Toggle, HELP_LINES};
use crate::obj::load_obj;
use crate::pipeline::{Frame, RenderPipeline, Switch};
use crate::rasterizer::{Color, Framebuffer, Texture};
use crate::scene::{Camera, Mesh, MeshData, Transformable};

pub struct AppContext {
    pub config: EngineConfig,
    pub camera: Camera,
    /// `None` renders empty frames
    pub mesh: Option<Mesh>,
    pub texture: Option<Texture>,
    pub pipeline: RenderPipeline,
    pub fb: Framebuffer,
    controls: Controls,
    show_help: bool,
}

impl AppContext {
    /// Empty scene; sets up `canvas` and sizes the framebuffer and camera
    /// to match it
    pub fn new<C: Canvas>(config: EngineConfig, canvas: &mut C) -> Self {
        let aspect = canvas.setup(config.background);
        let (width, height) = canvas.resolution();
        let camera = Camera::new(aspect, config.fov_degrees, config.near, config.far);
        let mut pipeline = RenderPipeline::new(config.pipeline_settings());
        pipeline.set_draw_mode(config.draw_mode);
        pipeline.set_debug(Switch::from(config.show_debug));

        Self {
            controls: config.controls(),
            camera,
            mesh: None,
            texture: None,
            pipeline,
            fb: Framebuffer::new(width, height),
            show_help: false,
            config,
        }
    }

    /// Load the configured mesh and texture, falling back to a unit cube and
    /// a checkerboard when a path is missing or fails to load.
    pub fn load_assets(&mut self) {
        let data = match &self.config.mesh_path {
            Some(path) => match load_obj(path) {
                Ok(data) => data,
                Err(e) => {
                    warn!("Failed to load mesh {}: {}, using cube", path.display(), e);
                    MeshData::unit_cube()
                }
            },
            None => MeshData::unit_cube(),
        };
        if let Err(e) = self.set_mesh(data) {
            warn!("Invalid mesh: {}, using cube", e);
            if let Err(e) = self.set_mesh(MeshData::unit_cube()) {
                warn!("Built-in cube rejected: {}", e);
            }
        }

        let texture = match &self.config.texture_path {
            Some(path) => Texture::from_file(path).unwrap_or_else(|e| {
                warn!("Failed to load texture {}: {}, using checkerboard", path.display(), e);
                default_texture()
            }),
            None => default_texture(),
        };
        info!("Texture '{}': {}x{}", texture.name, texture.width, texture.height);
        self.texture = Some(texture);
    }

    /// Build a mesh and place it at the configured offset and rotation
    pub fn set_mesh(&mut self, data: MeshData) -> EngineResult<()> {
        let mut mesh = Mesh::new(data)?;
        let rot = self.config.mesh_rotation;
        mesh.translate(self.config.mesh_offset);
        mesh.rotate_x(rot.x);
        mesh.rotate_y(rot.y);
        mesh.rotate_z(rot.z);
        info!("Mesh loaded: {} triangles", mesh.face_count());
        self.mesh = Some(mesh);
        Ok(())
    }

    /// Reallocate the framebuffer and rebuild the projection
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.fb.width, self.fb.height) {
            return;
        }
        info!("Resize to {}x{}", width, height);
        self.fb.resize(width, height);
        self.camera.resize(aspect_ratio((width, height)));
    }

    /// One frame: input, animation, render, present
    pub fn frame<C: Canvas>(&mut self, canvas: &mut C, input: &InputState, elapsed: f64) {
        let (width, height) = canvas.resolution();
        self.resize(width, height);

        let extra = self
            .controls
            .apply(input, &mut self.camera, &mut self.pipeline, elapsed);
        if extra.contains(&Toggle::Help) {
            self.show_help = !self.show_help;
        }

        if let Some(mesh) = self.mesh.as_mut() {
            mesh.rotate_y(elapsed * PI * self.config.spin_speed);
        }

        let stats = self.pipeline.render(
            elapsed,
            Frame {
                camera: &self.camera,
                mesh: self.mesh.as_mut(),
                texture: self.texture.as_ref(),
                fb: &mut self.fb,
            },
        );
        let lines = stats.lines();

        canvas.clear();
        canvas.present(&self.fb);
        if self.pipeline.debug().is_on() {
            canvas.draw_text_lines(&lines, 8.0, 0.0);
        }
        if self.show_help {
            let help: Vec<String> = HELP_LINES.iter().map(|s| s.to_string()).collect();
            canvas.draw_text_lines(&help, 8.0, 140.0);
        }
    }
}

fn default_texture() -> Texture {
    Texture::checkerboard(64, 64, 8, Color::WHITE, Color::new(0x80, 0x80, 0x80))
}
