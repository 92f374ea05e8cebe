//! Engine configuration
//!
//! Uses RON for a human-editable settings file. Every field has a default,
//! so a partial file (or none at all) is fine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineResult;
use crate::input::Controls;
use crate::pipeline::{DrawMode, PipelineSettings};
use crate::rasterizer::{Color, Vec3};

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "scanline3d.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
    /// Window pixels per framebuffer pixel
    pub pixel_scale: usize,
    pub background: Color,
    pub light_direction: Vec3,
    pub ambient_floor: f64,
    pub move_speed: f64,
    pub turn_speed: f64,
    pub mouse_sensitivity: f64,
    /// Mesh yaw per second, in multiples of pi
    pub spin_speed: f64,
    pub mesh_path: Option<PathBuf>,
    pub texture_path: Option<PathBuf>,
    pub mesh_offset: Vec3,
    pub mesh_rotation: Vec3,
    pub draw_mode: DrawMode,
    pub show_debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
            pixel_scale: 2,
            background: Color::NAVY,
            light_direction: Vec3::new(0.5, 0.5, -1.0),
            ambient_floor: 0.1,
            move_speed: 8.0,
            turn_speed: 2.0,
            mouse_sensitivity: 0.001,
            spin_speed: 0.1,
            mesh_path: None,
            texture_path: None,
            mesh_offset: Vec3::new(-0.5, -0.5, 8.0),
            mesh_rotation: Vec3::new(0.0, 0.1, 0.3),
            draw_mode: DrawMode::Textured,
            show_debug: true,
        }
    }
}

impl EngineConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            background: self.background,
            light_direction: self.light_direction,
            ambient_floor: self.ambient_floor,
            ..Default::default()
        }
    }

    pub fn controls(&self) -> Controls {
        Controls {
            move_speed: self.move_speed,
            turn_speed: self.turn_speed,
            mouse_sensitivity: self.mouse_sensitivity,
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> EngineResult<EngineConfig> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Parse a config from a RON string
pub fn load_config_from_str(s: &str) -> EngineResult<EngineConfig> {
    Ok(ron::from_str(s)?)
}

/// Save a config as pretty RON
pub fn save_config<P: AsRef<Path>>(config: &EngineConfig, path: P) -> EngineResult<()> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}
