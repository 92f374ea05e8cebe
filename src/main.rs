//! Scanline3D: a software 3D renderer
//!
//! Renders a textured, flat-shaded mesh entirely on the CPU:
//! - Back-face culling and per-triangle lighting
//! - Near/far and screen-edge clipping
//! - Perspective-correct texture mapping with a reciprocal depth buffer
//! - Fly camera with mouse look

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod canvas;
mod config;
mod error;
mod input;
mod obj;
mod pipeline;
mod rasterizer;
mod scene;

use macroquad::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};

use app::AppContext;
use canvas::ScreenCanvas;
use config::{load_config, save_config, EngineConfig, DEFAULT_CONFIG_PATH};
use input::InputPoller;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Scanline3D v{}", VERSION),
        window_width: 960,
        window_height: 720,
        window_resizable: true,
        ..Default::default()
    }
}

/// `scanline3d [config.ron]` or `scanline3d --write-config [config.ron]`
fn read_config() -> Option<EngineConfig> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("--write-config") {
        let path = args.get(1).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        match save_config(&EngineConfig::default(), &path) {
            Ok(()) => info!("Wrote default config to {}", path.display()),
            Err(e) => warn!("Failed to write config {}: {}", path.display(), e),
        }
        return None;
    }

    let path = args.first().map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Some(EngineConfig::default());
    }
    match load_config(&path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            warn!("Failed to load config {}: {}, using defaults", path.display(), e);
            Some(EngineConfig::default())
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt::init();

    let Some(config) = read_config() else {
        return;
    };

    let mut canvas = ScreenCanvas::new(config.pixel_scale);
    let mut app = AppContext::new(config, &mut canvas);
    app.load_assets();
    let mut input = InputPoller::new();

    info!("=== Scanline3D v{} === {}x{} framebuffer", VERSION, app.fb.width, app.fb.height);

    loop {
        let elapsed = get_frame_time() as f64;
        let state = input.poll();
        app.frame(&mut canvas, &state, elapsed);
        next_frame().await
    }
}
