//! Presentation surface
//!
//! The renderer only ever writes to a [`Framebuffer`]; a canvas decides the
//! framebuffer resolution and puts finished frames on screen.

use macroquad::prelude::*;

use crate::rasterizer::{self as raster, Framebuffer};

pub trait Canvas {
    /// Framebuffer size wanted right now (changes when the window resizes)
    fn resolution(&self) -> (usize, usize);

    /// Prepare for drawing; returns the height / width ratio for the camera
    fn setup(&mut self, background: raster::Color) -> f64;

    /// Start a new frame
    fn clear(&mut self);

    /// Show a finished framebuffer
    fn present(&mut self, fb: &Framebuffer);

    /// Overlay text lines, top to bottom, starting at `(x, y)` window pixels
    fn draw_text_lines(&mut self, lines: &[String], x: f32, y: f32);
}

pub fn aspect_ratio((width, height): (usize, usize)) -> f64 {
    height as f64 / width as f64
}

/// The macroquad window, scaled up from a low-resolution framebuffer
pub struct ScreenCanvas {
    pixel_scale: usize,
    background: Color,
}

impl ScreenCanvas {
    pub fn new(pixel_scale: usize) -> Self {
        Self { pixel_scale: pixel_scale.max(1), background: BLACK }
    }
}

impl Canvas for ScreenCanvas {
    fn resolution(&self) -> (usize, usize) {
        let w = (screen_width() as usize / self.pixel_scale).max(1);
        let h = (screen_height() as usize / self.pixel_scale).max(1);
        (w, h)
    }

    fn setup(&mut self, background: raster::Color) -> f64 {
        self.background = Color::from_rgba(background.r, background.g, background.b, background.a);
        aspect_ratio(self.resolution())
    }

    fn clear(&mut self) {
        clear_background(self.background);
    }

    fn present(&mut self, fb: &Framebuffer) {
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);

        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(screen_width(), screen_height())),
                ..Default::default()
            },
        );
    }

    fn draw_text_lines(&mut self, lines: &[String], x: f32, y: f32) {
        for (i, line) in lines.iter().enumerate() {
            draw_text(line, x, y + 18.0 * (i + 1) as f32, 18.0, WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert!((aspect_ratio((320, 240)) - 0.75).abs() < 1e-12);
    }
}
