//! Color and texture types

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, EngineResult};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const NAVY: Color = Color { r: 0x11, g: 0x22, b: 0x44, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply RGB by a luminance factor; alpha is untouched
    pub fn shade(self, intensity: f64) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f64 * i) as u8,
            g: (self.g as f64 * i) as u8,
            b: (self.b as f64 * i) as u8,
            a: self.a,
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Immutable texture: width x height colors, row-major
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    /// Load texture from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_image(img, name)
    }

    /// Load texture from encoded image bytes
    #[cfg(test)]
    pub fn from_bytes(bytes: &[u8], name: String) -> EngineResult<Self> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(img, name)
    }

    fn from_image(img: image::DynamicImage, name: String) -> EngineResult<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(EngineError::EmptyTexture(name));
        }

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Checkerboard with square cells of `cell` texels
    pub fn checkerboard(
        width: usize,
        height: usize,
        cell: usize,
        color1: Color,
        color2: Color,
    ) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Nearest-neighbour lookup at normalised (u, v).
    ///
    /// Coordinates are truncated toward zero, so values a hair below 0 land
    /// on texel 0; anything past the edge is clamped to the last texel.
    pub fn sample(&self, u: f64, v: f64) -> Color {
        let col = ((u * self.width as f64) as i64).clamp(0, self.width as i64 - 1) as usize;
        let row = ((v * self.height as f64) as i64).clamp(0, self.height as i64 - 1) as usize;
        self.pixels[col + self.width * row]
    }

    #[cfg(test)]
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }
}
