//! Framebuffer and triangle rasterization
//!
//! Triangles arrive in normalized device space with their texture `w`
//! holding reciprocal view depth. They are mapped to pixels and filled with
//! a scanline walk: vertices sorted by y, the triangle split at the middle
//! vertex, the long edge (top to bottom) shared by both halves.

use super::math::{TexCoord, Vec3};
use super::triangle::Triangle;
use super::types::{Color, Texture};

/// Software framebuffer with a reciprocal-depth buffer
pub struct Framebuffer {
    pub pixels: Vec<u8>,  // RGBA, 4 bytes per pixel
    pub depth: Vec<f64>,  // 1/view_z, larger is nearer, 0 = empty
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            depth: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Reallocate for a new size; contents are discarded
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            *self = Framebuffer::new(width, height);
        }
    }

    /// Fill with `color` and reset every depth value to 0
    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.depth.fill(0.0);
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    #[cfg(test)]
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        let idx = (y * self.width + x) * 4;
        Color::with_alpha(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    #[cfg(test)]
    pub fn depth_at(&self, x: usize, y: usize) -> f64 {
        self.depth[y * self.width + x]
    }

    /// Number of pixels written through the depth test since the last clear
    #[cfg(test)]
    pub fn covered_pixels(&self) -> usize {
        self.depth.iter().filter(|d| **d > 0.0).count()
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                self.set_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// Map a normalized-space triangle to pixel coordinates:
/// `(ndc + (1, 1, 0)) * (w/2, h/2, 1)`
pub fn ndc_to_screen(tri: &Triangle, width: usize, height: usize) -> Triangle {
    tri.add_vector(Vec3::new(1.0, 1.0, 0.0))
        .mul_vector(Vec3::new(0.5 * width as f64, 0.5 * height as f64, 1.0))
}

/// Per-row delta of a texture coordinate over `rows` rows
fn tex_step(from: TexCoord, to: TexCoord, rows: f64) -> TexCoord {
    TexCoord {
        u: (to.u - from.u) / rows,
        v: (to.v - from.v) / rows,
        w: (to.w - from.w) / rows,
    }
}

fn tex_at(start: TexCoord, step: TexCoord, rows: f64) -> TexCoord {
    TexCoord {
        u: start.u + step.u * rows,
        v: start.v + step.v * rows,
        w: start.w + step.w * rows,
    }
}

/// Fill one row between `ax` and `bx`, depth testing each pixel and
/// asking `fragment` for a color at the perspective-corrected (u, v).
fn fill_span<F>(
    fb: &mut Framebuffer,
    y: i64,
    ax: i64,
    bx: i64,
    ts: TexCoord,
    te: TexCoord,
    fragment: &mut F,
) where
    F: FnMut(f64, f64) -> Color,
{
    let (ax, bx, ts, te) = if ax > bx { (bx, ax, te, ts) } else { (ax, bx, ts, te) };

    if y < 0 || y >= fb.height as i64 {
        return;
    }

    let span = (bx - ax) as f64;
    for x in ax.max(0)..bx.min(fb.width as i64) {
        let t = (x - ax) as f64 / span;
        let tex = ts.lerp(te, t);

        let idx = y as usize * fb.width + x as usize;
        if tex.w > fb.depth[idx] {
            let color = fragment(tex.u / tex.w, tex.v / tex.w);
            fb.set_pixel(x as usize, y as usize, color);
            fb.depth[idx] = tex.w;
        }
    }
}

/// Scanline walk shared by the textured and flat fillers
fn rasterize<F>(fb: &mut Framebuffer, tri: &Triangle, mut fragment: F)
where
    F: FnMut(f64, f64) -> Color,
{
    let screen = ndc_to_screen(tri, fb.width, fb.height);

    let mut verts: [(f64, i64, TexCoord); 3] = [0, 1, 2].map(|i| {
        (screen.p[i].x.round(), screen.p[i].y.round() as i64, screen.t[i])
    });
    verts.sort_by_key(|v| v.1);

    let [(x1, y1, t1), (x2, y2, t2), (x3, y3, t3)] = verts;

    if y1 == y3 {
        return;
    }

    // Long edge y1 -> y3, evaluated from y1 in both halves
    let long_rows = (y3 - y1) as f64;
    let dbx = (x3 - x1) / long_rows;
    let dt_long = tex_step(t1, t3, long_rows);

    if y2 > y1 {
        let rows = (y2 - y1) as f64;
        let dax = (x2 - x1) / rows;
        let dt_short = tex_step(t1, t2, rows);

        for y in y1..=y2 {
            let k = (y - y1) as f64;
            let ax = (x1 + k * dax).round() as i64;
            let bx = (x1 + k * dbx).round() as i64;
            let ts = tex_at(t1, dt_short, k);
            let te = tex_at(t1, dt_long, k);
            fill_span(fb, y, ax, bx, ts, te, &mut fragment);
        }
    }

    if y3 > y2 {
        let rows = (y3 - y2) as f64;
        let dax = (x3 - x2) / rows;
        let dt_short = tex_step(t2, t3, rows);

        for y in y2..=y3 {
            let k_short = (y - y2) as f64;
            let k_long = (y - y1) as f64;
            let ax = (x2 + k_short * dax).round() as i64;
            let bx = (x1 + k_long * dbx).round() as i64;
            let ts = tex_at(t2, dt_short, k_short);
            let te = tex_at(t1, dt_long, k_long);
            fill_span(fb, y, ax, bx, ts, te, &mut fragment);
        }
    }
}

/// Perspective-correct textured fill, modulated by the triangle's luminance
pub fn textured_triangle(fb: &mut Framebuffer, tri: &Triangle, texture: &Texture) {
    let l = tri.l;
    rasterize(fb, tri, |u, v| texture.sample(u, v).shade(l));
}

/// Solid fill with `color` scaled by the triangle's luminance
pub fn filled_triangle(fb: &mut Framebuffer, tri: &Triangle, color: Color) {
    let shaded = color.shade(tri.l);
    rasterize(fb, tri, |_, _| shaded);
}

/// Outline in screen space, no depth test
pub fn wireframe_triangle(fb: &mut Framebuffer, tri: &Triangle, color: Color) {
    let s = ndc_to_screen(tri, fb.width, fb.height);
    for i in 0..3 {
        let a = s.p[i];
        let b = s.p[(i + 1) % 3];
        fb.draw_line(
            a.x.round() as i32,
            a.y.round() as i32,
            b.x.round() as i32,
            b.y.round() as i32,
            color,
        );
    }
}
