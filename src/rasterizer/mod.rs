//! Software rasterizer
//!
//! Features:
//! - Homogeneous clipping against arbitrary planes
//! - Perspective-correct texture mapping (u/w, v/w, 1/w interpolation)
//! - Reciprocal-depth buffer
//! - Flat shading, wireframe outlines

mod math;
mod render;
mod triangle;
mod types;

pub use math::*;
pub use render::*;
pub use triangle::*;
pub use types::*;
