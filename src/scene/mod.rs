//! Scene objects: transform component, camera, mesh

mod camera;
mod mesh;
mod transform;

pub use camera::*;
pub use mesh::*;
pub use transform::*;
