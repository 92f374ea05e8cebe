//! Indexed triangle mesh with cached world-space geometry
//!
//! Model-space data never changes. Every transform rebuilds the world
//! triangles and normals and forgets all cached luminance; luminance is
//! filled in lazily, only for triangles that survive culling.

use crate::error::{EngineError, EngineResult};
use crate::rasterizer::{TexCoord, Triangle, Vec3};
use super::camera::Camera;
use super::transform::{Transform, Transformable};

/// One face: position indices and optional texture indices (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub p: [usize; 3],
    pub t: Option<[usize; 3]>,
}

impl Face {
    pub fn new(p: [usize; 3]) -> Self {
        Self { p, t: None }
    }

    pub fn with_uvs(p: [usize; 3], t: [usize; 3]) -> Self {
        Self { p, t: Some(t) }
    }
}

/// Raw model-space mesh data, as produced by a loader
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub verts: Vec<Vec3>,
    pub uvs: Vec<TexCoord>,
    pub faces: Vec<Face>,
}

impl MeshData {
    /// Unit cube spanning (0,0,0)..(1,1,1), outward-facing clockwise winding
    pub fn unit_cube() -> Self {
        let verts = [
            (0.0, 0.0, 0.0),
            (0.0, 1.0, 0.0),
            (1.0, 1.0, 0.0),
            (1.0, 0.0, 0.0),
            (0.0, 0.0, 1.0),
            (0.0, 1.0, 1.0),
            (1.0, 1.0, 1.0),
            (1.0, 0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z))
        .collect();

        let uvs = vec![
            TexCoord::new(0.0, 1.0),
            TexCoord::new(0.0, 0.0),
            TexCoord::new(1.0, 0.0),
            TexCoord::new(1.0, 1.0),
        ];

        let quads = [
            [0, 1, 2, 3], // south
            [3, 2, 6, 7], // east
            [7, 6, 5, 4], // north
            [4, 5, 1, 0], // west
            [1, 5, 6, 2], // top
            [7, 4, 0, 3], // bottom
        ];
        let faces = quads
            .iter()
            .flat_map(|q| {
                [
                    Face::with_uvs([q[0], q[1], q[2]], [0, 1, 2]),
                    Face::with_uvs([q[0], q[2], q[3]], [0, 2, 3]),
                ]
            })
            .collect();

        Self { verts, uvs, faces }
    }

    /// Every face index must point into `verts` / `uvs`
    pub fn validate(&self) -> EngineResult<()> {
        for (face, f) in self.faces.iter().enumerate() {
            if let Some(&index) = f.p.iter().find(|&&i| i >= self.verts.len()) {
                return Err(EngineError::MeshIndex {
                    face,
                    kind: "vertex",
                    index,
                    len: self.verts.len(),
                });
            }
            if let Some(t) = f.t {
                if let Some(&index) = t.iter().find(|&&i| i >= self.uvs.len()) {
                    return Err(EngineError::MeshIndex {
                        face,
                        kind: "uv",
                        index,
                        len: self.uvs.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

pub struct Mesh {
    transform: Transform,
    data: MeshData,
    /// World-space triangles, one per face
    tris: Vec<Triangle>,
    normals: Vec<Vec3>,
    /// Flat-shading cache; `None` = not yet computed since the last move
    luminance: Vec<Option<f64>>,
    /// Face indices that passed the last culling pass, ascending
    visible: Vec<usize>,
}

impl Mesh {
    pub fn new(data: MeshData) -> EngineResult<Self> {
        data.validate()?;
        let mut mesh = Self {
            transform: Transform::default(),
            data,
            tris: Vec::new(),
            normals: Vec::new(),
            luminance: Vec::new(),
            visible: Vec::new(),
        };
        mesh.recompute();
        Ok(mesh)
    }

    #[cfg(test)]
    pub fn triangles(&self) -> &[Triangle] {
        &self.tris
    }

    #[cfg(test)]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[cfg(test)]
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    #[cfg(test)]
    pub fn luminance(&self, index: usize) -> Option<f64> {
        self.luminance[index]
    }

    pub fn face_count(&self) -> usize {
        self.data.faces.len()
    }

    /// Restrict the visible set to triangles facing `camera`
    pub fn cull(&mut self, camera: &Camera) {
        self.visible = camera
            .back_face_culling(&self.tris, &self.normals)
            .iter()
            .map(|v| v.index)
            .collect();
    }

    /// Mark every triangle visible (culling disabled)
    pub fn show_all(&mut self) {
        self.visible = (0..self.tris.len()).collect();
    }

    /// Fill the luminance cache for visible triangles that lack one:
    /// `max(ambient_floor, light . normal)`
    pub fn illuminate(&mut self, light: Vec3, ambient_floor: f64) {
        for &i in &self.visible {
            if self.luminance[i].is_none() {
                self.luminance[i] = Some(ambient_floor.max(light.dot(self.normals[i])));
            }
        }
    }

    /// Visible triangles in face order, carrying cached luminance when
    /// `shaded` (1.0 otherwise or when not yet lit)
    pub fn visible_triangles(&self, shaded: bool) -> impl Iterator<Item = Triangle> + '_ {
        self.visible.iter().map(move |&i| {
            let l = if shaded { self.luminance[i].unwrap_or(1.0) } else { 1.0 };
            self.tris[i].with_luminance(l)
        })
    }
}

impl Transformable for Mesh {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn recompute(&mut self) {
        self.transform.recompute();
        let world = *self.transform.world();
        let verts: Vec<Vec3> = self.data.verts.iter().map(|v| world.transform(*v)).collect();

        self.tris = self
            .data
            .faces
            .iter()
            .map(|f| {
                let t = match f.t {
                    Some(t) => t.map(|i| self.data.uvs[i]),
                    None => [TexCoord::default(); 3],
                };
                Triangle::new(f.p.map(|i| verts[i]), t)
            })
            .collect();
        self.normals = self.tris.iter().map(Triangle::normal).collect();
        self.luminance = vec![None; self.tris.len()];
        self.visible = (0..self.tris.len()).collect();
    }
}
