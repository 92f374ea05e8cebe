//! Triangle primitive and plane clipping
//!
//! Positions and texture coordinates are fixed-size arrays kept in lockstep:
//! `t[i]` always belongs to `p[i]`. Both are `Copy`, so every triangle
//! produced here owns its coordinates outright.

use super::math::{intersect_plane, Matrix4, TexCoord, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p: [Vec3; 3],
    pub t: [TexCoord; 3],
    /// Flat shading factor in [0, 1]
    pub l: f64,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            p: [Vec3::ZERO; 3],
            t: [TexCoord::default(); 3],
            l: 1.0,
        }
    }
}

impl Triangle {
    pub fn new(p: [Vec3; 3], t: [TexCoord; 3]) -> Self {
        Self { p, t, l: 1.0 }
    }

    pub fn with_luminance(mut self, l: f64) -> Self {
        self.l = l;
        self
    }

    fn map_positions(&self, f: impl Fn(Vec3) -> Vec3) -> Triangle {
        Triangle {
            p: [f(self.p[0]), f(self.p[1]), f(self.p[2])],
            t: self.t,
            l: self.l,
        }
    }

    pub fn add_vector(&self, v: Vec3) -> Triangle {
        self.map_positions(|p| p + v)
    }

    pub fn mul_vector(&self, v: Vec3) -> Triangle {
        self.map_positions(|p| p.mul_elem(v))
    }

    pub fn transform(&self, m: &Matrix4) -> Triangle {
        self.map_positions(|p| m.transform(p))
    }

    /// Face normal from `(p1 - p0) x (p2 - p1)`
    pub fn normal(&self) -> Vec3 {
        let a = self.p[1] - self.p[0];
        let b = self.p[2] - self.p[1];
        a.cross(b).normalize()
    }

    /// Clip against the plane through `point` with unit `normal`; the
    /// half-space the normal points into is kept.
    ///
    /// Returns zero, one or two triangles. New vertices get texture
    /// coordinates interpolated inside -> outside with the same `t` as the
    /// position intersection.
    pub fn clip_against_plane(&self, point: Vec3, normal: Vec3) -> Vec<Triangle> {
        let dist = |p: Vec3| normal.dot(p) - normal.dot(point);

        let mut inside: Vec<(Vec3, TexCoord)> = Vec::with_capacity(3);
        let mut outside: Vec<(Vec3, TexCoord)> = Vec::with_capacity(3);

        for i in 0..3 {
            if dist(self.p[i]) >= 0.0 {
                inside.push((self.p[i], self.t[i]));
            } else {
                outside.push((self.p[i], self.t[i]));
            }
        }

        let cut = |(ip, it): (Vec3, TexCoord), (op, ot): (Vec3, TexCoord)| {
            let (p, t) = intersect_plane(point, normal, ip, op);
            (p, it.lerp(ot, t))
        };

        match inside.len() {
            3 => vec![*self],
            1 => {
                let (p1, t1) = cut(inside[0], outside[0]);
                let (p2, t2) = cut(inside[0], outside[1]);
                vec![Triangle {
                    p: [inside[0].0, p1, p2],
                    t: [inside[0].1, t1, t2],
                    l: self.l,
                }]
            }
            2 => {
                let (p1, t1) = cut(inside[0], outside[0]);
                let (p2, t2) = cut(inside[1], outside[0]);
                vec![
                    Triangle {
                        p: [inside[0].0, inside[1].0, p1],
                        t: [inside[0].1, inside[1].1, t1],
                        l: self.l,
                    },
                    Triangle {
                        p: [inside[1].0, p1, p2],
                        t: [inside[1].1, t1, t2],
                        l: self.l,
                    },
                ]
            }
            _ => Vec::new(),
        }
    }
}

/// Clip every triangle in `tris` against one plane
pub fn clip_all(tris: Vec<Triangle>, point: Vec3, normal: Vec3) -> Vec<Triangle> {
    tris.iter()
        .flat_map(|tri| tri.clip_against_plane(point, normal))
        .collect()
}
