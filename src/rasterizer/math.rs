//! Vector and matrix math for the geometry pipeline
//!
//! Row-vector convention throughout: a point is transformed as `v * M`,
//! so translation lives in the bottom row of a [`Matrix4`].

use std::ops::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};

/// Homogeneous 3D vector
///
/// Component-wise arithmetic always yields `w = 1`; only matrix
/// multiplication produces a meaningful `w` (used for the perspective divide).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default = "one")]
    pub w: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3::ZERO
    }
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0, w: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn len(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Divide by Euclidean length.
    ///
    /// A zero-length input yields NaN components; callers must not pass one.
    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        Vec3::new(self.x / l, self.y / l, self.z / l)
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    /// Component-wise product
    pub fn mul_elem(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    pub fn invert(self) -> Vec3 {
        self.scale(-1.0)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        self.scale(s)
    }
}

/// Texture coordinate with a perspective channel
///
/// Before projection `w` is 1. After the perspective divide `u`, `v` and `w`
/// have all been multiplied by `1/w_clip`, so `u / w` recovers the real
/// coordinate at any linearly interpolated point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TexCoord {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Default for TexCoord {
    fn default() -> Self {
        Self { u: 0.0, v: 0.0, w: 1.0 }
    }
}

impl TexCoord {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v, w: 1.0 }
    }

    /// `self + t * (end - self)` on all three channels
    pub fn lerp(self, end: TexCoord, t: f64) -> TexCoord {
        TexCoord {
            u: t * (end.u - self.u) + self.u,
            v: t * (end.v - self.v) + self.v,
            w: t * (end.w - self.w) + self.w,
        }
    }

    pub fn scale(self, s: f64) -> TexCoord {
        TexCoord { u: self.u * s, v: self.v * s, w: self.w * s }
    }
}

/// Intersection of the segment `start..end` with the plane through `point`
/// with unit `normal`. Returns the point and the parameter `t` along the
/// segment, which callers reuse to interpolate vertex attributes.
pub fn intersect_plane(point: Vec3, normal: Vec3, start: Vec3, end: Vec3) -> (Vec3, f64) {
    let plane_d = -point.dot(normal);
    let ad = start.dot(normal);
    let bd = end.dot(normal);
    let t = (-plane_d - ad) / (bd - ad);
    (start + (end - start) * t, t)
}

/// 4x4 row-major matrix
///
/// Only built through the named constructors below so the row-vector
/// convention stays consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub m: [[f64; 4]; 4],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Matrix4::identity()
    }
}

impl Matrix4 {
    pub fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.m[1][1] = c;
        r.m[1][2] = s;
        r.m[2][1] = -s;
        r.m[2][2] = c;
        r
    }

    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.m[0][0] = c;
        r.m[0][2] = s;
        r.m[2][0] = -s;
        r.m[2][2] = c;
        r
    }

    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.m[0][0] = c;
        r.m[0][1] = s;
        r.m[1][0] = -s;
        r.m[1][1] = c;
        r
    }

    pub fn translation(v: Vec3) -> Self {
        let mut r = Self::identity();
        r.m[3][0] = v.x;
        r.m[3][1] = v.y;
        r.m[3][2] = v.z;
        r
    }

    /// Perspective projection mapping view z in `[near, far]` to `[0, 1]`
    /// and copying view z into the output `w`.
    ///
    /// `aspect_ratio` is height / width.
    pub fn projection(fov_degrees: f64, aspect_ratio: f64, near: f64, far: f64) -> Self {
        let fov_rad = 1.0 / (fov_degrees * 0.5 / 180.0 * std::f64::consts::PI).tan();
        Self {
            m: [
                [aspect_ratio * fov_rad, 0.0, 0.0, 0.0],
                [0.0, fov_rad, 0.0, 0.0],
                [0.0, 0.0, far / (far - near), 1.0],
                [0.0, 0.0, (-far * near) / (far - near), 0.0],
            ],
        }
    }

    /// `self * other`: apply `self` first, then `other`
    pub fn multiply(&self, other: &Matrix4) -> Matrix4 {
        let mut r = Matrix4 { m: [[0.0; 4]; 4] };
        for row in 0..4 {
            for col in 0..4 {
                r.m[row][col] = self.m[row][0] * other.m[0][col]
                    + self.m[row][1] * other.m[1][col]
                    + self.m[row][2] * other.m[2][col]
                    + self.m[row][3] * other.m[3][col];
            }
        }
        r
    }

    /// `v * self`, keeping the computed `w`
    pub fn transform(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3 {
            x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
            y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
            z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
            w: v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
        }
    }

    /// Camera-to-world matrix placed at `pos`, facing `target`.
    /// `up` is re-orthogonalised against the forward axis so pitch works.
    pub fn point_at(pos: Vec3, target: Vec3, up: Vec3) -> Matrix4 {
        let forward = (target - pos).normalize();
        let a = forward * up.dot(forward);
        let new_up = (up - a).normalize();
        let right = forward.cross(new_up);

        Matrix4 {
            m: [
                [right.x, right.y, right.z, 0.0],
                [new_up.x, new_up.y, new_up.z, 0.0],
                [forward.x, forward.y, forward.z, 0.0],
                [pos.x, pos.y, pos.z, 1.0],
            ],
        }
    }

    /// Inverse of a rotation + translation matrix.
    ///
    /// Only valid for rigid transforms; any scale or projection term makes
    /// the result wrong.
    pub fn quick_inverse(&self) -> Matrix4 {
        let row = |i: usize| Vec3::new(self.m[i][0], self.m[i][1], self.m[i][2]);
        let (a, b, c, t) = (row(0), row(1), row(2), row(3));
        Matrix4 {
            m: [
                [a.x, b.x, c.x, 0.0],
                [a.y, b.y, c.y, 0.0],
                [a.z, b.z, c.z, 0.0],
                [-t.dot(a), -t.dot(b), -t.dot(c), 1.0],
            ],
        }
    }
}
