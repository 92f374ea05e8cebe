//! Camera: view/projection matrices, culling and clipping
//!
//! View space looks down +z. After projection and the perspective divide
//! x and y are negated so +x is right and +y is down on screen.

use crate::rasterizer::{clip_all, Matrix4, Triangle, Vec3};
use super::transform::{Transform, Transformable};

/// Pitch limit, just short of straight up/down
const PITCH_LIMIT: f64 = std::f64::consts::PI / 2.1;

/// A clipping plane: a point on it and the unit normal pointing inside
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub const fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    pub fn clip(&self, tris: Vec<Triangle>) -> Vec<Triangle> {
        clip_all(tris, self.point, self.normal)
    }
}

const fn v(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3 { x, y, z, w: 1.0 }
}

/// Side planes of normalized device space, in clip order: top, bottom, left, right
pub const FRUSTUM_SIDES: [Plane; 4] = [
    Plane::new(v(0.0, 1.0, 0.0), v(0.0, -1.0, 0.0)),
    Plane::new(v(0.0, -1.0, 0.0), v(0.0, 1.0, 0.0)),
    Plane::new(v(-1.0, 0.0, 0.0), v(1.0, 0.0, 0.0)),
    Plane::new(v(1.0, 0.0, 0.0), v(-1.0, 0.0, 0.0)),
];

/// A triangle that survived back-face culling, tagged with its mesh index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visible {
    pub index: usize,
    pub facing: f64,
}

pub struct Camera {
    transform: Transform,
    /// height / width
    aspect_ratio: f64,
    fov_degrees: f64,
    near: Plane,
    far: Plane,
    projection: Matrix4,
    view: Matrix4,
}

impl Camera {
    pub fn new(aspect_ratio: f64, fov_degrees: f64, clip_near: f64, clip_far: f64) -> Self {
        let mut cam = Self {
            transform: Transform::default(),
            aspect_ratio,
            fov_degrees,
            near: Plane::new(Vec3::new(0.0, 0.0, clip_near), Vec3::new(0.0, 0.0, 1.0)),
            far: Plane::new(Vec3::new(0.0, 0.0, clip_far), Vec3::new(0.0, 0.0, -1.0)),
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
        };
        cam.resize(aspect_ratio);
        cam.recompute();
        cam
    }

    /// Rebuild the projection for a new height / width ratio
    pub fn resize(&mut self, aspect_ratio: f64) {
        self.aspect_ratio = aspect_ratio;
        self.projection = Matrix4::projection(
            self.fov_degrees,
            self.aspect_ratio,
            self.near.point.z,
            self.far.point.z,
        );
    }

    #[cfg(test)]
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    #[cfg(test)]
    pub fn view(&self) -> &Matrix4 {
        &self.view
    }

    #[cfg(test)]
    pub fn projection(&self) -> &Matrix4 {
        &self.projection
    }

    /// Forward direction rotated by yaw only, for ground-plane movement
    pub fn horizontal_look_direction(&self) -> Vec3 {
        Matrix4::rotation_y(self.transform.rotation.y).transform(self.near.normal)
    }

    /// Keep triangles whose normal faces the camera (dot < 0), in order
    pub fn back_face_culling(&self, tris: &[Triangle], normals: &[Vec3]) -> Vec<Visible> {
        let pos = self.transform.position;
        tris.iter()
            .zip(normals)
            .enumerate()
            .map(|(index, (tri, normal))| Visible {
                index,
                facing: normal.dot((tri.p[0] - pos).normalize()),
            })
            .filter(|v| v.facing < 0.0)
            .collect()
    }

    /// World space -> normalized device space.
    ///
    /// Clips against the near and far planes in view space, projects, then
    /// divides by w. Texture coordinates are scaled by the same 1/w so the
    /// rasterizer can interpolate them linearly in screen space.
    pub fn project_2d(&self, tri: &Triangle) -> Vec<Triangle> {
        let viewed = tri.transform(&self.view);
        let clipped = self.far.clip(self.near.clip(vec![viewed]));

        clipped
            .iter()
            .map(|clipped| {
                let mut projected = clipped.transform(&self.projection);
                for i in 0..3 {
                    let inv_w = 1.0 / projected.p[i].w;
                    let p = projected.p[i] * inv_w;
                    // Screen convention: flip both axes
                    projected.p[i] = Vec3::new(-p.x, -p.y, p.z);
                    projected.t[i] = projected.t[i].scale(inv_w);
                }
                projected
            })
            .collect()
    }

    /// Clip against the four side planes of normalized device space
    pub fn frustum_clip(&self, tri: &Triangle) -> Vec<Triangle> {
        FRUSTUM_SIDES
            .iter()
            .fold(vec![*tri], |tris, plane| plane.clip(tris))
    }
}

impl Transformable for Camera {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Look from the camera position toward the near-plane normal pushed
    /// through the camera's own world matrix; the view is the inverse.
    fn recompute(&mut self) {
        self.transform.recompute();
        let target = self.transform.world().transform(self.near.normal);
        let camera = Matrix4::point_at(self.transform.position, target, Vec3::UP);
        self.view = camera.quick_inverse();
    }

    fn rotate_x(&mut self, rad: f64) {
        let rot = &mut self.transform_mut().rotation;
        rot.x = (rot.x + rad % std::f64::consts::PI).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::TexCoord;

    fn camera() -> Camera {
        Camera::new(1.0, 90.0, 0.1, 1000.0)
    }

    fn tri(pts: [(f64, f64, f64); 3]) -> Triangle {
        Triangle::new(
            pts.map(|(x, y, z)| Vec3::new(x, y, z)),
            [TexCoord::new(0.0, 0.0), TexCoord::new(1.0, 0.0), TexCoord::new(0.0, 1.0)],
        )
    }

    #[test]
    fn test_default_view_is_identity() {
        let cam = camera();
        let p = cam.view().transform(Vec3::new(1.0, 2.0, 3.0));
        // right = forward x up = -x, undone later by the axis flip
        assert!((p.x + 1.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
        assert!((p.z - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_view_follows_translation() {
        let mut cam = camera();
        cam.translate(Vec3::new(0.0, 0.0, -2.0));
        let p = cam.view().transform(Vec3::new(0.0, 0.0, 3.0));
        assert!((p.z - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut cam = camera();
        for _ in 0..10 {
            cam.rotate_x(1.0);
        }
        assert!((cam.rotation().x - PITCH_LIMIT).abs() < 1e-12);
        for _ in 0..20 {
            cam.rotate_x(-1.0);
        }
        assert!((cam.rotation().x + PITCH_LIMIT).abs() < 1e-12);
    }

    #[test]
    fn test_horizontal_look_ignores_pitch() {
        let mut cam = camera();
        cam.rotate_x(0.8);
        let d = cam.horizontal_look_direction();
        assert!(d.y.abs() < 1e-12);
        assert!((d.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_projected_point_in_ndc() {
        let cam = camera();
        let t = tri([(0.5, 0.5, 3.0), (-1.0, 0.2, 4.0), (0.0, -2.0, 10.0)]);
        let out = cam.project_2d(&t);
        assert_eq!(out.len(), 1);
        for p in out[0].p {
            assert!(p.x >= -1.0 && p.x <= 1.0);
            assert!(p.y >= -1.0 && p.y <= 1.0);
            assert!(p.z >= 0.0 && p.z <= 1.0);
        }
        // Axis flip: a point to the right (+x) and up (+y) lands at -y
        assert!(out[0].p[0].x > 0.0);
        assert!(out[0].p[0].y < 0.0);
        // Texture w holds 1/view_z
        assert!((out[0].t[0].w - 1.0 / 3.0).abs() < 1e-12);
        assert!((out[0].t[1].u - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_behind_near_plane_is_dropped() {
        let cam = camera();
        let t = tri([(0.0, 0.0, 0.05), (1.0, 0.0, -1.0), (0.0, 1.0, -3.0)]);
        assert!(cam.project_2d(&t).is_empty());
    }

    #[test]
    fn test_straddling_near_plane_is_cut() {
        let cam = camera();
        let t = tri([(0.0, 0.0, 2.0), (0.5, 0.0, -1.0), (0.0, 0.5, -1.0)]);
        let out = cam.project_2d(&t);
        assert_eq!(out.len(), 1);
        // New vertices sit on the near plane: projected depth 0
        assert!(out[0].p[1].z.abs() < 1e-9);
        assert!(out[0].p[2].z.abs() < 1e-9);
    }

    #[test]
    fn test_frustum_clip_inside_untouched() {
        let cam = camera();
        let t = tri([(-0.5, -0.5, 0.5), (0.5, -0.5, 0.5), (0.0, 0.5, 0.5)]);
        assert_eq!(cam.frustum_clip(&t), vec![t]);
    }

    #[test]
    fn test_frustum_clip_bounds() {
        let cam = camera();
        let t = tri([(-3.0, -3.0, 0.5), (3.0, -3.0, 0.5), (0.0, 3.0, 0.5)]);
        let out = cam.frustum_clip(&t);
        assert!(!out.is_empty());
        assert!(out.len() <= 16);
        for tri in &out {
            for p in tri.p {
                assert!(p.x >= -1.0 - 1e-9 && p.x <= 1.0 + 1e-9);
                assert!(p.y >= -1.0 - 1e-9 && p.y <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_frustum_clip_outside_removed() {
        let cam = camera();
        let t = tri([(2.0, 0.0, 0.5), (3.0, 0.0, 0.5), (2.5, 0.5, 0.5)]);
        assert!(cam.frustum_clip(&t).is_empty());
    }

    #[test]
    fn test_back_face_culling_keeps_order_and_index() {
        let cam = camera();
        // Facing camera (normal -z) and facing away (normal +z)
        let toward = tri([(0.0, 0.0, 5.0), (0.0, 1.0, 5.0), (1.0, 1.0, 5.0)]);
        let away = tri([(0.0, 0.0, 5.0), (1.0, 1.0, 5.0), (0.0, 1.0, 5.0)]);
        let tris = [away, toward, away, toward];
        let normals: Vec<Vec3> = tris.iter().map(|t| t.normal()).collect();
        let visible = cam.back_face_culling(&tris, &normals);
        let indices: Vec<usize> = visible.iter().map(|v| v.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert!(visible.iter().all(|v| v.facing < 0.0));
    }

    #[test]
    fn test_resize_changes_projection() {
        let mut cam = camera();
        let before = cam.projection().m[0][0];
        cam.resize(0.5);
        assert!((cam.projection().m[0][0] - before * 0.5).abs() < 1e-12);
        assert!((cam.aspect_ratio() - 0.5).abs() < 1e-12);
    }
}
