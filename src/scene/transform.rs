//! Position + rotation component shared by the camera and meshes

use std::f64::consts::PI;

use crate::rasterizer::{Matrix4, Vec3};

/// Position and Euler rotation (radians) with a cached world matrix
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    world: Matrix4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        let mut t = Self { position, rotation, world: Matrix4::identity() };
        t.recompute();
        t
    }

    /// `Rz * Rx * (Ry * T)`; the grouping matters.
    pub fn recompute(&mut self) {
        let rot_x = Matrix4::rotation_x(self.rotation.x);
        let rot_y = Matrix4::rotation_y(self.rotation.y);
        let rot_z = Matrix4::rotation_z(self.rotation.z);
        let trans = Matrix4::translation(self.position);
        self.world = rot_z.multiply(&rot_x).multiply(&rot_y.multiply(&trans));
    }

    pub fn world(&self) -> &Matrix4 {
        &self.world
    }
}

/// Anything owning a [`Transform`] that has to rebuild derived state when
/// it moves. Every mutator ends with [`Transformable::recompute`].
pub trait Transformable {
    fn transform(&self) -> &Transform;
    fn transform_mut(&mut self) -> &mut Transform;

    /// Rebuild the cached world matrix and anything derived from it
    fn recompute(&mut self);

    fn translate(&mut self, v: Vec3) {
        let t = self.transform_mut();
        t.position = t.position + v;
        self.recompute();
    }

    /// Adds `rad % PI` (remainder, not a wrap), so the accumulated angle
    /// itself is unbounded.
    fn rotate_x(&mut self, rad: f64) {
        self.transform_mut().rotation.x += rad % PI;
        self.recompute();
    }

    fn rotate_y(&mut self, rad: f64) {
        self.transform_mut().rotation.y += rad % PI;
        self.recompute();
    }

    fn rotate_z(&mut self, rad: f64) {
        self.transform_mut().rotation.z += rad % PI;
        self.recompute();
    }

    fn position(&self) -> Vec3 {
        self.transform().position
    }

    fn rotation(&self) -> Vec3 {
        self.transform().rotation
    }
}
