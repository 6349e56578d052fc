//! High-level collision shape abstractions
//!
//! Colliders are stored in body space (relative to the owning object's
//! world pose) and transformed to world space on demand during tests.
//! Boxes are tested as the world-space AABB enclosing the rotated box.

use super::primitives::{Aabb, BoundingSphere, HalfSpace};
use crate::foundation::math::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Collision shape types (body space)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ColliderShape {
    /// Sphere
    Sphere {
        /// Radius, scaled by the largest scale component
        radius: f32,
    },
    /// Box
    Box {
        /// Half edge lengths, scaled per axis
        half_extents: Vec3,
    },
    /// Infinite plane; the solid lies behind the normal
    Plane {
        /// Normal in body space
        normal: Vec3,
    },
}

/// A shape with a body-space offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Geometry
    #[serde(flatten)]
    pub shape: ColliderShape,
    /// Offset from the body origin
    #[serde(default = "Vec3::zeros")]
    pub offset: Vec3,
}

impl Collider {
    /// Sphere at the body origin
    pub fn sphere(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
            offset: Vec3::zeros(),
        }
    }

    /// Box at the body origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: ColliderShape::Box { half_extents },
            offset: Vec3::zeros(),
        }
    }

    /// Plane through the body origin
    pub fn plane(normal: Vec3) -> Self {
        Self {
            shape: ColliderShape::Plane { normal },
            offset: Vec3::zeros(),
        }
    }

    /// Builder pattern: set the offset
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Transform this collider to world space
    pub fn to_world_space(&self, position: &Vec3, rotation: &Quat, scale: &Vec3) -> WorldSpaceShape {
        let center = position + rotation * self.offset.component_mul(scale);
        match &self.shape {
            ColliderShape::Sphere { radius } => {
                let factor = scale.x.abs().max(scale.y.abs()).max(scale.z.abs());
                WorldSpaceShape::Sphere(BoundingSphere::new(center, radius * factor))
            }
            ColliderShape::Box { half_extents } => {
                let scaled = half_extents.component_mul(scale).abs();
                let rotation: Mat3 = rotation.to_rotation_matrix().into_inner();
                let enclosing = rotation.abs() * scaled;
                WorldSpaceShape::Box(Aabb::from_center(center, enclosing))
            }
            ColliderShape::Plane { normal } => {
                WorldSpaceShape::Plane(HalfSpace::from_point_normal(center, rotation * normal))
            }
        }
    }
}

/// World-space collision shape (temporary, for testing only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldSpaceShape {
    /// World-space sphere
    Sphere(BoundingSphere),
    /// World-space box
    Box(Aabb),
    /// World-space half-space
    Plane(HalfSpace),
}

impl WorldSpaceShape {
    /// Test if this shape intersects with another shape
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => a.intersects(b),
            (Self::Sphere(s), Self::Box(b)) | (Self::Box(b), Self::Sphere(s)) => b.intersects_sphere(s),
            (Self::Box(a), Self::Box(b)) => a.intersects(b),
            (Self::Plane(p), Self::Sphere(s)) | (Self::Sphere(s), Self::Plane(p)) => p.intersects_sphere(s),
            (Self::Plane(p), Self::Box(b)) | (Self::Box(b), Self::Plane(p)) => p.intersects_aabb(b),
            // Two infinite planes: treated as never touching
            (Self::Plane(_), Self::Plane(_)) => false,
        }
    }

    /// Translation that moves `self` out of `other`, if they overlap
    pub fn push_out_of(&self, other: &Self) -> Option<Vec3> {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => a.push_out_of_sphere(b),
            (Self::Sphere(s), Self::Box(b)) => s.push_out_of_aabb(b),
            (Self::Box(b), Self::Sphere(s)) => s.push_out_of_aabb(b).map(|v| -v),
            (Self::Box(a), Self::Box(b)) => a.push_out_of_aabb(b),
            (Self::Sphere(s), Self::Plane(p)) => p.push_sphere_out(s),
            (Self::Box(b), Self::Plane(p)) => p.push_aabb_out(b),
            (Self::Plane(_), _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::euler_degrees_to_quat;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_radius_follows_largest_scale() {
        let shape = Collider::sphere(1.0).to_world_space(&Vec3::zeros(), &Quat::identity(), &Vec3::new(1.0, 3.0, 2.0));
        match shape {
            WorldSpaceShape::Sphere(s) => assert_relative_eq!(s.radius, 3.0),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_rotated_box_encloses() {
        let rotation = euler_degrees_to_quat(&Vec3::new(0.0, 0.0, 90.0));
        let shape = Collider::cuboid(Vec3::new(2.0, 1.0, 1.0)).to_world_space(&Vec3::zeros(), &rotation, &Vec3::repeat(1.0));
        match shape {
            WorldSpaceShape::Box(b) => assert_relative_eq!(b.half_extents(), Vec3::new(1.0, 2.0, 1.0), epsilon = 1e-5),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_offset_is_rotated() {
        let rotation = euler_degrees_to_quat(&Vec3::new(0.0, 0.0, 90.0));
        let shape = Collider::sphere(0.5)
            .with_offset(Vec3::x())
            .to_world_space(&Vec3::new(10.0, 0.0, 0.0), &rotation, &Vec3::repeat(1.0));
        match shape {
            WorldSpaceShape::Sphere(s) => assert_relative_eq!(s.center, Vec3::new(10.0, 1.0, 0.0), epsilon = 1e-5),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_plane_never_pushes() {
        let plane = Collider::plane(Vec3::z()).to_world_space(&Vec3::zeros(), &Quat::identity(), &Vec3::repeat(1.0));
        let sphere = Collider::sphere(1.0).to_world_space(&Vec3::zeros(), &Quat::identity(), &Vec3::repeat(1.0));
        assert!(plane.intersects(&sphere));
        assert!(plane.push_out_of(&sphere).is_none());
        assert!(sphere.push_out_of(&plane).is_some());
    }
}
