//! Primitive collision shapes and intersection algorithms
//!
//! World-space spheres, axis-aligned boxes and half-spaces with overlap
//! tests and minimum translation vectors for contact resolution. A
//! translation vector returned by `push_out_*` moves `self` out of the
//! other shape.

use crate::foundation::math::Vec3;

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &Self) -> f32 {
        let distance = (self.center - other.center).magnitude();
        let radius_sum = self.radius + other.radius;
        if distance < radius_sum {
            radius_sum - distance
        } else {
            0.0
        }
    }

    /// Translation separating this sphere from another
    pub fn push_out_of_sphere(&self, other: &Self) -> Option<Vec3> {
        let depth = self.penetration_depth(other);
        if depth <= 0.0 {
            return None;
        }
        let direction = (self.center - other.center)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::z);
        Some(direction * depth)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box from centre and half extents
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Centre point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half extents
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Closest point inside the box to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        point.sup(&self.min).inf(&self.max)
    }

    /// Overlap test (touching counts)
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && self.max[axis] >= other.min[axis])
    }

    /// Overlap test against a sphere
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        (self.closest_point(&sphere.center) - sphere.center).magnitude_squared() <= sphere.radius * sphere.radius
    }

    /// Translation separating this box from another along the shallowest axis
    pub fn push_out_of_aabb(&self, other: &Self) -> Option<Vec3> {
        let mut best: Option<(f32, usize, f32)> = None;
        for axis in 0..3 {
            let forward = other.max[axis] - self.min[axis];
            let backward = self.max[axis] - other.min[axis];
            if forward <= 0.0 || backward <= 0.0 {
                return None;
            }
            let (depth, sign) = if forward < backward { (forward, 1.0) } else { (backward, -1.0) };
            if best.map_or(true, |(d, _, _)| depth < d) {
                best = Some((depth, axis, sign));
            }
        }
        best.map(|(depth, axis, sign)| {
            let mut push = Vec3::zeros();
            push[axis] = depth * sign;
            push
        })
    }
}

impl BoundingSphere {
    /// Translation separating this sphere from a box
    pub fn push_out_of_aabb(&self, aabb: &Aabb) -> Option<Vec3> {
        let closest = aabb.closest_point(&self.center);
        let offset = self.center - closest;
        let distance = offset.magnitude();
        if distance > f32::EPSILON {
            return (distance < self.radius).then(|| offset / distance * (self.radius - distance));
        }
        // Centre inside the box: leave through the nearest face
        let as_box = Aabb::from_center(self.center, Vec3::repeat(self.radius));
        as_box.push_out_of_aabb(aabb)
    }
}

/// Infinite plane; everything on the side opposite the normal is solid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfSpace {
    /// Unit normal pointing out of the solid
    pub normal: Vec3,
    /// Signed distance of the plane from the origin along `normal`
    pub distance: f32,
}

impl HalfSpace {
    /// Plane through `point` with the given normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z);
        Self {
            distance: normal.dot(&point),
            normal,
        }
    }

    /// Signed distance of a point above the plane
    pub fn signed_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// Sphere overlap test
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.signed_distance(&sphere.center) <= sphere.radius
    }

    /// Box overlap test
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.signed_distance(&aabb.center()) <= self.projected_radius(aabb)
    }

    /// Translation lifting a sphere out of the solid side
    pub fn push_sphere_out(&self, sphere: &BoundingSphere) -> Option<Vec3> {
        let depth = sphere.radius - self.signed_distance(&sphere.center);
        (depth > 0.0).then(|| self.normal * depth)
    }

    /// Translation lifting a box out of the solid side
    pub fn push_aabb_out(&self, aabb: &Aabb) -> Option<Vec3> {
        let depth = self.projected_radius(aabb) - self.signed_distance(&aabb.center());
        (depth > 0.0).then(|| self.normal * depth)
    }

    fn projected_radius(&self, aabb: &Aabb) -> f32 {
        aabb.half_extents().dot(&self.normal.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_sphere() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let c = BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 0.5);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_relative_eq!(a.penetration_depth(&b), 0.5);
        assert_relative_eq!(a.push_out_of_sphere(&b).unwrap(), Vec3::new(-0.5, 0.0, 0.0));
    }

    #[test]
    fn test_aabb_overlap_and_push() {
        let a = Aabb::from_center(Vec3::zeros(), Vec3::repeat(1.0));
        let b = Aabb::from_center(Vec3::new(1.5, 0.0, 0.0), Vec3::repeat(1.0));
        assert!(a.intersects(&b));
        assert_relative_eq!(a.push_out_of_aabb(&b).unwrap(), Vec3::new(-0.5, 0.0, 0.0));

        let far = Aabb::from_center(Vec3::new(5.0, 0.0, 0.0), Vec3::repeat(1.0));
        assert!(!a.intersects(&far));
        assert!(a.push_out_of_aabb(&far).is_none());
    }

    #[test]
    fn test_sphere_resting_on_plane() {
        let ground = HalfSpace::from_point_normal(Vec3::zeros(), Vec3::z());
        let sunk = BoundingSphere::new(Vec3::new(0.0, 0.0, 0.5), 1.0);
        assert!(ground.intersects_sphere(&sunk));
        assert_relative_eq!(ground.push_sphere_out(&sunk).unwrap(), Vec3::new(0.0, 0.0, 0.5));

        let above = BoundingSphere::new(Vec3::new(0.0, 0.0, 2.0), 1.0);
        assert!(!ground.intersects_sphere(&above));
    }

    #[test]
    fn test_box_against_plane() {
        let ground = HalfSpace::from_point_normal(Vec3::new(0.0, 0.0, 1.0), Vec3::z());
        let aabb = Aabb::from_center(Vec3::new(0.0, 0.0, 1.25), Vec3::repeat(0.5));
        assert!(ground.intersects_aabb(&aabb));
        assert_relative_eq!(ground.push_aabb_out(&aabb).unwrap(), Vec3::new(0.0, 0.0, 0.25));
    }

    #[test]
    fn test_sphere_against_box() {
        let aabb = Aabb::from_center(Vec3::zeros(), Vec3::repeat(1.0));
        let sphere = BoundingSphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
        assert!(aabb.intersects_sphere(&sphere));
        assert_relative_eq!(sphere.push_out_of_aabb(&aabb).unwrap(), Vec3::new(0.5, 0.0, 0.0));
    }
}
